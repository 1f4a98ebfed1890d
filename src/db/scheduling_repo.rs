// src/db/scheduling_repo.rs

use sqlx::{PgPool, Postgres, Executor};
use uuid::Uuid;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use crate::{
    common::error::AppError,
    models::scheduling::{Court, CourtBlock, Reservation, ReservationStatus},
};

// Código Postgres para violação de constraint de exclusão (EXCLUDE USING gist).
// A constraint da tabela de reservas é o árbitro final contra corridas
// entre duas gravações simultâneas no mesmo horário.
const EXCLUSION_VIOLATION: &str = "23P01";

#[derive(Clone)]
pub struct SchedulingRepository {
    pool: PgPool,
}

impl SchedulingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  QUADRAS
    // =========================================================================

    pub async fn create_court<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        name: &str,
        sport: Option<&str>,
    ) -> Result<Court, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let court = sqlx::query_as::<_, Court>(
            r#"
            INSERT INTO courts (tenant_id, name, sport)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(name)
        .bind(sport)
        .fetch_one(executor)
        .await?;

        Ok(court)
    }

    pub async fn list_courts<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<Court>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let courts = sqlx::query_as::<_, Court>(
            "SELECT * FROM courts WHERE tenant_id = $1 ORDER BY name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(courts)
    }

    // =========================================================================
    //  RESERVAS
    // =========================================================================

    /// Reservas que participam da checagem de conflito: mesmo recurso e dia,
    /// sem as canceladas e sem a própria reserva em edição (se houver).
    pub async fn fetch_active_for_slot<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        court_id: Uuid,
        date: NaiveDate,
        exclude_reservation_id: Option<Uuid>,
    ) -> Result<Vec<Reservation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE tenant_id = $1
              AND court_id = $2
              AND date = $3
              AND status <> $4
              AND ($5::uuid IS NULL OR id <> $5)
            ORDER BY start_time ASC
            "#,
        )
        .bind(tenant_id)
        .bind(court_id)
        .bind(date)
        .bind(ReservationStatus::Cancelled)
        .bind(exclude_reservation_id)
        .fetch_all(executor)
        .await?;

        Ok(reservations)
    }

    pub async fn insert_reservation<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        court_id: Uuid,
        customer_name: &str,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Reservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (tenant_id, court_id, customer_name, date, start_time, end_time, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(court_id)
        .bind(customer_name)
        .bind(date)
        .bind(start_time)
        .bind(end_time)
        .bind(ReservationStatus::Confirmed)
        .fetch_one(executor)
        .await
        .map_err(|e| {
            // Duas reservas simultâneas podem passar na pré-checagem; a
            // constraint de exclusão derruba a segunda e devolvemos o mesmo
            // 409 que a pré-checagem teria devolvido.
            if let Some(db_err) = e.as_database_error() {
                let is_exclusion = db_err.code().as_deref() == Some(EXCLUSION_VIOLATION);
                if is_exclusion || db_err.is_unique_violation() {
                    return AppError::BookingConflict(
                        "Horário indisponível: outra reserva foi confirmada para esta janela.".to_string(),
                    );
                }
            }
            e.into()
        })
    }

    pub async fn list_reservations_by_date<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservations = sqlx::query_as::<_, Reservation>(
            r#"
            SELECT * FROM reservations
            WHERE tenant_id = $1 AND date = $2
            ORDER BY court_id, start_time ASC
            "#,
        )
        .bind(tenant_id)
        .bind(date)
        .fetch_all(executor)
        .await?;

        Ok(reservations)
    }

    pub async fn cancel_reservation<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<Reservation, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            UPDATE reservations
            SET status = $3
            WHERE tenant_id = $1 AND id = $2
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(reservation_id)
        .bind(ReservationStatus::Cancelled)
        .fetch_optional(executor)
        .await?
        .ok_or(AppError::ReservationNotFound)?;

        Ok(reservation)
    }

    // =========================================================================
    //  BLOQUEIOS (Manutenção / Indisponibilidade)
    // =========================================================================

    pub async fn insert_block<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        court_id: Uuid,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
        reason: &str,
    ) -> Result<CourtBlock, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let block = sqlx::query_as::<_, CourtBlock>(
            r#"
            INSERT INTO court_blocks (tenant_id, court_id, starts_at, ends_at, reason)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(court_id)
        .bind(starts_at)
        .bind(ends_at)
        .bind(reason)
        .fetch_one(executor)
        .await?;

        Ok(block)
    }

    /// Bloqueios que tocam a janela candidata (bordas inclusivas).
    pub async fn fetch_blocks_intersecting<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        court_id: Uuid,
        window_start: NaiveDateTime,
        window_end: NaiveDateTime,
    ) -> Result<Vec<CourtBlock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let blocks = sqlx::query_as::<_, CourtBlock>(
            r#"
            SELECT * FROM court_blocks
            WHERE tenant_id = $1
              AND court_id = $2
              AND starts_at <= $4
              AND ends_at >= $3
            ORDER BY starts_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(court_id)
        .bind(window_start)
        .bind(window_end)
        .fetch_all(executor)
        .await?;

        Ok(blocks)
    }

    pub async fn list_blocks<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        court_id: Uuid,
    ) -> Result<Vec<CourtBlock>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let blocks = sqlx::query_as::<_, CourtBlock>(
            r#"
            SELECT * FROM court_blocks
            WHERE tenant_id = $1 AND court_id = $2
            ORDER BY starts_at ASC
            "#,
        )
        .bind(tenant_id)
        .bind(court_id)
        .fetch_all(executor)
        .await?;

        Ok(blocks)
    }

    pub async fn delete_block<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        block_id: Uuid,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM court_blocks WHERE tenant_id = $1 AND id = $2")
            .bind(tenant_id)
            .bind(block_id)
            .execute(executor)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::BlockNotFound);
        }

        Ok(())
    }
}
