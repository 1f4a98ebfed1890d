// src/services/scheduling_service.rs

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::SchedulingRepository,
    models::scheduling::{ConflictCheck, Court, CourtBlock, Reservation, ReservationStatus},
};

// =============================================================================
//  Núcleo puro da validação de conflito
//
//  Reservas usam janelas semiabertas [início, fim): encostar na borda NÃO é
//  conflito (a reserva das 10h às 11h convive com a das 11h às 12h).
//  Bloqueios usam bordas INCLUSIVAS: encostar É conflito. A assimetria é
//  proposital e está pregada nos testes.
// =============================================================================

/// Duas janelas semiabertas [s1, e1) e [s2, e2) se sobrepõem?
/// "Começa durante", "termina durante" e "engloba" se reduzem todos a isto.
pub fn windows_overlap(s1: NaiveTime, e1: NaiveTime, s2: NaiveTime, e2: NaiveTime) -> bool {
    s1 < e2 && s2 < e1
}

/// Confronta a janela candidata com as reservas existentes do mesmo
/// recurso/dia. Canceladas e a própria reserva em edição ficam de fora.
pub fn check_reservation_conflicts(
    start_time: NaiveTime,
    end_time: NaiveTime,
    exclude_reservation_id: Option<Uuid>,
    existing: &[Reservation],
) -> ConflictCheck {
    let conflicting: Vec<Reservation> = existing
        .iter()
        .filter(|r| r.status != ReservationStatus::Cancelled)
        .filter(|r| Some(r.id) != exclude_reservation_id)
        .filter(|r| windows_overlap(start_time, end_time, r.start_time, r.end_time))
        .cloned()
        .collect();

    if conflicting.is_empty() {
        return ConflictCheck::clear();
    }

    let windows = conflicting
        .iter()
        .map(|r| {
            format!(
                "{} - {}",
                r.start_time.format("%H:%M"),
                r.end_time.format("%H:%M")
            )
        })
        .collect::<Vec<_>>()
        .join(", ");

    ConflictCheck {
        has_conflict: true,
        message: Some(format!("Horário indisponível. Conflito com: {windows}")),
        conflicting_reservations: conflicting,
    }
}

/// Confronta a janela candidata com os bloqueios da quadra (bordas
/// inclusivas). O primeiro bloqueio que tocar a janela encerra a checagem.
pub fn check_block_conflicts(
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
    blocks: &[CourtBlock],
) -> ConflictCheck {
    let hit = blocks
        .iter()
        .find(|b| b.starts_at <= window_end && b.ends_at >= window_start);

    match hit {
        Some(block) => ConflictCheck {
            has_conflict: true,
            message: Some(format!("Quadra bloqueada neste horário: {}", block.reason)),
            conflicting_reservations: Vec::new(),
        },
        None => ConflictCheck::clear(),
    }
}

/// Validação composta: reservas primeiro; só se estiver livre olha os
/// bloqueios. O primeiro acerto ganha; não agregamos os dois tipos de falha.
pub fn evaluate(
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    exclude_reservation_id: Option<Uuid>,
    existing: &[Reservation],
    blocks: &[CourtBlock],
) -> ConflictCheck {
    let reservation_check =
        check_reservation_conflicts(start_time, end_time, exclude_reservation_id, existing);
    if reservation_check.has_conflict {
        return reservation_check;
    }

    check_block_conflicts(date.and_time(start_time), date.and_time(end_time), blocks)
}

// =============================================================================
//  Serviço (orquestra repositório + núcleo puro)
// =============================================================================

#[derive(Clone)]
pub struct SchedulingService {
    repo: SchedulingRepository,
}

impl SchedulingService {
    pub fn new(repo: SchedulingRepository) -> Self {
        Self { repo }
    }

    // --- QUADRAS ---

    pub async fn create_court(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        name: &str,
        sport: Option<&str>,
    ) -> Result<Court, AppError> {
        self.repo.create_court(pool, tenant_id, name, sport).await
    }

    pub async fn list_courts(&self, pool: &PgPool, tenant_id: Uuid) -> Result<Vec<Court>, AppError> {
        self.repo.list_courts(pool, tenant_id).await
    }

    // --- DISPONIBILIDADE ---

    /// Pré-checagem de disponibilidade. Conflito volta como dado (não erro),
    /// para o front exibir a rejeição antes de tentar salvar.
    pub async fn check_availability(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        court_id: Uuid,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        exclude_reservation_id: Option<Uuid>,
    ) -> Result<ConflictCheck, AppError> {
        let existing = self
            .repo
            .fetch_active_for_slot(pool, tenant_id, court_id, date, exclude_reservation_id)
            .await?;

        let reservation_check =
            check_reservation_conflicts(start_time, end_time, exclude_reservation_id, &existing);
        if reservation_check.has_conflict {
            return Ok(reservation_check);
        }

        let window_start = date.and_time(start_time);
        let window_end = date.and_time(end_time);
        let blocks = self
            .repo
            .fetch_blocks_intersecting(pool, tenant_id, court_id, window_start, window_end)
            .await?;

        Ok(check_block_conflicts(window_start, window_end, &blocks))
    }

    // --- RESERVAS ---

    /// Caminho de escrita: valida e insere dentro da mesma transação. A
    /// constraint de exclusão no banco cobre a janela de corrida que sobra
    /// entre a leitura e o insert.
    pub async fn create_reservation(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        court_id: Uuid,
        customer_name: &str,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<Reservation, AppError> {
        let mut tx = pool.begin().await?;

        let existing = self
            .repo
            .fetch_active_for_slot(&mut *tx, tenant_id, court_id, date, None)
            .await?;
        let blocks = self
            .repo
            .fetch_blocks_intersecting(
                &mut *tx,
                tenant_id,
                court_id,
                date.and_time(start_time),
                date.and_time(end_time),
            )
            .await?;

        let check = evaluate(date, start_time, end_time, None, &existing, &blocks);
        if check.has_conflict {
            return Err(AppError::BookingConflict(
                check.message.unwrap_or_else(|| "Horário indisponível.".to_string()),
            ));
        }

        let reservation = self
            .repo
            .insert_reservation(&mut *tx, tenant_id, court_id, customer_name, date, start_time, end_time)
            .await?;

        tx.commit().await?;

        tracing::info!(
            "Reserva criada: quadra {} em {} de {} às {}",
            court_id,
            date,
            start_time.format("%H:%M"),
            end_time.format("%H:%M")
        );

        Ok(reservation)
    }

    pub async fn list_reservations(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        date: NaiveDate,
    ) -> Result<Vec<Reservation>, AppError> {
        self.repo.list_reservations_by_date(pool, tenant_id, date).await
    }

    pub async fn cancel_reservation(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        reservation_id: Uuid,
    ) -> Result<Reservation, AppError> {
        self.repo.cancel_reservation(pool, tenant_id, reservation_id).await
    }

    // --- BLOQUEIOS ---

    pub async fn create_block(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        court_id: Uuid,
        starts_at: NaiveDateTime,
        ends_at: NaiveDateTime,
        reason: &str,
    ) -> Result<CourtBlock, AppError> {
        self.repo
            .insert_block(pool, tenant_id, court_id, starts_at, ends_at, reason)
            .await
    }

    pub async fn list_blocks(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        court_id: Uuid,
    ) -> Result<Vec<CourtBlock>, AppError> {
        self.repo.list_blocks(pool, tenant_id, court_id).await
    }

    pub async fn delete_block(
        &self,
        pool: &PgPool,
        tenant_id: Uuid,
        block_id: Uuid,
    ) -> Result<(), AppError> {
        self.repo.delete_block(pool, tenant_id, block_id).await
    }
}

// =============================================================================
//  Testes do núcleo puro
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 9, 12).unwrap()
    }

    fn reservation(start: NaiveTime, end: NaiveTime, status: ReservationStatus) -> Reservation {
        Reservation {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            court_id: Uuid::new_v4(),
            customer_name: "Cliente Teste".to_string(),
            date: day(),
            start_time: start,
            end_time: end,
            status,
            created_at: None,
        }
    }

    fn block(starts_at: NaiveDateTime, ends_at: NaiveDateTime, reason: &str) -> CourtBlock {
        CourtBlock {
            id: Uuid::new_v4(),
            tenant_id: Uuid::new_v4(),
            court_id: Uuid::new_v4(),
            starts_at,
            ends_at,
            reason: reason.to_string(),
        }
    }

    #[test]
    fn bordas_encostadas_de_reservas_nao_conflitam() {
        // Existente [10:00, 11:00); candidata [11:00, 12:00)
        assert!(!windows_overlap(t(11, 0), t(12, 0), t(10, 0), t(11, 0)));
        assert!(!windows_overlap(t(9, 0), t(10, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn janela_contida_conflita() {
        // Candidata [10:30, 10:45) dentro de [10:00, 11:00)
        assert!(windows_overlap(t(10, 30), t(10, 45), t(10, 0), t(11, 0)));
    }

    #[test]
    fn termina_durante_conflita() {
        // Candidata [09:00, 10:01) invade [10:00, 11:00) por um minuto
        assert!(windows_overlap(t(9, 0), t(10, 1), t(10, 0), t(11, 0)));
    }

    #[test]
    fn comeca_durante_conflita() {
        assert!(windows_overlap(t(10, 59), t(12, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn engloba_conflita() {
        assert!(windows_overlap(t(9, 0), t(12, 0), t(10, 0), t(11, 0)));
    }

    #[test]
    fn reserva_cancelada_nao_participa() {
        let existing = vec![reservation(t(10, 0), t(11, 0), ReservationStatus::Cancelled)];
        let check = check_reservation_conflicts(t(10, 0), t(11, 0), None, &existing);
        assert!(!check.has_conflict);
    }

    #[test]
    fn excluir_a_propria_reserva_permite_editar_no_lugar() {
        let existing = vec![reservation(t(10, 0), t(11, 0), ReservationStatus::Confirmed)];
        let own_id = existing[0].id;

        // Sem exclusão a própria janela conflita consigo mesma
        let check = check_reservation_conflicts(t(10, 0), t(11, 0), None, &existing);
        assert!(check.has_conflict);

        // Excluindo exatamente aquele id, o conflito some
        let check = check_reservation_conflicts(t(10, 0), t(11, 0), Some(own_id), &existing);
        assert!(!check.has_conflict);
    }

    #[test]
    fn mensagem_enumera_as_janelas_em_conflito() {
        let existing = vec![
            reservation(t(10, 0), t(11, 0), ReservationStatus::Confirmed),
            reservation(t(11, 0), t(12, 0), ReservationStatus::Confirmed),
        ];
        let check = check_reservation_conflicts(t(10, 30), t(11, 30), None, &existing);

        assert!(check.has_conflict);
        assert_eq!(check.conflicting_reservations.len(), 2);
        assert_eq!(
            check.message.as_deref(),
            Some("Horário indisponível. Conflito com: 10:00 - 11:00, 11:00 - 12:00")
        );
    }

    #[test]
    fn bloqueio_encostado_na_borda_conflita() {
        // Bloqueio [14:00, 15:00] e candidata [13:00, 14:00]: para bloqueio
        // encostar conta, ao contrário das reservas.
        let blocks = vec![block(
            day().and_time(t(14, 0)),
            day().and_time(t(15, 0)),
            "Manutenção do gramado",
        )];
        let check = check_block_conflicts(day().and_time(t(13, 0)), day().and_time(t(14, 0)), &blocks);

        assert!(check.has_conflict);
        assert_eq!(
            check.message.as_deref(),
            Some("Quadra bloqueada neste horário: Manutenção do gramado")
        );
        assert!(check.conflicting_reservations.is_empty());
    }

    #[test]
    fn bloqueio_fora_da_janela_nao_conflita() {
        let blocks = vec![block(
            day().and_time(t(14, 0)),
            day().and_time(t(15, 0)),
            "Manutenção",
        )];
        let check = check_block_conflicts(day().and_time(t(12, 0)), day().and_time(t(13, 59)), &blocks);
        assert!(!check.has_conflict);
    }

    #[test]
    fn reserva_ganha_do_bloqueio_na_validacao_composta() {
        // Com os dois tipos de conflito presentes, o primeiro acerto (reserva)
        // é devolvido e o bloqueio nem é avaliado.
        let existing = vec![reservation(t(10, 0), t(11, 0), ReservationStatus::Confirmed)];
        let blocks = vec![block(
            day().and_time(t(9, 0)),
            day().and_time(t(12, 0)),
            "Evento fechado",
        )];

        let check = evaluate(day(), t(10, 30), t(11, 30), None, &existing, &blocks);
        assert!(check.has_conflict);
        assert!(check.message.unwrap().starts_with("Horário indisponível"));
    }

    #[test]
    fn validacao_composta_cai_no_bloqueio_quando_reservas_estao_livres() {
        let blocks = vec![block(
            day().and_time(t(9, 0)),
            day().and_time(t(12, 0)),
            "Evento fechado",
        )];

        let check = evaluate(day(), t(10, 0), t(11, 0), None, &[], &blocks);
        assert!(check.has_conflict);
        assert_eq!(
            check.message.as_deref(),
            Some("Quadra bloqueada neste horário: Evento fechado")
        );
    }
}
