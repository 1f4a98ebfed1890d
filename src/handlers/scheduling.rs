// src/handlers/scheduling.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Deserialize;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::scheduling::{ConflictCheck, Court, CourtBlock, Reservation},
};

// =============================================================================
//  ÁREA 1: QUADRAS
// =============================================================================

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCourtPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Quadra 1 - Society")]
    pub name: String,

    #[schema(example = "futebol_society")]
    pub sport: Option<String>,
}

// POST /api/courts
#[utoipa::path(
    post,
    path = "/api/courts",
    tag = "Agenda",
    request_body = CreateCourtPayload,
    responses(
        (status = 201, description = "Quadra criada", body = Court),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena")
    )
)]
pub async fn create_court(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateCourtPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let court = app_state
        .scheduling_service
        .create_court(&app_state.db_pool, tenant.0, &payload.name, payload.sport.as_deref())
        .await?;

    Ok((StatusCode::CREATED, Json(court)))
}

// GET /api/courts
#[utoipa::path(
    get,
    path = "/api/courts",
    tag = "Agenda",
    responses(
        (status = 200, description = "Lista de quadras", body = Vec<Court>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena")
    )
)]
pub async fn list_courts(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let courts = app_state
        .scheduling_service
        .list_courts(&app_state.db_pool, tenant.0)
        .await?;

    Ok((StatusCode::OK, Json(courts)))
}

// =============================================================================
//  ÁREA 2: RESERVAS
// =============================================================================

// A pré-condição end > start é barrada aqui, na camada de schema,
// antes de chegar na validação de conflito.
fn validate_time_window(payload: &CreateReservationPayload) -> Result<(), ValidationError> {
    if payload.end_time <= payload.start_time {
        return Err(ValidationError::new("time_window")
            .with_message("O horário final deve ser depois do inicial".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_time_window))]
pub struct CreateReservationPayload {
    pub court_id: Uuid,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "João Pereira")]
    pub customer_name: String,

    #[schema(value_type = String, format = Date, example = "2026-09-12")]
    pub date: NaiveDate,

    #[serde(with = "crate::common::timefmt")]
    #[schema(value_type = String, example = "10:00")]
    pub start_time: NaiveTime,

    #[serde(with = "crate::common::timefmt")]
    #[schema(value_type = String, example = "11:00")]
    pub end_time: NaiveTime,
}

// POST /api/reservations
#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = "Agenda",
    request_body = CreateReservationPayload,
    responses(
        (status = 201, description = "Reserva criada", body = Reservation),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Conflito de horário")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena")
    )
)]
pub async fn create_reservation(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateReservationPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let reservation = app_state
        .scheduling_service
        .create_reservation(
            &app_state.db_pool,
            tenant.0,
            payload.court_id,
            &payload.customer_name,
            payload.date,
            payload.start_time,
            payload.end_time,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(reservation)))
}

fn validate_check_window(payload: &CheckAvailabilityPayload) -> Result<(), ValidationError> {
    if payload.end_time <= payload.start_time {
        return Err(ValidationError::new("time_window")
            .with_message("O horário final deve ser depois do inicial".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_check_window))]
pub struct CheckAvailabilityPayload {
    pub court_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-09-12")]
    pub date: NaiveDate,

    #[serde(with = "crate::common::timefmt")]
    #[schema(value_type = String, example = "10:00")]
    pub start_time: NaiveTime,

    #[serde(with = "crate::common::timefmt")]
    #[schema(value_type = String, example = "11:00")]
    pub end_time: NaiveTime,

    // Preenchido na edição, para a reserva não conflitar com ela mesma
    pub exclude_reservation_id: Option<Uuid>,
}

// POST /api/reservations/check
#[utoipa::path(
    post,
    path = "/api/reservations/check",
    tag = "Agenda",
    request_body = CheckAvailabilityPayload,
    responses(
        (status = 200, description = "Resultado da checagem (conflito é dado, não erro)", body = ConflictCheck),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena")
    )
)]
pub async fn check_availability(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CheckAvailabilityPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let check = app_state
        .scheduling_service
        .check_availability(
            &app_state.db_pool,
            tenant.0,
            payload.court_id,
            payload.date,
            payload.start_time,
            payload.end_time,
            payload.exclude_reservation_id,
        )
        .await?;

    Ok((StatusCode::OK, Json(check)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListReservationsQuery {
    #[schema(value_type = String, format = Date, example = "2026-09-12")]
    pub date: NaiveDate,
}

// GET /api/reservations?date=...
#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = "Agenda",
    responses(
        (status = 200, description = "Reservas do dia", body = Vec<Reservation>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena"),
        ("date" = String, Query, description = "Dia (YYYY-MM-DD)")
    )
)]
pub async fn list_reservations(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListReservationsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let reservations = app_state
        .scheduling_service
        .list_reservations(&app_state.db_pool, tenant.0, query.date)
        .await?;

    Ok((StatusCode::OK, Json(reservations)))
}

// POST /api/reservations/{id}/cancel
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/cancel",
    tag = "Agenda",
    responses(
        (status = 200, description = "Reserva cancelada", body = Reservation),
        (status = 404, description = "Reserva não encontrada")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena"),
        ("id" = Uuid, Path, description = "ID da reserva")
    )
)]
pub async fn cancel_reservation(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(reservation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let reservation = app_state
        .scheduling_service
        .cancel_reservation(&app_state.db_pool, tenant.0, reservation_id)
        .await?;

    Ok((StatusCode::OK, Json(reservation)))
}

// =============================================================================
//  ÁREA 3: BLOQUEIOS
// =============================================================================

fn validate_block_window(payload: &CreateBlockPayload) -> Result<(), ValidationError> {
    if payload.ends_at <= payload.starts_at {
        return Err(ValidationError::new("time_window")
            .with_message("O fim do bloqueio deve ser depois do início".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_block_window))]
pub struct CreateBlockPayload {
    pub court_id: Uuid,

    #[schema(value_type = String, example = "2026-09-12T14:00:00")]
    pub starts_at: NaiveDateTime,

    #[schema(value_type = String, example = "2026-09-12T15:00:00")]
    pub ends_at: NaiveDateTime,

    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Manutenção do gramado")]
    pub reason: String,
}

// POST /api/blocks
#[utoipa::path(
    post,
    path = "/api/blocks",
    tag = "Agenda",
    request_body = CreateBlockPayload,
    responses(
        (status = 201, description = "Bloqueio criado", body = CourtBlock),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena")
    )
)]
pub async fn create_block(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateBlockPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let block = app_state
        .scheduling_service
        .create_block(
            &app_state.db_pool,
            tenant.0,
            payload.court_id,
            payload.starts_at,
            payload.ends_at,
            &payload.reason,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(block)))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListBlocksQuery {
    pub court_id: Uuid,
}

// GET /api/blocks?courtId=...
#[utoipa::path(
    get,
    path = "/api/blocks",
    tag = "Agenda",
    responses(
        (status = 200, description = "Bloqueios da quadra", body = Vec<CourtBlock>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena"),
        ("courtId" = Uuid, Query, description = "ID da quadra")
    )
)]
pub async fn list_blocks(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListBlocksQuery>,
) -> Result<impl IntoResponse, AppError> {
    let blocks = app_state
        .scheduling_service
        .list_blocks(&app_state.db_pool, tenant.0, query.court_id)
        .await?;

    Ok((StatusCode::OK, Json(blocks)))
}

// DELETE /api/blocks/{id}
#[utoipa::path(
    delete,
    path = "/api/blocks/{id}",
    tag = "Agenda",
    responses(
        (status = 204, description = "Bloqueio removido"),
        (status = 404, description = "Bloqueio não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena"),
        ("id" = Uuid, Path, description = "ID do bloqueio")
    )
)]
pub async fn delete_block(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(block_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state
        .scheduling_service
        .delete_block(&app_state.db_pool, tenant.0, block_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
