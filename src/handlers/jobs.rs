// src/handlers/jobs.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState, models::billing::GenerationReport};

// Os jobs são disparados por um agendador externo via HTTP e varrem todos os
// tenants, por isso não recebem o cabeçalho de tenancy. A data de referência
// ("hoje") é um parâmetro explícito com default no relógio, para uma execução
// poder ser reproduzida de forma determinística.
#[derive(Debug, Deserialize, ToSchema)]
pub struct JobQuery {
    #[schema(value_type = Option<String>, format = Date, example = "2026-09-10")]
    pub date: Option<NaiveDate>,
}

impl JobQuery {
    fn reference_date(&self) -> NaiveDate {
        self.date.unwrap_or_else(|| Utc::now().date_naive())
    }
}

// POST /api/jobs/mensalidades  (agendado: diário)
#[utoipa::path(
    post,
    path = "/api/jobs/mensalidades",
    tag = "Jobs",
    responses(
        (status = 200, description = "Contadores da execução", body = GenerationReport)
    ),
    params(
        ("date" = Option<String>, Query, description = "Data de referência (YYYY-MM-DD, default hoje)")
    )
)]
pub async fn run_mensalidades(
    State(app_state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .billing_service
        .generate_mensalidades(&app_state.db_pool, query.reference_date())
        .await?;

    Ok((StatusCode::OK, Json(report)))
}

// POST /api/jobs/invoices  (agendado: mensal, início da competência)
#[utoipa::path(
    post,
    path = "/api/jobs/invoices",
    tag = "Jobs",
    responses(
        (status = 200, description = "Contadores da execução", body = GenerationReport)
    ),
    params(
        ("date" = Option<String>, Query, description = "Data de referência (YYYY-MM-DD, default hoje)")
    )
)]
pub async fn run_tenant_invoices(
    State(app_state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<impl IntoResponse, AppError> {
    let report = app_state
        .billing_service
        .generate_tenant_invoices(
            &app_state.db_pool,
            app_state.gateway.as_ref(),
            query.reference_date(),
        )
        .await?;

    Ok((StatusCode::OK, Json(report)))
}
