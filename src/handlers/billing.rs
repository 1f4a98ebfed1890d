// src/handlers/billing.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::tenancy::TenantContext,
    models::billing::{Mensalidade, RecurringContract, TenantInvoice},
};

// =============================================================================
//  ÁREA 1: CONTRATOS RECORRENTES
// =============================================================================

fn validate_percent(payload: &CreateContractPayload) -> Result<(), ValidationError> {
    if payload.discount_percent < Decimal::ZERO || payload.discount_percent > Decimal::ONE_HUNDRED {
        return Err(ValidationError::new("discount_percent")
            .with_message("O desconto deve estar entre 0 e 100".into()));
    }
    if payload.monthly_value <= Decimal::ZERO {
        return Err(ValidationError::new("monthly_value")
            .with_message("O valor mensal deve ser positivo".into()));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_percent))]
pub struct CreateContractPayload {
    #[validate(length(min = 1, message = "required"))]
    #[schema(example = "Maria da Silva")]
    pub customer_name: String,

    #[schema(example = "350.00")]
    pub monthly_value: Decimal,

    // 1–28 para o vencimento existir em qualquer mês
    #[validate(range(min = 1, max = 28, message = "O dia de vencimento deve estar entre 1 e 28"))]
    #[schema(example = 10)]
    pub due_day: i32,

    #[serde(default)]
    #[schema(example = "5.00")]
    pub discount_percent: Decimal,
}

// POST /api/contracts
#[utoipa::path(
    post,
    path = "/api/contracts",
    tag = "Financeiro",
    request_body = CreateContractPayload,
    responses(
        (status = 201, description = "Contrato criado", body = RecurringContract),
        (status = 400, description = "Dados inválidos")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena")
    )
)]
pub async fn create_contract(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Json(payload): Json<CreateContractPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let contract = app_state
        .billing_service
        .create_contract(
            &app_state.db_pool,
            tenant.0,
            &payload.customer_name,
            payload.monthly_value,
            payload.due_day,
            payload.discount_percent,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(contract)))
}

// GET /api/contracts/{id}
#[utoipa::path(
    get,
    path = "/api/contracts/{id}",
    tag = "Financeiro",
    responses(
        (status = 200, description = "Contrato", body = RecurringContract),
        (status = 404, description = "Contrato não encontrado")
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena"),
        ("id" = Uuid, Path, description = "ID do contrato")
    )
)]
pub async fn get_contract(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Path(contract_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let contract = app_state
        .billing_service
        .get_contract(&app_state.db_pool, tenant.0, contract_id)
        .await?;

    Ok((StatusCode::OK, Json(contract)))
}

// GET /api/contracts
#[utoipa::path(
    get,
    path = "/api/contracts",
    tag = "Financeiro",
    responses(
        (status = 200, description = "Lista de contratos", body = Vec<RecurringContract>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena")
    )
)]
pub async fn list_contracts(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let contracts = app_state
        .billing_service
        .list_contracts(&app_state.db_pool, tenant.0)
        .await?;

    Ok((StatusCode::OK, Json(contracts)))
}

// =============================================================================
//  ÁREA 2: MENSALIDADES E FATURAS
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMensalidadesQuery {
    // Qualquer dia do mês serve; normalizamos para o dia 1
    #[schema(value_type = Option<String>, format = Date, example = "2026-09-01")]
    pub competence: Option<NaiveDate>,
}

// GET /api/mensalidades?competence=...
#[utoipa::path(
    get,
    path = "/api/mensalidades",
    tag = "Financeiro",
    responses(
        (status = 200, description = "Mensalidades do tenant", body = Vec<Mensalidade>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena"),
        ("competence" = Option<String>, Query, description = "Competência (YYYY-MM-DD, opcional)")
    )
)]
pub async fn list_mensalidades(
    State(app_state): State<AppState>,
    tenant: TenantContext,
    Query(query): Query<ListMensalidadesQuery>,
) -> Result<impl IntoResponse, AppError> {
    let competence = query
        .competence
        .map(crate::services::billing_service::competence_start);

    let mensalidades = app_state
        .billing_service
        .list_mensalidades(&app_state.db_pool, tenant.0, competence)
        .await?;

    Ok((StatusCode::OK, Json(mensalidades)))
}

// GET /api/invoices
#[utoipa::path(
    get,
    path = "/api/invoices",
    tag = "Financeiro",
    responses(
        (status = 200, description = "Faturas de assinatura do tenant", body = Vec<TenantInvoice>)
    ),
    params(
        ("x-tenant-id" = Uuid, Header, description = "ID da arena")
    )
)]
pub async fn list_invoices(
    State(app_state): State<AppState>,
    tenant: TenantContext,
) -> Result<impl IntoResponse, AppError> {
    let invoices = app_state
        .billing_service
        .list_tenant_invoices(&app_state.db_pool, tenant.0)
        .await?;

    Ok((StatusCode::OK, Json(invoices)))
}

// =============================================================================
//  ÁREA 3: WEBHOOK DO GATEWAY
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct WebhookPayment {
    #[schema(example = "pay_123456")]
    pub id: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PaymentWebhookPayload {
    #[schema(example = "PAYMENT_RECEIVED")]
    pub event: String,
    pub payment: WebhookPayment,
}

// POST /api/webhooks/payments
//
// Único caminho pelo qual payment_status vira Paid/Overdue/Cancelled depois
// da criação. Sempre devolve 200 para o gateway não reenfileirar eventos que
// não nos interessam.
#[utoipa::path(
    post,
    path = "/api/webhooks/payments",
    tag = "Financeiro",
    request_body = PaymentWebhookPayload,
    responses(
        (status = 200, description = "Evento processado")
    )
)]
pub async fn payment_webhook(
    State(app_state): State<AppState>,
    Json(payload): Json<PaymentWebhookPayload>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state
        .billing_service
        .apply_gateway_event(&app_state.db_pool, &payload.event, &payload.payment.id)
        .await?;

    Ok((StatusCode::OK, Json(json!({ "received": true, "updated": updated }))))
}
