// src/handlers/tenancy.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    models::tenancy::Tenant,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTenantPayload {
    #[validate(length(min = 2, message = "O nome deve ter no mínimo 2 caracteres"))]
    #[schema(example = "Arena Beira Rio")]
    pub name: String,

    #[validate(email(message = "E-mail inválido"))]
    #[schema(example = "contato@arenabeirario.com.br")]
    pub email: String,

    #[schema(example = "12345678000190")]
    pub document_number: Option<String>,

    #[schema(example = "249.90")]
    pub subscription_value: Decimal,
}

// POST /api/tenants
#[utoipa::path(
    post,
    path = "/api/tenants",
    tag = "Tenancy",
    request_body = CreateTenantPayload,
    responses(
        (status = 201, description = "Tenant criado", body = Tenant),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_tenant(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTenantPayload>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let tenant = app_state
        .tenancy_service
        .create_tenant(
            &app_state.db_pool,
            &payload.name,
            &payload.email,
            payload.document_number.as_deref(),
            payload.subscription_value,
        )
        .await?;

    Ok((StatusCode::CREATED, Json(tenant)))
}

// GET /api/tenants
#[utoipa::path(
    get,
    path = "/api/tenants",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Lista de tenants", body = Vec<Tenant>)
    )
)]
pub async fn list_tenants(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let tenants = app_state.tenancy_service.list_tenants(&app_state.db_pool).await?;

    Ok((StatusCode::OK, Json(tenants)))
}

// GET /api/tenants/{id}
#[utoipa::path(
    get,
    path = "/api/tenants/{id}",
    tag = "Tenancy",
    responses(
        (status = 200, description = "Tenant", body = Tenant),
        (status = 404, description = "Tenant não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do tenant")
    )
)]
pub async fn get_tenant(
    State(app_state): State<AppState>,
    Path(tenant_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tenant = app_state
        .tenancy_service
        .get_tenant(&app_state.db_pool, tenant_id)
        .await?;

    Ok((StatusCode::OK, Json(tenant)))
}
