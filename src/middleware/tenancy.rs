// src/middleware/tenancy.rs

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

// O nome do nosso cabeçalho HTTP customizado
const TENANT_ID_HEADER: &str = "x-tenant-id";

// O extrator de tenancy: carrega o UUID da arena que o cliente quer aceder.
// Todas as rotas de dados exigem este cabeçalho; jobs e webhooks (que varrem
// todos os tenants) não o usam.
#[derive(Debug, Clone)]
pub struct TenantContext(pub Uuid);

// Rejeição simples com a mesma forma JSON dos erros da aplicação.
pub struct TenantRejection(String);

impl IntoResponse for TenantRejection {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": self.0 }))).into_response()
    }
}

impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = TenantRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        // Tenta ler o cabeçalho X-Tenant-ID
        let header_value = parts.headers.get(TENANT_ID_HEADER);

        match header_value {
            Some(value) => {
                // Tenta converter o valor do cabeçalho para uma string
                let value_str = value.to_str().map_err(|_| {
                    TenantRejection("Cabeçalho X-Tenant-ID contém caracteres inválidos.".to_string())
                })?;

                // Tenta converter a string para um UUID
                let tenant_id = Uuid::parse_str(value_str).map_err(|_| {
                    TenantRejection("Cabeçalho X-Tenant-ID inválido (não é um UUID).".to_string())
                })?;

                Ok(TenantContext(tenant_id))
            }
            None => Err(TenantRejection(
                "O cabeçalho X-Tenant-ID é obrigatório.".to_string(),
            )),
        }
    }
}
