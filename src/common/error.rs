use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Conflito de horário na quadra. A mensagem enumera as janelas em choque
    // (ou o motivo do bloqueio) e é montada pelo serviço de agenda.
    #[error("Conflito de horário: {0}")]
    BookingConflict(String),

    #[error("Tenant não encontrado")]
    TenantNotFound,

    #[error("Contrato não encontrado")]
    ContractNotFound,

    #[error("Reserva não encontrada")]
    ReservationNotFound,

    #[error("Bloqueio não encontrado")]
    BlockNotFound,

    // Falha reportada pelo gateway de pagamento (resposta não-2xx ou payload
    // inesperado). Dentro dos jobs em lote ela é tratada item a item.
    #[error("Erro do gateway de pagamento: {0}")]
    Gateway(String),

    #[error("Erro de comunicação com o gateway: {0}")]
    HttpClient(#[from] reqwest::Error),

    // Variante para erros de banco de dados (sqlx)
    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    // `anyhow::Error` é ótimo para capturar o contexto do erro.
    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors.iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (StatusCode::BAD_REQUEST, body).into_response();
            }

            // A mensagem do conflito é dinâmica, então devolvemos ela direto.
            AppError::BookingConflict(message) => {
                let body = Json(json!({ "error": message }));
                return (StatusCode::CONFLICT, body).into_response();
            }

            AppError::TenantNotFound => (StatusCode::NOT_FOUND, "Tenant não encontrado."),
            AppError::ContractNotFound => (StatusCode::NOT_FOUND, "Contrato não encontrado."),
            AppError::ReservationNotFound => (StatusCode::NOT_FOUND, "Reserva não encontrada."),
            AppError::BlockNotFound => (StatusCode::NOT_FOUND, "Bloqueio não encontrado."),

            e @ (AppError::Gateway(_) | AppError::HttpClient(_)) => {
                tracing::error!("Falha no gateway de pagamento: {}", e);
                (StatusCode::BAD_GATEWAY, "Falha na comunicação com o gateway de pagamento.")
            }

            // Todos os outros erros (DatabaseError, InternalServerError) viram 500.
            // O `tracing` vai logar a mensagem detalhada que `thiserror` nos deu.
            ref e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        };

        // Resposta padrão para erros simples que só têm uma mensagem.
        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}
