// src/models/scheduling.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use utoipa::ToSchema;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Pending,   // Aguardando confirmação
    Confirmed, // Confirmada
    Cancelled, // Cancelada (fica fora da checagem de conflito)
}

// --- Structs ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Quadra 1 - Society")]
    pub name: String,

    #[schema(example = "futebol_society")]
    pub sport: Option<String>,

    #[schema(example = true)]
    pub is_active: Option<bool>,

    pub created_at: Option<DateTime<Utc>>,
}

// Uma reserva nunca é apagada fisicamente: o cancelamento
// só muda o status (soft delete via ReservationStatus::Cancelled).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub court_id: Uuid,

    #[schema(example = "João Pereira")]
    pub customer_name: String,

    #[schema(value_type = String, format = Date, example = "2026-09-12")]
    pub date: NaiveDate,

    // Janela semiaberta [start_time, end_time): invariante start_time < end_time
    #[serde(with = "crate::common::timefmt")]
    #[schema(value_type = String, example = "10:00")]
    pub start_time: NaiveTime,
    #[serde(with = "crate::common::timefmt")]
    #[schema(value_type = String, example = "11:00")]
    pub end_time: NaiveTime,

    pub status: ReservationStatus,

    pub created_at: Option<DateTime<Utc>>,
}

// Janela de indisponibilidade da quadra (manutenção, evento fechado etc).
// Imutável depois de criada; só pode ser removida.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CourtBlock {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub court_id: Uuid,

    #[schema(value_type = String, example = "2026-09-12T14:00:00")]
    pub starts_at: NaiveDateTime,
    #[schema(value_type = String, example = "2026-09-12T15:00:00")]
    pub ends_at: NaiveDateTime,

    #[schema(example = "Manutenção do gramado")]
    pub reason: String,
}

// Resultado da validação de disponibilidade. Conflito é dado, não exceção:
// o chamador decide se vira rejeição HTTP (no caminho de escrita) ou
// resposta informativa (no endpoint de pré-checagem).
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConflictCheck {
    pub has_conflict: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "Horário indisponível. Conflito com: 10:00 - 11:00")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub conflicting_reservations: Vec<Reservation>,
}

impl ConflictCheck {
    pub fn clear() -> Self {
        Self {
            has_conflict: false,
            message: None,
            conflicting_reservations: Vec::new(),
        }
    }
}
