// src/models/billing.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use utoipa::ToSchema;

// --- Enums (Mapeando o Postgres) ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "contract_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Active,    // Gera mensalidade todo período
    Suspended, // Pausado (não gera cobrança)
    Cancelled, // Encerrado
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "payment_status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,   // Aguardando pagamento
    Paid,      // Quitada (via webhook do gateway)
    Overdue,   // Vencida
    Cancelled, // Cancelada
}

// --- Structs ---

// Contrato recorrente (plano/mensalista): dá direito a uma cobrança por
// competência. due_day aceita 1–28 na entrada; valores legados maiores são
// grampeados para o último dia do mês na hora de calcular o vencimento.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecurringContract {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    #[schema(example = "Maria da Silva")]
    pub customer_name: String,

    #[schema(example = "350.00")]
    pub monthly_value: Decimal,

    #[schema(example = 10)]
    pub due_day: i32,

    #[schema(example = "5.00")]
    pub discount_percent: Decimal,

    pub status: ContractStatus,

    pub created_at: Option<DateTime<Utc>>,
}

// Mensalidade: o documento de cobrança de um contrato em uma competência.
// Invariante de unicidade: no máximo uma por (contract_id, competence),
// garantida pela constraint UNIQUE no banco além da checagem do gerador.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Mensalidade {
    pub id: Uuid,

    #[schema(ignore)]
    pub tenant_id: Uuid,

    pub contract_id: Uuid,

    // Primeiro dia do mês de competência
    #[schema(value_type = String, format = Date, example = "2026-09-01")]
    pub competence: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2026-09-10")]
    pub due_date: NaiveDate,

    // Valores
    #[schema(example = "350.00")]
    pub base_value: Decimal,
    #[schema(example = "17.50")]
    pub discount: Decimal,
    // Acréscimos (multa/juros) entram depois, por processos separados
    #[schema(example = "0.00")]
    pub surcharge: Decimal,
    #[schema(example = "332.50")]
    pub final_value: Decimal,

    // Mensalidades não carregam referência externa de cobrança, então o
    // webhook de pagamentos (chaveado por gateway_charge_id) só alcança as
    // faturas da plataforma. Este status fica Pending até a mensalidade
    // ganhar uma cobrança no gateway ou um fluxo de baixa manual.
    pub payment_status: PaymentStatus,

    pub created_at: Option<DateTime<Utc>>,
}

// Fatura da assinatura da plataforma, uma por tenant por competência.
// Carrega os identificadores devolvidos pelo gateway na criação da cobrança.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TenantInvoice {
    pub id: Uuid,

    pub tenant_id: Uuid,

    #[schema(value_type = String, format = Date, example = "2026-09-01")]
    pub competence: NaiveDate,

    #[schema(value_type = String, format = Date, example = "2026-09-05")]
    pub due_date: NaiveDate,

    #[schema(example = "249.90")]
    pub value: Decimal,

    pub payment_status: PaymentStatus,

    // Dados do gateway, persistidos exatamente como recebidos
    pub gateway_charge_id: Option<String>,
    pub invoice_url: Option<String>,
    pub bank_slip_url: Option<String>,
    pub pix_payload: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}

// Contadores de uma execução do gerador. "skipped" = documento já existia
// para a competência (idempotência), não é erro.
#[derive(Debug, Clone, Copy, Default, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerationReport {
    pub total_candidates: u32,
    pub created: u32,
    pub skipped: u32,
}
