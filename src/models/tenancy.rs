// src/models/tenancy.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use sqlx::FromRow;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use utoipa::ToSchema;

// Um tenant é uma arena (estabelecimento) com dados isolados.
// O isolamento é garantido filtrando `tenant_id` em todas as queries.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    #[schema(example = "Arena Beira Rio")]
    pub name: String,

    #[schema(example = "contato@arenabeirario.com.br")]
    pub email: String,

    // CPF/CNPJ usado no cadastro do pagador junto ao gateway
    #[schema(example = "12345678000190")]
    pub document_number: Option<String>,

    // Valor da assinatura mensal da plataforma cobrada deste tenant
    #[schema(example = "249.90")]
    pub subscription_value: Decimal,

    // Tenants com billing_active = false ficam fora da geração de faturas
    pub billing_active: bool,

    // Identificador do pagador no gateway, preenchido na primeira cobrança
    pub gateway_customer_id: Option<String>,

    pub created_at: Option<DateTime<Utc>>,
}
