// src/db/billing_repo.rs

use sqlx::{PgPool, Postgres, Executor};
use uuid::Uuid;
use rust_decimal::Decimal;
use chrono::NaiveDate;
use crate::{
    common::error::AppError,
    models::billing::{
        ContractStatus, Mensalidade, PaymentStatus, RecurringContract, TenantInvoice,
    },
};

#[derive(Clone)]
pub struct BillingRepository {
    pool: PgPool,
}

impl BillingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CONTRATOS RECORRENTES
    // =========================================================================

    pub async fn create_contract<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        customer_name: &str,
        monthly_value: Decimal,
        due_day: i32,
        discount_percent: Decimal,
    ) -> Result<RecurringContract, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contract = sqlx::query_as::<_, RecurringContract>(
            r#"
            INSERT INTO recurring_contracts (tenant_id, customer_name, monthly_value, due_day, discount_percent)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(customer_name)
        .bind(monthly_value)
        .bind(due_day)
        .bind(discount_percent)
        .fetch_one(executor)
        .await?;

        Ok(contract)
    }

    pub async fn get_contract<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        contract_id: Uuid,
    ) -> Result<Option<RecurringContract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contract = sqlx::query_as::<_, RecurringContract>(
            "SELECT * FROM recurring_contracts WHERE tenant_id = $1 AND id = $2",
        )
        .bind(tenant_id)
        .bind(contract_id)
        .fetch_optional(executor)
        .await?;

        Ok(contract)
    }

    pub async fn list_contracts<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<RecurringContract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contracts = sqlx::query_as::<_, RecurringContract>(
            "SELECT * FROM recurring_contracts WHERE tenant_id = $1 ORDER BY customer_name ASC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(contracts)
    }

    /// Todos os contratos ativos, de todos os tenants. O job diário filtra
    /// em memória quais vencem na data de referência (o grampo de due_day
    /// para meses curtos não cabe num WHERE simples).
    pub async fn list_active_contracts<'e, E>(
        &self,
        executor: E,
    ) -> Result<Vec<RecurringContract>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let contracts = sqlx::query_as::<_, RecurringContract>(
            "SELECT * FROM recurring_contracts WHERE status = $1 ORDER BY created_at ASC",
        )
        .bind(ContractStatus::Active)
        .fetch_all(executor)
        .await?;

        Ok(contracts)
    }

    // =========================================================================
    //  MENSALIDADES (por contrato)
    // =========================================================================

    /// Checagem de idempotência: já existe mensalidade desse contrato
    /// nessa competência?
    pub async fn mensalidade_exists<'e, E>(
        &self,
        executor: E,
        contract_id: Uuid,
        competence: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM mensalidades
                WHERE contract_id = $1 AND competence = $2
            )
            "#,
        )
        .bind(contract_id)
        .bind(competence)
        .fetch_one(executor)
        .await?;

        Ok(exists.0)
    }

    pub async fn insert_mensalidade<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        contract_id: Uuid,
        competence: NaiveDate,
        due_date: NaiveDate,
        base_value: Decimal,
        discount: Decimal,
        surcharge: Decimal,
        final_value: Decimal,
    ) -> Result<Mensalidade, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mensalidade = sqlx::query_as::<_, Mensalidade>(
            r#"
            INSERT INTO mensalidades (
                tenant_id, contract_id, competence, due_date,
                base_value, discount, surcharge, final_value, payment_status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(contract_id)
        .bind(competence)
        .bind(due_date)
        .bind(base_value)
        .bind(discount)
        .bind(surcharge)
        .bind(final_value)
        .bind(PaymentStatus::Pending)
        .fetch_one(executor)
        .await?;

        Ok(mensalidade)
    }

    pub async fn list_mensalidades<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        competence: Option<NaiveDate>,
    ) -> Result<Vec<Mensalidade>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mensalidades = sqlx::query_as::<_, Mensalidade>(
            r#"
            SELECT * FROM mensalidades
            WHERE tenant_id = $1
              AND ($2::date IS NULL OR competence = $2)
            ORDER BY due_date ASC
            "#,
        )
        .bind(tenant_id)
        .bind(competence)
        .fetch_all(executor)
        .await?;

        Ok(mensalidades)
    }

    // =========================================================================
    //  FATURAS DA PLATAFORMA (por tenant)
    // =========================================================================

    pub async fn invoice_exists<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        competence: NaiveDate,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let exists: (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM tenant_invoices
                WHERE tenant_id = $1 AND competence = $2
            )
            "#,
        )
        .bind(tenant_id)
        .bind(competence)
        .fetch_one(executor)
        .await?;

        Ok(exists.0)
    }

    pub async fn insert_tenant_invoice<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        competence: NaiveDate,
        due_date: NaiveDate,
        value: Decimal,
        gateway_charge_id: &str,
        invoice_url: Option<&str>,
        bank_slip_url: Option<&str>,
        pix_payload: Option<&str>,
    ) -> Result<TenantInvoice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoice = sqlx::query_as::<_, TenantInvoice>(
            r#"
            INSERT INTO tenant_invoices (
                tenant_id, competence, due_date, value, payment_status,
                gateway_charge_id, invoice_url, bank_slip_url, pix_payload
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(tenant_id)
        .bind(competence)
        .bind(due_date)
        .bind(value)
        .bind(PaymentStatus::Pending)
        .bind(gateway_charge_id)
        .bind(invoice_url)
        .bind(bank_slip_url)
        .bind(pix_payload)
        .fetch_one(executor)
        .await?;

        Ok(invoice)
    }

    pub async fn list_tenant_invoices<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Vec<TenantInvoice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let invoices = sqlx::query_as::<_, TenantInvoice>(
            "SELECT * FROM tenant_invoices WHERE tenant_id = $1 ORDER BY competence DESC",
        )
        .bind(tenant_id)
        .fetch_all(executor)
        .await?;

        Ok(invoices)
    }

    /// Transição de status disparada pelo webhook do gateway, chaveada pela
    /// referência externa da cobrança. Devolve quantas linhas mudaram (zero
    /// significa cobrança desconhecida).
    pub async fn update_payment_status_by_charge<'e, E>(
        &self,
        executor: E,
        gateway_charge_id: &str,
        status: PaymentStatus,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            "UPDATE tenant_invoices SET payment_status = $2 WHERE gateway_charge_id = $1",
        )
        .bind(gateway_charge_id)
        .bind(status)
        .execute(executor)
        .await?;

        Ok(result.rows_affected())
    }
}
