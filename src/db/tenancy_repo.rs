// src/db/tenancy_repo.rs

use sqlx::{PgPool, Postgres, Executor};
use uuid::Uuid;
use rust_decimal::Decimal;
use crate::{common::error::AppError, models::tenancy::Tenant};

#[derive(Clone)]
pub struct TenantRepository {
    pool: PgPool,
}

impl TenantRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Cria um novo tenant (arena) na base de dados.
    pub async fn create_tenant<'e, E>(
        &self,
        executor: E,
        name: &str,
        email: &str,
        document_number: Option<&str>,
        subscription_value: Decimal,
    ) -> Result<Tenant, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>(
            r#"
            INSERT INTO tenants (name, email, document_number, subscription_value)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(document_number)
        .bind(subscription_value)
        .fetch_one(executor)
        .await?;

        Ok(tenant)
    }

    pub async fn list_tenants<'e, E>(&self, executor: E) -> Result<Vec<Tenant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenants = sqlx::query_as::<_, Tenant>(
            "SELECT * FROM tenants ORDER BY name ASC",
        )
        .fetch_all(executor)
        .await?;

        Ok(tenants)
    }

    pub async fn get_tenant<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
    ) -> Result<Option<Tenant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenant = sqlx::query_as::<_, Tenant>("SELECT * FROM tenants WHERE id = $1")
            .bind(tenant_id)
            .fetch_optional(executor)
            .await?;

        Ok(tenant)
    }

    /// Tenants candidatos à fatura mensal da plataforma.
    pub async fn list_billable_tenants<'e, E>(&self, executor: E) -> Result<Vec<Tenant>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let tenants = sqlx::query_as::<_, Tenant>(
            r#"
            SELECT * FROM tenants
            WHERE billing_active = TRUE AND subscription_value > 0
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(executor)
        .await?;

        Ok(tenants)
    }

    /// Grava o id do pagador devolvido pelo gateway na primeira cobrança.
    pub async fn set_gateway_customer_id<'e, E>(
        &self,
        executor: E,
        tenant_id: Uuid,
        gateway_customer_id: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("UPDATE tenants SET gateway_customer_id = $2 WHERE id = $1")
            .bind(tenant_id)
            .bind(gateway_customer_id)
            .execute(executor)
            .await?;

        Ok(())
    }
}
