// src/services/tenancy_service.rs

use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{common::error::AppError, db::TenantRepository, models::tenancy::Tenant};

#[derive(Clone)]
pub struct TenancyService {
    repo: TenantRepository,
}

impl TenancyService {
    pub fn new(repo: TenantRepository) -> Self {
        Self { repo }
    }

    pub async fn create_tenant(
        &self,
        pool: &PgPool,
        name: &str,
        email: &str,
        document_number: Option<&str>,
        subscription_value: Decimal,
    ) -> Result<Tenant, AppError> {
        self.repo
            .create_tenant(pool, name, email, document_number, subscription_value)
            .await
    }

    pub async fn list_tenants(&self, pool: &PgPool) -> Result<Vec<Tenant>, AppError> {
        self.repo.list_tenants(pool).await
    }

    pub async fn get_tenant(&self, pool: &PgPool, tenant_id: Uuid) -> Result<Tenant, AppError> {
        self.repo
            .get_tenant(pool, tenant_id)
            .await?
            .ok_or(AppError::TenantNotFound)
    }
}
