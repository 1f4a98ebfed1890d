// src/config.rs

use std::{env, sync::Arc, time::Duration};

use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{BillingRepository, SchedulingRepository, TenantRepository},
    gateway::{AsaasGateway, PaymentGateway},
    services::{
        billing_service::BillingService, scheduling_service::SchedulingService,
        tenancy_service::TenancyService,
    },
};

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub tenancy_service: TenancyService,
    pub scheduling_service: SchedulingService,
    pub billing_service: BillingService,
    pub gateway: Arc<dyn PaymentGateway>,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let asaas_api_key = env::var("ASAAS_API_KEY").expect("ASAAS_API_KEY deve ser definida");
        let asaas_base_url = env::var("ASAAS_BASE_URL")
            .unwrap_or_else(|_| "https://sandbox.asaas.com/api".to_string());

        // Conecta ao banco de dados, usando '?' para propagar erros
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let tenant_repo = TenantRepository::new(db_pool.clone());
        let scheduling_repo = SchedulingRepository::new(db_pool.clone());
        let billing_repo = BillingRepository::new(db_pool.clone());

        let tenancy_service = TenancyService::new(tenant_repo.clone());
        let scheduling_service = SchedulingService::new(scheduling_repo);
        let billing_service = BillingService::new(billing_repo, tenant_repo);

        let gateway: Arc<dyn PaymentGateway> =
            Arc::new(AsaasGateway::new(asaas_base_url, asaas_api_key));

        Ok(Self {
            db_pool,
            tenancy_service,
            scheduling_service,
            billing_service,
            gateway,
        })
    }
}
