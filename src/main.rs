// src/main.rs

use axum::{
    routing::{delete, get, post},
    Router,
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

// Declaração dos nossos módulos
mod common;
mod config;
mod db;
mod docs;
mod gateway;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

#[tokio::main]
async fn main() {
    // Inicializa o logger
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Roda as migrações do SQLx na inicialização
    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let tenancy_routes = Router::new()
        .route("/"
               ,post(handlers::tenancy::create_tenant)
               .get(handlers::tenancy::list_tenants)
        )
        .route("/{id}", get(handlers::tenancy::get_tenant));

    let court_routes = Router::new()
        .route("/"
               ,post(handlers::scheduling::create_court)
               .get(handlers::scheduling::list_courts)
        );

    let reservation_routes = Router::new()
        .route("/"
               ,post(handlers::scheduling::create_reservation)
               .get(handlers::scheduling::list_reservations)
        )
        .route("/check", post(handlers::scheduling::check_availability))
        .route("/{id}/cancel", post(handlers::scheduling::cancel_reservation));

    let block_routes = Router::new()
        .route("/"
               ,post(handlers::scheduling::create_block)
               .get(handlers::scheduling::list_blocks)
        )
        .route("/{id}", delete(handlers::scheduling::delete_block));

    let billing_routes = Router::new()
        .route("/contracts"
               ,post(handlers::billing::create_contract)
               .get(handlers::billing::list_contracts)
        )
        .route("/contracts/{id}", get(handlers::billing::get_contract))
        .route("/mensalidades", get(handlers::billing::list_mensalidades))
        .route("/invoices", get(handlers::billing::list_invoices));

    // Rotinas agendadas (disparo externo via cron HTTP) e webhook do gateway:
    // rotas sem tenancy, varrem todos os tenants.
    let job_routes = Router::new()
        .route("/mensalidades", post(handlers::jobs::run_mensalidades))
        .route("/invoices", post(handlers::jobs::run_tenant_invoices));

    // Combina tudo no router principal
    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/tenants", tenancy_routes)
        .nest("/api/courts", court_routes)
        .nest("/api/reservations", reservation_routes)
        .nest("/api/blocks", block_routes)
        .nest("/api", billing_routes)
        .nest("/api/jobs", job_routes)
        .route("/api/webhooks/payments", post(handlers::billing::payment_webhook))
        .with_state(app_state);

    // Inicia o servidor
    let addr = "0.0.0.0:3000";
    let listener = TcpListener::bind(addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr().unwrap());
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
