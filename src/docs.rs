// src/docs.rs

use utoipa::OpenApi;
use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Tenancy ---
        handlers::tenancy::create_tenant,
        handlers::tenancy::list_tenants,
        handlers::tenancy::get_tenant,

        // --- Agenda ---
        handlers::scheduling::create_court,
        handlers::scheduling::list_courts,
        handlers::scheduling::create_reservation,
        handlers::scheduling::check_availability,
        handlers::scheduling::list_reservations,
        handlers::scheduling::cancel_reservation,
        handlers::scheduling::create_block,
        handlers::scheduling::list_blocks,
        handlers::scheduling::delete_block,

        // --- Financeiro ---
        handlers::billing::create_contract,
        handlers::billing::get_contract,
        handlers::billing::list_contracts,
        handlers::billing::list_mensalidades,
        handlers::billing::list_invoices,
        handlers::billing::payment_webhook,

        // --- Jobs ---
        handlers::jobs::run_mensalidades,
        handlers::jobs::run_tenant_invoices,
    ),
    components(
        schemas(
            models::tenancy::Tenant,
            models::scheduling::Court,
            models::scheduling::Reservation,
            models::scheduling::ReservationStatus,
            models::scheduling::CourtBlock,
            models::scheduling::ConflictCheck,
            models::billing::RecurringContract,
            models::billing::ContractStatus,
            models::billing::Mensalidade,
            models::billing::TenantInvoice,
            models::billing::PaymentStatus,
            models::billing::GenerationReport,
            handlers::tenancy::CreateTenantPayload,
            handlers::scheduling::CreateCourtPayload,
            handlers::scheduling::CreateReservationPayload,
            handlers::scheduling::CheckAvailabilityPayload,
            handlers::scheduling::CreateBlockPayload,
            handlers::billing::CreateContractPayload,
            handlers::billing::PaymentWebhookPayload,
            handlers::billing::WebhookPayment,
        )
    ),
    tags(
        (name = "Tenancy", description = "Gestão de arenas (tenants)"),
        (name = "Agenda", description = "Quadras, reservas e bloqueios"),
        (name = "Financeiro", description = "Contratos, mensalidades e faturas"),
        (name = "Jobs", description = "Rotinas agendadas de faturamento")
    )
)]
pub struct ApiDoc;
