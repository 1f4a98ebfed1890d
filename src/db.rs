pub mod tenancy_repo;
pub use tenancy_repo::TenantRepository;
pub mod scheduling_repo;
pub use scheduling_repo::SchedulingRepository;
pub mod billing_repo;
pub use billing_repo::BillingRepository;
