pub mod tenancy_service;
pub mod scheduling_service;
pub mod billing_service;
