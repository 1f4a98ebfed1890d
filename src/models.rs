pub mod tenancy;
pub mod scheduling;
pub mod billing;
