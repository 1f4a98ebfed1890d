pub mod error;
pub mod timefmt;
