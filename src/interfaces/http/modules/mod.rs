//! Feature modules, one per resource

pub mod batteries;
pub mod customers;
pub mod dashboard;
pub mod health;
pub mod metrics;
pub mod payments;
pub mod rentals;
pub mod request_id;
