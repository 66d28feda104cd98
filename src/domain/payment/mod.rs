//! Payment aggregate

pub mod model;
pub mod repository;

pub use model::{Payment, PaymentFilter, PaymentMethod, PaymentReceipt};
pub use repository::PaymentRepository;
