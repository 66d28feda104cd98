//! Customer aggregate

pub mod model;
pub mod repository;

pub use model::{Customer, CustomerUpdate, DEFAULT_CREDIT_RATING, MAX_CREDIT_RATING};
pub use repository::CustomerRepository;
