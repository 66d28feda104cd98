//! Rental aggregate
//!
//! Contains the Rental entity, listing filters, and repository interface.

pub mod model;
pub mod repository;

pub use model::{Rental, RentalFilter, RentalState};
pub use repository::RentalRepository;
