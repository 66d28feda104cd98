//! Domain layer: entities, repository contracts and credit scoring

pub mod battery;
pub mod credit;
pub mod customer;
pub mod payment;
pub mod principal;
pub mod rental;
pub mod repositories;

pub use battery::{Battery, BatteryRepository, BatteryStatus, BatteryUpdate};
pub use credit::CreditPolicy;
pub use customer::{Customer, CustomerRepository, CustomerUpdate};
pub use payment::{Payment, PaymentFilter, PaymentMethod, PaymentReceipt, PaymentRepository};
pub use principal::{Principal, Role};
pub use rental::{Rental, RentalFilter, RentalRepository, RentalState};
pub use repositories::{DomainResult, RepositoryProvider};

pub use crate::shared::errors::DomainError;
