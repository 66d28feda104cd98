//! Database entities module

pub mod battery;
pub mod customer;
pub mod payment;
pub mod rental;

pub use battery::Entity as Battery;
pub use customer::Entity as Customer;
pub use payment::Entity as Payment;
pub use rental::Entity as Rental;
