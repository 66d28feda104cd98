//! Application services

mod credit_rating;
mod customer;
mod dashboard;
mod inventory;
mod payment;
mod rental;

pub use credit_rating::CreditRatingService;
pub use customer::{CustomerDetail, CustomerService, NewCustomer};
pub use dashboard::{
    today, CustomerRentalCount, DashboardService, DashboardSummary, Earnings, InventoryCounts,
};
pub use inventory::{InventoryService, NewBattery};
pub use payment::{NewPayment, PaymentService};
pub use rental::{NewRental, RentalDetail, RentalService, ReturnBattery};
