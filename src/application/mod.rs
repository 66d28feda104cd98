//! Application layer: use cases over the domain repositories

pub mod services;

use std::sync::Arc;

use crate::domain::credit::CreditPolicy;
use crate::domain::RepositoryProvider;

pub use services::{
    today, CreditRatingService, CustomerDetail, CustomerRentalCount, CustomerService,
    DashboardService, DashboardSummary, Earnings, InventoryCounts, InventoryService, NewBattery,
    NewCustomer, NewPayment, NewRental, PaymentService, RentalDetail, RentalService,
    ReturnBattery,
};

/// Every service, wired to one repository provider
#[derive(Clone)]
pub struct AppServices {
    pub inventory: Arc<InventoryService>,
    pub customers: Arc<CustomerService>,
    pub rentals: Arc<RentalService>,
    pub payments: Arc<PaymentService>,
    pub credit: Arc<CreditRatingService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        policy: CreditPolicy,
        default_credit_rating: u8,
    ) -> Self {
        let credit = Arc::new(CreditRatingService::new(repos.clone(), policy));
        Self {
            inventory: Arc::new(InventoryService::new(repos.clone())),
            customers: Arc::new(CustomerService::new(
                repos.clone(),
                credit.clone(),
                default_credit_rating,
            )),
            rentals: Arc::new(RentalService::new(repos.clone(), credit.clone())),
            payments: Arc::new(PaymentService::new(repos.clone(), credit.clone())),
            dashboard: Arc::new(DashboardService::new(repos)),
            credit,
        }
    }
}
