//! SeaORM implementation of RepositoryProvider

use sea_orm::DatabaseConnection;

use crate::domain::battery::BatteryRepository;
use crate::domain::customer::CustomerRepository;
use crate::domain::payment::PaymentRepository;
use crate::domain::rental::RentalRepository;
use crate::domain::repositories::RepositoryProvider;

use super::battery_repository::SeaOrmBatteryRepository;
use super::customer_repository::SeaOrmCustomerRepository;
use super::payment_repository::SeaOrmPaymentRepository;
use super::rental_repository::SeaOrmRentalRepository;

/// Unified repository provider backed by SeaORM.
///
/// Holds one connection pool and exposes per-aggregate repository accessors.
///
/// ```ignore
/// let repos = SeaOrmRepositoryProvider::new(db.clone());
/// let battery = repos.batteries().find_by_serial("SN-001").await?;
/// let history = repos.rentals().find_all(&RentalFilter::for_customer(id)).await?;
/// ```
pub struct SeaOrmRepositoryProvider {
    batteries: SeaOrmBatteryRepository,
    customers: SeaOrmCustomerRepository,
    rentals: SeaOrmRentalRepository,
    payments: SeaOrmPaymentRepository,
}

impl SeaOrmRepositoryProvider {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            batteries: SeaOrmBatteryRepository::new(db.clone()),
            customers: SeaOrmCustomerRepository::new(db.clone()),
            rentals: SeaOrmRentalRepository::new(db.clone()),
            payments: SeaOrmPaymentRepository::new(db),
        }
    }
}

impl RepositoryProvider for SeaOrmRepositoryProvider {
    fn batteries(&self) -> &dyn BatteryRepository {
        &self.batteries
    }

    fn customers(&self) -> &dyn CustomerRepository {
        &self.customers
    }

    fn rentals(&self) -> &dyn RentalRepository {
        &self.rentals
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }
}
