//! In-memory repository provider for development and testing
//!
//! Rows live in `DashMap`s. Compound writes (rental open/close, payment
//! record, deletes guarded by references) take a single async write lock so
//! their check-then-write sequence is atomic, mirroring what the SeaORM
//! repositories get from a database transaction.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::Mutex;

use crate::domain::battery::{Battery, BatteryRepository, BatteryStatus};
use crate::domain::customer::{Customer, CustomerRepository, MAX_CREDIT_RATING};
use crate::domain::payment::{Payment, PaymentFilter, PaymentReceipt, PaymentRepository};
use crate::domain::rental::{Rental, RentalFilter, RentalRepository};
use crate::domain::repositories::RepositoryProvider;
use crate::domain::{DomainError, DomainResult};

#[derive(Default)]
struct Tables {
    batteries: DashMap<String, Battery>,
    customers: DashMap<String, Customer>,
    rentals: DashMap<String, Rental>,
    payments: DashMap<String, Payment>,
    write_lock: Mutex<()>,
}

impl Tables {
    fn rental_count(&self, pred: impl Fn(&Rental) -> bool) -> usize {
        self.rentals.iter().filter(|r| pred(r.value())).count()
    }
}

/// `RepositoryProvider` backed by process memory
pub struct InMemoryRepositoryProvider {
    batteries: MemoryBatteryRepository,
    customers: MemoryCustomerRepository,
    rentals: MemoryRentalRepository,
    payments: MemoryPaymentRepository,
}

impl InMemoryRepositoryProvider {
    pub fn new() -> Self {
        let tables = Arc::new(Tables::default());
        Self {
            batteries: MemoryBatteryRepository(tables.clone()),
            customers: MemoryCustomerRepository(tables.clone()),
            rentals: MemoryRentalRepository(tables.clone()),
            payments: MemoryPaymentRepository(tables),
        }
    }
}

impl Default for InMemoryRepositoryProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositoryProvider {
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

// ── Batteries ───────────────────────────────────────────────────

struct MemoryBatteryRepository(Arc<Tables>);

#[async_trait]
impl BatteryRepository for MemoryBatteryRepository {
    async fn save(&self, battery: Battery) -> DomainResult<Battery> {
        let _guard = self.0.write_lock.lock().await;
        if self
            .0
            .batteries
            .iter()
            .any(|b| b.serial_number == battery.serial_number)
        {
            return Err(DomainError::Conflict(format!(
                "serial number {} already exists",
                battery.serial_number
            )));
        }
        self.0.batteries.insert(battery.id.clone(), battery.clone());
        Ok(battery)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Battery>> {
        Ok(self.0.batteries.get(id).map(|b| b.clone()))
    }

    async fn find_by_serial(&self, serial_number: &str) -> DomainResult<Option<Battery>> {
        Ok(self
            .0
            .batteries
            .iter()
            .find(|b| b.serial_number == serial_number)
            .map(|b| b.value().clone()))
    }

    async fn find_all(&self, status: Option<BatteryStatus>) -> DomainResult<Vec<Battery>> {
        let mut all: Vec<Battery> = self
            .0
            .batteries
            .iter()
            .filter(|b| status.map_or(true, |s| b.status == s))
            .map(|b| b.value().clone())
            .collect();
        all.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
        Ok(all)
    }

    async fn update(&self, mut battery: Battery) -> DomainResult<Battery> {
        let _guard = self.0.write_lock.lock().await;
        let Some(stored) = self.0.batteries.get(&battery.id).map(|b| b.clone()) else {
            return Err(DomainError::not_found("Battery", battery.id));
        };
        stored.check_manual_status_change(battery.status)?;
        if self
            .0
            .batteries
            .iter()
            .any(|b| b.id != battery.id && b.serial_number == battery.serial_number)
        {
            return Err(DomainError::Conflict(format!(
                "serial number {} already exists",
                battery.serial_number
            )));
        }
        battery.created_at = stored.created_at;
        battery.updated_at = Utc::now();
        self.0.batteries.insert(battery.id.clone(), battery.clone());
        Ok(battery)
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let _guard = self.0.write_lock.lock().await;
        let rentals = self.0.rental_count(|r| r.battery_id == id);
        if rentals > 0 {
            return Err(DomainError::Conflict(format!(
                "battery {} has {} rental(s) and cannot be deleted",
                id, rentals
            )));
        }
        self.0
            .batteries
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Battery", id))
    }
}

// ── Customers ───────────────────────────────────────────────────

struct MemoryCustomerRepository(Arc<Tables>);

impl MemoryCustomerRepository {
    fn phone_taken(&self, phone_number: &str, except_id: Option<&str>) -> bool {
        self.0
            .customers
            .iter()
            .any(|c| c.phone_number == phone_number && Some(c.id.as_str()) != except_id)
    }
}

#[async_trait]
impl CustomerRepository for MemoryCustomerRepository {
    async fn save(&self, customer: Customer) -> DomainResult<Customer> {
        let _guard = self.0.write_lock.lock().await;
        if self.phone_taken(&customer.phone_number, None) {
            return Err(DomainError::Conflict(format!(
                "phone number {} already exists",
                customer.phone_number
            )));
        }
        self.0.customers.insert(customer.id.clone(), customer.clone());
        Ok(customer)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Customer>> {
        Ok(self.0.customers.get(id).map(|c| c.clone()))
    }

    async fn find_by_phone(&self, phone_number: &str) -> DomainResult<Option<Customer>> {
        Ok(self
            .0
            .customers
            .iter()
            .find(|c| c.phone_number == phone_number)
            .map(|c| c.value().clone()))
    }

    async fn find_all(&self, search: Option<&str>) -> DomainResult<Vec<Customer>> {
        let needle = search.map(str::trim).filter(|s| !s.is_empty());
        let mut all: Vec<Customer> = self
            .0
            .customers
            .iter()
            .filter(|c| needle.map_or(true, |n| c.matches(n)))
            .map(|c| c.value().clone())
            .collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update(&self, customer: Customer) -> DomainResult<Customer> {
        let _guard = self.0.write_lock.lock().await;
        let Some(existing) = self.0.customers.get(&customer.id).map(|c| c.clone()) else {
            return Err(DomainError::not_found("Customer", customer.id));
        };
        if self.phone_taken(&customer.phone_number, Some(&customer.id)) {
            return Err(DomainError::Conflict(format!(
                "phone number {} already exists",
                customer.phone_number
            )));
        }
        let updated = Customer {
            credit_rating: existing.credit_rating,
            created_at: existing.created_at,
            updated_at: Utc::now(),
            ..customer
        };
        self.0.customers.insert(updated.id.clone(), updated.clone());
        Ok(updated)
    }

    async fn update_credit_rating(&self, id: &str, rating: u8) -> DomainResult<()> {
        let mut customer = self
            .0
            .customers
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found("Customer", id))?;
        customer.credit_rating = rating.min(MAX_CREDIT_RATING);
        customer.updated_at = Utc::now();
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let _guard = self.0.write_lock.lock().await;
        let rentals = self.0.rental_count(|r| r.customer_id == id);
        if rentals > 0 {
            return Err(DomainError::Conflict(format!(
                "customer {} has {} rental(s) and cannot be deleted",
                id, rentals
            )));
        }
        self.0
            .customers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| DomainError::not_found("Customer", id))
    }
}

// ── Rentals ─────────────────────────────────────────────────────

struct MemoryRentalRepository(Arc<Tables>);

#[async_trait]
impl RentalRepository for MemoryRentalRepository {
    async fn open(&self, rental: Rental) -> DomainResult<Rental> {
        let _guard = self.0.write_lock.lock().await;
        {
            let mut battery = self
                .0
                .batteries
                .get_mut(&rental.battery_id)
                .ok_or_else(|| DomainError::not_found("Battery", rental.battery_id.clone()))?;
            if battery.status != BatteryStatus::Available {
                return Err(DomainError::Conflict(format!(
                    "battery {} is not available",
                    rental.battery_id
                )));
            }
            battery.status = BatteryStatus::Rented;
            battery.updated_at = Utc::now();
        }
        self.0.rentals.insert(rental.id.clone(), rental.clone());
        Ok(rental)
    }

    async fn close(
        &self,
        id: &str,
        return_date: DateTime<Utc>,
        is_paid: Option<bool>,
    ) -> DomainResult<Rental> {
        let _guard = self.0.write_lock.lock().await;
        let closed = {
            let mut rental = self
                .0
                .rentals
                .get_mut(id)
                .ok_or_else(|| DomainError::not_found("Rental", id))?;
            if !rental.is_open() {
                return Err(DomainError::Conflict(format!(
                    "rental {} has already been returned",
                    id
                )));
            }
            rental.close(return_date, is_paid);
            rental.clone()
        };
        if let Some(mut battery) = self.0.batteries.get_mut(&closed.battery_id) {
            battery.status = BatteryStatus::Available;
            battery.updated_at = Utc::now();
        }
        Ok(closed)
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Rental>> {
        Ok(self.0.rentals.get(id).map(|r| r.clone()))
    }

    async fn find_all(&self, filter: &RentalFilter) -> DomainResult<Vec<Rental>> {
        let mut all: Vec<Rental> = self
            .0
            .rentals
            .iter()
            .filter(|r| filter.matches(r.value()))
            .map(|r| r.value().clone())
            .collect();
        all.sort_by(|a, b| b.rent_date.cmp(&a.rent_date));
        Ok(all)
    }
}

// ── Payments ────────────────────────────────────────────────────

struct MemoryPaymentRepository(Arc<Tables>);

#[async_trait]
impl PaymentRepository for MemoryPaymentRepository {
    async fn record(&self, payment: Payment) -> DomainResult<PaymentReceipt> {
        let _guard = self.0.write_lock.lock().await;
        let mut rental = self
            .0
            .rentals
            .get_mut(&payment.rental_id)
            .ok_or_else(|| DomainError::not_found("Rental", payment.rental_id.clone()))?;

        self.0.payments.insert(payment.id.clone(), payment.clone());
        let total_paid: i64 = self
            .0
            .payments
            .iter()
            .filter(|p| p.rental_id == payment.rental_id)
            .map(|p| p.amount)
            .sum();

        if !rental.is_paid && total_paid >= rental.rental_price {
            rental.is_paid = true;
            rental.updated_at = Utc::now();
        }

        Ok(PaymentReceipt {
            total_paid,
            rental_paid: rental.is_paid,
            balance_due: rental.balance_due(total_paid),
            payment,
        })
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Payment>> {
        Ok(self.0.payments.get(id).map(|p| p.clone()))
    }

    async fn find_all(&self, filter: &PaymentFilter) -> DomainResult<Vec<Payment>> {
        let mut all: Vec<Payment> = self
            .0
            .payments
            .iter()
            .filter(|p| filter.matches(p.value()))
            .map(|p| p.value().clone())
            .collect();
        all.sort_by(|a, b| b.payment_date.cmp(&a.payment_date));
        Ok(all)
    }

    async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Payment>> {
        let mut window: Vec<Payment> = self
            .0
            .payments
            .iter()
            .filter(|p| p.payment_date >= from && p.payment_date < to)
            .map(|p| p.value().clone())
            .collect();
        window.sort_by(|a, b| a.payment_date.cmp(&b.payment_date));
        Ok(window)
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::payment::PaymentMethod;

    async fn seeded() -> (InMemoryRepositoryProvider, Battery, Customer) {
        let repos = InMemoryRepositoryProvider::new();
        let b = repos
            .batteries()
            .save(Battery::new("SN-1", 100, BatteryStatus::Available))
            .await
            .unwrap();
        let c = repos
            .customers()
            .save(Customer::new("Alice", "0700000001", "1 Main St", 3))
            .await
            .unwrap();
        (repos, b, c)
    }

    #[tokio::test]
    async fn open_close_cycle() {
        let (repos, b, c) = seeded().await;
        let r = repos
            .rentals()
            .open(Rental::open(&b.id, &c.id, 300, false))
            .await
            .unwrap();
        let err = repos
            .rentals()
            .open(Rental::open(&b.id, &c.id, 300, false))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        repos.rentals().close(&r.id, Utc::now(), None).await.unwrap();
        let battery = repos.batteries().find_by_id(&b.id).await.unwrap().unwrap();
        assert_eq!(battery.status, BatteryStatus::Available);
        assert!(repos
            .rentals()
            .close(&r.id, Utc::now(), None)
            .await
            .unwrap_err()
            .is_conflict());
    }

    #[tokio::test]
    async fn record_never_clears_is_paid() {
        let (repos, b, c) = seeded().await;
        let r = repos
            .rentals()
            .open(Rental::open(&b.id, &c.id, 300, true))
            .await
            .unwrap();
        let receipt = repos
            .payments()
            .record(Payment::new(&r.id, &c.id, 10, PaymentMethod::Cash))
            .await
            .unwrap();
        assert!(receipt.rental_paid);
        assert_eq!(receipt.balance_due, 0);
    }

    #[tokio::test]
    async fn referenced_rows_cannot_be_deleted() {
        let (repos, b, c) = seeded().await;
        repos
            .rentals()
            .open(Rental::open(&b.id, &c.id, 300, false))
            .await
            .unwrap();
        assert!(repos.batteries().delete(&b.id).await.unwrap_err().is_conflict());
        assert!(repos.customers().delete(&c.id).await.unwrap_err().is_conflict());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_opens_on_one_battery_leave_one_rental() {
        let (repos, b, c) = seeded().await;
        let repos = Arc::new(repos);

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let repos = repos.clone();
                let rental = Rental::open(&b.id, &c.id, 300, false);
                tokio::spawn(async move { repos.rentals().open(rental).await })
            })
            .collect();

        let mut opened = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => opened += 1,
                Err(e) => assert!(e.is_conflict(), "unexpected error: {e}"),
            }
        }
        assert_eq!(opened, 1);

        let open = RentalFilter {
            state: Some(crate::domain::rental::RentalState::Open),
            ..RentalFilter::default()
        };
        assert_eq!(repos.rentals().find_all(&open).await.unwrap().len(), 1);
    }
}
