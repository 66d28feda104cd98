//! Rental Lifecycle Manager
//!
//! ```text
//! battery AVAILABLE --create_rental--> RENTED --return_battery--> AVAILABLE
//! ```
//!
//! The battery flip and the rental write happen together inside the
//! repository; this service checks preconditions, counts and triggers the
//! credit rating refresh once the return has committed.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;

use super::credit_rating::CreditRatingService;
use crate::domain::payment::{Payment, PaymentFilter};
use crate::domain::rental::{Rental, RentalFilter};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::PaginatedResult;

#[derive(Debug, Clone)]
pub struct NewRental {
    pub battery_id: String,
    pub customer_id: String,
    pub rental_price: i64,
    pub is_paid: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ReturnBattery {
    /// Now when omitted
    pub return_date: Option<DateTime<Utc>>,
    /// Overrides the paid flag when given
    pub is_paid: Option<bool>,
}

/// A rental with its ledger entries
#[derive(Debug, Clone)]
pub struct RentalDetail {
    pub rental: Rental,
    pub payments: Vec<Payment>,
    pub total_paid: i64,
    pub balance_due: i64,
    /// Whole days out, `None` while open
    pub rental_days: Option<i64>,
}

pub struct RentalService {
    repos: Arc<dyn RepositoryProvider>,
    credit: Arc<CreditRatingService>,
}

impl RentalService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, credit: Arc<CreditRatingService>) -> Self {
        Self { repos, credit }
    }

    /// Hand a battery out to a customer
    pub async fn create_rental(&self, input: NewRental) -> DomainResult<Rental> {
        let battery = self
            .repos
            .batteries()
            .find_by_id(&input.battery_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Battery", input.battery_id.clone()))?;
        if !battery.is_available() {
            return Err(DomainError::Conflict(format!(
                "battery {} is not available (status {})",
                battery.serial_number, battery.status
            )));
        }

        self.repos
            .customers()
            .find_by_id(&input.customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", input.customer_id.clone()))?;

        if input.rental_price <= 0 {
            return Err(DomainError::invalid(
                "rental_price",
                "must be greater than zero",
            ));
        }

        let rental = self
            .repos
            .rentals()
            .open(Rental::open(
                input.battery_id,
                input.customer_id,
                input.rental_price,
                input.is_paid,
            ))
            .await?;

        metrics::counter!("rentals_created_total").increment(1);
        info!(
            rental_id = %rental.id,
            battery = %battery.serial_number,
            customer_id = %rental.customer_id,
            price = rental.rental_price,
            "Rental created"
        );
        Ok(rental)
    }

    /// Take a battery back and close its rental
    pub async fn return_battery(&self, rental_id: &str, input: ReturnBattery) -> DomainResult<Rental> {
        let rental = self.get_rental(rental_id).await?;
        if !rental.is_open() {
            return Err(DomainError::Conflict(format!(
                "rental {} has already been returned",
                rental_id
            )));
        }

        let return_date = input.return_date.unwrap_or_else(Utc::now);
        if return_date < rental.rent_date {
            return Err(DomainError::invalid(
                "return_date",
                "must not be earlier than the rent date",
            ));
        }

        let closed = self
            .repos
            .rentals()
            .close(rental_id, return_date, input.is_paid)
            .await?;

        metrics::counter!("battery_returns_total").increment(1);
        info!(
            rental_id,
            battery_id = %closed.battery_id,
            days = ?closed.rental_days(),
            "Battery returned"
        );

        self.credit.refresh_after_event(&closed.customer_id).await;
        Ok(closed)
    }

    pub async fn get_rental(&self, id: &str) -> DomainResult<Rental> {
        self.repos
            .rentals()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Rental", id))
    }

    pub async fn get_rental_detail(&self, id: &str) -> DomainResult<RentalDetail> {
        let rental = self.get_rental(id).await?;
        let payments = self
            .repos
            .payments()
            .find_all(&PaymentFilter::for_rental(id))
            .await?;
        let total_paid = payments.iter().map(|p| p.amount).sum();

        Ok(RentalDetail {
            balance_due: rental.balance_due(total_paid),
            rental_days: rental.rental_days(),
            total_paid,
            payments,
            rental,
        })
    }

    pub async fn list_rentals(
        &self,
        filter: &RentalFilter,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<Rental>> {
        let all = self.repos.rentals().find_all(filter).await?;
        Ok(PaginatedResult::paginate(all, page, limit))
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::battery::{Battery, BatteryStatus};
    use crate::domain::credit::CreditPolicy;
    use crate::domain::customer::Customer;
    use crate::domain::payment::PaymentMethod;
    use crate::domain::rental::RentalState;
    use crate::infrastructure::InMemoryRepositoryProvider;
    use chrono::Duration;

    struct Fixture {
        repos: Arc<dyn RepositoryProvider>,
        svc: RentalService,
        battery: Battery,
        customer: Customer,
    }

    async fn fixture() -> Fixture {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let credit = Arc::new(CreditRatingService::new(repos.clone(), CreditPolicy::default()));
        let battery = repos
            .batteries()
            .save(Battery::new("SN-1", 1000, BatteryStatus::Available))
            .await
            .unwrap();
        let customer = repos
            .customers()
            .save(Customer::new("Alice", "0700000001", "1 Main St", 3))
            .await
            .unwrap();
        Fixture {
            svc: RentalService::new(repos.clone(), credit),
            repos,
            battery,
            customer,
        }
    }

    fn new_rental(f: &Fixture, price: i64) -> NewRental {
        NewRental {
            battery_id: f.battery.id.clone(),
            customer_id: f.customer.id.clone(),
            rental_price: price,
            is_paid: false,
        }
    }

    async fn battery_status(f: &Fixture) -> BatteryStatus {
        f.repos
            .batteries()
            .find_by_id(&f.battery.id)
            .await
            .unwrap()
            .unwrap()
            .status
    }

    #[tokio::test]
    async fn create_rents_battery_and_blocks_second_rental() {
        let f = fixture().await;
        let r = f.svc.create_rental(new_rental(&f, 100)).await.unwrap();
        assert!(r.is_open());
        assert!(!r.is_paid);
        assert_eq!(battery_status(&f).await, BatteryStatus::Rented);

        let err = f.svc.create_rental(new_rental(&f, 100)).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn create_checks_preconditions_in_order() {
        let f = fixture().await;
        let mut input = new_rental(&f, 100);
        input.battery_id = "missing".into();
        assert!(matches!(
            f.svc.create_rental(input).await.unwrap_err(),
            DomainError::NotFound { entity: "Battery", .. }
        ));

        let mut input = new_rental(&f, 100);
        input.customer_id = "missing".into();
        assert!(matches!(
            f.svc.create_rental(input).await.unwrap_err(),
            DomainError::NotFound { entity: "Customer", .. }
        ));

        let err = f.svc.create_rental(new_rental(&f, 0)).await.unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidInput {
                field: "rental_price",
                ..
            }
        ));
        assert_eq!(battery_status(&f).await, BatteryStatus::Available);
    }

    #[tokio::test]
    async fn maintenance_battery_cannot_be_rented() {
        let f = fixture().await;
        let mut b = f.battery.clone();
        b.status = BatteryStatus::Maintenance;
        f.repos.batteries().update(b).await.unwrap();

        let err = f.svc.create_rental(new_rental(&f, 100)).await.unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn return_frees_battery_and_rescores_customer() {
        let f = fixture().await;
        let r = f
            .svc
            .create_rental(NewRental {
                is_paid: true,
                ..new_rental(&f, 100)
            })
            .await
            .unwrap();

        let closed = f
            .svc
            .return_battery(
                &r.id,
                ReturnBattery {
                    return_date: Some(r.rent_date + Duration::days(5)),
                    is_paid: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(closed.rental_days(), Some(5));
        assert_eq!(battery_status(&f).await, BatteryStatus::Available);

        let customer = f
            .repos
            .customers()
            .find_by_id(&f.customer.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(customer.credit_rating, 5);
    }

    #[tokio::test]
    async fn second_return_conflicts_and_changes_nothing() {
        let f = fixture().await;
        let r = f.svc.create_rental(new_rental(&f, 100)).await.unwrap();
        let first = f
            .svc
            .return_battery(&r.id, ReturnBattery::default())
            .await
            .unwrap();

        let err = f
            .svc
            .return_battery(
                &r.id,
                ReturnBattery {
                    return_date: Some(Utc::now() + Duration::days(3)),
                    is_paid: Some(true),
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let stored = f.svc.get_rental(&r.id).await.unwrap();
        assert_eq!(stored.return_date, first.return_date);
        assert!(!stored.is_paid);
    }

    #[tokio::test]
    async fn return_before_rent_date_is_invalid() {
        let f = fixture().await;
        let r = f.svc.create_rental(new_rental(&f, 100)).await.unwrap();
        let err = f
            .svc
            .return_battery(
                &r.id,
                ReturnBattery {
                    return_date: Some(r.rent_date - Duration::hours(1)),
                    is_paid: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidInput {
                field: "return_date",
                ..
            }
        ));
        assert_eq!(battery_status(&f).await, BatteryStatus::Rented);
    }

    #[tokio::test]
    async fn detail_and_listing() {
        let f = fixture().await;
        let r = f.svc.create_rental(new_rental(&f, 300)).await.unwrap();
        f.repos
            .payments()
            .record(Payment::new(&r.id, &f.customer.id, 120, PaymentMethod::Cash))
            .await
            .unwrap();

        let detail = f.svc.get_rental_detail(&r.id).await.unwrap();
        assert_eq!(detail.total_paid, 120);
        assert_eq!(detail.balance_due, 180);
        assert_eq!(detail.payments.len(), 1);
        assert_eq!(detail.rental_days, None);

        let open = RentalFilter {
            state: Some(RentalState::Open),
            ..RentalFilter::default()
        };
        assert_eq!(f.svc.list_rentals(&open, 1, 50).await.unwrap().total, 1);
        let returned = RentalFilter {
            state: Some(RentalState::Returned),
            ..RentalFilter::default()
        };
        assert_eq!(f.svc.list_rentals(&returned, 1, 50).await.unwrap().total, 0);
    }
}
