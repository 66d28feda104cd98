//! Credit Rating Engine
//!
//! Re-scores a customer from their full rental and payment history. Runs
//! after every return and payment, and on demand.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::credit::CreditPolicy;
use crate::domain::payment::PaymentFilter;
use crate::domain::rental::RentalFilter;
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

pub struct CreditRatingService {
    repos: Arc<dyn RepositoryProvider>,
    policy: CreditPolicy,
}

impl CreditRatingService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, policy: CreditPolicy) -> Self {
        Self { repos, policy }
    }

    /// Recompute and persist the rating.
    ///
    /// Returns the new rating, or `None` when the customer has no rentals
    /// yet and the stored rating was left untouched.
    pub async fn recompute(&self, customer_id: &str) -> DomainResult<Option<u8>> {
        let customer = self
            .repos
            .customers()
            .find_by_id(customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", customer_id))?;

        let rentals = self
            .repos
            .rentals()
            .find_all(&RentalFilter::for_customer(customer_id))
            .await?;
        let payments = self
            .repos
            .payments()
            .find_all(&PaymentFilter::for_customer(customer_id))
            .await?;

        let Some(rating) = self.policy.rate(&rentals, &payments) else {
            debug!(customer_id, "No rentals yet, credit rating unchanged");
            return Ok(None);
        };

        if rating != customer.credit_rating {
            self.repos
                .customers()
                .update_credit_rating(customer_id, rating)
                .await?;
            info!(
                customer_id,
                old = customer.credit_rating,
                new = rating,
                rentals = rentals.len(),
                "Credit rating updated"
            );
        }
        Ok(Some(rating))
    }

    /// Recompute after a rental or payment event. Failures are logged and
    /// counted, never returned: the triggering operation has already
    /// committed.
    pub async fn refresh_after_event(&self, customer_id: &str) {
        if let Err(e) = self.recompute(customer_id).await {
            metrics::counter!("credit_rating_recompute_failures_total").increment(1);
            warn!(customer_id, error = %e, "Credit rating recompute failed");
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::battery::{Battery, BatteryStatus};
    use crate::domain::customer::Customer;
    use crate::domain::payment::{Payment, PaymentMethod};
    use crate::domain::rental::Rental;
    use crate::infrastructure::InMemoryRepositoryProvider;
    use chrono::Duration;

    async fn setup() -> (Arc<dyn RepositoryProvider>, CreditRatingService, Customer) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let customer = repos
            .customers()
            .save(Customer::new("Alice", "0700000001", "1 Main St", 3))
            .await
            .unwrap();
        let service = CreditRatingService::new(repos.clone(), CreditPolicy::default());
        (repos, service, customer)
    }

    async fn returned_rental(
        repos: &Arc<dyn RepositoryProvider>,
        customer: &Customer,
        serial: &str,
        paid: bool,
        days: i64,
    ) -> Rental {
        let battery = repos
            .batteries()
            .save(Battery::new(serial, 1000, BatteryStatus::Available))
            .await
            .unwrap();
        let r = repos
            .rentals()
            .open(Rental::open(&battery.id, &customer.id, 100, paid))
            .await
            .unwrap();
        repos
            .rentals()
            .close(&r.id, r.rent_date + Duration::days(days), None)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn no_rentals_keeps_initial_rating() {
        let (repos, service, customer) = setup().await;
        assert_eq!(service.recompute(&customer.id).await.unwrap(), None);
        let stored = repos.customers().find_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(stored.credit_rating, 3);
    }

    #[tokio::test]
    async fn paid_on_time_rental_rates_five() {
        let (repos, service, customer) = setup().await;
        returned_rental(&repos, &customer, "SN-1", true, 5).await;

        assert_eq!(service.recompute(&customer.id).await.unwrap(), Some(5));
        let stored = repos.customers().find_by_id(&customer.id).await.unwrap().unwrap();
        assert_eq!(stored.credit_rating, 5);
    }

    #[tokio::test]
    async fn late_partially_paid_rental_rates_two() {
        let (repos, service, customer) = setup().await;
        let r = returned_rental(&repos, &customer, "SN-1", false, 10).await;
        repos
            .payments()
            .record(Payment::new(&r.id, &customer.id, 40, PaymentMethod::Cash))
            .await
            .unwrap();

        assert_eq!(service.recompute(&customer.id).await.unwrap(), Some(2));
    }

    #[tokio::test]
    async fn recompute_is_idempotent() {
        let (repos, service, customer) = setup().await;
        returned_rental(&repos, &customer, "SN-1", true, 2).await;
        returned_rental(&repos, &customer, "SN-2", false, 12).await;

        let first = service.recompute(&customer.id).await.unwrap();
        let second = service.recompute(&customer.id).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn unknown_customer_is_not_found_but_refresh_swallows_it() {
        let (_, service, _) = setup().await;
        assert!(service.recompute("missing").await.unwrap_err().is_not_found());
        service.refresh_after_event("missing").await;
    }
}
