//! Read-only reporting over inventory, rentals and payments

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveTime, Utc};
use tracing::debug;

use crate::domain::battery::BatteryStatus;
use crate::domain::customer::Customer;
use crate::domain::payment::PaymentFilter;
use crate::domain::rental::{RentalFilter, RentalState};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InventoryCounts {
    pub total: usize,
    pub available: usize,
    pub rented: usize,
    pub maintenance: usize,
}

#[derive(Debug, Clone)]
pub struct DashboardSummary {
    pub batteries: InventoryCounts,
    pub open_rentals: usize,
    pub total_customers: usize,
    /// Payments received since 00:00 UTC today
    pub todays_earnings: i64,
    /// Outstanding amount over all unpaid rentals
    pub total_due: i64,
}

#[derive(Debug, Clone)]
pub struct Earnings {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub total: i64,
    pub payment_count: usize,
}

#[derive(Debug, Clone)]
pub struct CustomerRentalCount {
    pub customer: Customer,
    pub rental_count: usize,
}

pub struct DashboardService {
    repos: Arc<dyn RepositoryProvider>,
}

impl DashboardService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn summary(&self) -> DomainResult<DashboardSummary> {
        let batteries = self.inventory_counts().await?;
        let open_rentals = self
            .repos
            .rentals()
            .find_all(&RentalFilter {
                state: Some(RentalState::Open),
                ..RentalFilter::default()
            })
            .await?
            .len();
        let total_customers = self.repos.customers().find_all(None).await?.len();
        let (from, to) = today();
        let todays_earnings = self.earnings(from, to).await?.total;
        let total_due = self.total_due().await?;

        Ok(DashboardSummary {
            batteries,
            open_rentals,
            total_customers,
            todays_earnings,
            total_due,
        })
    }

    pub async fn inventory_counts(&self) -> DomainResult<InventoryCounts> {
        let mut counts = InventoryCounts::default();
        for b in self.repos.batteries().find_all(None).await? {
            counts.total += 1;
            match b.status {
                BatteryStatus::Available => counts.available += 1,
                BatteryStatus::Rented => counts.rented += 1,
                BatteryStatus::Maintenance => counts.maintenance += 1,
            }
        }
        Ok(counts)
    }

    /// Sum of payments with `from <= payment_date < to`
    pub async fn earnings(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> DomainResult<Earnings> {
        if to < from {
            return Err(DomainError::invalid("to", "must not be earlier than from"));
        }
        let payments = self.repos.payments().find_between(from, to).await?;
        let total = payments.iter().map(|p| p.amount).sum();
        debug!(%from, %to, total, count = payments.len(), "Earnings window");
        Ok(Earnings {
            from,
            to,
            total,
            payment_count: payments.len(),
        })
    }

    /// `sum(max(rental_price - paid, 0))` over rentals not marked paid
    pub async fn total_due(&self) -> DomainResult<i64> {
        let rentals = self.repos.rentals().find_all(&RentalFilter::default()).await?;
        let payments = self.repos.payments().find_all(&PaymentFilter::default()).await?;

        let mut paid: HashMap<&str, i64> = HashMap::new();
        for p in &payments {
            *paid.entry(p.rental_id.as_str()).or_default() += p.amount;
        }
        Ok(rentals
            .iter()
            .filter(|r| !r.is_paid)
            .map(|r| r.balance_due(paid.get(r.id.as_str()).copied().unwrap_or(0)))
            .sum())
    }

    /// Customers with the most rentals; ties by name
    pub async fn top_customers(&self, limit: usize) -> DomainResult<Vec<CustomerRentalCount>> {
        let rentals = self.repos.rentals().find_all(&RentalFilter::default()).await?;
        let mut per_customer: HashMap<&str, usize> = HashMap::new();
        for r in &rentals {
            *per_customer.entry(r.customer_id.as_str()).or_default() += 1;
        }

        let mut ranked: Vec<CustomerRentalCount> = self
            .repos
            .customers()
            .find_all(None)
            .await?
            .into_iter()
            .map(|customer| CustomerRentalCount {
                rental_count: per_customer.get(customer.id.as_str()).copied().unwrap_or(0),
                customer,
            })
            .collect();
        ranked.sort_by(|a, b| {
            b.rental_count
                .cmp(&a.rental_count)
                .then_with(|| a.customer.name.cmp(&b.customer.name))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Lowest rated customers; ties by name
    pub async fn low_credit_customers(&self, limit: usize) -> DomainResult<Vec<Customer>> {
        let mut customers = self.repos.customers().find_all(None).await?;
        customers.sort_by(|a, b| {
            a.credit_rating
                .cmp(&b.credit_rating)
                .then_with(|| a.name.cmp(&b.name))
        });
        customers.truncate(limit);
        Ok(customers)
    }
}

/// `[00:00 today, 00:00 tomorrow)` in UTC
pub fn today() -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Utc::now().date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::battery::Battery;
    use crate::domain::payment::{Payment, PaymentMethod};
    use crate::domain::rental::Rental;
    use crate::infrastructure::InMemoryRepositoryProvider;

    async fn seeded() -> (Arc<dyn RepositoryProvider>, DashboardService) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());

        let mut batteries = Vec::new();
        for (serial, status) in [
            ("SN-1", BatteryStatus::Available),
            ("SN-2", BatteryStatus::Available),
            ("SN-3", BatteryStatus::Available),
            ("SN-4", BatteryStatus::Maintenance),
        ] {
            batteries.push(
                repos
                    .batteries()
                    .save(Battery::new(serial, 1000, status))
                    .await
                    .unwrap(),
            );
        }

        let alice = repos
            .customers()
            .save(Customer::new("Alice", "01", "A St", 4))
            .await
            .unwrap();
        let bob = repos
            .customers()
            .save(Customer::new("Bob", "02", "B St", 1))
            .await
            .unwrap();
        repos
            .customers()
            .save(Customer::new("Carol", "03", "C St", 1))
            .await
            .unwrap();

        // Alice: one returned and paid, one open with 50 of 200 paid
        let r1 = repos
            .rentals()
            .open(Rental::open(&batteries[0].id, &alice.id, 100, true))
            .await
            .unwrap();
        repos.rentals().close(&r1.id, Utc::now(), None).await.unwrap();
        let r2 = repos
            .rentals()
            .open(Rental::open(&batteries[1].id, &alice.id, 200, false))
            .await
            .unwrap();
        repos
            .payments()
            .record(Payment::new(&r2.id, &alice.id, 50, PaymentMethod::Cash))
            .await
            .unwrap();

        // Bob: one open, nothing paid
        repos
            .rentals()
            .open(Rental::open(&batteries[2].id, &bob.id, 300, false))
            .await
            .unwrap();

        (repos.clone(), DashboardService::new(repos))
    }

    #[tokio::test]
    async fn summary_counts_everything() {
        let (_, svc) = seeded().await;
        let s = svc.summary().await.unwrap();
        assert_eq!(
            s.batteries,
            InventoryCounts {
                total: 4,
                available: 1,
                rented: 2,
                maintenance: 1,
            }
        );
        assert_eq!(s.open_rentals, 2);
        assert_eq!(s.total_customers, 3);
        assert_eq!(s.todays_earnings, 50);
        // 150 (Alice) + 300 (Bob)
        assert_eq!(s.total_due, 450);
    }

    #[tokio::test]
    async fn earnings_window_is_half_open() {
        let (_, svc) = seeded().await;
        let (from, to) = today();
        assert_eq!(svc.earnings(from, to).await.unwrap().total, 50);
        assert_eq!(svc.earnings(to, to + Duration::days(1)).await.unwrap().total, 0);
        assert!(svc.earnings(to, from).await.is_err());
    }

    #[tokio::test]
    async fn rankings_break_ties_by_name() {
        let (_, svc) = seeded().await;

        let top = svc.top_customers(2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].customer.name, "Alice");
        assert_eq!(top[0].rental_count, 2);
        assert_eq!(top[1].customer.name, "Bob");

        let low = svc.low_credit_customers(5).await.unwrap();
        let names: Vec<_> = low.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Bob", "Carol", "Alice"]);
    }
}
