//! Customer management

use std::collections::HashMap;
use std::sync::Arc;

use tracing::info;

use super::credit_rating::CreditRatingService;
use crate::domain::customer::{Customer, CustomerUpdate, MAX_CREDIT_RATING};
use crate::domain::payment::{Payment, PaymentFilter};
use crate::domain::rental::{Rental, RentalFilter};
use crate::domain::{DomainError, DomainResult, Principal, RepositoryProvider};
use crate::shared::PaginatedResult;

/// Input for registering a customer
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub name: String,
    pub phone_number: String,
    pub address: String,
    /// Configured default when omitted
    pub credit_rating: Option<u8>,
}

/// A customer together with their rental standing
#[derive(Debug, Clone)]
pub struct CustomerDetail {
    pub customer: Customer,
    pub rental_count: usize,
    pub open_rentals: usize,
    /// Sum of what is still owed on unpaid rentals
    pub balance_due: i64,
}

pub struct CustomerService {
    repos: Arc<dyn RepositoryProvider>,
    credit: Arc<CreditRatingService>,
    default_credit_rating: u8,
}

impl CustomerService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        credit: Arc<CreditRatingService>,
        default_credit_rating: u8,
    ) -> Self {
        Self {
            repos,
            credit,
            default_credit_rating: default_credit_rating.min(MAX_CREDIT_RATING),
        }
    }

    pub async fn create_customer(&self, input: NewCustomer) -> DomainResult<Customer> {
        let name = required("name", &input.name)?;
        let phone = required("phone_number", &input.phone_number)?;
        let address = required("address", &input.address)?;
        let rating = match input.credit_rating {
            Some(r) if r > MAX_CREDIT_RATING => {
                return Err(DomainError::invalid(
                    "credit_rating",
                    format!("must be between 0 and {}", MAX_CREDIT_RATING),
                ));
            }
            Some(r) => r,
            None => self.default_credit_rating,
        };

        if self.repos.customers().find_by_phone(&phone).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "phone number {} already exists",
                phone
            )));
        }

        let customer = self
            .repos
            .customers()
            .save(Customer::new(name, phone, address, rating))
            .await?;
        info!(customer_id = %customer.id, "Customer registered");
        Ok(customer)
    }

    pub async fn get_customer(&self, id: &str) -> DomainResult<Customer> {
        self.repos
            .customers()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", id))
    }

    pub async fn get_customer_detail(&self, id: &str) -> DomainResult<CustomerDetail> {
        let customer = self.get_customer(id).await?;
        let rentals = self.customer_rentals(id).await?;
        let payments = self.customer_payments(id).await?;

        let mut paid_per_rental: HashMap<&str, i64> = HashMap::new();
        for p in &payments {
            *paid_per_rental.entry(p.rental_id.as_str()).or_default() += p.amount;
        }
        let balance_due = rentals
            .iter()
            .map(|r| r.balance_due(paid_per_rental.get(r.id.as_str()).copied().unwrap_or(0)))
            .sum();

        Ok(CustomerDetail {
            rental_count: rentals.len(),
            open_rentals: rentals.iter().filter(|r| r.is_open()).count(),
            balance_due,
            customer,
        })
    }

    pub async fn list_customers(
        &self,
        search: Option<&str>,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<Customer>> {
        let all = self.repos.customers().find_all(search).await?;
        Ok(PaginatedResult::paginate(all, page, limit))
    }

    /// Change contact data. The credit rating is never touched here.
    pub async fn update_customer(
        &self,
        id: &str,
        update: CustomerUpdate,
    ) -> DomainResult<Customer> {
        let mut customer = self.get_customer(id).await?;

        if let Some(name) = update.name {
            customer.name = required("name", &name)?;
        }
        if let Some(phone) = update.phone_number {
            let phone = required("phone_number", &phone)?;
            if phone != customer.phone_number {
                if let Some(other) = self.repos.customers().find_by_phone(&phone).await? {
                    if other.id != customer.id {
                        return Err(DomainError::Conflict(format!(
                            "phone number {} already exists",
                            phone
                        )));
                    }
                }
            }
            customer.phone_number = phone;
        }
        if let Some(address) = update.address {
            customer.address = required("address", &address)?;
        }

        let updated = self.repos.customers().update(customer).await?;
        info!(customer_id = %updated.id, "Customer updated");
        Ok(updated)
    }

    pub async fn delete_customer(&self, principal: &Principal, id: &str) -> DomainResult<()> {
        principal.require_admin()?;
        self.repos.customers().delete(id).await?;
        info!(customer_id = id, by = %principal.subject, "Customer deleted");
        Ok(())
    }

    /// The customer's rentals, newest first. Unknown customers are NotFound.
    pub async fn list_customer_rentals(&self, id: &str) -> DomainResult<Vec<Rental>> {
        self.get_customer(id).await?;
        self.customer_rentals(id).await
    }

    /// The customer's payments, newest first. Unknown customers are NotFound.
    pub async fn list_customer_payments(&self, id: &str) -> DomainResult<Vec<Payment>> {
        self.get_customer(id).await?;
        self.customer_payments(id).await
    }

    /// Re-score now and return the customer as stored afterwards
    pub async fn recompute_credit_rating(&self, id: &str) -> DomainResult<Customer> {
        self.credit.recompute(id).await?;
        self.get_customer(id).await
    }

    async fn customer_rentals(&self, id: &str) -> DomainResult<Vec<Rental>> {
        self.repos
            .rentals()
            .find_all(&RentalFilter::for_customer(id))
            .await
    }

    async fn customer_payments(&self, id: &str) -> DomainResult<Vec<Payment>> {
        self.repos
            .payments()
            .find_all(&PaymentFilter::for_customer(id))
            .await
    }
}

fn required(field: &'static str, value: &str) -> DomainResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(DomainError::invalid(field, "must not be empty"));
    }
    Ok(value.to_string())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::battery::{Battery, BatteryStatus};
    use crate::domain::credit::CreditPolicy;
    use crate::domain::payment::PaymentMethod;
    use crate::domain::Role;
    use crate::infrastructure::InMemoryRepositoryProvider;

    fn service() -> (Arc<dyn RepositoryProvider>, CustomerService) {
        let repos: Arc<dyn RepositoryProvider> = Arc::new(InMemoryRepositoryProvider::new());
        let credit = Arc::new(CreditRatingService::new(repos.clone(), CreditPolicy::default()));
        (repos.clone(), CustomerService::new(repos, credit, 3))
    }

    fn alice() -> NewCustomer {
        NewCustomer {
            name: "Alice".into(),
            phone_number: "0700000001".into(),
            address: "1 Main St".into(),
            credit_rating: None,
        }
    }

    #[tokio::test]
    async fn create_uses_default_rating_and_rejects_duplicates() {
        let (_, svc) = service();
        let c = svc.create_customer(alice()).await.unwrap();
        assert_eq!(c.credit_rating, 3);
        assert!(svc.create_customer(alice()).await.unwrap_err().is_conflict());

        let err = svc
            .create_customer(NewCustomer {
                phone_number: "0700000002".into(),
                credit_rating: Some(6),
                ..alice()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidInput {
                field: "credit_rating",
                ..
            }
        ));
    }

    #[tokio::test]
    async fn update_changes_contact_data_only() {
        let (repos, svc) = service();
        let c = svc.create_customer(alice()).await.unwrap();
        repos.customers().update_credit_rating(&c.id, 1).await.unwrap();

        let updated = svc
            .update_customer(
                &c.id,
                CustomerUpdate {
                    address: Some("2 Side St".into()),
                    ..CustomerUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address, "2 Side St");
        assert_eq!(updated.credit_rating, 1);

        let err = svc
            .update_customer(
                &c.id,
                CustomerUpdate {
                    name: Some("   ".into()),
                    ..CustomerUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { field: "name", .. }));
    }

    #[tokio::test]
    async fn detail_sums_outstanding_balance() {
        let (repos, svc) = service();
        let c = svc.create_customer(alice()).await.unwrap();
        let b1 = repos
            .batteries()
            .save(Battery::new("SN-1", 1000, BatteryStatus::Available))
            .await
            .unwrap();
        let b2 = repos
            .batteries()
            .save(Battery::new("SN-2", 1000, BatteryStatus::Available))
            .await
            .unwrap();
        let r1 = repos
            .rentals()
            .open(Rental::open(&b1.id, &c.id, 300, false))
            .await
            .unwrap();
        repos
            .rentals()
            .open(Rental::open(&b2.id, &c.id, 200, false))
            .await
            .unwrap();
        repos
            .payments()
            .record(Payment::new(&r1.id, &c.id, 100, PaymentMethod::MobileMoney))
            .await
            .unwrap();

        let detail = svc.get_customer_detail(&c.id).await.unwrap();
        assert_eq!(detail.rental_count, 2);
        assert_eq!(detail.open_rentals, 2);
        assert_eq!(detail.balance_due, 400);

        assert_eq!(svc.list_customer_rentals(&c.id).await.unwrap().len(), 2);
        assert_eq!(svc.list_customer_payments(&c.id).await.unwrap().len(), 1);
        assert!(svc
            .list_customer_rentals("missing")
            .await
            .unwrap_err()
            .is_not_found());

        let admin = Principal::new("root", Role::Admin);
        assert!(svc.delete_customer(&admin, &c.id).await.unwrap_err().is_conflict());
    }

    #[tokio::test]
    async fn search_is_case_insensitive() {
        let (_, svc) = service();
        svc.create_customer(alice()).await.unwrap();
        svc.create_customer(NewCustomer {
            name: "Bob".into(),
            phone_number: "0700000002".into(),
            ..alice()
        })
        .await
        .unwrap();

        let hits = svc.list_customers(Some("bO"), 1, 50).await.unwrap();
        assert_eq!(hits.total, 1);
        assert_eq!(hits.items[0].name, "Bob");
        assert_eq!(svc.list_customers(None, 1, 50).await.unwrap().total, 2);
    }
}
