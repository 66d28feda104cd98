//! Customer repository interface

use async_trait::async_trait;

use super::model::Customer;
use crate::domain::DomainResult;

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Insert a new customer. Duplicate phone numbers fail with `Conflict`.
    async fn save(&self, customer: Customer) -> DomainResult<Customer>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Customer>>;

    async fn find_by_phone(&self, phone_number: &str) -> DomainResult<Option<Customer>>;

    /// All customers ordered by name, optionally filtered by a search term
    async fn find_all(&self, search: Option<&str>) -> DomainResult<Vec<Customer>>;

    /// Persist name / phone / address of an existing customer
    async fn update(&self, customer: Customer) -> DomainResult<Customer>;

    /// Overwrite the derived credit rating
    async fn update_credit_rating(&self, id: &str, rating: u8) -> DomainResult<()>;

    /// Hard delete. Fails with `Conflict` when the customer has rentals.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
