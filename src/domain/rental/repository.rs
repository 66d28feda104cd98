//! Rental repository interface
//!
//! `open` and `close` are the only writes and each one covers both the rental
//! row and the battery status in a single unit: implementations must apply
//! all of it or none of it.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Rental, RentalFilter};
use crate::domain::DomainResult;

#[async_trait]
pub trait RentalRepository: Send + Sync {
    /// Insert the rental and move its battery AVAILABLE -> RENTED.
    ///
    /// The battery status is re-checked inside the unit of work; a battery
    /// that is no longer AVAILABLE fails with `Conflict` and nothing is
    /// written.
    async fn open(&self, rental: Rental) -> DomainResult<Rental>;

    /// Set the return date (and optionally `is_paid`) and move the battery
    /// back to AVAILABLE.
    ///
    /// A rental that already has a return date fails with `Conflict` and
    /// nothing is written.
    async fn close(
        &self,
        id: &str,
        return_date: DateTime<Utc>,
        is_paid: Option<bool>,
    ) -> DomainResult<Rental>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Rental>>;

    /// Matching rentals, newest rent date first
    async fn find_all(&self, filter: &RentalFilter) -> DomainResult<Vec<Rental>>;
}
