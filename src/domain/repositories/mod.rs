//! Repository access for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::battery::BatteryRepository;
use super::customer::CustomerRepository;
use super::payment::PaymentRepository;
use super::rental::RentalRepository;
use crate::shared::errors::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Injected into every service at construction time. Consumers request
/// only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let battery = repos.batteries().find_by_id("b-1").await?;
///     let open = repos.rentals().find_all(&RentalFilter::default()).await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn batteries(&self) -> &dyn BatteryRepository;
    fn customers(&self) -> &dyn CustomerRepository;
    fn rentals(&self) -> &dyn RentalRepository;
    fn payments(&self) -> &dyn PaymentRepository;
}
