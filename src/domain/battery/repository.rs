//! Battery repository interface

use async_trait::async_trait;

use super::model::{Battery, BatteryStatus};
use crate::domain::DomainResult;

#[async_trait]
pub trait BatteryRepository: Send + Sync {
    /// Insert a new battery. Duplicate serial numbers fail with `Conflict`.
    async fn save(&self, battery: Battery) -> DomainResult<Battery>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Battery>>;

    async fn find_by_serial(&self, serial_number: &str) -> DomainResult<Option<Battery>>;

    /// All batteries ordered by serial number, optionally restricted to one status
    async fn find_all(&self, status: Option<BatteryStatus>) -> DomainResult<Vec<Battery>>;

    /// Persist serial / price / status of an existing battery.
    ///
    /// The status change is checked against the stored row with
    /// `Battery::check_manual_status_change` and applied only if the stored
    /// status has not moved in the meantime (`Conflict` otherwise).
    async fn update(&self, battery: Battery) -> DomainResult<Battery>;

    /// Hard delete. Fails with `Conflict` when any rental references the battery.
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
