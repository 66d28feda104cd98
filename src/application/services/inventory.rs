//! Battery inventory management

use std::sync::Arc;

use tracing::info;

use crate::domain::battery::{Battery, BatteryStatus, BatteryUpdate};
use crate::domain::{DomainError, DomainResult, Principal, RepositoryProvider};
use crate::shared::PaginatedResult;

/// Input for registering a battery
#[derive(Debug, Clone)]
pub struct NewBattery {
    pub serial_number: String,
    pub price: i64,
    /// AVAILABLE when omitted
    pub status: Option<BatteryStatus>,
}

pub struct InventoryService {
    repos: Arc<dyn RepositoryProvider>,
}

impl InventoryService {
    pub fn new(repos: Arc<dyn RepositoryProvider>) -> Self {
        Self { repos }
    }

    pub async fn create_battery(&self, input: NewBattery) -> DomainResult<Battery> {
        let serial = validate_serial(&input.serial_number)?;
        validate_price(input.price)?;

        let status = input.status.unwrap_or(BatteryStatus::Available);
        if status == BatteryStatus::Rented {
            return Err(DomainError::invalid(
                "status",
                "a new battery is either AVAILABLE or MAINTENANCE",
            ));
        }

        if self.repos.batteries().find_by_serial(&serial).await?.is_some() {
            return Err(DomainError::Conflict(format!(
                "serial number {} already exists",
                serial
            )));
        }

        let battery = self
            .repos
            .batteries()
            .save(Battery::new(serial, input.price, status))
            .await?;
        info!(battery_id = %battery.id, serial = %battery.serial_number, "Battery registered");
        Ok(battery)
    }

    pub async fn get_battery(&self, id: &str) -> DomainResult<Battery> {
        self.repos
            .batteries()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Battery", id))
    }

    pub async fn list_batteries(
        &self,
        status: Option<BatteryStatus>,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<Battery>> {
        let all = self.repos.batteries().find_all(status).await?;
        Ok(PaginatedResult::paginate(all, page, limit))
    }

    pub async fn update_battery(&self, id: &str, update: BatteryUpdate) -> DomainResult<Battery> {
        let mut battery = self.get_battery(id).await?;

        if let Some(serial) = update.serial_number {
            let serial = validate_serial(&serial)?;
            if serial != battery.serial_number {
                if let Some(other) = self.repos.batteries().find_by_serial(&serial).await? {
                    if other.id != battery.id {
                        return Err(DomainError::Conflict(format!(
                            "serial number {} already exists",
                            serial
                        )));
                    }
                }
            }
            battery.serial_number = serial;
        }
        if let Some(price) = update.price {
            validate_price(price)?;
            battery.price = price;
        }
        if let Some(status) = update.status {
            battery.check_manual_status_change(status)?;
            battery.status = status;
        }

        let updated = self.repos.batteries().update(battery).await?;
        info!(battery_id = %updated.id, status = %updated.status, "Battery updated");
        Ok(updated)
    }

    pub async fn delete_battery(&self, principal: &Principal, id: &str) -> DomainResult<()> {
        principal.require_admin()?;
        self.repos.batteries().delete(id).await?;
        info!(battery_id = id, by = %principal.subject, "Battery deleted");
        Ok(())
    }
}

fn validate_serial(serial: &str) -> DomainResult<String> {
    let serial = serial.trim();
    if serial.is_empty() {
        return Err(DomainError::invalid("serial_number", "must not be empty"));
    }
    Ok(serial.to_string())
}

fn validate_price(price: i64) -> DomainResult<()> {
    if price <= 0 {
        return Err(DomainError::invalid("price", "must be greater than zero"));
    }
    Ok(())
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::infrastructure::InMemoryRepositoryProvider;

    fn service() -> InventoryService {
        InventoryService::new(Arc::new(InMemoryRepositoryProvider::new()))
    }

    fn new_battery(serial: &str) -> NewBattery {
        NewBattery {
            serial_number: serial.into(),
            price: 15_000,
            status: None,
        }
    }

    #[tokio::test]
    async fn create_defaults_to_available() {
        let svc = service();
        let b = svc.create_battery(new_battery(" SN-1 ")).await.unwrap();
        assert_eq!(b.serial_number, "SN-1");
        assert_eq!(b.status, BatteryStatus::Available);
        assert_eq!(svc.get_battery(&b.id).await.unwrap(), b);
    }

    #[tokio::test]
    async fn create_rejects_bad_input() {
        let svc = service();
        let err = svc
            .create_battery(NewBattery {
                price: 0,
                ..new_battery("SN-1")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { field: "price", .. }));

        let err = svc
            .create_battery(NewBattery {
                status: Some(BatteryStatus::Rented),
                ..new_battery("SN-1")
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::InvalidInput { field: "status", .. }));

        svc.create_battery(new_battery("SN-1")).await.unwrap();
        assert!(svc
            .create_battery(new_battery("SN-1"))
            .await
            .unwrap_err()
            .is_conflict());
    }

    #[tokio::test]
    async fn list_filters_and_paginates() {
        let svc = service();
        for i in 0..5 {
            svc.create_battery(new_battery(&format!("SN-{i}"))).await.unwrap();
        }
        svc.create_battery(NewBattery {
            status: Some(BatteryStatus::Maintenance),
            ..new_battery("SN-M")
        })
        .await
        .unwrap();

        let page = svc.list_batteries(None, 2, 2).await.unwrap();
        assert_eq!(page.total, 6);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.items[0].serial_number, "SN-2");

        let maintenance = svc
            .list_batteries(Some(BatteryStatus::Maintenance), 1, 50)
            .await
            .unwrap();
        assert_eq!(maintenance.total, 1);
    }

    #[tokio::test]
    async fn update_moves_between_available_and_maintenance_only() {
        let svc = service();
        let b = svc.create_battery(new_battery("SN-1")).await.unwrap();

        let updated = svc
            .update_battery(
                &b.id,
                BatteryUpdate {
                    status: Some(BatteryStatus::Maintenance),
                    price: Some(20_000),
                    ..BatteryUpdate::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.status, BatteryStatus::Maintenance);
        assert_eq!(updated.price, 20_000);

        let err = svc
            .update_battery(
                &b.id,
                BatteryUpdate {
                    status: Some(BatteryStatus::Rented),
                    ..BatteryUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_conflict());
    }

    #[tokio::test]
    async fn delete_requires_admin() {
        let svc = service();
        let b = svc.create_battery(new_battery("SN-1")).await.unwrap();

        let staff = Principal::new("desk", Role::Staff);
        assert!(matches!(
            svc.delete_battery(&staff, &b.id).await.unwrap_err(),
            DomainError::Forbidden(_)
        ));

        let admin = Principal::new("root", Role::Admin);
        svc.delete_battery(&admin, &b.id).await.unwrap();
        assert!(svc.get_battery(&b.id).await.unwrap_err().is_not_found());
    }
}
