//! SeaORM implementation of BatteryRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info};

use crate::domain::battery::{Battery, BatteryRepository, BatteryStatus};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{battery, rental};
use crate::shared::errors::db_err;

pub struct SeaOrmBatteryRepository {
    db: DatabaseConnection,
}

impl SeaOrmBatteryRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn status_to_entity(status: BatteryStatus) -> battery::BatteryStatus {
    match status {
        BatteryStatus::Available => battery::BatteryStatus::Available,
        BatteryStatus::Rented => battery::BatteryStatus::Rented,
        BatteryStatus::Maintenance => battery::BatteryStatus::Maintenance,
    }
}

fn status_from_entity(status: battery::BatteryStatus) -> BatteryStatus {
    match status {
        battery::BatteryStatus::Available => BatteryStatus::Available,
        battery::BatteryStatus::Rented => BatteryStatus::Rented,
        battery::BatteryStatus::Maintenance => BatteryStatus::Maintenance,
    }
}

fn model_to_domain(m: battery::Model) -> Battery {
    Battery {
        id: m.id,
        serial_number: m.serial_number,
        price: m.price,
        status: status_from_entity(m.status),
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

// ── BatteryRepository impl ──────────────────────────────────────

#[async_trait]
impl BatteryRepository for SeaOrmBatteryRepository {
    async fn save(&self, b: Battery) -> DomainResult<Battery> {
        let model = battery::ActiveModel {
            id: Set(b.id),
            serial_number: Set(b.serial_number),
            price: Set(b.price),
            status: Set(status_to_entity(b.status)),
            created_at: Set(b.created_at),
            updated_at: Set(b.updated_at),
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        info!(battery_id = %saved.id, serial = %saved.serial_number, "Battery saved");
        Ok(model_to_domain(saved))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Battery>> {
        let model = battery::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_serial(&self, serial_number: &str) -> DomainResult<Option<Battery>> {
        let model = battery::Entity::find()
            .filter(battery::Column::SerialNumber.eq(serial_number))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self, status: Option<BatteryStatus>) -> DomainResult<Vec<Battery>> {
        let mut query = battery::Entity::find();
        if let Some(s) = status {
            query = query.filter(battery::Column::Status.eq(status_to_entity(s)));
        }
        let models = query
            .order_by_asc(battery::Column::SerialNumber)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn update(&self, b: Battery) -> DomainResult<Battery> {
        let existing = battery::Entity::find_by_id(b.id.clone())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        let Some(existing) = existing else {
            return Err(DomainError::not_found("Battery", b.id));
        };
        let stored_status = existing.status;
        model_to_domain(existing).check_manual_status_change(b.status)?;

        let result = battery::Entity::update_many()
            .col_expr(battery::Column::SerialNumber, Expr::value(b.serial_number))
            .col_expr(battery::Column::Price, Expr::value(b.price))
            .col_expr(
                battery::Column::Status,
                Expr::value(status_to_entity(b.status)),
            )
            .col_expr(battery::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(battery::Column::Id.eq(b.id.as_str()))
            .filter(battery::Column::Status.eq(stored_status))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::Conflict(format!(
                "battery {} changed status concurrently, retry the update",
                b.id
            )));
        }

        let updated = battery::Entity::find_by_id(b.id.clone())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Battery", b.id.clone()))?;
        debug!(battery_id = %updated.id, "Battery updated");
        Ok(model_to_domain(updated))
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let rentals = rental::Entity::find()
            .filter(rental::Column::BatteryId.eq(id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if rentals > 0 {
            return Err(DomainError::Conflict(format!(
                "battery {} has {} rental(s) and cannot be deleted",
                id, rentals
            )));
        }

        let result = battery::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Battery", id));
        }
        info!(battery_id = id, "Battery deleted");
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::test_connection;

    #[tokio::test]
    async fn save_and_find() {
        let repo = SeaOrmBatteryRepository::new(test_connection().await);
        let b = repo
            .save(Battery::new("SN-1", 5000, BatteryStatus::Available))
            .await
            .unwrap();

        let by_id = repo.find_by_id(&b.id).await.unwrap().unwrap();
        assert_eq!(by_id.serial_number, "SN-1");
        assert_eq!(by_id.status, BatteryStatus::Available);

        let by_serial = repo.find_by_serial("SN-1").await.unwrap().unwrap();
        assert_eq!(by_serial.id, b.id);
        assert!(repo.find_by_id("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_serial_is_conflict() {
        let repo = SeaOrmBatteryRepository::new(test_connection().await);
        repo.save(Battery::new("SN-1", 5000, BatteryStatus::Available))
            .await
            .unwrap();
        let err = repo
            .save(Battery::new("SN-1", 7000, BatteryStatus::Maintenance))
            .await
            .unwrap_err();
        assert!(err.is_conflict(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn find_all_filters_by_status_and_sorts_by_serial() {
        let repo = SeaOrmBatteryRepository::new(test_connection().await);
        for (serial, status) in [
            ("SN-3", BatteryStatus::Available),
            ("SN-1", BatteryStatus::Available),
            ("SN-2", BatteryStatus::Maintenance),
        ] {
            repo.save(Battery::new(serial, 100, status)).await.unwrap();
        }

        let all = repo.find_all(None).await.unwrap();
        let serials: Vec<_> = all.iter().map(|b| b.serial_number.as_str()).collect();
        assert_eq!(serials, vec!["SN-1", "SN-2", "SN-3"]);

        let available = repo.find_all(Some(BatteryStatus::Available)).await.unwrap();
        assert_eq!(available.len(), 2);
    }

    #[tokio::test]
    async fn update_and_delete() {
        let repo = SeaOrmBatteryRepository::new(test_connection().await);
        let mut b = repo
            .save(Battery::new("SN-1", 100, BatteryStatus::Available))
            .await
            .unwrap();

        b.price = 250;
        b.status = BatteryStatus::Maintenance;
        let updated = repo.update(b.clone()).await.unwrap();
        assert_eq!(updated.price, 250);
        assert_eq!(updated.status, BatteryStatus::Maintenance);

        let mut rented = updated.clone();
        rented.status = BatteryStatus::Rented;
        assert!(repo.update(rented).await.unwrap_err().is_conflict());

        repo.delete(&b.id).await.unwrap();
        assert!(repo.find_by_id(&b.id).await.unwrap().is_none());
        assert!(repo.delete(&b.id).await.unwrap_err().is_not_found());
    }
}
