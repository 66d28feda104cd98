//! SeaORM implementation of RentalRepository
//!
//! `open` and `close` run inside a database transaction. The battery status
//! and the rental's return date are flipped with conditional updates, so a
//! concurrent writer that got there first leaves `rows_affected == 0` and
//! the whole unit is rolled back.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::{debug, info};

use crate::domain::rental::{Rental, RentalFilter, RentalRepository, RentalState};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{battery, rental};
use crate::shared::errors::db_err;

pub struct SeaOrmRentalRepository {
    db: DatabaseConnection,
}

impl SeaOrmRentalRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

pub(super) fn model_to_domain(m: rental::Model) -> Rental {
    Rental {
        id: m.id,
        battery_id: m.battery_id,
        customer_id: m.customer_id,
        rent_date: m.rent_date,
        return_date: m.return_date,
        rental_price: m.rental_price,
        is_paid: m.is_paid,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl RentalRepository for SeaOrmRentalRepository {
    async fn open(&self, r: Rental) -> DomainResult<Rental> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let flipped = battery::Entity::update_many()
            .col_expr(
                battery::Column::Status,
                Expr::value(battery::BatteryStatus::Rented),
            )
            .col_expr(battery::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(battery::Column::Id.eq(r.battery_id.as_str()))
            .filter(battery::Column::Status.eq(battery::BatteryStatus::Available))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if flipped.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::Conflict(format!(
                "battery {} is not available",
                r.battery_id
            )));
        }

        let model = rental::ActiveModel {
            id: Set(r.id),
            battery_id: Set(r.battery_id),
            customer_id: Set(r.customer_id),
            rent_date: Set(r.rent_date),
            return_date: Set(None),
            rental_price: Set(r.rental_price),
            is_paid: Set(r.is_paid),
            created_at: Set(r.created_at),
            updated_at: Set(r.updated_at),
        };
        let saved = model.insert(&txn).await.map_err(db_err)?;
        txn.commit().await.map_err(db_err)?;

        info!(
            rental_id = %saved.id,
            battery_id = %saved.battery_id,
            customer_id = %saved.customer_id,
            "Rental opened"
        );
        Ok(model_to_domain(saved))
    }

    async fn close(
        &self,
        id: &str,
        return_date: DateTime<Utc>,
        is_paid: Option<bool>,
    ) -> DomainResult<Rental> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let existing = rental::Entity::find_by_id(id.to_string())
            .one(&txn)
            .await
            .map_err(db_err)?;
        let Some(existing) = existing else {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::not_found("Rental", id));
        };

        let now = Utc::now();
        let mut update = rental::Entity::update_many()
            .col_expr(rental::Column::ReturnDate, Expr::value(Some(return_date)))
            .col_expr(rental::Column::UpdatedAt, Expr::value(now));
        if let Some(paid) = is_paid {
            update = update.col_expr(rental::Column::IsPaid, Expr::value(paid));
        }
        let closed = update
            .filter(rental::Column::Id.eq(id))
            .filter(rental::Column::ReturnDate.is_null())
            .exec(&txn)
            .await
            .map_err(db_err)?;

        if closed.rows_affected == 0 {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::Conflict(format!(
                "rental {} has already been returned",
                id
            )));
        }

        battery::Entity::update_many()
            .col_expr(
                battery::Column::Status,
                Expr::value(battery::BatteryStatus::Available),
            )
            .col_expr(battery::Column::UpdatedAt, Expr::value(now))
            .filter(battery::Column::Id.eq(existing.battery_id.as_str()))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let reloaded = rental::Entity::find_by_id(id.to_string())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| DomainError::not_found("Rental", id))?;

        txn.commit().await.map_err(db_err)?;

        info!(rental_id = id, battery_id = %reloaded.battery_id, "Rental closed");
        Ok(model_to_domain(reloaded))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Rental>> {
        let model = rental::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self, filter: &RentalFilter) -> DomainResult<Vec<Rental>> {
        debug!(?filter, "Listing rentals");

        let mut condition = Condition::all();
        if let Some(customer_id) = &filter.customer_id {
            condition = condition.add(rental::Column::CustomerId.eq(customer_id.as_str()));
        }
        if let Some(battery_id) = &filter.battery_id {
            condition = condition.add(rental::Column::BatteryId.eq(battery_id.as_str()));
        }
        match filter.state {
            Some(RentalState::Open) => {
                condition = condition.add(rental::Column::ReturnDate.is_null());
            }
            Some(RentalState::Returned) => {
                condition = condition.add(rental::Column::ReturnDate.is_not_null());
            }
            None => {}
        }

        let models = rental::Entity::find()
            .filter(condition)
            .order_by_desc(rental::Column::RentDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::battery::{Battery, BatteryRepository, BatteryStatus};
    use crate::domain::customer::{Customer, CustomerRepository};
    use crate::infrastructure::database::repositories::{
        SeaOrmBatteryRepository, SeaOrmCustomerRepository,
    };
    use crate::infrastructure::database::test_connection;
    use chrono::Duration;

    struct Fixture {
        batteries: SeaOrmBatteryRepository,
        rentals: SeaOrmRentalRepository,
        battery: Battery,
        customer: Customer,
    }

    async fn fixture() -> Fixture {
        let db = test_connection().await;
        let batteries = SeaOrmBatteryRepository::new(db.clone());
        let customers = SeaOrmCustomerRepository::new(db.clone());
        let battery = batteries
            .save(Battery::new("SN-1", 5000, BatteryStatus::Available))
            .await
            .unwrap();
        let customer = customers
            .save(Customer::new("Alice", "0700000001", "1 Main St", 3))
            .await
            .unwrap();
        Fixture {
            batteries,
            rentals: SeaOrmRentalRepository::new(db),
            battery,
            customer,
        }
    }

    #[tokio::test]
    async fn open_marks_battery_rented() {
        let f = fixture().await;
        let r = f
            .rentals
            .open(Rental::open(&f.battery.id, &f.customer.id, 300, false))
            .await
            .unwrap();
        assert!(r.is_open());

        let b = f.batteries.find_by_id(&f.battery.id).await.unwrap().unwrap();
        assert_eq!(b.status, BatteryStatus::Rented);
    }

    #[tokio::test]
    async fn second_open_on_same_battery_conflicts_and_writes_nothing() {
        let f = fixture().await;
        f.rentals
            .open(Rental::open(&f.battery.id, &f.customer.id, 300, false))
            .await
            .unwrap();

        let err = f
            .rentals
            .open(Rental::open(&f.battery.id, &f.customer.id, 300, false))
            .await
            .unwrap_err();
        assert!(err.is_conflict());

        let all = f.rentals.find_all(&RentalFilter::default()).await.unwrap();
        assert_eq!(all.len(), 1);
    }

    #[tokio::test]
    async fn close_releases_battery_once() {
        let f = fixture().await;
        let r = f
            .rentals
            .open(Rental::open(&f.battery.id, &f.customer.id, 300, false))
            .await
            .unwrap();

        let back = r.rent_date + Duration::days(2);
        let closed = f.rentals.close(&r.id, back, Some(true)).await.unwrap();
        assert_eq!(closed.return_date, Some(back));
        assert!(closed.is_paid);

        let b = f.batteries.find_by_id(&f.battery.id).await.unwrap().unwrap();
        assert_eq!(b.status, BatteryStatus::Available);

        let err = f.rentals.close(&r.id, back, None).await.unwrap_err();
        assert!(err.is_conflict());

        let err = f.rentals.close("missing", back, None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn close_without_flag_keeps_is_paid() {
        let f = fixture().await;
        let r = f
            .rentals
            .open(Rental::open(&f.battery.id, &f.customer.id, 300, true))
            .await
            .unwrap();
        let closed = f.rentals.close(&r.id, Utc::now(), None).await.unwrap();
        assert!(closed.is_paid);
    }

    #[tokio::test]
    async fn find_all_by_state() {
        let f = fixture().await;
        let first = f
            .rentals
            .open(Rental::open(&f.battery.id, &f.customer.id, 300, false))
            .await
            .unwrap();
        f.rentals.close(&first.id, Utc::now(), None).await.unwrap();
        f.rentals
            .open(Rental::open(&f.battery.id, &f.customer.id, 300, false))
            .await
            .unwrap();

        let open = RentalFilter {
            state: Some(RentalState::Open),
            ..RentalFilter::default()
        };
        assert_eq!(f.rentals.find_all(&open).await.unwrap().len(), 1);

        let returned = RentalFilter {
            state: Some(RentalState::Returned),
            ..RentalFilter::default()
        };
        let returned = f.rentals.find_all(&returned).await.unwrap();
        assert_eq!(returned.len(), 1);
        assert_eq!(returned[0].id, first.id);

        let mine = f
            .rentals
            .find_all(&RentalFilter::for_customer(&f.customer.id))
            .await
            .unwrap();
        assert_eq!(mine.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_opens_on_one_battery_leave_one_rental() {
        use crate::infrastructure::database::migrator::{Migrator, MigratorTrait};
        use crate::infrastructure::database::{init_database, DatabaseConfig};

        let path = std::env::temp_dir().join(format!("rental-race-{}.db", uuid::Uuid::new_v4()));
        let mut config = DatabaseConfig::sqlite(path.to_str().unwrap());
        config.max_connections = 8;
        let db = init_database(&config).await.unwrap();
        Migrator::up(&db, None).await.unwrap();

        let battery = SeaOrmBatteryRepository::new(db.clone())
            .save(Battery::new("SN-RACE", 5000, BatteryStatus::Available))
            .await
            .unwrap();
        let customer = SeaOrmCustomerRepository::new(db.clone())
            .save(Customer::new("Alice", "0700000001", "1 Main St", 3))
            .await
            .unwrap();

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let rentals = SeaOrmRentalRepository::new(db.clone());
                let rental = Rental::open(&battery.id, &customer.id, 300, false);
                tokio::spawn(async move { rentals.open(rental).await })
            })
            .collect();

        let mut opened = 0;
        for attempt in attempts {
            match attempt.await.unwrap() {
                Ok(_) => opened += 1,
                Err(e) => assert!(e.is_conflict(), "unexpected error: {e}"),
            }
        }
        assert_eq!(opened, 1);

        let open = RentalFilter {
            state: Some(RentalState::Open),
            ..RentalFilter::default()
        };
        let rentals = SeaOrmRentalRepository::new(db.clone());
        assert_eq!(rentals.find_all(&open).await.unwrap().len(), 1);

        db.close().await.unwrap();
        std::fs::remove_file(&path).ok();
    }
}
