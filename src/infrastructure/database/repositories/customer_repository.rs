//! SeaORM implementation of CustomerRepository

use async_trait::async_trait;
use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, info};

use crate::domain::customer::{Customer, CustomerRepository, MAX_CREDIT_RATING};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{customer, rental};
use crate::shared::errors::db_err;

pub struct SeaOrmCustomerRepository {
    db: DatabaseConnection,
}

impl SeaOrmCustomerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn model_to_domain(m: customer::Model) -> Customer {
    Customer {
        id: m.id,
        name: m.name,
        phone_number: m.phone_number,
        address: m.address,
        credit_rating: m.credit_rating.clamp(0, MAX_CREDIT_RATING as i32) as u8,
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

#[async_trait]
impl CustomerRepository for SeaOrmCustomerRepository {
    async fn save(&self, c: Customer) -> DomainResult<Customer> {
        let model = customer::ActiveModel {
            id: Set(c.id),
            name: Set(c.name),
            phone_number: Set(c.phone_number),
            address: Set(c.address),
            credit_rating: Set(c.credit_rating as i32),
            created_at: Set(c.created_at),
            updated_at: Set(c.updated_at),
        };
        let saved = model.insert(&self.db).await.map_err(db_err)?;
        info!(customer_id = %saved.id, "Customer saved");
        Ok(model_to_domain(saved))
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Customer>> {
        let model = customer::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_by_phone(&self, phone_number: &str) -> DomainResult<Option<Customer>> {
        let model = customer::Entity::find()
            .filter(customer::Column::PhoneNumber.eq(phone_number))
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self, search: Option<&str>) -> DomainResult<Vec<Customer>> {
        let models = customer::Entity::find()
            .order_by_asc(customer::Column::Name)
            .all(&self.db)
            .await
            .map_err(db_err)?;

        // Case folding differs between backends, so the search runs here.
        let customers = models.into_iter().map(model_to_domain);
        Ok(match search.map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => customers.filter(|c| c.matches(needle)).collect(),
            None => customers.collect(),
        })
    }

    async fn update(&self, c: Customer) -> DomainResult<Customer> {
        let existing = customer::Entity::find_by_id(c.id.clone())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        let Some(existing) = existing else {
            return Err(DomainError::not_found("Customer", c.id));
        };

        let mut model: customer::ActiveModel = existing.into();
        model.name = Set(c.name);
        model.phone_number = Set(c.phone_number);
        model.address = Set(c.address);
        model.updated_at = Set(Utc::now());

        let updated = model.update(&self.db).await.map_err(db_err)?;
        debug!(customer_id = %updated.id, "Customer updated");
        Ok(model_to_domain(updated))
    }

    async fn update_credit_rating(&self, id: &str, rating: u8) -> DomainResult<()> {
        let result = customer::Entity::update_many()
            .col_expr(
                customer::Column::CreditRating,
                Expr::value(rating.min(MAX_CREDIT_RATING) as i32),
            )
            .col_expr(customer::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(customer::Column::Id.eq(id))
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Customer", id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        let rentals = rental::Entity::find()
            .filter(rental::Column::CustomerId.eq(id))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        if rentals > 0 {
            return Err(DomainError::Conflict(format!(
                "customer {} has {} rental(s) and cannot be deleted",
                id, rentals
            )));
        }

        let result = customer::Entity::delete_by_id(id.to_string())
            .exec(&self.db)
            .await
            .map_err(db_err)?;
        if result.rows_affected == 0 {
            return Err(DomainError::not_found("Customer", id));
        }
        info!(customer_id = id, "Customer deleted");
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::customer::DEFAULT_CREDIT_RATING;
    use crate::infrastructure::database::test_connection;

    fn alice() -> Customer {
        Customer::new("Alice", "0700000001", "1 Main St", DEFAULT_CREDIT_RATING)
    }

    #[tokio::test]
    async fn save_find_and_search() {
        let repo = SeaOrmCustomerRepository::new(test_connection().await);
        let a = repo.save(alice()).await.unwrap();
        repo.save(Customer::new("Bob", "0700000002", "2 Main St", 3))
            .await
            .unwrap();

        assert_eq!(repo.find_by_id(&a.id).await.unwrap().unwrap().name, "Alice");
        assert_eq!(
            repo.find_by_phone("0700000001").await.unwrap().unwrap().id,
            a.id
        );

        let all = repo.find_all(None).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "Alice");

        let hits = repo.find_all(Some("ALI")).await.unwrap();
        assert_eq!(hits.len(), 1);
        let hits = repo.find_all(Some("0002")).await.unwrap();
        assert_eq!(hits[0].name, "Bob");
    }

    #[tokio::test]
    async fn duplicate_phone_is_conflict() {
        let repo = SeaOrmCustomerRepository::new(test_connection().await);
        repo.save(alice()).await.unwrap();
        let err = repo.save(alice()).await.unwrap_err();
        assert!(err.is_conflict(), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn credit_rating_update() {
        let repo = SeaOrmCustomerRepository::new(test_connection().await);
        let a = repo.save(alice()).await.unwrap();

        repo.update_credit_rating(&a.id, 5).await.unwrap();
        assert_eq!(repo.find_by_id(&a.id).await.unwrap().unwrap().credit_rating, 5);

        let err = repo.update_credit_rating("missing", 1).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn update_keeps_rating() {
        let repo = SeaOrmCustomerRepository::new(test_connection().await);
        let mut a = repo.save(alice()).await.unwrap();
        repo.update_credit_rating(&a.id, 1).await.unwrap();

        a.address = "9 Side St".into();
        a.credit_rating = 5;
        let updated = repo.update(a).await.unwrap();
        assert_eq!(updated.address, "9 Side St");
        assert_eq!(updated.credit_rating, 1);
    }
}
