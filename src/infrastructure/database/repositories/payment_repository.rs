//! SeaORM implementation of PaymentRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use tracing::info;

use crate::domain::payment::{
    Payment, PaymentFilter, PaymentMethod, PaymentReceipt, PaymentRepository,
};
use crate::domain::{DomainError, DomainResult};
use crate::infrastructure::database::entities::{payment, rental};
use crate::shared::errors::db_err;

use super::rental_repository;

pub struct SeaOrmPaymentRepository {
    db: DatabaseConnection,
}

impl SeaOrmPaymentRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

// ── Conversion helpers ──────────────────────────────────────────

fn method_to_entity(method: PaymentMethod) -> payment::PaymentMethod {
    match method {
        PaymentMethod::Cash => payment::PaymentMethod::Cash,
        PaymentMethod::MobileMoney => payment::PaymentMethod::MobileMoney,
        PaymentMethod::BankTransfer => payment::PaymentMethod::BankTransfer,
    }
}

fn method_from_entity(method: payment::PaymentMethod) -> PaymentMethod {
    match method {
        payment::PaymentMethod::Cash => PaymentMethod::Cash,
        payment::PaymentMethod::MobileMoney => PaymentMethod::MobileMoney,
        payment::PaymentMethod::BankTransfer => PaymentMethod::BankTransfer,
    }
}

fn model_to_domain(m: payment::Model) -> Payment {
    Payment {
        id: m.id,
        rental_id: m.rental_id,
        customer_id: m.customer_id,
        amount: m.amount,
        payment_date: m.payment_date,
        payment_method: method_from_entity(m.payment_method),
        created_at: m.created_at,
        updated_at: m.updated_at,
    }
}

// ── PaymentRepository impl ──────────────────────────────────────

#[async_trait]
impl PaymentRepository for SeaOrmPaymentRepository {
    async fn record(&self, p: Payment) -> DomainResult<PaymentReceipt> {
        let txn = self.db.begin().await.map_err(db_err)?;

        let rental_model = rental::Entity::find_by_id(p.rental_id.clone())
            .one(&txn)
            .await
            .map_err(db_err)?;
        let Some(rental_model) = rental_model else {
            txn.rollback().await.map_err(db_err)?;
            return Err(DomainError::not_found("Rental", p.rental_id));
        };

        let model = payment::ActiveModel {
            id: Set(p.id),
            rental_id: Set(p.rental_id),
            customer_id: Set(p.customer_id),
            amount: Set(p.amount),
            payment_date: Set(p.payment_date),
            payment_method: Set(method_to_entity(p.payment_method)),
            created_at: Set(p.created_at),
            updated_at: Set(p.updated_at),
        };
        let saved = model.insert(&txn).await.map_err(db_err)?;

        let total_paid: i64 = payment::Entity::find()
            .filter(payment::Column::RentalId.eq(rental_model.id.as_str()))
            .all(&txn)
            .await
            .map_err(db_err)?
            .iter()
            .map(|m| m.amount)
            .sum();

        let mut rental = rental_repository::model_to_domain(rental_model);
        if !rental.is_paid && total_paid >= rental.rental_price {
            rental::Entity::update_many()
                .col_expr(rental::Column::IsPaid, Expr::value(true))
                .col_expr(rental::Column::UpdatedAt, Expr::value(Utc::now()))
                .filter(rental::Column::Id.eq(rental.id.as_str()))
                .exec(&txn)
                .await
                .map_err(db_err)?;
            rental.is_paid = true;
            info!(rental_id = %rental.id, total_paid, "Rental fully paid");
        }

        txn.commit().await.map_err(db_err)?;

        info!(
            payment_id = %saved.id,
            rental_id = %saved.rental_id,
            amount = saved.amount,
            "Payment recorded"
        );
        Ok(PaymentReceipt {
            payment: model_to_domain(saved),
            total_paid,
            rental_paid: rental.is_paid,
            balance_due: rental.balance_due(total_paid),
        })
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Payment>> {
        let model = payment::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?;
        Ok(model.map(model_to_domain))
    }

    async fn find_all(&self, filter: &PaymentFilter) -> DomainResult<Vec<Payment>> {
        let mut condition = Condition::all();
        if let Some(rental_id) = &filter.rental_id {
            condition = condition.add(payment::Column::RentalId.eq(rental_id.as_str()));
        }
        if let Some(customer_id) = &filter.customer_id {
            condition = condition.add(payment::Column::CustomerId.eq(customer_id.as_str()));
        }

        let models = payment::Entity::find()
            .filter(condition)
            .order_by_desc(payment::Column::PaymentDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }

    async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Payment>> {
        let models = payment::Entity::find()
            .filter(payment::Column::PaymentDate.gte(from))
            .filter(payment::Column::PaymentDate.lt(to))
            .order_by_asc(payment::Column::PaymentDate)
            .all(&self.db)
            .await
            .map_err(db_err)?;
        Ok(models.into_iter().map(model_to_domain).collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────
