//! Payment repository interface

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::model::{Payment, PaymentFilter, PaymentReceipt};
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Append the payment and, in the same unit of work, mark the rental paid
    /// once the cumulative amount reaches its price. Never clears `is_paid`.
    async fn record(&self, payment: Payment) -> DomainResult<PaymentReceipt>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Payment>>;

    /// Matching payments, newest first
    async fn find_all(&self, filter: &PaymentFilter) -> DomainResult<Vec<Payment>>;

    /// Payments with `from <= payment_date < to`
    async fn find_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> DomainResult<Vec<Payment>>;
}
