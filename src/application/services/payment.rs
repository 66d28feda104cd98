//! Payment Ledger

use std::sync::Arc;

use tracing::info;

use super::credit_rating::CreditRatingService;
use crate::domain::payment::{Payment, PaymentFilter, PaymentMethod, PaymentReceipt};
use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::PaginatedResult;

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub rental_id: String,
    pub customer_id: String,
    pub amount: i64,
    pub payment_method: PaymentMethod,
}

pub struct PaymentService {
    repos: Arc<dyn RepositoryProvider>,
    credit: Arc<CreditRatingService>,
}

impl PaymentService {
    pub fn new(repos: Arc<dyn RepositoryProvider>, credit: Arc<CreditRatingService>) -> Self {
        Self { repos, credit }
    }

    /// Append a payment and settle the rental once fully covered.
    ///
    /// Overpayment is accepted; the receipt's balance never goes negative.
    pub async fn record_payment(&self, input: NewPayment) -> DomainResult<PaymentReceipt> {
        if input.amount <= 0 {
            return Err(DomainError::invalid("amount", "must be greater than zero"));
        }

        let rental = self
            .repos
            .rentals()
            .find_by_id(&input.rental_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Rental", input.rental_id.clone()))?;

        self.repos
            .customers()
            .find_by_id(&input.customer_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Customer", input.customer_id.clone()))?;

        if rental.customer_id != input.customer_id {
            return Err(DomainError::Conflict(format!(
                "customer {} does not match rental {}",
                input.customer_id, rental.id
            )));
        }

        let receipt = self
            .repos
            .payments()
            .record(Payment::new(
                input.rental_id,
                input.customer_id,
                input.amount,
                input.payment_method,
            ))
            .await?;

        metrics::counter!("payments_recorded_total").increment(1);
        info!(
            payment_id = %receipt.payment.id,
            rental_id = %receipt.payment.rental_id,
            amount = receipt.payment.amount,
            method = %receipt.payment.payment_method,
            total_paid = receipt.total_paid,
            balance_due = receipt.balance_due,
            "Payment recorded"
        );

        self.credit
            .refresh_after_event(&receipt.payment.customer_id)
            .await;
        Ok(receipt)
    }

    pub async fn get_payment(&self, id: &str) -> DomainResult<Payment> {
        self.repos
            .payments()
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::not_found("Payment", id))
    }

    pub async fn list_payments(
        &self,
        filter: &PaymentFilter,
        page: u32,
        limit: u32,
    ) -> DomainResult<PaginatedResult<Payment>> {
        let all = self.repos.payments().find_all(filter).await?;
        Ok(PaginatedResult::paginate(all, page, limit))
    }
}

// ── Tests ──────────────────────────────────────────────────────
