//! Payment DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{Payment, PaymentFilter, PaymentMethod, PaymentReceipt};
use crate::interfaces::http::common::{bad_request, ApiError};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentDto {
    pub id: String,
    pub rental_id: String,
    pub customer_id: String,
    /// Smallest currency unit
    pub amount: i64,
    pub payment_date: String,
    /// CASH, MOBILE_MONEY or BANK_TRANSFER
    pub payment_method: String,
    pub created_at: String,
}

impl From<Payment> for PaymentDto {
    fn from(p: Payment) -> Self {
        Self {
            id: p.id,
            rental_id: p.rental_id,
            customer_id: p.customer_id,
            amount: p.amount,
            payment_date: p.payment_date.to_rfc3339(),
            payment_method: p.payment_method.to_string(),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Outcome of recording a payment
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PaymentReceiptDto {
    pub payment: PaymentDto,
    /// Paid on the rental so far, this payment included
    pub total_paid: i64,
    pub rental_paid: bool,
    pub balance_due: i64,
}

impl From<PaymentReceipt> for PaymentReceiptDto {
    fn from(r: PaymentReceipt) -> Self {
        Self {
            payment: r.payment.into(),
            total_paid: r.total_paid,
            rental_paid: r.rental_paid,
            balance_due: r.balance_due,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RecordPaymentRequest {
    #[validate(length(min = 1))]
    pub rental_id: String,
    /// Must be the rental's customer
    #[validate(length(min = 1))]
    pub customer_id: String,
    /// Must be greater than zero
    pub amount: i64,
    /// CASH, MOBILE_MONEY or BANK_TRANSFER
    pub payment_method: String,
}

impl RecordPaymentRequest {
    pub fn method(&self) -> Result<PaymentMethod, ApiError> {
        PaymentMethod::from_str(&self.payment_method).ok_or_else(|| {
            bad_request(
                "payment_method",
                format!(
                    "unknown payment method '{}', expected CASH, MOBILE_MONEY or BANK_TRANSFER",
                    self.payment_method
                ),
            )
        })
    }
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListPaymentsParams {
    pub rental_id: Option<String>,
    pub customer_id: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListPaymentsParams {
    pub fn to_filter(&self) -> PaymentFilter {
        PaymentFilter {
            rental_id: self.rental_id.clone(),
            customer_id: self.customer_id.clone(),
        }
    }
}
