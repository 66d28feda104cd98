//! Payment domain entity

use chrono::{DateTime, Utc};

/// How the money was received
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    BankTransfer,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "CASH",
            Self::MobileMoney => "MOBILE_MONEY",
            Self::BankTransfer => "BANK_TRANSFER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_uppercase().as_str() {
            "CASH" => Some(Self::Cash),
            "MOBILE_MONEY" => Some(Self::MobileMoney),
            "BANK_TRANSFER" => Some(Self::BankTransfer),
            _ => None,
        }
    }
}

impl std::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Append-only money record against a rental
#[derive(Debug, Clone, PartialEq)]
pub struct Payment {
    pub id: String,
    pub rental_id: String,
    /// Copy of the rental's customer, kept for querying
    pub customer_id: String,
    /// Amount in the smallest currency unit, always > 0
    pub amount: i64,
    pub payment_date: DateTime<Utc>,
    pub payment_method: PaymentMethod,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn new(
        rental_id: impl Into<String>,
        customer_id: impl Into<String>,
        amount: i64,
        payment_method: PaymentMethod,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            rental_id: rental_id.into(),
            customer_id: customer_id.into(),
            amount,
            payment_date: now,
            payment_method,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Outcome of recording a payment
#[derive(Debug, Clone)]
pub struct PaymentReceipt {
    pub payment: Payment,
    /// Sum of all payments on the rental, this one included
    pub total_paid: i64,
    /// Rental `is_paid` after this payment
    pub rental_paid: bool,
    /// Remaining balance, clamped at zero
    pub balance_due: i64,
}

#[derive(Debug, Clone, Default)]
pub struct PaymentFilter {
    pub rental_id: Option<String>,
    pub customer_id: Option<String>,
}

impl PaymentFilter {
    pub fn for_rental(rental_id: impl Into<String>) -> Self {
        Self {
            rental_id: Some(rental_id.into()),
            ..Self::default()
        }
    }

    pub fn for_customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, payment: &Payment) -> bool {
        self.rental_id
            .as_ref()
            .map_or(true, |id| &payment.rental_id == id)
            && self
                .customer_id
                .as_ref()
                .map_or(true, |id| &payment.customer_id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_parse() {
        assert_eq!(PaymentMethod::from_str("cash"), Some(PaymentMethod::Cash));
        assert_eq!(
            PaymentMethod::from_str("MOBILE_MONEY"),
            Some(PaymentMethod::MobileMoney)
        );
        assert_eq!(
            PaymentMethod::from_str("bank_transfer"),
            Some(PaymentMethod::BankTransfer)
        );
        assert_eq!(PaymentMethod::from_str("cheque"), None);
    }

    #[test]
    fn filter_matches_rental_and_customer() {
        let p = Payment::new("ren-1", "cus-1", 50, PaymentMethod::Cash);
        assert!(PaymentFilter::default().matches(&p));
        assert!(PaymentFilter::for_rental("ren-1").matches(&p));
        assert!(!PaymentFilter::for_rental("ren-2").matches(&p));
        assert!(PaymentFilter::for_customer("cus-1").matches(&p));
        assert!(!PaymentFilter::for_customer("cus-9").matches(&p));
    }
}
