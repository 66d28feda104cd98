//! Customer domain entity

use chrono::{DateTime, Utc};

/// Rating given to a customer before any rental history exists
pub const DEFAULT_CREDIT_RATING: u8 = 3;

/// Highest possible credit rating
pub const MAX_CREDIT_RATING: u8 = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct Customer {
    pub id: String,
    pub name: String,
    /// Unique contact number
    pub phone_number: String,
    pub address: String,
    /// Derived 0..=5 score, see `domain::credit`
    pub credit_rating: u8,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn new(
        name: impl Into<String>,
        phone_number: impl Into<String>,
        address: impl Into<String>,
        credit_rating: u8,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            phone_number: phone_number.into(),
            address: address.into(),
            credit_rating: credit_rating.min(MAX_CREDIT_RATING),
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive match on name or phone number
    pub fn matches(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.phone_number.contains(&needle)
    }
}

/// Editable customer fields. The credit rating is deliberately absent.
#[derive(Debug, Clone, Default)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub phone_number: Option<String>,
    pub address: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_customer_clamps_rating() {
        let c = Customer::new("Amina", "+255700000001", "Dodoma", 9);
        assert_eq!(c.credit_rating, MAX_CREDIT_RATING);
    }

    #[test]
    fn matches_name_and_phone() {
        let c = Customer::new("Amina Said", "0700000001", "Dodoma", 3);
        assert!(c.matches("amina"));
        assert!(c.matches("SAID"));
        assert!(c.matches("0700"));
        assert!(!c.matches("juma"));
    }
}
