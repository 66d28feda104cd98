//! Rental domain entity

use chrono::{DateTime, Utc};

const SECONDS_PER_DAY: i64 = 86_400;

/// Time-bounded assignment of one battery to one customer
#[derive(Debug, Clone, PartialEq)]
pub struct Rental {
    pub id: String,
    pub battery_id: String,
    pub customer_id: String,
    pub rent_date: DateTime<Utc>,
    /// `None` while the battery is still out
    pub return_date: Option<DateTime<Utc>>,
    /// Agreed price in the smallest currency unit
    pub rental_price: i64,
    pub is_paid: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Rental {
    /// Start a rental now
    pub fn open(
        battery_id: impl Into<String>,
        customer_id: impl Into<String>,
        rental_price: i64,
        is_paid: bool,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            battery_id: battery_id.into(),
            customer_id: customer_id.into(),
            rent_date: now,
            return_date: None,
            rental_price,
            is_paid,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_open(&self) -> bool {
        self.return_date.is_none()
    }

    /// Whole days the battery was out, counting a started day as a full one.
    ///
    /// `None` for open rentals.
    pub fn rental_days(&self) -> Option<i64> {
        self.return_date.map(|end| {
            let secs = (end - self.rent_date).num_seconds();
            if secs <= 0 {
                0
            } else {
                (secs + SECONDS_PER_DAY - 1) / SECONDS_PER_DAY
            }
        })
    }

    /// Returned, and within `period_days` of the rent date
    pub fn returned_within(&self, period_days: i64) -> bool {
        self.rental_days().is_some_and(|days| days <= period_days)
    }

    /// Amount still owed given what has been paid so far (never negative)
    pub fn balance_due(&self, total_paid: i64) -> i64 {
        if self.is_paid {
            0
        } else {
            (self.rental_price - total_paid).max(0)
        }
    }

    /// Close the rental in memory. Used by gateways after their own checks.
    pub fn close(&mut self, return_date: DateTime<Utc>, is_paid: Option<bool>) {
        self.return_date = Some(return_date);
        if let Some(paid) = is_paid {
            self.is_paid = paid;
        }
        self.updated_at = Utc::now();
    }
}

/// Open / returned filter for rental listings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RentalState {
    Open,
    Returned,
}

impl RentalState {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "open" | "active" => Some(Self::Open),
            "returned" | "closed" => Some(Self::Returned),
            _ => None,
        }
    }
}

/// Listing criteria; `None` fields do not constrain the result
#[derive(Debug, Clone, Default)]
pub struct RentalFilter {
    pub customer_id: Option<String>,
    pub battery_id: Option<String>,
    pub state: Option<RentalState>,
}

impl RentalFilter {
    pub fn for_customer(customer_id: impl Into<String>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            ..Self::default()
        }
    }

    pub fn matches(&self, rental: &Rental) -> bool {
        if let Some(customer_id) = &self.customer_id {
            if &rental.customer_id != customer_id {
                return false;
            }
        }
        if let Some(battery_id) = &self.battery_id {
            if &rental.battery_id != battery_id {
                return false;
            }
        }
        match self.state {
            Some(RentalState::Open) => rental.is_open(),
            Some(RentalState::Returned) => !rental.is_open(),
            None => true,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Rental {
        Rental::open("bat-1", "cus-1", 100, false)
    }

    #[test]
    fn open_rental_has_no_return_date() {
        let r = sample();
        assert!(r.is_open());
        assert_eq!(r.rental_days(), None);
        assert!(!r.returned_within(7));
    }

    #[test]
    fn close_sets_return_date_and_paid_override() {
        let mut r = sample();
        let when = r.rent_date + Duration::days(2);
        r.close(when, Some(true));
        assert!(!r.is_open());
        assert_eq!(r.return_date, Some(when));
        assert!(r.is_paid);
    }

    #[test]
    fn close_without_override_keeps_paid_flag() {
        let mut r = sample();
        r.close(r.rent_date, None);
        assert!(!r.is_paid);
    }

    #[test]
    fn partial_day_counts_as_full_day() {
        let mut r = sample();
        r.return_date = Some(r.rent_date + Duration::days(7) + Duration::seconds(1));
        assert_eq!(r.rental_days(), Some(8));
        assert!(!r.returned_within(7));
    }

    #[test]
    fn exactly_seven_days_is_on_time() {
        let mut r = sample();
        r.return_date = Some(r.rent_date + Duration::days(7));
        assert_eq!(r.rental_days(), Some(7));
        assert!(r.returned_within(7));
    }

    #[test]
    fn balance_due_never_negative() {
        let r = sample();
        assert_eq!(r.balance_due(40), 60);
        assert_eq!(r.balance_due(150), 0);

        let mut paid = sample();
        paid.is_paid = true;
        assert_eq!(paid.balance_due(0), 0);
    }

    #[test]
    fn filter_by_state_and_customer() {
        let open = sample();
        let mut returned = sample();
        returned.return_date = Some(returned.rent_date);

        let only_open = RentalFilter {
            state: Some(RentalState::Open),
            ..RentalFilter::default()
        };
        assert!(only_open.matches(&open));
        assert!(!only_open.matches(&returned));

        assert!(RentalFilter::for_customer("cus-1").matches(&open));
        assert!(!RentalFilter::for_customer("cus-2").matches(&open));
    }

    #[test]
    fn state_parse_accepts_aliases() {
        assert_eq!(RentalState::from_str("OPEN"), Some(RentalState::Open));
        assert_eq!(RentalState::from_str("active"), Some(RentalState::Open));
        assert_eq!(RentalState::from_str("returned"), Some(RentalState::Returned));
        assert_eq!(RentalState::from_str("lost"), None);
    }
}
