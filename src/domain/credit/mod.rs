//! Credit rating scoring
//!
//! Every rental earns up to [`MAX_POINTS_PER_RENTAL`] points:
//!
//! - 2 when it is fully paid, otherwise 1 when at least one payment exists
//! - 1 more when it was returned within the standard rental period
//!
//! The rating is the share of earned points scaled to `0..=5` and rounded
//! half up. A customer without rentals has no score (the stored rating is
//! left alone).

use std::collections::HashMap;

use crate::domain::customer::MAX_CREDIT_RATING;
use crate::domain::payment::Payment;
use crate::domain::rental::Rental;

/// Standard rental period used when nothing else is configured
pub const DEFAULT_STANDARD_PERIOD_DAYS: i64 = 7;

pub const MAX_POINTS_PER_RENTAL: u64 = 3;

const PAID_POINTS: u64 = 2;
const PARTIAL_PAYMENT_POINTS: u64 = 1;
const ON_TIME_POINTS: u64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreditPolicy {
    /// Returns at or under this many whole days count as on time
    pub standard_period_days: i64,
}

impl Default for CreditPolicy {
    fn default() -> Self {
        Self {
            standard_period_days: DEFAULT_STANDARD_PERIOD_DAYS,
        }
    }
}

impl CreditPolicy {
    pub fn new(standard_period_days: i64) -> Self {
        Self {
            standard_period_days,
        }
    }

    /// Points earned by a single rental given how many payments it has
    pub fn rental_points(&self, rental: &Rental, payment_count: usize) -> u64 {
        let payment_points = if rental.is_paid {
            PAID_POINTS
        } else if payment_count > 0 {
            PARTIAL_PAYMENT_POINTS
        } else {
            0
        };

        let timeliness_points = if rental.returned_within(self.standard_period_days) {
            ON_TIME_POINTS
        } else {
            0
        };

        payment_points + timeliness_points
    }

    /// Rating over a customer's full history.
    ///
    /// `payments` may contain payments of other rentals; only those whose
    /// `rental_id` is in `rentals` are counted. Returns `None` when `rentals`
    /// is empty.
    pub fn rate(&self, rentals: &[Rental], payments: &[Payment]) -> Option<u8> {
        if rentals.is_empty() {
            return None;
        }

        let mut payment_counts: HashMap<&str, usize> = HashMap::new();
        for payment in payments {
            *payment_counts.entry(payment.rental_id.as_str()).or_default() += 1;
        }

        let total: u64 = rentals
            .iter()
            .map(|r| {
                let count = payment_counts.get(r.id.as_str()).copied().unwrap_or(0);
                self.rental_points(r, count)
            })
            .sum();

        Some(scale_to_rating(total, rentals.len() as u64))
    }
}

/// round(total / (rentals * 3) * 5), half up, in integer arithmetic
fn scale_to_rating(total_points: u64, rentals: u64) -> u8 {
    let max = MAX_CREDIT_RATING as u64;
    let denominator = rentals * MAX_POINTS_PER_RENTAL;
    let rating = (2 * max * total_points + denominator) / (2 * denominator);
    rating.min(max) as u8
}

// ── Tests ──────────────────────────────────────────────────────
