//! Rental DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::application::RentalDetail;
use crate::domain::{Rental, RentalFilter, RentalState};
use crate::interfaces::http::common::{bad_request, ApiError};
use crate::interfaces::http::modules::payments::PaymentDto;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RentalDto {
    pub id: String,
    pub battery_id: String,
    pub customer_id: String,
    pub rent_date: String,
    /// `null` while the battery is out
    pub return_date: Option<String>,
    /// Agreed price in smallest currency unit
    pub rental_price: i64,
    pub is_paid: bool,
    /// `open` or `returned`
    pub status: String,
    /// Whole days between rent and return, once returned
    pub rental_days: Option<i64>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Rental> for RentalDto {
    fn from(r: Rental) -> Self {
        let status = if r.is_open() { "open" } else { "returned" };
        Self {
            rental_days: r.rental_days(),
            status: status.to_string(),
            id: r.id,
            battery_id: r.battery_id,
            customer_id: r.customer_id,
            rent_date: r.rent_date.to_rfc3339(),
            return_date: r.return_date.map(|d| d.to_rfc3339()),
            rental_price: r.rental_price,
            is_paid: r.is_paid,
            created_at: r.created_at.to_rfc3339(),
            updated_at: r.updated_at.to_rfc3339(),
        }
    }
}

/// Rental with its payment history
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RentalDetailDto {
    pub rental: RentalDto,
    pub payments: Vec<PaymentDto>,
    pub total_paid: i64,
    pub balance_due: i64,
}

impl From<RentalDetail> for RentalDetailDto {
    fn from(d: RentalDetail) -> Self {
        Self {
            rental: d.rental.into(),
            payments: d.payments.into_iter().map(PaymentDto::from).collect(),
            total_paid: d.total_paid,
            balance_due: d.balance_due,
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateRentalRequest {
    #[validate(length(min = 1))]
    pub battery_id: String,
    #[validate(length(min = 1))]
    pub customer_id: String,
    /// Must be greater than zero
    pub rental_price: i64,
    /// Paid upfront
    #[serde(default)]
    pub is_paid: bool,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct ReturnBatteryRequest {
    /// RFC 3339 timestamp, now when omitted
    pub return_date: Option<String>,
    /// Override the paid flag at return time
    pub is_paid: Option<bool>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListRentalsParams {
    pub customer_id: Option<String>,
    pub battery_id: Option<String>,
    /// `open` or `returned`
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListRentalsParams {
    pub fn to_filter(&self) -> Result<RentalFilter, ApiError> {
        let state = match self.status.as_deref() {
            None => None,
            Some(raw) => Some(RentalState::from_str(raw).ok_or_else(|| {
                bad_request(
                    "status",
                    format!("unknown rental status '{}', expected open or returned", raw),
                )
            })?),
        };
        Ok(RentalFilter {
            customer_id: self.customer_id.clone(),
            battery_id: self.battery_id.clone(),
            state,
        })
    }
}

pub fn parse_timestamp(field: &'static str, raw: &str) -> Result<DateTime<Utc>, ApiError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| bad_request(field, format!("expected an RFC 3339 timestamp: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_params_reject_unknown_status() {
        let params = ListRentalsParams {
            customer_id: None,
            battery_id: None,
            status: Some("lost".into()),
            page: None,
            limit: None,
        };
        let (status, _) = params.to_filter().unwrap_err();
        assert_eq!(status, axum::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn timestamps_keep_their_instant() {
        let ts = parse_timestamp("return_date", "2025-03-01T12:00:00+02:00").unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-03-01T10:00:00+00:00");
        assert!(parse_timestamp("return_date", "yesterday").is_err());
    }
}
