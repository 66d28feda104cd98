//! Battery DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::domain::{Battery, BatteryStatus};
use crate::interfaces::http::common::{bad_request, ApiError};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BatteryDto {
    pub id: String,
    pub serial_number: String,
    /// Purchase price in smallest currency unit
    pub price: i64,
    /// AVAILABLE, RENTED or MAINTENANCE
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Battery> for BatteryDto {
    fn from(b: Battery) -> Self {
        Self {
            id: b.id,
            serial_number: b.serial_number,
            price: b.price,
            status: b.status.to_string(),
            created_at: b.created_at.to_rfc3339(),
            updated_at: b.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBatteryRequest {
    #[validate(length(min = 1, max = 64))]
    pub serial_number: String,
    /// Must be greater than zero
    pub price: i64,
    /// Initial status, AVAILABLE when omitted
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBatteryRequest {
    #[validate(length(min = 1, max = 64))]
    pub serial_number: Option<String>,
    pub price: Option<i64>,
    /// AVAILABLE or MAINTENANCE
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListBatteriesParams {
    /// Filter by status
    pub status: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

pub fn parse_battery_status(raw: &str) -> Result<BatteryStatus, ApiError> {
    BatteryStatus::from_str(raw).ok_or_else(|| {
        bad_request(
            "status",
            format!("unknown battery status '{}', expected AVAILABLE, RENTED or MAINTENANCE", raw),
        )
    })
}
