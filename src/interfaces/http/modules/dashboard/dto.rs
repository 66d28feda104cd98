//! Dashboard DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::application::{CustomerRentalCount, DashboardSummary, Earnings, InventoryCounts};
use crate::interfaces::http::modules::customers::CustomerDto;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct InventoryCountsDto {
    pub total: usize,
    pub available: usize,
    pub rented: usize,
    pub maintenance: usize,
}

impl From<InventoryCounts> for InventoryCountsDto {
    fn from(c: InventoryCounts) -> Self {
        Self {
            total: c.total,
            available: c.available,
            rented: c.rented,
            maintenance: c.maintenance,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DashboardSummaryDto {
    pub batteries: InventoryCountsDto,
    pub open_rentals: usize,
    pub total_customers: usize,
    /// Payments received since 00:00 UTC
    pub todays_earnings: i64,
    /// Outstanding across unpaid rentals
    pub total_due: i64,
}

impl From<DashboardSummary> for DashboardSummaryDto {
    fn from(s: DashboardSummary) -> Self {
        Self {
            batteries: s.batteries.into(),
            open_rentals: s.open_rentals,
            total_customers: s.total_customers,
            todays_earnings: s.todays_earnings,
            total_due: s.total_due,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct EarningsDto {
    pub from: String,
    pub to: String,
    pub total: i64,
    pub payment_count: usize,
}

impl From<Earnings> for EarningsDto {
    fn from(e: Earnings) -> Self {
        Self {
            from: e.from.to_rfc3339(),
            to: e.to.to_rfc3339(),
            total: e.total,
            payment_count: e.payment_count,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TopCustomerDto {
    pub customer: CustomerDto,
    pub rental_count: usize,
}

impl From<CustomerRentalCount> for TopCustomerDto {
    fn from(c: CustomerRentalCount) -> Self {
        Self {
            customer: c.customer.into(),
            rental_count: c.rental_count,
        }
    }
}

/// Half-open window `[from, to)`; each bound defaults to today's
#[derive(Debug, Deserialize, IntoParams)]
pub struct EarningsParams {
    /// RFC 3339, inclusive
    pub from: Option<String>,
    /// RFC 3339, exclusive
    pub to: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct TopParams {
    /// 1 to 100, default 5
    pub limit: Option<u32>,
}
