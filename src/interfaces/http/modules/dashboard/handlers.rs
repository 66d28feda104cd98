//! Dashboard handlers

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use super::dto::{
    DashboardSummaryDto, EarningsDto, EarningsParams, TopCustomerDto, TopParams,
};
use crate::application::{today, DashboardService};
use crate::interfaces::http::common::{api_error, ApiResponse, ApiResult};
use crate::interfaces::http::modules::customers::CustomerDto;
use crate::interfaces::http::modules::rentals::parse_timestamp;
use crate::shared::validate_top_limit;

/// Dashboard handler state
#[derive(Clone)]
pub struct DashboardHandlerState {
    pub dashboard: Arc<DashboardService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/summary",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Business overview", body = ApiResponse<DashboardSummaryDto>)
    )
)]
pub async fn get_summary(
    State(state): State<DashboardHandlerState>,
) -> ApiResult<DashboardSummaryDto> {
    let summary = state.dashboard.summary().await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(DashboardSummaryDto::from(summary))))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/earnings",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    params(EarningsParams),
    responses(
        (status = 200, description = "Payments received in the window", body = ApiResponse<EarningsDto>),
        (status = 400, description = "Malformed or inverted window")
    )
)]
pub async fn get_earnings(
    State(state): State<DashboardHandlerState>,
    Query(params): Query<EarningsParams>,
) -> ApiResult<EarningsDto> {
    let (day_start, day_end) = today();
    let from = match params.from.as_deref() {
        Some(raw) => parse_timestamp("from", raw)?,
        None => day_start,
    };
    let to = match params.to.as_deref() {
        Some(raw) => parse_timestamp("to", raw)?,
        None => day_end,
    };

    let earnings = state
        .dashboard
        .earnings(from, to)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(EarningsDto::from(earnings))))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/top-customers",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    params(TopParams),
    responses(
        (status = 200, description = "Customers by rental count", body = ApiResponse<Vec<TopCustomerDto>>)
    )
)]
pub async fn get_top_customers(
    State(state): State<DashboardHandlerState>,
    Query(params): Query<TopParams>,
) -> ApiResult<Vec<TopCustomerDto>> {
    let top = state
        .dashboard
        .top_customers(validate_top_limit(params.limit))
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        top.into_iter().map(TopCustomerDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/dashboard/low-credit-customers",
    tag = "Dashboard",
    security(("bearer_auth" = [])),
    params(TopParams),
    responses(
        (status = 200, description = "Lowest rated customers", body = ApiResponse<Vec<CustomerDto>>)
    )
)]
pub async fn get_low_credit_customers(
    State(state): State<DashboardHandlerState>,
    Query(params): Query<TopParams>,
) -> ApiResult<Vec<CustomerDto>> {
    let customers = state
        .dashboard
        .low_credit_customers(validate_top_limit(params.limit))
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        customers.into_iter().map(CustomerDto::from).collect(),
    )))
}
