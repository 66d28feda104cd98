//! Rental lifecycle handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    parse_timestamp, CreateRentalRequest, ListRentalsParams, RentalDetailDto, RentalDto,
    ReturnBatteryRequest,
};
use crate::application::{NewRental, RentalService, ReturnBattery};
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, ApiResult, PaginatedResponse, ValidatedJson,
};
use crate::shared::validate_pagination;

/// Rental handler state
#[derive(Clone)]
pub struct RentalHandlerState {
    pub rentals: Arc<RentalService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/rentals",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    params(ListRentalsParams),
    responses(
        (status = 200, description = "Rentals, newest first", body = ApiResponse<PaginatedResponse<RentalDto>>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_rentals(
    State(state): State<RentalHandlerState>,
    Query(params): Query<ListRentalsParams>,
) -> ApiResult<PaginatedResponse<RentalDto>> {
    let filter = params.to_filter()?;
    let (page, limit) = validate_pagination(params.page, params.limit);

    let result = state
        .rentals
        .list_rentals(&filter, page, limit)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        result,
        RentalDto::from,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/rentals",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    request_body = CreateRentalRequest,
    responses(
        (status = 201, description = "Battery handed out", body = ApiResponse<RentalDto>),
        (status = 400, description = "Invalid rental price"),
        (status = 404, description = "Battery or customer not found"),
        (status = 409, description = "Battery not available")
    )
)]
pub async fn create_rental(
    State(state): State<RentalHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateRentalRequest>,
) -> Result<(StatusCode, Json<ApiResponse<RentalDto>>), ApiError> {
    let rental = state
        .rentals
        .create_rental(NewRental {
            battery_id: request.battery_id,
            customer_id: request.customer_id,
            rental_price: request.rental_price,
            is_paid: request.is_paid,
        })
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(RentalDto::from(rental))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/rentals/{id}",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Rental with payments", body = ApiResponse<RentalDetailDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_rental(
    State(state): State<RentalHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<RentalDetailDto> {
    let detail = state
        .rentals
        .get_rental_detail(&id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(RentalDetailDto::from(detail))))
}

#[utoipa::path(
    post,
    path = "/api/v1/rentals/{id}/return",
    tag = "Rentals",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Rental ID")),
    request_body = ReturnBatteryRequest,
    responses(
        (status = 200, description = "Battery returned", body = ApiResponse<RentalDto>),
        (status = 400, description = "Return date before rent date"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Already returned")
    )
)]
pub async fn return_battery(
    State(state): State<RentalHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<ReturnBatteryRequest>,
) -> ApiResult<RentalDto> {
    let return_date = request
        .return_date
        .as_deref()
        .map(|raw| parse_timestamp("return_date", raw))
        .transpose()?;

    let rental = state
        .rentals
        .return_battery(
            &id,
            ReturnBattery {
                return_date,
                is_paid: request.is_paid,
            },
        )
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::success(RentalDto::from(rental))))
}
