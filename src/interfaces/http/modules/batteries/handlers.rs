//! Battery inventory handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    parse_battery_status, BatteryDto, CreateBatteryRequest, ListBatteriesParams,
    UpdateBatteryRequest,
};
use crate::application::{InventoryService, NewBattery};
use crate::domain::{BatteryUpdate, Principal};
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, ApiResult, EmptyData, PaginatedResponse, ValidatedJson,
};
use crate::shared::validate_pagination;

/// Battery handler state
#[derive(Clone)]
pub struct BatteryHandlerState {
    pub inventory: Arc<InventoryService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/batteries",
    tag = "Batteries",
    security(("bearer_auth" = [])),
    params(ListBatteriesParams),
    responses(
        (status = 200, description = "Battery list", body = ApiResponse<PaginatedResponse<BatteryDto>>),
        (status = 400, description = "Unknown status filter")
    )
)]
pub async fn list_batteries(
    State(state): State<BatteryHandlerState>,
    Query(params): Query<ListBatteriesParams>,
) -> ApiResult<PaginatedResponse<BatteryDto>> {
    let status = params
        .status
        .as_deref()
        .map(parse_battery_status)
        .transpose()?;
    let (page, limit) = validate_pagination(params.page, params.limit);

    let result = state
        .inventory
        .list_batteries(status, page, limit)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        result,
        BatteryDto::from,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/batteries",
    tag = "Batteries",
    security(("bearer_auth" = [])),
    request_body = CreateBatteryRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<BatteryDto>),
        (status = 409, description = "Serial number already exists"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_battery(
    State(state): State<BatteryHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateBatteryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BatteryDto>>), ApiError> {
    let status = request
        .status
        .as_deref()
        .map(parse_battery_status)
        .transpose()?;

    let battery = state
        .inventory
        .create_battery(NewBattery {
            serial_number: request.serial_number,
            price: request.price,
            status,
        })
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(BatteryDto::from(battery))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/batteries/{id}",
    tag = "Batteries",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Battery ID")),
    responses(
        (status = 200, description = "Battery", body = ApiResponse<BatteryDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_battery(
    State(state): State<BatteryHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<BatteryDto> {
    let battery = state.inventory.get_battery(&id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(BatteryDto::from(battery))))
}

#[utoipa::path(
    put,
    path = "/api/v1/batteries/{id}",
    tag = "Batteries",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Battery ID")),
    request_body = UpdateBatteryRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<BatteryDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Status change not allowed or serial taken")
    )
)]
pub async fn update_battery(
    State(state): State<BatteryHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateBatteryRequest>,
) -> ApiResult<BatteryDto> {
    let status = request
        .status
        .as_deref()
        .map(parse_battery_status)
        .transpose()?;

    let battery = state
        .inventory
        .update_battery(
            &id,
            BatteryUpdate {
                serial_number: request.serial_number,
                price: request.price,
                status,
            },
        )
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::success(BatteryDto::from(battery))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/batteries/{id}",
    tag = "Batteries",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Battery ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Battery has rental history")
    )
)]
pub async fn delete_battery(
    State(state): State<BatteryHandlerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<EmptyData> {
    state
        .inventory
        .delete_battery(&principal, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}
