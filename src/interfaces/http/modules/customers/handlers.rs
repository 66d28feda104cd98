//! Customer management handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};

use super::dto::{
    CreateCustomerRequest, CustomerDetailDto, CustomerDto, ListCustomersParams,
    UpdateCustomerRequest,
};
use crate::application::{CustomerService, NewCustomer};
use crate::domain::{CustomerUpdate, Principal};
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, ApiResult, EmptyData, PaginatedResponse, ValidatedJson,
};
use crate::interfaces::http::modules::payments::PaymentDto;
use crate::interfaces::http::modules::rentals::RentalDto;
use crate::shared::validate_pagination;

/// Customer handler state
#[derive(Clone)]
pub struct CustomerHandlerState {
    pub customers: Arc<CustomerService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/customers",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(ListCustomersParams),
    responses(
        (status = 200, description = "Customer list", body = ApiResponse<PaginatedResponse<CustomerDto>>)
    )
)]
pub async fn list_customers(
    State(state): State<CustomerHandlerState>,
    Query(params): Query<ListCustomersParams>,
) -> ApiResult<PaginatedResponse<CustomerDto>> {
    let (page, limit) = validate_pagination(params.page, params.limit);
    let search = params
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty());

    let result = state
        .customers
        .list_customers(search, page, limit)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        result,
        CustomerDto::from,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/customers",
    tag = "Customers",
    security(("bearer_auth" = [])),
    request_body = CreateCustomerRequest,
    responses(
        (status = 201, description = "Created", body = ApiResponse<CustomerDto>),
        (status = 409, description = "Phone number already registered"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create_customer(
    State(state): State<CustomerHandlerState>,
    ValidatedJson(request): ValidatedJson<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerDto>>), ApiError> {
    let customer = state
        .customers
        .create_customer(NewCustomer {
            name: request.name,
            phone_number: request.phone_number,
            address: request.address,
            credit_rating: request.credit_rating,
        })
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(CustomerDto::from(customer))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer with rental standing", body = ApiResponse<CustomerDetailDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_customer(
    State(state): State<CustomerHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<CustomerDetailDto> {
    let detail = state
        .customers
        .get_customer_detail(&id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(CustomerDetailDto::from(detail))))
}

#[utoipa::path(
    put,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Customer ID")),
    request_body = UpdateCustomerRequest,
    responses(
        (status = 200, description = "Updated", body = ApiResponse<CustomerDto>),
        (status = 404, description = "Not found"),
        (status = 409, description = "Phone number already registered")
    )
)]
pub async fn update_customer(
    State(state): State<CustomerHandlerState>,
    Path(id): Path<String>,
    ValidatedJson(request): ValidatedJson<UpdateCustomerRequest>,
) -> ApiResult<CustomerDto> {
    let customer = state
        .customers
        .update_customer(
            &id,
            CustomerUpdate {
                name: request.name,
                phone_number: request.phone_number,
                address: request.address,
            },
        )
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(CustomerDto::from(customer))))
}

#[utoipa::path(
    delete,
    path = "/api/v1/customers/{id}",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Deleted", body = ApiResponse<EmptyData>),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Not found"),
        (status = 409, description = "Customer has rental history")
    )
)]
pub async fn delete_customer(
    State(state): State<CustomerHandlerState>,
    Extension(principal): Extension<Principal>,
    Path(id): Path<String>,
) -> ApiResult<EmptyData> {
    state
        .customers
        .delete_customer(&principal, &id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(EmptyData {})))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}/rentals",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Rentals, newest first", body = ApiResponse<Vec<RentalDto>>),
        (status = 404, description = "Not found")
    )
)]
pub async fn list_customer_rentals(
    State(state): State<CustomerHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<RentalDto>> {
    let rentals = state
        .customers
        .list_customer_rentals(&id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        rentals.into_iter().map(RentalDto::from).collect(),
    )))
}

#[utoipa::path(
    get,
    path = "/api/v1/customers/{id}/payments",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Payments, newest first", body = ApiResponse<Vec<PaymentDto>>),
        (status = 404, description = "Not found")
    )
)]
pub async fn list_customer_payments(
    State(state): State<CustomerHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<Vec<PaymentDto>> {
    let payments = state
        .customers
        .list_customer_payments(&id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(
        payments.into_iter().map(PaymentDto::from).collect(),
    )))
}

#[utoipa::path(
    post,
    path = "/api/v1/customers/{id}/credit-rating/recompute",
    tag = "Customers",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer after re-scoring", body = ApiResponse<CustomerDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn recompute_credit_rating(
    State(state): State<CustomerHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<CustomerDto> {
    let customer = state
        .customers
        .recompute_credit_rating(&id)
        .await
        .map_err(api_error)?;
    Ok(Json(ApiResponse::success(CustomerDto::from(customer))))
}
