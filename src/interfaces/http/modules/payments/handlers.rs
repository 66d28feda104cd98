//! Payment ledger handlers

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    ListPaymentsParams, PaymentDto, PaymentReceiptDto, RecordPaymentRequest,
};
use crate::application::{NewPayment, PaymentService};
use crate::interfaces::http::common::{
    api_error, ApiError, ApiResponse, ApiResult, PaginatedResponse, ValidatedJson,
};
use crate::shared::validate_pagination;

/// Payment handler state
#[derive(Clone)]
pub struct PaymentHandlerState {
    pub payments: Arc<PaymentService>,
}

#[utoipa::path(
    get,
    path = "/api/v1/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(ListPaymentsParams),
    responses(
        (status = 200, description = "Payments, newest first", body = ApiResponse<PaginatedResponse<PaymentDto>>)
    )
)]
pub async fn list_payments(
    State(state): State<PaymentHandlerState>,
    Query(params): Query<ListPaymentsParams>,
) -> ApiResult<PaginatedResponse<PaymentDto>> {
    let (page, limit) = validate_pagination(params.page, params.limit);
    let result = state
        .payments
        .list_payments(&params.to_filter(), page, limit)
        .await
        .map_err(api_error)?;

    Ok(Json(ApiResponse::success(PaginatedResponse::from_result(
        result,
        PaymentDto::from,
    ))))
}

#[utoipa::path(
    post,
    path = "/api/v1/payments",
    tag = "Payments",
    security(("bearer_auth" = [])),
    request_body = RecordPaymentRequest,
    responses(
        (status = 201, description = "Payment recorded", body = ApiResponse<PaymentReceiptDto>),
        (status = 400, description = "Invalid amount or payment method"),
        (status = 404, description = "Rental or customer not found"),
        (status = 409, description = "Customer does not match the rental")
    )
)]
pub async fn record_payment(
    State(state): State<PaymentHandlerState>,
    ValidatedJson(request): ValidatedJson<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PaymentReceiptDto>>), ApiError> {
    let payment_method = request.method()?;

    let receipt = state
        .payments
        .record_payment(NewPayment {
            rental_id: request.rental_id,
            customer_id: request.customer_id,
            amount: request.amount,
            payment_method,
        })
        .await
        .map_err(api_error)?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(PaymentReceiptDto::from(receipt))),
    ))
}

#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    tag = "Payments",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "Payment ID")),
    responses(
        (status = 200, description = "Payment", body = ApiResponse<PaymentDto>),
        (status = 404, description = "Not found")
    )
)]
pub async fn get_payment(
    State(state): State<PaymentHandlerState>,
    Path(id): Path<String>,
) -> ApiResult<PaymentDto> {
    let payment = state.payments.get_payment(&id).await.map_err(api_error)?;
    Ok(Json(ApiResponse::success(PaymentDto::from(payment))))
}
