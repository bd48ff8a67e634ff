// handler/payouts.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    http::HeaderMap,
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    dtos::{
        payoutdtos::{
            CurrencyDto, PayoutHistoryQueryDto, PayoutResponseDto, PayoutStatusUpdateDto,
            RequestPayoutDto,
        },
        ApiResponse,
    },
    error::{ErrorMessage, HttpError},
    middleware::JWTAuthMiddleware,
    AppState,
};

pub async fn get_currencies(
    Extension(app_state): Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let currencies: Vec<CurrencyDto> = app_state
        .payout_service
        .currencies()
        .iter()
        .map(Into::into)
        .collect();
    Ok(Json(ApiResponse::success("Currencies retrieved successfully", currencies)))
}

pub async fn request_payout(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<RequestPayoutDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let request = app_state
        .payout_service
        .request_payout(
            auth.user.id,
            &body.currency,
            body.payout_method,
            body.payment_details,
            body.idempotency_key,
        )
        .await?;

    let response: PayoutResponseDto = request.into();
    Ok(Json(ApiResponse::success("Payout requested successfully", response)))
}

pub async fn get_payout_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Query(query): Query<PayoutHistoryQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let requests = app_state
        .payout_service
        .payout_history(
            auth.user.id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    let response: Vec<PayoutResponseDto> = requests.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success("Payout history retrieved successfully", response)))
}

pub async fn get_payout_request(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(payout_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let request = app_state
        .payout_service
        .payout_request(auth.user.id, payout_id)
        .await?
        .ok_or_else(|| HttpError::not_found("Payout request not found"))?;

    let response: PayoutResponseDto = request.into();
    Ok(Json(ApiResponse::success("Payout request retrieved successfully", response)))
}

/// Callback the payment processor posts when a payout changes state.
/// Authenticated by a shared secret header instead of a user token.
pub async fn payout_webhook(
    Extension(app_state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<PayoutStatusUpdateDto>,
) -> Result<impl IntoResponse, HttpError> {
    let provided = headers
        .get("x-webhook-secret")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided != app_state.env.payout_webhook_secret {
        return Err(HttpError::unauthorized(
            ErrorMessage::PermissionDenied.to_string(),
        ));
    }

    let updated = app_state
        .payout_service
        .reflect_status(body.payout_request_id, body.status, body.notes)
        .await?;

    let response: PayoutResponseDto = updated.into();
    Ok(Json(ApiResponse::success("Payout status updated", response)))
}
