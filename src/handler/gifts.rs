// handler/gifts.rs
use std::sync::Arc;

use axum::{response::IntoResponse, Extension, Json};
use validator::Validate;

use crate::{
    dtos::{
        giftdtos::{GiftDto, SendGiftDto, SendGiftResponseDto},
        ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddleware,
    models::giftmodels::gift_catalog,
    AppState,
};

pub async fn get_catalog() -> Result<impl IntoResponse, HttpError> {
    let gifts: Vec<GiftDto> = gift_catalog().iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success("Gift catalog retrieved successfully", gifts)))
}

pub async fn send_gift(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<SendGiftDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let outcome = app_state
        .gift_service
        .send_gift(&auth.user, body.recipient_id, &body.gift_id, body.idempotency_key)
        .await?;

    let response: SendGiftResponseDto = outcome.into();
    Ok(Json(ApiResponse::success("Gift sent successfully", response)))
}
