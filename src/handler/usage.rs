// handler/usage.rs
use std::sync::Arc;

use axum::{
    extract::{Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use uuid::Uuid;

use crate::{
    dtos::{
        usagedtos::{
            CanMessageResponseDto, CanPerformQueryDto, CanPerformResponseDto, RecordActionDto,
            UsageStatusDto,
        },
        ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddleware,
    AppState,
};

pub async fn get_usage_status(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let status = app_state.quota_service.usage_status(&auth.user).await?;

    let response: UsageStatusDto = status.into();
    Ok(Json(ApiResponse::success("Usage retrieved successfully", response)))
}

/// Read-only check; the client asks before rendering the button.
pub async fn can_perform_action(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Query(query): Query<CanPerformQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    let allowed = app_state
        .quota_service
        .can_perform_action(&auth.user, query.action)
        .await?;

    let response = CanPerformResponseDto { action: query.action, allowed };
    Ok(Json(ApiResponse::success("Quota evaluated", response)))
}

pub async fn record_action(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<RecordActionDto>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .quota_service
        .record_action(&auth.user, body.action)
        .await?;

    let status = app_state.quota_service.usage_status(&auth.user).await?;
    let response: UsageStatusDto = status.into();
    Ok(Json(ApiResponse::success("Action recorded successfully", response)))
}

pub async fn can_send_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(recipient_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let gate = app_state
        .quota_service
        .can_send_message(&auth.user, recipient_id)
        .await?;

    let response: CanMessageResponseDto = gate.into();
    Ok(Json(ApiResponse::success("Message gate evaluated", response)))
}

pub async fn record_message(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(recipient_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    let gate = app_state
        .quota_service
        .record_message_sent(&auth.user, recipient_id)
        .await?;

    let response: CanMessageResponseDto = gate.into();
    Ok(Json(ApiResponse::success("Message recorded successfully", response)))
}

pub async fn record_reply(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Path(peer_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    app_state
        .quota_service
        .record_reply(auth.user.id, peer_id)
        .await?;

    Ok(Json(ApiResponse::success("Reply recorded successfully", ())))
}
