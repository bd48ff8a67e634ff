// handler/wallet.rs
use std::sync::Arc;

use axum::{extract::Query, response::IntoResponse, Extension, Json};
use validator::Validate;

use crate::{
    db::creditdb::CreditLedgerExt,
    dtos::{
        walletdtos::{
            BalanceResponseDto, PurchaseCreditsDto, TransactionHistoryQueryDto,
            TransactionResponseDto,
        },
        ApiResponse,
    },
    error::HttpError,
    middleware::JWTAuthMiddleware,
    models::creditmodels::TransactionType,
    AppState,
};

pub async fn get_balance(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
) -> Result<impl IntoResponse, HttpError> {
    let account = app_state.db_client.get_credit_account(auth.user.id).await?;

    let response: BalanceResponseDto = account.into();
    Ok(Json(ApiResponse::success("Balance retrieved successfully", response)))
}

/// Credit the wallet after a store purchase clears. The payment itself is
/// settled by the platform billing flow; this endpoint only books the
/// resulting credits.
pub async fn purchase_credits(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Json(body): Json<PurchaseCreditsDto>,
) -> Result<impl IntoResponse, HttpError> {
    body.validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let transaction = app_state
        .db_client
        .apply_transaction(
            auth.user.id,
            body.credits,
            TransactionType::Purchase,
            format!("Purchased {} credits", body.credits),
            body.idempotency_key,
        )
        .await?;

    let response: TransactionResponseDto = transaction.into();
    Ok(Json(ApiResponse::success("Credits purchased successfully", response)))
}

pub async fn get_transaction_history(
    Extension(app_state): Extension<Arc<AppState>>,
    Extension(auth): Extension<JWTAuthMiddleware>,
    Query(query): Query<TransactionHistoryQueryDto>,
) -> Result<impl IntoResponse, HttpError> {
    query
        .validate()
        .map_err(|e| HttpError::bad_request(e.to_string()))?;

    let transactions = app_state
        .db_client
        .list_transactions(
            auth.user.id,
            query.limit.unwrap_or(20),
            query.offset.unwrap_or(0),
        )
        .await?;

    let response: Vec<TransactionResponseDto> =
        transactions.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success("Transactions retrieved successfully", response)))
}
