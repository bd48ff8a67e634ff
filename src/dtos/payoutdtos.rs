// dtos/payoutdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::payoutmodels::{PayoutCurrency, PayoutMethod, PayoutRequest, PayoutStatus};
use crate::service::payout_service::ESTIMATED_ARRIVAL_DAYS;

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct RequestPayoutDto {
    #[validate(length(min = 3, max = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,

    pub payout_method: PayoutMethod,

    pub payment_details: serde_json::Value,

    #[validate(length(min = 1, max = 64, message = "Idempotency key must be 1-64 characters"))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PayoutResponseDto {
    pub id: Uuid,
    pub status: PayoutStatus,
    pub amount_usd: f64,
    pub payout_amount: f64,
    pub currency: String,
    pub payout_method: PayoutMethod,
    pub estimated_arrival_days: u32,
    pub notes: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CurrencyDto {
    pub code: String,
    pub symbol: String,
    pub rate_to_usd: f64,
    pub country: String,
}

/// Body the payment processor posts back when a request changes state.
#[derive(Debug, Serialize, Deserialize)]
pub struct PayoutStatusUpdateDto {
    pub payout_request_id: Uuid,
    pub status: PayoutStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PayoutHistoryQueryDto {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must be non-negative"))]
    pub offset: Option<i64>,
}

impl From<PayoutRequest> for PayoutResponseDto {
    fn from(request: PayoutRequest) -> Self {
        Self {
            id: request.id,
            status: request.status,
            amount_usd: request.amount_usd(),
            payout_amount: request.payout_amount,
            currency: request.currency,
            payout_method: request.payout_method,
            estimated_arrival_days: ESTIMATED_ARRIVAL_DAYS,
            notes: request.notes,
            created_at: request.created_at,
            processed_at: request.processed_at,
        }
    }
}

impl From<&PayoutCurrency> for CurrencyDto {
    fn from(currency: &PayoutCurrency) -> Self {
        Self {
            code: currency.code.to_string(),
            symbol: currency.symbol.to_string(),
            rate_to_usd: currency.rate_to_usd,
            country: currency.country.to_string(),
        }
    }
}
