// dtos/giftdtos.rs
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::giftmodels::{Gift, GiftCategory};
use crate::service::gift_service::GiftSendOutcome;

#[derive(Debug, Serialize, Deserialize)]
pub struct GiftDto {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub credit_cost: i64,
    pub usd_value: f64,
    pub category: GiftCategory,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct SendGiftDto {
    pub recipient_id: Uuid,

    #[validate(length(min = 1, message = "Gift id is required"))]
    pub gift_id: String,

    #[validate(length(min = 1, max = 64, message = "Idempotency key must be 1-64 characters"))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecipientEarningsDto {
    pub credits: i64,
    pub cash_usd: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendGiftResponseDto {
    pub transaction_id: Uuid,
    pub sender_new_balance: i64,
    pub recipient_earned: RecipientEarningsDto,
}

impl From<&Gift> for GiftDto {
    fn from(gift: &Gift) -> Self {
        Self {
            id: gift.id.to_string(),
            name: gift.name.to_string(),
            icon: gift.icon.to_string(),
            credit_cost: gift.credit_cost,
            usd_value: gift.usd_value(),
            category: gift.category,
        }
    }
}

impl From<GiftSendOutcome> for SendGiftResponseDto {
    fn from(outcome: GiftSendOutcome) -> Self {
        Self {
            transaction_id: outcome.transaction_id,
            sender_new_balance: outcome.sender_new_balance,
            recipient_earned: RecipientEarningsDto {
                credits: outcome.recipient_earned.credits,
                cash_usd: outcome.recipient_earned.cash_cents as f64 / 100.0,
            },
        }
    }
}
