// dtos/walletdtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::creditmodels::{CreditAccount, CreditTransaction, TransactionType};

#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceResponseDto {
    pub balance: i64,
    pub earned_credits: i64,
    pub purchased_credits: i64,
    pub cash_balance_usd: f64,
    pub lifetime_earnings_usd: f64,
    pub lifetime_spent_credits: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponseDto {
    pub id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub cash_amount_usd: f64,
    pub balance_after: i64,
    pub description: String,
    pub gift_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct PurchaseCreditsDto {
    #[validate(range(min = 1, max = 1000000, message = "Credits must be between 1 and 1,000,000"))]
    pub credits: i64,

    #[validate(length(min = 1, max = 64, message = "Idempotency key must be 1-64 characters"))]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TransactionHistoryQueryDto {
    #[validate(range(min = 1, max = 100, message = "Limit must be between 1 and 100"))]
    pub limit: Option<i64>,

    #[validate(range(min = 0, message = "Offset must be non-negative"))]
    pub offset: Option<i64>,
}

impl From<CreditAccount> for BalanceResponseDto {
    fn from(account: CreditAccount) -> Self {
        Self {
            balance: account.balance,
            earned_credits: account.earned_credits,
            purchased_credits: account.purchased_credits,
            cash_balance_usd: account.cash_balance_usd(),
            lifetime_earnings_usd: account.lifetime_earnings_usd(),
            lifetime_spent_credits: account.lifetime_spent_credits,
        }
    }
}

impl From<CreditTransaction> for TransactionResponseDto {
    fn from(tx: CreditTransaction) -> Self {
        Self {
            id: tx.id,
            transaction_type: tx.transaction_type,
            amount: tx.amount,
            cash_amount_usd: tx.cash_amount_cents as f64 / 100.0,
            balance_after: tx.balance_after,
            description: tx.description,
            gift_id: tx.gift_id,
            created_at: tx.created_at,
        }
    }
}
