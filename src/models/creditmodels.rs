// models/creditmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq)]
#[sqlx(type_name = "transaction_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Purchase,
    Subscription,
    GiftSent,
    GiftReceived,
    Payout,
    Bonus,
}

/// Sub-field movements a transaction type implies; the spendable balance
/// itself always moves by exactly the transaction's `amount`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubFieldDeltas {
    pub purchased: i64,
    pub earned: i64,
    pub spent: i64,
}

impl TransactionType {
    pub fn sub_field_deltas(&self, amount: i64) -> SubFieldDeltas {
        SubFieldDeltas {
            purchased: match self {
                TransactionType::Purchase => amount,
                _ => 0,
            },
            earned: match self {
                TransactionType::GiftReceived => amount,
                _ => 0,
            },
            spent: match self {
                TransactionType::GiftSent => -amount,
                _ => 0,
            },
        }
    }
}

/// Balance an account would show if rebuilt from its ledger alone.
pub fn replayed_balance(transactions: &[CreditTransaction]) -> i64 {
    transactions.iter().map(|t| t.amount).sum()
}

/// Per-user money state. `balance` is spendable credits and is kept equal
/// to the sum of the account's transaction amounts on every write.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CreditAccount {
    pub id: Uuid,
    pub user_id: Uuid,
    pub balance: i64,
    pub earned_credits: i64,
    pub purchased_credits: i64,
    pub cash_balance_cents: i64,
    pub lifetime_earnings_cents: i64,
    pub lifetime_spent_credits: i64,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Append-only ledger row. `amount` is the signed spendable-credit delta,
/// `cash_amount_cents` the signed cash delta; never edited or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct CreditTransaction {
    pub id: Uuid,
    pub account_id: Uuid,
    pub transaction_type: TransactionType,
    pub amount: i64,
    pub cash_amount_cents: i64,
    pub balance_after: i64,
    pub description: String,
    pub gift_id: Option<String>,
    pub payout_request_id: Option<Uuid>,
    pub idempotency_key: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl CreditAccount {
    pub fn cash_balance_usd(&self) -> f64 {
        self.cash_balance_cents as f64 / 100.0
    }

    pub fn lifetime_earnings_usd(&self) -> f64 {
        self.lifetime_earnings_cents as f64 / 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(transaction_type: TransactionType, amount: i64, balance_after: i64) -> CreditTransaction {
        CreditTransaction {
            id: Uuid::new_v4(),
            account_id: Uuid::new_v4(),
            transaction_type,
            amount,
            cash_amount_cents: 0,
            balance_after,
            description: String::new(),
            gift_id: None,
            payout_request_id: None,
            idempotency_key: None,
            created_at: None,
        }
    }

    #[test]
    fn ledger_replay_reproduces_the_balance() {
        let history = [
            tx(TransactionType::Purchase, 100, 100),
            tx(TransactionType::GiftSent, -10, 90),
            tx(TransactionType::Bonus, 5, 95),
            tx(TransactionType::GiftReceived, 25, 120),
        ];
        assert_eq!(replayed_balance(&history), 120);
        assert_eq!(replayed_balance(&history), history.last().unwrap().balance_after);
        assert_eq!(replayed_balance(&[]), 0);
    }

    #[test]
    fn sub_fields_move_with_their_transaction_type() {
        assert_eq!(
            TransactionType::Purchase.sub_field_deltas(100),
            SubFieldDeltas { purchased: 100, earned: 0, spent: 0 }
        );
        assert_eq!(
            TransactionType::GiftReceived.sub_field_deltas(50),
            SubFieldDeltas { purchased: 0, earned: 50, spent: 0 }
        );
        // A sent gift carries a negative amount; spent credits rise.
        assert_eq!(
            TransactionType::GiftSent.sub_field_deltas(-10),
            SubFieldDeltas { purchased: 0, earned: 0, spent: 10 }
        );
        assert_eq!(
            TransactionType::Payout.sub_field_deltas(0),
            SubFieldDeltas { purchased: 0, earned: 0, spent: 0 }
        );
    }
}
