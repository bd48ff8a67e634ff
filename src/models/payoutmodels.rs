// models/payoutmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum cash balance required to request a payout: $10.00.
pub const MIN_PAYOUT_CENTS: i64 = 1000;

/// A balance of exactly the minimum is payable.
pub fn meets_minimum_payout(cash_cents: i64) -> bool {
    cash_cents >= MIN_PAYOUT_CENTS
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payout_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayoutStatus {
    Pending,
    Approved,
    Processing,
    Completed,
    Rejected,
    Failed,
}

impl PayoutStatus {
    /// A request in one of these states blocks a second request.
    pub fn is_outstanding(&self) -> bool {
        matches!(
            self,
            PayoutStatus::Pending | PayoutStatus::Approved | PayoutStatus::Processing
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PayoutStatus::Completed | PayoutStatus::Rejected | PayoutStatus::Failed
        )
    }

    /// The only legal transitions; terminal states have no exit.
    pub fn can_transition(&self, next: PayoutStatus) -> bool {
        match (self, next) {
            (PayoutStatus::Pending, PayoutStatus::Approved) => true,
            (PayoutStatus::Pending, PayoutStatus::Rejected) => true,
            (PayoutStatus::Approved, PayoutStatus::Processing) => true,
            (PayoutStatus::Approved, PayoutStatus::Failed) => true,
            (PayoutStatus::Processing, PayoutStatus::Completed) => true,
            (PayoutStatus::Processing, PayoutStatus::Failed) => true,
            _ => false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "payout_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PayoutMethod {
    Paypal,
    BankTransfer,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct PayoutRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_cents: i64,
    pub payout_amount: f64,
    pub currency: String,
    pub payout_method: PayoutMethod,
    pub payment_details: serde_json::Value,
    pub status: PayoutStatus,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub processed_at: Option<DateTime<Utc>>,
}

impl PayoutRequest {
    pub fn amount_usd(&self) -> f64 {
        self.amount_cents as f64 / 100.0
    }
}

/// Static exchange-rate table; `rate_to_usd` is the USD value of one unit
/// of the currency.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PayoutCurrency {
    pub code: &'static str,
    pub symbol: &'static str,
    pub rate_to_usd: f64,
    pub country: &'static str,
}

const CURRENCIES: &[PayoutCurrency] = &[
    PayoutCurrency { code: "USD", symbol: "$", rate_to_usd: 1.0, country: "United States" },
    PayoutCurrency { code: "EUR", symbol: "€", rate_to_usd: 1.08, country: "Eurozone" },
    PayoutCurrency { code: "GBP", symbol: "£", rate_to_usd: 1.27, country: "United Kingdom" },
    PayoutCurrency { code: "TRY", symbol: "₺", rate_to_usd: 0.044, country: "Turkey" },
    PayoutCurrency { code: "BRL", symbol: "R$", rate_to_usd: 0.20, country: "Brazil" },
    PayoutCurrency { code: "PHP", symbol: "₱", rate_to_usd: 0.018, country: "Philippines" },
    PayoutCurrency { code: "INR", symbol: "₹", rate_to_usd: 0.012, country: "India" },
];

pub fn payout_currencies() -> &'static [PayoutCurrency] {
    CURRENCIES
}

pub fn find_currency(code: &str) -> Option<&'static PayoutCurrency> {
    CURRENCIES.iter().find(|c| c.code.eq_ignore_ascii_case(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_documented_transitions_are_legal() {
        use PayoutStatus::*;
        let all = [Pending, Approved, Processing, Completed, Rejected, Failed];
        let legal = [
            (Pending, Approved),
            (Pending, Rejected),
            (Approved, Processing),
            (Approved, Failed),
            (Processing, Completed),
            (Processing, Failed),
        ];
        for from in all {
            for to in all {
                assert_eq!(
                    from.can_transition(to),
                    legal.contains(&(from, to)),
                    "{:?} -> {:?}",
                    from,
                    to
                );
            }
        }
    }

    #[test]
    fn terminal_states_have_no_exit() {
        use PayoutStatus::*;
        for terminal in [Completed, Rejected, Failed] {
            assert!(terminal.is_terminal());
            for to in [Pending, Approved, Processing, Completed, Rejected, Failed] {
                assert!(!terminal.can_transition(to));
            }
        }
    }

    #[test]
    fn outstanding_states_block_a_second_request() {
        use PayoutStatus::*;
        assert!(Pending.is_outstanding());
        assert!(Approved.is_outstanding());
        assert!(Processing.is_outstanding());
        assert!(!Completed.is_outstanding());
        assert!(!Rejected.is_outstanding());
        assert!(!Failed.is_outstanding());
    }

    #[test]
    fn currency_lookup_is_case_insensitive() {
        assert_eq!(find_currency("try").unwrap().rate_to_usd, 0.044);
        assert!(find_currency("XYZ").is_none());
    }

    #[test]
    fn minimum_payout_boundary() {
        assert!(!meets_minimum_payout(0));
        assert!(!meets_minimum_payout(999));
        assert!(meets_minimum_payout(1000));
        assert!(meets_minimum_payout(1001));
    }
}
