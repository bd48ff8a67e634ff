// service/payout_service.rs
use std::sync::Arc;

use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::db::payoutdb::PayoutExt;
use crate::models::payoutmodels::{
    find_currency, payout_currencies, PayoutCurrency, PayoutMethod, PayoutRequest, PayoutStatus,
};
use crate::service::error::ServiceError;

/// What the external payment processor is quoted once a request is
/// approved; surfaced to the user up front.
pub const ESTIMATED_ARRIVAL_DAYS: u32 = 5;

/// Method-specific shape checks on the caller-supplied details blob.
/// PayPal needs a deliverable email; bank transfer needs the account
/// holder's name at minimum.
pub fn validate_payment_details(
    method: PayoutMethod,
    details: &JsonValue,
) -> Result<(), ServiceError> {
    match method {
        PayoutMethod::Paypal => {
            let email = details
                .get("email")
                .and_then(|v| v.as_str())
                .ok_or_else(|| {
                    ServiceError::InvalidPaymentDetails(
                        "PayPal payouts require an email address".to_string(),
                    )
                })?;
            if !validator::validate_email(email) {
                return Err(ServiceError::InvalidPaymentDetails(format!(
                    "'{}' is not a valid PayPal email",
                    email
                )));
            }
        }
        PayoutMethod::BankTransfer => {
            let holder = details
                .get("account_holder_name")
                .and_then(|v| v.as_str())
                .map(str::trim)
                .unwrap_or_default();
            if holder.is_empty() {
                return Err(ServiceError::InvalidPaymentDetails(
                    "Bank transfers require an account holder name".to_string(),
                ));
            }
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct PayoutService {
    db_client: Arc<DBClient>,
}

impl PayoutService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub fn currencies(&self) -> &'static [PayoutCurrency] {
        payout_currencies()
    }

    /// Validate the request, convert the reserved balance into the chosen
    /// currency, and hand off to the atomic database operation.
    pub async fn request_payout(
        &self,
        user_id: Uuid,
        currency_code: &str,
        method: PayoutMethod,
        payment_details: JsonValue,
        idempotency_key: Option<String>,
    ) -> Result<PayoutRequest, ServiceError> {
        let currency = find_currency(currency_code).ok_or_else(|| {
            ServiceError::InvalidPaymentDetails(format!(
                "'{}' is not a supported payout currency",
                currency_code
            ))
        })?;

        validate_payment_details(method, &payment_details)?;

        // The amount is computed inside the database transaction from the
        // locked balance; the conversion applies to whatever gets
        // reserved, so the rate travels down with the request.
        self.db_client
            .create_payout_request(
                user_id,
                currency.code,
                currency.rate_to_usd,
                method,
                payment_details,
                idempotency_key,
            )
            .await
    }

    pub async fn payout_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PayoutRequest>, ServiceError> {
        self.db_client.get_payout_history(user_id, limit, offset).await
    }

    /// Look up a single request, scoped to its owner. A request that
    /// exists but belongs to someone else reads as absent.
    pub async fn payout_request(
        &self,
        user_id: Uuid,
        payout_id: Uuid,
    ) -> Result<Option<PayoutRequest>, ServiceError> {
        let request = self.db_client.get_payout_request(payout_id).await?;
        Ok(request.filter(|r| r.user_id == user_id))
    }

    /// Apply a status change reported by the payment processor.
    pub async fn reflect_status(
        &self,
        payout_id: Uuid,
        next: PayoutStatus,
        notes: Option<String>,
    ) -> Result<PayoutRequest, ServiceError> {
        self.db_client.update_payout_status(payout_id, next, notes).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn paypal_requires_a_valid_email() {
        assert!(validate_payment_details(
            PayoutMethod::Paypal,
            &json!({"email": "ana@example.com"})
        )
        .is_ok());

        let missing = validate_payment_details(PayoutMethod::Paypal, &json!({}));
        assert!(matches!(missing, Err(ServiceError::InvalidPaymentDetails(_))));

        let bad = validate_payment_details(
            PayoutMethod::Paypal,
            &json!({"email": "not-an-email"}),
        );
        assert!(matches!(bad, Err(ServiceError::InvalidPaymentDetails(_))));
    }

    #[test]
    fn bank_transfer_requires_an_account_holder() {
        assert!(validate_payment_details(
            PayoutMethod::BankTransfer,
            &json!({"account_holder_name": "Ana Souza", "iban": "BR1500000000000010932840814"})
        )
        .is_ok());

        let blank = validate_payment_details(
            PayoutMethod::BankTransfer,
            &json!({"account_holder_name": "   "}),
        );
        assert!(matches!(blank, Err(ServiceError::InvalidPaymentDetails(_))));
    }
}
