use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::error::HttpError;

/// Validation-class failures are detected before any mutation and leave
/// ledger and usage state untouched.
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Insufficient credits: required {required}, available {available}")]
    InsufficientCredits { required: i64, available: i64 },

    #[error("Gift '{0}' not found in catalog")]
    GiftNotFound(String),

    #[error("Cash balance {available_cents} cents is below the minimum payout of {minimum_cents} cents")]
    BelowMinimumPayout { minimum_cents: i64, available_cents: i64 },

    #[error("Invalid payment details: {0}")]
    InvalidPaymentDetails(String),

    #[error("User {0} already has an outstanding payout request")]
    DuplicatePayoutRequest(Uuid),

    #[error("Daily limit of {limit} reached for {action}")]
    DailyLimitExceeded { action: String, limit: i32 },

    #[error("Messaging this user is on cooldown until {until}")]
    CooldownActive { until: DateTime<Utc> },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl ServiceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ServiceError::InsufficientCredits { .. } => StatusCode::PAYMENT_REQUIRED,
            ServiceError::GiftNotFound(_) => StatusCode::NOT_FOUND,
            ServiceError::BelowMinimumPayout { .. } => StatusCode::BAD_REQUEST,
            ServiceError::InvalidPaymentDetails(_) => StatusCode::BAD_REQUEST,
            ServiceError::DuplicatePayoutRequest(_) => StatusCode::CONFLICT,
            ServiceError::DailyLimitExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::CooldownActive { .. } => StatusCode::TOO_MANY_REQUESTS,
            ServiceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl From<ServiceError> for HttpError {
    fn from(error: ServiceError) -> Self {
        let status = error.status_code();
        let message = match &error {
            // Do not leak SQL details to clients.
            ServiceError::Database(e) => {
                tracing::error!("database error: {}", e);
                "Server error. Please try again later".to_string()
            }
            other => other.to_string(),
        };
        HttpError::new(message, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_match_the_taxonomy() {
        assert_eq!(
            ServiceError::InsufficientCredits { required: 10, available: 5 }.status_code(),
            StatusCode::PAYMENT_REQUIRED
        );
        assert_eq!(
            ServiceError::GiftNotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ServiceError::DuplicatePayoutRequest(Uuid::new_v4()).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ServiceError::DailyLimitExceeded { action: "swipe".into(), limit: 5 }.status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ServiceError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }
}
