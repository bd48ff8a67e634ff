// db/payoutdb.rs
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::creditmodels::TransactionType;
use crate::models::payoutmodels::{
    meets_minimum_payout, PayoutMethod, PayoutRequest, PayoutStatus, MIN_PAYOUT_CENTS,
};
use crate::service::error::ServiceError;
use crate::utils::currency::{cents_to_currency, format_cents_as_usd};

const PAYOUT_COLUMNS: &str = r#"
    id,
    user_id,
    amount_cents,
    payout_amount,
    currency,
    payout_method,
    payment_details,
    status,
    notes,
    idempotency_key,
    created_at,
    processed_at
"#;

#[async_trait]
pub trait PayoutExt {
    /// Atomically reserve the full cash balance and create a `pending`
    /// request. Fails with `BelowMinimumPayout` under $10.00 and with
    /// `DuplicatePayoutRequest` while another request is outstanding; a
    /// replayed idempotency key returns the original request.
    async fn create_payout_request(
        &self,
        user_id: Uuid,
        currency: &str,
        rate_to_usd: f64,
        payout_method: PayoutMethod,
        payment_details: JsonValue,
        idempotency_key: Option<String>,
    ) -> Result<PayoutRequest, ServiceError>;

    async fn get_payout_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PayoutRequest>, ServiceError>;

    async fn get_payout_request(&self, id: Uuid) -> Result<Option<PayoutRequest>, ServiceError>;

    /// Reflect a transition performed by the external admin process.
    /// Illegal transitions (including any exit from a terminal state) are
    /// rejected; `rejected`/`failed` refund the reserved cash in the same
    /// database transaction.
    async fn update_payout_status(
        &self,
        id: Uuid,
        next: PayoutStatus,
        notes: Option<String>,
    ) -> Result<PayoutRequest, ServiceError>;
}

fn is_outstanding_conflict(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err)
            if db_err.constraint() == Some("uq_payout_requests_outstanding")
    )
}

#[async_trait]
impl PayoutExt for DBClient {
    async fn create_payout_request(
        &self,
        user_id: Uuid,
        currency: &str,
        rate_to_usd: f64,
        payout_method: PayoutMethod,
        payment_details: JsonValue,
        idempotency_key: Option<String>,
    ) -> Result<PayoutRequest, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if let Some(key) = idempotency_key.as_deref() {
            let existing = sqlx::query_as::<_, PayoutRequest>(&format!(
                "SELECT {PAYOUT_COLUMNS} FROM payout_requests WHERE user_id = $1 AND idempotency_key = $2",
            ))
            .bind(user_id)
            .bind(key)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(existing) = existing {
                tx.rollback().await?;
                return Ok(existing);
            }
        }

        let account = sqlx::query_as::<_, (Uuid, i64)>(
            "SELECT id, cash_balance_cents FROM credit_accounts WHERE user_id = $1 FOR UPDATE",
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        let (account_id, cash_cents) = account.ok_or(ServiceError::BelowMinimumPayout {
            minimum_cents: MIN_PAYOUT_CENTS,
            available_cents: 0,
        })?;

        if !meets_minimum_payout(cash_cents) {
            return Err(ServiceError::BelowMinimumPayout {
                minimum_cents: MIN_PAYOUT_CENTS,
                available_cents: cash_cents,
            });
        }

        let outstanding = sqlx::query(
            r#"
            SELECT 1 AS present FROM payout_requests
            WHERE user_id = $1 AND status IN ('pending', 'approved', 'processing')
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?;

        if outstanding.is_some() {
            return Err(ServiceError::DuplicatePayoutRequest(user_id));
        }

        let payout_amount = cents_to_currency(cash_cents, rate_to_usd);

        // The partial unique index is the concurrency backstop for the
        // pre-check above.
        let request = sqlx::query_as::<_, PayoutRequest>(&format!(
            r#"
            INSERT INTO payout_requests
            (user_id, amount_cents, payout_amount, currency, payout_method,
             payment_details, status, idempotency_key)
            VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7)
            RETURNING {PAYOUT_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(cash_cents)
        .bind(payout_amount)
        .bind(currency)
        .bind(payout_method)
        .bind(&payment_details)
        .bind(idempotency_key.as_deref())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            if is_outstanding_conflict(&e) {
                ServiceError::DuplicatePayoutRequest(user_id)
            } else {
                ServiceError::Database(e)
            }
        })?;

        // Reserve: the requested amount leaves the withdrawable balance
        // immediately and comes back only on rejected/failed.
        sqlx::query(
            r#"
            UPDATE credit_accounts
            SET cash_balance_cents = cash_balance_cents - $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(account_id)
        .bind(cash_cents)
        .execute(&mut *tx)
        .await?;

        let balance_after = sqlx::query_as::<_, (i64,)>(
            "SELECT balance FROM credit_accounts WHERE id = $1",
        )
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?
        .0;

        sqlx::query(
            r#"
            INSERT INTO credit_transactions
            (account_id, transaction_type, amount, cash_amount_cents, balance_after,
             description, payout_request_id)
            VALUES ($1, $2, 0, $3, $4, $5, $6)
            "#,
        )
        .bind(account_id)
        .bind(TransactionType::Payout)
        .bind(-cash_cents)
        .bind(balance_after)
        .bind(format!(
            "Payout request: {} reserved ({:.2} {} at rate {})",
            format_cents_as_usd(cash_cents),
            payout_amount,
            currency,
            rate_to_usd
        ))
        .bind(request.id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(request)
    }

    async fn get_payout_history(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PayoutRequest>, ServiceError> {
        let rows = sqlx::query_as::<_, PayoutRequest>(&format!(
            r#"
            SELECT {PAYOUT_COLUMNS}
            FROM payout_requests
            WHERE user_id = $1
            ORDER BY created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        ))
        .bind(user_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_payout_request(&self, id: Uuid) -> Result<Option<PayoutRequest>, ServiceError> {
        let row = sqlx::query_as::<_, PayoutRequest>(&format!(
            "SELECT {PAYOUT_COLUMNS} FROM payout_requests WHERE id = $1",
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn update_payout_status(
        &self,
        id: Uuid,
        next: PayoutStatus,
        notes: Option<String>,
    ) -> Result<PayoutRequest, ServiceError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, PayoutRequest>(&format!(
            "SELECT {PAYOUT_COLUMNS} FROM payout_requests WHERE id = $1 FOR UPDATE",
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ServiceError::Validation(format!("Payout request {} not found", id)))?;

        if !current.status.can_transition(next) {
            return Err(ServiceError::Validation(format!(
                "Illegal payout transition {:?} -> {:?}",
                current.status, next
            )));
        }

        let updated = sqlx::query_as::<_, PayoutRequest>(&format!(
            r#"
            UPDATE payout_requests
            SET status = $2,
                notes = COALESCE($3, notes),
                processed_at = CASE WHEN $4 THEN NOW() ELSE processed_at END
            WHERE id = $1
            RETURNING {PAYOUT_COLUMNS}
            "#,
        ))
        .bind(id)
        .bind(next)
        .bind(notes)
        .bind(next.is_terminal())
        .fetch_one(&mut *tx)
        .await?;

        if matches!(next, PayoutStatus::Rejected | PayoutStatus::Failed) {
            let account = sqlx::query_as::<_, (Uuid, i64)>(
                "SELECT id, balance FROM credit_accounts WHERE user_id = $1 FOR UPDATE",
            )
            .bind(current.user_id)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                UPDATE credit_accounts
                SET cash_balance_cents = cash_balance_cents + $2, updated_at = NOW()
                WHERE id = $1
                "#,
            )
            .bind(account.0)
            .bind(current.amount_cents)
            .execute(&mut *tx)
            .await?;

            sqlx::query(
                r#"
                INSERT INTO credit_transactions
                (account_id, transaction_type, amount, cash_amount_cents, balance_after,
                 description, payout_request_id)
                VALUES ($1, $2, 0, $3, $4, $5, $6)
                "#,
            )
            .bind(account.0)
            .bind(TransactionType::Payout)
            .bind(current.amount_cents)
            .bind(account.1)
            .bind(format!(
                "Payout {} refunded: request {:?}",
                format_cents_as_usd(current.amount_cents),
                next
            ))
            .bind(current.id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct FakeUniqueViolation(&'static str);

    impl std::fmt::Display for FakeUniqueViolation {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "duplicate key value violates unique constraint \"{}\"", self.0)
        }
    }

    impl std::error::Error for FakeUniqueViolation {}

    impl sqlx::error::DatabaseError for FakeUniqueViolation {
        fn message(&self) -> &str {
            "duplicate key value violates unique constraint"
        }

        fn kind(&self) -> sqlx::error::ErrorKind {
            sqlx::error::ErrorKind::UniqueViolation
        }

        fn constraint(&self) -> Option<&str> {
            Some(self.0)
        }

        fn as_error(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn std::error::Error + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn std::error::Error + Send + Sync + 'static> {
            self
        }
    }

    #[test]
    fn outstanding_index_conflict_reads_as_duplicate_request() {
        let err = sqlx::Error::Database(Box::new(FakeUniqueViolation(
            "uq_payout_requests_outstanding",
        )));
        assert!(is_outstanding_conflict(&err));

        let other = sqlx::Error::Database(Box::new(FakeUniqueViolation(
            "uq_payout_requests_idempotency",
        )));
        assert!(!is_outstanding_conflict(&other));
        assert!(!is_outstanding_conflict(&sqlx::Error::PoolTimedOut));
    }
}
