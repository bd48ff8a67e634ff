// db/creditdb.rs
use async_trait::async_trait;
use sqlx::{Postgres, Row, Transaction};
use uuid::Uuid;

use super::db::DBClient;
use crate::models::creditmodels::{CreditAccount, CreditTransaction, TransactionType};
use crate::models::giftmodels::Gift;
use crate::service::error::ServiceError;

/// Two accounts are always locked in this order, so opposite-direction
/// gifts between the same pair cannot deadlock.
fn lock_order(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// A concurrent call with the same idempotency key can slip past the
/// replay pre-check; the unique index turns the loser's insert into this
/// conflict, which is then resolved by re-reading the winner's row.
fn is_idempotency_conflict(err: &ServiceError) -> bool {
    matches!(
        err,
        ServiceError::Database(sqlx::Error::Database(db_err))
            if db_err.constraint() == Some("uq_credit_transactions_idempotency")
    )
}

const TRANSACTION_COLUMNS: &str = r#"
    id,
    account_id,
    transaction_type,
    amount,
    cash_amount_cents,
    balance_after,
    description,
    gift_id,
    payout_request_id,
    idempotency_key,
    created_at
"#;

/// Result of the atomic dual-entry gift operation.
#[derive(Debug)]
pub struct GiftLedgerOutcome {
    pub sender_transaction: CreditTransaction,
    pub sender_new_balance: i64,
}

#[async_trait]
pub trait CreditLedgerExt {
    /// Read-only snapshot; the zeroed account row is created lazily on
    /// first touch.
    async fn get_credit_account(&self, user_id: Uuid) -> Result<CreditAccount, ServiceError>;

    /// Atomically adjust the balance (and the sub-fields appropriate to
    /// the type) and append exactly one transaction row. A debit that
    /// would drive the balance negative fails with `InsufficientCredits`
    /// and writes nothing. A replayed idempotency key returns the
    /// original row unchanged.
    async fn apply_transaction(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        idempotency_key: Option<String>,
    ) -> Result<CreditTransaction, ServiceError>;

    /// Most-recent-first page of the account's ledger.
    async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CreditTransaction>, ServiceError>;

    /// One atomic unit: debit the sender the gift's credit cost, credit
    /// the recipient's spendable/earned credits and post-commission cash,
    /// and append both transaction rows. An insufficient sender balance
    /// aborts the whole unit.
    async fn send_gift(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        gift: &Gift,
        recipient_cash_cents: i64,
        idempotency_key: Option<String>,
    ) -> Result<GiftLedgerOutcome, ServiceError>;
}

/// Lock the account row for the rest of the transaction, creating it
/// first if the user has never touched money before.
async fn lock_account(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
) -> Result<CreditAccount, ServiceError> {
    sqlx::query("INSERT INTO credit_accounts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

    let account = sqlx::query_as::<_, CreditAccount>(
        r#"
        SELECT
            id,
            user_id,
            balance,
            earned_credits,
            purchased_credits,
            cash_balance_cents,
            lifetime_earnings_cents,
            lifetime_spent_credits,
            created_at,
            updated_at
        FROM credit_accounts
        WHERE user_id = $1
        FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_one(&mut **tx)
    .await?;

    Ok(account)
}

async fn find_by_idempotency_key<'e, E>(
    executor: E,
    user_id: Uuid,
    key: &str,
) -> Result<Option<CreditTransaction>, ServiceError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let existing = sqlx::query_as::<_, CreditTransaction>(&format!(
        r#"
        SELECT {TRANSACTION_COLUMNS}
        FROM credit_transactions t
        WHERE t.idempotency_key = $2
          AND t.account_id = (SELECT id FROM credit_accounts WHERE user_id = $1)
        "#,
    ))
    .bind(user_id)
    .bind(key)
    .fetch_optional(executor)
    .await?;

    Ok(existing)
}

async fn insert_transaction(
    tx: &mut Transaction<'_, Postgres>,
    account_id: Uuid,
    transaction_type: TransactionType,
    amount: i64,
    cash_amount_cents: i64,
    balance_after: i64,
    description: &str,
    gift_id: Option<&str>,
    payout_request_id: Option<Uuid>,
    idempotency_key: Option<&str>,
) -> Result<CreditTransaction, ServiceError> {
    let row = sqlx::query_as::<_, CreditTransaction>(&format!(
        r#"
        INSERT INTO credit_transactions
        (account_id, transaction_type, amount, cash_amount_cents, balance_after,
         description, gift_id, payout_request_id, idempotency_key)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {TRANSACTION_COLUMNS}
        "#,
    ))
    .bind(account_id)
    .bind(transaction_type)
    .bind(amount)
    .bind(cash_amount_cents)
    .bind(balance_after)
    .bind(description)
    .bind(gift_id)
    .bind(payout_request_id)
    .bind(idempotency_key)
    .fetch_one(&mut **tx)
    .await?;

    Ok(row)
}

#[async_trait]
impl CreditLedgerExt for DBClient {
    async fn get_credit_account(&self, user_id: Uuid) -> Result<CreditAccount, ServiceError> {
        sqlx::query("INSERT INTO credit_accounts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        let account = sqlx::query_as::<_, CreditAccount>(
            r#"
            SELECT
                id,
                user_id,
                balance,
                earned_credits,
                purchased_credits,
                cash_balance_cents,
                lifetime_earnings_cents,
                lifetime_spent_credits,
                created_at,
                updated_at
            FROM credit_accounts
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    async fn apply_transaction(
        &self,
        user_id: Uuid,
        amount: i64,
        transaction_type: TransactionType,
        description: String,
        idempotency_key: Option<String>,
    ) -> Result<CreditTransaction, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if let Some(key) = idempotency_key.as_deref() {
            if let Some(existing) = find_by_idempotency_key(&mut *tx, user_id, key).await? {
                tx.rollback().await?;
                return Ok(existing);
            }
        }

        let account = lock_account(&mut tx, user_id).await?;

        let balance_after = account.balance + amount;
        if balance_after < 0 {
            return Err(ServiceError::InsufficientCredits {
                required: -amount,
                available: account.balance,
            });
        }

        let deltas = transaction_type.sub_field_deltas(amount);

        sqlx::query(
            r#"
            UPDATE credit_accounts
            SET balance = $2,
                purchased_credits = purchased_credits + $3,
                earned_credits = earned_credits + $4,
                lifetime_spent_credits = lifetime_spent_credits + $5,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(account.id)
        .bind(balance_after)
        .bind(deltas.purchased)
        .bind(deltas.earned)
        .bind(deltas.spent)
        .execute(&mut *tx)
        .await?;

        let transaction = match insert_transaction(
            &mut tx,
            account.id,
            transaction_type,
            amount,
            0,
            balance_after,
            &description,
            None,
            None,
            idempotency_key.as_deref(),
        )
        .await
        {
            Ok(row) => row,
            Err(e) if is_idempotency_conflict(&e) => {
                tx.rollback().await?;
                let key = idempotency_key.as_deref().unwrap_or_default();
                return find_by_idempotency_key(&self.pool, user_id, key)
                    .await?
                    .ok_or(e);
            }
            Err(e) => return Err(e),
        };

        tx.commit().await?;
        Ok(transaction)
    }

    async fn list_transactions(
        &self,
        user_id: Uuid,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<CreditTransaction>, ServiceError> {
        let rows = sqlx::query_as::<_, CreditTransaction>(&format!(
            r#"
            SELECT {TRANSACTION_COLUMNS}
            FROM credit_transactions t
            WHERE t.account_id = (SELECT id FROM credit_accounts WHERE user_id = $1)
            ORDER BY t.created_at DESC
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

    async fn send_gift(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        gift: &Gift,
        recipient_cash_cents: i64,
        idempotency_key: Option<String>,
    ) -> Result<GiftLedgerOutcome, ServiceError> {
        let mut tx = self.pool.begin().await?;

        if let Some(key) = idempotency_key.as_deref() {
            if let Some(existing) = find_by_idempotency_key(&mut *tx, sender_id, key).await? {
                let balance = sqlx::query(
                    "SELECT balance FROM credit_accounts WHERE user_id = $1",
                )
                .bind(sender_id)
                .fetch_one(&mut *tx)
                .await?
                .get::<i64, _>("balance");

                tx.rollback().await?;
                return Ok(GiftLedgerOutcome {
                    sender_transaction: existing,
                    sender_new_balance: balance,
                });
            }
        }

        let (first, second) = lock_order(sender_id, recipient_id);
        let first_account = lock_account(&mut tx, first).await?;
        let second_account = lock_account(&mut tx, second).await?;
        let (sender, recipient) = if first == sender_id {
            (first_account, second_account)
        } else {
            (second_account, first_account)
        };

        if sender.balance < gift.credit_cost {
            return Err(ServiceError::InsufficientCredits {
                required: gift.credit_cost,
                available: sender.balance,
            });
        }

        let sender_balance_after = sender.balance - gift.credit_cost;
        sqlx::query(
            r#"
            UPDATE credit_accounts
            SET balance = $2,
                lifetime_spent_credits = lifetime_spent_credits + $3,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(sender.id)
        .bind(sender_balance_after)
        .bind(gift.credit_cost)
        .execute(&mut *tx)
        .await?;

        let sender_transaction = match insert_transaction(
            &mut tx,
            sender.id,
            TransactionType::GiftSent,
            -gift.credit_cost,
            0,
            sender_balance_after,
            &format!("Sent gift: {} {}", gift.icon, gift.name),
            Some(gift.id),
            None,
            idempotency_key.as_deref(),
        )
        .await
        {
            Ok(row) => row,
            Err(e) if is_idempotency_conflict(&e) => {
                tx.rollback().await?;
                let key = idempotency_key.as_deref().unwrap_or_default();
                let existing = find_by_idempotency_key(&self.pool, sender_id, key)
                    .await?
                    .ok_or(e)?;
                let balance = sqlx::query_as::<_, (i64,)>(
                    "SELECT balance FROM credit_accounts WHERE user_id = $1",
                )
                .bind(sender_id)
                .fetch_one(&self.pool)
                .await?
                .0;
                return Ok(GiftLedgerOutcome {
                    sender_transaction: existing,
                    sender_new_balance: balance,
                });
            }
            Err(e) => return Err(e),
        };

        let recipient_balance_after = recipient.balance + gift.credit_cost;
        sqlx::query(
            r#"
            UPDATE credit_accounts
            SET balance = $2,
                earned_credits = earned_credits + $3,
                cash_balance_cents = cash_balance_cents + $4,
                lifetime_earnings_cents = lifetime_earnings_cents + $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(recipient.id)
        .bind(recipient_balance_after)
        .bind(gift.credit_cost)
        .bind(recipient_cash_cents)
        .execute(&mut *tx)
        .await?;

        insert_transaction(
            &mut tx,
            recipient.id,
            TransactionType::GiftReceived,
            gift.credit_cost,
            recipient_cash_cents,
            recipient_balance_after,
            &format!("Received gift: {} {}", gift.icon, gift.name),
            Some(gift.id),
            None,
            None,
        )
        .await?;

        tx.commit().await?;
        Ok(GiftLedgerOutcome {
            sender_transaction,
            sender_new_balance: sender_balance_after,
        })
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

    fn unique_violation(constraint: &'static str) -> ServiceError {
        ServiceError::Database(sqlx::Error::Database(Box::new(FakeUniqueViolation(constraint))))
    }

    #[test]
    fn duplicate_key_is_detected_by_constraint_name() {
        assert!(is_idempotency_conflict(&unique_violation(
            "uq_credit_transactions_idempotency"
        )));
        assert!(!is_idempotency_conflict(&unique_violation(
            "uq_payout_requests_outstanding"
        )));
        assert!(!is_idempotency_conflict(&ServiceError::Database(
            sqlx::Error::PoolTimedOut
        )));
    }

    #[test]
    fn accounts_lock_in_one_order_for_both_directions() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(lock_order(a, b), lock_order(b, a));

        let (first, second) = lock_order(a, b);
        assert!(first <= second);
        assert_eq!(lock_order(a, a), (a, a));
    }
}
