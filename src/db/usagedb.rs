// db/usagedb.rs
use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use super::db::DBClient;
use crate::models::usagemodels::{ActionType, DailyUsage, MessageCooldown, MonthlyUsage};
use crate::service::error::ServiceError;

#[async_trait]
pub trait UsageExt {
    /// Today's counters; a date the user has not acted on reads as a
    /// fresh zero row (rollover is lazy, there is no reset job).
    async fn get_daily_usage(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<DailyUsage, ServiceError>;

    async fn get_monthly_usage(
        &self,
        user_id: Uuid,
        month_start: NaiveDate,
    ) -> Result<MonthlyUsage, ServiceError>;

    /// Increment-if-still-under-limit in a single statement, so N
    /// concurrent calls at the boundary cannot collectively exceed the
    /// limit. `None` means the limit was already reached and nothing
    /// changed.
    async fn increment_daily_action(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        action: ActionType,
        limit: i32,
    ) -> Result<Option<DailyUsage>, ServiceError>;

    async fn increment_monthly_boosts(
        &self,
        user_id: Uuid,
        month_start: NaiveDate,
        limit: i32,
    ) -> Result<Option<MonthlyUsage>, ServiceError>;

    async fn get_cooldown(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Option<MessageCooldown>, ServiceError>;

    /// Count one message toward the pair and, when the count reaches the
    /// threshold, arm the cooldown timer in the same statement.
    async fn record_pair_message(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        threshold: i32,
        cooldown_hours: i32,
    ) -> Result<MessageCooldown, ServiceError>;

    /// Reply observed (or timer elapsed): drop the pair record.
    async fn clear_cooldown(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<(), ServiceError>;
}

fn daily_increment_sql(action: ActionType) -> Result<&'static str, ServiceError> {
    match action {
        ActionType::Swipe => Ok(r#"
            INSERT INTO daily_usage (user_id, usage_date, swipes)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, usage_date) DO UPDATE
            SET swipes = daily_usage.swipes + 1
            WHERE daily_usage.swipes < $3
            RETURNING user_id, usage_date, swipes, messages, super_likes
        "#),
        ActionType::Message => Ok(r#"
            INSERT INTO daily_usage (user_id, usage_date, messages)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, usage_date) DO UPDATE
            SET messages = daily_usage.messages + 1
            WHERE daily_usage.messages < $3
            RETURNING user_id, usage_date, swipes, messages, super_likes
        "#),
        ActionType::SuperLike => Ok(r#"
            INSERT INTO daily_usage (user_id, usage_date, super_likes)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, usage_date) DO UPDATE
            SET super_likes = daily_usage.super_likes + 1
            WHERE daily_usage.super_likes < $3
            RETURNING user_id, usage_date, swipes, messages, super_likes
        "#),
        ActionType::Boost => Err(ServiceError::Validation(
            "Boosts are tracked monthly, not daily".to_string(),
        )),
    }
}

#[async_trait]
impl UsageExt for DBClient {
    async fn get_daily_usage(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> Result<DailyUsage, ServiceError> {
        let row = sqlx::query_as::<_, DailyUsage>(
            r#"
            SELECT user_id, usage_date, swipes, messages, super_likes
            FROM daily_usage
            WHERE user_id = $1 AND usage_date = $2
            "#,
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.unwrap_or_else(|| DailyUsage::fresh(user_id, date)))
    }

    async fn get_monthly_usage(
        &self,
        user_id: Uuid,
        month_start: NaiveDate,
    ) -> Result<MonthlyUsage, ServiceError> {
        let row = sqlx::query_as::<_, MonthlyUsage>(
            r#"
            SELECT user_id, month_start, boosts
            FROM monthly_usage
            WHERE user_id = $1 AND month_start = $2
            "#,
        )
        .bind(user_id)
        .bind(month_start)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.unwrap_or_else(|| MonthlyUsage::fresh(user_id, month_start)))
    }

    async fn increment_daily_action(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        action: ActionType,
        limit: i32,
    ) -> Result<Option<DailyUsage>, ServiceError> {
        if limit < 1 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, DailyUsage>(daily_increment_sql(action)?)
            .bind(user_id)
            .bind(date)
            .bind(limit)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row)
    }

    async fn increment_monthly_boosts(
        &self,
        user_id: Uuid,
        month_start: NaiveDate,
        limit: i32,
    ) -> Result<Option<MonthlyUsage>, ServiceError> {
        if limit < 1 {
            return Ok(None);
        }

        let row = sqlx::query_as::<_, MonthlyUsage>(
            r#"
            INSERT INTO monthly_usage (user_id, month_start, boosts)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id, month_start) DO UPDATE
            SET boosts = monthly_usage.boosts + 1
            WHERE monthly_usage.boosts < $3
            RETURNING user_id, month_start, boosts
            "#,
        )
        .bind(user_id)
        .bind(month_start)
        .bind(limit)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn get_cooldown(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<Option<MessageCooldown>, ServiceError> {
        let row = sqlx::query_as::<_, MessageCooldown>(
            r#"
            SELECT sender_id, recipient_id, messages_since_reply, cooldown_until, updated_at
            FROM message_cooldowns
            WHERE sender_id = $1 AND recipient_id = $2
            "#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn record_pair_message(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        threshold: i32,
        cooldown_hours: i32,
    ) -> Result<MessageCooldown, ServiceError> {
        let row = sqlx::query_as::<_, MessageCooldown>(
            r#"
            INSERT INTO message_cooldowns
            (sender_id, recipient_id, messages_since_reply, cooldown_until, updated_at)
            VALUES (
                $1, $2, 1,
                CASE WHEN 1 >= $3 THEN NOW() + make_interval(hours => $4) END,
                NOW()
            )
            ON CONFLICT (sender_id, recipient_id) DO UPDATE
            SET messages_since_reply = message_cooldowns.messages_since_reply + 1,
                cooldown_until = CASE
                    WHEN message_cooldowns.messages_since_reply + 1 >= $3
                        THEN NOW() + make_interval(hours => $4)
                    ELSE message_cooldowns.cooldown_until
                END,
                updated_at = NOW()
            RETURNING sender_id, recipient_id, messages_since_reply, cooldown_until, updated_at
            "#,
        )
        .bind(sender_id)
        .bind(recipient_id)
        .bind(threshold)
        .bind(cooldown_hours)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn clear_cooldown(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
    ) -> Result<(), ServiceError> {
        sqlx::query("DELETE FROM message_cooldowns WHERE sender_id = $1 AND recipient_id = $2")
            .bind(sender_id)
            .bind(recipient_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
