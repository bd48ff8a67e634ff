// service/notification_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::db::db::DBClient;
use crate::models::giftmodels::Gift;
use crate::service::error::ServiceError;

/// Fire-and-forget delivery: callers spawn these and a failure is logged,
/// never propagated into the ledger write that triggered it.
#[derive(Debug, Clone)]
pub struct NotificationService {
    db_client: Arc<DBClient>,
}

impl NotificationService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    pub async fn notify_gift_received(
        &self,
        recipient_id: Uuid,
        sender_name: &str,
        gift: &Gift,
        earned_cents: i64,
    ) -> Result<(), ServiceError> {
        tracing::info!(
            "Gift notification: {} {} for user {} (+{} cents)",
            gift.icon,
            gift.name,
            recipient_id,
            earned_cents
        );

        self.store_notification(
            recipient_id,
            "gift_received",
            Some(serde_json::json!({
                "gift_id": gift.id,
                "gift_name": gift.name,
                "gift_icon": gift.icon,
                "earned_cents": earned_cents,
            })),
            format!("{} sent you a {} {}!", sender_name, gift.icon, gift.name),
        )
        .await
    }

    async fn store_notification(
        &self,
        user_id: Uuid,
        kind: &str,
        payload: Option<serde_json::Value>,
        message: String,
    ) -> Result<(), ServiceError> {
        sqlx::query(
            r#"
            INSERT INTO notifications (user_id, kind, payload, message)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(user_id)
        .bind(kind)
        .bind(payload)
        .bind(message)
        .execute(&self.db_client.pool)
        .await?;

        Ok(())
    }
}
