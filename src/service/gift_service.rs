// service/gift_service.rs
use std::sync::Arc;

use uuid::Uuid;

use crate::db::creditdb::CreditLedgerExt;
use crate::db::db::DBClient;
use crate::db::userdb::UserExt;
use crate::models::giftmodels::{find_gift, Gift};
use crate::models::tiermodels::{SubscriptionTier, TierLimits};
use crate::models::usermodel::User;
use crate::service::error::ServiceError;
use crate::service::notification_service::NotificationService;

/// What a recipient takes away from one gift: the full credit value plus
/// the post-commission cash.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GiftEarnings {
    pub credits: i64,
    pub cash_cents: i64,
}

/// `net = usd_value * (1 - fee)` with the fee taken from the recipient's
/// tier row, in integer basis points.
pub fn calculate_earnings(gift: &Gift, tier: SubscriptionTier) -> GiftEarnings {
    let limits = TierLimits::for_tier(tier);
    GiftEarnings {
        credits: gift.credit_cost,
        cash_cents: gift.usd_value_cents() * limits.gift_payout_bps() / 10_000,
    }
}

#[derive(Debug)]
pub struct GiftSendOutcome {
    pub transaction_id: Uuid,
    pub sender_new_balance: i64,
    pub recipient_earned: GiftEarnings,
}

#[derive(Debug, Clone)]
pub struct GiftService {
    db_client: Arc<DBClient>,
    notification_service: Arc<NotificationService>,
}

impl GiftService {
    pub fn new(db_client: Arc<DBClient>, notification_service: Arc<NotificationService>) -> Self {
        Self { db_client, notification_service }
    }

    pub async fn send_gift(
        &self,
        sender: &User,
        recipient_id: Uuid,
        gift_id: &str,
        idempotency_key: Option<String>,
    ) -> Result<GiftSendOutcome, ServiceError> {
        if sender.id == recipient_id {
            return Err(ServiceError::Validation(
                "You cannot send a gift to yourself".to_string(),
            ));
        }

        let sender_limits = TierLimits::for_tier(sender.effective_tier());
        if !sender_limits.can_send_gifts {
            return Err(ServiceError::Validation(
                "Your current tier cannot send gifts".to_string(),
            ));
        }

        let gift = find_gift(gift_id)
            .ok_or_else(|| ServiceError::GiftNotFound(gift_id.to_string()))?;

        let recipient = self
            .db_client
            .get_user(recipient_id)
            .await?
            .ok_or_else(|| ServiceError::Validation("Recipient does not exist".to_string()))?;

        // Commission follows the recipient's tier.
        let earnings = calculate_earnings(gift, recipient.effective_tier());

        let outcome = self
            .db_client
            .send_gift(sender.id, recipient.id, gift, earnings.cash_cents, idempotency_key)
            .await?;

        // Fire-and-forget: a notification failure never unwinds the
        // committed ledger write.
        let notifications = self.notification_service.clone();
        let sender_name = sender.name.clone();
        let gift_copy = *gift;
        tokio::spawn(async move {
            if let Err(e) = notifications
                .notify_gift_received(recipient_id, &sender_name, &gift_copy, earnings.cash_cents)
                .await
            {
                tracing::warn!("gift notification failed: {}", e);
            }
        });

        Ok(GiftSendOutcome {
            transaction_id: outcome.sender_transaction.id,
            sender_new_balance: outcome.sender_new_balance,
            recipient_earned: earnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gift(credit_cost: i64) -> Gift {
        use crate::models::giftmodels::GiftCategory;
        Gift {
            id: "test",
            name: "Test",
            icon: "🎁",
            credit_cost,
            category: GiftCategory::Basic,
        }
    }

    #[test]
    fn vip_recipient_keeps_seventy_cents_of_a_dollar_gift() {
        let earnings = calculate_earnings(&gift(100), SubscriptionTier::Vip);
        assert_eq!(earnings.credits, 100);
        assert_eq!(earnings.cash_cents, 70);
    }

    #[test]
    fn free_recipient_keeps_forty_percent() {
        let earnings = calculate_earnings(&gift(100), SubscriptionTier::Free);
        assert_eq!(earnings.cash_cents, 40);

        let earnings = calculate_earnings(&gift(250), SubscriptionTier::Premium);
        assert_eq!(earnings.cash_cents, 125);
    }

    #[test]
    fn earnings_match_rate_for_the_whole_catalog() {
        use crate::models::giftmodels::gift_catalog;
        for gift in gift_catalog() {
            for tier in [
                SubscriptionTier::Anonymous,
                SubscriptionTier::Free,
                SubscriptionTier::Premium,
                SubscriptionTier::Vip,
            ] {
                let rate = TierLimits::for_tier(tier).gift_payout_bps();
                let earnings = calculate_earnings(gift, tier);
                assert_eq!(earnings.cash_cents, gift.usd_value_cents() * rate / 10_000);
                assert_eq!(earnings.credits, gift.credit_cost);
            }
        }
    }
}
