// service/quota_service.rs
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::db::db::DBClient;
use crate::db::usagedb::UsageExt;
use crate::models::tiermodels::{TierLimits, UNLIMITED};
use crate::models::usagemodels::{
    month_start_of, within_daily_limit, ActionType, COOLDOWN_HOURS,
};
use crate::models::usermodel::User;
use crate::service::error::ServiceError;

/// One quota line: used vs allowed, with `remaining = None` for tiers the
/// limit does not apply to.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct QuotaLine {
    pub used: i32,
    pub limit: i32,
    pub unlimited: bool,
}

impl QuotaLine {
    fn new(used: i32, limit: i32) -> Self {
        QuotaLine { used, limit, unlimited: limit == UNLIMITED }
    }

    pub fn remaining(&self) -> Option<i32> {
        if self.unlimited {
            None
        } else {
            Some((self.limit - self.used).max(0))
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UsageStatus {
    pub tier: &'static str,
    pub swipes: QuotaLine,
    pub messages: QuotaLine,
    pub super_likes: QuotaLine,
    pub boosts: QuotaLine,
}

/// Outcome of a can-send-message probe, including why it was refused.
#[derive(Debug, Clone, Serialize)]
pub struct MessageGate {
    pub can_send: bool,
    pub reason: Option<String>,
    pub cooldown_until: Option<DateTime<Utc>>,
    /// Messages left to this recipient before the cooldown arms; `None`
    /// when the tier has no per-pair throttle.
    pub messages_remaining: Option<i32>,
}

impl MessageGate {
    fn open(messages_remaining: Option<i32>) -> Self {
        MessageGate { can_send: true, reason: None, cooldown_until: None, messages_remaining }
    }
}

#[derive(Debug, Clone)]
pub struct QuotaService {
    db_client: Arc<DBClient>,
}

impl QuotaService {
    pub fn new(db_client: Arc<DBClient>) -> Self {
        Self { db_client }
    }

    fn limit_for(limits: &TierLimits, action: ActionType) -> i32 {
        match action {
            ActionType::Swipe => limits.swipes_limit,
            ActionType::Message => limits.messages_limit,
            ActionType::SuperLike => limits.super_likes_limit,
            ActionType::Boost => limits.boosts_limit,
        }
    }

    pub async fn usage_status(&self, user: &User) -> Result<UsageStatus, ServiceError> {
        let limits = TierLimits::for_tier(user.effective_tier());
        let today = Utc::now().date_naive();
        let daily = self.db_client.get_daily_usage(user.id, today).await?;
        let monthly = self
            .db_client
            .get_monthly_usage(user.id, month_start_of(today))
            .await?;

        Ok(UsageStatus {
            tier: limits.tier.to_str(),
            swipes: QuotaLine::new(daily.swipes, limits.swipes_limit),
            messages: QuotaLine::new(daily.messages, limits.messages_limit),
            super_likes: QuotaLine::new(daily.super_likes, limits.super_likes_limit),
            boosts: QuotaLine::new(monthly.boosts, limits.boosts_limit),
        })
    }

    /// Read-only probe; never consumes quota.
    pub async fn can_perform_action(
        &self,
        user: &User,
        action: ActionType,
    ) -> Result<bool, ServiceError> {
        let limits = TierLimits::for_tier(user.effective_tier());
        let limit = Self::limit_for(&limits, action);
        if limit == UNLIMITED {
            return Ok(true);
        }

        let today = Utc::now().date_naive();
        let used = match action {
            ActionType::Boost => {
                self.db_client
                    .get_monthly_usage(user.id, month_start_of(today))
                    .await?
                    .boosts
            }
            _ => {
                let daily = self.db_client.get_daily_usage(user.id, today).await?;
                match action {
                    ActionType::Swipe => daily.swipes,
                    ActionType::Message => daily.messages,
                    ActionType::SuperLike => daily.super_likes,
                    ActionType::Boost => unreachable!(),
                }
            }
        };

        Ok(within_daily_limit(used, limit))
    }

    /// Consume one unit of quota, or fail with `DailyLimitExceeded`
    /// without consuming anything. Boosts count against the calendar
    /// month, everything else against the UTC day.
    pub async fn record_action(
        &self,
        user: &User,
        action: ActionType,
    ) -> Result<(), ServiceError> {
        let limits = TierLimits::for_tier(user.effective_tier());
        let limit = Self::limit_for(&limits, action);
        let today = Utc::now().date_naive();

        let exceeded = ServiceError::DailyLimitExceeded {
            action: action.to_str().to_string(),
            limit,
        };

        match action {
            ActionType::Boost => {
                if limit == UNLIMITED {
                    return Ok(());
                }
                self.db_client
                    .increment_monthly_boosts(user.id, month_start_of(today), limit)
                    .await?
                    .map(|_| ())
                    .ok_or(exceeded)
            }
            _ => {
                if limit == UNLIMITED {
                    return Ok(());
                }
                self.db_client
                    .increment_daily_action(user.id, today, action, limit)
                    .await?
                    .map(|_| ())
                    .ok_or(exceeded)
            }
        }
    }

    /// Check both gates on messaging `recipient_id`: the daily message
    /// quota and the per-pair cooldown. An elapsed cooldown is cleared
    /// here rather than by a sweeper.
    pub async fn can_send_message(
        &self,
        user: &User,
        recipient_id: Uuid,
    ) -> Result<MessageGate, ServiceError> {
        let limits = TierLimits::for_tier(user.effective_tier());
        let now = Utc::now();

        if limits.messages_limit == 0 {
            return Ok(MessageGate {
                can_send: false,
                reason: Some("Your tier cannot send messages".to_string()),
                cooldown_until: None,
                messages_remaining: Some(0),
            });
        }

        if limits.messages_limit != UNLIMITED {
            let daily = self.db_client.get_daily_usage(user.id, now.date_naive()).await?;
            if daily.messages >= limits.messages_limit {
                return Ok(MessageGate {
                    can_send: false,
                    reason: Some(format!(
                        "Daily message limit of {} reached",
                        limits.messages_limit
                    )),
                    cooldown_until: None,
                    messages_remaining: Some(0),
                });
            }
        }

        if limits.messages_before_cooldown == UNLIMITED {
            return Ok(MessageGate::open(None));
        }

        match self.db_client.get_cooldown(user.id, recipient_id).await? {
            None => Ok(MessageGate::open(Some(limits.messages_before_cooldown))),
            Some(cooldown) if cooldown.is_active(now) => Ok(MessageGate {
                can_send: false,
                reason: Some(format!(
                    "Wait for a reply or up to {} hours before messaging again",
                    COOLDOWN_HOURS
                )),
                cooldown_until: cooldown.cooldown_until,
                messages_remaining: Some(0),
            }),
            Some(cooldown) => {
                if cooldown.cooldown_until.is_some() {
                    // Timer elapsed; the pair starts over.
                    self.db_client.clear_cooldown(user.id, recipient_id).await?;
                    return Ok(MessageGate::open(Some(limits.messages_before_cooldown)));
                }
                let remaining =
                    (limits.messages_before_cooldown - cooldown.messages_since_reply).max(0);
                Ok(MessageGate::open(Some(remaining)))
            }
        }
    }

    /// Consume a message send: one unit of daily quota plus one count
    /// toward the pair cooldown. Fails closed before either write if a
    /// gate is shut.
    pub async fn record_message_sent(
        &self,
        user: &User,
        recipient_id: Uuid,
    ) -> Result<MessageGate, ServiceError> {
        let limits = TierLimits::for_tier(user.effective_tier());
        let now = Utc::now();

        let gate = self.can_send_message(user, recipient_id).await?;
        if !gate.can_send {
            return match gate.cooldown_until {
                Some(until) => Err(ServiceError::CooldownActive { until }),
                None => Err(ServiceError::DailyLimitExceeded {
                    action: ActionType::Message.to_str().to_string(),
                    limit: limits.messages_limit,
                }),
            };
        }

        if limits.messages_limit != UNLIMITED {
            self.db_client
                .increment_daily_action(user.id, now.date_naive(), ActionType::Message, limits.messages_limit)
                .await?
                .ok_or(ServiceError::DailyLimitExceeded {
                    action: ActionType::Message.to_str().to_string(),
                    limit: limits.messages_limit,
                })?;
        }

        if limits.messages_before_cooldown == UNLIMITED {
            return Ok(MessageGate::open(None));
        }

        let cooldown = self
            .db_client
            .record_pair_message(
                user.id,
                recipient_id,
                limits.messages_before_cooldown,
                COOLDOWN_HOURS as i32,
            )
            .await?;

        let remaining =
            (limits.messages_before_cooldown - cooldown.messages_since_reply).max(0);
        Ok(MessageGate {
            can_send: remaining > 0,
            reason: None,
            cooldown_until: cooldown.cooldown_until,
            messages_remaining: Some(remaining),
        })
    }

    /// `replier` answered `peer`: peer's unanswered streak toward replier
    /// resets and any armed cooldown lifts immediately.
    pub async fn record_reply(&self, replier_id: Uuid, peer_id: Uuid) -> Result<(), ServiceError> {
        self.db_client.clear_cooldown(peer_id, replier_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tiermodels::SubscriptionTier;

    #[test]
    fn quota_line_remaining_clamps_at_zero() {
        assert_eq!(QuotaLine::new(3, 10).remaining(), Some(7));
        assert_eq!(QuotaLine::new(10, 10).remaining(), Some(0));
        assert_eq!(QuotaLine::new(12, 10).remaining(), Some(0));
        assert_eq!(QuotaLine::new(999, UNLIMITED).remaining(), None);
    }

    #[test]
    fn limits_route_by_action() {
        let free = TierLimits::for_tier(SubscriptionTier::Free);
        assert_eq!(QuotaService::limit_for(&free, ActionType::Swipe), 50);
        assert_eq!(QuotaService::limit_for(&free, ActionType::Message), 20);
        assert_eq!(QuotaService::limit_for(&free, ActionType::SuperLike), 1);
        assert_eq!(QuotaService::limit_for(&free, ActionType::Boost), 0);

        let vip = TierLimits::for_tier(SubscriptionTier::Vip);
        assert_eq!(QuotaService::limit_for(&vip, ActionType::Swipe), UNLIMITED);
        assert_eq!(QuotaService::limit_for(&vip, ActionType::Boost), 3);
    }
}
