// models/tiermodels.rs
use serde::{Deserialize, Serialize};

/// Sentinel for quotas a tier does not cap.
pub const UNLIMITED: i32 = i32::MAX;

#[derive(Debug, Deserialize, Serialize, Clone, Copy, sqlx::Type, PartialEq, Eq)]
#[sqlx(type_name = "subscription_tier", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Anonymous,
    Free,
    Premium,
    Vip,
}

impl SubscriptionTier {
    pub fn to_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Anonymous => "anonymous",
            SubscriptionTier::Free => "free",
            SubscriptionTier::Premium => "premium",
            SubscriptionTier::Vip => "vip",
        }
    }

    pub fn is_paid(&self) -> bool {
        matches!(self, SubscriptionTier::Premium | SubscriptionTier::Vip)
    }
}

/// Static per-tier configuration: quota limits and the platform's gift
/// commission in basis points. One row per tier, fixed at deploy time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TierLimits {
    pub tier: SubscriptionTier,
    pub swipes_limit: i32,
    pub messages_limit: i32,
    pub super_likes_limit: i32,
    pub boosts_limit: i32,
    /// Platform cut of a gift's USD value; the recipient keeps 10000 - this.
    pub gift_fee_bps: i64,
    /// Messages to one recipient before the cooldown engages (paid tiers: unlimited).
    pub messages_before_cooldown: i32,
    pub can_send_gifts: bool,
    pub has_ads: bool,
    pub can_see_who_liked: bool,
}

impl TierLimits {
    pub fn for_tier(tier: SubscriptionTier) -> TierLimits {
        match tier {
            SubscriptionTier::Anonymous => TierLimits {
                tier,
                swipes_limit: 10,
                messages_limit: 0,
                super_likes_limit: 0,
                boosts_limit: 0,
                gift_fee_bps: 6000,
                messages_before_cooldown: 0,
                can_send_gifts: false,
                has_ads: true,
                can_see_who_liked: false,
            },
            SubscriptionTier::Free => TierLimits {
                tier,
                swipes_limit: 50,
                messages_limit: 20,
                super_likes_limit: 1,
                boosts_limit: 0,
                gift_fee_bps: 6000,
                messages_before_cooldown: 3,
                can_send_gifts: true,
                has_ads: true,
                can_see_who_liked: false,
            },
            SubscriptionTier::Premium => TierLimits {
                tier,
                swipes_limit: UNLIMITED,
                messages_limit: UNLIMITED,
                super_likes_limit: 5,
                boosts_limit: 1,
                gift_fee_bps: 5000,
                messages_before_cooldown: UNLIMITED,
                can_send_gifts: true,
                has_ads: false,
                can_see_who_liked: true,
            },
            SubscriptionTier::Vip => TierLimits {
                tier,
                swipes_limit: UNLIMITED,
                messages_limit: UNLIMITED,
                super_likes_limit: 10,
                boosts_limit: 3,
                gift_fee_bps: 3000,
                messages_before_cooldown: UNLIMITED,
                can_send_gifts: true,
                has_ads: false,
                can_see_who_liked: true,
            },
        }
    }

    /// Recipient's share of a gift's USD value, in basis points.
    pub fn gift_payout_bps(&self) -> i64 {
        10_000 - self.gift_fee_bps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vip_keeps_seventy_percent() {
        assert_eq!(TierLimits::for_tier(SubscriptionTier::Vip).gift_payout_bps(), 7000);
        assert_eq!(TierLimits::for_tier(SubscriptionTier::Premium).gift_payout_bps(), 5000);
        assert_eq!(TierLimits::for_tier(SubscriptionTier::Free).gift_payout_bps(), 4000);
        assert_eq!(TierLimits::for_tier(SubscriptionTier::Anonymous).gift_payout_bps(), 4000);
    }

    #[test]
    fn anonymous_cannot_send_gifts_or_message() {
        let limits = TierLimits::for_tier(SubscriptionTier::Anonymous);
        assert!(!limits.can_send_gifts);
        assert_eq!(limits.messages_limit, 0);
        assert_eq!(limits.boosts_limit, 0);
    }

    #[test]
    fn paid_tiers_have_no_swipe_cap_or_ads() {
        for tier in [SubscriptionTier::Premium, SubscriptionTier::Vip] {
            let limits = TierLimits::for_tier(tier);
            assert_eq!(limits.swipes_limit, UNLIMITED);
            assert_eq!(limits.messages_before_cooldown, UNLIMITED);
            assert!(!limits.has_ads);
            assert!(limits.can_see_who_liked);
        }
    }
}
