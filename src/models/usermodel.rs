// models/usermodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tiermodels::SubscriptionTier;

/// Identity row written by the auth collaborator; this service only reads
/// it to learn who is calling and what tier they hold.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub subscription_tier: SubscriptionTier,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl User {
    /// A paid tier with a lapsed expiry behaves as free.
    pub fn effective_tier(&self) -> SubscriptionTier {
        self.effective_tier_at(Utc::now())
    }

    pub fn effective_tier_at(&self, now: DateTime<Utc>) -> SubscriptionTier {
        if self.subscription_tier.is_paid() {
            match self.subscription_expires_at {
                Some(expires_at) if expires_at > now => self.subscription_tier,
                _ => SubscriptionTier::Free,
            }
        } else {
            self.subscription_tier
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(tier: SubscriptionTier, expires_at: Option<DateTime<Utc>>) -> User {
        User {
            id: Uuid::new_v4(),
            email: "ana@example.com".to_string(),
            name: "Ana".to_string(),
            subscription_tier: tier,
            subscription_expires_at: expires_at,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn expired_vip_downgrades_to_free() {
        let now = Utc::now();
        let vip = user(SubscriptionTier::Vip, Some(now - Duration::days(1)));
        assert_eq!(vip.effective_tier_at(now), SubscriptionTier::Free);

        let active = user(SubscriptionTier::Vip, Some(now + Duration::days(1)));
        assert_eq!(active.effective_tier_at(now), SubscriptionTier::Vip);

        let missing = user(SubscriptionTier::Premium, None);
        assert_eq!(missing.effective_tier_at(now), SubscriptionTier::Free);
    }

    #[test]
    fn free_tier_ignores_expiry() {
        let now = Utc::now();
        let free = user(SubscriptionTier::Free, Some(now - Duration::days(1)));
        assert_eq!(free.effective_tier_at(now), SubscriptionTier::Free);
    }
}
