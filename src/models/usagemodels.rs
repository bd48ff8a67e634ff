// models/usagemodels.rs
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// How long a pair stays throttled once the cooldown engages.
pub const COOLDOWN_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Swipe,
    Message,
    SuperLike,
    Boost,
}

impl ActionType {
    pub fn to_str(&self) -> &str {
        match self {
            ActionType::Swipe => "swipe",
            ActionType::Message => "message",
            ActionType::SuperLike => "super_like",
            ActionType::Boost => "boost",
        }
    }
}

/// Per-(user, UTC day) counters; superseded by a fresh zero row when the
/// date rolls over, never reset in place.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct DailyUsage {
    pub user_id: Uuid,
    pub usage_date: NaiveDate,
    pub swipes: i32,
    pub messages: i32,
    pub super_likes: i32,
}

impl DailyUsage {
    pub fn fresh(user_id: Uuid, usage_date: NaiveDate) -> Self {
        DailyUsage { user_id, usage_date, swipes: 0, messages: 0, super_likes: 0 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MonthlyUsage {
    pub user_id: Uuid,
    pub month_start: NaiveDate,
    pub boosts: i32,
}

impl MonthlyUsage {
    pub fn fresh(user_id: Uuid, month_start: NaiveDate) -> Self {
        MonthlyUsage { user_id, month_start, boosts: 0 }
    }
}

/// Per (sender, recipient) throttle record. Absent row = Idle; an elapsed
/// `cooldown_until` is treated as Idle on the next read.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MessageCooldown {
    pub sender_id: Uuid,
    pub recipient_id: Uuid,
    pub messages_since_reply: i32,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl MessageCooldown {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.cooldown_until.map_or(false, |until| until > now)
    }
}

/// First day of the UTC month containing `date`.
pub fn month_start_of(date: NaiveDate) -> NaiveDate {
    date.with_day(1).expect("day 1 is always valid")
}

/// Increment-if-under-limit predicate: the Nth action at limit N is
/// allowed, the (N+1)th is not.
pub fn within_daily_limit(used: i32, limit: i32) -> bool {
    used < limit
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn month_start_truncates_the_day() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 23).unwrap();
        assert_eq!(month_start_of(date), NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
    }

    #[test]
    fn elapsed_cooldown_is_not_active() {
        let now = Utc.with_ymd_and_hms(2025, 7, 23, 12, 0, 0).unwrap();
        let mut cooldown = MessageCooldown {
            sender_id: Uuid::new_v4(),
            recipient_id: Uuid::new_v4(),
            messages_since_reply: 3,
            cooldown_until: Some(now - Duration::minutes(1)),
            updated_at: None,
        };
        assert!(!cooldown.is_active(now));

        cooldown.cooldown_until = Some(now + Duration::hours(1));
        assert!(cooldown.is_active(now));

        cooldown.cooldown_until = None;
        assert!(!cooldown.is_active(now));
    }

    #[test]
    fn daily_limit_allows_the_nth_and_blocks_the_next() {
        let limit = 5;
        // Fifth action of the day with limit 5.
        assert!(within_daily_limit(4, limit));
        // Sixth.
        assert!(!within_daily_limit(5, limit));
        assert!(!within_daily_limit(6, limit));
        assert!(!within_daily_limit(0, 0));
    }
}
