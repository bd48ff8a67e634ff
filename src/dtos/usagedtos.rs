// dtos/usagedtos.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::usagemodels::ActionType;
use crate::service::quota_service::{MessageGate, QuotaLine, UsageStatus};

#[derive(Debug, Serialize, Deserialize)]
pub struct QuotaLineDto {
    pub used: i32,
    /// Absent for quotas the tier does not cap.
    pub limit: Option<i32>,
    pub remaining: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UsageStatusDto {
    pub tier: String,
    pub swipes: QuotaLineDto,
    pub messages: QuotaLineDto,
    pub super_likes: QuotaLineDto,
    pub boosts: QuotaLineDto,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RecordActionDto {
    pub action: ActionType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CanPerformQueryDto {
    pub action: ActionType,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CanPerformResponseDto {
    pub action: ActionType,
    pub allowed: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CanMessageResponseDto {
    pub can_send: bool,
    pub reason: Option<String>,
    pub cooldown_until: Option<DateTime<Utc>>,
    pub messages_remaining: Option<i32>,
}

impl From<QuotaLine> for QuotaLineDto {
    fn from(line: QuotaLine) -> Self {
        Self {
            used: line.used,
            limit: if line.unlimited { None } else { Some(line.limit) },
            remaining: line.remaining(),
        }
    }
}

impl From<UsageStatus> for UsageStatusDto {
    fn from(status: UsageStatus) -> Self {
        Self {
            tier: status.tier.to_string(),
            swipes: status.swipes.into(),
            messages: status.messages.into(),
            super_likes: status.super_likes.into(),
            boosts: status.boosts.into(),
        }
    }
}

impl From<MessageGate> for CanMessageResponseDto {
    fn from(gate: MessageGate) -> Self {
        Self {
            can_send: gate.can_send,
            reason: gate.reason,
            cooldown_until: gate.cooldown_until,
            messages_remaining: gate.messages_remaining,
        }
    }
}
