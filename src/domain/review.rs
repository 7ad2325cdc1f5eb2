use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::verdict::Severity;

pub const PRIORITY_HIGH: i32 = 8;
pub const PRIORITY_STANDARD: i32 = 5;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum QueueType {
    Standard,
}

impl QueueType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "standard" => Some(QueueType::Standard),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueueType::Standard => "standard",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Resolved,
}

impl ReviewStatus {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(ReviewStatus::Pending),
            "resolved" => Some(ReviewStatus::Resolved),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewStatus::Pending => "pending",
            ReviewStatus::Resolved => "resolved",
        }
    }
}

/// A borderline verdict waiting for human adjudication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewQueueEntry {
    pub id: Uuid,
    pub moderation_id: Uuid,
    pub priority: i32,
    pub queue_type: QueueType,
    pub status: ReviewStatus,
    pub resolution_notes: Option<String>,
    #[serde(with = "time::serde::rfc3339::option")]
    pub resolved_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// High-severity verdicts jump the queue; everything else waits at the
/// standard priority.
pub fn priority_for(severity: Severity) -> i32 {
    if severity == Severity::High {
        PRIORITY_HIGH
    } else {
        PRIORITY_STANDARD
    }
}
