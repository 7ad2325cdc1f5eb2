use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::verdict::{ModerationAction, ModerationVerdict};

/// Kinds of user-generated content the pipeline moderates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    CommunityPost,
    CommunityMessage,
    PostComment,
}

impl ContentType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "community_post" => Some(ContentType::CommunityPost),
            "community_message" => Some(ContentType::CommunityMessage),
            "post_comment" => Some(ContentType::PostComment),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::CommunityPost => "community_post",
            ContentType::CommunityMessage => "community_message",
            ContentType::PostComment => "post_comment",
        }
    }
}

/// One persisted moderation decision.
///
/// `recommended_action` is what the classifier suggested; `action_taken`
/// is what the policy engine decided and is the authoritative value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRecord {
    pub id: Uuid,
    pub content_id: String,
    pub content_type: ContentType,
    pub user_id: Uuid,
    #[serde(flatten)]
    pub verdict: ModerationVerdict,
    pub action_taken: ModerationAction,
    pub auto_actioned: bool,
    pub requires_manual_review: bool,
    pub original_content: String,
    pub content_hash: String,
    pub media_urls: Vec<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Content-addressed hash used for dedup bookkeeping: SHA-256 over the
/// UTF-8 bytes, hex-encoded.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}
