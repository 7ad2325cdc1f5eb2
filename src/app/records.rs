use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::policy::PolicyDecision;
use crate::domain::record::{ContentType, ModerationRecord};
use crate::domain::verdict::{ContentCategory, ModerationAction, ModerationVerdict, Severity};
use crate::infra::db::Db;

const RECORD_COLUMNS: &str =
    "id, content_id, content_type, user_id, is_appropriate, categories, severity, confidence, \
     flags, detected_language, recommended_action, action_taken, auto_actioned, \
     requires_manual_review, original_content, content_hash, media_urls, created_at";

/// Persistence for moderation records: the insert-then-finalize
/// lifecycle plus the read paths used by review tooling.
#[derive(Clone)]
pub struct RecordService {
    db: Db,
}

pub struct NewRecord<'a> {
    pub content_id: &'a str,
    pub content_type: ContentType,
    pub user_id: Uuid,
    pub original_content: &'a str,
    pub content_hash: &'a str,
    pub media_urls: &'a [String],
}

impl RecordService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Insert the record with `action_taken` seeded from the
    /// classifier's own recommendation. The policy result overwrites it
    /// exactly once via `finalize`, preserving what the raw verdict
    /// said versus what was actually done.
    pub async fn insert_pending(
        &self,
        new: &NewRecord<'_>,
        verdict: &ModerationVerdict,
    ) -> Result<(Uuid, OffsetDateTime)> {
        let categories: Vec<String> = verdict
            .categories
            .iter()
            .map(|category| category.as_str().to_string())
            .collect();

        let row = sqlx::query(
            "INSERT INTO moderation_records \
             (content_id, content_type, user_id, is_appropriate, categories, severity, \
              confidence, flags, detected_language, recommended_action, action_taken, \
              auto_actioned, requires_manual_review, original_content, content_hash, media_urls) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10, false, false, $11, $12, $13) \
             RETURNING id, created_at",
        )
        .bind(new.content_id)
        .bind(new.content_type.as_str())
        .bind(new.user_id)
        .bind(verdict.is_appropriate)
        .bind(&categories)
        .bind(verdict.severity.as_str())
        .bind(verdict.confidence)
        .bind(&verdict.flags)
        .bind(&verdict.detected_language)
        .bind(verdict.recommended_action.as_str())
        .bind(new.original_content)
        .bind(new.content_hash)
        .bind(new.media_urls)
        .fetch_one(self.db.pool())
        .await?;

        Ok((row.get("id"), row.get("created_at")))
    }

    /// Write the policy decision. Called once per record.
    pub async fn finalize(&self, id: Uuid, decision: PolicyDecision) -> Result<()> {
        sqlx::query(
            "UPDATE moderation_records \
             SET action_taken = $1, auto_actioned = true, requires_manual_review = $2, \
                 updated_at = NOW() \
             WHERE id = $3",
        )
        .bind(decision.final_action.as_str())
        .bind(decision.requires_manual_review)
        .bind(id)
        .execute(self.db.pool())
        .await?;

        Ok(())
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<ModerationRecord>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM moderation_records WHERE id = $1",
            RECORD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.map(row_to_record))
    }

    pub async fn list(
        &self,
        cursor: Option<(OffsetDateTime, Uuid)>,
        limit: i64,
    ) -> Result<Vec<ModerationRecord>> {
        let rows = match cursor {
            Some((created_at, record_id)) => {
                sqlx::query(&format!(
                    "SELECT {} FROM moderation_records \
                     WHERE (created_at < $1 OR (created_at = $1 AND id < $2)) \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $3",
                    RECORD_COLUMNS
                ))
                .bind(created_at)
                .bind(record_id)
                .bind(limit)
                .fetch_all(self.db.pool())
                .await?
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM moderation_records \
                     ORDER BY created_at DESC, id DESC \
                     LIMIT $1",
                    RECORD_COLUMNS
                ))
                .bind(limit)
                .fetch_all(self.db.pool())
                .await?
            }
        };

        Ok(rows.into_iter().map(row_to_record).collect())
    }
}

fn row_to_record(row: PgRow) -> ModerationRecord {
    let categories: Vec<String> = row.get("categories");
    let severity: String = row.get("severity");
    let recommended_action: String = row.get("recommended_action");
    let action_taken: String = row.get("action_taken");
    let content_type: String = row.get("content_type");

    ModerationRecord {
        id: row.get("id"),
        content_id: row.get("content_id"),
        content_type: ContentType::from_str(&content_type).unwrap_or(ContentType::CommunityPost),
        user_id: row.get("user_id"),
        verdict: ModerationVerdict {
            is_appropriate: row.get("is_appropriate"),
            categories: categories
                .iter()
                .filter_map(|category| ContentCategory::from_str(category))
                .collect(),
            severity: Severity::from_str(&severity).unwrap_or(Severity::Medium),
            confidence: row.get("confidence"),
            flags: row.get("flags"),
            detected_language: row.get("detected_language"),
            recommended_action: ModerationAction::from_str(&recommended_action)
                .unwrap_or(ModerationAction::ManualReview),
        },
        action_taken: ModerationAction::from_str(&action_taken)
            .unwrap_or(ModerationAction::ManualReview),
        auto_actioned: row.get("auto_actioned"),
        requires_manual_review: row.get("requires_manual_review"),
        original_content: row.get("original_content"),
        content_hash: row.get("content_hash"),
        media_urls: row.get("media_urls"),
        created_at: row.get("created_at"),
    }
}
