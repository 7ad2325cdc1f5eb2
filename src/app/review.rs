use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::review::{priority_for, QueueType, ReviewQueueEntry, ReviewStatus};
use crate::domain::verdict::Severity;
use crate::infra::db::Db;

const QUEUE_COLUMNS: &str =
    "id, moderation_id, priority, queue_type, status, resolution_notes, resolved_at, created_at";

pub enum ResolveOutcome {
    Resolved(ReviewQueueEntry),
    AlreadyResolved,
    NotFound,
}

/// Human adjudication queue. Enqueueing is not idempotent; a retried
/// pipeline run may enqueue the same moderation twice and reviewers
/// dedup downstream.
#[derive(Clone)]
pub struct ReviewService {
    db: Db,
}

impl ReviewService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn enqueue(
        &self,
        moderation_id: Uuid,
        severity: Severity,
    ) -> Result<ReviewQueueEntry> {
        let row = sqlx::query(&format!(
            "INSERT INTO review_queue (moderation_id, priority, queue_type, status) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            QUEUE_COLUMNS
        ))
        .bind(moderation_id)
        .bind(priority_for(severity))
        .bind(QueueType::Standard.as_str())
        .bind(ReviewStatus::Pending.as_str())
        .fetch_one(self.db.pool())
        .await?;

        Ok(row_to_entry(row))
    }

    /// Entries for a status, most urgent first, oldest first within a
    /// priority.
    pub async fn list(&self, status: ReviewStatus, limit: i64) -> Result<Vec<ReviewQueueEntry>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM review_queue \
             WHERE status = $1 \
             ORDER BY priority DESC, created_at ASC \
             LIMIT $2",
            QUEUE_COLUMNS
        ))
        .bind(status.as_str())
        .bind(limit)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(row_to_entry).collect())
    }

    pub async fn resolve(&self, id: Uuid, notes: Option<String>) -> Result<ResolveOutcome> {
        let row = sqlx::query(&format!(
            "UPDATE review_queue \
             SET status = $1, resolved_at = NOW(), resolution_notes = $2 \
             WHERE id = $3 AND status = $4 \
             RETURNING {}",
            QUEUE_COLUMNS
        ))
        .bind(ReviewStatus::Resolved.as_str())
        .bind(&notes)
        .bind(id)
        .bind(ReviewStatus::Pending.as_str())
        .fetch_optional(self.db.pool())
        .await?;

        if let Some(row) = row {
            return Ok(ResolveOutcome::Resolved(row_to_entry(row)));
        }

        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM review_queue WHERE id = $1)")
                .bind(id)
                .fetch_one(self.db.pool())
                .await?;

        if exists {
            Ok(ResolveOutcome::AlreadyResolved)
        } else {
            Ok(ResolveOutcome::NotFound)
        }
    }
}

fn row_to_entry(row: PgRow) -> ReviewQueueEntry {
    let queue_type: String = row.get("queue_type");
    let status: String = row.get("status");

    ReviewQueueEntry {
        id: row.get("id"),
        moderation_id: row.get("moderation_id"),
        priority: row.get("priority"),
        queue_type: QueueType::from_str(&queue_type).unwrap_or(QueueType::Standard),
        status: ReviewStatus::from_str(&status).unwrap_or(ReviewStatus::Pending),
        resolution_notes: row.get("resolution_notes"),
        resolved_at: row.get("resolved_at"),
        created_at: row.get("created_at"),
    }
}
