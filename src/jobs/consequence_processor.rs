use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::app::review::ReviewService;
use crate::app::strikes::StrikeService;
use crate::domain::verdict::{ModerationAction, Severity};
use crate::infra::{db::Db, queue::QueueClient};

/// Post-decision consequence work handed from the API to the worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsequenceJob {
    pub moderation_id: Uuid,
    pub user_id: Uuid,
    pub severity: Severity,
    pub final_action: ModerationAction,
    pub requires_manual_review: bool,
}

const POLL_WAIT_SECONDS: i32 = 10;
const IDLE_SLEEP_MS: u64 = 200;
const ERROR_BACKOFF_MS: u64 = 1000;

pub async fn run(db: Db, queue: QueueClient) -> Result<()> {
    info!("consequence processor started");
    loop {
        match queue.receive_consequence(POLL_WAIT_SECONDS).await {
            Ok(Some(message)) => {
                apply_consequences(&db, &message.job).await;
                // Consequences are best-effort by contract; a failed
                // write is logged above and the message is still
                // deleted so one bad job cannot wedge the queue.
                if let Err(err) = queue.delete_message(&message.receipt_handle).await {
                    warn!(error = ?err, "failed to delete queue message");
                }
            }
            Ok(None) => {
                tokio::time::sleep(Duration::from_millis(IDLE_SLEEP_MS)).await;
            }
            Err(err) => {
                warn!(error = ?err, "queue receive failed, backing off");
                tokio::time::sleep(Duration::from_millis(ERROR_BACKOFF_MS)).await;
            }
        }
    }
}

/// The strike write and the review-queue write are independent; each
/// failure is logged and swallowed without affecting the other.
async fn apply_consequences(db: &Db, job: &ConsequenceJob) {
    let strikes = StrikeService::new(db.clone());
    match strikes
        .record_consequence(job.user_id, job.moderation_id, job.severity, job.final_action)
        .await
    {
        Ok(strike) => {
            info!(
                moderation_id = %job.moderation_id,
                user_id = %job.user_id,
                strike_count = strike.strike_count,
                "strike recorded"
            );
        }
        Err(err) => {
            error!(
                error = ?err,
                moderation_id = %job.moderation_id,
                user_id = %job.user_id,
                "failed to record strike"
            );
        }
    }

    if job.requires_manual_review {
        let review = ReviewService::new(db.clone());
        match review.enqueue(job.moderation_id, job.severity).await {
            Ok(entry) => {
                info!(
                    moderation_id = %job.moderation_id,
                    priority = entry.priority,
                    "queued for manual review"
                );
            }
            Err(err) => {
                error!(
                    error = ?err,
                    moderation_id = %job.moderation_id,
                    "failed to enqueue review entry"
                );
            }
        }
    }
}
