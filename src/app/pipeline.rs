use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::app::classifier::{Classifier, ClassifierError};
use crate::app::normalizer;
use crate::app::policy::{self, ThresholdStore};
use crate::app::records::{NewRecord, RecordService};
use crate::domain::record::{content_hash, ContentType, ModerationRecord};
use crate::domain::verdict::ModerationAction;
use crate::infra::db::Db;
use crate::infra::queue::QueueClient;
use crate::jobs::consequence_processor::ConsequenceJob;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Classifier(#[from] ClassifierError),
    /// The moderation record itself could not be written. This must
    /// surface to the caller: the content is unmoderated and has to be
    /// treated as pending review.
    #[error("failed to persist moderation record")]
    Persistence(#[from] anyhow::Error),
}

pub struct ModerationInput {
    pub content: String,
    pub content_id: String,
    pub content_type: ContentType,
    pub user_id: Uuid,
    pub media_urls: Vec<String>,
}

/// The moderation decision procedure: classify, normalize, persist,
/// apply policy, then hand consequences to the queue.
pub struct ModerationPipeline {
    db: Db,
    classifier: Arc<dyn Classifier>,
    queue: QueueClient,
}

impl ModerationPipeline {
    pub fn new(db: Db, classifier: Arc<dyn Classifier>, queue: QueueClient) -> Self {
        Self {
            db,
            classifier,
            queue,
        }
    }

    pub async fn moderate(&self, input: ModerationInput) -> Result<ModerationRecord, PipelineError> {
        let raw = self
            .classifier
            .classify(&input.content, input.content_type, &input.media_urls)
            .await?;
        let verdict = normalizer::normalize(&raw);
        let hash = content_hash(&input.content);

        let records = RecordService::new(self.db.clone());
        let (moderation_id, created_at) = records
            .insert_pending(
                &NewRecord {
                    content_id: &input.content_id,
                    content_type: input.content_type,
                    user_id: input.user_id,
                    original_content: &input.content,
                    content_hash: &hash,
                    media_urls: &input.media_urls,
                },
                &verdict,
            )
            .await?;

        let thresholds = ThresholdStore::new(self.db.clone()).load().await;
        let decision = policy::evaluate(&verdict, &thresholds);
        records.finalize(moderation_id, decision).await?;

        info!(
            moderation_id = %moderation_id,
            content_id = %input.content_id,
            action = decision.final_action.as_str(),
            severity = verdict.severity.as_str(),
            confidence = verdict.confidence,
            "moderation decision recorded"
        );

        // Consequences are best-effort: the record above is the source
        // of truth, so an enqueue failure is logged and dropped rather
        // than failing the request.
        if decision.final_action != ModerationAction::Approved {
            let job = ConsequenceJob {
                moderation_id,
                user_id: input.user_id,
                severity: verdict.severity,
                final_action: decision.final_action,
                requires_manual_review: decision.requires_manual_review,
            };
            if let Err(err) = self.queue.enqueue_consequence(&job).await {
                warn!(
                    error = ?err,
                    moderation_id = %moderation_id,
                    "failed to enqueue consequence job, dropping"
                );
            }
        }

        Ok(ModerationRecord {
            id: moderation_id,
            content_id: input.content_id,
            content_type: input.content_type,
            user_id: input.user_id,
            verdict,
            action_taken: decision.final_action,
            auto_actioned: true,
            requires_manual_review: decision.requires_manual_review,
            original_content: input.content,
            content_hash: hash,
            media_urls: input.media_urls,
            created_at,
        })
    }
}
