use anyhow::Result;
use sqlx::Row;
use tracing::warn;

use crate::config::thresholds::ModerationThresholds;
use crate::domain::verdict::{ModerationAction, ModerationVerdict, Severity};
use crate::infra::db::Db;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PolicyDecision {
    pub final_action: ModerationAction,
    pub requires_manual_review: bool,
}

/// Map a sanitized verdict to the final action.
///
/// This is a priority-ordered rule list, not a scoring function: rules
/// are checked in order and the first match wins, so when both the
/// removal and shadow-ban gates pass, the stronger intervention is
/// taken. Severity alone never bypasses a confidence gate.
pub fn evaluate(verdict: &ModerationVerdict, thresholds: &ModerationThresholds) -> PolicyDecision {
    if verdict.is_appropriate {
        return PolicyDecision {
            final_action: ModerationAction::Approved,
            requires_manual_review: false,
        };
    }

    if verdict.confidence >= thresholds.auto_remove.confidence
        && verdict.severity >= thresholds.auto_remove.severity
    {
        return PolicyDecision {
            final_action: ModerationAction::ContentRemoved,
            requires_manual_review: false,
        };
    }

    if verdict.confidence >= thresholds.shadow_ban.confidence
        && verdict.severity == thresholds.shadow_ban.severity
    {
        return PolicyDecision {
            final_action: ModerationAction::ShadowBan,
            requires_manual_review: false,
        };
    }

    if verdict.confidence >= thresholds.manual_review_confidence {
        return PolicyDecision {
            final_action: ModerationAction::ManualReview,
            requires_manual_review: true,
        };
    }

    PolicyDecision {
        final_action: ModerationAction::Warning,
        requires_manual_review: false,
    }
}

/// Loads the active thresholds from the settings table. Missing rows or
/// a failed read fall back to the hard-coded defaults; the pipeline is
/// never blocked on configuration.
#[derive(Clone)]
pub struct ThresholdStore {
    db: Db,
}

impl ThresholdStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn load(&self) -> ModerationThresholds {
        match self.fetch().await {
            Ok(thresholds) => thresholds,
            Err(err) => {
                warn!(error = ?err, "failed to load moderation settings, using defaults");
                ModerationThresholds::default()
            }
        }
    }

    async fn fetch(&self) -> Result<ModerationThresholds> {
        let rows = sqlx::query(
            "SELECT setting_key, confidence, min_severity FROM moderation_settings",
        )
        .fetch_all(self.db.pool())
        .await?;

        let mut thresholds = ModerationThresholds::default();
        for row in rows {
            let key: String = row.get("setting_key");
            let confidence: f64 = row.get("confidence");
            let severity = row
                .get::<Option<String>, _>("min_severity")
                .as_deref()
                .and_then(Severity::from_str);

            match key.as_str() {
                "auto_remove" => {
                    thresholds.auto_remove.confidence = confidence;
                    if let Some(severity) = severity {
                        thresholds.auto_remove.severity = severity;
                    }
                }
                "shadow_ban" => {
                    thresholds.shadow_ban.confidence = confidence;
                    if let Some(severity) = severity {
                        thresholds.shadow_ban.severity = severity;
                    }
                }
                "manual_review" => {
                    thresholds.manual_review_confidence = confidence;
                }
                other => {
                    warn!(setting_key = other, "unknown moderation setting, ignoring");
                }
            }
        }

        Ok(thresholds)
    }
}
