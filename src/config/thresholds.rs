use crate::domain::verdict::Severity;

pub const DEFAULT_AUTO_REMOVE_CONFIDENCE: f64 = 0.9;
pub const DEFAULT_SHADOW_BAN_CONFIDENCE: f64 = 0.7;
pub const DEFAULT_MANUAL_REVIEW_CONFIDENCE: f64 = 0.5;

/// A confidence floor paired with the severity it applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdGate {
    pub confidence: f64,
    pub severity: Severity,
}

/// Thresholds the policy engine evaluates against. Read-only per
/// evaluation and passed in explicitly so the policy stays a pure
/// function of its inputs.
///
/// `auto_remove.severity` is a floor (high also admits critical);
/// `shadow_ban.severity` is an exact match.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModerationThresholds {
    pub auto_remove: ThresholdGate,
    pub shadow_ban: ThresholdGate,
    pub manual_review_confidence: f64,
}

impl Default for ModerationThresholds {
    fn default() -> Self {
        Self {
            auto_remove: ThresholdGate {
                confidence: DEFAULT_AUTO_REMOVE_CONFIDENCE,
                severity: Severity::High,
            },
            shadow_ban: ThresholdGate {
                confidence: DEFAULT_SHADOW_BAN_CONFIDENCE,
                severity: Severity::High,
            },
            manual_review_confidence: DEFAULT_MANUAL_REVIEW_CONFIDENCE,
        }
    }
}
