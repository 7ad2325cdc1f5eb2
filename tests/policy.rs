//! Threshold Policy Properties
//!
//! The policy is a pure function of (verdict, thresholds), so these
//! tests sweep it directly without any backing services.

use aegis::app::policy::evaluate;
use aegis::config::thresholds::{ModerationThresholds, ThresholdGate};
use aegis::domain::verdict::{ModerationAction, ModerationVerdict, Severity};

const ALL_SEVERITIES: [Severity; 4] = [
    Severity::Low,
    Severity::Medium,
    Severity::High,
    Severity::Critical,
];

fn verdict(is_appropriate: bool, severity: Severity, confidence: f64) -> ModerationVerdict {
    ModerationVerdict {
        is_appropriate,
        categories: Vec::new(),
        severity,
        confidence,
        flags: Vec::new(),
        detected_language: "en".to_string(),
        recommended_action: ModerationAction::ManualReview,
    }
}

// ===========================================================================
// Rule 1: appropriate content short-circuits
// ===========================================================================

#[test]
fn appropriate_content_is_always_approved() {
    let thresholds = ModerationThresholds::default();
    for severity in ALL_SEVERITIES {
        for confidence in [0.0, 0.5, 0.95, 1.0] {
            let decision = evaluate(&verdict(true, severity, confidence), &thresholds);
            assert_eq!(
                decision.final_action,
                ModerationAction::Approved,
                "{:?} at {}",
                severity,
                confidence
            );
            assert!(!decision.requires_manual_review);
        }
    }
}

// ===========================================================================
// Rule 2: auto-removal
// ===========================================================================

#[test]
fn confident_critical_content_is_removed() {
    let thresholds = ModerationThresholds::default();
    for confidence in [0.9, 0.95, 1.0] {
        let decision = evaluate(&verdict(false, Severity::Critical, confidence), &thresholds);
        assert_eq!(decision.final_action, ModerationAction::ContentRemoved);
    }
}

#[test]
fn confident_high_severity_content_is_removed() {
    let decision = evaluate(
        &verdict(false, Severity::High, 0.92),
        &ModerationThresholds::default(),
    );
    assert_eq!(decision.final_action, ModerationAction::ContentRemoved);
}

#[test]
fn confident_medium_severity_content_is_not_removed() {
    let decision = evaluate(
        &verdict(false, Severity::Medium, 0.99),
        &ModerationThresholds::default(),
    );
    assert_eq!(decision.final_action, ModerationAction::ManualReview);
}

#[test]
fn severity_alone_never_bypasses_the_confidence_gate() {
    // Critical but only 0.6 confident: falls through removal and
    // shadow-ban to manual review.
    let decision = evaluate(
        &verdict(false, Severity::Critical, 0.6),
        &ModerationThresholds::default(),
    );
    assert_eq!(decision.final_action, ModerationAction::ManualReview);
    assert!(decision.requires_manual_review);
}

// ===========================================================================
// Rule 3: shadow ban
// ===========================================================================

#[test]
fn high_severity_between_gates_is_shadow_banned() {
    for confidence in [0.7, 0.75, 0.89] {
        let decision = evaluate(
            &verdict(false, Severity::High, confidence),
            &ModerationThresholds::default(),
        );
        assert_eq!(decision.final_action, ModerationAction::ShadowBan, "{}", confidence);
    }
}

#[test]
fn shadow_ban_matches_high_severity_exactly() {
    let thresholds = ModerationThresholds::default();
    for severity in [Severity::Low, Severity::Medium, Severity::Critical] {
        let decision = evaluate(&verdict(false, severity, 0.75), &thresholds);
        assert_eq!(
            decision.final_action,
            ModerationAction::ManualReview,
            "{:?}",
            severity
        );
    }
}

#[test]
fn removal_outranks_shadow_ban_when_both_gates_pass() {
    let decision = evaluate(
        &verdict(false, Severity::High, 0.95),
        &ModerationThresholds::default(),
    );
    assert_eq!(decision.final_action, ModerationAction::ContentRemoved);
}

// ===========================================================================
// Rules 4 and 5: manual review and warning
// ===========================================================================

#[test]
fn mid_confidence_verdicts_go_to_manual_review() {
    let decision = evaluate(
        &verdict(false, Severity::Low, 0.5),
        &ModerationThresholds::default(),
    );
    assert_eq!(decision.final_action, ModerationAction::ManualReview);
    assert!(decision.requires_manual_review);
}

#[test]
fn sub_review_confidence_never_escalates() {
    let thresholds = ModerationThresholds::default();
    for severity in ALL_SEVERITIES {
        for confidence in [0.0, 0.25, 0.49] {
            let decision = evaluate(&verdict(false, severity, confidence), &thresholds);
            assert_eq!(
                decision.final_action,
                ModerationAction::Warning,
                "{:?} at {}",
                severity,
                confidence
            );
            assert!(!decision.requires_manual_review);
        }
    }
}

// ===========================================================================
// Injected thresholds
// ===========================================================================

#[test]
fn custom_thresholds_move_the_gates() {
    let thresholds = ModerationThresholds {
        auto_remove: ThresholdGate {
            confidence: 0.6,
            severity: Severity::Medium,
        },
        shadow_ban: ThresholdGate {
            confidence: 0.4,
            severity: Severity::Medium,
        },
        manual_review_confidence: 0.2,
    };

    let decision = evaluate(&verdict(false, Severity::Medium, 0.65), &thresholds);
    assert_eq!(decision.final_action, ModerationAction::ContentRemoved);

    let decision = evaluate(&verdict(false, Severity::Medium, 0.45), &thresholds);
    assert_eq!(decision.final_action, ModerationAction::ShadowBan);

    let decision = evaluate(&verdict(false, Severity::Low, 0.3), &thresholds);
    assert_eq!(decision.final_action, ModerationAction::ManualReview);

    let decision = evaluate(&verdict(false, Severity::Low, 0.1), &thresholds);
    assert_eq!(decision.final_action, ModerationAction::Warning);
}
