//! Decision-Level Walkthroughs
//!
//! Raw classifier completions through normalization, the threshold
//! policy, and consequence computation, mirroring what the API and
//! worker do around the database.

use aegis::app::normalizer::{self, PARSE_FAILURE_FLAG};
use aegis::app::policy;
use aegis::config::thresholds::ModerationThresholds;
use aegis::domain::record::content_hash;
use aegis::domain::review::priority_for;
use aegis::domain::strike::StrikeDirective;
use aegis::domain::verdict::{ContentCategory, ModerationAction, Severity};
use time::OffsetDateTime;

fn now() -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp(1_722_800_000).unwrap()
}

// ===========================================================================
// End-to-end scenarios
// ===========================================================================

#[test]
fn explicit_threat_is_removed_and_restricts_the_author() {
    let completion = r#"{
        "is_appropriate": false,
        "categories": ["violence_incitement"],
        "severity": "critical",
        "confidence": 0.95,
        "flags": ["direct threat of violence"],
        "detected_language": "en",
        "recommended_action": "content_removed"
    }"#;

    let verdict = normalizer::normalize(completion);
    assert_eq!(verdict.categories, vec![ContentCategory::ViolenceIncitement]);

    let decision = policy::evaluate(&verdict, &ModerationThresholds::default());
    assert_eq!(decision.final_action, ModerationAction::ContentRemoved);
    // No review entry for an auto-removed item.
    assert!(!decision.requires_manual_review);

    let directive = StrikeDirective::for_violation(verdict.severity, decision.final_action, now());
    assert_eq!(directive.strike_count, 3);
    assert!(directive.is_restricted);
    assert!(!directive.is_shadow_banned);
}

#[test]
fn borderline_medium_content_lands_in_the_review_queue() {
    let completion = r#"{
        "is_appropriate": false,
        "severity": "medium",
        "confidence": 0.55,
        "recommended_action": "warning"
    }"#;

    let verdict = normalizer::normalize(completion);
    let decision = policy::evaluate(&verdict, &ModerationThresholds::default());

    // 0.55 clears the manual-review gate even though the classifier
    // itself suggested a warning.
    assert_eq!(decision.final_action, ModerationAction::ManualReview);
    assert!(decision.requires_manual_review);
    assert_eq!(priority_for(verdict.severity), 5);

    let directive = StrikeDirective::for_violation(verdict.severity, decision.final_action, now());
    assert_eq!(directive.strike_count, 1);
    assert!(!directive.is_shadow_banned);
    assert!(!directive.is_restricted);
}

#[test]
fn high_severity_shadow_ban_sets_a_day_long_window() {
    let completion = r#"{
        "is_appropriate": false,
        "categories": ["safety_harassment"],
        "severity": "high",
        "confidence": 0.8,
        "recommended_action": "shadow_ban"
    }"#;

    let verdict = normalizer::normalize(completion);
    let decision = policy::evaluate(&verdict, &ModerationThresholds::default());
    assert_eq!(decision.final_action, ModerationAction::ShadowBan);

    let directive = StrikeDirective::for_violation(verdict.severity, decision.final_action, now());
    assert_eq!(directive.strike_count, 2);
    assert!(directive.is_shadow_banned);
    assert!(directive.shadow_ban_expires_at.is_some());
    assert!(!directive.is_restricted);
    assert!(directive.restriction_expires_at.is_none());
}

// ===========================================================================
// Fail-closed behavior
// ===========================================================================

#[test]
fn unparseable_completion_fails_closed_into_manual_review() {
    let verdict = normalizer::normalize("I'm unable to help with that request.");

    assert!(!verdict.is_appropriate);
    assert_eq!(verdict.recommended_action, ModerationAction::ManualReview);
    assert!(verdict.flags.iter().any(|flag| flag == PARSE_FAILURE_FLAG));

    // The default verdict (medium, 0.5) clears the review gate, so a
    // broken classifier can never silently approve content.
    let decision = policy::evaluate(&verdict, &ModerationThresholds::default());
    assert_eq!(decision.final_action, ModerationAction::ManualReview);
    assert!(decision.requires_manual_review);
}

#[test]
fn partial_payload_is_defaulted_field_by_field() {
    let verdict = normalizer::normalize(r#"{"severity": "high"}"#);

    assert!(!verdict.is_appropriate);
    assert_eq!(verdict.severity, Severity::High);
    assert_eq!(verdict.confidence, 0.5);
    assert!(verdict.categories.is_empty());
    assert!(verdict.flags.is_empty());
    assert_eq!(verdict.detected_language, "en");
    assert_eq!(verdict.recommended_action, ModerationAction::ManualReview);
}

#[test]
fn recommended_action_is_informational_only() {
    // The classifier may recommend approval, but the policy computes
    // the final action from the verdict's own signals.
    let completion = r#"{
        "is_appropriate": false,
        "severity": "critical",
        "confidence": 0.97,
        "recommended_action": "approved"
    }"#;

    let verdict = normalizer::normalize(completion);
    assert_eq!(verdict.recommended_action, ModerationAction::Approved);

    let decision = policy::evaluate(&verdict, &ModerationThresholds::default());
    assert_eq!(decision.final_action, ModerationAction::ContentRemoved);
}

// ===========================================================================
// Review priority and dedup hashing
// ===========================================================================

#[test]
fn high_severity_reviews_outrank_standard_ones() {
    assert!(priority_for(Severity::High) > priority_for(Severity::Medium));
    assert_eq!(priority_for(Severity::High), 8);
    assert_eq!(priority_for(Severity::Critical), 5);
}

#[test]
fn content_hash_is_stable_across_calls() {
    let content = "pay me 500 XP and I'll boost your campaign";
    assert_eq!(content_hash(content), content_hash(content));
    assert_ne!(content_hash(content), content_hash("different content"));
}
