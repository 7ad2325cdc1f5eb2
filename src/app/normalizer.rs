use serde_json::Value;
use tracing::warn;

use crate::domain::verdict::{ContentCategory, ModerationAction, ModerationVerdict, Severity};

pub const PARSE_FAILURE_FLAG: &str = "classifier response was not parseable; failing closed";

const DEFAULT_LANGUAGE: &str = "en";
const DEFAULT_CONFIDENCE: f64 = 0.5;
const DEFAULT_SEVERITY: Severity = Severity::Medium;

/// Shape a raw classifier completion into a fully-populated verdict.
///
/// Parse failures never propagate: a classifier that fails to respond
/// sensibly must not silently default to "approved", so the fallback
/// verdict routes the content to manual review.
pub fn normalize(raw: &str) -> ModerationVerdict {
    let fields = extract_json(raw).and_then(|json| serde_json::from_str::<Value>(json).ok());

    match fields {
        Some(Value::Object(fields)) => ModerationVerdict {
            is_appropriate: fields
                .get("is_appropriate")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            categories: parse_categories(fields.get("categories")),
            severity: fields
                .get("severity")
                .and_then(Value::as_str)
                .and_then(Severity::from_str)
                .unwrap_or(DEFAULT_SEVERITY),
            confidence: fields
                .get("confidence")
                .and_then(Value::as_f64)
                .map(|confidence| confidence.clamp(0.0, 1.0))
                .unwrap_or(DEFAULT_CONFIDENCE),
            flags: parse_strings(fields.get("flags")),
            detected_language: fields
                .get("detected_language")
                .and_then(Value::as_str)
                .filter(|language| !language.trim().is_empty())
                .unwrap_or(DEFAULT_LANGUAGE)
                .to_string(),
            recommended_action: fields
                .get("recommended_action")
                .and_then(Value::as_str)
                .and_then(ModerationAction::from_str)
                .unwrap_or(ModerationAction::ManualReview),
        },
        _ => {
            warn!(bytes = raw.len(), "unparseable classifier response");
            fail_closed()
        }
    }
}

/// Conservative default used when the payload cannot be interpreted at
/// all: not appropriate, medium severity, routed to manual review.
pub fn fail_closed() -> ModerationVerdict {
    ModerationVerdict {
        is_appropriate: false,
        categories: Vec::new(),
        severity: DEFAULT_SEVERITY,
        confidence: DEFAULT_CONFIDENCE,
        flags: vec![PARSE_FAILURE_FLAG.to_string()],
        detected_language: DEFAULT_LANGUAGE.to_string(),
        recommended_action: ModerationAction::ManualReview,
    }
}

/// Slice out the outermost JSON object. Models occasionally wrap the
/// object in prose or markdown fences despite instructions.
fn extract_json(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&raw[start..=end])
}

fn parse_categories(value: Option<&Value>) -> Vec<ContentCategory> {
    let mut categories: Vec<ContentCategory> = value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .filter_map(ContentCategory::from_str)
                .collect()
        })
        .unwrap_or_default();

    // Category sets are sets; keep first occurrence order.
    let mut seen = Vec::with_capacity(categories.len());
    categories.retain(|category| {
        if seen.contains(category) {
            false
        } else {
            seen.push(*category);
            true
        }
    });
    categories
}

fn parse_strings(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|entries| {
            entries
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_json_from_fenced_completion() {
        let raw = "```json\n{\"is_appropriate\": true}\n```";
        let verdict = normalize(raw);
        assert!(verdict.is_appropriate);
        assert!(verdict.flags.is_empty());
    }

    #[test]
    fn garbage_fails_closed() {
        let verdict = normalize("I could not process this request.");
        assert!(!verdict.is_appropriate);
        assert_eq!(verdict.recommended_action, ModerationAction::ManualReview);
        assert_eq!(verdict.severity, Severity::Medium);
        assert_eq!(verdict.confidence, 0.5);
        assert_eq!(verdict.flags, vec![PARSE_FAILURE_FLAG.to_string()]);
    }

    #[test]
    fn unknown_categories_are_dropped_and_duplicates_collapsed() {
        let raw = r#"{"categories": ["hate_speech", "sarcasm", "hate_speech", "misinformation"]}"#;
        let verdict = normalize(raw);
        assert_eq!(
            verdict.categories,
            vec![ContentCategory::HateSpeech, ContentCategory::Misinformation]
        );
    }

    #[test]
    fn confidence_is_clamped_to_unit_interval() {
        let verdict = normalize(r#"{"confidence": 3.5}"#);
        assert_eq!(verdict.confidence, 1.0);
        let verdict = normalize(r#"{"confidence": -0.2}"#);
        assert_eq!(verdict.confidence, 0.0);
    }

    #[test]
    fn wrong_types_fall_back_field_by_field() {
        let raw = r#"{"is_appropriate": "yes", "severity": 4, "confidence": "high", "flags": "spam", "detected_language": "", "recommended_action": "obliterate"}"#;
        let verdict = normalize(raw);
        assert!(!verdict.is_appropriate);
        assert_eq!(verdict.severity, Severity::Medium);
        assert_eq!(verdict.confidence, 0.5);
        assert!(verdict.flags.is_empty());
        assert_eq!(verdict.detected_language, "en");
        assert_eq!(verdict.recommended_action, ModerationAction::ManualReview);
    }
}
