use serde::{Deserialize, Serialize};

/// Policy-violation magnitude reported by the classifier.
///
/// Ordering matters: threshold gates compare severities, so the derive
/// order must stay low < medium < high < critical.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Severity::Low),
            "medium" => Some(Severity::Medium),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

/// Enforcement action, both as recommended by the classifier and as
/// decided by the policy engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ModerationAction {
    Approved,
    Warning,
    ShadowBan,
    ContentRemoved,
    ManualReview,
}

impl ModerationAction {
    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "approved" => Some(ModerationAction::Approved),
            "warning" => Some(ModerationAction::Warning),
            "shadow_ban" => Some(ModerationAction::ShadowBan),
            "content_removed" => Some(ModerationAction::ContentRemoved),
            "manual_review" => Some(ModerationAction::ManualReview),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModerationAction::Approved => "approved",
            ModerationAction::Warning => "warning",
            ModerationAction::ShadowBan => "shadow_ban",
            ModerationAction::ContentRemoved => "content_removed",
            ModerationAction::ManualReview => "manual_review",
        }
    }
}

/// Fixed vocabulary of violation categories the classifier may report.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ContentCategory {
    ViolenceIncitement,
    SafetyHarassment,
    NuditySexual,
    HateSpeech,
    AuthenticitySpam,
    PrivacyDoxxing,
    IntellectualProperty,
    RegulatedGoods,
    CommunityStandards,
    Misinformation,
}

impl ContentCategory {
    pub const ALL: [ContentCategory; 10] = [
        ContentCategory::ViolenceIncitement,
        ContentCategory::SafetyHarassment,
        ContentCategory::NuditySexual,
        ContentCategory::HateSpeech,
        ContentCategory::AuthenticitySpam,
        ContentCategory::PrivacyDoxxing,
        ContentCategory::IntellectualProperty,
        ContentCategory::RegulatedGoods,
        ContentCategory::CommunityStandards,
        ContentCategory::Misinformation,
    ];

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "violence_incitement" => Some(ContentCategory::ViolenceIncitement),
            "safety_harassment" => Some(ContentCategory::SafetyHarassment),
            "nudity_sexual" => Some(ContentCategory::NuditySexual),
            "hate_speech" => Some(ContentCategory::HateSpeech),
            "authenticity_spam" => Some(ContentCategory::AuthenticitySpam),
            "privacy_doxxing" => Some(ContentCategory::PrivacyDoxxing),
            "intellectual_property" => Some(ContentCategory::IntellectualProperty),
            "regulated_goods" => Some(ContentCategory::RegulatedGoods),
            "community_standards" => Some(ContentCategory::CommunityStandards),
            "misinformation" => Some(ContentCategory::Misinformation),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContentCategory::ViolenceIncitement => "violence_incitement",
            ContentCategory::SafetyHarassment => "safety_harassment",
            ContentCategory::NuditySexual => "nudity_sexual",
            ContentCategory::HateSpeech => "hate_speech",
            ContentCategory::AuthenticitySpam => "authenticity_spam",
            ContentCategory::PrivacyDoxxing => "privacy_doxxing",
            ContentCategory::IntellectualProperty => "intellectual_property",
            ContentCategory::RegulatedGoods => "regulated_goods",
            ContentCategory::CommunityStandards => "community_standards",
            ContentCategory::Misinformation => "misinformation",
        }
    }
}

/// The classifier's structured judgment about one piece of content.
///
/// Always fully populated once it leaves the normalizer; downstream logic
/// never sees a partial verdict.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationVerdict {
    pub is_appropriate: bool,
    pub categories: Vec<ContentCategory>,
    pub severity: Severity,
    pub confidence: f64,
    pub flags: Vec<String>,
    pub detected_language: String,
    pub recommended_action: ModerationAction,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::Medium < Severity::High);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn severity_round_trips_through_str() {
        for severity in [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ] {
            assert_eq!(Severity::from_str(severity.as_str()), Some(severity));
        }
        assert_eq!(Severity::from_str("catastrophic"), None);
    }

    #[test]
    fn action_round_trips_through_str() {
        for action in [
            ModerationAction::Approved,
            ModerationAction::Warning,
            ModerationAction::ShadowBan,
            ModerationAction::ContentRemoved,
            ModerationAction::ManualReview,
        ] {
            assert_eq!(ModerationAction::from_str(action.as_str()), Some(action));
        }
        assert_eq!(ModerationAction::from_str("banhammer"), None);
    }

    #[test]
    fn every_category_parses_from_its_wire_name() {
        for category in ContentCategory::ALL {
            assert_eq!(ContentCategory::from_str(category.as_str()), Some(category));
        }
        assert_eq!(ContentCategory::from_str("rudeness"), None);
    }
}
