use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::domain::verdict::{ModerationAction, Severity};

const STRIKE_TTL_DAYS: i64 = 30;
const SHADOW_BAN_TTL_HOURS: i64 = 24;
const RESTRICTION_TTL_DAYS: i64 = 7;

/// One escalation event recorded against a user account. Append-only:
/// a new violation always writes a new row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserStrike {
    pub id: Uuid,
    pub user_id: Uuid,
    pub moderation_id: Uuid,
    pub strike_count: i32,
    pub strike_severity: Severity,
    #[serde(with = "time::serde::rfc3339")]
    pub strike_expires_at: OffsetDateTime,
    pub is_shadow_banned: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub shadow_ban_expires_at: Option<OffsetDateTime>,
    pub is_restricted: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub restriction_expires_at: Option<OffsetDateTime>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// What a single violation should write to the strike ledger.
///
/// A shadow-ban window and a restriction window are mutually exclusive
/// outcomes of one evaluation; at most one of the pairs is set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrikeDirective {
    pub strike_count: i32,
    pub strike_expires_at: OffsetDateTime,
    pub is_shadow_banned: bool,
    pub shadow_ban_expires_at: Option<OffsetDateTime>,
    pub is_restricted: bool,
    pub restriction_expires_at: Option<OffsetDateTime>,
}

impl StrikeDirective {
    /// Compute the consequence for a violation. Only called for final
    /// actions other than `approved`.
    pub fn for_violation(
        severity: Severity,
        final_action: ModerationAction,
        now: OffsetDateTime,
    ) -> Self {
        let strike_count = match severity {
            Severity::Critical => 3,
            Severity::High => 2,
            Severity::Low | Severity::Medium => 1,
        };

        let mut directive = StrikeDirective {
            strike_count,
            strike_expires_at: now + Duration::days(STRIKE_TTL_DAYS),
            is_shadow_banned: false,
            shadow_ban_expires_at: None,
            is_restricted: false,
            restriction_expires_at: None,
        };

        match final_action {
            ModerationAction::ShadowBan => {
                directive.is_shadow_banned = true;
                directive.shadow_ban_expires_at = Some(now + Duration::hours(SHADOW_BAN_TTL_HOURS));
            }
            ModerationAction::ContentRemoved if severity == Severity::Critical => {
                directive.is_restricted = true;
                directive.restriction_expires_at = Some(now + Duration::days(RESTRICTION_TTL_DAYS));
            }
            _ => {}
        }

        directive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    #[test]
    fn strike_count_scales_with_severity() {
        let now = at();
        for (severity, expected) in [
            (Severity::Low, 1),
            (Severity::Medium, 1),
            (Severity::High, 2),
            (Severity::Critical, 3),
        ] {
            let directive =
                StrikeDirective::for_violation(severity, ModerationAction::Warning, now);
            assert_eq!(directive.strike_count, expected, "{:?}", severity);
        }
    }

    #[test]
    fn strikes_expire_after_thirty_days() {
        let now = at();
        let directive =
            StrikeDirective::for_violation(Severity::Medium, ModerationAction::Warning, now);
        assert_eq!(directive.strike_expires_at, now + Duration::days(30));
    }

    #[test]
    fn shadow_ban_sets_only_the_shadow_ban_window() {
        let now = at();
        let directive =
            StrikeDirective::for_violation(Severity::High, ModerationAction::ShadowBan, now);
        assert!(directive.is_shadow_banned);
        assert_eq!(directive.shadow_ban_expires_at, Some(now + Duration::hours(24)));
        assert!(!directive.is_restricted);
        assert_eq!(directive.restriction_expires_at, None);
    }

    #[test]
    fn critical_removal_sets_only_the_restriction_window() {
        let now = at();
        let directive = StrikeDirective::for_violation(
            Severity::Critical,
            ModerationAction::ContentRemoved,
            now,
        );
        assert!(directive.is_restricted);
        assert_eq!(directive.restriction_expires_at, Some(now + Duration::days(7)));
        assert!(!directive.is_shadow_banned);
        assert_eq!(directive.shadow_ban_expires_at, None);
    }

    #[test]
    fn non_critical_removal_sets_no_window() {
        let now = at();
        let directive = StrikeDirective::for_violation(
            Severity::High,
            ModerationAction::ContentRemoved,
            now,
        );
        assert_eq!(directive.strike_count, 2);
        assert!(!directive.is_shadow_banned);
        assert!(!directive.is_restricted);
        assert_eq!(directive.shadow_ban_expires_at, None);
        assert_eq!(directive.restriction_expires_at, None);
    }

    #[test]
    fn warning_records_the_strike_alone() {
        let now = at();
        let directive =
            StrikeDirective::for_violation(Severity::Low, ModerationAction::Warning, now);
        assert_eq!(directive.strike_count, 1);
        assert!(!directive.is_shadow_banned);
        assert!(!directive.is_restricted);
    }
}
