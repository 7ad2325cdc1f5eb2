use anyhow::Result;
use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::Row;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::strike::{StrikeDirective, UserStrike};
use crate::domain::verdict::{ModerationAction, Severity};
use crate::infra::db::Db;

const STRIKE_COLUMNS: &str =
    "id, user_id, moderation_id, strike_count, strike_severity, strike_expires_at, \
     is_shadow_banned, shadow_ban_expires_at, is_restricted, restriction_expires_at, created_at";

/// Aggregate view of a user's live consequences.
#[derive(Debug, Clone, Serialize)]
pub struct AccountStanding {
    pub user_id: Uuid,
    pub active_strike_total: i64,
    pub lifetime_strike_rows: i64,
    pub is_shadow_banned: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub shadow_ban_expires_at: Option<OffsetDateTime>,
    pub is_restricted: bool,
    #[serde(with = "time::serde::rfc3339::option")]
    pub restriction_expires_at: Option<OffsetDateTime>,
}

/// Append-only ledger of escalation events. Failure here must never
/// roll back a moderation decision; callers log and move on.
#[derive(Clone)]
pub struct StrikeService {
    db: Db,
}

impl StrikeService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn record_consequence(
        &self,
        user_id: Uuid,
        moderation_id: Uuid,
        severity: Severity,
        final_action: ModerationAction,
    ) -> Result<UserStrike> {
        let now = OffsetDateTime::now_utc();
        let directive = StrikeDirective::for_violation(severity, final_action, now);

        let row = sqlx::query(&format!(
            "INSERT INTO user_strikes \
             (user_id, moderation_id, strike_count, strike_severity, strike_expires_at, \
              is_shadow_banned, shadow_ban_expires_at, is_restricted, restriction_expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {}",
            STRIKE_COLUMNS
        ))
        .bind(user_id)
        .bind(moderation_id)
        .bind(directive.strike_count)
        .bind(severity.as_str())
        .bind(directive.strike_expires_at)
        .bind(directive.is_shadow_banned)
        .bind(directive.shadow_ban_expires_at)
        .bind(directive.is_restricted)
        .bind(directive.restriction_expires_at)
        .fetch_one(self.db.pool())
        .await?;

        Ok(row_to_strike(row))
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<UserStrike>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM user_strikes WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            STRIKE_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.into_iter().map(row_to_strike).collect())
    }

    /// Current standing: unexpired strike weight plus any live
    /// shadow-ban or restriction window.
    pub async fn standing(&self, user_id: Uuid) -> Result<AccountStanding> {
        let row = sqlx::query(
            "SELECT \
               COALESCE(SUM(strike_count) FILTER (WHERE strike_expires_at > NOW()), 0)::bigint \
                 AS active_strike_total, \
               COUNT(*) AS lifetime_strike_rows, \
               MAX(shadow_ban_expires_at) \
                 FILTER (WHERE is_shadow_banned AND shadow_ban_expires_at > NOW()) \
                 AS shadow_ban_expires_at, \
               MAX(restriction_expires_at) \
                 FILTER (WHERE is_restricted AND restriction_expires_at > NOW()) \
                 AS restriction_expires_at \
             FROM user_strikes WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(self.db.pool())
        .await?;

        let shadow_ban_expires_at: Option<OffsetDateTime> = row.get("shadow_ban_expires_at");
        let restriction_expires_at: Option<OffsetDateTime> = row.get("restriction_expires_at");

        Ok(AccountStanding {
            user_id,
            active_strike_total: row.get("active_strike_total"),
            lifetime_strike_rows: row.get("lifetime_strike_rows"),
            is_shadow_banned: shadow_ban_expires_at.is_some(),
            shadow_ban_expires_at,
            is_restricted: restriction_expires_at.is_some(),
            restriction_expires_at,
        })
    }
}

fn row_to_strike(row: PgRow) -> UserStrike {
    let severity: String = row.get("strike_severity");

    UserStrike {
        id: row.get("id"),
        user_id: row.get("user_id"),
        moderation_id: row.get("moderation_id"),
        strike_count: row.get("strike_count"),
        strike_severity: Severity::from_str(&severity).unwrap_or(Severity::Medium),
        strike_expires_at: row.get("strike_expires_at"),
        is_shadow_banned: row.get("is_shadow_banned"),
        shadow_ban_expires_at: row.get("shadow_ban_expires_at"),
        is_restricted: row.get("is_restricted"),
        restriction_expires_at: row.get("restriction_expires_at"),
        created_at: row.get("created_at"),
    }
}
