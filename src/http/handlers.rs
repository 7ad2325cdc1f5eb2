use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::app::classifier::ClassifierError;
use crate::app::pipeline::{ModerationInput, ModerationPipeline, PipelineError};
use crate::app::records::RecordService;
use crate::app::review::{ResolveOutcome, ReviewService};
use crate::app::strikes::{AccountStanding, StrikeService};
use crate::domain::record::{ContentType, ModerationRecord};
use crate::domain::review::{ReviewQueueEntry, ReviewStatus};
use crate::domain::strike::UserStrike;
use crate::domain::verdict::{ContentCategory, ModerationAction, Severity};
use crate::http::{AppError, ServiceToken};
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Deserialize)]
pub struct PaginationQuery {
    pub limit: Option<i64>,
    pub cursor: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub next_cursor: Option<String>,
}

fn parse_cursor(cursor: Option<String>) -> Result<Option<(OffsetDateTime, Uuid)>, AppError> {
    let Some(cursor) = cursor else {
        return Ok(None);
    };

    let mut parts = cursor.splitn(2, '/');
    let timestamp = parts
        .next()
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;
    let id = parts
        .next()
        .ok_or_else(|| AppError::bad_request("invalid cursor"))?;

    let timestamp = OffsetDateTime::parse(timestamp, &Rfc3339)
        .map_err(|_| AppError::bad_request("invalid cursor"))?;
    let id = Uuid::parse_str(id).map_err(|_| AppError::bad_request("invalid cursor"))?;

    Ok(Some((timestamp, id)))
}

fn encode_cursor(cursor: Option<(OffsetDateTime, Uuid)>) -> Option<String> {
    let (timestamp, id) = cursor?;
    let timestamp = timestamp.format(&Rfc3339).ok()?;
    Some(format!("{}/{}", timestamp, id))
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = if state.db.ping().await.is_ok() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse { status })
}

#[derive(Deserialize)]
pub struct ModerateRequest {
    pub content: String,
    pub content_id: String,
    pub content_type: String,
    pub user_id: Uuid,
    #[serde(default)]
    pub media_urls: Vec<String>,
}

#[derive(Serialize)]
pub struct AnalysisSummary {
    pub is_appropriate: bool,
    pub severity: Severity,
    pub confidence: f64,
    pub action_taken: ModerationAction,
    pub categories: Vec<ContentCategory>,
    pub flags: Vec<String>,
}

#[derive(Serialize)]
pub struct ModerateResponse {
    pub success: bool,
    pub content_id: String,
    pub analysis: AnalysisSummary,
    pub moderation_id: Uuid,
}

pub async fn moderate_content(
    _service: ServiceToken,
    State(state): State<AppState>,
    Json(payload): Json<ModerateRequest>,
) -> Result<Json<ModerateResponse>, AppError> {
    if payload.content.trim().is_empty() {
        return Err(AppError::bad_request("content is required"));
    }
    if payload.content_id.trim().is_empty() {
        return Err(AppError::bad_request("content_id is required"));
    }
    if payload.content.len() > state.max_content_bytes {
        return Err(AppError::bad_request(format!(
            "content must be at most {} bytes",
            state.max_content_bytes
        )));
    }
    let Some(content_type) = ContentType::from_str(&payload.content_type) else {
        return Err(AppError::bad_request("unknown content_type"));
    };

    let content_id = payload.content_id.clone();
    let pipeline = ModerationPipeline::new(
        state.db.clone(),
        state.classifier.clone(),
        state.queue.clone(),
    );
    let record = pipeline
        .moderate(ModerationInput {
            content: payload.content,
            content_id: payload.content_id,
            content_type,
            user_id: payload.user_id,
            media_urls: payload.media_urls,
        })
        .await
        .map_err(|err| {
            tracing::error!(error = ?err, content_id = %content_id, "moderation pipeline failed");
            match err {
                PipelineError::Classifier(ClassifierError::Unavailable(_)) => {
                    AppError::service_unavailable("content classifier unavailable")
                }
                PipelineError::Classifier(ClassifierError::Status(status)) => {
                    AppError::bad_gateway(format!("content classifier returned status {}", status))
                }
                PipelineError::Persistence(_) => {
                    AppError::internal("failed to persist moderation record")
                }
            }
        })?;

    Ok(Json(ModerateResponse {
        success: true,
        content_id: record.content_id.clone(),
        analysis: AnalysisSummary {
            is_appropriate: record.verdict.is_appropriate,
            severity: record.verdict.severity,
            confidence: record.verdict.confidence,
            action_taken: record.action_taken,
            categories: record.verdict.categories.clone(),
            flags: record.verdict.flags.clone(),
        },
        moderation_id: record.id,
    }))
}

pub async fn get_moderation_record(
    _service: ServiceToken,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ModerationRecord>, AppError> {
    let service = RecordService::new(state.db.clone());
    let record = service.get(id).await.map_err(|err| {
        tracing::error!(error = ?err, moderation_id = %id, "failed to fetch moderation record");
        AppError::internal("failed to fetch moderation record")
    })?;

    match record {
        Some(record) => Ok(Json(record)),
        None => Err(AppError::not_found("moderation record not found")),
    }
}

pub async fn list_moderation_audit(
    _service: ServiceToken,
    State(state): State<AppState>,
    Query(query): Query<PaginationQuery>,
) -> Result<Json<ListResponse<ModerationRecord>>, AppError> {
    let limit = query.limit.unwrap_or(30);
    if !(1..=200).contains(&limit) {
        return Err(AppError::bad_request("limit must be between 1 and 200"));
    }
    let cursor = parse_cursor(query.cursor)?;

    let service = RecordService::new(state.db.clone());
    let mut records = service.list(cursor, limit + 1).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list moderation records");
        AppError::internal("failed to list moderation records")
    })?;

    let next_cursor = if records.len() > limit as usize {
        let last = records.pop().expect("checked len");
        Some((last.created_at, last.id))
    } else {
        None
    };

    Ok(Json(ListResponse {
        items: records,
        next_cursor: encode_cursor(next_cursor),
    }))
}

#[derive(Deserialize)]
pub struct ReviewQueueQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_review_queue(
    _service: ServiceToken,
    State(state): State<AppState>,
    Query(query): Query<ReviewQueueQuery>,
) -> Result<Json<Vec<ReviewQueueEntry>>, AppError> {
    let status = match query.status.as_deref() {
        None => ReviewStatus::Pending,
        Some(value) => ReviewStatus::from_str(value)
            .ok_or_else(|| AppError::bad_request("unknown review status"))?,
    };
    let limit = query.limit.unwrap_or(50);
    if !(1..=200).contains(&limit) {
        return Err(AppError::bad_request("limit must be between 1 and 200"));
    }

    let service = ReviewService::new(state.db.clone());
    let entries = service.list(status, limit).await.map_err(|err| {
        tracing::error!(error = ?err, "failed to list review queue");
        AppError::internal("failed to list review queue")
    })?;

    Ok(Json(entries))
}

#[derive(Deserialize)]
pub struct ResolveReviewRequest {
    pub notes: Option<String>,
}

pub async fn resolve_review_entry(
    _service: ServiceToken,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
    Json(payload): Json<ResolveReviewRequest>,
) -> Result<Json<ReviewQueueEntry>, AppError> {
    let service = ReviewService::new(state.db.clone());
    let outcome = service.resolve(id, payload.notes).await.map_err(|err| {
        tracing::error!(error = ?err, entry_id = %id, "failed to resolve review entry");
        AppError::internal("failed to resolve review entry")
    })?;

    match outcome {
        ResolveOutcome::Resolved(entry) => Ok(Json(entry)),
        ResolveOutcome::AlreadyResolved => Err(AppError::conflict("review entry already resolved")),
        ResolveOutcome::NotFound => Err(AppError::not_found("review entry not found")),
    }
}

pub async fn list_user_strikes(
    _service: ServiceToken,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<Vec<UserStrike>>, AppError> {
    let service = StrikeService::new(state.db.clone());
    let strikes = service.list_for_user(id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to list strikes");
        AppError::internal("failed to list strikes")
    })?;

    Ok(Json(strikes))
}

pub async fn get_user_standing(
    _service: ServiceToken,
    Path(id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<AccountStanding>, AppError> {
    let service = StrikeService::new(state.db.clone());
    let standing = service.standing(id).await.map_err(|err| {
        tracing::error!(error = ?err, user_id = %id, "failed to compute standing");
        AppError::internal("failed to compute standing")
    })?;

    Ok(Json(standing))
}
