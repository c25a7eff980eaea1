//! Content handlers: subtitle timing for short-form video scripts.

use axum::{response::Json, routing::post, Router};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use common::{ApiResponse, AppError, AppResult};
use domain::subtitles::{build_cues, render_srt, render_vtt, TimingOptions};
use domain::{SubtitleCue, SubtitleFormat};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Subtitle generation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleRequest {
    /// Narration script
    #[validate(length(min = 1, message = "Script is empty"))]
    #[schema(example = "Meet the new collection. Every piece is unique!")]
    pub script: String,
    /// Total video duration in seconds
    #[schema(example = 12.5)]
    pub duration_seconds: f64,
    /// Output format (default `srt`)
    #[serde(default)]
    pub format: SubtitleFormat,
}

/// Timed cues plus the rendered subtitle file
#[derive(Debug, Serialize, ToSchema)]
pub struct SubtitleResponse {
    pub format: SubtitleFormat,
    pub cues: Vec<SubtitleCue>,
    /// Rendered SRT or WebVTT text; absent for `json`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

/// Create content routes
pub fn content_routes() -> Router<AppState> {
    Router::new().route("/subtitles", post(generate_subtitles))
}

/// Time a script into subtitle cues
#[utoipa::path(
    post,
    path = "/api/content/subtitles",
    tag = "Content",
    request_body = SubtitleRequest,
    responses(
        (status = 200, description = "Subtitle cues", body = SubtitleResponse),
        (status = 400, description = "Empty script or non-positive duration")
    )
)]
pub async fn generate_subtitles(
    ValidatedJson(req): ValidatedJson<SubtitleRequest>,
) -> AppResult<Json<ApiResponse<SubtitleResponse>>> {
    if !req.duration_seconds.is_finite() || req.duration_seconds <= 0.0 {
        return Err(AppError::validation("Duration must be positive"));
    }
    let duration_ms = (req.duration_seconds * 1000.0).round() as u64;

    let cues = build_cues(&req.script, duration_ms, TimingOptions::default())?;
    let content = match req.format {
        SubtitleFormat::Srt => Some(render_srt(&cues)),
        SubtitleFormat::Vtt => Some(render_vtt(&cues)),
        SubtitleFormat::Json => None,
    };

    Ok(Json(ApiResponse::success(SubtitleResponse {
        format: req.format,
        cues,
        content,
    })))
}
