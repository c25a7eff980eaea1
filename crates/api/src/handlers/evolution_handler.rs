//! Evolution handlers.

use axum::{
    extract::{multipart::MultipartRejection, DefaultBodyLimit, Multipart, Path, State},
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use common::pagination::{DEFAULT_PAGE_NUMBER, DEFAULT_PAGE_SIZE};
use common::{
    ApiResponse, AppError, AppResult, Created, NoContent, Paginated, PaginationParams,
};
use domain::{EvolutionSession, Favorite, GalleryItem, GeneratedImage, UploadedImage, MAX_UPLOAD_BYTES};
use evolution_service_lib::{GalleryQuery, NewGeneration, NewSession, ReferenceUpload};

use crate::extractors::{CurrentUser, ValidatedJson, ValidatedQuery};
use crate::state::AppState;

/// Multipart field carrying the reference image
const FILE_FIELD: &str = "file";

/// Request body limit for reference uploads, leaving room for multipart framing
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

/// Start session request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StartSessionRequest {
    #[validate(length(min = 1, max = 2000, message = "basePrompt must be 1-2000 characters"))]
    #[schema(example = "a lighthouse at dusk, oil painting")]
    pub base_prompt: String,
    #[schema(example = "impressionist")]
    pub style: Option<String>,
}

/// Record generation request
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordGenerationRequest {
    #[validate(length(min = 1, max = 2000, message = "prompt must be 1-2000 characters"))]
    pub prompt: String,
    #[validate(length(min = 1, message = "imageUrl is required"))]
    #[schema(example = "https://cdn.example.com/images/abc.png")]
    pub image_url: String,
    pub parent_image_id: Option<String>,
}

/// Gallery filters and paging
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GalleryParams {
    /// Page number (default 1)
    pub page: Option<u64>,
    /// Items per page (default 20, max 100)
    pub per_page: Option<u64>,
    pub style: Option<String>,
    pub session_id: Option<String>,
    /// Only favorited images
    pub favorites_only: Option<bool>,
}

/// Create evolution routes
pub fn evolution_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(start_session).get(list_sessions))
        .route("/sessions/:id", get(get_session))
        .route("/sessions/:id/generations", post(record_generation))
        .route("/sessions/:id/complete", post(complete_session))
        .route(
            "/sessions/:id/references",
            post(upload_reference).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/sessions/:id/references/:upload_id", delete(delete_reference))
        .route("/gallery", get(gallery))
        .route("/favorites", get(list_favorites))
        .route("/favorites/:image_id", put(add_favorite).delete(remove_favorite))
}

/// Start an evolution session
#[utoipa::path(
    post,
    path = "/api/evolution/sessions",
    tag = "Evolution",
    security(("user_id" = [])),
    request_body = StartSessionRequest,
    responses(
        (status = 201, description = "Session started", body = EvolutionSession),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Missing X-User-Id")
    )
)]
pub async fn start_session(
    user: CurrentUser,
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<StartSessionRequest>,
) -> AppResult<Created<EvolutionSession>> {
    let session = state
        .evolution
        .start_session(
            &user.id,
            NewSession {
                base_prompt: req.base_prompt,
                style: req.style,
            },
        )
        .await?;
    Ok(Created(session))
}

/// List own sessions, newest first
#[utoipa::path(
    get,
    path = "/api/evolution/sessions",
    tag = "Evolution",
    security(("user_id" = [])),
    responses(
        (status = 200, description = "Sessions", body = Vec<EvolutionSession>),
        (status = 401, description = "Missing X-User-Id")
    )
)]
pub async fn list_sessions(
    user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<EvolutionSession>>>> {
    let sessions = state.evolution.list_sessions(&user.id).await?;
    Ok(Json(ApiResponse::success(sessions)))
}

/// Get an own session
#[utoipa::path(
    get,
    path = "/api/evolution/sessions/{id}",
    tag = "Evolution",
    security(("user_id" = [])),
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session", body = EvolutionSession),
        (status = 404, description = "Evolution session not found")
    )
)]
pub async fn get_session(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<EvolutionSession>>> {
    let session = state.evolution.get_session(&user.id, &id).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// Record a generated image as the session's next generation
#[utoipa::path(
    post,
    path = "/api/evolution/sessions/{id}/generations",
    tag = "Evolution",
    security(("user_id" = [])),
    params(("id" = String, Path, description = "Session ID")),
    request_body = RecordGenerationRequest,
    responses(
        (status = 201, description = "Generation recorded", body = GeneratedImage),
        (status = 400, description = "Validation error or foreign parent image"),
        (status = 404, description = "Evolution session not found"),
        (status = 409, description = "Session already completed")
    )
)]
pub async fn record_generation(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<RecordGenerationRequest>,
) -> AppResult<Created<GeneratedImage>> {
    let image = state
        .evolution
        .record_generation(
            &user.id,
            &id,
            NewGeneration {
                prompt: req.prompt,
                image_url: req.image_url,
                parent_image_id: req.parent_image_id,
            },
        )
        .await?;
    Ok(Created(image))
}

/// Mark a session completed
#[utoipa::path(
    post,
    path = "/api/evolution/sessions/{id}/complete",
    tag = "Evolution",
    security(("user_id" = [])),
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 200, description = "Session completed", body = EvolutionSession),
        (status = 404, description = "Evolution session not found"),
        (status = 409, description = "Session already completed")
    )
)]
pub async fn complete_session(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<ApiResponse<EvolutionSession>>> {
    let session = state.evolution.complete_session(&user.id, &id).await?;
    Ok(Json(ApiResponse::success(session)))
}

/// Upload a reference image (multipart field `file`)
#[utoipa::path(
    post,
    path = "/api/evolution/sessions/{id}/references",
    tag = "Evolution",
    security(("user_id" = [])),
    params(("id" = String, Path, description = "Session ID")),
    responses(
        (status = 201, description = "Reference stored", body = UploadedImage),
        (status = 400, description = "Empty, oversized or unsupported file, or limit reached"),
        (status = 404, description = "Evolution session not found"),
        (status = 409, description = "Session already completed")
    )
)]
pub async fn upload_reference(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Created<UploadedImage>> {
    let mut multipart = multipart.map_err(|e| AppError::validation(e.body_text()))?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        upload = Some(ReferenceUpload {
            file_name,
            bytes: bytes.to_vec(),
        });
        break;
    }
    let upload = upload.ok_or_else(|| AppError::validation("Missing file field"))?;

    let record = state
        .evolution
        .upload_reference(&user.id, &id, upload)
        .await?;
    Ok(Created(record))
}

/// Delete a reference image
#[utoipa::path(
    delete,
    path = "/api/evolution/sessions/{id}/references/{upload_id}",
    tag = "Evolution",
    security(("user_id" = [])),
    params(
        ("id" = String, Path, description = "Session ID"),
        ("upload_id" = String, Path, description = "Reference image ID")
    ),
    responses(
        (status = 204, description = "Reference deleted"),
        (status = 404, description = "Session or reference image not found")
    )
)]
pub async fn delete_reference(
    user: CurrentUser,
    State(state): State<AppState>,
    Path((id, upload_id)): Path<(String, String)>,
) -> AppResult<NoContent> {
    state
        .evolution
        .delete_reference(&user.id, &id, &upload_id)
        .await?;
    Ok(NoContent)
}

/// Own images, newest first, with favorite flags
#[utoipa::path(
    get,
    path = "/api/evolution/gallery",
    tag = "Evolution",
    security(("user_id" = [])),
    params(GalleryParams),
    responses(
        (status = 200, description = "One page of gallery items: {data, meta}"),
        (status = 401, description = "Missing X-User-Id")
    )
)]
pub async fn gallery(
    user: CurrentUser,
    State(state): State<AppState>,
    ValidatedQuery(params): ValidatedQuery<GalleryParams>,
) -> AppResult<Json<ApiResponse<Paginated<GalleryItem>>>> {
    let paging = PaginationParams::new(
        params.page.unwrap_or(DEFAULT_PAGE_NUMBER),
        params.per_page.unwrap_or(DEFAULT_PAGE_SIZE),
    );
    let query = GalleryQuery {
        style: params.style,
        session_id: params.session_id,
        favorites_only: params.favorites_only.unwrap_or(false),
    };

    let page = state.evolution.gallery(&user.id, query, paging).await?;
    Ok(Json(ApiResponse::success(page)))
}

/// Favorite an own image (idempotent)
#[utoipa::path(
    put,
    path = "/api/evolution/favorites/{image_id}",
    tag = "Evolution",
    security(("user_id" = [])),
    params(("image_id" = String, Path, description = "Image ID")),
    responses(
        (status = 200, description = "Favorite stored", body = Favorite),
        (status = 404, description = "Image not found")
    )
)]
pub async fn add_favorite(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> AppResult<Json<ApiResponse<Favorite>>> {
    let favorite = state.evolution.add_favorite(&user.id, &image_id).await?;
    Ok(Json(ApiResponse::success(favorite)))
}

/// Remove a favorite
#[utoipa::path(
    delete,
    path = "/api/evolution/favorites/{image_id}",
    tag = "Evolution",
    security(("user_id" = [])),
    params(("image_id" = String, Path, description = "Image ID")),
    responses((status = 204, description = "Favorite removed"))
)]
pub async fn remove_favorite(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(image_id): Path<String>,
) -> AppResult<NoContent> {
    state.evolution.remove_favorite(&user.id, &image_id).await?;
    Ok(NoContent)
}

/// Favorite images, most recently favorited first
#[utoipa::path(
    get,
    path = "/api/evolution/favorites",
    tag = "Evolution",
    security(("user_id" = [])),
    responses((status = 200, description = "Favorite images", body = Vec<GeneratedImage>))
)]
pub async fn list_favorites(
    user: CurrentUser,
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<GeneratedImage>>>> {
    let images = state.evolution.list_favorites(&user.id).await?;
    Ok(Json(ApiResponse::success(images)))
}
