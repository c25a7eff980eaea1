//! Static page metadata handlers.

use axum::{
    extract::Path,
    response::Json,
    routing::get,
    Router,
};

use common::{ApiResponse, AppResult, OptionExt};
use domain::pages::{all_pages, find_page};
use domain::PageMetadata;

use crate::state::AppState;

/// Create page metadata routes
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_pages))
        .route("/:slug", get(get_page))
}

/// Metadata of every static page
#[utoipa::path(
    get,
    path = "/api/pages",
    tag = "Pages",
    responses((status = 200, description = "Page metadata", body = Vec<PageMetadata>))
)]
pub async fn list_pages() -> Json<ApiResponse<&'static [PageMetadata]>> {
    Json(ApiResponse::success(all_pages()))
}

/// Metadata of one static page
#[utoipa::path(
    get,
    path = "/api/pages/{slug}",
    tag = "Pages",
    params(("slug" = String, Path, description = "Page slug, e.g. `login`")),
    responses(
        (status = 200, description = "Page metadata", body = PageMetadata),
        (status = 404, description = "Page not found")
    )
)]
pub async fn get_page(Path(slug): Path<String>) -> AppResult<Json<ApiResponse<&'static PageMetadata>>> {
    let page = find_page(&slug).ok_or_not_found("Page")?;
    Ok(Json(ApiResponse::success(page)))
}
