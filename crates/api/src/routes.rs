//! Route configuration.

use axum::{
    http::{header::CONTENT_TYPE, HeaderName, Method},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::ServeDir,
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::extractors::USER_ID_HEADER;
use crate::handlers::{
    admin_routes, content_routes, evolution_routes, health_routes, page_routes,
};
use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Create the main router with all routes.
pub fn create_router(state: AppState) -> Router {
    let files = ServeDir::new(&state.config.storage.root);

    Router::new()
        .nest("/health", health_routes())
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Admin routes (no authorization)
        .nest("/api/admin", admin_routes())
        // Evolution routes (caller identified by X-User-Id)
        .nest("/api/evolution", evolution_routes())
        .nest("/api/content", content_routes())
        .nest("/api/pages", page_routes())
        // Objects written by the local storage backend
        .nest_service("/files", files)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, HeaderName::from_static(USER_ID_HEADER)])
}
