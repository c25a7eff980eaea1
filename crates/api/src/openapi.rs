//! OpenAPI documentation.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::admin_handler::SearchUserRequest;
use crate::handlers::content_handler::{SubtitleRequest, SubtitleResponse};
use crate::handlers::evolution_handler::{RecordGenerationRequest, StartSessionRequest};
use crate::handlers::health_handler::{HealthResponse, ProviderStatus, ServiceHealth, ServiceStatus};
use domain::pages::{OpenGraph, Robots};
use domain::{
    EvolutionSession, Favorite, GalleryItem, GeneratedImage, PageMetadata, SessionStatus,
    SubtitleCue, SubtitleFormat, UploadedImage,
};

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health_handler::health_check,
        crate::handlers::admin_handler::pending_payments,
        crate::handlers::admin_handler::search_user,
        crate::handlers::evolution_handler::start_session,
        crate::handlers::evolution_handler::list_sessions,
        crate::handlers::evolution_handler::get_session,
        crate::handlers::evolution_handler::record_generation,
        crate::handlers::evolution_handler::complete_session,
        crate::handlers::evolution_handler::upload_reference,
        crate::handlers::evolution_handler::delete_reference,
        crate::handlers::evolution_handler::gallery,
        crate::handlers::evolution_handler::add_favorite,
        crate::handlers::evolution_handler::remove_favorite,
        crate::handlers::evolution_handler::list_favorites,
        crate::handlers::content_handler::generate_subtitles,
        crate::handlers::page_handler::list_pages,
        crate::handlers::page_handler::get_page,
    ),
    components(
        schemas(
            HealthResponse,
            ServiceStatus,
            ServiceHealth,
            ProviderStatus,
            SearchUserRequest,
            StartSessionRequest,
            RecordGenerationRequest,
            EvolutionSession,
            SessionStatus,
            GeneratedImage,
            GalleryItem,
            Favorite,
            UploadedImage,
            SubtitleRequest,
            SubtitleResponse,
            SubtitleCue,
            SubtitleFormat,
            PageMetadata,
            OpenGraph,
            Robots,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Service health"),
        (name = "Admin", description = "Payment review and account lookup"),
        (name = "Evolution", description = "Iterative image refinement and gallery"),
        (name = "Content", description = "Short-form video content helpers"),
        (name = "Pages", description = "Static page metadata"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "user_id",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-User-Id"))),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/admin/pending-payments",
            "/api/admin/search-user",
            "/api/evolution/sessions",
            "/api/evolution/sessions/{id}/references/{upload_id}",
            "/api/evolution/gallery",
            "/api/content/subtitles",
            "/api/pages/{slug}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
