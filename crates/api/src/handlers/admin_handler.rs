//! Admin handlers.
//!
//! NOTE: these endpoints perform no authorization; access control is
//! expected from the deployment in front of the server.

use axum::{
    extract::State,
    response::Json,
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use common::{ApiResponse, AppResult};
use domain::{PaymentRecord, UserRecord};

use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// User search request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct SearchUserRequest {
    /// Exact email address to look up
    #[validate(
        required(message = "Missing email"),
        length(min = 1, message = "Missing email")
    )]
    #[schema(example = "ada@example.com")]
    pub email: Option<String>,
}

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/pending-payments", get(pending_payments))
        .route("/search-user", post(search_user))
}

/// List bank-transfer payments awaiting confirmation
#[utoipa::path(
    get,
    path = "/api/admin/pending-payments",
    tag = "Admin",
    responses(
        (status = 200, description = "Pending bank-transfer payments, unordered"),
        (status = 500, description = "Lookup failed")
    )
)]
pub async fn pending_payments(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<PaymentRecord>>>> {
    let payments = state.admin.pending_payments().await?;
    Ok(Json(ApiResponse::success(payments)))
}

/// Find a user by exact email
#[utoipa::path(
    post,
    path = "/api/admin/search-user",
    tag = "Admin",
    request_body = SearchUserRequest,
    responses(
        (status = 200, description = "User record with its identifier"),
        (status = 400, description = "Missing email or malformed body"),
        (status = 404, description = "User not found"),
        (status = 500, description = "Lookup failed")
    )
)]
pub async fn search_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<SearchUserRequest>,
) -> AppResult<Json<ApiResponse<UserRecord>>> {
    let email = req.email.unwrap_or_default();
    let user = state.admin.find_user_by_email(&email).await?;
    Ok(Json(ApiResponse::success(user)))
}
