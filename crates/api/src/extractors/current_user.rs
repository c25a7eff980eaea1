//! Caller identity asserted by the fronting auth layer.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use once_cell::sync::Lazy;
use regex::Regex;

use common::AppError;

/// Header carrying the authenticated user's identifier
pub const USER_ID_HEADER: &str = "x-user-id";

static USER_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("valid user id pattern"));

/// Identifier of the user making the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or(AppError::Unauthorized)?;

        let id = value
            .to_str()
            .ok()
            .filter(|id| USER_ID.is_match(id))
            .ok_or_else(|| AppError::validation("Invalid X-User-Id header"))?;

        Ok(CurrentUser { id: id.to_string() })
    }
}
