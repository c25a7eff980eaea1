//! Request extractors.

mod current_user;
mod validated_json;
mod validated_query;

pub use current_user::{CurrentUser, USER_ID_HEADER};
pub use validated_json::ValidatedJson;
pub use validated_query::ValidatedQuery;
