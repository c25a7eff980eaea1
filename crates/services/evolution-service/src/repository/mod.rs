//! Repository layer for data access.
//!
//! Each repository maps one document collection to its typed entity.

mod favorite_repository;
mod image_repository;
mod session_repository;
mod upload_repository;

use serde::{de::DeserializeOwned, Serialize};

use common::{AppError, AppResult};
use domain::document::encode;
use domain::{Document, Fields};

pub use favorite_repository::{FavoriteRepository, FavoriteStore};
pub use image_repository::{ImageFilter, ImageRepository, ImageStore};
pub use session_repository::{SessionRepository, SessionStore};
pub use upload_repository::{UploadRepository, UploadStore};

#[cfg(any(test, feature = "test-utils"))]
pub use favorite_repository::MockFavoriteRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use image_repository::MockImageRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use session_repository::MockSessionRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use upload_repository::MockUploadRepository;

fn to_fields<T: Serialize>(entity: &str, value: &T) -> AppResult<Fields> {
    Ok(encode(entity, value)?)
}

fn decode_all<T: DeserializeOwned>(docs: Vec<Document>, entity: &str) -> AppResult<Vec<T>> {
    docs.into_iter()
        .map(|doc| doc.decode(entity).map_err(AppError::from))
        .collect()
}
