//! Evolution Service Library
//!
//! Iterative image refinement: sessions, their generated images and
//! reference uploads, plus the per-user gallery and favorites.

pub mod repository;
pub mod service;

pub use repository::{
    FavoriteRepository, FavoriteStore, ImageFilter, ImageRepository, ImageStore,
    SessionRepository, SessionStore, UploadRepository, UploadStore,
};
pub use service::{
    EvolutionManager, EvolutionService, GalleryQuery, NewGeneration, NewSession, ReferenceUpload,
};

#[cfg(any(test, feature = "test-utils"))]
pub use repository::{
    MockFavoriteRepository, MockImageRepository, MockSessionRepository, MockUploadRepository,
};
