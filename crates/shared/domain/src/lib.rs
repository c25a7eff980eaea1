//! Domain layer - Core entities, value objects and pure business rules.
//!
//! This crate has no infrastructure dependencies. Stored data is modelled as
//! schema-less [`Document`]s; typed entities are decoded from them.

pub mod constants;
pub mod document;
pub mod error;
pub mod evolution;
pub mod pages;
pub mod payment;
pub mod subtitles;
pub mod timestamp;
pub mod user;

pub use constants::*;
pub use document::{Document, Fields};
pub use error::{DomainError, DomainResult};
pub use evolution::{
    EvolutionSession, Favorite, GalleryItem, GeneratedImage, ImageFormat, SessionStatus,
    UploadedImage,
};
pub use pages::PageMetadata;
pub use payment::PaymentRecord;
pub use subtitles::{SubtitleCue, SubtitleFormat};
pub use user::UserRecord;
