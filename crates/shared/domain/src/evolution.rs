//! Evolution gallery entities.
//!
//! An evolution session iteratively refines a base prompt: each recorded
//! generation links to its parent image, and the user may attach a small
//! number of reference images to steer it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{MAX_REFERENCE_IMAGES_PER_SESSION, MAX_UPLOAD_BYTES};
use crate::error::{DomainError, DomainResult};

/// Lifecycle of an evolution session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// An iterative refinement run owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct EvolutionSession {
    pub id: String,
    pub user_id: String,
    pub base_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    pub status: SessionStatus,
    pub generation_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_image_id: Option<String>,
    #[serde(default)]
    pub reference_image_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every stored change; writers replace only the revision they read
    #[serde(default)]
    pub revision: u64,
}

impl EvolutionSession {
    /// Start a new active session.
    pub fn new(id: String, user_id: String, base_prompt: String, style: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            base_prompt,
            style,
            status: SessionStatus::Active,
            generation_count: 0,
            current_image_id: None,
            reference_image_ids: Vec::new(),
            created_at: now,
            updated_at: now,
            revision: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Fail unless new generations or references may be added.
    pub fn ensure_active(&self) -> DomainResult<()> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::conflict("Evolution session is already completed"))
        }
    }

    /// Fail when another reference image would exceed the per-session limit.
    pub fn ensure_reference_capacity(&self) -> DomainResult<()> {
        if self.reference_image_ids.len() >= MAX_REFERENCE_IMAGES_PER_SESSION {
            return Err(DomainError::limit_exceeded(format!(
                "Reference image limit reached (max {})",
                MAX_REFERENCE_IMAGES_PER_SESSION
            )));
        }
        Ok(())
    }

    /// Register a newly recorded generation and return its generation number.
    pub fn advance(&mut self, image_id: &str) -> u32 {
        let generation = self.generation_count;
        self.generation_count += 1;
        self.current_image_id = Some(image_id.to_string());
        self.updated_at = Utc::now();
        generation
    }

    pub fn attach_reference(&mut self, upload_id: &str) {
        self.reference_image_ids.push(upload_id.to_string());
        self.updated_at = Utc::now();
    }

    /// Detach a reference image, returning whether it was attached.
    pub fn detach_reference(&mut self, upload_id: &str) -> bool {
        let before = self.reference_image_ids.len();
        self.reference_image_ids.retain(|id| id != upload_id);
        let removed = self.reference_image_ids.len() != before;
        if removed {
            self.updated_at = Utc::now();
        }
        removed
    }

    pub fn complete(&mut self) {
        self.status = SessionStatus::Completed;
        self.updated_at = Utc::now();
    }
}

/// An image produced by the generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GeneratedImage {
    pub id: String,
    pub user_id: String,
    pub prompt: String,
    pub image_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_image_id: Option<String>,
    #[serde(default)]
    pub generation: u32,
    pub created_at: DateTime<Utc>,
}

/// A user's favorite marker on an image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub user_id: String,
    pub image_id: String,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// Deterministic identifier, so favoriting twice stores one marker.
    ///
    /// User identifiers never contain `:`, so the owner prefix is unambiguous.
    pub fn key(user_id: &str, image_id: &str) -> String {
        format!("{}:{}", user_id, image_id)
    }

    pub fn new(user_id: &str, image_id: &str) -> Self {
        Self {
            id: Self::key(user_id, image_id),
            user_id: user_id.to_string(),
            image_id: image_id.to_string(),
            created_at: Utc::now(),
        }
    }
}

/// A reference image uploaded into a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub id: String,
    pub user_id: String,
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub storage_path: String,
    pub url: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// Gallery entry: an image annotated with the viewer's favorite flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct GalleryItem {
    #[serde(flatten)]
    pub image: GeneratedImage,
    pub is_favorite: bool,
}

/// Image formats accepted as reference uploads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the file's leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(ImageFormat::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageFormat::Jpeg)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageFormat::Webp)
        } else {
            None
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::Webp => "image/webp",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpg",
            ImageFormat::Webp => "webp",
        }
    }
}

/// Validate an uploaded reference image and detect its format.
pub fn validate_reference_upload(bytes: &[u8]) -> DomainResult<ImageFormat> {
    if bytes.is_empty() {
        return Err(DomainError::validation("Uploaded file is empty"));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(DomainError::validation(format!(
            "Uploaded file exceeds {} bytes",
            MAX_UPLOAD_BYTES
        )));
    }
    ImageFormat::sniff(bytes)
        .ok_or_else(|| DomainError::validation("Only PNG, JPEG and WebP images are supported"))
}

/// Storage path of a reference image.
pub fn reference_storage_path(
    user_id: &str,
    session_id: &str,
    upload_id: &str,
    format: ImageFormat,
) -> String {
    format!(
        "references/{}/{}/{}.{}",
        user_id,
        session_id,
        upload_id,
        format.extension()
    )
}
