//! Evolution service - sessions, generations, references and the gallery.
//!
//! Every operation is scoped to the calling user. Another user's session,
//! image or upload reads as "not found".

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use common::{AppError, AppResult, Paginated, PaginationParams};
use domain::evolution::{reference_storage_path, validate_reference_upload};
use domain::{Document, EvolutionSession, Favorite, GalleryItem, GeneratedImage, UploadedImage};
use platform::ObjectStorage;

use crate::repository::{
    FavoriteRepository, ImageFilter, ImageRepository, SessionRepository, UploadRepository,
};

const SESSION: &str = "Evolution session";

/// Attempts at storing a session change before giving up on contention
const SESSION_UPDATE_ATTEMPTS: usize = 32;
const IMAGE: &str = "Image";
const REFERENCE: &str = "Reference image";

/// Input for starting a session
#[derive(Debug, Clone)]
pub struct NewSession {
    pub base_prompt: String,
    pub style: Option<String>,
}

/// Input for recording a generated image
#[derive(Debug, Clone)]
pub struct NewGeneration {
    pub prompt: String,
    pub image_url: String,
    pub parent_image_id: Option<String>,
}

/// A reference image as received from the client
#[derive(Debug, Clone)]
pub struct ReferenceUpload {
    pub file_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Gallery filters
#[derive(Debug, Clone, Default)]
pub struct GalleryQuery {
    pub style: Option<String>,
    pub session_id: Option<String>,
    pub favorites_only: bool,
}

/// Evolution service trait for dependency injection.
#[async_trait]
pub trait EvolutionService: Send + Sync {
    /// Start a new active session
    async fn start_session(&self, user_id: &str, input: NewSession)
        -> AppResult<EvolutionSession>;

    /// List own sessions, newest first
    async fn list_sessions(&self, user_id: &str) -> AppResult<Vec<EvolutionSession>>;

    /// Get an own session
    async fn get_session(&self, user_id: &str, session_id: &str) -> AppResult<EvolutionSession>;

    /// Record a generated image as the session's next generation
    async fn record_generation(
        &self,
        user_id: &str,
        session_id: &str,
        input: NewGeneration,
    ) -> AppResult<GeneratedImage>;

    /// Mark a session completed
    async fn complete_session(&self, user_id: &str, session_id: &str)
        -> AppResult<EvolutionSession>;

    /// Store a reference image and attach it to a session
    async fn upload_reference(
        &self,
        user_id: &str,
        session_id: &str,
        upload: ReferenceUpload,
    ) -> AppResult<UploadedImage>;

    /// Detach and delete a reference image (object and record)
    async fn delete_reference(
        &self,
        user_id: &str,
        session_id: &str,
        upload_id: &str,
    ) -> AppResult<()>;

    /// Own images, newest first, annotated with favorite flags
    async fn gallery(
        &self,
        user_id: &str,
        query: GalleryQuery,
        params: PaginationParams,
    ) -> AppResult<Paginated<GalleryItem>>;

    /// Mark an own image as favorite (idempotent)
    async fn add_favorite(&self, user_id: &str, image_id: &str) -> AppResult<Favorite>;

    /// Remove a favorite marker; removing an absent marker succeeds
    async fn remove_favorite(&self, user_id: &str, image_id: &str) -> AppResult<()>;

    /// Favorite images, most recently favorited first
    async fn list_favorites(&self, user_id: &str) -> AppResult<Vec<GeneratedImage>>;
}

/// Concrete implementation of EvolutionService using repositories.
pub struct EvolutionManager {
    sessions: Arc<dyn SessionRepository>,
    images: Arc<dyn ImageRepository>,
    favorites: Arc<dyn FavoriteRepository>,
    uploads: Arc<dyn UploadRepository>,
    storage: Arc<dyn ObjectStorage>,
}

impl EvolutionManager {
    pub fn new(
        sessions: Arc<dyn SessionRepository>,
        images: Arc<dyn ImageRepository>,
        favorites: Arc<dyn FavoriteRepository>,
        uploads: Arc<dyn UploadRepository>,
        storage: Arc<dyn ObjectStorage>,
    ) -> Self {
        Self {
            sessions,
            images,
            favorites,
            uploads,
            storage,
        }
    }

    async fn owned_session(&self, user_id: &str, session_id: &str) -> AppResult<EvolutionSession> {
        self.sessions
            .find_by_id(session_id)
            .await?
            .filter(|session| session.is_owned_by(user_id))
            .ok_or_else(|| AppError::not_found(SESSION))
    }

    /// Apply `change` to the stored session and write it back, re-reading
    /// and retrying when another request stored a newer revision first.
    async fn modify_session<T, F>(
        &self,
        user_id: &str,
        session_id: &str,
        mut change: F,
    ) -> AppResult<(EvolutionSession, T)>
    where
        F: FnMut(&mut EvolutionSession) -> AppResult<T> + Send,
        T: Send,
    {
        for _ in 0..SESSION_UPDATE_ATTEMPTS {
            let mut session = self.owned_session(user_id, session_id).await?;
            let seen = session.revision;
            let output = change(&mut session)?;
            session.revision = seen + 1;

            if self.sessions.replace(&session, seen).await? {
                return Ok((session, output));
            }
            debug!(session_id, revision = seen, "Session changed concurrently, retrying");
        }

        warn!(session_id, "Gave up storing session change under contention");
        Err(AppError::conflict(
            "Evolution session is being modified concurrently, please retry",
        ))
    }

    async fn owned_image(&self, user_id: &str, image_id: &str) -> AppResult<GeneratedImage> {
        self.images
            .find_by_id(image_id)
            .await?
            .filter(|image| image.user_id == user_id)
            .ok_or_else(|| AppError::not_found(IMAGE))
    }

    async fn favorite_ids(&self, user_id: &str) -> AppResult<Vec<String>> {
        Ok(self
            .favorites
            .list_by_user(user_id)
            .await?
            .into_iter()
            .map(|favorite| favorite.image_id)
            .collect())
    }

    /// Resolve favorite markers to images, skipping images that no longer exist.
    async fn favorite_images(&self, user_id: &str) -> AppResult<Vec<GeneratedImage>> {
        let mut images = Vec::new();
        for image_id in self.favorite_ids(user_id).await? {
            if let Some(image) = self.images.find_by_id(&image_id).await? {
                if image.user_id == user_id {
                    images.push(image);
                }
            }
        }
        Ok(images)
    }
}

#[async_trait]
impl EvolutionService for EvolutionManager {
    async fn start_session(
        &self,
        user_id: &str,
        input: NewSession,
    ) -> AppResult<EvolutionSession> {
        let session = EvolutionSession::new(
            Document::new_id(),
            user_id.to_string(),
            input.base_prompt,
            input.style,
        );
        self.sessions.save(&session).await?;

        info!(session_id = %session.id, user_id, "Evolution session started");
        Ok(session)
    }

    async fn list_sessions(&self, user_id: &str) -> AppResult<Vec<EvolutionSession>> {
        self.sessions.list_by_user(user_id).await
    }

    async fn get_session(&self, user_id: &str, session_id: &str) -> AppResult<EvolutionSession> {
        self.owned_session(user_id, session_id).await
    }

    async fn record_generation(
        &self,
        user_id: &str,
        session_id: &str,
        input: NewGeneration,
    ) -> AppResult<GeneratedImage> {
        self.owned_session(user_id, session_id)
            .await?
            .ensure_active()?;

        if let Some(parent_id) = &input.parent_image_id {
            let parent = self.images.find_by_id(parent_id).await?;
            let same_session = parent.is_some_and(|parent| {
                parent.user_id == user_id && parent.session_id.as_deref() == Some(session_id)
            });
            if !same_session {
                return Err(AppError::validation(
                    "Parent image must belong to the same session",
                ));
            }
        }

        // The generation number is claimed with the session write, so
        // concurrent recordings never share one
        let image_id = Document::new_id();
        let (session, generation) = self
            .modify_session(user_id, session_id, |session| {
                session.ensure_active()?;
                Ok(session.advance(&image_id))
            })
            .await?;

        let image = GeneratedImage {
            id: image_id,
            user_id: user_id.to_string(),
            prompt: input.prompt,
            image_url: input.image_url,
            style: session.style.clone(),
            session_id: Some(session.id.clone()),
            parent_image_id: input.parent_image_id,
            generation,
            created_at: Utc::now(),
        };
        self.images.save(&image).await?;

        debug!(session_id, image_id = %image.id, generation, "Recorded generation");
        Ok(image)
    }

    async fn complete_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> AppResult<EvolutionSession> {
        let (session, ()) = self
            .modify_session(user_id, session_id, |session| {
                session.ensure_active()?;
                session.complete();
                Ok(())
            })
            .await?;

        info!(session_id, generations = session.generation_count, "Evolution session completed");
        Ok(session)
    }

    async fn upload_reference(
        &self,
        user_id: &str,
        session_id: &str,
        upload: ReferenceUpload,
    ) -> AppResult<UploadedImage> {
        let session = self.owned_session(user_id, session_id).await?;
        session.ensure_active()?;
        session.ensure_reference_capacity()?;
        let format = validate_reference_upload(&upload.bytes)?;

        let upload_id = Document::new_id();
        let path = reference_storage_path(user_id, session_id, &upload_id, format);
        let stored = self
            .storage
            .put(&path, upload.bytes, format.content_type())
            .await?;

        // Limits are checked again against the stored session; a concurrent
        // upload may have taken the last slot since the check above
        let attached = self
            .modify_session(user_id, session_id, |session| {
                session.ensure_active()?;
                session.ensure_reference_capacity()?;
                session.attach_reference(&upload_id);
                Ok(())
            })
            .await;
        if let Err(e) = attached {
            if let Err(cleanup) = self.storage.delete(&stored.path).await {
                warn!(path = %stored.path, error = %cleanup, "Failed to remove rejected reference object");
            }
            return Err(e);
        }

        let record = UploadedImage {
            id: upload_id,
            user_id: user_id.to_string(),
            session_id: session_id.to_string(),
            file_name: upload.file_name,
            storage_path: stored.path,
            url: stored.url,
            content_type: stored.content_type,
            size_bytes: stored.size_bytes,
            created_at: Utc::now(),
        };
        self.uploads.save(&record).await?;

        info!(session_id, upload_id = %record.id, size_bytes = record.size_bytes, "Reference image uploaded");
        Ok(record)
    }

    async fn delete_reference(
        &self,
        user_id: &str,
        session_id: &str,
        upload_id: &str,
    ) -> AppResult<()> {
        self.owned_session(user_id, session_id).await?;
        let upload = self
            .uploads
            .find_by_id(upload_id)
            .await?
            .filter(|upload| upload.user_id == user_id && upload.session_id == session_id)
            .ok_or_else(|| AppError::not_found(REFERENCE))?;

        if !self.storage.delete(&upload.storage_path).await? {
            debug!(path = %upload.storage_path, "Reference object already absent");
        }
        self.uploads.delete(&upload.id).await?;

        self.modify_session(user_id, session_id, |session| {
            session.detach_reference(&upload.id);
            Ok(())
        })
        .await?;

        info!(session_id, upload_id, "Reference image deleted");
        Ok(())
    }

    async fn gallery(
        &self,
        user_id: &str,
        query: GalleryQuery,
        params: PaginationParams,
    ) -> AppResult<Paginated<GalleryItem>> {
        let filter = ImageFilter {
            user_id: user_id.to_string(),
            style: query.style,
            session_id: query.session_id,
        };

        if query.favorites_only {
            let mut images: Vec<GeneratedImage> = self
                .favorite_images(user_id)
                .await?
                .into_iter()
                .filter(|image| filter.matches(image))
                .collect();
            images.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            return Ok(Paginated::from_items(images, params).map(|image| GalleryItem {
                image,
                is_favorite: true,
            }));
        }

        let total = self.images.count(&filter).await?;
        let images = self
            .images
            .list(&filter, params.offset(), params.limit())
            .await?;
        let favorites: HashSet<String> = self.favorite_ids(user_id).await?.into_iter().collect();

        let items = images
            .into_iter()
            .map(|image| GalleryItem {
                is_favorite: favorites.contains(&image.id),
                image,
            })
            .collect();

        Ok(Paginated::new(items, params.page(), params.limit(), total))
    }

    async fn add_favorite(&self, user_id: &str, image_id: &str) -> AppResult<Favorite> {
        let image = self.owned_image(user_id, image_id).await?;

        if let Some(existing) = self.favorites.find(user_id, &image.id).await? {
            return Ok(existing);
        }

        let favorite = Favorite::new(user_id, &image.id);
        self.favorites.save(&favorite).await?;
        Ok(favorite)
    }

    async fn remove_favorite(&self, user_id: &str, image_id: &str) -> AppResult<()> {
        if !self.favorites.delete(user_id, image_id).await? {
            debug!(user_id, image_id, "Favorite already absent");
        }
        Ok(())
    }

    async fn list_favorites(&self, user_id: &str) -> AppResult<Vec<GeneratedImage>> {
        self.favorite_images(user_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{
        MockFavoriteRepository, MockImageRepository, MockSessionRepository, MockUploadRepository,
    };
    use domain::SessionStatus;
    use platform::MemoryObjectStorage;

    struct Mocks {
        sessions: MockSessionRepository,
        images: MockImageRepository,
        favorites: MockFavoriteRepository,
        uploads: MockUploadRepository,
    }

    impl Mocks {
        fn new() -> Self {
            Self {
                sessions: MockSessionRepository::new(),
                images: MockImageRepository::new(),
                favorites: MockFavoriteRepository::new(),
                uploads: MockUploadRepository::new(),
            }
        }

        fn into_manager(self) -> EvolutionManager {
            EvolutionManager::new(
                Arc::new(self.sessions),
                Arc::new(self.images),
                Arc::new(self.favorites),
                Arc::new(self.uploads),
                Arc::new(MemoryObjectStorage::new("test-bucket")),
            )
        }
    }

    fn session(owner: &str) -> EvolutionSession {
        EvolutionSession::new(
            "s1".to_string(),
            owner.to_string(),
            "a lighthouse at dusk".to_string(),
            None,
        )
    }

    #[tokio::test]
    async fn test_foreign_session_reads_as_not_found() {
        let mut mocks = Mocks::new();
        mocks
            .sessions
            .expect_find_by_id()
            .returning(|_| Ok(Some(session("owner"))));

        let err = mocks
            .into_manager()
            .get_session("intruder", "s1")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Evolution session not found");
    }

    #[tokio::test]
    async fn test_completed_session_rejects_generations() {
        let mut mocks = Mocks::new();
        mocks.sessions.expect_find_by_id().returning(|_| {
            let mut completed = session("u1");
            completed.complete();
            Ok(Some(completed))
        });
        mocks.images.expect_save().never();

        let err = mocks
            .into_manager()
            .record_generation(
                "u1",
                "s1",
                NewGeneration {
                    prompt: "brighter".to_string(),
                    image_url: "https://cdn/x.png".to_string(),
                    parent_image_id: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_complete_session_persists_status() {
        let mut mocks = Mocks::new();
        mocks
            .sessions
            .expect_find_by_id()
            .returning(|_| Ok(Some(session("u1"))));
        mocks
            .sessions
            .expect_replace()
            .withf(|s, seen| s.status == SessionStatus::Completed && *seen == 0 && s.revision == 1)
            .times(1)
            .returning(|_, _| Ok(true));

        let completed = mocks.into_manager().complete_session("u1", "s1").await.unwrap();
        assert!(!completed.is_active());
        assert_eq!(completed.revision, 1);
    }

    #[tokio::test]
    async fn test_session_change_retries_on_stale_revision() {
        let mut mocks = Mocks::new();
        let mut reads = 0;
        mocks.sessions.expect_find_by_id().times(2).returning(move |_| {
            // Another writer stored revision 1 between the two reads
            let mut stored = session("u1");
            stored.revision = reads;
            reads += 1;
            Ok(Some(stored))
        });
        mocks
            .sessions
            .expect_replace()
            .times(2)
            .returning(|_, seen| Ok(seen == 1));

        let completed = mocks.into_manager().complete_session("u1", "s1").await.unwrap();
        assert_eq!(completed.revision, 2);
    }

    #[tokio::test]
    async fn test_session_change_gives_up_under_contention() {
        let mut mocks = Mocks::new();
        mocks
            .sessions
            .expect_find_by_id()
            .returning(|_| Ok(Some(session("u1"))));
        mocks
            .sessions
            .expect_replace()
            .times(SESSION_UPDATE_ATTEMPTS)
            .returning(|_, _| Ok(false));

        let err = mocks
            .into_manager()
            .complete_session("u1", "s1")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_favoriting_missing_image_is_not_found() {
        let mut mocks = Mocks::new();
        mocks.images.expect_find_by_id().returning(|_| Ok(None));
        mocks.favorites.expect_save().never();

        let err = mocks
            .into_manager()
            .add_favorite("u1", "nope")
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Image not found");
    }
}
