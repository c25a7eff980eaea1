//! Application state for dependency injection.

use std::sync::Arc;

use admin_service_lib::{AdminManager, AdminService, PaymentStore, UserStore};
use evolution_service_lib::{
    EvolutionManager, EvolutionService, FavoriteStore, ImageStore, SessionStore, UploadStore,
};
use platform::{DocumentStore, Platform, PlatformConfig};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub admin: Arc<dyn AdminService>,
    pub evolution: Arc<dyn EvolutionService>,
    pub store: Arc<dyn DocumentStore>,
    pub config: PlatformConfig,
}

impl AppState {
    /// Create new app state.
    pub fn new(
        admin: Arc<dyn AdminService>,
        evolution: Arc<dyn EvolutionService>,
        store: Arc<dyn DocumentStore>,
        config: PlatformConfig,
    ) -> Self {
        Self {
            admin,
            evolution,
            store,
            config,
        }
    }

    /// Wire repositories and services over initialized backends.
    pub fn from_platform(platform: Platform) -> Self {
        let store = platform.store;

        let admin = Arc::new(AdminManager::new(
            Arc::new(PaymentStore::new(store.clone())),
            Arc::new(UserStore::new(store.clone())),
        ));
        let evolution = Arc::new(EvolutionManager::new(
            Arc::new(SessionStore::new(store.clone())),
            Arc::new(ImageStore::new(store.clone())),
            Arc::new(FavoriteStore::new(store.clone())),
            Arc::new(UploadStore::new(store.clone())),
            platform.storage,
        ));

        Self::new(admin, evolution, store, platform.config)
    }
}
