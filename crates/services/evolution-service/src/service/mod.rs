//! Service layer.

mod evolution_service;

pub use evolution_service::{
    EvolutionManager, EvolutionService, GalleryQuery, NewGeneration, NewSession, ReferenceUpload,
};
