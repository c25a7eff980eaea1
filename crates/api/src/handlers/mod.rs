//! HTTP handlers.

pub mod admin_handler;
pub mod content_handler;
pub mod evolution_handler;
pub mod health_handler;
pub mod page_handler;

pub use admin_handler::admin_routes;
pub use content_handler::content_routes;
pub use evolution_handler::evolution_routes;
pub use health_handler::health_routes;
pub use page_handler::page_routes;
