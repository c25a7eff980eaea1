//! Service layer.

mod admin_service;

pub use admin_service::{AdminManager, AdminService};
