//! Common utilities shared across all crates.
//!
//! This crate provides:
//! - Unified error handling and the response envelope
//! - Pagination types
//! - Configuration structures

pub mod config;
pub mod error;
pub mod pagination;
pub mod response;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use pagination::{Paginated, PaginationMeta, PaginationParams};
pub use response::{ApiResponse, Created, NoContent};
