//! Admin Service Library
//!
//! Back-office lookups over the document store: payments awaiting manual
//! confirmation and account search by email.

pub mod repository;
pub mod service;

pub use repository::{PaymentRepository, PaymentStore, UserRepository, UserStore};
pub use service::{AdminManager, AdminService};

#[cfg(any(test, feature = "test-utils"))]
pub use repository::{MockPaymentRepository, MockUserRepository};
