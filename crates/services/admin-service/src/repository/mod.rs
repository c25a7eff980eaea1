//! Repository layer for data access.

mod payment_repository;
mod user_repository;

pub use payment_repository::{PaymentRepository, PaymentStore};
pub use user_repository::{UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use payment_repository::MockPaymentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
