//! Domain-level constants.
//!
//! Collection names, stored field names and business limits.

// =============================================================================
// Collections
// =============================================================================

/// Payment records written by the checkout flow
pub const COLLECTION_PAYMENTS: &str = "payments";

/// Account records
pub const COLLECTION_USERS: &str = "users";

/// Images produced by the generator
pub const COLLECTION_IMAGES: &str = "images";

/// Per-user favorite markers
pub const COLLECTION_FAVORITES: &str = "favorites";

/// Reference images uploaded into evolution sessions
pub const COLLECTION_UPLOADED_IMAGES: &str = "uploadedImages";

/// Evolution sessions
pub const COLLECTION_EVOLUTION_SESSIONS: &str = "evolutionSessions";

// =============================================================================
// Field names
// =============================================================================

pub const FIELD_ID: &str = "id";
pub const FIELD_STATUS: &str = "status";
pub const FIELD_PAYMENT_METHOD: &str = "paymentMethod";
pub const FIELD_CREATED_AT: &str = "createdAt";
pub const FIELD_EMAIL: &str = "email";
pub const FIELD_USER_ID: &str = "userId";
pub const FIELD_SESSION_ID: &str = "sessionId";
pub const FIELD_STYLE: &str = "style";
pub const FIELD_REVISION: &str = "revision";

// =============================================================================
// Payments
// =============================================================================

/// Status of a payment awaiting confirmation
pub const PAYMENT_STATUS_PENDING: &str = "pending";

/// Payment method value for manual bank transfers
pub const PAYMENT_METHOD_BANK_TRANSFER: &str = "bank_transfer";

// =============================================================================
// Evolution
// =============================================================================

/// Maximum reference images attached to one session
pub const MAX_REFERENCE_IMAGES_PER_SESSION: usize = 4;

/// Maximum size of a single reference upload (10 MiB)
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// =============================================================================
// Subtitles
// =============================================================================

/// Default maximum characters in one subtitle cue
pub const DEFAULT_MAX_CHARS_PER_CUE: usize = 42;

/// Longest accepted subtitle track (24 hours)
pub const MAX_SUBTITLE_DURATION_MS: u64 = 24 * 60 * 60 * 1000;
