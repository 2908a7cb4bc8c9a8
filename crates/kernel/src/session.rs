//! Session management.
//!
//! Sessions only carry one-shot status messages between a command and the
//! page it redirects to, so they live in process memory.

use tower_sessions::cookie::SameSite;
use tower_sessions::cookie::time::Duration;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

/// Default session expiry (24 hours).
pub const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 24;

/// Create the session layer.
pub fn create_session_layer() -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_secure(true)
        .with_http_only(true)
        .with_same_site(SameSite::Strict)
        .with_expiry(Expiry::OnInactivity(Duration::hours(
            DEFAULT_SESSION_EXPIRY_HOURS,
        )))
}
