//! Session middleware configuration.
//!
//! Sessions live in `PostgreSQL` via tower-sessions. The cookie only carries
//! the session ID, signed with the configured session secret.

use secrecy::ExposeSecret;
use sqlx::PgPool;
use tower_sessions::cookie::Key;
use tower_sessions::service::SignedCookie;
use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};
use tower_sessions_sqlx_store::PostgresStore;

use crate::config::PortalConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "nm_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// The session secret cannot be used as a signing key.
#[derive(Debug, thiserror::Error)]
#[error("session secret is not a usable signing key (need at least 64 bytes)")]
pub struct SessionKeyError;

/// Create the session layer with the `PostgreSQL` store.
///
/// # Errors
///
/// Returns `SessionKeyError` if the session secret is too short to sign cookies.
pub fn create_session_layer(
    pool: &PgPool,
    config: &PortalConfig,
) -> Result<SessionManagerLayer<PostgresStore, SignedCookie>, SessionKeyError> {
    session_layer(PostgresStore::new(pool.clone()), config)
}

/// Build the session layer over any store.
///
/// # Errors
///
/// Returns `SessionKeyError` if the session secret is too short to sign cookies.
pub fn session_layer<S: SessionStore + Clone>(
    store: S,
    config: &PortalConfig,
) -> Result<SessionManagerLayer<S, SignedCookie>, SessionKeyError> {
    let key = Key::try_from(config.session_secret.expose_secret().as_bytes())
        .map_err(|_| SessionKeyError)?;

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_https())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
