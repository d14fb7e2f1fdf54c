//! Account management commands.
//!
//! # Usage
//!
//! ```bash
//! nm-cli user create -e staff@example.com -n "Staff Name" -r STAFF -p 'a long password'
//! ```

use night_market_core::{Role, UserId};
use night_market_web::services::AuthService;

use super::{CliError, connect};

/// Create a new account.
///
/// # Errors
///
/// Returns an error if the role is unknown, the email or password is rejected,
/// or the email is already registered.
pub async fn create(
    email: &str,
    name: &str,
    role: &str,
    password: &str,
) -> Result<UserId, CliError> {
    let role: Role = role
        .parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))?;

    let pool = connect().await?;

    tracing::info!("Creating account: {} ({})", email, role);
    let user = AuthService::new(&pool)
        .register(email, Some(name), password, role)
        .await?;

    tracing::info!(
        "Account created successfully! ID: {}, Email: {}, Role: {}",
        user.id,
        user.email,
        user.role
    );
    Ok(user.id)
}
