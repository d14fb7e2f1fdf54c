//! Password authentication service.
//!
//! Every role signs in with email and password. Hashes are Argon2id PHC
//! strings.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use sqlx::PgPool;

use night_market_core::{Email, Role};

use crate::db::{RepositoryError, UserRepository};
use crate::models::User;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Login with email and password.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let Some((user, password_hash)) = self.users.get_with_password_hash(&email).await? else {
            // Burn comparable time so unknown emails are not distinguishable.
            let _ = hash_password(password);
            return Err(AuthError::InvalidCredentials);
        };

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Login through a role's portal.
    ///
    /// Admins may also sign in through the staff portal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WrongPortal` if the account's role does not match.
    pub async fn login_for_portal(
        &self,
        portal: Role,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let user = self.login(email, password).await?;
        if !portal_accepts(portal, user.role) {
            return Err(AuthError::WrongPortal);
        }
        Ok(user)
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the email is already registered.
    pub async fn register(
        &self,
        email: &str,
        name: Option<&str>,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        let user = self
            .users
            .create(&email, name, &password_hash, role)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
                other => AuthError::Repository(other),
            })?;

        tracing::info!(user_id = %user.id, role = %role, "Registered account");
        Ok(user)
    }

    /// Create the account, or reset its name, role and password if it exists.
    ///
    /// # Errors
    ///
    /// Same as [`Self::register`].
    pub async fn upsert(
        &self,
        email: &str,
        name: Option<&str>,
        password: &str,
        role: Role,
    ) -> Result<User, AuthError> {
        match self.register(email, name, password, role).await {
            Err(AuthError::UserAlreadyExists) => {
                let email = Email::parse(email)?;
                let password_hash = hash_password(password)?;
                Ok(self
                    .users
                    .reset_credentials(&email, name, &password_hash, role)
                    .await?)
            }
            other => other,
        }
    }
}

/// Whether an account with `role` may sign in through `portal`'s login page.
#[must_use]
pub fn portal_accepts(portal: Role, role: Role) -> bool {
    portal == role || (portal == Role::Staff && role == Role::Admin)
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` if the password is too short.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` on mismatch or an unreadable hash.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("password123").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("password123", &hash).is_ok());
        assert!(matches!(
            verify_password("password124", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_unreadable_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("password123", "$2b$10$legacybcrypthash"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password("short").is_err());
        assert!(validate_password("exactly8").is_ok());
        // Counted in characters, not bytes.
        assert!(validate_password("ひみつのあいことば").is_ok());
        assert!(validate_password("ひみつ").is_err());
    }

    #[test]
    fn test_portal_accepts() {
        assert!(portal_accepts(Role::User, Role::User));
        assert!(portal_accepts(Role::Staff, Role::Staff));
        assert!(portal_accepts(Role::Staff, Role::Admin));
        assert!(portal_accepts(Role::Admin, Role::Admin));
        assert!(!portal_accepts(Role::Admin, Role::Staff));
        assert!(!portal_accepts(Role::User, Role::Admin));
        assert!(!portal_accepts(Role::Staff, Role::User));
    }

    #[test]
    fn test_login_messages_do_not_leak_account_existence() {
        assert_eq!(
            AuthError::InvalidCredentials.login_message(),
            AuthError::InvalidEmail(night_market_core::EmailError::Empty).login_message()
        );
    }
}
