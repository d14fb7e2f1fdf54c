//! Authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;
use crate::error::AppError;

/// Errors that can occur during authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] night_market_core::EmailError),

    /// Invalid credentials (wrong password or user not found).
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Account exists but may not use this login portal.
    #[error("account cannot sign in here")]
    WrongPortal,

    /// User already exists.
    #[error("user already exists")]
    UserAlreadyExists,

    /// Password too weak or invalid.
    #[error("password validation failed: {0}")]
    WeakPassword(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

impl AuthError {
    /// Message shown on the login page.
    #[must_use]
    pub const fn login_message(&self) -> &'static str {
        match self {
            Self::InvalidEmail(_) | Self::InvalidCredentials => {
                "メールアドレスまたはパスワードが正しくありません"
            }
            Self::WrongPortal => "このアカウントはこのログイン画面から利用できません",
            _ => "ログインに失敗しました。しばらくしてから再度お試しください",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail(e) => Self::BadRequest(e.to_string()),
            AuthError::InvalidCredentials => Self::Unauthorized("Invalid credentials".to_string()),
            AuthError::WrongPortal => Self::Forbidden("Wrong login portal".to_string()),
            AuthError::UserAlreadyExists => Self::BadRequest("User already exists".to_string()),
            AuthError::WeakPassword(msg) => Self::BadRequest(msg),
            AuthError::Repository(e) => Self::Database(e),
            AuthError::PasswordHash => Self::Internal("password hashing failed".to_string()),
        }
    }
}
