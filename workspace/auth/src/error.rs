use thiserror::Error;

use crate::password::PasswordError;
use crate::token::TokenError;

/// Error types for credential resolution and account management
#[derive(Error, Debug)]
pub enum AuthError {
    /// No active user matches the given credentials
    #[error("No active account found with the given credentials")]
    AuthenticationFailed,

    /// A user with this username already exists
    #[error("A user with username '{0}' already exists")]
    UsernameTaken(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error(transparent)]
    Password(#[from] PasswordError),

    #[error(transparent)]
    Token(#[from] TokenError),

    /// The external identity provider could not be reached or answered garbage
    #[error("Identity provider error: {0}")]
    Provider(String),
}

/// Type alias for Result with AuthError
pub type Result<T> = std::result::Result<T, AuthError>;
