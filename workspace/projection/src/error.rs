use thiserror::Error;

/// Error types for the projection module
#[derive(Error, Debug)]
pub enum ProjectionError {
    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// A row points at a user that does not exist
    #[error("User {0} referenced by a team or comment does not exist")]
    MissingUser(i32),
}

/// Type alias for Result with ProjectionError
pub type Result<T> = std::result::Result<T, ProjectionError>;
