//! Authentication and authorization for teamup: password hashing, signed
//! token pairs, pluggable credential backends and object-level permissions.

pub mod backend;
pub mod error;
pub mod github;
pub mod obtain;
pub mod password;
pub mod permission;
pub mod token;
pub mod users;

pub use backend::{AuthBackend, Authenticator, Credentials, ModelBackend, SocialBackend};
pub use error::AuthError;
pub use github::{GithubProvider, SocialIdentity, SocialIdentityProvider};
pub use obtain::{obtain_access_token, ObtainedToken};
pub use password::{hash_password, verify_password, PasswordError};
pub use permission::{IsSelfOrReadCreateOnly, ObjectPermission, RequestMethod};
pub use token::{RefreshToken, TokenClaims, TokenError, TokenSigner, TokenType};
pub use users::{create_user, NewUser};

// Re-export useful types
pub use async_trait::async_trait;
