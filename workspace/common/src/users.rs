use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public profile of a user. The password is never part of it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct UserView {
    pub id: i32,
    pub username: String,
    pub nickname: Option<String>,
    pub email: Option<String>,
    pub introduction: Option<String>,
    /// Profile image URL
    pub image: Option<String>,
    /// Whether the account was created through GitHub sign-in
    pub is_github_authenticated: bool,
}

/// Compact user reference embedded in teams and comments.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct TeammateView {
    pub id: i32,
    pub username: String,
    pub nickname: Option<String>,
    pub image: Option<String>,
}
