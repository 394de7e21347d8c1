use std::collections::HashMap;

use auth::{Authenticator, TokenSigner};
use common::{
    ChildCommentView, CommentView, TeamApplicationStatusView, TeamDetailView, TeamListView,
    TeammateView, UserView,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi, ToSchema,
};

use crate::handlers::{
    comments::CreateCommentRequest,
    tags::TagResponse,
    teams::{TeamListQuery, TeamRequest},
    token::{TokenRequest, TokenResponse},
    users::{PatchUserRequest, RegisterRequest, UpdateUserRequest},
};

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Database connection
    pub db: DatabaseConnection,
    /// Backends tried in order when a client asks for a token
    pub authenticator: Authenticator,
    /// Signs and verifies bearer tokens
    pub signer: TokenSigner,
}

/// API response wrapper
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[aliases(
    TokenApiResponse = ApiResponse<TokenResponse>,
    UserApiResponse = ApiResponse<UserView>,
    TeamDetailApiResponse = ApiResponse<TeamDetailView>,
    TeamListApiResponse = ApiResponse<Vec<TeamListView>>,
    TeamApplicationStatusApiResponse = ApiResponse<Vec<TeamApplicationStatusView>>,
    CommentApiResponse = ApiResponse<CommentView>,
    TagListApiResponse = ApiResponse<Vec<TagResponse>>,
    MessageApiResponse = ApiResponse<String>,
)]
pub struct ApiResponse<T> {
    /// Response data
    pub data: T,
    /// Response message
    pub message: String,
    /// Success status
    pub success: bool,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            message: message.into(),
            success: true,
        }
    }
}

/// Error response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code
    pub code: String,
    /// Success status (always false for errors)
    pub success: bool,
    /// Per-field validation messages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<HashMap<String, Vec<String>>>,
}

/// Health check response
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Service version
    pub version: String,
    /// Database connection status
    pub database: String,
}

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::health::health_check,
        crate::handlers::token::obtain_token,
        crate::handlers::users::register_user,
        crate::handlers::users::get_user,
        crate::handlers::users::update_user,
        crate::handlers::users::patch_user,
        crate::handlers::users::delete_user,
        crate::handlers::teams::get_teams,
        crate::handlers::teams::get_applied_teams,
        crate::handlers::teams::get_team,
        crate::handlers::teams::create_team,
        crate::handlers::teams::update_team,
        crate::handlers::teams::delete_team,
        crate::handlers::teams::toggle_like,
        crate::handlers::comments::create_comment,
        crate::handlers::tags::get_tags,
    ),
    components(
        schemas(
            TokenApiResponse,
            UserApiResponse,
            TeamDetailApiResponse,
            TeamListApiResponse,
            TeamApplicationStatusApiResponse,
            CommentApiResponse,
            TagListApiResponse,
            MessageApiResponse,
            ErrorResponse,
            HealthResponse,
            TokenRequest,
            TokenResponse,
            RegisterRequest,
            UpdateUserRequest,
            PatchUserRequest,
            TeamRequest,
            TeamListQuery,
            CreateCommentRequest,
            TagResponse,
            UserView,
            TeammateView,
            TeamListView,
            TeamDetailView,
            TeamApplicationStatusView,
            CommentView,
            ChildCommentView,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Token issuance"),
        (name = "users", description = "Registration and self-service profile endpoints"),
        (name = "teams", description = "Team endpoints with per-viewer fields"),
        (name = "comments", description = "Team comment endpoints"),
        (name = "tags", description = "Tag endpoints"),
    ),
    info(
        title = "Teamup API",
        description = "Team recruiting backend: accounts, teams, comments and applications",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    )
)]
pub struct ApiDoc;
