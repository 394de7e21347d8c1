use auth::{obtain_access_token, Credentials, ObtainedToken};
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::schemas::{ApiResponse, AppState};

/// Sign-in request. Send either `username` and `password`, or a GitHub `code`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    /// GitHub OAuth authorization code
    pub code: Option<String>,
}

impl From<TokenRequest> for Credentials {
    fn from(request: TokenRequest) -> Self {
        Credentials {
            username: request.username,
            password: request.password,
            code: request.code,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Bearer access token
    pub access: String,
    pub user_id: i32,
    pub username: String,
    /// The user still has to fill in a nickname or an email
    pub is_new: bool,
}

impl From<ObtainedToken> for TokenResponse {
    fn from(token: ObtainedToken) -> Self {
        Self {
            access: token.access,
            user_id: token.user_id,
            username: token.username,
            is_new: token.is_new,
        }
    }
}

/// Obtain an access token
#[utoipa::path(
    post,
    path = "/api/v1/token",
    tag = "auth",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = crate::schemas::TokenApiResponse),
        (status = 401, description = "No active account found with the given credentials", body = crate::schemas::ErrorResponse),
        (status = 502, description = "Identity provider unreachable", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = ?request.username, with_code = request.code.is_some()))]
pub async fn obtain_token(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<TokenRequest>,
) -> Result<Json<ApiResponse<TokenResponse>>, ApiError> {
    debug!("Token requested");
    let credentials = Credentials::from(request);

    let obtained =
        obtain_access_token(&state.authenticator, &state.signer, &state.db, &credentials).await?;

    info!("Token issued for user {}", obtained.user_id);
    Ok(Json(ApiResponse::ok(
        TokenResponse::from(obtained),
        "Token issued successfully",
    )))
}
