//! GitHub OAuth: turning an authorization code into a GitHub identity

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::error::{AuthError, Result};

const GITHUB_TOKEN_URL: &str = "https://github.com/login/oauth/access_token";
const GITHUB_API_URL: &str = "https://api.github.com";

/// Who an external provider says the user is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SocialIdentity {
    /// Stable numeric account id at the provider
    pub provider_id: i64,
    pub login: String,
    pub avatar_url: Option<String>,
}

/// Resolves one-time authorization codes issued by an external provider.
#[async_trait]
pub trait SocialIdentityProvider: Send + Sync {
    /// `Ok(None)` means the provider rejected the code.
    async fn resolve_code(&self, code: &str) -> Result<Option<SocialIdentity>>;
}

#[derive(Serialize)]
struct CodeExchangeRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    code: &'a str,
}

#[derive(Deserialize)]
struct CodeExchangeResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct GithubUser {
    id: i64,
    login: String,
    avatar_url: Option<String>,
}

/// GitHub OAuth app client.
#[derive(Debug, Clone)]
pub struct GithubProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: String,
    api_url: String,
}

impl GithubProvider {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            token_url: GITHUB_TOKEN_URL.to_string(),
            api_url: GITHUB_API_URL.to_string(),
        }
    }

    /// Point the client at another host, e.g. GitHub Enterprise.
    pub fn with_urls(mut self, token_url: impl Into<String>, api_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self.api_url = api_url.into();
        self
    }

    async fn exchange_code(&self, code: &str) -> Result<Option<String>> {
        let response: CodeExchangeResponse = self
            .client
            .post(&self.token_url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&CodeExchangeRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                code,
            })
            .send()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))?;

        if let Some(error) = response.error {
            warn!("GitHub rejected the authorization code: {}", error);
            return Ok(None);
        }
        Ok(response.access_token)
    }

    async fn fetch_user(&self, access_token: &str) -> Result<GithubUser> {
        self.client
            .get(format!("{}/user", self.api_url))
            .bearer_auth(access_token)
            .header(reqwest::header::USER_AGENT, "teamup")
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| AuthError::Provider(e.to_string()))?
            .json()
            .await
            .map_err(|e| AuthError::Provider(e.to_string()))
    }
}

#[async_trait]
impl SocialIdentityProvider for GithubProvider {
    #[instrument(skip_all)]
    async fn resolve_code(&self, code: &str) -> Result<Option<SocialIdentity>> {
        let Some(access_token) = self.exchange_code(code).await? else {
            return Ok(None);
        };

        let user = self.fetch_user(&access_token).await?;
        debug!("GitHub code resolved to {} ({})", user.login, user.id);

        Ok(Some(SocialIdentity {
            provider_id: user.id,
            login: user.login,
            avatar_url: user.avatar_url,
        }))
    }
}
