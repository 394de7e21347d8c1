use anyhow::Result;
use auth::{Authenticator, GithubProvider, ModelBackend, SocialBackend, TokenSigner};
use config::{Config, Environment, File};
use sea_orm::{Database, DatabaseConnection};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::schemas::AppState;

const DEVELOPMENT_SECRET: &str = "teamup-development-secret";

#[derive(Debug, Clone, Deserialize)]
pub struct JwtSettings {
    pub secret: String,
    pub access_lifetime_secs: i64,
    pub refresh_lifetime_secs: i64,
}

/// GitHub OAuth app credentials; sign-in with GitHub is off while empty.
#[derive(Debug, Clone, Deserialize)]
pub struct GithubSettings {
    pub client_id: String,
    pub client_secret: String,
}

impl GithubSettings {
    pub fn is_configured(&self) -> bool {
        !self.client_id.is_empty() && !self.client_secret.is_empty()
    }
}

/// Application settings.
///
/// Layered as: built-in defaults, then an optional `teamup.toml` in the working
/// directory, then `TEAMUP__*` environment variables (`TEAMUP__JWT__SECRET`
/// sets `jwt.secret`). A `.env` file is loaded first when present.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database_url: String,
    pub bind_address: String,
    pub jwt: JwtSettings,
    pub github: GithubSettings,
}

impl Settings {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let settings: Settings = Config::builder()
            .set_default("database_url", "sqlite://teamup.db?mode=rwc")?
            .set_default("bind_address", "0.0.0.0:3000")?
            .set_default("jwt.secret", DEVELOPMENT_SECRET)?
            .set_default("jwt.access_lifetime_secs", 300_i64)?
            .set_default("jwt.refresh_lifetime_secs", 86_400_i64)?
            .set_default("github.client_id", "")?
            .set_default("github.client_secret", "")?
            .add_source(File::with_name("teamup").required(false))
            .add_source(
                Environment::with_prefix("TEAMUP")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        if settings.jwt.secret == DEVELOPMENT_SECRET {
            warn!("Using the built-in development JWT secret; set TEAMUP__JWT__SECRET in production");
        }
        Ok(settings)
    }

    /// Replace values given on the command line.
    pub fn with_overrides(mut self, database_url: Option<String>, bind_address: Option<String>) -> Self {
        if let Some(database_url) = database_url {
            self.database_url = database_url;
        }
        if let Some(bind_address) = bind_address {
            self.bind_address = bind_address;
        }
        self
    }
}

/// Build application state around an open database connection
pub fn build_app_state(db: DatabaseConnection, settings: &Settings) -> AppState {
    let signer = TokenSigner::new(
        settings.jwt.secret.as_bytes(),
        chrono::Duration::seconds(settings.jwt.access_lifetime_secs),
        chrono::Duration::seconds(settings.jwt.refresh_lifetime_secs),
    );

    let mut authenticator = Authenticator::new().with_backend(ModelBackend);
    if settings.github.is_configured() {
        authenticator = authenticator.with_backend(SocialBackend::new(GithubProvider::new(
            settings.github.client_id.clone(),
            settings.github.client_secret.clone(),
        )));
    } else {
        debug!("GitHub client credentials not set, GitHub sign-in disabled");
    }
    debug!("Authentication backends: {:?}", authenticator);

    AppState {
        db,
        authenticator,
        signer,
    }
}

/// Initialize application state: connect to the database and build auth
pub async fn initialize_app_state(settings: &Settings) -> Result<AppState> {
    info!("Connecting to database: {}", settings.database_url);
    let db = Database::connect(&settings.database_url).await?;
    Ok(build_app_state(db, settings))
}
