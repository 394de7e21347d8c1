use auth::{
    async_trait, AuthError, Authenticator, ModelBackend, SocialBackend, SocialIdentity,
    SocialIdentityProvider, TokenSigner,
};
use axum::http::{header::AUTHORIZATION, HeaderValue};
use axum::Router;
use axum_test::TestServer;
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use model::entities::{application, tag};
use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};
use serde_json::{json, Value};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::router::create_router;
use crate::schemas::{ApiResponse, AppState};

/// GitHub code that [`FakeGithub`] accepts.
pub const GOOD_CODE: &str = "good-code";

/// Stands in for GitHub: one valid code, one fixed identity.
pub struct FakeGithub;

#[async_trait]
impl SocialIdentityProvider for FakeGithub {
    async fn resolve_code(&self, code: &str) -> Result<Option<SocialIdentity>, AuthError> {
        Ok((code == GOOD_CODE).then(|| SocialIdentity {
            provider_id: 1001,
            login: "octocat".to_string(),
            avatar_url: Some("https://avatars.example.com/octocat.png".to_string()),
        }))
    }
}

/// Create an in-memory SQLite database for testing
pub async fn setup_test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("Failed to connect to in-memory database");

    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");

    db
}

/// Create AppState for testing
pub async fn setup_test_app_state() -> AppState {
    AppState {
        db: setup_test_db().await,
        authenticator: Authenticator::new()
            .with_backend(ModelBackend)
            .with_backend(SocialBackend::new(FakeGithub)),
        signer: TokenSigner::new(
            b"integration_test_secret",
            chrono::Duration::minutes(5),
            chrono::Duration::days(1),
        ),
    }
}

/// Initialize tracing for tests with output to STDERR.
///
/// The log level comes from RUST_LOG and defaults to WARN.
fn init_test_tracing() -> tracing::subscriber::DefaultGuard {
    let log_level = std::env::var("RUST_LOG")
        .ok()
        .and_then(|level| level.parse::<Level>().ok())
        .unwrap_or(Level::WARN);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_default(subscriber)
}

/// Create axum app for testing
pub async fn setup_test_app() -> Router {
    let (router, _) = setup_test_app_with_state().await;
    router
}

/// Create axum app for testing, keeping a handle on its state for seeding data
pub async fn setup_test_app_with_state() -> (Router, AppState) {
    let _guard = init_test_tracing();

    let state = setup_test_app_state().await;
    (create_router(state.clone()), state)
}

pub async fn setup_test_server() -> (TestServer, AppState) {
    let (router, state) = setup_test_app_with_state().await;
    (TestServer::new(router).unwrap(), state)
}

pub fn bearer(token: &str) -> HeaderValue {
    HeaderValue::from_str(&format!("Bearer {token}")).unwrap()
}

/// Register `username` (password "s3cret") and sign in; returns (user id, access token).
pub async fn register_and_login(server: &TestServer, username: &str) -> (i32, String) {
    server
        .post("/api/v1/users")
        .json(&json!({
            "username": username,
            "password": "s3cret",
            "nickname": username,
        }))
        .await
        .assert_status(axum::http::StatusCode::CREATED);

    let response = server
        .post("/api/v1/token")
        .json(&json!({ "username": username, "password": "s3cret" }))
        .await;
    let body: ApiResponse<Value> = response.json();
    let user_id = body.data["user_id"].as_i64().unwrap() as i32;
    let access = body.data["access"].as_str().unwrap().to_string();
    (user_id, access)
}

pub async fn insert_tag(db: &DatabaseConnection, name: &str) {
    tag::ActiveModel {
        name: Set(name.to_string()),
    }
    .insert(db)
    .await
    .expect("Failed to insert tag");
}

pub async fn insert_application(
    db: &DatabaseConnection,
    team_id: i32,
    applicant_id: i32,
    status: application::ApplicationStatus,
) {
    application::ActiveModel {
        team_id: Set(team_id),
        applicant_id: Set(applicant_id),
        status: Set(status),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert application");
}

/// Create a team led by the owner of `token`; returns the team id.
pub async fn create_team(server: &TestServer, token: &str, tags: &[&str]) -> i32 {
    let response = server
        .post("/api/v1/teams")
        .add_header(AUTHORIZATION, bearer(token))
        .json(&json!({
            "title": "Rust study",
            "description": "Weekly reading group",
            "end_date": "2030-01-31",
            "max_personnel": 4,
            "chat_url": "https://chat.example.com/rust",
            "tags": tags,
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let body: ApiResponse<Value> = response.json();
    body.data["id"].as_i64().unwrap() as i32
}
