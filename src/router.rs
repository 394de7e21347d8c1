use crate::handlers::{
    comments::create_comment,
    health::health_check,
    tags::get_tags,
    teams::{create_team, delete_team, get_applied_teams, get_team, get_teams, toggle_like, update_team},
    token::obtain_token,
    users::{delete_user, get_user, patch_user, register_user, update_user},
};
use crate::schemas::{ApiDoc, AppState};
use axum::{
    routing::{get, post},
    Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Create application router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Token issuance
        .route("/api/v1/token", post(obtain_token))
        // Registration and self-service profile
        .route("/api/v1/users", post(register_user))
        .route(
            "/api/v1/users/:user_id",
            get(get_user).put(update_user).patch(patch_user).delete(delete_user),
        )
        // Teams
        .route("/api/v1/teams", get(get_teams).post(create_team))
        .route("/api/v1/teams/applied", get(get_applied_teams))
        .route(
            "/api/v1/teams/:team_id",
            get(get_team).put(update_team).delete(delete_team),
        )
        .route("/api/v1/teams/:team_id/like", post(toggle_like))
        .route("/api/v1/teams/:team_id/comments", post(create_comment))
        // Tags
        .route("/api/v1/tags", get(get_tags))
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(Duration::from_secs(30)))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
