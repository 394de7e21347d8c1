use std::collections::HashMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use common::CommentView;
use model::entities::{comment, team, user};
use projection::{comments::comment_view, teammate_view};
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::schemas::{ApiResponse, AppState};
use crate::viewer::CurrentViewer;

/// Request body for commenting on a team
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct CreateCommentRequest {
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub body: String,
    /// Comment being replied to; must belong to the same team
    pub parent: Option<i32>,
}

/// Comment on a team, optionally as a reply
#[utoipa::path(
    post,
    path = "/api/v1/teams/{team_id}/comments",
    tag = "comments",
    request_body = CreateCommentRequest,
    params(
        ("team_id" = i32, Path, description = "Team ID"),
    ),
    responses(
        (status = 201, description = "Comment created successfully", body = crate::schemas::CommentApiResponse),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Team not found", body = crate::schemas::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[instrument(skip(state, request))]
pub async fn create_comment(
    Path(team_id): Path<i32>,
    State(state): State<AppState>,
    viewer: CurrentViewer,
    ApiJson(request): ApiJson<CreateCommentRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CommentView>>), ApiError> {
    let author_id = viewer.require_user()?;
    let team = team::Entity::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Team"))?;
    request.validate()?;

    if let Some(parent_id) = request.parent {
        let parent = comment::Entity::find_by_id(parent_id).one(&state.db).await?;
        if parent.map(|p| p.team_id) != Some(team.id) {
            warn!("Comment {} is not a comment of team {}", parent_id, team.id);
            return Err(ApiError::field(
                "parent",
                "Parent comment must belong to the same team.",
            ));
        }
    }

    let author = user::Entity::find_by_id(author_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("User"))?;

    let now = Utc::now();
    let created = comment::ActiveModel {
        team_id: Set(team.id),
        author_id: Set(author.id),
        parent_id: Set(request.parent),
        body: Set(request.body),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&state.db)
    .await?;
    info!("User {} commented on team {}", author.id, team.id);

    let authors = HashMap::from([(author.id, teammate_view(&author))]);
    let view = comment_view(&created, &[], &authors)?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view, "Comment created successfully")),
    ))
}
