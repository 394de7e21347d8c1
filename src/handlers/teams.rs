use std::collections::{BTreeSet, HashMap};

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::Json,
};
use chrono::{NaiveDate, Utc};
use common::{TeamApplicationStatusView, TeamDetailView, TeamListView};
use model::entities::{application, tag, team, team_like, team_tag};
use projection::TeamProjector;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter,
    DbErr, QueryOrder, Set, SqlErr, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, trace, warn};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::error::ApiError;
use crate::extract::{ApiJson, ValidQuery};
use crate::schemas::{ApiResponse, AppState};
use crate::viewer::CurrentViewer;

/// Query parameters for listing teams
#[derive(Debug, Deserialize, ToSchema, IntoParams, Validate)]
pub struct TeamListQuery {
    /// Page number (default: 1)
    #[validate(range(min = 1, message = "Ensure this value is greater than or equal to 1."))]
    pub page: Option<u64>,
    /// Page size (default: 20)
    #[validate(range(min = 1, max = 100, message = "Ensure this value is between 1 and 100."))]
    pub limit: Option<u64>,
}

/// Request body for creating or replacing a team
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct TeamRequest {
    #[validate(length(min = 1, max = 100, message = "Ensure this field has between 1 and 100 characters."))]
    pub title: String,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub description: String,
    /// Last day of recruiting (YYYY-MM-DD)
    pub end_date: NaiveDate,
    /// Cover image URL
    #[validate(url(message = "Enter a valid URL."))]
    pub image: Option<String>,
    #[validate(range(min = 1, max = 100, message = "Ensure this value is between 1 and 100."))]
    pub max_personnel: i32,
    /// Group chat link, shown only to the leader and approved applicants
    #[validate(url(message = "Enter a valid URL."))]
    pub chat_url: String,
    /// Names of existing tags
    #[serde(default)]
    pub tags: Vec<String>,
}

async fn find_team(state: &AppState, team_id: i32) -> Result<team::Model, ApiError> {
    team::Entity::find_by_id(team_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("Team"))
}

/// Every requested tag must already exist.
async fn existing_tags(state: &AppState, names: &[String]) -> Result<BTreeSet<String>, ApiError> {
    let requested: BTreeSet<String> = names.iter().cloned().collect();
    if requested.is_empty() {
        return Ok(requested);
    }

    let found: BTreeSet<String> = tag::Entity::find()
        .filter(tag::Column::Name.is_in(requested.iter().cloned()))
        .all(&state.db)
        .await?
        .into_iter()
        .map(|t| t.name)
        .collect();

    match requested.difference(&found).next() {
        Some(missing) => {
            warn!("Unknown tag requested: {}", missing);
            Err(ApiError::field(
                "tags",
                format!("Invalid pk \"{missing}\" - object does not exist."),
            ))
        }
        None => Ok(requested),
    }
}

async fn replace_tags<C: ConnectionTrait>(
    conn: &C,
    team_id: i32,
    tags: BTreeSet<String>,
) -> Result<(), ApiError> {
    team_tag::Entity::delete_many()
        .filter(team_tag::Column::TeamId.eq(team_id))
        .exec(conn)
        .await?;

    if tags.is_empty() {
        return Ok(());
    }
    let rows = tags.into_iter().map(|tag_name| team_tag::ActiveModel {
        team_id: Set(team_id),
        tag_name: Set(tag_name),
    });
    team_tag::Entity::insert_many(rows)
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// List teams, newest first
#[utoipa::path(
    get,
    path = "/api/v1/teams",
    tag = "teams",
    params(TeamListQuery),
    responses(
        (status = 200, description = "Teams retrieved successfully", body = crate::schemas::TeamListApiResponse),
        (status = 400, description = "Invalid paging parameters", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_teams(
    ValidQuery(query): ValidQuery<TeamListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TeamListView>>>, ApiError> {
    let page = query.page.unwrap_or(1);
    let limit = query.limit.unwrap_or(20);
    debug!("Fetching teams - page: {}, limit: {}", page, limit);

    let teams = team::Entity::find()
        .order_by_desc(team::Column::CreatedAt)
        .order_by_desc(team::Column::Id)
        .paginate(&state.db, limit)
        .fetch_page(page - 1)
        .await?;

    let views = TeamProjector::new(&state.db).list_views(&teams).await?;
    info!("Successfully retrieved {} teams", views.len());
    Ok(Json(ApiResponse::ok(views, "Teams retrieved successfully")))
}

/// Teams the authenticated user applied to, with the application status
#[utoipa::path(
    get,
    path = "/api/v1/teams/applied",
    tag = "teams",
    responses(
        (status = 200, description = "Applied teams retrieved successfully", body = crate::schemas::TeamApplicationStatusApiResponse),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[instrument(skip(state))]
pub async fn get_applied_teams(
    State(state): State<AppState>,
    viewer: CurrentViewer,
) -> Result<Json<ApiResponse<Vec<TeamApplicationStatusView>>>, ApiError> {
    let user_id = viewer.require_user()?;

    let applications = application::Entity::find()
        .filter(application::Column::ApplicantId.eq(user_id))
        .order_by_desc(application::Column::CreatedAt)
        .all(&state.db)
        .await?;
    let teams = team::Entity::find()
        .filter(team::Column::Id.is_in(applications.iter().map(|a| a.team_id)))
        .all(&state.db)
        .await?;
    trace!("User {} applied to {} teams", user_id, teams.len());

    let mut by_id: HashMap<i32, team::Model> = teams.into_iter().map(|t| (t.id, t)).collect();
    let teams: Vec<team::Model> = applications
        .iter()
        .filter_map(|application| by_id.remove(&application.team_id))
        .collect();
    let views = TeamProjector::new(&state.db)
        .application_status_views(&teams, &viewer.0)
        .await?;

    Ok(Json(ApiResponse::ok(views, "Applied teams retrieved successfully")))
}

/// Get a team as seen by the requester
#[utoipa::path(
    get,
    path = "/api/v1/teams/{team_id}",
    tag = "teams",
    params(
        ("team_id" = i32, Path, description = "Team ID"),
    ),
    responses(
        (status = 200, description = "Team retrieved successfully", body = crate::schemas::TeamDetailApiResponse),
        (status = 404, description = "Team not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_team(
    Path(team_id): Path<i32>,
    State(state): State<AppState>,
    viewer: CurrentViewer,
) -> Result<Json<ApiResponse<TeamDetailView>>, ApiError> {
    let team = find_team(&state, team_id).await?;
    let view = TeamProjector::new(&state.db).detail_view(&team, &viewer.0).await?;
    Ok(Json(ApiResponse::ok(view, "Team retrieved successfully")))
}

/// Create a team led by the requester
#[utoipa::path(
    post,
    path = "/api/v1/teams",
    tag = "teams",
    request_body = TeamRequest,
    responses(
        (status = 201, description = "Team created successfully", body = crate::schemas::TeamDetailApiResponse),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[instrument(skip(state, request))]
pub async fn create_team(
    State(state): State<AppState>,
    viewer: CurrentViewer,
    ApiJson(request): ApiJson<TeamRequest>,
) -> Result<(StatusCode, Json<ApiResponse<TeamDetailView>>), ApiError> {
    let leader_id = viewer.require_user()?;
    request.validate()?;
    let tags = existing_tags(&state, &request.tags).await?;

    let now = Utc::now();
    let txn = state.db.begin().await?;
    let team = team::ActiveModel {
        leader_id: Set(leader_id),
        title: Set(request.title),
        description: Set(request.description),
        end_date: Set(request.end_date),
        image: Set(request.image),
        max_personnel: Set(request.max_personnel),
        current_personnel: Set(1),
        chat_url: Set(request.chat_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    replace_tags(&txn, team.id, tags).await?;
    txn.commit().await?;

    info!("User {} created team {}", leader_id, team.id);
    let view = TeamProjector::new(&state.db).detail_view(&team, &viewer.0).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(view, "Team created successfully")),
    ))
}

/// Replace a team; leader only
#[utoipa::path(
    put,
    path = "/api/v1/teams/{team_id}",
    tag = "teams",
    request_body = TeamRequest,
    params(
        ("team_id" = i32, Path, description = "Team ID"),
    ),
    responses(
        (status = 200, description = "Team updated successfully", body = crate::schemas::TeamDetailApiResponse),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not the team leader", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Team not found", body = crate::schemas::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[instrument(skip(state, request))]
pub async fn update_team(
    Path(team_id): Path<i32>,
    State(state): State<AppState>,
    viewer: CurrentViewer,
    method: Method,
    ApiJson(request): ApiJson<TeamRequest>,
) -> Result<Json<ApiResponse<TeamDetailView>>, ApiError> {
    let team = find_team(&state, team_id).await?;
    viewer.authorize(&method, team.leader_id)?;
    request.validate()?;
    let tags = existing_tags(&state, &request.tags).await?;

    let txn = state.db.begin().await?;
    let mut active: team::ActiveModel = team.into();
    active.title = Set(request.title);
    active.description = Set(request.description);
    active.end_date = Set(request.end_date);
    active.image = Set(request.image);
    active.max_personnel = Set(request.max_personnel);
    active.chat_url = Set(request.chat_url);
    active.updated_at = Set(Utc::now());
    let team = active.update(&txn).await?;
    replace_tags(&txn, team.id, tags).await?;
    txn.commit().await?;

    info!("Team {} updated", team.id);
    let view = TeamProjector::new(&state.db).detail_view(&team, &viewer.0).await?;
    Ok(Json(ApiResponse::ok(view, "Team updated successfully")))
}

/// Delete a team; leader only
#[utoipa::path(
    delete,
    path = "/api/v1/teams/{team_id}",
    tag = "teams",
    params(
        ("team_id" = i32, Path, description = "Team ID"),
    ),
    responses(
        (status = 200, description = "Team deleted successfully", body = crate::schemas::MessageApiResponse),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not the team leader", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Team not found", body = crate::schemas::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[instrument(skip(state))]
pub async fn delete_team(
    Path(team_id): Path<i32>,
    State(state): State<AppState>,
    viewer: CurrentViewer,
    method: Method,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let team = find_team(&state, team_id).await?;
    viewer.authorize(&method, team.leader_id)?;

    team::Entity::delete_by_id(team.id).exec(&state.db).await?;
    info!("Team {} deleted", team.id);
    Ok(Json(ApiResponse::ok(
        format!("Team {} deleted", team.id),
        "Team deleted successfully",
    )))
}

/// A concurrent request already inserted the same row.
fn is_duplicate(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Like a team, or take the like back
#[utoipa::path(
    post,
    path = "/api/v1/teams/{team_id}/like",
    tag = "teams",
    params(
        ("team_id" = i32, Path, description = "Team ID"),
    ),
    responses(
        (status = 200, description = "Like toggled", body = crate::schemas::TeamDetailApiResponse),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse),
        (status = 404, description = "Team not found", body = crate::schemas::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[instrument(skip(state))]
pub async fn toggle_like(
    Path(team_id): Path<i32>,
    State(state): State<AppState>,
    viewer: CurrentViewer,
) -> Result<Json<ApiResponse<TeamDetailView>>, ApiError> {
    let user_id = viewer.require_user()?;
    let team = find_team(&state, team_id).await?;

    let existing = team_like::Entity::find_by_id((team.id, user_id))
        .one(&state.db)
        .await?;
    let message = match existing {
        Some(_) => {
            team_like::Entity::delete_by_id((team.id, user_id))
                .exec(&state.db)
                .await?;
            "Team unliked successfully"
        }
        None => {
            let inserted = team_like::Entity::insert(team_like::ActiveModel {
                team_id: Set(team.id),
                user_id: Set(user_id),
            })
            .exec_without_returning(&state.db)
            .await;
            match inserted {
                Ok(_) => {}
                Err(err) if is_duplicate(&err) => {
                    trace!("Team {} already liked by user {}", team.id, user_id)
                }
                Err(err) => return Err(err.into()),
            }
            "Team liked successfully"
        }
    };
    debug!("User {}: {}", user_id, message);

    let view = TeamProjector::new(&state.db).detail_view(&team, &viewer.0).await?;
    Ok(Json(ApiResponse::ok(view, message)))
}
