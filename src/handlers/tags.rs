use axum::{extract::State, response::Json};
use model::entities::tag;
use sea_orm::{EntityTrait, QueryOrder};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::schemas::{ApiResponse, AppState};

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TagResponse {
    /// Tag name, also used to attach the tag to a team
    pub name: String,
}

impl From<tag::Model> for TagResponse {
    fn from(model: tag::Model) -> Self {
        Self { name: model.name }
    }
}

/// Get all tags
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    tag = "tags",
    responses(
        (status = 200, description = "List of all tags", body = crate::schemas::TagListApiResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_tags(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<TagResponse>>>, ApiError> {
    let tags: Vec<TagResponse> = tag::Entity::find()
        .order_by_asc(tag::Column::Name)
        .all(&state.db)
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();

    debug!("Fetched {} tags", tags.len());
    Ok(Json(ApiResponse::ok(tags, "Tags retrieved successfully")))
}
