use std::borrow::Cow;

use auth::{create_user, hash_password, users::username_exists, NewUser};
use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::Json,
};
use common::UserView;
use model::entities::user;
use projection::user_view;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::error::ApiError;
use crate::extract::ApiJson;
use crate::schemas::{ApiResponse, AppState};
use crate::viewer::CurrentViewer;

fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_alphanumeric() || "@.+-_".contains(c))
    {
        return Ok(());
    }
    let mut error = ValidationError::new("username");
    error.message = Some(Cow::Borrowed(
        "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
    ));
    Err(error)
}

/// Request body for registering a new user
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct RegisterRequest {
    /// Username (must be unique, up to 150 letters, digits and @/./+/-/_)
    #[validate(
        length(min = 1, max = 150, message = "Ensure this field has between 1 and 150 characters."),
        custom(function = "validate_username")
    )]
    pub username: String,
    /// Plain-text password, stored hashed
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: String,
    pub nickname: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub introduction: Option<String>,
    /// URL of an already uploaded profile image
    #[validate(url(message = "Enter a valid URL."))]
    pub upload_image: Option<String>,
}

/// Request body for replacing a user's profile
#[derive(Debug, Deserialize, Serialize, ToSchema, Validate)]
pub struct UpdateUserRequest {
    #[validate(
        length(min = 1, max = 150, message = "Ensure this field has between 1 and 150 characters."),
        custom(function = "validate_username")
    )]
    pub username: String,
    /// New password; the current one is kept when omitted
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: Option<String>,
    pub nickname: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub introduction: Option<String>,
    #[validate(url(message = "Enter a valid URL."))]
    pub upload_image: Option<String>,
}

/// Request body for changing some fields of a user's profile
#[derive(Debug, Default, Deserialize, Serialize, ToSchema, Validate)]
pub struct PatchUserRequest {
    #[validate(
        length(min = 1, max = 150, message = "Ensure this field has between 1 and 150 characters."),
        custom(function = "validate_username")
    )]
    pub username: Option<String>,
    #[validate(length(min = 1, message = "This field may not be blank."))]
    pub password: Option<String>,
    pub nickname: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email: Option<String>,
    pub introduction: Option<String>,
    #[validate(url(message = "Enter a valid URL."))]
    pub upload_image: Option<String>,
}

impl From<UpdateUserRequest> for PatchUserRequest {
    /// A full update is a patch that touches every field.
    fn from(request: UpdateUserRequest) -> Self {
        Self {
            username: Some(request.username),
            password: request.password,
            nickname: request.nickname,
            email: request.email,
            introduction: request.introduction,
            upload_image: request.upload_image,
        }
    }
}

async fn find_user(state: &AppState, user_id: i32) -> Result<user::Model, ApiError> {
    user::Entity::find_by_id(user_id)
        .one(&state.db)
        .await?
        .ok_or(ApiError::NotFound("User"))
}

/// Write `changes` onto `user`. `replace` also clears optional fields left out.
async fn apply_changes(
    state: &AppState,
    user: user::Model,
    changes: PatchUserRequest,
    replace: bool,
) -> Result<user::Model, ApiError> {
    if let Some(username) = changes.username.as_deref() {
        if username != user.username && username_exists(&state.db, username).await? {
            return Err(ApiError::field("username", "A user with that username already exists."));
        }
    }

    let mut active: user::ActiveModel = user.into();
    if let Some(username) = changes.username {
        active.username = Set(username);
    }
    if let Some(password) = changes.password.as_deref() {
        let hashed = hash_password(password).map_err(|e| ApiError::Internal(e.to_string()))?;
        active.password = Set(Some(hashed));
    }
    if replace || changes.nickname.is_some() {
        active.nickname = Set(changes.nickname);
    }
    if replace || changes.email.is_some() {
        active.email = Set(changes.email);
    }
    if replace || changes.introduction.is_some() {
        active.introduction = Set(changes.introduction);
    }
    if replace || changes.upload_image.is_some() {
        active.image = Set(changes.upload_image);
    }

    Ok(active.update(&state.db).await?)
}

/// Register a new user
#[utoipa::path(
    post,
    path = "/api/v1/users",
    tag = "users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created successfully", body = crate::schemas::UserApiResponse),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 500, description = "Internal server error", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state, request), fields(username = %request.username))]
pub async fn register_user(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<UserView>>), ApiError> {
    request.validate()?;

    let created = create_user(
        &state.db,
        NewUser {
            username: request.username,
            password: Some(request.password),
            nickname: request.nickname,
            email: request.email,
            introduction: request.introduction,
            image: request.upload_image,
            ..Default::default()
        },
    )
    .await?;

    info!("User registered with ID: {}", created.id);
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(user_view(&created), "User created successfully")),
    ))
}

/// Get a specific user by ID
#[utoipa::path(
    get,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User retrieved successfully", body = crate::schemas::UserApiResponse),
        (status = 404, description = "User not found", body = crate::schemas::ErrorResponse)
    )
)]
#[instrument(skip(state))]
pub async fn get_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = find_user(&state, user_id).await?;
    debug!("Retrieved user {}", user.username);
    Ok(Json(ApiResponse::ok(user_view(&user), "User retrieved successfully")))
}

/// Replace the profile of the authenticated user
#[utoipa::path(
    put,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    request_body = UpdateUserRequest,
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User updated successfully", body = crate::schemas::UserApiResponse),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not the owner of this profile", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User not found", body = crate::schemas::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[instrument(skip(state, request))]
pub async fn update_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    viewer: CurrentViewer,
    method: Method,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = find_user(&state, user_id).await?;
    viewer.authorize(&method, user.id)?;
    request.validate()?;

    let updated = apply_changes(&state, user, request.into(), true).await?;
    info!("User {} updated their profile", updated.id);
    Ok(Json(ApiResponse::ok(user_view(&updated), "User updated successfully")))
}

/// Change some fields of the authenticated user's profile
#[utoipa::path(
    patch,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    request_body = PatchUserRequest,
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User updated successfully", body = crate::schemas::UserApiResponse),
        (status = 400, description = "Invalid request", body = crate::schemas::ErrorResponse),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not the owner of this profile", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User not found", body = crate::schemas::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[instrument(skip(state, request))]
pub async fn patch_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    viewer: CurrentViewer,
    method: Method,
    ApiJson(request): ApiJson<PatchUserRequest>,
) -> Result<Json<ApiResponse<UserView>>, ApiError> {
    let user = find_user(&state, user_id).await?;
    viewer.authorize(&method, user.id)?;
    request.validate()?;

    let updated = apply_changes(&state, user, request, false).await?;
    info!("User {} patched their profile", updated.id);
    Ok(Json(ApiResponse::ok(user_view(&updated), "User updated successfully")))
}

/// Delete the authenticated user's account
#[utoipa::path(
    delete,
    path = "/api/v1/users/{user_id}",
    tag = "users",
    params(
        ("user_id" = i32, Path, description = "User ID"),
    ),
    responses(
        (status = 200, description = "User deleted successfully", body = crate::schemas::MessageApiResponse),
        (status = 401, description = "Not authenticated", body = crate::schemas::ErrorResponse),
        (status = 403, description = "Not the owner of this profile", body = crate::schemas::ErrorResponse),
        (status = 404, description = "User not found", body = crate::schemas::ErrorResponse)
    ),
    security(("bearer" = []))
)]
#[instrument(skip(state))]
pub async fn delete_user(
    Path(user_id): Path<i32>,
    State(state): State<AppState>,
    viewer: CurrentViewer,
    method: Method,
) -> Result<Json<ApiResponse<String>>, ApiError> {
    let user = find_user(&state, user_id).await?;
    viewer.authorize(&method, user.id)?;

    user::Entity::delete_by_id(user.id).exec(&state.db).await?;
    warn!("User {} deleted their account", user.id);
    Ok(Json(ApiResponse::ok(
        format!("User {} deleted", user.id),
        "User deleted successfully",
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            username: username.to_string(),
            password: "s3cret".to_string(),
            nickname: None,
            email: email.map(str::to_string),
            introduction: None,
            upload_image: None,
        }
    }

    #[test]
    fn test_username_characters() {
        assert!(register("alice.b+c-d_e@x", None).validate().is_ok());
        assert!(register("with space", None).validate().is_err());
        assert!(register("", None).validate().is_err());
        assert!(register(&"a".repeat(151), None).validate().is_err());
    }

    #[test]
    fn test_email_must_be_well_formed() {
        assert!(register("alice", Some("alice@example.com")).validate().is_ok());
        let errors = register("alice", Some("not-an-email")).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_put_clears_omitted_fields_as_patch() {
        let patch = PatchUserRequest::from(UpdateUserRequest {
            username: "alice".to_string(),
            password: None,
            nickname: None,
            email: Some("alice@example.com".to_string()),
            introduction: None,
            upload_image: None,
        });
        assert_eq!(patch.username.as_deref(), Some("alice"));
        assert!(patch.password.is_none());
        assert_eq!(patch.email.as_deref(), Some("alice@example.com"));
    }
}
