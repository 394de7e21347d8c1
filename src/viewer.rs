//! Bearer-token authentication of incoming requests.

use auth::{IsSelfOrReadCreateOnly, ObjectPermission, RequestMethod};
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, Method},
};
use common::Viewer;
use model::entities::user;
use sea_orm::EntityTrait;
use tracing::{debug, trace, warn};

use crate::error::ApiError;
use crate::schemas::AppState;

/// The viewer of the current request.
///
/// No `Authorization` header means an anonymous viewer. A header that does not
/// carry a valid access token rejects the request, as does a token whose user
/// was deleted or deactivated.
#[derive(Debug, Clone, Copy)]
pub struct CurrentViewer(pub Viewer);

impl CurrentViewer {
    /// The authenticated user id, or 401 for anonymous viewers.
    pub fn require_user(&self) -> Result<i32, ApiError> {
        self.0.user_id().ok_or(ApiError::NotAuthenticated)
    }

    /// Object-level check for a resource owned by `owner_id`.
    pub fn authorize(&self, method: &Method, owner_id: i32) -> Result<(), ApiError> {
        let method = RequestMethod::from(method.as_str());
        if method.is_mutation() {
            self.require_user()?;
        }
        if IsSelfOrReadCreateOnly.has_object_permission(method, &self.0, owner_id) {
            Ok(())
        } else {
            debug!("Viewer {:?} may not {:?} resource of user {}", self.0, method, owner_id);
            Err(ApiError::PermissionDenied)
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentViewer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            trace!("No authorization header, anonymous viewer");
            return Ok(CurrentViewer(Viewer::Anonymous));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(ApiError::TokenNotValid)?;

        let claims = state.signer.verify_access(token.trim())?;
        let user = user::Entity::find_by_id(claims.user_id)
            .one(&state.db)
            .await?
            .ok_or_else(|| {
                warn!("Token for unknown user {}", claims.user_id);
                ApiError::UserNotFound
            })?;
        if !user.is_active {
            warn!("Token for inactive user {}", user.id);
            return Err(ApiError::UserInactive);
        }

        trace!("Authenticated viewer {}", user.id);
        Ok(CurrentViewer(Viewer::User(user.id)))
    }
}
