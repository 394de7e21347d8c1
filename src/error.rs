use std::collections::HashMap;

use auth::{AuthError, TokenError};
use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use axum_valid::{ValidRejection, ValidationRejection};
use projection::ProjectionError;
use sea_orm::DbErr;
use thiserror::Error;
use tracing::{error, warn};
use validator::ValidationErrors;

use crate::schemas::ErrorResponse;

/// Everything a handler can fail with, mapped onto one HTTP error body.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("No active account found with the given credentials")]
    AuthenticationFailed,

    #[error("Authentication credentials were not provided")]
    NotAuthenticated,

    #[error("Given token not valid for any token type")]
    TokenNotValid,

    #[error("User not found")]
    UserNotFound,

    #[error("User is inactive")]
    UserInactive,

    #[error("You do not have permission to perform this action")]
    PermissionDenied,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid input")]
    Validation(HashMap<String, Vec<String>>),

    #[error("Identity provider error: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Validation failure on a single field.
    pub fn field(field: &str, message: impl Into<String>) -> Self {
        ApiError::Validation(HashMap::from([(field.to_string(), vec![message.into()])]))
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::AuthenticationFailed => (StatusCode::UNAUTHORIZED, "no_active_account"),
            ApiError::NotAuthenticated => (StatusCode::UNAUTHORIZED, "not_authenticated"),
            ApiError::TokenNotValid => (StatusCode::UNAUTHORIZED, "token_not_valid"),
            ApiError::UserNotFound => (StatusCode::UNAUTHORIZED, "user_not_found"),
            ApiError::UserInactive => (StatusCode::UNAUTHORIZED, "user_inactive"),
            ApiError::PermissionDenied => (StatusCode::FORBIDDEN, "permission_denied"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid"),
            ApiError::Provider(_) => (StatusCode::BAD_GATEWAY, "identity_provider_error"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let error = match &self {
            ApiError::Internal(detail) => {
                error!("Internal error: {}", detail);
                "Internal server error".to_string()
            }
            ApiError::Provider(detail) => {
                warn!("Identity provider error: {}", detail);
                self.to_string()
            }
            _ => self.to_string(),
        };

        let fields = match self {
            ApiError::Validation(fields) => Some(fields),
            _ => None,
        };

        let body = ErrorResponse {
            error,
            code: code.to_string(),
            success: false,
            fields,
        };
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        ApiError::Internal(format!("Database error: {err}"))
    }
}

impl From<TokenError> for ApiError {
    fn from(_: TokenError) -> Self {
        ApiError::TokenNotValid
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::AuthenticationFailed => ApiError::AuthenticationFailed,
            AuthError::UsernameTaken(_) => {
                ApiError::field("username", "A user with that username already exists.")
            }
            AuthError::Provider(detail) => ApiError::Provider(detail),
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Name of the field serde reported as missing, if that is the failure.
fn missing_field(detail: &str) -> Option<&str> {
    detail.split("missing field `").nth(1)?.split('`').next()
}

/// Body or query string that could not be deserialized.
fn unreadable_input(detail: String) -> ApiError {
    match missing_field(&detail) {
        Some(field) => ApiError::field(field, "This field is required."),
        None => ApiError::field(NON_FIELD_ERRORS, detail),
    }
}

/// Key for errors that do not belong to a single field.
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        unreadable_input(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        unreadable_input(rejection.body_text())
    }
}

impl From<ValidRejection<QueryRejection>> for ApiError {
    fn from(rejection: ValidRejection<QueryRejection>) -> Self {
        match rejection {
            ValidationRejection::Valid(errors) => errors.into(),
            ValidationRejection::Inner(inner) => inner.into(),
        }
    }
}

impl From<ProjectionError> for ApiError {
    fn from(err: ProjectionError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors
                    .iter()
                    .map(|e| match &e.message {
                        Some(message) => message.to_string(),
                        None => format!("Invalid value ({})", e.code),
                    })
                    .collect();
                (field.to_string(), messages)
            })
            .collect();
        ApiError::Validation(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(length(min = 1, message = "This field may not be blank."))]
        name: String,
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(ApiError::AuthenticationFailed.status_and_code().0, StatusCode::UNAUTHORIZED);
        assert_eq!(ApiError::PermissionDenied.status_and_code(), (StatusCode::FORBIDDEN, "permission_denied"));
        assert_eq!(ApiError::NotFound("Team").status_and_code().0, StatusCode::NOT_FOUND);
        assert_eq!(ApiError::field("tags", "bad").status_and_code(), (StatusCode::BAD_REQUEST, "invalid"));
    }

    #[test]
    fn test_validation_errors_become_field_messages() {
        let errors = Sample { name: String::new() }.validate().unwrap_err();

        match ApiError::from(errors) {
            ApiError::Validation(fields) => {
                assert_eq!(fields["name"], vec!["This field may not be blank.".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_is_named() {
        let detail = "Failed to deserialize the JSON body into the target type: missing field `password` at line 1 column 20";
        assert_eq!(missing_field(detail), Some("password"));
        assert_eq!(missing_field("expected value at line 1 column 1"), None);

        match unreadable_input(detail.to_string()) {
            ApiError::Validation(fields) => {
                assert_eq!(fields["password"], vec!["This field is required.".to_string()]);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(matches!(
            unreadable_input("expected value".to_string()),
            ApiError::Validation(fields) if fields.contains_key(NON_FIELD_ERRORS)
        ));
    }

    #[test]
    fn test_stale_tokens_are_unauthorized() {
        assert_eq!(ApiError::UserNotFound.status_and_code(), (StatusCode::UNAUTHORIZED, "user_not_found"));
        assert_eq!(ApiError::UserInactive.status_and_code(), (StatusCode::UNAUTHORIZED, "user_inactive"));
    }

    #[test]
    fn test_username_taken_is_a_field_error() {
        let err = ApiError::from(AuthError::UsernameTaken("alice".to_string()));
        assert!(matches!(err, ApiError::Validation(fields) if fields.contains_key("username")));
    }
}
