//! Request body and query extractors whose rejections render as [`ApiError`].

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Query},
    http::request::Parts,
};
use axum_valid::Valid;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// JSON request body. Malformed or incomplete bodies become 400 `invalid`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// Query string deserialized and validated with `validator`.
#[derive(Debug)]
pub struct ValidQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Valid(Query(value)) = Valid::<Query<T>>::from_request_parts(parts, state).await?;
        Ok(ValidQuery(value))
    }
}
