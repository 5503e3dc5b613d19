//! API endpoint handlers.
//!
//! Each module corresponds to one resource of the portal.

pub mod auth;
pub mod health;
pub mod medications;
pub mod profile;
pub mod reports;

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::Path;
use axum::Json;

use crate::api::error::ApiError;

/// Unwrap a JSON body, reporting malformed input as `{msg, code}` 400.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Unwrap a sublist position from the path. Anything that is not a
/// non-negative integer is a `{msg, code}` 400.
pub(crate) fn path_index(path: Result<Path<usize>, PathRejection>) -> Result<usize, ApiError> {
    path.map(|Path(index)| index).map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "Rejected sublist index");
        ApiError::BadRequest("Index must be a non-negative whole number".into())
    })
}
