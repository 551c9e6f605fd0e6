//! Error taxonomy for the HTTP surface.
//!
//! Validation and conflict errors are produced and reported locally by the
//! flow that detected them; unexpected directory or hashing failures bubble
//! up here, get logged, and leave the process as a generic 500 body that
//! never leaks internal detail. All failures are terminal for the current
//! request; nothing retries.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::store::DirectoryError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or policy-violating input; carries the first violated rule.
    #[error("{0}")]
    Validation(String),

    /// Unique-email violation during registration. The message never reveals
    /// which field collided.
    #[error("User already exists.")]
    Conflict,

    /// Bad credential during login (unknown account or wrong password).
    #[error("{0}")]
    Credentials(String),

    /// No `Authorization` header (or an empty bearer value) at the gate.
    #[error("Access token not found.")]
    MissingToken,

    /// Any other gate failure: malformed, expired, bad signature, or a
    /// subject that no longer resolves.
    #[error("Invalid access token.")]
    InvalidToken,

    /// Unexpected directory or hashing failure; detail is logged, not sent.
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::Conflict => Self::Conflict,
            DirectoryError::Database(err) => Self::Internal(err.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Validation(message) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "message": message }))).into_response()
            }
            Self::Conflict => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": "User already exists." })),
            )
                .into_response(),
            Self::Credentials(message) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "message": message })),
            )
                .into_response(),
            Self::MissingToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "message": "Access token not found." })),
            )
                .into_response(),
            Self::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "success": false, "message": "Invalid access token." })),
            )
                .into_response(),
            Self::Internal(err) => {
                error!("Internal error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "Internal server error", "status": 500 })),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            status_of(ApiError::Validation("bad".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ApiError::Conflict), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_of(ApiError::Credentials("Password is incorrect.".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ApiError::MissingToken), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(ApiError::InvalidToken), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(ApiError::Internal(anyhow!("boom"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn directory_conflict_maps_to_conflict() {
        let err = ApiError::from(DirectoryError::Conflict);
        assert!(matches!(err, ApiError::Conflict));

        let err = ApiError::from(DirectoryError::Database(sqlx::Error::PoolTimedOut));
        assert!(matches!(err, ApiError::Internal(_)));
    }
}
