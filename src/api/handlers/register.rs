//! Registration flow: validate, enforce uniqueness, store a hashed
//! credential. Exactly one directory write on success, none on any failure
//! path.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::{
    api::error::ApiError,
    auth::{password, policy},
    store::{NewUser, PublicUser, UserDirectory},
};

#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
pub struct RegisterResponse {
    pub success: bool,
    pub message: String,
    pub user: PublicUser,
}

/// `POST /auth/register`
///
/// Returns 200 with the created identity on success (the reference behavior,
/// not 201); the hash record never appears in the response.
#[instrument(skip(directory, payload))]
pub async fn register(
    Extension(directory): Extension<Arc<dyn UserDirectory>>,
    payload: Option<Json<RegisterRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    policy::validate_registration(&request.username, &request.email, &request.password)
        .map_err(ApiError::Validation)?;

    if directory.find_by_email(&request.email).await?.is_some() {
        return Err(ApiError::Conflict);
    }

    let hashed = password::hash(&request.password)?;

    // A concurrent registration with the same email loses the race inside
    // the directory and surfaces as the same conflict.
    let user = directory
        .create(NewUser {
            username: &request.username,
            email: &request.email,
            password: &hashed,
        })
        .await?;

    debug!("Registered user {}", user.id);

    Ok((
        StatusCode::OK,
        Json(RegisterResponse {
            success: true,
            message: "User registered successfully.".to_string(),
            user: PublicUser::from(&user),
        }),
    )
        .into_response())
}
