//! Login flow: validate, verify the credential, issue a bearer token.
//!
//! The two failure messages deliberately differ ("not registered" vs
//! "password incorrect"); hardening that disclosure away is a product
//! decision, not ours. No lockout or rate limiting exists here either,
//! matching the reference behavior.

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
    auth::{password, policy, token::TokenSigner},
    store::{PublicUser, UserDirectory},
};

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
    pub access_token: String,
    pub user: PublicUser,
}

/// `POST /auth/login`
#[instrument(skip(directory, signer, payload))]
pub async fn login(
    Extension(directory): Extension<Arc<dyn UserDirectory>>,
    Extension(signer): Extension<Arc<TokenSigner>>,
    payload: Option<Json<LoginRequest>>,
) -> Result<Response, ApiError> {
    let Some(Json(request)) = payload else {
        return Err(ApiError::Validation("Missing payload".to_string()));
    };

    // The full registration password policy applies to login attempts too.
    policy::validate_login(&request.email, &request.password).map_err(ApiError::Validation)?;

    let Some(user) = directory.find_by_email(&request.email).await? else {
        return Err(ApiError::Credentials(
            "User is not registered. Please register and try again.".to_string(),
        ));
    };

    if !password::verify(&request.password, &user.password)? {
        return Err(ApiError::Credentials("Password is incorrect.".to_string()));
    }

    let access_token = signer.issue(user.id)?;

    debug!("Issued access token for user {}", user.id);

    Ok((
        StatusCode::OK,
        Json(LoginResponse {
            success: true,
            message: "Logged in successfully.".to_string(),
            access_token,
            user: PublicUser::from(&user),
        }),
    )
        .into_response())
}
