//! Authenticated self endpoint: returns the identity the gate resolved.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::Serialize;

use crate::{auth::principal::AuthenticatedUser, store::PublicUser};

#[derive(Serialize, Debug)]
pub struct ProfileResponse {
    pub success: bool,
    pub user: PublicUser,
}

/// `GET /profile` — protected by the authorization gate.
pub async fn profile(
    Extension(AuthenticatedUser(user)): Extension<AuthenticatedUser>,
) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ProfileResponse {
            success: true,
            user: PublicUser::from(&user),
        }),
    )
}
