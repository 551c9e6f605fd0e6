//! The authorization gate.
//!
//! Middleware applied to every protected route: it reads the bearer token,
//! verifies it, resolves the subject against the user directory and attaches
//! the resulting identity to the request. A missing header gets its own
//! message; every other failure mode (malformed scheme, bad signature,
//! expired token, deleted user, directory failure during resolution)
//! collapses into the single "Invalid access token." response. Observed
//! behavior, preserved deliberately.

use axum::{
    extract::{Extension, Request},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

use crate::{
    api::error::ApiError,
    auth::token::TokenSigner,
    store::{User, UserDirectory},
};

const BEARER_PREFIX: &str = "Bearer ";

/// Identity resolved by the gate, available to downstream handlers via
/// request extensions.
#[derive(Clone, Debug)]
pub struct AuthenticatedUser(pub User);

/// Token-gated middleware for protected routes.
///
/// # Errors
/// Returns 401 when the token is missing, invalid, expired, or no longer
/// resolves to a directory record.
pub async fn authorize(
    Extension(directory): Extension<Arc<dyn UserDirectory>>,
    Extension(signer): Extension<Arc<TokenSigner>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = resolve_bearer(request.headers(), directory.as_ref(), &signer).await?;
    request.extensions_mut().insert(AuthenticatedUser(user));

    Ok(next.run(request).await)
}

async fn resolve_bearer(
    headers: &HeaderMap,
    directory: &dyn UserDirectory,
    signer: &TokenSigner,
) -> Result<User, ApiError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        return Err(ApiError::MissingToken);
    };

    let token = value
        .to_str()
        .ok()
        .and_then(|raw| raw.strip_prefix(BEARER_PREFIX))
        .ok_or(ApiError::InvalidToken)?
        .trim();
    if token.is_empty() {
        return Err(ApiError::MissingToken);
    }

    let claims = signer.verify(token).ok_or(ApiError::InvalidToken)?;

    // Directory failures collapse into the same 401 as a bad token here;
    // the gate never differentiates why resolution failed.
    directory
        .find_by_id(claims.id)
        .await
        .map_err(|_| ApiError::InvalidToken)?
        .ok_or(ApiError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{BoxFuture, DirectoryError, NewUser};
    use anyhow::Result;
    use axum::http::HeaderValue;
    use chrono::Utc;
    use secrecy::SecretString;
    use uuid::Uuid;

    struct SingleUserDirectory {
        user: User,
        fail: bool,
    }

    impl UserDirectory for SingleUserDirectory {
        fn find_by_email<'a>(
            &'a self,
            email: &'a str,
        ) -> BoxFuture<'a, Result<Option<User>, DirectoryError>> {
            Box::pin(async move {
                Ok((self.user.email == email).then(|| self.user.clone()))
            })
        }

        fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<User>, DirectoryError>> {
            Box::pin(async move {
                if self.fail {
                    return Err(DirectoryError::Database(sqlx::Error::PoolTimedOut));
                }
                Ok((self.user.id == id).then(|| self.user.clone()))
            })
        }

        fn create<'a>(
            &'a self,
            _user: NewUser<'a>,
        ) -> BoxFuture<'a, Result<User, DirectoryError>> {
            Box::pin(async move { Err(DirectoryError::Conflict) })
        }

        fn ping(&self) -> BoxFuture<'_, Result<(), DirectoryError>> {
            Box::pin(async move { Ok(()) })
        }
    }

    fn fixture() -> (SingleUserDirectory, TokenSigner, Uuid) {
        let id = Uuid::new_v4();
        let directory = SingleUserDirectory {
            user: User {
                id,
                username: "alice".to_string(),
                email: "alice@x.com".to_string(),
                password: "$argon2id$v=19$hash".to_string(),
                created_at: Utc::now(),
            },
            fail: false,
        };
        let signer =
            TokenSigner::new(&SecretString::from("gate-test-secret".to_string())).expect("signer");
        (directory, signer, id)
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).expect("header"),
        );
        headers
    }

    #[tokio::test]
    async fn missing_header_is_its_own_message() {
        let (directory, signer, _) = fixture();
        let result = resolve_bearer(&HeaderMap::new(), &directory, &signer).await;
        assert!(matches!(result, Err(ApiError::MissingToken)));
    }

    #[tokio::test]
    async fn empty_bearer_value_counts_as_missing() {
        let (directory, signer, _) = fixture();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer "));
        let result = resolve_bearer(&headers, &directory, &signer).await;
        assert!(matches!(result, Err(ApiError::MissingToken)));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_invalid() {
        let (directory, signer, _) = fixture();
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic abc"));
        let result = resolve_bearer(&headers, &directory, &signer).await;
        assert!(matches!(result, Err(ApiError::InvalidToken)));
    }

    #[tokio::test]
    async fn valid_token_resolves_the_user() -> Result<()> {
        let (directory, signer, id) = fixture();
        let token = signer.issue(id)?;

        let user = resolve_bearer(&bearer(&token), &directory, &signer)
            .await
            .map_err(|err| anyhow::anyhow!("expected pass-through: {err}"))?;
        assert_eq!(user.id, id);
        Ok(())
    }

    #[tokio::test]
    async fn token_for_deleted_user_is_invalid() -> Result<()> {
        let (directory, signer, _) = fixture();
        let token = signer.issue(Uuid::new_v4())?;

        let result = resolve_bearer(&bearer(&token), &directory, &signer).await;
        assert!(matches!(result, Err(ApiError::InvalidToken)));
        Ok(())
    }

    #[tokio::test]
    async fn directory_failure_collapses_into_invalid() -> Result<()> {
        let (mut directory, signer, id) = fixture();
        directory.fail = true;
        let token = signer.issue(id)?;

        let result = resolve_bearer(&bearer(&token), &directory, &signer).await;
        assert!(matches!(result, Err(ApiError::InvalidToken)));
        Ok(())
    }

    #[tokio::test]
    async fn garbage_token_is_invalid() {
        let (directory, signer, _) = fixture();
        let result = resolve_bearer(&bearer("not-a-jwt"), &directory, &signer).await;
        assert!(matches!(result, Err(ApiError::InvalidToken)));
    }
}
