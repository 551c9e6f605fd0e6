//! Stateless bearer tokens: HS256 JWTs bound to a user id.
//!
//! The signing secret is process-wide configuration loaded once at startup;
//! rotating it invalidates every outstanding token. Verification fails
//! closed with zero clock leeway: corruption, signature mismatch or elapsed
//! expiry all read as invalid.

use anyhow::{bail, Context, Result};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

pub const TOKEN_EXPIRATION_SECONDS: i64 = 5 * 24 * 60 * 60; // 5 days

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject user id.
    pub id: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a process-wide secret.
pub struct TokenSigner {
    header: Header,
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenSigner {
    /// # Errors
    /// Returns an error if the signing secret is empty.
    pub fn new(secret: &SecretString) -> Result<Self> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            bail!("Signing secret must not be empty");
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            header: Header::new(Algorithm::HS256),
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        })
    }

    /// Issue a token for `subject`, expiring five days from now.
    ///
    /// # Errors
    /// Returns an error if JWT encoding fails.
    pub fn issue(&self, subject: Uuid) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            id: subject,
            iat: now,
            exp: now + TOKEN_EXPIRATION_SECONDS,
        };

        jsonwebtoken::encode(&self.header, &claims, &self.encoding)
            .context("Failed to sign access token")
    }

    /// Verify a token, returning its claims or `None` for anything invalid.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Claims> {
        match jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => Some(data.claims),
            Err(err) => {
                debug!("Token verification failed: {err}");
                None
            }
        }
    }
}
