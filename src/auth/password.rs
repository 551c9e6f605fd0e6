//! Credential hashing and verification using Argon2id.
//!
//! The PHC-formatted hash string embeds the salt and cost parameters, so
//! verification needs no auxiliary lookup. A non-matching candidate is a
//! `false`, never an error; only a malformed stored record errors.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a plaintext credential into a PHC string safe to persist.
///
/// # Errors
/// Returns an error only on catastrophic internal failure of the hasher,
/// never on input shape.
pub fn hash(secret: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("Failed to hash password: {err}"))
}

/// Verify a candidate credential against a stored PHC string.
///
/// # Errors
/// Returns an error if the stored record is not a valid PHC string.
pub fn verify(candidate: &str, record: &str) -> Result<bool> {
    let parsed = PasswordHash::new(record)
        .map_err(|err| anyhow!("Invalid password hash record: {err}"))?;

    Ok(Argon2::default()
        .verify_password(candidate.as_bytes(), &parsed)
        .is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify_round_trip() -> Result<()> {
        let record = hash("Abc123!")?;

        assert!(record.starts_with("$argon2"));
        assert!(verify("Abc123!", &record)?);
        assert!(!verify("Abc124!", &record)?);
        Ok(())
    }

    #[test]
    fn same_secret_hashes_differently() -> Result<()> {
        let first = hash("Test#1234")?;
        let second = hash("Test#1234")?;

        // Fresh salt per record.
        assert_ne!(first, second);
        assert!(verify("Test#1234", &first)?);
        assert!(verify("Test#1234", &second)?);
        Ok(())
    }

    #[test]
    fn malformed_record_is_an_error() {
        assert!(verify("whatever", "not-a-phc-string").is_err());
    }
}
