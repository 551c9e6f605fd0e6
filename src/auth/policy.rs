//! Input validation for the registration and login flows.
//!
//! Validation is first-error-wins: checks run in declaration order (username,
//! email, password) and the first violated rule becomes the user-facing
//! message. The login flow reuses the full registration password policy
//! against the current attempt; a legacy password that no longer matches an
//! evolved policy would be rejected at login. Observed behavior, preserved.

use regex::Regex;

pub const USERNAME_MIN_LENGTH: usize = 3;
pub const USERNAME_MAX_LENGTH: usize = 30;

pub const PASSWORD_RULE_MESSAGE: &str = "Password must contain a symbol, an uppercase alphabet, \
                                         a number, and length should be between 6 and 16.";

const PASSWORD_SYMBOLS: &str = "!@#$%^&*";

/// Validate a registration payload, returning the first violated rule.
///
/// # Errors
/// Returns the user-facing message for the first failed check.
pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), String> {
    validate_username(username)?;
    validate_email(email)?;
    validate_password(password)
}

/// Validate a login payload.
///
/// # Errors
/// Returns the user-facing message for the first failed check.
pub fn validate_login(email: &str, password: &str) -> Result<(), String> {
    validate_email(email)?;
    validate_password(password)
}

fn validate_username(username: &str) -> Result<(), String> {
    if username.is_empty() {
        return Err("\"username\" is not allowed to be empty".to_string());
    }
    if username.chars().count() < USERNAME_MIN_LENGTH {
        return Err(format!(
            "\"username\" length must be at least {USERNAME_MIN_LENGTH} characters long"
        ));
    }
    if username.chars().count() > USERNAME_MAX_LENGTH {
        return Err(format!(
            "\"username\" length must be less than or equal to {USERNAME_MAX_LENGTH} characters long"
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), String> {
    if valid_email(email) {
        Ok(())
    } else {
        Err("\"email\" must be a valid email".to_string())
    }
}

fn validate_password(password: &str) -> Result<(), String> {
    if valid_password(password) {
        Ok(())
    } else {
        Err(PASSWORD_RULE_MESSAGE.to_string())
    }
}

/// Email sanity check: at least two domain segments, `.com`/`.net` TLD.
fn valid_email(email: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9._%+-]+@([A-Za-z0-9-]+\.)+(com|net)$")
        .is_ok_and(|re| re.is_match(email))
}

/// Password policy: 6-16 characters from the allowed alphabet, with at least
/// one digit and one symbol. Letter case is unrestricted.
fn valid_password(password: &str) -> bool {
    let allowed = Regex::new(r"^[a-zA-Z0-9!@#$%^&*]{6,16}$")
        .is_ok_and(|re| re.is_match(password));

    allowed
        && password.chars().any(|ch| ch.is_ascii_digit())
        && password.chars().any(|ch| PASSWORD_SYMBOLS.contains(ch))
}
