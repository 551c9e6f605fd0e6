//! # Vendi
//!
//! `vendi` is the account and access backend of a sales-management API:
//! registration, login, stateless bearer-token issuance and a token-gated
//! authorization middleware, backed by a PostgreSQL user directory.
//!
//! ## Authentication model
//!
//! Passwords are stored only as Argon2id PHC strings; the salt and cost
//! parameters travel inside the record, so verification needs no auxiliary
//! lookup. Sessions are stateless HS256 tokens bound to the user's id with a
//! five-day expiry. The server keeps no session table: validity is purely
//! signature plus expiry, and rotating the signing secret invalidates every
//! outstanding token at once.
//!
//! Protected routes pass through [`auth::principal::authorize`], which
//! resolves the bearer token back to a live directory record before the
//! handler runs.

pub mod api;
pub mod auth;
pub mod cli;
pub mod store;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};
