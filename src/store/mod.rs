//! User directory: the persistent identity store.
//!
//! The directory is expressed as an object-safe trait so every flow receives
//! an explicitly constructed client instead of reaching for a shared global
//! handle, and so the HTTP layer can be exercised against an in-memory
//! directory in tests. The production implementation sits on PostgreSQL.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{PgPool, Row};
use std::{future::Future, pin::Pin, time::Duration};
use tracing::{info_span, Instrument};
use uuid::Uuid;

/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

const PING_TIMEOUT: Duration = Duration::from_secs(2);

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Identity record as stored in the directory.
///
/// `password` holds the Argon2id PHC string and must never be serialized into
/// a response body; handlers convert to [`PublicUser`] before replying.
#[derive(Clone, Debug)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
}

/// Response-safe projection of a [`User`], hash record excluded.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            email: user.email.clone(),
            created_at: user.created_at,
        }
    }
}

/// Fields required to create a new identity record.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// The unique-email constraint rejected the write. Two concurrent
    /// registrations with the same email race here; the loser surfaces this
    /// instead of silently overwriting.
    #[error("unique constraint violation")]
    Conflict,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Persistent store of identity records, keyed by unique email and unique id.
pub trait UserDirectory: Send + Sync {
    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<User>, DirectoryError>>;

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<User>, DirectoryError>>;

    fn create<'a>(&'a self, user: NewUser<'a>) -> BoxFuture<'a, Result<User, DirectoryError>>;

    /// Connectivity probe used by the health endpoint.
    fn ping(&self) -> BoxFuture<'_, Result<(), DirectoryError>>;
}

/// PostgreSQL-backed [`UserDirectory`].
#[derive(Clone, Debug)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_user(row: &sqlx::postgres::PgRow) -> Result<User, sqlx::Error> {
        Ok(User {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            email: row.try_get("email")?,
            password: row.try_get("password")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

impl UserDirectory for PgUserStore {
    fn find_by_email<'a>(
        &'a self,
        email: &'a str,
    ) -> BoxFuture<'a, Result<Option<User>, DirectoryError>> {
        Box::pin(async move {
            let query =
                "SELECT id, username, email, password, created_at FROM users WHERE email = $1";
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "SELECT",
                db.statement = query
            );
            let row = sqlx::query(query)
                .bind(email)
                .fetch_optional(&self.pool)
                .instrument(span)
                .await?;

            row.as_ref().map(Self::row_to_user).transpose().map_err(Into::into)
        })
    }

    fn find_by_id(&self, id: Uuid) -> BoxFuture<'_, Result<Option<User>, DirectoryError>> {
        Box::pin(async move {
            let query =
                "SELECT id, username, email, password, created_at FROM users WHERE id = $1";
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "SELECT",
                db.statement = query
            );
            let row = sqlx::query(query)
                .bind(id)
                .fetch_optional(&self.pool)
                .instrument(span)
                .await?;

            row.as_ref().map(Self::row_to_user).transpose().map_err(Into::into)
        })
    }

    fn create<'a>(&'a self, user: NewUser<'a>) -> BoxFuture<'a, Result<User, DirectoryError>> {
        Box::pin(async move {
            let query = "INSERT INTO users (username, email, password) VALUES ($1, $2, $3) \
                         RETURNING id, username, email, password, created_at";
            let span = info_span!(
                "db.query",
                db.system = "postgresql",
                db.operation = "INSERT",
                db.statement = query
            );
            let row = sqlx::query(query)
                .bind(user.username)
                .bind(user.email)
                .bind(user.password)
                .fetch_one(&self.pool)
                .instrument(span)
                .await
                .map_err(|err| {
                    if is_unique_violation(&err) {
                        DirectoryError::Conflict
                    } else {
                        DirectoryError::Database(err)
                    }
                })?;

            Self::row_to_user(&row).map_err(Into::into)
        })
    }

    fn ping(&self) -> BoxFuture<'_, Result<(), DirectoryError>> {
        Box::pin(async move {
            let probe = sqlx::query("SELECT 1").execute(&self.pool);
            match tokio::time::timeout(PING_TIMEOUT, probe).await {
                Ok(result) => result.map(|_| ()).map_err(Into::into),
                Err(_) => Err(DirectoryError::Database(sqlx::Error::PoolTimedOut)),
            }
        })
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().is_some_and(|code| code.as_ref() == UNIQUE_VIOLATION)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::{borrow::Cow, error::Error as StdError, fmt};

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &'static str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }

    #[test]
    fn public_user_drops_hash_record() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".to_string(),
            email: "alice@x.com".to_string(),
            password: "$argon2id$v=19$secret".to_string(),
            created_at: Utc::now(),
        };

        let value = serde_json::to_value(PublicUser::from(&user)).expect("serialize");
        assert_eq!(value["email"], "alice@x.com");
        assert_eq!(value["username"], "alice");
        assert!(value.get("password").is_none());
        assert!(value.get("createdAt").is_some());
    }
}
