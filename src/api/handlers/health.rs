//! Health probe: build metadata plus a directory connectivity check.

use axum::{
    extract::Extension,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::{store::UserDirectory, GIT_COMMIT_HASH};

#[derive(Serialize, Deserialize, Debug)]
pub struct Health {
    commit: String,
    name: String,
    version: String,
    database: String,
}

/// Report service health; 503 when the directory probe fails.
pub async fn health(Extension(directory): Extension<Arc<dyn UserDirectory>>) -> impl IntoResponse {
    let db_healthy = match directory.ping().await {
        Ok(()) => true,
        Err(err) => {
            warn!("Database health check failed: {err}");
            false
        }
    };

    let health = Health {
        commit: GIT_COMMIT_HASH.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: if db_healthy { "ok" } else { "error" }.to_string(),
    };

    let status = if db_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_serializes_all_fields() -> Result<(), serde_json::Error> {
        let health = Health {
            commit: "abc1234".to_string(),
            name: "vendi".to_string(),
            version: "0.1.0".to_string(),
            database: "ok".to_string(),
        };
        let value = serde_json::to_value(health)?;
        assert_eq!(value["database"], "ok");
        assert_eq!(value["name"], "vendi");
        Ok(())
    }
}
