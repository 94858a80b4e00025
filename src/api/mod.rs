pub mod auth;
pub mod blueprints;
pub mod daily;
mod state;
pub mod trees;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json, Router,
};
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::sqlite::SqliteConnection;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tracing::error;

pub use state::{AppState, Pool};

pub(crate) type DbConnection = PooledConnection<ConnectionManager<SqliteConnection>>;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid username or password")]
    Unauthorized,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Conflict(&'static str),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("stored payload could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("connection pool exhausted")]
    Pool,

    #[error("internal server error")]
    Internal,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Database(_) | ApiError::Decode(_) | ApiError::Pool | ApiError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Storage details stay server-side; clients get a generic message.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("request failed: {self}");
            "internal server error".to_string()
        } else {
            self.to_string()
        };

        (
            status,
            Json(json!({ "success": false, "message": message })),
        )
            .into_response()
    }
}

pub(crate) fn get_connection(state: &AppState) -> Result<DbConnection, ApiError> {
    state.pool.get().map_err(|_| ApiError::Pool)
}

/// Bare `{"success": true}` acknowledgement used by all save endpoints.
#[derive(Serialize, Deserialize)]
pub struct StatusResponse {
    pub success: bool,
}

pub fn create_router(pool: Pool) -> Router {
    let state = AppState {
        pool: Arc::new(pool),
    };

    Router::new()
        .merge(auth::create_router())
        .merge(trees::create_router())
        .merge(blueprints::create_router())
        .merge(daily::create_router())
        .with_state(state)
}
