pub mod auth;
pub mod trees;

pub use crate::api::auth::UserResponse;
pub use crate::api::trees::{SummaryPageResponse, TreeResponse};
pub use auth::*;
pub use trees::*;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("invalid username or password")]
    Unauthorized,

    #[error("username already taken")]
    Conflict,

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned status {0}")]
    HttpStatus(StatusCode),
}

/// Map the API's error statuses before deferring to `error_for_status`.
pub(crate) fn check_status(
    response: reqwest::Response,
    what: &str,
) -> Result<reqwest::Response, ClientError> {
    match response.status() {
        StatusCode::NOT_FOUND => Err(ClientError::NotFound(what.to_string())),
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        StatusCode::CONFLICT => Err(ClientError::Conflict),
        status if status.is_client_error() || status.is_server_error() => {
            Err(ClientError::HttpStatus(status))
        }
        _ => Ok(response),
    }
}
