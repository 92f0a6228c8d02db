use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use runm_metadata::{DeleteResponse, MetadataError};

/// Errors raised while configuring or running the server itself.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("bootstrap failed: {0}")]
    Bootstrap(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// Body of every non-2xx response except batch delete failures.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
}

/// A [`MetadataError`] on its way to an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub MetadataError);

impl From<MetadataError> for ApiError {
    fn from(e: MetadataError) -> Self {
        Self(e)
    }
}

pub fn status_for(err: &MetadataError) -> StatusCode {
    match err {
        MetadataError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        MetadataError::PreconditionFailed(_) => StatusCode::PRECONDITION_FAILED,
        MetadataError::NotFound(_) => StatusCode::NOT_FOUND,
        MetadataError::ValidationFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        MetadataError::Conflict(_) => StatusCode::CONFLICT,
        MetadataError::DeadlineExceeded => StatusCode::GATEWAY_TIMEOUT,
        MetadataError::Internal
        | MetadataError::DeleteFailed(_)
        | MetadataError::PropertyDefinitionDeleteFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        match self.0 {
            MetadataError::DeleteFailed(partial)
            | MetadataError::PropertyDefinitionDeleteFailed(partial) => {
                (status, Json::<DeleteResponse>(partial)).into_response()
            }
            err => {
                let key = match &err {
                    MetadataError::ValidationFailed { key, .. } => Some(key.clone()),
                    _ => None,
                };
                let body = ErrorBody {
                    kind: err.kind().to_string(),
                    message: err.to_string(),
                    key,
                };
                (status, Json(body)).into_response()
            }
        }
    }
}
