use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::abex::DecodeError;

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Event type '{0}' is not from a bound ABEX package")]
    UnboundPackage(String),

    #[error("Vault parent '{0}' is not the configured vaults parent")]
    ForeignVault(String),

    #[error("Batch is empty")]
    EmptyBatch,

    #[error(transparent)]
    Decode(#[from] DecodeError),
}

impl IngestError {
    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::UnboundPackage(_) | IngestError::ForeignVault(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            IngestError::EmptyBatch | IngestError::Decode(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let status = self.status();
        if let IngestError::Decode(err) = &self {
            tracing::warn!(error = %err, "Rejected undecodable input");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
