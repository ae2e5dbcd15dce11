use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::EnrichError;
use crate::vision::VisionError;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("{detail}")]
    BadRequest { detail: String },

    #[error("{detail}")]
    BadGateway { detail: String },

    #[error("{detail}")]
    Internal { detail: String },
}

impl GatewayError {
    pub fn missing_field(field: &str) -> Self {
        GatewayError::BadRequest {
            detail: format!("Missing required field: {}", field),
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            GatewayError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            GatewayError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
            GatewayError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(json!({ "detail": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<EnrichError> for GatewayError {
    fn from(e: EnrichError) -> Self {
        match e {
            EnrichError::InvalidInput { field } => GatewayError::BadRequest {
                detail: format!("Invalid or missing field: {}", field),
            },
            EnrichError::UpstreamUnavailable { .. } => GatewayError::BadGateway {
                detail: e.to_string(),
            },
            EnrichError::Cache(_) => GatewayError::Internal {
                detail: e.to_string(),
            },
        }
    }
}

impl From<VisionError> for GatewayError {
    fn from(e: VisionError) -> Self {
        if e.is_upstream() {
            GatewayError::BadGateway {
                detail: e.to_string(),
            }
        } else {
            GatewayError::Internal {
                detail: e.to_string(),
            }
        }
    }
}

impl From<crate::cache::CacheError> for GatewayError {
    fn from(e: crate::cache::CacheError) -> Self {
        GatewayError::Internal {
            detail: e.to_string(),
        }
    }
}
