use aws_lambda_events::apigw::ApiGatewayV2httpResponse;
use serde::Serialize;
use shared::StorageError;
use thiserror::Error;
use tracing::{error, warn, Level};

use crate::json_response;

pub const PROCESSING_FAILED: &str = "Error al procesar la solicitud";
pub const REQUEST_REJECTED: &str = "La solicitud fue rechazada";
pub const ROUTE_NOT_FOUND: &str = "Ruta no encontrada";

/// Everything a handler can fail with. Each variant maps to one status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(&'static str),
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{error}: {details}")]
    Rejected {
        error: &'static str,
        details: String,
    },
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("Invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{0}")]
    Unhandled(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn status_code(&self) -> i64 {
        match self {
            ApiError::Validation(_) | ApiError::Rejected { .. } => 400,
            ApiError::Storage(StorageError::Rejected { .. }) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Storage(StorageError::Backend { .. })
            | ApiError::Json(_)
            | ApiError::Unhandled(_) => 500,
        }
    }

    /// Only client errors carry detail; server errors get the generic message.
    fn body(self) -> ErrorBody {
        let (error, details) = match self {
            ApiError::Validation(message) | ApiError::NotFound(message) => (message, None),
            ApiError::Rejected { error, details } => (error, Some(details)),
            ApiError::Storage(StorageError::Rejected { message, .. }) => {
                (REQUEST_REJECTED, Some(message))
            }
            ApiError::Storage(StorageError::Backend { .. })
            | ApiError::Json(_)
            | ApiError::Unhandled(_) => (PROCESSING_FAILED, None),
        };
        ErrorBody { error, details }
    }

    /// Server failures log at `ERROR`, client mistakes at `WARN`.
    pub fn log_level(&self) -> Level {
        if self.status_code() >= 500 {
            Level::ERROR
        } else {
            Level::WARN
        }
    }

    pub fn into_response(self) -> ApiGatewayV2httpResponse {
        let status = self.status_code();
        json_response(status, &self.body())
    }
}

/// Collapses a handler result into a response, logging one line on failure.
pub fn respond(
    operation: &'static str,
    result: Result<ApiGatewayV2httpResponse, ApiError>,
) -> ApiGatewayV2httpResponse {
    match result {
        Ok(response) => response,
        Err(e) => {
            if e.log_level() == Level::ERROR {
                error!(operation = operation, error = %e, "Request failed");
            } else {
                warn!(operation = operation, error = %e, "Request rejected");
            }
            e.into_response()
        }
    }
}
