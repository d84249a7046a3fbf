use aws_lambda_events::apigw::ApiGatewayV2httpRequest;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{SecondsFormat, Utc};

use crate::error::ApiError;

pub mod email;
pub mod files;
pub mod health;
pub mod items;

pub const INVALID_BASE64: &str = "El contenido base64 no es válido";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Preflight,
    Health,
    ListItems,
    CreateItem,
    GetItem(String),
    UpdateItem(String),
    DeleteItem(String),
    UploadFile,
    GetFile(String),
    SendEmail,
    NotFound,
}

impl Route {
    pub fn resolve(method: &str, path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        match (method, segments.as_slice()) {
            ("OPTIONS", _) => Route::Preflight,
            ("GET", ["health"]) => Route::Health,
            ("GET", ["items"]) => Route::ListItems,
            ("POST", ["items"]) => Route::CreateItem,
            ("GET", ["items", id]) => Route::GetItem(id.to_string()),
            ("PUT", ["items", id]) => Route::UpdateItem(id.to_string()),
            ("DELETE", ["items", id]) => Route::DeleteItem(id.to_string()),
            ("POST", ["files"]) => Route::UploadFile,
            ("GET", ["files", id]) => Route::GetFile(id.to_string()),
            ("POST", ["email"]) => Route::SendEmail,
            _ => Route::NotFound,
        }
    }

    /// Fills the path parameter the route captured unless API Gateway already set it.
    pub fn bind_path_parameters(&self, request: &mut ApiGatewayV2httpRequest) {
        let (name, value) = match self {
            Route::GetItem(id) | Route::UpdateItem(id) | Route::DeleteItem(id) => ("id", id),
            Route::GetFile(id) => ("fileId", id),
            _ => return,
        };
        request
            .path_parameters
            .entry(name.to_string())
            .or_insert_with(|| value.clone());
    }
}

pub fn path_param<'a>(request: &'a ApiGatewayV2httpRequest, name: &str) -> Option<&'a str> {
    request
        .path_parameters
        .get(name)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// The request body as text, decoded from base64 when flagged. Empty bodies count as absent.
pub fn body_text(request: &ApiGatewayV2httpRequest) -> Result<Option<String>, ApiError> {
    let Some(body) = request.body.as_deref().filter(|b| !b.is_empty()) else {
        return Ok(None);
    };
    if !request.is_base64_encoded {
        return Ok(Some(body.to_string()));
    }
    let bytes = STANDARD
        .decode(body)
        .map_err(|_| ApiError::Validation(INVALID_BASE64))?;
    String::from_utf8(bytes)
        .map(Some)
        .map_err(|e| ApiError::Unhandled(format!("Body is not UTF-8: {e}")))
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-05-01T10:00:00.000Z`.
pub fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
