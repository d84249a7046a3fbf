use std::time::Duration;

use crate::error::{respond, ApiError};
use crate::routes::{path_param, INVALID_BASE64};
use crate::{json_response, AppState};
use aws_lambda_events::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

pub const MISSING_CONTENT: &str = "No se proporcionó contenido para subir";
pub const MISSING_FILE_ID: &str = "ID de archivo no proporcionado";
pub const FILE_NOT_FOUND: &str = "Archivo no encontrado";
pub const UPLOADED: &str = "Archivo subido exitosamente";

const UPLOAD_PREFIX: &str = "uploads/";
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const DOWNLOAD_URL_TTL: Duration = Duration::from_secs(3600);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub message: &'static str,
    pub file_id: String,
    pub file_url: String,
    pub etag: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    pub file_url: String,
    pub bucket: String,
    pub key: String,
}

/// Drops a `data:image/<type>;base64,` prefix if present.
fn strip_data_url(body: &str) -> &str {
    let Some(rest) = body.strip_prefix("data:image/") else {
        return body;
    };
    match rest.split_once(";base64,") {
        Some((kind, payload))
            if !kind.is_empty() && kind.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') =>
        {
            payload
        }
        _ => body,
    }
}

/// `image/png; charset=binary` -> `png`.
fn extension(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .and_then(|mime| mime.split('/').nth(1))
        .map(str::trim)
        .unwrap_or("")
}

fn object_key(file_id: &str, content_type: &str) -> String {
    match extension(content_type) {
        "" => format!("{UPLOAD_PREFIX}{file_id}"),
        ext => format!("{UPLOAD_PREFIX}{file_id}.{ext}"),
    }
}

pub async fn upload(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> ApiGatewayV2httpResponse {
    respond("upload file", upload_file(state, request).await)
}

async fn upload_file(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> Result<ApiGatewayV2httpResponse, ApiError> {
    let body = request
        .body
        .as_deref()
        .filter(|b| !b.is_empty())
        .ok_or(ApiError::Validation(MISSING_CONTENT))?;

    let content = if request.is_base64_encoded {
        STANDARD
            .decode(strip_data_url(body))
            .map_err(|_| ApiError::Validation(INVALID_BASE64))?
    } else {
        body.as_bytes().to_vec()
    };

    let content_type = request
        .headers
        .get("content-type")
        .and_then(|h| h.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE);

    let file_id = Uuid::new_v4().to_string();
    let key = object_key(&file_id, content_type);
    let size = content.len();

    let etag = state.files.put_object(&key, content, content_type).await?;

    info!(key = %key, size = size, "Uploaded file");
    Ok(json_response(
        200,
        &UploadResponse {
            message: UPLOADED,
            file_url: format!("https://{}.s3.amazonaws.com/{key}", state.config.bucket_name),
            file_id,
            etag,
        },
    ))
}

pub async fn get(state: &AppState, request: &ApiGatewayV2httpRequest) -> ApiGatewayV2httpResponse {
    respond("get file", get_file(state, request).await)
}

async fn get_file(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> Result<ApiGatewayV2httpResponse, ApiError> {
    let file_id = path_param(request, "fileId").ok_or(ApiError::Validation(MISSING_FILE_ID))?;

    let key = state
        .files
        .first_key_with_prefix(&format!("{UPLOAD_PREFIX}{file_id}"))
        .await?
        .ok_or(ApiError::NotFound(FILE_NOT_FOUND))?;

    let file_url = state.files.presign_get(&key, DOWNLOAD_URL_TTL).await?;

    Ok(json_response(
        200,
        &FileResponse {
            file_url,
            bucket: state.config.bucket_name.clone(),
            key,
        },
    ))
}
