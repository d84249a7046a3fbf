use crate::error::{respond, ApiError};
use crate::routes::{body_text, path_param, timestamp};
use crate::{json_response, AppState};
use aws_lambda_events::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use serde::Serialize;
use shared::codec;
use shared::expression::UpdateInstruction;
use shared::models;
use shared::{ArrayKind, Fields};
use tracing::info;
use uuid::Uuid;

pub const MISSING_DATA: &str = "No se proporcionaron datos";
pub const MISSING_UPDATE_DATA: &str = "No se proporcionaron datos para actualizar";
pub const MISSING_ID: &str = "ID de ítem no proporcionado";
pub const NOT_FOUND: &str = "Ítem no encontrado";
pub const NOT_AN_OBJECT: &str = "El cuerpo debe ser un objeto JSON";
pub const DELETED: &str = "Ítem eliminado correctamente";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteItemResponse {
    pub message: &'static str,
    pub deleted_item: Fields,
}

/// Parses a request body that must be a JSON object.
///
/// Malformed JSON is an unhandled error; well-formed JSON of the wrong shape
/// is a validation error. Arrays are read as lists, which accept any members.
fn parse_fields(body: &str) -> Result<Fields, ApiError> {
    match serde_json::from_str(body)? {
        serde_json::Value::Object(map) => Fields::from_json(map, ArrayKind::List)
            .map_err(|e| ApiError::Unhandled(e.to_string())),
        _ => Err(ApiError::Validation(NOT_AN_OBJECT)),
    }
}

fn required_id(request: &ApiGatewayV2httpRequest) -> Result<&str, ApiError> {
    path_param(request, "id").ok_or(ApiError::Validation(MISSING_ID))
}

pub async fn list(state: &AppState, _request: &ApiGatewayV2httpRequest) -> ApiGatewayV2httpResponse {
    respond("scan items", scan_items(state).await)
}

async fn scan_items(state: &AppState) -> Result<ApiGatewayV2httpResponse, ApiError> {
    let items: Vec<Fields> = state
        .items
        .scan()
        .await?
        .iter()
        .map(codec::decode_attributes)
        .collect();
    info!(count = items.len(), "Scanned items");
    Ok(json_response(200, &items))
}

pub async fn create(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> ApiGatewayV2httpResponse {
    respond("create item", create_item(state, request).await)
}

async fn create_item(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> Result<ApiGatewayV2httpResponse, ApiError> {
    let body = body_text(request)?.ok_or(ApiError::Validation(MISSING_DATA))?;
    let data = parse_fields(&body)?;

    let id = Uuid::new_v4().to_string();
    let item = models::new_item(data, &id, &timestamp());

    state.items.put(codec::encode_fields(&item)).await?;

    info!(id = %id, "Created item");
    Ok(json_response(201, &item))
}

pub async fn get(state: &AppState, request: &ApiGatewayV2httpRequest) -> ApiGatewayV2httpResponse {
    respond("get item", get_item(state, request).await)
}

async fn get_item(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> Result<ApiGatewayV2httpResponse, ApiError> {
    let id = required_id(request)?;
    let attributes = state
        .items
        .get(id)
        .await?
        .ok_or(ApiError::NotFound(NOT_FOUND))?;
    Ok(json_response(200, &codec::decode_attributes(&attributes)))
}

pub async fn update(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> ApiGatewayV2httpResponse {
    respond("update item", update_item(state, request).await)
}

async fn update_item(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> Result<ApiGatewayV2httpResponse, ApiError> {
    let id = required_id(request)?;
    let body = body_text(request)?.ok_or(ApiError::Validation(MISSING_UPDATE_DATA))?;
    let changes = parse_fields(&body)?;

    // Existence check and update are separate calls; a concurrent delete in
    // between lets the update recreate the item.
    if state.items.get(id).await?.is_none() {
        return Err(ApiError::NotFound(NOT_FOUND));
    }

    let instruction = UpdateInstruction::build(id, &changes, &timestamp());
    let attributes = state.items.update(&instruction).await?;

    info!(id = %id, fields = changes.len(), "Updated item");
    Ok(json_response(200, &codec::decode_attributes(&attributes)))
}

pub async fn delete(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> ApiGatewayV2httpResponse {
    respond("delete item", delete_item(state, request).await)
}

async fn delete_item(
    state: &AppState,
    request: &ApiGatewayV2httpRequest,
) -> Result<ApiGatewayV2httpResponse, ApiError> {
    let id = required_id(request)?;

    if state.items.get(id).await?.is_none() {
        return Err(ApiError::NotFound(NOT_FOUND));
    }

    let deleted_item = state
        .items
        .delete(id)
        .await?
        .map(|attributes| codec::decode_attributes(&attributes))
        .unwrap_or_default();

    info!(id = %id, "Deleted item");
    Ok(json_response(
        200,
        &DeleteItemResponse {
            message: DELETED,
            deleted_item,
        },
    ))
}
