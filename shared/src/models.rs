use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use thiserror::Error;

use crate::value::{Fields, Value};

pub const ID: &str = "id";
pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";

#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),
    #[error("Invalid attribute type for {0}")]
    InvalidType(String),
}

/// Assembles a new item: `id`, the client fields, then both timestamps.
///
/// Client-supplied system fields are discarded.
pub fn new_item(data: Fields, id: &str, timestamp: &str) -> Fields {
    let mut item = Fields::new();
    item.insert(ID, id);
    for (key, value) in data {
        if key == ID || key == CREATED_AT || key == UPDATED_AT {
            continue;
        }
        item.insert(key, value);
    }
    item.insert(CREATED_AT, Value::from(timestamp));
    item.insert(UPDATED_AT, Value::from(timestamp));
    item
}

pub fn item_id(attrs: &HashMap<String, AttributeValue>) -> Result<String, ModelError> {
    get_string(attrs, ID)
}

fn get_string(attrs: &HashMap<String, AttributeValue>, key: &str) -> Result<String, ModelError> {
    let value = attrs
        .get(key)
        .ok_or_else(|| ModelError::MissingAttribute(key.to_string()))?;
    value
        .as_s()
        .map(|s| s.to_string())
        .map_err(|_| ModelError::InvalidType(key.to_string()))
}
