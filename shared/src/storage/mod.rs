//! Key-value persistence for items.
//!
//! Handlers only see [`ItemStore`]. Each call is atomic on its own; nothing
//! composes calls into a transaction, so a check followed by a write can race
//! with other requests.

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use thiserror::Error;

use crate::expression::UpdateInstruction;

mod dynamo;
mod memory;

pub use dynamo::DynamoItemStore;
pub use memory::InMemoryItemStore;

/// An item in wire form.
pub type Attributes = HashMap<String, AttributeValue>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The backend refused the request itself, e.g. a failed condition.
    #[error("{operation} rejected: {message}")]
    Rejected {
        operation: &'static str,
        message: String,
    },
    #[error("{operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Items are keyed by their `id` string attribute.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn put(&self, item: Attributes) -> Result<()>;

    async fn get(&self, id: &str) -> Result<Option<Attributes>>;

    /// Every item in the table, in backend order.
    async fn scan(&self) -> Result<Vec<Attributes>>;

    /// Applies the update and returns all attributes after it.
    async fn update(&self, update: &UpdateInstruction) -> Result<Attributes>;

    /// Removes the item and returns its attributes from before the delete.
    async fn delete(&self, id: &str) -> Result<Option<Attributes>>;
}
