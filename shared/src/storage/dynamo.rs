use std::fmt::Debug;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use tracing::debug;

use super::{Attributes, ItemStore, Result, StorageError};
use crate::expression::UpdateInstruction;
use crate::models::ID;

/// [`ItemStore`] over a DynamoDB table whose partition key is `id`.
pub struct DynamoItemStore {
    client: Client,
    table_name: String,
}

impl DynamoItemStore {
    pub fn new(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }
}

fn key(id: &str) -> AttributeValue {
    AttributeValue::S(id.to_string())
}

/// Conditional check failures surface as [`StorageError::Rejected`], everything else as `Backend`.
fn map_sdk_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    if let Some(service) = err.as_service_error() {
        if service.code() == Some("ConditionalCheckFailedException") {
            return StorageError::Rejected {
                operation,
                message: service
                    .message()
                    .unwrap_or("The conditional request failed")
                    .to_string(),
            };
        }
    }
    StorageError::Backend {
        operation,
        message: DisplayErrorContext(&err).to_string(),
    }
}

#[async_trait]
impl ItemStore for DynamoItemStore {
    async fn put(&self, item: Attributes) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item))
            .send()
            .await
            .map_err(|e| map_sdk_error("PutItem", e))?;
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Attributes>> {
        let output = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(ID, key(id))
            .send()
            .await
            .map_err(|e| map_sdk_error("GetItem", e))?;
        Ok(output.item)
    }

    async fn scan(&self) -> Result<Vec<Attributes>> {
        let mut items = Vec::new();
        let mut start_key = None;
        let mut pages = 0usize;

        loop {
            let output = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(start_key.take())
                .send()
                .await
                .map_err(|e| map_sdk_error("Scan", e))?;
            pages += 1;
            items.extend(output.items.unwrap_or_default());

            match output.last_evaluated_key {
                Some(last) if !last.is_empty() => start_key = Some(last),
                _ => break,
            }
        }

        debug!(table = %self.table_name, pages, count = items.len(), "Scanned table");
        Ok(items)
    }

    async fn update(&self, update: &UpdateInstruction) -> Result<Attributes> {
        let output = self
            .client
            .update_item()
            .table_name(&self.table_name)
            .key(ID, key(&update.id))
            .update_expression(&update.expression)
            .set_expression_attribute_names(Some(update.names.clone()))
            .set_expression_attribute_values(Some(update.values.clone()))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| map_sdk_error("UpdateItem", e))?;
        Ok(output.attributes.unwrap_or_default())
    }

    async fn delete(&self, id: &str) -> Result<Option<Attributes>> {
        let output = self
            .client
            .delete_item()
            .table_name(&self.table_name)
            .key(ID, key(id))
            .return_values(ReturnValue::AllOld)
            .send()
            .await
            .map_err(|e| map_sdk_error("DeleteItem", e))?;
        Ok(output.attributes)
    }
}
