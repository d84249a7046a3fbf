use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::types::AttributeValue;
use tokio::sync::RwLock;

use super::{Attributes, ItemStore, Result, StorageError};
use crate::expression::UpdateInstruction;
use crate::models::{item_id, ID};

/// In-memory storage backend for tests and local runs.
///
/// Follows DynamoDB semantics where handlers can observe them: updates
/// create missing items and scans have no meaningful order (here: by id).
#[derive(Debug, Clone, Default)]
pub struct InMemoryItemStore {
    items: Arc<RwLock<HashMap<String, Attributes>>>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.items.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.items.read().await.is_empty()
    }
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn put(&self, item: Attributes) -> Result<()> {
        let id = item_id(&item).map_err(|e| StorageError::Backend {
            operation: "PutItem",
            message: e.to_string(),
        })?;
        self.items.write().await.insert(id, item);
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Attributes>> {
        Ok(self.items.read().await.get(id).cloned())
    }

    async fn scan(&self) -> Result<Vec<Attributes>> {
        let items = self.items.read().await;
        let mut ids: Vec<&String> = items.keys().collect();
        ids.sort();
        Ok(ids.into_iter().map(|id| items[id].clone()).collect())
    }

    async fn update(&self, update: &UpdateInstruction) -> Result<Attributes> {
        let mut items = self.items.write().await;
        let item = items.entry(update.id.clone()).or_insert_with(|| {
            HashMap::from([(ID.to_string(), AttributeValue::S(update.id.clone()))])
        });

        for assignment in &update.assignments {
            let (Some(field), Some(value)) = (
                update.names.get(&assignment.name),
                update.values.get(&assignment.value),
            ) else {
                return Err(StorageError::Rejected {
                    operation: "UpdateItem",
                    message: format!(
                        "Unbound placeholder in assignment {} = {}",
                        assignment.name, assignment.value
                    ),
                });
            };
            item.insert(field.clone(), value.clone());
        }

        Ok(item.clone())
    }

    async fn delete(&self, id: &str) -> Result<Option<Attributes>> {
        Ok(self.items.write().await.remove(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Fields;

    fn item(id: &str, name: &str) -> Attributes {
        HashMap::from([
            (ID.to_string(), AttributeValue::S(id.to_string())),
            ("name".to_string(), AttributeValue::S(name.to_string())),
        ])
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let store = InMemoryItemStore::new();
        store.put(item("a", "Ana")).await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some(item("a", "Ana")));
        assert_eq!(store.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_without_id_fails() {
        let store = InMemoryItemStore::new();
        let err = store.put(HashMap::new()).await.unwrap_err();
        assert!(matches!(err, StorageError::Backend { operation: "PutItem", .. }));
    }

    #[tokio::test]
    async fn test_scan_orders_by_id() {
        let store = InMemoryItemStore::new();
        store.put(item("b", "Bob")).await.unwrap();
        store.put(item("a", "Ana")).await.unwrap();

        let ids: Vec<_> = store
            .scan()
            .await
            .unwrap()
            .iter()
            .map(|i| i[ID].as_s().unwrap().clone())
            .collect();
        assert_eq!(ids, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_update_applies_assignments() {
        let store = InMemoryItemStore::new();
        store.put(item("a", "Ana")).await.unwrap();

        let mut changes = Fields::new();
        changes.insert("name", "Bea");
        let update = UpdateInstruction::build("a", &changes, "2024-01-01T00:00:00.000Z");
        let after = store.update(&update).await.unwrap();

        assert_eq!(after["name"], AttributeValue::S("Bea".into()));
        assert_eq!(
            after["updatedAt"],
            AttributeValue::S("2024-01-01T00:00:00.000Z".into())
        );
        assert_eq!(store.get("a").await.unwrap(), Some(after));
    }

    #[tokio::test]
    async fn test_update_creates_missing_item() {
        let store = InMemoryItemStore::new();
        let update = UpdateInstruction::build("ghost", &Fields::new(), "now");
        let after = store.update(&update).await.unwrap();

        assert_eq!(after[ID], AttributeValue::S("ghost".into()));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_delete_returns_old_attributes() {
        let store = InMemoryItemStore::new();
        store.put(item("a", "Ana")).await.unwrap();

        assert_eq!(store.delete("a").await.unwrap(), Some(item("a", "Ana")));
        assert_eq!(store.delete("a").await.unwrap(), None);
        assert!(store.is_empty().await);
    }
}
