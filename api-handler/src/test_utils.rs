//! Fakes and request builders for handler tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use aws_lambda_events::apigw::{ApiGatewayV2httpRequest, ApiGatewayV2httpResponse};
use aws_lambda_events::encodings::Body;
use aws_lambda_events::http::Method;
use shared::config::AppConfig;
use shared::expression::UpdateInstruction;
use shared::storage::InMemoryItemStore;
use shared::{Attributes, ItemStore, StorageError};

use crate::services::{FileStore, Mailer, OutgoingEmail};
use crate::AppState;

pub fn test_config() -> AppConfig {
    AppConfig::from_lookup(|_| None)
}

pub fn test_state() -> (AppState, InMemoryItemStore) {
    let store = InMemoryItemStore::new();
    let state = state_with(
        Arc::new(store.clone()),
        Arc::new(FakeFileStore::default()),
        Arc::new(FakeMailer::default()),
    );
    (state, store)
}

pub fn failing_state() -> AppState {
    state_with(
        Arc::new(FailingItemStore),
        Arc::new(FakeFileStore::default()),
        Arc::new(FakeMailer::default()),
    )
}

pub fn state_with(
    items: Arc<dyn ItemStore>,
    files: Arc<dyn FileStore>,
    mailer: Arc<dyn Mailer>,
) -> AppState {
    AppState {
        items,
        files,
        mailer,
        config: test_config(),
    }
}

pub fn request(method: Method, path: &str, body: Option<&str>) -> ApiGatewayV2httpRequest {
    let mut request = ApiGatewayV2httpRequest {
        raw_path: Some(path.to_string()),
        body: body.map(str::to_string),
        ..Default::default()
    };
    request.request_context.http.method = method;
    request
}

/// A request as API Gateway delivers it to an `/items/{id}` integration.
pub fn item_request(id: Option<&str>, body: Option<&str>) -> ApiGatewayV2httpRequest {
    with_path_params(id.map(|id| ("id", id)), body)
}

pub fn with_path_params(
    param: Option<(&str, &str)>,
    body: Option<&str>,
) -> ApiGatewayV2httpRequest {
    ApiGatewayV2httpRequest {
        path_parameters: param
            .map(|(k, v)| HashMap::from([(k.to_string(), v.to_string())]))
            .unwrap_or_default(),
        body: body.map(str::to_string),
        ..Default::default()
    }
}

pub fn body_json(response: &ApiGatewayV2httpResponse) -> serde_json::Value {
    match &response.body {
        Some(Body::Text(text)) => serde_json::from_str(text).unwrap(),
        other => panic!("expected a text body, got {other:?}"),
    }
}

pub struct FailingItemStore;

fn unavailable(operation: &'static str) -> StorageError {
    StorageError::Backend {
        operation,
        message: "service unavailable".to_string(),
    }
}

#[async_trait]
impl ItemStore for FailingItemStore {
    async fn put(&self, _item: Attributes) -> Result<(), StorageError> {
        Err(unavailable("PutItem"))
    }

    async fn get(&self, _id: &str) -> Result<Option<Attributes>, StorageError> {
        Err(unavailable("GetItem"))
    }

    async fn scan(&self) -> Result<Vec<Attributes>, StorageError> {
        Err(unavailable("Scan"))
    }

    async fn update(&self, _update: &UpdateInstruction) -> Result<Attributes, StorageError> {
        Err(unavailable("UpdateItem"))
    }

    async fn delete(&self, _id: &str) -> Result<Option<Attributes>, StorageError> {
        Err(unavailable("DeleteItem"))
    }
}

/// Reads from `inner`; updates and deletes fail with `error`.
pub struct BrokenWritesStore {
    pub inner: InMemoryItemStore,
    pub error: StorageError,
}

#[async_trait]
impl ItemStore for BrokenWritesStore {
    async fn put(&self, item: Attributes) -> Result<(), StorageError> {
        self.inner.put(item).await
    }

    async fn get(&self, id: &str) -> Result<Option<Attributes>, StorageError> {
        self.inner.get(id).await
    }

    async fn scan(&self) -> Result<Vec<Attributes>, StorageError> {
        self.inner.scan().await
    }

    async fn update(&self, _update: &UpdateInstruction) -> Result<Attributes, StorageError> {
        Err(self.error.clone())
    }

    async fn delete(&self, _id: &str) -> Result<Option<Attributes>, StorageError> {
        Err(self.error.clone())
    }
}

pub fn broken_writes_state(error: StorageError) -> (AppState, InMemoryItemStore) {
    let store = InMemoryItemStore::new();
    let state = state_with(
        Arc::new(BrokenWritesStore {
            inner: store.clone(),
            error,
        }),
        Arc::new(FakeFileStore::default()),
        Arc::new(FakeMailer::default()),
    );
    (state, store)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Default)]
pub struct FakeFileStore {
    pub objects: Mutex<Vec<StoredObject>>,
}

#[async_trait]
impl FileStore for FakeFileStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<Option<String>, StorageError> {
        let mut objects = self.objects.lock().unwrap();
        objects.push(StoredObject {
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        Ok(Some(format!("\"etag-{}\"", objects.len())))
    }

    async fn first_key_with_prefix(&self, prefix: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.key.starts_with(prefix))
            .map(|o| o.key.clone()))
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        Ok(format!(
            "https://signed.example/{key}?expires={}",
            expires_in.as_secs()
        ))
    }
}

#[derive(Default)]
pub struct FakeMailer {
    pub sent: Mutex<Vec<OutgoingEmail>>,
    pub reject_with: Option<String>,
}

impl FakeMailer {
    pub fn rejecting(message: &str) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            reject_with: Some(message.to_string()),
        }
    }
}

#[async_trait]
impl Mailer for FakeMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<String, StorageError> {
        if let Some(message) = &self.reject_with {
            return Err(StorageError::Rejected {
                operation: "SendEmail",
                message: message.clone(),
            });
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(email.clone());
        Ok(format!("msg-{}", sent.len()))
    }
}
