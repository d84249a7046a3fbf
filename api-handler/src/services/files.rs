use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use shared::StorageError;

#[async_trait]
pub trait FileStore: Send + Sync {
    /// Stores `body` under `key` and returns the object's ETag when the backend reports one.
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<Option<String>, StorageError>;

    async fn first_key_with_prefix(&self, prefix: &str) -> Result<Option<String>, StorageError>;

    /// Time-limited GET URL for `key`.
    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError>;
}

pub struct S3FileStore {
    client: Client,
    bucket: String,
}

impl S3FileStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

fn backend_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> StorageError
where
    E: std::error::Error + Send + Sync + 'static,
    R: Debug + Send + Sync + 'static,
{
    StorageError::Backend {
        operation,
        message: DisplayErrorContext(&err).to_string(),
    }
}

#[async_trait]
impl FileStore for S3FileStore {
    async fn put_object(
        &self,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<Option<String>, StorageError> {
        let output = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| backend_error("PutObject", e))?;
        Ok(output.e_tag().map(str::to_string))
    }

    async fn first_key_with_prefix(&self, prefix: &str) -> Result<Option<String>, StorageError> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(1)
            .send()
            .await
            .map_err(|e| backend_error("ListObjectsV2", e))?;
        Ok(output
            .contents()
            .first()
            .and_then(|object| object.key())
            .map(str::to_string))
    }

    async fn presign_get(&self, key: &str, expires_in: Duration) -> Result<String, StorageError> {
        let presigning = PresigningConfig::expires_in(expires_in).map_err(|e| {
            StorageError::Backend {
                operation: "PresignGetObject",
                message: e.to_string(),
            }
        })?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| backend_error("PresignGetObject", e))?;
        Ok(request.uri().to_string())
    }
}
