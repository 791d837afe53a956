//! Object-store seam and the S3 implementation.

use crate::error::StoreError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::primitives::ByteStream;

/// Model-registry seam over a cloud object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key`, overwriting any previous object.
    ///
    /// # Errors
    /// Returns [`StoreError::Storage`] or [`StoreError::Connection`] on
    /// failure.
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError>;

    /// Fetch the object stored under `key`.
    ///
    /// # Errors
    /// Returns [`StoreError::NotFound`] if no such object exists, otherwise
    /// [`StoreError::Storage`] / [`StoreError::Connection`].
    async fn download(&self, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Whether an object exists under `key`.
    ///
    /// # Errors
    /// Returns [`StoreError::Storage`] or [`StoreError::Connection`] on
    /// failure; a missing object is `Ok(false)`, not an error.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;
}

/// [`ObjectStore`] backed by the official S3 SDK.
///
/// Credentials and region come from the standard AWS environment variables
/// (`AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY`, `AWS_DEFAULT_REGION`).
#[derive(Debug, Clone)]
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    retry: RetryPolicy,
}

impl S3ObjectStore {
    /// Build a client from the ambient AWS environment.
    pub async fn from_env(bucket: impl Into<String>, retry: RetryPolicy) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self {
            client: aws_sdk_s3::Client::new(&config),
            bucket: bucket.into(),
            retry,
        }
    }

    /// Build from an existing SDK client (custom endpoints, tests).
    #[must_use]
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            retry,
        }
    }
}

/// Map an SDK failure onto the store taxonomy.
///
/// Dispatch/timeout failures never reached the service and are connection
/// errors; everything else answered and failed.
fn map_sdk_error<E, R>(err: &SdkError<E, R>) -> StoreError
where
    E: std::error::Error,
    R: std::fmt::Debug,
{
    match err {
        SdkError::DispatchFailure(_) | SdkError::TimeoutError(_) => {
            StoreError::Connection(err.to_string())
        }
        _ => StoreError::Storage(err.to_string()),
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn upload(&self, key: &str, bytes: Vec<u8>) -> Result<(), StoreError> {
        self.retry
            .run("registry.upload", || async {
                self.client
                    .put_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .body(ByteStream::from(bytes.clone()))
                    .send()
                    .await
                    .map_err(|e| map_sdk_error(&e))?;
                Ok(())
            })
            .await?;
        tracing::info!(bucket = %self.bucket, key, size = bytes.len(), "uploaded object");
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.retry
            .run("registry.download", || async {
                let output = self
                    .client
                    .get_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .send()
                    .await
                    .map_err(|e| {
                        if matches!(&e, SdkError::ServiceError(ctx) if ctx.err().is_no_such_key()) {
                            StoreError::NotFound(key.to_string())
                        } else {
                            map_sdk_error(&e)
                        }
                    })?;
                let data = output
                    .body
                    .collect()
                    .await
                    .map_err(|e| StoreError::Connection(e.to_string()))?;
                Ok(data.into_bytes().to_vec())
            })
            .await
    }

    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        self.retry
            .run("registry.exists", || async {
                match self
                    .client
                    .head_object()
                    .bucket(&self.bucket)
                    .key(key)
                    .send()
                    .await
                {
                    Ok(_) => Ok(true),
                    Err(e) if matches!(&e, SdkError::ServiceError(ctx) if ctx.err().is_not_found()) => {
                        Ok(false)
                    }
                    Err(e) => Err(map_sdk_error(&e)),
                }
            })
            .await
    }
}
