//! Document-store seam and the MongoDB implementation.

use crate::error::StoreError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::Client;

/// One fetched document as a flat JSON object.
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Source-table seam: collection name → sequence of records.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch every document in `collection`.
    ///
    /// # Errors
    /// - [`StoreError::Connection`] when the store is unreachable
    /// - [`StoreError::Document`] when a document cannot be converted
    async fn fetch(&self, collection: &str) -> Result<Vec<Record>, StoreError>;
}

/// [`DocumentStore`] backed by the official MongoDB driver.
#[derive(Debug, Clone)]
pub struct MongoDocumentStore {
    client: Client,
    database: String,
    retry: RetryPolicy,
}

impl MongoDocumentStore {
    /// Connect with a MongoDB connection string.
    ///
    /// The driver connects lazily, so this validates the URI shape only;
    /// reachability surfaces on the first fetch.
    ///
    /// # Errors
    /// Returns [`StoreError::Connection`] for an invalid connection string.
    pub async fn connect(
        uri: &str,
        database: impl Into<String>,
        retry: RetryPolicy,
    ) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        Ok(Self {
            client,
            database: database.into(),
            retry,
        })
    }

    async fn fetch_once(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let coll = self
            .client
            .database(&self.database)
            .collection::<Document>(collection);
        let mut cursor = coll
            .find(Document::new())
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;

        let mut records = Vec::new();
        while let Some(doc) = cursor
            .try_next()
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?
        {
            records.push(document_to_record(doc)?);
        }
        Ok(records)
    }
}

#[async_trait]
impl DocumentStore for MongoDocumentStore {
    async fn fetch(&self, collection: &str) -> Result<Vec<Record>, StoreError> {
        let records = self
            .retry
            .run("documents.fetch", || self.fetch_once(collection))
            .await?;
        tracing::info!(collection, rows = records.len(), "fetched source documents");
        Ok(records)
    }
}

/// Convert a BSON document into a flat JSON record.
///
/// The driver's `_id` bookkeeping field is dropped; the schema never
/// declares it.
fn document_to_record(mut doc: Document) -> Result<Record, StoreError> {
    doc.remove("_id");
    match Bson::Document(doc).into_relaxed_extjson() {
        serde_json::Value::Object(map) => Ok(map),
        other => Err(StoreError::Document(format!(
            "expected a JSON object, got {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[test]
    fn document_conversion_drops_id() {
        let record = document_to_record(doc! {
            "_id": "abc",
            "age": 30i64,
            "premium": 120.5,
            "region": "north",
        })
        .unwrap();
        assert!(!record.contains_key("_id"));
        assert_eq!(record["age"], serde_json::json!(30));
        assert_eq!(record["premium"], serde_json::json!(120.5));
        assert_eq!(record["region"], serde_json::json!("north"));
    }
}
