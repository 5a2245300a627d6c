//! MongoDB client and collection wrapper
//!
//! The client is constructed once at startup and injected through
//! `AppState`; there is no module-level connection singleton. Connection
//! and server-selection timeouts are appended to the URI so an unreachable
//! store fails fast and is surfaced as a retryable error.

use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::{
    options::{IndexOptions, UpdateModifications},
    results::UpdateResult,
    Client, Collection, IndexModel,
};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{error, info};

use crate::db::schemas::Metadata;
use crate::error::{classify_db_error, RefugeError};

/// Trait for schemas that provide index definitions
pub trait IntoIndexes {
    fn into_indices() -> Vec<(Document, Option<IndexOptions>)>;
}

/// Trait for schemas with mutable metadata
pub trait MutMetadata {
    fn mut_metadata(&mut self) -> &mut Metadata;
}

/// MongoDB client wrapper
#[derive(Clone)]
pub struct MongoClient {
    client: Client,
    db_name: String,
}

impl MongoClient {
    /// Connect to MongoDB and verify the connection with a ping.
    ///
    /// `timeout_ms` bounds both connection establishment and server
    /// selection, so every later store call inherits the bound.
    pub async fn new(uri: &str, db_name: &str, timeout_ms: u64) -> Result<Self, RefugeError> {
        info!("Connecting to MongoDB at {}", uri);

        let timeout_uri = if uri.contains('?') {
            format!(
                "{}&serverSelectionTimeoutMS={}&connectTimeoutMS={}",
                uri, timeout_ms, timeout_ms
            )
        } else {
            format!(
                "{}?serverSelectionTimeoutMS={}&connectTimeoutMS={}",
                uri, timeout_ms, timeout_ms
            )
        };

        let client = Client::with_uri_str(&timeout_uri)
            .await
            .map_err(classify_db_error)?;

        client
            .database(db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(classify_db_error)?;

        info!("Connected to MongoDB database '{}'", db_name);

        Ok(Self {
            client,
            db_name: db_name.to_string(),
        })
    }

    /// Get a typed collection, applying its schema-defined indexes
    pub async fn collection<T>(&self, name: &str) -> Result<MongoCollection<T>, RefugeError>
    where
        T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
    {
        MongoCollection::new(&self.client, &self.db_name, name).await
    }

    /// Get the raw database handle for untyped (resolver) lookups
    pub fn database(&self) -> mongodb::Database {
        self.client.database(&self.db_name)
    }

    /// Check store reachability (used by the readiness probe)
    pub async fn ping(&self) -> Result<(), RefugeError> {
        self.client
            .database(&self.db_name)
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(classify_db_error)
    }

    /// Get the database name
    pub fn db_name(&self) -> &str {
        &self.db_name
    }
}

/// Typed MongoDB collection with automatic indexing
#[derive(Debug, Clone)]
pub struct MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    inner: Collection<T>,
}

impl<T> MongoCollection<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync + Default + IntoIndexes + MutMetadata,
{
    /// Create a new collection and apply indexes
    pub async fn new(
        client: &Client,
        db_name: &str,
        collection_name: &str,
    ) -> Result<Self, RefugeError> {
        let collection = client.database(db_name).collection::<T>(collection_name);
        let mongo_collection = MongoCollection { inner: collection };

        mongo_collection.apply_indexes().await?;

        Ok(mongo_collection)
    }

    /// Apply schema-defined indexes
    async fn apply_indexes(&self) -> Result<(), RefugeError> {
        let schema_indices = T::into_indices();

        if schema_indices.is_empty() {
            return Ok(());
        }

        let indices: Vec<IndexModel> = schema_indices
            .into_iter()
            .map(|(keys, opts)| IndexModel::builder().keys(keys).options(opts).build())
            .collect();

        self.inner
            .create_indexes(indices)
            .await
            .map_err(classify_db_error)?;

        Ok(())
    }

    /// Insert a document, setting metadata timestamps
    pub async fn insert_one(&self, mut item: T) -> Result<ObjectId, RefugeError> {
        let metadata = item.mut_metadata();
        metadata.is_deleted = false;
        metadata.created_at = Some(DateTime::now());
        metadata.updated_at = Some(DateTime::now());

        let result = self
            .inner
            .insert_one(item)
            .await
            .map_err(classify_db_error)?;

        result
            .inserted_id
            .as_object_id()
            .ok_or_else(|| RefugeError::Database("Failed to get inserted ID".into()))
    }

    /// Find one document by filter (soft-deleted documents excluded)
    pub async fn find_one(&self, filter: Document) -> Result<Option<T>, RefugeError> {
        let mut full_filter = filter;
        full_filter.insert("metadata.is_deleted", doc! { "$ne": true });

        self.inner
            .find_one(full_filter)
            .await
            .map_err(classify_db_error)
    }

    /// Find one document by its ObjectId
    pub async fn find_by_id(&self, id: ObjectId) -> Result<Option<T>, RefugeError> {
        self.find_one(doc! { "_id": id }).await
    }

    /// Find many documents by filter (soft-deleted documents excluded)
    pub async fn find_many(&self, filter: Document, limit: i64) -> Result<Vec<T>, RefugeError> {
        use futures_util::StreamExt;

        let mut full_filter = filter;
        full_filter.insert("metadata.is_deleted", doc! { "$ne": true });

        let cursor = self
            .inner
            .find(full_filter)
            .limit(limit)
            .await
            .map_err(classify_db_error)?;

        let results: Vec<T> = cursor
            .filter_map(|doc| async {
                match doc {
                    Ok(d) => Some(d),
                    Err(e) => {
                        error!("Error reading document: {}", e);
                        None
                    }
                }
            })
            .collect()
            .await;

        Ok(results)
    }

    /// Update one document, stamping `updated_at`
    pub async fn update_one(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<UpdateResult, RefugeError> {
        let update = with_updated_at(update);

        self.inner
            .update_one(filter, UpdateModifications::Document(update))
            .await
            .map_err(classify_db_error)
    }

    /// Atomically update and return the post-image, or `None` if the filter
    /// matched nothing. This is the compare-and-swap primitive used by the
    /// adoption state machine.
    pub async fn find_one_and_update(
        &self,
        filter: Document,
        update: Document,
    ) -> Result<Option<T>, RefugeError> {
        use mongodb::options::ReturnDocument;

        let update = with_updated_at(update);

        self.inner
            .find_one_and_update(filter, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(classify_db_error)
    }

    /// Soft delete a document
    pub async fn soft_delete(&self, filter: Document) -> Result<UpdateResult, RefugeError> {
        let update = doc! {
            "$set": {
                "metadata.is_deleted": true,
                "metadata.deleted_at": DateTime::now(),
                "metadata.updated_at": DateTime::now(),
            }
        };

        self.inner
            .update_one(filter, UpdateModifications::Document(update))
            .await
            .map_err(classify_db_error)
    }

    /// Get the underlying collection for advanced operations
    pub fn inner(&self) -> &Collection<T> {
        &self.inner
    }
}

/// Merge a `metadata.updated_at` stamp into an update document's `$set`
fn with_updated_at(mut update: Document) -> Document {
    let mut set_doc = update.get_document("$set").ok().cloned().unwrap_or_default();
    set_doc.insert("metadata.updated_at", DateTime::now());
    update.insert("$set", set_doc);
    update
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_updated_at_adds_stamp_to_existing_set() {
        let update = with_updated_at(doc! { "$set": { "status": "accepted" } });
        let set = update.get_document("$set").unwrap();
        assert_eq!(set.get_str("status").unwrap(), "accepted");
        assert!(set.get("metadata.updated_at").is_some());
    }

    #[test]
    fn test_with_updated_at_creates_set_when_absent() {
        let update = with_updated_at(doc! { "$inc": { "views": 1 } });
        assert!(update.get_document("$set").unwrap().get("metadata.updated_at").is_some());
        assert!(update.get_document("$inc").is_ok());
    }
}
