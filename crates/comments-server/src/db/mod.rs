//! Document store gateway.
//!
//! The server talks to its database through [`DocumentStore`] and
//! [`DocumentCollection`] so the MongoDB backend can be swapped for the
//! in-memory one (local runs and tests).

use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

mod memory;
mod mongo;
mod schema;

pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use schema::{CollectionSchema, FieldType};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("MongoDB error: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[error("Document failed validation for collection '{collection}': {reason}")]
    Validation { collection: String, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub field: String,
    pub order: SortOrder,
}

impl Sort {
    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            order: SortOrder::Descending,
        }
    }
}

/// Options for [`DocumentCollection::find`]. Sort keys apply in order, later
/// keys breaking ties of earlier ones. A `limit` of `None` returns every
/// document after `skip`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Vec<Sort>,
    pub skip: u64,
    pub limit: Option<u64>,
}

/// What [`DocumentStore::ensure_schema`] had to do to attach the validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaOutcome {
    Created,
    Updated,
}

/// What to do when the validator cannot be applied at startup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SchemaFailurePolicy {
    Abort,
    #[default]
    Continue,
}

impl std::str::FromStr for SchemaFailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "continue" => Ok(Self::Continue),
            other => anyhow::bail!("Unknown schema failure policy: {}", other),
        }
    }
}

/// A named collection of documents. Filters are equality matches on every
/// key they contain.
#[async_trait]
pub trait DocumentCollection: Send + Sync {
    /// Persists `doc` and returns the identifier the store assigned to it.
    async fn insert_one(&self, doc: Document) -> Result<Bson, StoreError>;

    async fn find(&self, filter: Document, options: FindOptions)
        -> Result<Vec<Document>, StoreError>;

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError>;

    /// Merges `fields` into the first matching document and returns it as it
    /// is after the update.
    async fn find_one_and_set(
        &self,
        filter: Document,
        fields: Document,
    ) -> Result<Option<Document>, StoreError>;

    /// Returns the number of removed documents (0 or 1).
    async fn delete_one(&self, filter: Document) -> Result<u64, StoreError>;
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection>;

    /// Attaches `schema` as the collection's validator, creating the
    /// collection when it does not exist yet.
    async fn ensure_schema(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<SchemaOutcome, StoreError>;
}

/// Startup step applying a collection validator under `policy`.
pub async fn apply_schema(
    store: &dyn DocumentStore,
    name: &str,
    schema: &CollectionSchema,
    policy: SchemaFailurePolicy,
) -> Result<(), StoreError> {
    match store.ensure_schema(name, schema).await {
        Ok(SchemaOutcome::Created) => {
            tracing::info!("Collection '{}' created with validation schema", name);
            Ok(())
        }
        Ok(SchemaOutcome::Updated) => {
            tracing::debug!("Validation schema updated for collection '{}'", name);
            Ok(())
        }
        Err(e) => match policy {
            SchemaFailurePolicy::Abort => Err(e),
            SchemaFailurePolicy::Continue => {
                tracing::error!("Failed to apply schema to collection '{}': {}", name, e);
                Ok(())
            }
        },
    }
}
