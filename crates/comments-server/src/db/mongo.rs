use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    error::ErrorKind,
    options::ReturnDocument,
    Client, Collection, Database,
};

use super::{
    CollectionSchema, DocumentCollection, DocumentStore, FindOptions, SchemaOutcome, SortOrder,
    StoreError,
};

/// Server error code for "namespace not found".
const NAMESPACE_NOT_FOUND: i32 = 26;

#[derive(Clone)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// The driver connects lazily, so this only fails on a malformed URI.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StoreError> {
        let client = Client::with_uri_str(uri).await?;
        Ok(Self::new(client.database(database)))
    }

    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        Arc::new(MongoCollection {
            inner: self.database.collection(name),
        })
    }

    async fn ensure_schema(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<SchemaOutcome, StoreError> {
        let validator = schema.to_validator();
        let command = doc! {
            "collMod": name,
            "validator": validator.clone(),
            "validationLevel": "strict",
        };

        match self.database.run_command(command).await {
            Ok(_) => Ok(SchemaOutcome::Updated),
            Err(e) if is_namespace_not_found(&e) => {
                self.database
                    .create_collection(name)
                    .validator(validator)
                    .await?;
                Ok(SchemaOutcome::Created)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn is_namespace_not_found(error: &mongodb::error::Error) -> bool {
    matches!(*error.kind, ErrorKind::Command(ref command) if command.code == NAMESPACE_NOT_FOUND)
}

struct MongoCollection {
    inner: Collection<Document>,
}

#[async_trait]
impl DocumentCollection for MongoCollection {
    async fn insert_one(&self, doc: Document) -> Result<Bson, StoreError> {
        let result = self.inner.insert_one(doc).await?;
        Ok(result.inserted_id)
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let mut action = self.inner.find(filter).skip(options.skip);

        if !options.sort.is_empty() {
            let mut sort_doc = Document::new();
            for sort in options.sort {
                let direction = match sort.order {
                    SortOrder::Ascending => 1,
                    SortOrder::Descending => -1,
                };
                sort_doc.insert(sort.field, direction);
            }
            action = action.sort(sort_doc);
        }
        if let Some(limit) = options.limit {
            action = action.limit(i64::try_from(limit).unwrap_or(i64::MAX));
        }

        let cursor = action.await?;
        let docs: Vec<Document> = cursor.try_collect().await?;
        Ok(docs)
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError> {
        Ok(self.inner.find_one(filter).await?)
    }

    async fn find_one_and_set(
        &self,
        filter: Document,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        let updated = self
            .inner
            .find_one_and_update(filter, doc! { "$set": fields })
            .return_document(ReturnDocument::After)
            .await?;
        Ok(updated)
    }

    async fn delete_one(&self, filter: Document) -> Result<u64, StoreError> {
        let result = self.inner.delete_one(filter).await?;
        Ok(result.deleted_count)
    }
}
