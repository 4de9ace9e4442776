use std::sync::Arc;

use chrono::{DateTime, Utc};
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};

use crate::db::{
    apply_schema, CollectionSchema, DocumentCollection, DocumentStore, FieldType, FindOptions,
    SchemaFailurePolicy, Sort, StoreError,
};

use super::CommentScope;

pub const COLLECTION_NAME: &str = "comments";

pub fn comment_schema() -> CollectionSchema {
    CollectionSchema::new()
        .required("account_id", FieldType::String)
        .required("task_id", FieldType::String)
        .required("author", FieldType::String)
        .required("body", FieldType::String)
        .required("created_at", FieldType::Date)
        .required("updated_at", FieldType::Date)
}

/// A 24-hex-digit id is an ObjectId; anything else is kept as a string key.
pub(crate) fn native_id(id: &str) -> Bson {
    match ObjectId::parse_str(id) {
        Ok(oid) => Bson::ObjectId(oid),
        Err(_) => Bson::String(id.to_string()),
    }
}

pub(crate) fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub(crate) fn to_bson_datetime(at: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(at.timestamp_millis())
}

fn scoped(id: &str, scope: &CommentScope) -> Document {
    doc! {
        "_id": native_id(id),
        "task_id": scope.task_id.as_str(),
        "account_id": scope.account_id.as_str(),
    }
}

/// Comment persistence. Every query except `insert` is restricted to a
/// [`CommentScope`].
#[derive(Clone)]
pub struct CommentRepository {
    collection: Arc<dyn DocumentCollection>,
}

impl CommentRepository {
    pub fn new(collection: Arc<dyn DocumentCollection>) -> Self {
        Self { collection }
    }

    /// Attaches the comment validator (under `policy`) and opens the collection.
    pub async fn init(
        store: &dyn DocumentStore,
        policy: SchemaFailurePolicy,
    ) -> Result<Self, StoreError> {
        apply_schema(store, COLLECTION_NAME, &comment_schema(), policy).await?;
        Ok(Self::new(store.collection(COLLECTION_NAME)))
    }

    pub async fn insert(&self, mut doc: Document) -> Result<String, StoreError> {
        let now = Bson::DateTime(to_bson_datetime(Utc::now()));
        if !doc.contains_key("created_at") {
            doc.insert("created_at", now.clone());
        }
        if !doc.contains_key("updated_at") {
            doc.insert("updated_at", now);
        }

        let id = self.collection.insert_one(doc).await?;
        Ok(id_to_string(&id))
    }

    /// Newest first; comments created in the same millisecond fall back to
    /// `_id` order. `skip == 0 && limit == 0` returns every match.
    pub async fn find_by_task(
        &self,
        scope: &CommentScope,
        skip: u64,
        limit: u64,
    ) -> Result<Vec<Document>, StoreError> {
        let filter = doc! {
            "task_id": scope.task_id.as_str(),
            "account_id": scope.account_id.as_str(),
        };
        let options = FindOptions {
            sort: vec![Sort::descending("created_at"), Sort::descending("_id")],
            skip,
            limit: (limit > 0).then_some(limit),
        };
        self.collection.find(filter, options).await
    }

    pub async fn find_one(
        &self,
        id: &str,
        scope: &CommentScope,
    ) -> Result<Option<Document>, StoreError> {
        self.collection.find_one(scoped(id, scope)).await
    }

    pub async fn update_one(
        &self,
        id: &str,
        scope: &CommentScope,
        mut fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        fields.insert("updated_at", to_bson_datetime(Utc::now()));
        self.collection
            .find_one_and_set(scoped(id, scope), fields)
            .await
    }

    pub async fn delete_one(&self, id: &str, scope: &CommentScope) -> Result<bool, StoreError> {
        let deleted = self.collection.delete_one(scoped(id, scope)).await?;
        Ok(deleted > 0)
    }
}
