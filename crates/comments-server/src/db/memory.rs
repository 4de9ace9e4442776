use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{oid::ObjectId, Bson, Document};
use parking_lot::RwLock;

use super::{
    CollectionSchema, DocumentCollection, DocumentStore, FindOptions, SchemaOutcome, SortOrder,
    StoreError,
};

/// Process-local document store. Mirrors the MongoDB behavior the server
/// relies on: ObjectId keys, equality filters, `$set` merges and validators
/// enforced on every write.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, Arc<MemoryCollection>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn get_or_create(&self, name: &str) -> Arc<MemoryCollection> {
        if let Some(collection) = self.collections.read().get(name) {
            return Arc::clone(collection);
        }
        let mut collections = self.collections.write();
        Arc::clone(
            collections
                .entry(name.to_string())
                .or_insert_with(|| Arc::new(MemoryCollection::new(name))),
        )
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn collection(&self, name: &str) -> Arc<dyn DocumentCollection> {
        self.get_or_create(name)
    }

    async fn ensure_schema(
        &self,
        name: &str,
        schema: &CollectionSchema,
    ) -> Result<SchemaOutcome, StoreError> {
        let existed = self.collections.read().contains_key(name);
        let collection = self.get_or_create(name);
        *collection.schema.write() = Some(schema.clone());

        Ok(if existed {
            SchemaOutcome::Updated
        } else {
            SchemaOutcome::Created
        })
    }
}

struct MemoryCollection {
    name: String,
    schema: RwLock<Option<CollectionSchema>>,
    docs: RwLock<Vec<Document>>,
}

impl MemoryCollection {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            schema: RwLock::new(None),
            docs: RwLock::new(Vec::new()),
        }
    }

    fn validate(&self, doc: &Document) -> Result<(), StoreError> {
        match self.schema.read().as_ref() {
            Some(schema) => schema.check(doc).map_err(|reason| StoreError::Validation {
                collection: self.name.clone(),
                reason,
            }),
            None => Ok(()),
        }
    }
}

fn matches(doc: &Document, filter: &Document) -> bool {
    filter.iter().all(|(key, expected)| doc.get(key) == Some(expected))
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    match (a, b) {
        (Some(Bson::DateTime(a)), Some(Bson::DateTime(b))) => a.cmp(b),
        (Some(Bson::String(a)), Some(Bson::String(b))) => a.cmp(b),
        (Some(Bson::Int32(a)), Some(Bson::Int32(b))) => a.cmp(b),
        (Some(Bson::Int64(a)), Some(Bson::Int64(b))) => a.cmp(b),
        (Some(Bson::ObjectId(a)), Some(Bson::ObjectId(b))) => a.cmp(b),
        // Missing fields sort first, as in MongoDB.
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

#[async_trait]
impl DocumentCollection for MemoryCollection {
    async fn insert_one(&self, mut doc: Document) -> Result<Bson, StoreError> {
        let id = match doc.get("_id") {
            Some(id) => id.clone(),
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                doc.insert("_id", id.clone());
                id
            }
        };
        self.validate(&doc)?;

        let mut docs = self.docs.write();
        if docs.iter().any(|existing| existing.get("_id") == Some(&id)) {
            return Err(StoreError::Validation {
                collection: self.name.clone(),
                reason: format!("duplicate key {}", id),
            });
        }
        docs.push(doc);
        Ok(id)
    }

    async fn find(
        &self,
        filter: Document,
        options: FindOptions,
    ) -> Result<Vec<Document>, StoreError> {
        let mut found: Vec<Document> = self
            .docs
            .read()
            .iter()
            .filter(|doc| matches(doc, &filter))
            .cloned()
            .collect();

        if !options.sort.is_empty() {
            found.sort_by(|a, b| {
                options.sort.iter().fold(Ordering::Equal, |ordering, sort| {
                    ordering.then_with(|| {
                        let ordering = compare_values(a.get(&sort.field), b.get(&sort.field));
                        match sort.order {
                            SortOrder::Ascending => ordering,
                            SortOrder::Descending => ordering.reverse(),
                        }
                    })
                })
            });
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map(|limit| usize::try_from(limit).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(found.into_iter().skip(skip).take(limit).collect())
    }

    async fn find_one(&self, filter: Document) -> Result<Option<Document>, StoreError> {
        Ok(self
            .docs
            .read()
            .iter()
            .find(|doc| matches(doc, &filter))
            .cloned())
    }

    async fn find_one_and_set(
        &self,
        filter: Document,
        fields: Document,
    ) -> Result<Option<Document>, StoreError> {
        let mut docs = self.docs.write();
        let Some(doc) = docs.iter_mut().find(|doc| matches(doc, &filter)) else {
            return Ok(None);
        };

        let mut updated = doc.clone();
        for (key, value) in fields {
            updated.insert(key, value);
        }
        self.validate(&updated)?;

        *doc = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_one(&self, filter: Document) -> Result<u64, StoreError> {
        let mut docs = self.docs.write();
        match docs.iter().position(|doc| matches(doc, &filter)) {
            Some(index) => {
                docs.remove(index);
                Ok(1)
            }
            None => Ok(0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{FieldType, Sort};
    use mongodb::bson::doc;

    #[tokio::test]
    async fn assigns_object_ids_on_insert() {
        let store = MemoryStore::new();
        let things = store.collection("things");

        let id = things.insert_one(doc! { "name": "a" }).await.unwrap();
        assert!(matches!(id, Bson::ObjectId(_)));

        let found = things.find_one(doc! { "_id": id }).await.unwrap().unwrap();
        assert_eq!(found.get_str("name").unwrap(), "a");
    }

    #[tokio::test]
    async fn collections_are_shared_between_handles() {
        let store = MemoryStore::new();
        store.collection("things").insert_one(doc! { "n": 1 }).await.unwrap();

        let again = store.clone().collection("things");
        assert_eq!(again.find(doc! {}, FindOptions::default()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn find_filters_sorts_and_pages() {
        let store = MemoryStore::new();
        let things = store.collection("things");
        for (n, group) in [(1, "a"), (2, "b"), (3, "a"), (4, "a")] {
            things.insert_one(doc! { "n": n, "group": group }).await.unwrap();
        }

        let options = FindOptions {
            sort: vec![Sort::descending("n")],
            skip: 1,
            limit: Some(1),
        };
        let found = things.find(doc! { "group": "a" }, options).await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].get_i32("n").unwrap(), 3);
    }

    #[tokio::test]
    async fn later_sort_keys_break_ties() {
        let store = MemoryStore::new();
        let things = store.collection("things");
        let mut ids = Vec::new();
        for _ in 0..3 {
            ids.push(things.insert_one(doc! { "n": 1 }).await.unwrap());
        }

        let options = FindOptions {
            sort: vec![Sort::descending("n"), Sort::descending("_id")],
            ..FindOptions::default()
        };
        let found = things.find(doc! {}, options).await.unwrap();

        let found_ids: Vec<&Bson> = found.iter().filter_map(|doc| doc.get("_id")).collect();
        let expected: Vec<&Bson> = ids.iter().rev().collect();
        assert_eq!(found_ids, expected);
    }

    #[tokio::test]
    async fn find_one_and_set_merges_fields() {
        let store = MemoryStore::new();
        let things = store.collection("things");
        let id = things.insert_one(doc! { "a": 1, "b": 2 }).await.unwrap();

        let updated = things
            .find_one_and_set(doc! { "_id": id.clone() }, doc! { "b": 3, "c": 4 })
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.get_i32("a").unwrap(), 1);
        assert_eq!(updated.get_i32("b").unwrap(), 3);
        assert_eq!(updated.get_i32("c").unwrap(), 4);

        let missing = things
            .find_one_and_set(doc! { "_id": "nope" }, doc! { "b": 5 })
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn delete_one_reports_count() {
        let store = MemoryStore::new();
        let things = store.collection("things");
        let id = things.insert_one(doc! { "a": 1 }).await.unwrap();

        assert_eq!(things.delete_one(doc! { "_id": id.clone() }).await.unwrap(), 1);
        assert_eq!(things.delete_one(doc! { "_id": id }).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ensure_schema_reports_created_then_updated() {
        let store = MemoryStore::new();
        let schema = CollectionSchema::new().required("name", FieldType::String);

        assert_eq!(
            store.ensure_schema("things", &schema).await.unwrap(),
            SchemaOutcome::Created
        );
        assert_eq!(
            store.ensure_schema("things", &schema).await.unwrap(),
            SchemaOutcome::Updated
        );
    }

    #[tokio::test]
    async fn validator_rejects_bad_writes() {
        let store = MemoryStore::new();
        let schema = CollectionSchema::new().required("name", FieldType::String);
        store.ensure_schema("things", &schema).await.unwrap();
        let things = store.collection("things");

        let err = things.insert_one(doc! { "name": 7 }).await.unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        let id = things.insert_one(doc! { "name": "ok" }).await.unwrap();
        let err = things
            .find_one_and_set(doc! { "_id": id.clone() }, doc! { "name": Bson::Null })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));

        let unchanged = things.find_one(doc! { "_id": id }).await.unwrap().unwrap();
        assert_eq!(unchanged.get_str("name").unwrap(), "ok");
    }
}
