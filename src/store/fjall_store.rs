use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use serde_json::Value;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{Result, StoreError};
use super::keys::{decode_doc_key, encode_unique_key, unique_partition_name, validate_collection};
use super::ordering::{compare_values, values_equal};
use super::{Document, DocumentStore, Fields, SortDirection};

/// Fjall-backed document store
#[derive(Clone)]
pub struct FjallDocumentStore {
    keyspace: Keyspace,
    unique_fields: Arc<HashMap<String, Vec<String>>>,
    write_lock: Arc<Mutex<()>>,
}

impl FjallDocumentStore {
    /// Open or create a document store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening document store at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;

        info!("Document store opened successfully");
        Ok(Self {
            keyspace,
            unique_fields: Arc::new(HashMap::new()),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Declare `field` unique within `collection`
    ///
    /// Existing documents are indexed immediately; opening fails if they
    /// already contain duplicates.
    pub fn with_unique_index(mut self, collection: &str, field: &str) -> Result<Self> {
        validate_collection(collection)?;

        let documents = self.partition(collection)?;
        let index = self.partition(&unique_partition_name(collection))?;
        let mut batch = self.keyspace.batch();
        let mut seen: HashMap<Vec<u8>, String> = HashMap::new();

        for item in documents.iter() {
            let (key, value) = item?;
            let id = decode_doc_key(&key).ok_or_else(|| {
                StoreError::CorruptDocument(String::from_utf8_lossy(&key).into_owned())
            })?;
            let fields = parse_fields(&id, &value)?;
            let Some(indexed) = fields.get(field) else {
                continue;
            };

            let unique_key = encode_unique_key(field, indexed);
            if seen.insert(unique_key.clone(), id.clone()).is_some() {
                return Err(StoreError::UniqueViolation {
                    collection: collection.to_string(),
                    field: field.to_string(),
                });
            }
            batch.insert(&index, unique_key, id.as_bytes());
        }
        batch.commit()?;

        Arc::make_mut(&mut self.unique_fields)
            .entry(collection.to_string())
            .or_default()
            .push(field.to_string());

        info!(collection, field, indexed = seen.len(), "Unique index ready");
        Ok(self)
    }

    /// Persist all pending writes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    fn partition(&self, name: &str) -> Result<PartitionHandle> {
        Ok(self
            .keyspace
            .open_partition(name, PartitionCreateOptions::default())?)
    }

    fn collection(&self, collection: &str) -> Result<PartitionHandle> {
        validate_collection(collection)?;
        self.partition(collection)
    }

    fn lock(&self) -> MutexGuard<'_, ()> {
        self.write_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn unique_fields_of(&self, collection: &str) -> &[String] {
        self.unique_fields
            .get(collection)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn read(&self, documents: &PartitionHandle, id: &str) -> Result<Option<Fields>> {
        match documents.get(id.as_bytes())? {
            Some(value) => Ok(Some(parse_fields(id, &value)?)),
            None => Ok(None),
        }
    }

    fn scan(&self, collection: &str) -> Result<Vec<Document>> {
        let documents = self.collection(collection)?;
        let mut out = Vec::new();

        for item in documents.iter() {
            let (key, value) = item?;
            let id = decode_doc_key(&key).ok_or_else(|| {
                StoreError::CorruptDocument(format!(
                    "{}/{}",
                    collection,
                    String::from_utf8_lossy(&key)
                ))
            })?;
            let fields = parse_fields(&id, &value)?;
            out.push(Document { id, fields });
        }

        Ok(out)
    }

    fn insert_document(&self, collection: &str, fields: Fields) -> Result<String> {
        let documents = self.collection(collection)?;
        let id = Uuid::now_v7().simple().to_string();
        let encoded = serde_json::to_vec(&fields)?;
        let unique = self.unique_fields_of(collection);

        if unique.is_empty() {
            documents.insert(id.as_bytes(), encoded)?;
            debug!(collection, %id, "Inserted document");
            return Ok(id);
        }

        let _guard = self.lock();
        let index = self.partition(&unique_partition_name(collection))?;
        let mut batch = self.keyspace.batch();

        for field in unique {
            if let Some(value) = fields.get(field) {
                let key = encode_unique_key(field, value);
                if index.contains_key(&key)? {
                    return Err(StoreError::UniqueViolation {
                        collection: collection.to_string(),
                        field: field.clone(),
                    });
                }
                batch.insert(&index, key, id.as_bytes());
            }
        }

        batch.insert(&documents, id.as_bytes(), encoded);
        batch.commit()?;
        debug!(collection, %id, "Inserted document");
        Ok(id)
    }

    fn update_document(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        let documents = self.collection(collection)?;
        let _guard = self.lock();

        let mut current = self.read(&documents, id)?.ok_or_else(|| StoreError::DocumentNotFound {
            collection: collection.to_string(),
            id: id.to_string(),
        })?;

        let mut batch = self.keyspace.batch();
        let unique = self.unique_fields_of(collection);
        if !unique.is_empty() {
            let index = self.partition(&unique_partition_name(collection))?;
            for field in unique {
                let Some(new_value) = fields.get(field) else {
                    continue;
                };
                let old_value = current.get(field);
                if old_value.is_some_and(|old| values_equal(old, new_value)) {
                    continue;
                }

                let key = encode_unique_key(field, new_value);
                if let Some(owner) = index.get(&key)? {
                    if &*owner != id.as_bytes() {
                        return Err(StoreError::UniqueViolation {
                            collection: collection.to_string(),
                            field: field.clone(),
                        });
                    }
                }
                if let Some(old) = old_value {
                    batch.remove(&index, encode_unique_key(field, old));
                }
                batch.insert(&index, key, id.as_bytes());
            }
        }

        for (key, value) in fields {
            current.insert(key, value);
        }
        batch.insert(&documents, id.as_bytes(), serde_json::to_vec(&current)?);
        batch.commit()?;

        debug!(collection, id, "Updated document");
        Ok(())
    }

    /// Returns whether a document was removed
    fn delete_document(&self, collection: &str, id: &str) -> Result<bool> {
        let documents = self.collection(collection)?;
        let unique = self.unique_fields_of(collection);

        // Updates read and rewrite the whole document under this lock
        let _guard = self.lock();
        let Some(current) = self.read(&documents, id)? else {
            return Ok(false);
        };

        let mut batch = self.keyspace.batch();
        if !unique.is_empty() {
            let index = self.partition(&unique_partition_name(collection))?;
            for field in unique {
                if let Some(value) = current.get(field) {
                    batch.remove(&index, encode_unique_key(field, value));
                }
            }
        }
        batch.remove(&documents, id.as_bytes());
        batch.commit()?;

        debug!(collection, id, "Deleted document");
        Ok(true)
    }
}

fn parse_fields(id: &str, raw: &[u8]) -> Result<Fields> {
    match serde_json::from_slice(raw)? {
        Value::Object(fields) => Ok(fields),
        _ => Err(StoreError::CorruptDocument(id.to_string())),
    }
}

#[async_trait]
impl DocumentStore for FjallDocumentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Document>> {
        self.scan(collection)
    }

    async fn list_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> = self
            .scan(collection)?
            .into_iter()
            .filter(|doc| doc.fields.contains_key(field))
            .collect();

        documents.sort_by(|a, b| {
            compare_values(&a.fields[field], &b.fields[field]).then_with(|| a.id.cmp(&b.id))
        });
        if direction == SortDirection::Desc {
            documents.reverse();
        }

        Ok(documents)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let documents = self.collection(collection)?;
        Ok(self.read(&documents, id)?.map(|fields| Document {
            id: id.to_string(),
            fields,
        }))
    }

    async fn query(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>> {
        Ok(self
            .scan(collection)?
            .into_iter()
            .filter(|doc| doc.fields.get(field).is_some_and(|v| values_equal(v, value)))
            .collect())
    }

    async fn insert(&self, collection: &str, fields: Fields) -> Result<String> {
        self.insert_document(collection, fields)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()> {
        self.update_document(collection, id, fields)
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        self.delete_document(collection, id)
    }
}
