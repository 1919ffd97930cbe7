//! Document store abstraction and its fjall-backed implementation
//!
//! Handlers talk to the store exclusively through the [`DocumentStore`]
//! trait, which models a collection-oriented database: documents are JSON
//! objects addressed by `(collection, id)`, ids are assigned on insert, and
//! collections support ordered listing and equality queries on a field.
//!
//! [`FjallDocumentStore`] persists documents in an embedded fjall keyspace,
//! one partition per collection. Unique indexes declared with
//! [`FjallDocumentStore::with_unique_index`] are enforced on every write.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use filmotheque::store::{DocumentStore, FjallDocumentStore, SortDirection};
//!
//! let store = FjallDocumentStore::open("data/store")?
//!     .with_unique_index("utilisateurs", "courriel")?;
//! let id = store.insert("film", fields).await?;
//! let films = store.list_ordered("film", "annee", SortDirection::Desc).await?;
//! ```

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

pub mod error;
pub mod fjall_store;
pub mod keys;
pub mod ordering;

pub use error::{Result, StoreError};
pub use fjall_store::FjallDocumentStore;
pub use ordering::SortDirection;

/// Field name to value mapping of one document
pub type Fields = Map<String, Value>;

/// A stored document together with its store-assigned id
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub id: String,
    pub fields: Fields,
}

impl Document {
    /// Flatten into a JSON object carrying the id as an `id` field
    pub fn into_json_with_id(self) -> Value {
        let mut fields = self.fields;
        fields.insert("id".to_string(), Value::String(self.id));
        Value::Object(fields)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents of a collection, in id order
    async fn list(&self, collection: &str) -> Result<Vec<Document>>;

    /// Documents carrying `field`, ordered by its value
    ///
    /// Documents without the field are left out of the result.
    async fn list_ordered(
        &self,
        collection: &str,
        field: &str,
        direction: SortDirection,
    ) -> Result<Vec<Document>>;

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    /// Documents whose `field` equals `value`
    async fn query(&self, collection: &str, field: &str, value: &Value) -> Result<Vec<Document>>;

    /// Insert a new document and return its generated id
    async fn insert(&self, collection: &str, fields: Fields) -> Result<String>;

    /// Overwrite the given fields of an existing document
    ///
    /// Fails with [`StoreError::DocumentNotFound`] when `id` does not exist.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<()>;

    /// Delete a document and report whether it existed
    ///
    /// Deleting a missing id is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<bool>;
}
