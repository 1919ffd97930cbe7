use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Fjall error: {0}")]
    Fjall(#[from] fjall::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Document not found: {collection}/{id}")]
    DocumentNotFound { collection: String, id: String },

    #[error("Unique constraint violated on {collection}.{field}")]
    UniqueViolation { collection: String, field: String },

    #[error("Invalid collection name: {0}")]
    InvalidCollection(String),

    #[error("Invalid sort direction: {0}")]
    InvalidDirection(String),

    #[error("Corrupt document {0}: expected a JSON object")]
    CorruptDocument(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
