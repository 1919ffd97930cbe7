//! Partition and key layout for the document store
//!
//! Partition structure:
//! - `{collection}`: {id} -> document fields (JSON object)
//! - `{collection}__unique`: {field}:{value as JSON} -> id

use serde_json::Value;

use super::error::{Result, StoreError};

const UNIQUE_SUFFIX: &str = "__unique";

/// Reject collection names fjall cannot use as partition names
pub fn validate_collection(collection: &str) -> Result<()> {
    let valid = !collection.is_empty()
        && collection.len() + UNIQUE_SUFFIX.len() <= 255
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidCollection(collection.to_string()))
    }
}

/// Name of the partition holding unique index entries for a collection
pub fn unique_partition_name(collection: &str) -> String {
    format!("{}{}", collection, UNIQUE_SUFFIX)
}

/// Encode a unique index key: {field}:{value}
///
/// Numbers that hold an integral value are encoded without a fractional part
/// so that `1` and `1.0` collide.
pub fn encode_unique_key(field: &str, value: &Value) -> Vec<u8> {
    let encoded = match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string(),
    };
    format!("{}:{}", field, encoded).into_bytes()
}

/// Decode a document key back into its id
pub fn decode_doc_key(key: &[u8]) -> Option<String> {
    std::str::from_utf8(key).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_collection() {
        assert!(validate_collection("film").is_ok());
        assert!(validate_collection("utilisateurs").is_ok());
        assert!(validate_collection("a-b_c9").is_ok());
        assert!(validate_collection("").is_err());
        assert!(validate_collection("films/1").is_err());
        assert!(validate_collection("sp ace").is_err());
    }

    #[test]
    fn test_unique_key_encoding() {
        let key = encode_unique_key("courriel", &json!("a@b.com"));
        assert_eq!(key, b"courriel:\"a@b.com\"");
    }

    #[test]
    fn test_unique_key_numbers_collide() {
        assert_eq!(
            encode_unique_key("n", &json!(1)),
            encode_unique_key("n", &json!(1.0))
        );
    }

    #[test]
    fn test_unique_partition_name() {
        assert_eq!(unique_partition_name("utilisateurs"), "utilisateurs__unique");
    }
}
