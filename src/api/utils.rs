//! API utility functions
//!
//! Request body handling shared by every handler that accepts JSON.

use axum::body::Body;
use axum::http::{HeaderMap, header};
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::api::error::ApiError;
use crate::store::Fields;

/// Parses and validates Content-Type header for application/json
///
/// Accepts:
/// - `application/json`
/// - `application/json; charset=utf-8`
///
/// Rejects:
/// - `application/jsonp`
/// - `application/json-patch+json`
/// - `text/json`
/// - Malformed media types
pub fn parse_content_type(content_type: &str) -> Result<mime::Mime, ApiError> {
    let media_type: mime::Mime = content_type.parse().map_err(|_| {
        ApiError::InvalidPayload(format!("invalid Content-Type: {}", content_type))
    })?;

    if media_type.type_() != mime::APPLICATION || media_type.subtype() != mime::JSON {
        return Err(ApiError::InvalidPayload(format!(
            "Content-Type must be application/json, got: {}/{}",
            media_type.type_(),
            media_type.subtype()
        )));
    }

    Ok(media_type)
}

/// Reads the request body, refusing anything over `max_size` bytes
///
/// Decompression is handled by `RequestDecompressionLayer`, so the limit
/// applies to the decompressed data.
pub async fn read_body(body: Body, max_size: usize) -> Result<Vec<u8>, ApiError> {
    let collected = Limited::new(body, max_size).collect().await.map_err(|err| {
        if err.downcast_ref::<LengthLimitError>().is_some() {
            ApiError::PayloadTooLarge(max_size)
        } else {
            ApiError::InvalidPayload(err.to_string())
        }
    })?;

    Ok(collected.to_bytes().to_vec())
}

/// Parses a JSON object body; an empty body reads as `{}`
pub fn parse_object(data: &[u8]) -> Result<Fields, ApiError> {
    if data.iter().all(u8::is_ascii_whitespace) {
        return Ok(Fields::new());
    }

    match serde_json::from_slice(data)? {
        serde_json::Value::Object(fields) => Ok(fields),
        _ => Err(ApiError::InvalidPayload("body must be a JSON object".into())),
    }
}

/// Content-Type check, bounded read and JSON object parse in one step
pub async fn read_json_object(
    headers: &HeaderMap,
    body: Body,
    max_size: usize,
) -> Result<Fields, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::InvalidPayload("missing Content-Type header".into()))?;
    parse_content_type(content_type)?;

    let data = read_body(body, max_size).await?;
    parse_object(&data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_type_valid() {
        assert!(parse_content_type("application/json").is_ok());
        assert!(parse_content_type("application/json; charset=utf-8").is_ok());
        assert!(parse_content_type("application/json; charset=UTF-8").is_ok());
    }

    #[test]
    fn test_parse_content_type_invalid() {
        assert!(parse_content_type("application/jsonp").is_err());
        assert!(parse_content_type("application/json-patch+json").is_err());
        assert!(parse_content_type("text/json").is_err());
        assert!(parse_content_type("text/plain").is_err());
        assert!(parse_content_type("invalid").is_err());
        assert!(parse_content_type("").is_err());
    }

    #[test]
    fn test_parse_object() {
        let fields = parse_object(br#"{"titre": "Alien"}"#).unwrap();
        assert_eq!(fields["titre"], "Alien");

        assert!(parse_object(b"").unwrap().is_empty());
        assert!(parse_object(b"  \n").unwrap().is_empty());
        assert!(matches!(parse_object(b"[1, 2]"), Err(ApiError::InvalidPayload(_))));
        assert!(matches!(parse_object(b"{oops"), Err(ApiError::InvalidPayload(_))));
    }

    #[tokio::test]
    async fn test_read_body_limit() {
        let data = read_body(Body::from(vec![b'a'; 100]), 100).await.unwrap();
        assert_eq!(data.len(), 100);

        let result = read_body(Body::from(vec![b'a'; 101]), 100).await;
        match result {
            Err(ApiError::PayloadTooLarge(limit)) => assert_eq!(limit, 100),
            other => panic!("Expected PayloadTooLarge error, got {:?}", other.map(|d| d.len())),
        }
    }
}
