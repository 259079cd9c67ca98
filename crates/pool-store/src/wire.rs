//! Contents API payloads
//!
//! The contents API carries file bodies as standard base64, wrapped with
//! newlines on the way out. Documents are written pretty-printed with a
//! trailing newline so diffs in the repository stay readable.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pool_model::{Document, PoolError, PoolResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// `GET` response body (only the fields we use)
#[derive(Debug, Deserialize)]
pub(crate) struct ContentsFile {
    pub(crate) content: String,
    pub(crate) sha: String,
}

/// `PUT` request body
#[derive(Debug, Serialize)]
pub(crate) struct PutContents<'a> {
    pub(crate) message: &'a str,
    pub(crate) content: String,
    pub(crate) sha: &'a str,
    pub(crate) branch: &'a str,
}

/// `PUT` success body
#[derive(Debug, Deserialize)]
pub(crate) struct PutResponse {
    pub(crate) content: Option<ContentsRef>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentsRef {
    pub(crate) sha: String,
}

/// Error body of a non-2xx response
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub(crate) message: Option<String>,
}

/// Decode a base64 `content` field into a document.
///
/// # Errors
/// `Transport` when the payload is not base64 or not a JSON array of records.
pub fn decode_content<R: DeserializeOwned>(content: &str) -> PoolResult<Document<R>> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| PoolError::transport(format!("malformed contents payload: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| PoolError::transport(format!("malformed document: {e}")))
}

/// Encode a document as the base64 `content` field of a write.
///
/// # Errors
/// `Transport` if a record cannot be serialized.
pub fn encode_document<R: Serialize>(document: &Document<R>) -> PoolResult<String> {
    let mut json = serde_json::to_string_pretty(document)
        .map_err(|e| PoolError::transport(format!("failed to encode document: {e}")))?;
    json.push('\n');
    Ok(STANDARD.encode(json.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_newline_wrapped_payload() {
        let encoded = STANDARD.encode(b"[1, 2, 3]\n");
        let wrapped = format!("{}\n{}\n", &encoded[..4], &encoded[4..]);
        let doc: Document<u32> = decode_content(&wrapped).unwrap();
        assert_eq!(doc.records(), &[1, 2, 3]);
    }

    #[test]
    fn encodes_pretty_json_with_trailing_newline() {
        let doc = Document::from_records(vec![1u32]);
        let encoded = encode_document(&doc).unwrap();
        let raw = String::from_utf8(STANDARD.decode(encoded).unwrap()).unwrap();
        assert_eq!(raw, "[\n  1\n]\n");
    }

    #[test]
    fn malformed_payloads_are_transport_errors() {
        let err = decode_content::<u32>("!!not base64!!").unwrap_err();
        assert_eq!(err.kind(), pool_model::ErrorKind::Transport);

        let not_json = STANDARD.encode(b"{oops");
        let err = decode_content::<u32>(&not_json).unwrap_err();
        assert!(err.message().starts_with("malformed document"));
    }
}
