//! Text and document encoding for the backing file.

use jdb_tree::Document;

use crate::error::{StoreError, StoreResult};

/// Codec for the persisted document file.
///
/// The file is UTF-8 text holding the document pretty-printed with two-space
/// indentation.
pub struct DocumentCodec;

impl DocumentCodec {
    /// Encode text as UTF-8 bytes.
    pub fn encode_text(text: &str) -> Vec<u8> {
        text.as_bytes().to_vec()
    }

    /// Decode UTF-8 bytes; invalid sequences become U+FFFD.
    pub fn decode_text(bytes: &[u8]) -> String {
        String::from_utf8_lossy(bytes).into_owned()
    }

    /// Serialize a document for writing to disk.
    pub fn encode_document(document: &Document) -> StoreResult<Vec<u8>> {
        let text = serde_json::to_string_pretty(document)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(Self::encode_text(&text))
    }

    /// Parse a document read from disk.
    pub fn decode_document(bytes: &[u8]) -> StoreResult<Document> {
        let text = Self::decode_text(bytes);
        serde_json::from_str(&text).map_err(|e| StoreError::Parse(e.to_string()))
    }
}
