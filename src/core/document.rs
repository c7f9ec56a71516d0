use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

/// Tax form type assigned by the classifier
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize, JsonSchema,
)]
pub enum DocumentType {
    #[serde(rename = "W-2")]
    W2,
    #[serde(rename = "1099-INT")]
    Int1099,
    #[serde(rename = "1099-NEC")]
    Nec1099,
    #[default]
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl DocumentType {
    /// Classifiable types in priority order. Earlier entries win classification ties.
    pub const PRIORITY: [DocumentType; 3] =
        [DocumentType::W2, DocumentType::Int1099, DocumentType::Nec1099];

    pub fn label(&self) -> &'static str {
        match self {
            DocumentType::W2 => "W-2",
            DocumentType::Int1099 => "1099-INT",
            DocumentType::Nec1099 => "1099-NEC",
            DocumentType::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// An extracted field value, either a dollar amount or free text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum FieldValue {
    Amount(#[schemars(with = "f64")] Decimal),
    Text(String),
}

impl FieldValue {
    pub fn as_amount(&self) -> Option<Decimal> {
        match self {
            FieldValue::Amount(amount) => Some(*amount),
            FieldValue::Text(_) => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Amount(amount) => write!(f, "{:.2}", amount),
            FieldValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Field name to value, ordered by field name
pub type Fields = BTreeMap<String, FieldValue>;

/// Raw document content as received from the caller
#[derive(Debug, Clone)]
pub struct RawDocument {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        RawDocument {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, DocumentError> {
        let bytes = std::fs::read(path).map_err(|source| DocumentError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(RawDocument::new(filename, bytes))
    }
}

/// Per-document processing failure. Recovered by the batch, never fatal to it.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid amount '{value}' for field {field}")]
    InvalidAmount { field: String, value: String },
}

/// Outcome of classifying and extracting a single document
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionResult {
    pub filename: String,
    pub document_type: DocumentType,
    /// Heuristic quality indicator in [0, 1]
    pub confidence_score: f64,
    pub fields: Fields,
    #[serde(default)]
    pub raw_text: String,
    /// Hex SHA-256 of the raw document bytes
    pub content_sha256: String,
    /// Set when processing failed and the document was recovered as unknown
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExtractionResult {
    /// Result recorded for a document whose processing failed.
    pub fn failed(filename: impl Into<String>, content_sha256: String, error: impl fmt::Display) -> Self {
        ExtractionResult {
            filename: filename.into(),
            document_type: DocumentType::Unknown,
            confidence_score: 0.0,
            fields: Fields::new(),
            raw_text: String::new(),
            content_sha256,
            error: Some(error.to_string()),
        }
    }

    pub fn amount(&self, field: &str) -> Option<Decimal> {
        self.fields.get(field).and_then(FieldValue::as_amount)
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }
}

pub fn content_digest(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn document_type_labels() {
        assert_eq!(DocumentType::W2.to_string(), "W-2");
        assert_eq!(DocumentType::Int1099.to_string(), "1099-INT");
        assert_eq!(DocumentType::Nec1099.to_string(), "1099-NEC");
        assert_eq!(DocumentType::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn document_type_serializes_as_form_label() {
        let json = serde_json::to_string(&DocumentType::Int1099).unwrap();
        assert_eq!(json, "\"1099-INT\"");
        let parsed: DocumentType = serde_json::from_str("\"W-2\"").unwrap();
        assert_eq!(parsed, DocumentType::W2);
    }

    #[test]
    fn failed_result_is_unknown_with_zero_confidence() {
        let result = ExtractionResult::failed("broken.pdf", content_digest(b""), "boom");
        assert_eq!(result.document_type, DocumentType::Unknown);
        assert_eq!(result.confidence_score, 0.0);
        assert!(result.fields.is_empty());
        assert_eq!(result.error.as_deref(), Some("boom"));
    }

    #[test]
    fn amount_lookup_ignores_text_fields() {
        let mut fields = Fields::new();
        fields.insert("wages".to_string(), FieldValue::Amount(dec!(50000)));
        fields.insert("state".to_string(), FieldValue::Text("CA".to_string()));
        let result = ExtractionResult {
            filename: "w2.txt".to_string(),
            document_type: DocumentType::W2,
            confidence_score: 1.0,
            fields,
            raw_text: String::new(),
            content_sha256: content_digest(b"w2"),
            error: None,
        };
        assert_eq!(result.amount("wages"), Some(dec!(50000)));
        assert_eq!(result.amount("state"), None);
        assert_eq!(result.amount("medicare_tax"), None);
    }

    #[test]
    fn digest_is_deterministic_hex() {
        let a = content_digest(b"Form W-2");
        let b = content_digest(b"Form W-2");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_ne!(a, content_digest(b"Form 1099-INT"));
    }
}
