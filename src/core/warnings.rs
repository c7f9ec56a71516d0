use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Findings raised while validating an extracted document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "type")]
pub enum Issue {
    /// Overall confidence fell below the acceptance threshold.
    LowConfidence,
    /// The document could not be classified.
    UnknownDocumentType,
    /// Processing failed and the document was recovered with no fields.
    ProcessingError { message: String },
    /// A field the form requires was not extracted.
    MissingRequiredField { field: String },
    /// No withholding was found on a 1099, which is common.
    NoFederalWithholding,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Issue::LowConfidence => write!(f, "Low confidence in document parsing"),
            Issue::UnknownDocumentType => write!(f, "Could not determine document type"),
            Issue::ProcessingError { message } => write!(f, "Processing error: {message}"),
            Issue::MissingRequiredField { field } => write!(f, "Missing required field: {field}"),
            Issue::NoFederalWithholding => {
                write!(f, "No federal tax withheld found (this may be normal)")
            }
        }
    }
}
