use super::document::{DocumentType, ExtractionResult};
use super::fields::expected_fields;
use super::warnings::Issue;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Documents below this overall confidence are rejected
pub const MIN_CONFIDENCE: f64 = 0.5;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<Issue>,
    pub warnings: Vec<Issue>,
    pub suggestions: Vec<Issue>,
}

/// Check an extraction result. Errors make it invalid; warnings and
/// suggestions are advisory only.
pub fn validate(result: &ExtractionResult) -> ValidationReport {
    let mut report = ValidationReport::default();

    if let Some(message) = &result.error {
        report.errors.push(Issue::ProcessingError {
            message: message.clone(),
        });
    }

    if result.confidence_score < MIN_CONFIDENCE {
        report.errors.push(Issue::LowConfidence);
    }

    match result.document_type {
        DocumentType::Unknown => report.errors.push(Issue::UnknownDocumentType),
        DocumentType::W2 => {
            for spec in expected_fields(DocumentType::W2).iter().filter(|f| f.required) {
                if !result.has_field(spec.name) {
                    report.warnings.push(Issue::MissingRequiredField {
                        field: spec.name.to_string(),
                    });
                }
            }
        }
        DocumentType::Int1099 | DocumentType::Nec1099 => {
            if !result.has_field("federal_tax_withheld") {
                report.suggestions.push(Issue::NoFederalWithholding);
            }
        }
    }

    report.is_valid = !result.fields.is_empty() && report.errors.is_empty();
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::{content_digest, FieldValue, Fields};
    use rust_decimal_macros::dec;

    fn result(document_type: DocumentType, confidence: f64, fields: &[(&str, FieldValue)]) -> ExtractionResult {
        ExtractionResult {
            filename: "doc.pdf".to_string(),
            document_type,
            confidence_score: confidence,
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<Fields>(),
            raw_text: String::new(),
            content_sha256: content_digest(b"doc"),
            error: None,
        }
    }

    #[test]
    fn complete_w2_is_valid() {
        let r = result(
            DocumentType::W2,
            0.9,
            &[
                ("wages", FieldValue::Amount(dec!(50000))),
                ("federal_tax_withheld", FieldValue::Amount(dec!(8000))),
            ],
        );
        assert_eq!(
            validate(&r),
            ValidationReport {
                is_valid: true,
                ..Default::default()
            }
        );
    }

    #[test]
    fn low_confidence_is_an_error() {
        let r = result(DocumentType::W2, 0.49, &[("wages", FieldValue::Amount(dec!(1)))]);
        let report = validate(&r);
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec![Issue::LowConfidence]);
        assert_eq!(
            report.warnings,
            vec![Issue::MissingRequiredField {
                field: "federal_tax_withheld".to_string()
            }]
        );
    }

    #[test]
    fn threshold_confidence_is_accepted() {
        let r = result(DocumentType::Nec1099, MIN_CONFIDENCE, &[("payer_tin", FieldValue::Text("33-3333333".into()))]);
        let report = validate(&r);
        assert!(report.is_valid);
        assert_eq!(report.suggestions, vec![Issue::NoFederalWithholding]);
    }

    #[test]
    fn missing_w2_fields_warn_but_do_not_invalidate() {
        let r = result(DocumentType::W2, 0.75, &[("employer_ein", FieldValue::Text("11-1111111".into()))]);
        let report = validate(&r);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].to_string(), "Missing required field: wages");
    }

    #[test]
    fn unknown_type_is_an_error() {
        let r = result(DocumentType::Unknown, 0.0, &[]);
        let report = validate(&r);
        assert!(!report.is_valid);
        assert_eq!(report.errors, vec![Issue::LowConfidence, Issue::UnknownDocumentType]);
    }

    #[test]
    fn no_fields_is_invalid_even_without_errors() {
        let r = result(DocumentType::Int1099, 0.8, &[]);
        let report = validate(&r);
        assert!(report.errors.is_empty());
        assert!(!report.is_valid);
    }

    #[test]
    fn zero_confidence_w2_label_is_invalid() {
        // what the classifier returns for empty text
        let r = result(DocumentType::W2, 0.0, &[]);
        assert!(!validate(&r).is_valid);
    }

    #[test]
    fn processing_errors_are_reported() {
        let r = ExtractionResult::failed("bad.pdf", content_digest(b""), "invalid amount");
        let report = validate(&r);
        assert_eq!(
            report.errors[0].to_string(),
            "Processing error: invalid amount"
        );
        assert!(!report.is_valid);
    }
}
