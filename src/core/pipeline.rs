//! Document processing pipeline: text, classification, field extraction and
//! validation for one document or a batch.

use super::aggregate::{aggregate, Aggregation};
use super::classify::classify;
use super::document::{content_digest, DocumentError, DocumentType, ExtractionResult, Fields, RawDocument};
use super::extract::FieldExtractor;
use super::rules::{CompiledRules, ExtractionRules, RulesError};
use super::text::TextExtractor;
use super::validation::{validate, ValidationReport};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

pub struct DocumentProcessor {
    text: TextExtractor,
    rules: CompiledRules,
}

/// An extraction result together with its validation
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedDocument {
    #[serde(flatten)]
    pub result: ExtractionResult,
    pub validation: ValidationReport,
}

impl ProcessedDocument {
    fn new(result: ExtractionResult) -> Self {
        let validation = validate(&result);
        ProcessedDocument { result, validation }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    pub generated_at: DateTime<Utc>,
    pub total_documents: usize,
    pub valid_documents: usize,
    /// Mean confidence, rounded to three places
    pub average_confidence: f64,
    pub documents_by_type: BTreeMap<DocumentType, usize>,
}

impl BatchSummary {
    pub fn new(documents: &[ProcessedDocument]) -> Self {
        let total_documents = documents.len();
        let valid_documents = documents.iter().filter(|d| d.validation.is_valid).count();
        let average_confidence = if documents.is_empty() {
            0.0
        } else {
            let sum: f64 = documents.iter().map(|d| d.result.confidence_score).sum();
            (sum / total_documents as f64 * 1000.0).round() / 1000.0
        };
        let mut documents_by_type = BTreeMap::new();
        for document in documents {
            *documents_by_type.entry(document.result.document_type).or_insert(0) += 1;
        }
        BatchSummary {
            generated_at: Utc::now(),
            total_documents,
            valid_documents,
            average_confidence,
            documents_by_type,
        }
    }
}

/// A processed batch, in submission order
#[derive(Debug, Serialize)]
pub struct ProcessedBatch {
    pub summary: BatchSummary,
    pub documents: Vec<ProcessedDocument>,
    #[serde(skip)]
    pub aggregation: Aggregation,
}

impl DocumentProcessor {
    pub fn new(text: TextExtractor, rules: CompiledRules) -> Self {
        DocumentProcessor { text, rules }
    }

    pub fn with_rules(rules: &ExtractionRules) -> Result<Self, RulesError> {
        Ok(DocumentProcessor::new(TextExtractor::default(), rules.compile()?))
    }

    /// Classify and extract, surfacing per-document failures. A document
    /// with no extractable text is unknown with zero confidence.
    pub fn try_classify_and_extract(&self, bytes: &[u8], filename: &str) -> Result<ExtractionResult, DocumentError> {
        let raw_text = self.text.extract(bytes);
        if raw_text.is_empty() {
            log::debug!("{}: no text extracted", filename);
            return Ok(ExtractionResult {
                filename: filename.to_string(),
                document_type: DocumentType::Unknown,
                confidence_score: 0.0,
                fields: Fields::new(),
                raw_text,
                content_sha256: content_digest(bytes),
                error: None,
            });
        }

        let classification = classify(&raw_text);
        let extraction = FieldExtractor::new(classification.document_type, &self.rules).extract(&raw_text)?;
        let confidence_score = ((classification.confidence + extraction.confidence) / 2.0).clamp(0.0, 1.0);
        log::debug!(
            "{}: {} with {} fields, confidence {:.3}",
            filename,
            classification.document_type,
            extraction.fields.len(),
            confidence_score
        );
        Ok(ExtractionResult {
            filename: filename.to_string(),
            document_type: classification.document_type,
            confidence_score,
            fields: extraction.fields,
            raw_text,
            content_sha256: content_digest(bytes),
            error: None,
        })
    }

    /// Never fails; a failure is recorded on an unknown result.
    pub fn classify_and_extract(&self, bytes: &[u8], filename: &str) -> ExtractionResult {
        self.try_classify_and_extract(bytes, filename)
            .unwrap_or_else(|err| {
                log::warn!("{}: {}", filename, err);
                ExtractionResult::failed(filename, content_digest(bytes), err)
            })
    }

    /// Read and process files in parallel, in input order. An unreadable
    /// file is recorded as a failed document.
    pub fn process_files(&self, paths: &[PathBuf]) -> ProcessedBatch {
        let results: Vec<_> = paths
            .par_iter()
            .map(|path| match RawDocument::from_path(path) {
                Ok(document) => self.classify_and_extract(&document.bytes, &document.filename),
                Err(err) => {
                    log::warn!("{}", err);
                    ExtractionResult::failed(path.display().to_string(), String::new(), err)
                }
            })
            .collect();
        finish(results)
    }
}

fn finish(results: Vec<ExtractionResult>) -> ProcessedBatch {
    let aggregation = aggregate(&results);
    let documents: Vec<_> = results.into_iter().map(ProcessedDocument::new).collect();
    let summary = BatchSummary::new(&documents);
    log::info!(
        "processed {} documents, {} valid, average confidence {:.3}",
        summary.total_documents,
        summary.valid_documents,
        summary.average_confidence
    );
    ProcessedBatch {
        summary,
        documents,
        aggregation,
    }
}
