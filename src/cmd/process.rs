//! Process command - classify, extract and validate a batch of documents

use crate::core::{ProcessedBatch, ProcessedDocument};
use clap::Args;
use std::io;
use std::path::PathBuf;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Args, Debug)]
pub struct ProcessCommand {
    /// Tax documents to process (PDF or text)
    #[arg(short, long = "documents", num_args = 1.., required = true)]
    documents: Vec<PathBuf>,

    /// JSON file replacing the built-in extraction rules
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long, conflicts_with = "csv")]
    json: bool,

    /// Output one row per extracted field as CSV
    #[arg(long)]
    csv: bool,
}

impl ProcessCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let processor = super::load_processor(self.rules.as_deref())?;
        let batch = processor.process_files(&self.documents);

        if self.json {
            println!("{}", serde_json::to_string_pretty(&batch)?);
            Ok(())
        } else if self.csv {
            self.write_csv(&batch.documents)
        } else {
            self.print_text(&batch);
            Ok(())
        }
    }

    fn print_text(&self, batch: &ProcessedBatch) {
        let rows: Vec<_> = batch.documents.iter().map(DocumentRow::from).collect();
        let table = Table::new(rows)
            .with(Style::rounded())
            .with(Modify::new(Rows::new(1..)).with(Alignment::left()))
            .to_string();
        println!("{}", table);
        println!();

        for document in &batch.documents {
            print_document(document);
        }

        let summary = &batch.summary;
        println!(
            "{} document(s), {} valid, average confidence {:.3}",
            summary.total_documents, summary.valid_documents, summary.average_confidence
        );
        let by_type: Vec<_> = summary
            .documents_by_type
            .iter()
            .map(|(document_type, count)| format!("{document_type}: {count}"))
            .collect();
        if !by_type.is_empty() {
            println!("By type: {}", by_type.join(", "));
        }
    }

    fn write_csv(&self, documents: &[ProcessedDocument]) -> anyhow::Result<()> {
        let mut wtr = csv::Writer::from_writer(io::stdout());
        for document in documents {
            let result = &document.result;
            for (field, value) in &result.fields {
                wtr.serialize(FieldRow {
                    filename: &result.filename,
                    document_type: result.document_type.label(),
                    confidence: format!("{:.3}", result.confidence_score),
                    field,
                    value: value.to_string(),
                })?;
            }
        }
        wtr.flush()?;
        Ok(())
    }
}

fn print_document(document: &ProcessedDocument) {
    let result = &document.result;
    println!("{} ({})", result.filename, result.document_type);
    for (field, value) in &result.fields {
        println!("  {:28} {}", field, value);
    }
    let validation = &document.validation;
    for error in &validation.errors {
        println!("  \u{2717} {}", error);
    }
    for warning in &validation.warnings {
        println!("  \u{26A0} {}", warning);
    }
    for suggestion in &validation.suggestions {
        println!("  \u{2139} {}", suggestion);
    }
    println!();
}

#[derive(Debug, Clone, Tabled)]
struct DocumentRow {
    #[tabled(rename = "File")]
    filename: String,
    #[tabled(rename = "Type")]
    document_type: String,
    #[tabled(rename = "Confidence")]
    confidence: String,
    #[tabled(rename = "Fields")]
    fields: usize,
    #[tabled(rename = "Valid")]
    valid: String,
    #[tabled(rename = "SHA-256")]
    digest: String,
}

impl From<&ProcessedDocument> for DocumentRow {
    fn from(document: &ProcessedDocument) -> Self {
        let result = &document.result;
        DocumentRow {
            filename: result.filename.clone(),
            document_type: result.document_type.to_string(),
            confidence: format!("{:.3}", result.confidence_score),
            fields: result.fields.len(),
            valid: if document.validation.is_valid { "yes" } else { "no" }.to_string(),
            digest: result.content_sha256.chars().take(12).collect(),
        }
    }
}

#[derive(Debug, serde::Serialize)]
struct FieldRow<'a> {
    filename: &'a str,
    document_type: &'a str,
    confidence: String,
    field: &'a str,
    value: String,
}
