//! Calculate command - federal income tax from a batch of tax documents

use super::display::print_tax_result;
use crate::core::{IncomeAggregate, ProcessedDocument, TaxCalculator, TaxInput, TaxResult, TaxYear};
use crate::money::format_usd;
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct CalculateCommand {
    /// Tax documents to process (PDF or text)
    #[arg(short, long = "documents", num_args = 1.., required = true)]
    documents: Vec<PathBuf>,

    /// Filing status: single, married or head_of_household
    #[arg(short = 's', long, default_value = "single")]
    filing_status: String,

    /// Number of dependents
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    dependents: i64,

    /// Age of the filer at the end of the tax year
    #[arg(long, default_value_t = 30, allow_negative_numbers = true)]
    age: i64,

    /// Tax year
    #[arg(short, long, default_value_t = 2024)]
    year: i32,

    /// JSON file replacing the built-in extraction rules
    #[arg(short, long)]
    rules: Option<PathBuf>,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct CalculationOutput<'a> {
    tax_calculation: &'a TaxResult,
    income: &'a IncomeAggregate,
    processed_documents: Vec<DocumentSummary<'a>>,
    validation_warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
struct DocumentSummary<'a> {
    filename: &'a str,
    document_type: &'a str,
    confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<&'a str>,
}

impl CalculateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let calculator = TaxCalculator::new(TaxYear(self.year))?;
        let processor = super::load_processor(self.rules.as_deref())?;
        let batch = processor.process_files(&self.documents);
        let income = batch.aggregation.income;

        let input = TaxInput::new(&self.filing_status, &income, self.dependents, self.age);
        let result = calculator.calculate(&input)?;
        let warnings = validation_warnings(&batch.documents);

        if self.json {
            let output = CalculationOutput {
                tax_calculation: &result,
                income: &income,
                processed_documents: batch.documents.iter().map(DocumentSummary::from).collect(),
                validation_warnings: warnings,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
            return Ok(());
        }

        println!();
        println!("DOCUMENTS");
        for document in &batch.documents {
            let result = &document.result;
            match &result.error {
                Some(error) => println!("  {} ({}) - {}", result.filename, result.document_type, error),
                None => println!(
                    "  {} ({}, confidence {:.3})",
                    result.filename, result.document_type, result.confidence_score
                ),
            }
        }
        println!(
            "  Federal tax withheld: {}",
            format_usd(income.federal_withheld)
        );

        print_tax_result(&result);

        if !warnings.is_empty() {
            println!("VALIDATION WARNINGS");
            for warning in &warnings {
                println!("  \u{26A0} {}", warning);
            }
            println!();
        }
        Ok(())
    }
}

/// Every validation issue, prefixed with the file it was raised for
fn validation_warnings(documents: &[ProcessedDocument]) -> Vec<String> {
    documents
        .iter()
        .flat_map(|document| {
            let validation = &document.validation;
            validation
                .errors
                .iter()
                .chain(&validation.warnings)
                .chain(&validation.suggestions)
                .map(move |issue| format!("{}: {}", document.result.filename, issue))
        })
        .collect()
}

impl<'a> From<&'a ProcessedDocument> for DocumentSummary<'a> {
    fn from(document: &'a ProcessedDocument) -> Self {
        let result = &document.result;
        DocumentSummary {
            filename: &result.filename,
            document_type: result.document_type.label(),
            confidence: result.confidence_score,
            error: result.error.as_deref(),
        }
    }
}
