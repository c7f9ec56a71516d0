pub mod aggregate;
pub mod brackets;
pub mod calculator;
pub mod classify;
pub mod document;
pub mod extract;
pub mod fields;
pub mod pipeline;
pub mod rules;
pub mod text;
pub mod us;
pub mod validation;
pub mod warnings;

// Flat public surface for domain types and functions.
pub use aggregate::IncomeAggregate;
pub use brackets::BracketLine;
pub use calculator::{TaxCalculator, TaxInput, TaxResult};
pub use document::{DocumentType, ExtractionResult};
pub use fields::{expected_fields, FieldKind};
pub use pipeline::{DocumentProcessor, ProcessedBatch, ProcessedDocument};
pub use rules::ExtractionRules;
pub use us::TaxYear;
