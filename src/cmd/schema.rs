//! Schema command - print field dictionaries, output schemas and the default rules

use crate::core::{expected_fields, DocumentType, ExtractionResult, ExtractionRules, FieldKind, TaxResult};
use clap::Args;
use schemars::schema_for;

#[derive(Args, Debug)]
pub struct SchemaCommand {
    /// What to print
    #[arg(value_enum, default_value = "fields")]
    format: SchemaFormat,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum SchemaFormat {
    /// Expected fields for each form type
    Fields,
    /// JSON Schema for a processed document
    ExtractionResult,
    /// JSON Schema for a tax calculation
    TaxResult,
    /// Built-in extraction rules, in the format accepted by --rules
    Rules,
}

impl SchemaCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        match self.format {
            SchemaFormat::Fields => self.print_fields(),
            SchemaFormat::ExtractionResult => {
                println!("{}", serde_json::to_string_pretty(&schema_for!(ExtractionResult))?);
                Ok(())
            }
            SchemaFormat::TaxResult => {
                println!("{}", serde_json::to_string_pretty(&schema_for!(TaxResult))?);
                Ok(())
            }
            SchemaFormat::Rules => {
                println!("{}", serde_json::to_string_pretty(&ExtractionRules::default())?);
                Ok(())
            }
        }
    }

    fn print_fields(&self) -> anyhow::Result<()> {
        for document_type in DocumentType::PRIORITY {
            println!("{}", document_type);
            println!("{}", "=".repeat(document_type.label().len()));
            for spec in expected_fields(document_type) {
                let req = if spec.required { "required" } else { "optional" };
                let kind = match spec.kind {
                    FieldKind::Amount => "amount",
                    FieldKind::Text => "text",
                };
                println!("{:26} ({:8}, {:6})  {}", spec.name, req, kind, spec.description);
            }
            println!();
        }
        Ok(())
    }
}
