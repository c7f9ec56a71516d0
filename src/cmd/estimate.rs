//! Estimate command - quick tax estimate without documents

use super::display::print_tax_result;
use crate::core::{BracketLine, IncomeAggregate, TaxCalculator, TaxInput, TaxYear};
use clap::Args;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct EstimateCommand {
    /// Total income, treated as wages
    #[arg(short, long, allow_negative_numbers = true)]
    income: Decimal,

    /// Federal income tax already withheld
    #[arg(short, long, default_value_t = Decimal::ZERO, allow_negative_numbers = true)]
    withheld: Decimal,

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

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct EstimateOutput<'a> {
    total_income: Decimal,
    tax_liability: Decimal,
    federal_withheld: Decimal,
    refund_or_amount_owed: Decimal,
    effective_tax_rate: Decimal,
    breakdown: &'a [BracketLine],
    warnings: &'a [String],
}

impl EstimateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let calculator = TaxCalculator::new(TaxYear(self.year))?;
        let income = IncomeAggregate {
            wages: self.income,
            federal_withheld: self.withheld,
            ..Default::default()
        };
        let input = TaxInput::new(&self.filing_status, &income, self.dependents, self.age);
        let result = calculator.calculate(&input)?;

        if self.json {
            let output = EstimateOutput {
                total_income: result.total_income,
                tax_liability: result.tax_liability,
                federal_withheld: result.total_payments,
                refund_or_amount_owed: result.refund_or_amount_owed,
                effective_tax_rate: result.effective_tax_rate,
                breakdown: &result.bracket_breakdown,
                warnings: &result.warnings,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_tax_result(&result);
        }
        Ok(())
    }
}
