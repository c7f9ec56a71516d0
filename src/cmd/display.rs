//! Text rendering shared by the calculate and estimate commands

use crate::core::TaxResult;
use crate::money::format_usd;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

#[derive(Debug, Clone, Tabled)]
struct BracketRow {
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Income Range")]
    range: String,
    #[tabled(rename = "Taxed Amount")]
    taxed_amount: String,
    #[tabled(rename = "Tax")]
    tax: String,
}

pub fn print_tax_result(result: &TaxResult) {
    println!();
    println!("FEDERAL INCOME TAX {} ({})", result.tax_year, result.filing_status);
    println!("  Dependents: {} | Age: {}", result.dependents, result.age);
    println!();

    println!("INCOME");
    println!("  Wages: {}", format_usd(result.income.wages));
    println!("  Interest: {}", format_usd(result.income.interest_income));
    println!(
        "  Nonemployee compensation: {}",
        format_usd(result.income.nonemployee_compensation)
    );
    println!("  Total: {}", format_usd(result.total_income));
    println!();

    println!("TAX CALCULATION");
    println!("  Adjusted gross income: {}", format_usd(result.adjusted_gross_income));
    println!("  Standard deduction: {}", format_usd(result.standard_deduction));
    println!("  Taxable income: {}", format_usd(result.taxable_income));
    println!("  Tax liability: {}", format_usd(result.tax_liability));
    println!("  Payments (withheld): {}", format_usd(result.total_payments));
    println!("  Effective rate: {}%", result.effective_tax_rate);
    println!();

    print_brackets(result);

    if result.is_refund() {
        println!("REFUND: {}", format_usd(result.refund_or_amount_owed));
    } else {
        println!("AMOUNT OWED: {}", format_usd(-result.refund_or_amount_owed));
    }

    for warning in &result.warnings {
        println!("\u{26A0} {}", warning);
    }
    println!();
}

fn print_brackets(result: &TaxResult) {
    if result.bracket_breakdown.is_empty() {
        println!("No taxable income");
        println!();
        return;
    }

    let rows: Vec<_> = result
        .bracket_breakdown
        .iter()
        .map(|line| BracketRow {
            rate: line.rate_label(),
            range: line.range_label(),
            taxed_amount: format_usd(line.taxed_amount),
            tax: format_usd(line.tax_for_bracket),
        })
        .collect();
    let table = Table::new(rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()))
        .to_string();
    println!("{}", table);
    println!();
}
