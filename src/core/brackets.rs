use super::us::TaxBracket;
use crate::money::{format_rate, format_usd_whole};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Tax owed on the slice of income falling inside one bracket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct BracketLine {
    #[schemars(with = "f64")]
    pub rate: Decimal,
    #[schemars(with = "f64")]
    pub min_income: Decimal,
    #[schemars(with = "Option<f64>")]
    pub max_income: Option<Decimal>,
    #[schemars(with = "f64")]
    pub taxed_amount: Decimal,
    #[schemars(with = "f64")]
    pub tax_for_bracket: Decimal,
}

impl BracketLine {
    /// e.g. `12%`
    pub fn rate_label(&self) -> String {
        format_rate(self.rate)
    }

    /// e.g. `$11,600 - $47,150`, or `$609,350+` for the top bracket
    pub fn range_label(&self) -> String {
        match self.max_income {
            Some(max) => format!("{} - {}", format_usd_whole(self.min_income), format_usd_whole(max)),
            None => format!("{}+", format_usd_whole(self.min_income)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BracketTax {
    pub total: Decimal,
    pub breakdown: Vec<BracketLine>,
}

/// Progressive tax on `taxable_income`. Only brackets the income actually
/// reaches appear in the breakdown, and the total is exactly their sum.
pub fn calculate_bracket_tax(taxable_income: Decimal, brackets: &[TaxBracket]) -> BracketTax {
    let mut result = BracketTax::default();

    for bracket in brackets {
        if taxable_income <= bracket.min_income {
            continue;
        }
        let upper = bracket
            .max_income
            .map_or(taxable_income, |max| taxable_income.min(max));
        let taxed_amount = upper - bracket.min_income;
        let tax_for_bracket = taxed_amount * bracket.rate;
        log::debug!(
            "bracket {} from {}: taxed {} -> {}",
            bracket.rate,
            bracket.min_income,
            taxed_amount,
            tax_for_bracket
        );

        result.total += tax_for_bracket;
        result.breakdown.push(BracketLine {
            rate: bracket.rate,
            min_income: bracket.min_income,
            max_income: bracket.max_income,
            taxed_amount,
            tax_for_bracket,
        });
    }

    result
}
