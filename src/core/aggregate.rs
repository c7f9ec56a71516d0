use super::document::{DocumentType, ExtractionResult};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Income and withholding totals across a set of documents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeAggregate {
    #[schemars(with = "f64")]
    pub wages: Decimal,
    #[schemars(with = "f64")]
    pub interest_income: Decimal,
    #[schemars(with = "f64")]
    pub nonemployee_compensation: Decimal,
    #[schemars(with = "f64")]
    pub federal_withheld: Decimal,
}

impl IncomeAggregate {
    /// Contribution of one document. Missing fields count as zero and
    /// unknown documents contribute nothing.
    pub fn from_result(result: &ExtractionResult) -> Self {
        let amount = |field: &str| result.amount(field).unwrap_or_default();
        match result.document_type {
            DocumentType::W2 => IncomeAggregate {
                wages: amount("wages"),
                federal_withheld: amount("federal_tax_withheld"),
                ..Default::default()
            },
            DocumentType::Int1099 => IncomeAggregate {
                interest_income: amount("interest_income"),
                federal_withheld: amount("federal_tax_withheld"),
                ..Default::default()
            },
            DocumentType::Nec1099 => IncomeAggregate {
                nonemployee_compensation: amount("nonemployee_compensation"),
                federal_withheld: amount("federal_tax_withheld"),
                ..Default::default()
            },
            DocumentType::Unknown => IncomeAggregate::default(),
        }
    }

    /// Field-wise sum, `None` if any total overflows.
    pub fn checked_add(&self, rhs: &IncomeAggregate) -> Option<IncomeAggregate> {
        Some(IncomeAggregate {
            wages: self.wages.checked_add(rhs.wages)?,
            interest_income: self.interest_income.checked_add(rhs.interest_income)?,
            nonemployee_compensation: self
                .nonemployee_compensation
                .checked_add(rhs.nonemployee_compensation)?,
            federal_withheld: self.federal_withheld.checked_add(rhs.federal_withheld)?,
        })
    }
}

/// Totals plus the documents that did not contribute to them
#[derive(Debug, Default)]
pub struct Aggregation {
    pub income: IncomeAggregate,
    pub failures: Vec<(String, String)>,
}

/// Fold per-document results into income totals. A document that failed
/// processing, or whose amounts would overflow the running totals,
/// contributes zero and is recorded instead of aborting the fold.
pub fn aggregate<'a, I>(results: I) -> Aggregation
where
    I: IntoIterator<Item = &'a ExtractionResult>,
{
    let mut aggregation = Aggregation::default();
    for result in results {
        if let Some(error) = &result.error {
            aggregation.failures.push((result.filename.clone(), error.clone()));
            continue;
        }
        let contribution = IncomeAggregate::from_result(result);
        match aggregation.income.checked_add(&contribution) {
            Some(income) => aggregation.income = income,
            None => {
                log::warn!("{}: amounts overflow the batch totals, excluded", result.filename);
                aggregation.failures.push((
                    result.filename.clone(),
                    "amounts overflow the batch totals".to_string(),
                ));
            }
        }
    }
    aggregation
}
