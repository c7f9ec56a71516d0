use super::aggregate::IncomeAggregate;
use super::brackets::{calculate_bracket_tax, BracketLine};
use super::us::{FilingStatus, TaxYear, SENIOR_AGE};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ages outside this range are accepted but flagged
pub const PLAUSIBLE_AGE: std::ops::RangeInclusive<i64> = 0..=120;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalculationError {
    #[error("invalid input: {}", .errors.join("; "))]
    InvalidInput { errors: Vec<String> },
    #[error("tax year {0} is not supported")]
    UnsupportedTaxYear(i32),
}

/// Everything needed for one calculation. The filing status stays a string
/// until validation so that a bad value is reported alongside other errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TaxInput {
    pub filing_status: String,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub wages: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub interest_income: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub nonemployee_compensation: Decimal,
    #[serde(default)]
    #[schemars(with = "f64")]
    pub federal_withheld: Decimal,
    /// Validated only; dependents do not change the result in this model
    #[serde(default)]
    pub dependents: i64,
    #[serde(default)]
    pub age: i64,
}

impl TaxInput {
    pub fn new(filing_status: impl Into<String>, income: &IncomeAggregate, dependents: i64, age: i64) -> Self {
        TaxInput {
            filing_status: filing_status.into(),
            wages: income.wages,
            interest_income: income.interest_income,
            nonemployee_compensation: income.nonemployee_compensation,
            federal_withheld: income.federal_withheld,
            dependents,
            age,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InputValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl InputValidation {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Collect every input problem rather than stopping at the first.
pub fn validate_inputs(input: &TaxInput) -> InputValidation {
    let mut validation = InputValidation::default();

    let amounts = [
        ("wages", input.wages),
        ("interest_income", input.interest_income),
        ("nonemployee_compensation", input.nonemployee_compensation),
        ("federal_withheld", input.federal_withheld),
    ];
    for (name, value) in amounts {
        if value.is_sign_negative() && !value.is_zero() {
            validation.errors.push(format!("{name} cannot be negative"));
        }
    }
    for (name, value) in [("dependents", input.dependents), ("age", input.age)] {
        if value < 0 {
            validation.errors.push(format!("{name} cannot be negative"));
        }
    }

    if FilingStatus::from_str(&input.filing_status).is_none() {
        let valid: Vec<_> = FilingStatus::ALL.iter().map(|s| s.as_str()).collect();
        validation.errors.push(format!(
            "Invalid filing status '{}'. Must be one of: {}",
            input.filing_status,
            valid.join(", ")
        ));
    }

    if !PLAUSIBLE_AGE.contains(&input.age) {
        validation.warnings.push("Age seems unusual, please verify".to_string());
    }

    validation
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct IncomeBreakdown {
    #[schemars(with = "f64")]
    pub wages: Decimal,
    #[schemars(with = "f64")]
    pub interest_income: Decimal,
    #[schemars(with = "f64")]
    pub nonemployee_compensation: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxResult {
    pub tax_year: i32,
    pub filing_status: FilingStatus,
    pub dependents: i64,
    pub age: i64,
    pub income: IncomeBreakdown,
    #[schemars(with = "f64")]
    pub total_income: Decimal,
    #[schemars(with = "f64")]
    pub adjusted_gross_income: Decimal,
    #[schemars(with = "f64")]
    pub standard_deduction: Decimal,
    #[schemars(with = "f64")]
    pub taxable_income: Decimal,
    #[schemars(with = "f64")]
    pub tax_liability: Decimal,
    #[schemars(with = "f64")]
    pub total_payments: Decimal,
    /// Positive is a refund, negative is an amount owed
    #[schemars(with = "f64")]
    pub refund_or_amount_owed: Decimal,
    /// Liability as a percentage of total income
    #[schemars(with = "f64")]
    pub effective_tax_rate: Decimal,
    pub bracket_breakdown: Vec<BracketLine>,
    pub warnings: Vec<String>,
}

impl TaxResult {
    pub fn is_refund(&self) -> bool {
        self.refund_or_amount_owed >= Decimal::ZERO
    }
}

#[derive(Debug, Clone, Copy)]
pub struct TaxCalculator {
    year: TaxYear,
}

impl TaxCalculator {
    pub fn new(year: TaxYear) -> Result<Self, CalculationError> {
        if !year.is_supported() {
            return Err(CalculationError::UnsupportedTaxYear(year.0));
        }
        Ok(TaxCalculator { year })
    }

    /// Base deduction for the status plus the senior addon from age 65.
    pub fn standard_deduction(&self, status: FilingStatus, age: i64) -> Decimal {
        let base = self.year.standard_deduction(status);
        if age >= i64::from(SENIOR_AGE) {
            base + self.year.senior_addon(status)
        } else {
            base
        }
    }

    /// Validate, then compute liability and refund. Fails without computing
    /// anything if any input is invalid.
    pub fn calculate(&self, input: &TaxInput) -> Result<TaxResult, CalculationError> {
        let validation = validate_inputs(input);
        let status = match FilingStatus::from_str(&input.filing_status) {
            Some(status) if validation.is_valid() => status,
            _ => {
                return Err(CalculationError::InvalidInput {
                    errors: validation.errors,
                })
            }
        };

        let total_income = input
            .wages
            .checked_add(input.interest_income)
            .and_then(|sum| sum.checked_add(input.nonemployee_compensation))
            .ok_or_else(|| CalculationError::InvalidInput {
                errors: vec!["total income is too large to calculate".to_string()],
            })?;
        // no above-the-line adjustments are modelled
        let adjusted_gross_income = total_income;
        let standard_deduction = self.standard_deduction(status, input.age);
        let taxable_income = (adjusted_gross_income - standard_deduction).max(Decimal::ZERO);
        let bracket_tax = calculate_bracket_tax(taxable_income, &self.year.brackets(status));
        let tax_liability = bracket_tax.total;
        let total_payments = input.federal_withheld;
        let refund_or_amount_owed = total_payments - tax_liability;
        let effective_tax_rate = if total_income.is_zero() {
            Decimal::ZERO
        } else {
            (tax_liability / total_income * dec!(100)).round_dp(2)
        };

        log::info!(
            "{} {}: taxable {} liability {} refund/owed {}",
            self.year,
            status,
            taxable_income,
            tax_liability,
            refund_or_amount_owed
        );

        Ok(TaxResult {
            tax_year: self.year.0,
            filing_status: status,
            dependents: input.dependents,
            age: input.age,
            income: IncomeBreakdown {
                wages: input.wages,
                interest_income: input.interest_income,
                nonemployee_compensation: input.nonemployee_compensation,
            },
            total_income,
            adjusted_gross_income,
            standard_deduction,
            taxable_income,
            tax_liability,
            total_payments,
            refund_or_amount_owed,
            effective_tax_rate,
            bracket_breakdown: bracket_tax.breakdown,
            warnings: validation.warnings,
        })
    }
}

impl Default for TaxCalculator {
    fn default() -> Self {
        TaxCalculator {
            year: TaxYear::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn input(status: &str, wages: Decimal, withheld: Decimal, age: i64) -> TaxInput {
        TaxInput {
            filing_status: status.to_string(),
            wages,
            interest_income: Decimal::ZERO,
            nonemployee_compensation: Decimal::ZERO,
            federal_withheld: withheld,
            dependents: 0,
            age,
        }
    }

    #[test]
    fn single_filer_gets_a_refund() {
        let result = TaxCalculator::default()
            .calculate(&input("single", dec!(50000), dec!(8000), 30))
            .unwrap();
        assert_eq!(result.total_income, dec!(50000));
        assert_eq!(result.adjusted_gross_income, dec!(50000));
        assert_eq!(result.standard_deduction, dec!(14600));
        assert_eq!(result.taxable_income, dec!(35400));
        assert_eq!(result.tax_liability, dec!(4016));
        assert_eq!(result.total_payments, dec!(8000));
        assert_eq!(result.refund_or_amount_owed, dec!(3984));
        assert!(result.is_refund());
        assert_eq!(result.bracket_breakdown.len(), 2);
        assert_eq!(result.effective_tax_rate, dec!(8.03));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn amount_owed_is_negative() {
        let result = TaxCalculator::default()
            .calculate(&input("single", dec!(50000), dec!(1000), 30))
            .unwrap();
        assert_eq!(result.refund_or_amount_owed, dec!(-3016));
        assert!(!result.is_refund());
    }

    #[test]
    fn income_below_deduction_is_not_taxed() {
        let result = TaxCalculator::default()
            .calculate(&input("married", dec!(20000), dec!(500), 40))
            .unwrap();
        assert_eq!(result.taxable_income, Decimal::ZERO);
        assert_eq!(result.tax_liability, Decimal::ZERO);
        assert!(result.bracket_breakdown.is_empty());
        assert_eq!(result.refund_or_amount_owed, dec!(500));
    }

    #[test]
    fn all_income_sources_count() {
        let mut i = input("head_of_household", dec!(40000), dec!(0), 30);
        i.interest_income = dec!(300);
        i.nonemployee_compensation = dec!(10000);
        let result = TaxCalculator::default().calculate(&i).unwrap();
        assert_eq!(result.total_income, dec!(50300));
        assert_eq!(result.taxable_income, dec!(28400));
        // 10% of 16,550 + 12% of 11,850
        assert_eq!(result.tax_liability, dec!(3077));
    }

    #[test]
    fn filing_status_is_case_insensitive() {
        let result = TaxCalculator::default()
            .calculate(&input("Head_Of_Household", dec!(50000), dec!(0), 30))
            .unwrap();
        assert_eq!(result.filing_status, FilingStatus::HeadOfHousehold);
    }

    #[test]
    fn senior_addon_applies_from_65() {
        let calc = TaxCalculator::default();
        for status in FilingStatus::ALL {
            let base = calc.standard_deduction(status, 64);
            assert_eq!(base, TaxYear(2024).standard_deduction(status));
            assert_eq!(
                calc.standard_deduction(status, 65),
                base + TaxYear(2024).senior_addon(status)
            );
        }
        let result = calc.calculate(&input("single", dec!(50000), dec!(0), 70)).unwrap();
        assert_eq!(result.standard_deduction, dec!(16450));
    }

    #[test]
    fn negative_wages_are_rejected() {
        let err = TaxCalculator::default()
            .calculate(&input("single", dec!(-1), dec!(0), 30))
            .unwrap_err();
        assert_eq!(
            err,
            CalculationError::InvalidInput {
                errors: vec!["wages cannot be negative".to_string()]
            }
        );
    }

    #[test]
    fn unknown_status_is_rejected() {
        let err = TaxCalculator::default()
            .calculate(&input("unknown_status", dec!(50000), dec!(0), 30))
            .unwrap_err();
        match err {
            CalculationError::InvalidInput { errors } => {
                assert_eq!(errors.len(), 1);
                assert!(errors[0].starts_with("Invalid filing status 'unknown_status'"));
                assert!(errors[0].contains("single, married, head_of_household"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn every_violation_is_reported() {
        let mut i = input("bogus", dec!(-5), dec!(-1), -3);
        i.dependents = -1;
        let validation = validate_inputs(&i);
        assert_eq!(
            validation.errors,
            vec![
                "wages cannot be negative".to_string(),
                "federal_withheld cannot be negative".to_string(),
                "dependents cannot be negative".to_string(),
                "age cannot be negative".to_string(),
                "Invalid filing status 'bogus'. Must be one of: single, married, head_of_household"
                    .to_string(),
            ]
        );
        assert_eq!(validation.warnings, vec!["Age seems unusual, please verify".to_string()]);
    }

    #[test]
    fn implausible_age_only_warns() {
        let result = TaxCalculator::default()
            .calculate(&input("single", dec!(50000), dec!(0), 130))
            .unwrap();
        assert_eq!(result.warnings, vec!["Age seems unusual, please verify".to_string()]);
        assert_eq!(result.standard_deduction, dec!(16450));
    }

    #[test]
    fn income_overflow_is_an_input_error() {
        let mut overflowing = input("single", Decimal::MAX, dec!(0), 30);
        overflowing.interest_income = Decimal::MAX;
        assert_eq!(
            TaxCalculator::default().calculate(&overflowing).unwrap_err(),
            CalculationError::InvalidInput {
                errors: vec!["total income is too large to calculate".to_string()]
            }
        );
    }

    #[test]
    fn unsupported_year() {
        assert_eq!(
            TaxCalculator::new(TaxYear(1999)).unwrap_err(),
            CalculationError::UnsupportedTaxYear(1999)
        );
        assert!(TaxCalculator::new(TaxYear(2024)).is_ok());
    }

    #[test]
    fn error_message_lists_violations() {
        let err = CalculationError::InvalidInput {
            errors: vec!["wages cannot be negative".into(), "age cannot be negative".into()],
        };
        assert_eq!(
            err.to_string(),
            "invalid input: wages cannot be negative; age cannot be negative"
        );
    }

    proptest! {
        #[test]
        fn taxable_income_never_negative(wages in 0i64..50_000_000, age in 0i64..120) {
            let result = TaxCalculator::default()
                .calculate(&input("single", Decimal::new(wages, 2), Decimal::ZERO, age))
                .unwrap();
            prop_assert!(result.taxable_income >= Decimal::ZERO);
            prop_assert_eq!(
                result.taxable_income,
                (result.adjusted_gross_income - result.standard_deduction).max(Decimal::ZERO)
            );
            let sum: Decimal = result.bracket_breakdown.iter().map(|b| b.tax_for_bracket).sum();
            prop_assert_eq!(sum, result.tax_liability);
        }
    }
}
