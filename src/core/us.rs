use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Filers at or above this age get the additional standard deduction
pub const SENIOR_AGE: u32 = 65;

/// Federal filing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    #[default]
    Single,
    Married,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 3] = [
        FilingStatus::Single,
        FilingStatus::Married,
        FilingStatus::HeadOfHousehold,
    ];

    /// Case-insensitive parse of `single`, `married` or `head_of_household`
    pub fn from_str(s: &str) -> Option<FilingStatus> {
        match s.trim().to_lowercase().as_str() {
            "single" => Some(FilingStatus::Single),
            "married" => Some(FilingStatus::Married),
            "head_of_household" => Some(FilingStatus::HeadOfHousehold),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FilingStatus::Single => "single",
            FilingStatus::Married => "married",
            FilingStatus::HeadOfHousehold => "head_of_household",
        }
    }
}

impl fmt::Display for FilingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A marginal rate applied to income in `[min_income, max_income)`.
/// `max_income` of `None` is the open-ended top bracket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TaxBracket {
    #[schemars(with = "f64")]
    pub rate: Decimal,
    #[schemars(with = "f64")]
    pub min_income: Decimal,
    #[schemars(with = "Option<f64>")]
    pub max_income: Option<Decimal>,
}

impl TaxBracket {
    fn new(rate: Decimal, min_income: Decimal, max_income: Option<Decimal>) -> Self {
        TaxBracket {
            rate,
            min_income,
            max_income,
        }
    }
}

/// US federal tax year (calendar year)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxYear(pub i32);

impl TaxYear {
    /// Years with a complete rule set
    pub const SUPPORTED: &'static [i32] = &[2024];

    pub fn is_supported(&self) -> bool {
        Self::SUPPORTED.contains(&self.0)
    }

    /// Standard deduction before any age addon
    pub fn standard_deduction(&self, status: FilingStatus) -> Decimal {
        match status {
            FilingStatus::Single => dec!(14600),
            FilingStatus::Married => dec!(29200),
            FilingStatus::HeadOfHousehold => dec!(21900),
        }
    }

    /// Additional standard deduction for filers aged 65 or older
    pub fn senior_addon(&self, status: FilingStatus) -> Decimal {
        match status {
            FilingStatus::Single => dec!(1850),
            FilingStatus::Married => dec!(1500),
            FilingStatus::HeadOfHousehold => dec!(1850),
        }
    }

    /// Brackets in ascending order, contiguous, ending with an unbounded bracket
    pub fn brackets(&self, status: FilingStatus) -> Vec<TaxBracket> {
        let thresholds = match status {
            FilingStatus::Single => [
                dec!(11600),
                dec!(47150),
                dec!(100525),
                dec!(191950),
                dec!(243725),
                dec!(609350),
            ],
            FilingStatus::Married => [
                dec!(23200),
                dec!(94300),
                dec!(201050),
                dec!(383900),
                dec!(487450),
                dec!(731200),
            ],
            FilingStatus::HeadOfHousehold => [
                dec!(16550),
                dec!(63100),
                dec!(100500),
                dec!(191950),
                dec!(243700),
                dec!(609350),
            ],
        };
        let rates = [
            dec!(0.10),
            dec!(0.12),
            dec!(0.22),
            dec!(0.24),
            dec!(0.32),
            dec!(0.35),
            dec!(0.37),
        ];

        let mut brackets = Vec::with_capacity(rates.len());
        let mut min_income = Decimal::ZERO;
        for (i, rate) in rates.iter().enumerate() {
            let max_income = thresholds.get(i).copied();
            brackets.push(TaxBracket::new(*rate, min_income, max_income));
            if let Some(max) = max_income {
                min_income = max;
            }
        }
        brackets
    }
}

impl Default for TaxYear {
    fn default() -> Self {
        TaxYear(2024)
    }
}

impl fmt::Display for TaxYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
