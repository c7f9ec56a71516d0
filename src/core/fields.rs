//! Field dictionaries for each supported form. These are the wire contract
//! consumed by downstream rendering; the extractor expects exactly these fields.

use super::document::DocumentType;
use rust_decimal::Decimal;
use serde::Serialize;
use taxform_derive::FieldSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldKind {
    Amount,
    Text,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    /// Required fields produce a validation warning when missing
    pub required: bool,
    pub kind: FieldKind,
    pub description: &'static str,
}

#[derive(FieldSchema)]
#[allow(dead_code)]
pub struct W2Fields {
    /// Box 1: wages, tips, other compensation
    wages: Decimal,
    /// Box 2: federal income tax withheld
    federal_tax_withheld: Decimal,
    /// Box 3: social security wages
    social_security_wages: Option<Decimal>,
    /// Box 4: social security tax withheld
    social_security_tax: Option<Decimal>,
    /// Box 5: medicare wages and tips
    medicare_wages: Option<Decimal>,
    /// Box 6: medicare tax withheld
    medicare_tax: Option<Decimal>,
    /// Box 16: state wages, tips, etc.
    state_wages: Option<Decimal>,
    /// Box 17: state income tax
    state_tax: Option<Decimal>,
    /// Box b: employer identification number (EIN)
    employer_ein: Option<String>,
    /// Box c: employer's name
    employer_name: Option<String>,
    /// Box a: employee's social security number
    employee_ssn: Option<String>,
    /// Box e: employee's name
    employee_name: Option<String>,
    /// Box 15: two letter state code
    state: Option<String>,
}

#[derive(FieldSchema)]
#[allow(dead_code)]
pub struct Int1099Fields {
    /// Box 1: interest income
    interest_income: Option<Decimal>,
    /// Box 4: federal income tax withheld
    federal_tax_withheld: Option<Decimal>,
    /// Payer's name
    payer_name: Option<String>,
    /// Payer's TIN
    payer_tin: Option<String>,
    /// Recipient's name
    recipient_name: Option<String>,
    /// Recipient's TIN
    recipient_ssn: Option<String>,
    /// Account number
    account_number: Option<String>,
}

#[derive(FieldSchema)]
#[allow(dead_code)]
pub struct Nec1099Fields {
    /// Box 1: nonemployee compensation
    nonemployee_compensation: Option<Decimal>,
    /// Box 4: federal income tax withheld
    federal_tax_withheld: Option<Decimal>,
    /// Payer's name
    payer_name: Option<String>,
    /// Payer's TIN
    payer_tin: Option<String>,
    /// Recipient's name
    recipient_name: Option<String>,
    /// Recipient's TIN
    recipient_ssn: Option<String>,
    /// Account number
    account_number: Option<String>,
}

/// Fields the extractor expects for a document type. Empty for unknown documents.
pub fn expected_fields(document_type: DocumentType) -> &'static [FieldSpec] {
    match document_type {
        DocumentType::W2 => W2Fields::field_schema(),
        DocumentType::Int1099 => Int1099Fields::field_schema(),
        DocumentType::Nec1099 => Nec1099Fields::field_schema(),
        DocumentType::Unknown => &[],
    }
}

pub fn field_spec(document_type: DocumentType, name: &str) -> Option<&'static FieldSpec> {
    expected_fields(document_type).iter().find(|f| f.name == name)
}
