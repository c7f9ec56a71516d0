//! Extraction rule tables.
//!
//! Each form has two tables. Line rules describe fixed layouts: a pattern is
//! matched against one line at a time and its capture groups are assigned to
//! fields by position. Field patterns are the fallback: one pattern per field,
//! first match over the whole text, value in capture group 1.
//!
//! The built-in tables can be replaced by a JSON file of the same shape.

use super::document::DocumentType;
use super::fields::field_spec;
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Name-like matches shorter than this are discarded as noise
pub const MIN_NAME_LENGTH: usize = 3;

/// A dollar amount token, optionally prefixed with `$`
const AMOUNT: &str = r"\$?[ \t]?(\d[\d,]*(?:\.\d+)?)";
/// A dollar amount following a box label; the `$` is required so years are not picked up
const LABELED_AMOUNT: &str = r"[ \t]*\$[ \t]?(\d[\d,]*(?:\.\d+)?)";
const EIN: &str = r"(\d{2}-\d{7})";
const SSN: &str = r"\b(\d{3}-\d{2}-\d{4})\b";
const PERSON_NAME: &str = r"([A-Z][a-z]+(?:[ \t]+[A-Z][a-z]*\.?)*[ \t]+[A-Z][a-z]+)";
const COMPANY_SUFFIX: &str = r"(?:CORPORATION|CORP|INC|LLC|LTD|COMPANY|CO)";

#[derive(Debug, thiserror::Error)]
pub enum RulesError {
    #[error("invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },
    #[error("rule '{rule}' targets unknown {document_type} field '{field}'")]
    UnknownField {
        rule: String,
        document_type: DocumentType,
        field: String,
    },
    #[error("rule '{rule}' maps {fields} fields but its pattern has {groups} capture groups")]
    CaptureMismatch {
        rule: String,
        fields: usize,
        groups: usize,
    },
    #[error("no rules can be defined for {0} documents")]
    UnclassifiableForm(DocumentType),
    #[error("failed to parse rules: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ExtractionRules {
    pub forms: Vec<FormRules>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FormRules {
    pub document_type: DocumentType,
    #[serde(default)]
    pub line_rules: Vec<LineRule>,
    #[serde(default)]
    pub field_patterns: Vec<FieldPattern>,
}

/// Positional interpretation of a single line
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LineRule {
    pub name: String,
    pub pattern: String,
    /// Field for each capture group in order; `null` ignores the group
    pub fields: Vec<Option<String>>,
}

/// Fallback pattern for a single field
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FieldPattern {
    pub field: String,
    pub pattern: String,
    /// Matches shorter than this many characters are ignored
    #[serde(default)]
    pub min_length: usize,
}

impl LineRule {
    fn new(name: &str, pattern: String, fields: &[Option<&str>]) -> Self {
        LineRule {
            name: name.to_string(),
            pattern,
            fields: fields.iter().map(|f| f.map(str::to_string)).collect(),
        }
    }
}

impl FieldPattern {
    fn new(field: &str, pattern: String) -> Self {
        FieldPattern {
            field: field.to_string(),
            pattern,
            min_length: 0,
        }
    }

    fn name_like(field: &str, pattern: String) -> Self {
        FieldPattern {
            min_length: MIN_NAME_LENGTH,
            ..FieldPattern::new(field, pattern)
        }
    }
}

impl ExtractionRules {
    pub fn from_json<R: Read>(reader: R) -> Result<Self, RulesError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn form(&self, document_type: DocumentType) -> Option<&FormRules> {
        self.forms.iter().find(|f| f.document_type == document_type)
    }

    /// Compile every pattern and check every target field against the form's dictionary.
    pub fn compile(&self) -> Result<CompiledRules, RulesError> {
        let forms = self
            .forms
            .iter()
            .map(|form| form.compile())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CompiledRules { forms })
    }
}

impl Default for ExtractionRules {
    fn default() -> Self {
        ExtractionRules {
            forms: vec![w2_rules(), int_1099_rules(), nec_1099_rules()],
        }
    }
}

fn w2_rules() -> FormRules {
    FormRules {
        document_type: DocumentType::W2,
        line_rules: vec![
            LineRule::new(
                "ein_wages_withholding",
                format!(r"^{EIN}\s+{AMOUNT}\s+{AMOUNT}$"),
                &[Some("employer_ein"), Some("wages"), Some("federal_tax_withheld")],
            ),
            LineRule::new(
                "social_security",
                format!(r"^{AMOUNT}\s+{AMOUNT}$"),
                &[Some("social_security_wages"), Some("social_security_tax")],
            ),
            LineRule::new(
                "medicare",
                format!(r"^{AMOUNT}\s+{AMOUNT}$"),
                &[Some("medicare_wages"), Some("medicare_tax")],
            ),
            LineRule::new(
                "state",
                format!(r"^{AMOUNT}\s+{AMOUNT}\s+([A-Z]{{2}})$"),
                &[Some("state_wages"), Some("state_tax"), Some("state")],
            ),
        ],
        field_patterns: vec![
            FieldPattern::new("wages", format!(r"Wages, tips,? other compensation{LABELED_AMOUNT}")),
            FieldPattern::new(
                "federal_tax_withheld",
                format!(r"Federal income tax withheld{LABELED_AMOUNT}"),
            ),
            FieldPattern::new("social_security_wages", format!(r"Social security wages{LABELED_AMOUNT}")),
            FieldPattern::new(
                "social_security_tax",
                format!(r"Social security tax withheld{LABELED_AMOUNT}"),
            ),
            FieldPattern::new("medicare_wages", format!(r"Medicare wages and tips{LABELED_AMOUNT}")),
            FieldPattern::new("medicare_tax", format!(r"Medicare tax withheld{LABELED_AMOUNT}")),
            FieldPattern::new("state_wages", format!(r"State wages, tips, etc\.?{LABELED_AMOUNT}")),
            FieldPattern::new("state_tax", format!(r"State income tax{LABELED_AMOUNT}")),
            FieldPattern::new("employer_ein", format!(r"\b{EIN}\b")),
            FieldPattern::name_like(
                "employer_name",
                format!(r"\b([A-Z][A-Z&]*(?:[ \t]+[A-Z&]+)*[ \t]+{COMPANY_SUFFIX})\b"),
            ),
            FieldPattern::new("employee_ssn", SSN.to_string()),
            FieldPattern::name_like(
                "employee_name",
                format!(r"[Ee]mployee['’]?s (?:first )?name[^\n]*?{PERSON_NAME}"),
            ),
            FieldPattern::new("state", r"(?m)\bState[ \t]+([A-Z]{2})[ \t]*$".to_string()),
        ],
    }
}

fn payer_patterns() -> Vec<FieldPattern> {
    vec![
        FieldPattern::name_like(
            "payer_name",
            format!(
                r"\b((?:BANK|CREDIT UNION)(?:[ \t]+[A-Z&]+)+|[A-Z][A-Z&]*(?:[ \t]+[A-Z&]+)*[ \t]+(?:BANK|{COMPANY_SUFFIX}))\b"
            ),
        ),
        FieldPattern::new("payer_tin", format!(r"\b{EIN}\b")),
        FieldPattern::new("recipient_ssn", SSN.to_string()),
        FieldPattern::name_like(
            "recipient_name",
            format!(r"[Rr]ecipient['’]?s name[^\n]*?{PERSON_NAME}"),
        ),
        FieldPattern::new(
            "account_number",
            r"Account number[^\n]*?[ \t]([A-Z0-9][A-Z0-9-]{3,})\b".to_string(),
        ),
        FieldPattern::new(
            "federal_tax_withheld",
            format!(r"Federal income tax withheld{LABELED_AMOUNT}"),
        ),
    ]
}

fn int_1099_rules() -> FormRules {
    let mut field_patterns = vec![FieldPattern::new(
        "interest_income",
        format!(r"Interest income{LABELED_AMOUNT}"),
    )];
    field_patterns.extend(payer_patterns());
    FormRules {
        document_type: DocumentType::Int1099,
        line_rules: vec![LineRule::new(
            "payer_address_interest",
            format!(r"\b\d{{5}}(?:-\d{{4}})?\s+{AMOUNT}\s+For calendar year"),
            &[Some("interest_income")],
        )],
        field_patterns,
    }
}

fn nec_1099_rules() -> FormRules {
    let mut field_patterns = vec![FieldPattern::new(
        "nonemployee_compensation",
        format!(r"Nonemployee compensation{LABELED_AMOUNT}"),
    )];
    field_patterns.extend(payer_patterns());
    FormRules {
        document_type: DocumentType::Nec1099,
        line_rules: vec![LineRule::new(
            "payer_tin_compensation",
            format!(r"^{EIN}\s+{AMOUNT}\s+For Internal Revenue"),
            &[Some("payer_tin"), Some("nonemployee_compensation")],
        )],
        field_patterns,
    }
}

#[derive(Debug)]
pub struct CompiledRules {
    forms: Vec<CompiledForm>,
}

impl CompiledRules {
    pub fn form(&self, document_type: DocumentType) -> Option<&CompiledForm> {
        self.forms.iter().find(|f| f.document_type == document_type)
    }
}

#[derive(Debug)]
pub struct CompiledForm {
    pub document_type: DocumentType,
    pub line_rules: Vec<CompiledLineRule>,
    pub field_patterns: Vec<CompiledFieldPattern>,
}

#[derive(Debug)]
pub struct CompiledLineRule {
    pub name: String,
    pub regex: Regex,
    pub fields: Vec<Option<String>>,
}

#[derive(Debug)]
pub struct CompiledFieldPattern {
    pub field: String,
    pub regex: Regex,
    pub min_length: usize,
}

impl FormRules {
    fn compile(&self) -> Result<CompiledForm, RulesError> {
        if self.document_type == DocumentType::Unknown {
            return Err(RulesError::UnclassifiableForm(self.document_type));
        }

        let line_rules = self
            .line_rules
            .iter()
            .map(|rule| {
                let regex = compile_pattern(&rule.name, &rule.pattern)?;
                let groups = regex.captures_len() - 1;
                if groups != rule.fields.len() {
                    return Err(RulesError::CaptureMismatch {
                        rule: rule.name.clone(),
                        fields: rule.fields.len(),
                        groups,
                    });
                }
                for field in rule.fields.iter().flatten() {
                    self.check_field(&rule.name, field)?;
                }
                Ok(CompiledLineRule {
                    name: rule.name.clone(),
                    regex,
                    fields: rule.fields.clone(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let field_patterns = self
            .field_patterns
            .iter()
            .map(|pattern| {
                self.check_field(&pattern.field, &pattern.field)?;
                let regex = compile_pattern(&pattern.field, &pattern.pattern)?;
                if regex.captures_len() < 2 {
                    return Err(RulesError::CaptureMismatch {
                        rule: pattern.field.clone(),
                        fields: 1,
                        groups: 0,
                    });
                }
                Ok(CompiledFieldPattern {
                    field: pattern.field.clone(),
                    regex,
                    min_length: pattern.min_length,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(CompiledForm {
            document_type: self.document_type,
            line_rules,
            field_patterns,
        })
    }

    fn check_field(&self, rule: &str, field: &str) -> Result<(), RulesError> {
        match field_spec(self.document_type, field) {
            Some(_) => Ok(()),
            None => Err(RulesError::UnknownField {
                rule: rule.to_string(),
                document_type: self.document_type,
                field: field.to_string(),
            }),
        }
    }
}

fn compile_pattern(rule: &str, pattern: &str) -> Result<Regex, RulesError> {
    Regex::new(pattern).map_err(|source| RulesError::InvalidPattern {
        rule: rule.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_compile() {
        let compiled = ExtractionRules::default().compile().unwrap();
        for document_type in DocumentType::PRIORITY {
            assert!(compiled.form(document_type).is_some(), "{document_type}");
        }
        assert!(compiled.form(DocumentType::Unknown).is_none());
    }

    #[test]
    fn default_rules_round_trip_through_json() {
        let json = serde_json::to_string(&ExtractionRules::default()).unwrap();
        let rules = ExtractionRules::from_json(json.as_bytes()).unwrap();
        assert_eq!(rules.forms.len(), 3);
        assert!(rules.compile().is_ok());
    }

    #[test]
    fn unknown_field_is_rejected() {
        let json = r#"{"forms": [{
            "document_type": "1099-INT",
            "field_patterns": [{"field": "wages", "pattern": "(\\d+)"}]
        }]}"#;
        let err = ExtractionRules::from_json(json.as_bytes())
            .unwrap()
            .compile()
            .unwrap_err();
        assert!(matches!(err, RulesError::UnknownField { ref field, .. } if field == "wages"));
    }

    #[test]
    fn capture_count_must_match_fields() {
        let json = r#"{"forms": [{
            "document_type": "W-2",
            "line_rules": [{"name": "short", "pattern": "^(\\d+)$", "fields": ["wages", "state"]}]
        }]}"#;
        let err = ExtractionRules::from_json(json.as_bytes())
            .unwrap()
            .compile()
            .unwrap_err();
        assert!(matches!(err, RulesError::CaptureMismatch { fields: 2, groups: 1, .. }));
    }

    #[test]
    fn invalid_regex_is_rejected() {
        let json = r#"{"forms": [{
            "document_type": "W-2",
            "field_patterns": [{"field": "wages", "pattern": "([0-9]+"}]
        }]}"#;
        let err = ExtractionRules::from_json(json.as_bytes())
            .unwrap()
            .compile()
            .unwrap_err();
        assert!(matches!(err, RulesError::InvalidPattern { .. }));
    }

    #[test]
    fn unknown_form_cannot_have_rules() {
        let json = r#"{"forms": [{"document_type": "UNKNOWN"}]}"#;
        let err = ExtractionRules::from_json(json.as_bytes())
            .unwrap()
            .compile()
            .unwrap_err();
        assert!(matches!(err, RulesError::UnclassifiableForm(DocumentType::Unknown)));
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = ExtractionRules::from_json("{".as_bytes()).unwrap_err();
        assert!(matches!(err, RulesError::Parse(_)));
    }
}
