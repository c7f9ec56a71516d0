use super::document::{DocumentError, DocumentType, FieldValue, Fields};
use super::fields::{expected_fields, field_spec, FieldKind, FieldSpec};
use super::rules::{CompiledForm, CompiledRules};
use rust_decimal::Decimal;

/// Fields pulled from a document and the share of expected fields found
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub fields: Fields,
    pub confidence: f64,
}

/// Field extractor for one form type, driven by that form's rule tables
pub struct FieldExtractor<'a> {
    document_type: DocumentType,
    expected: &'static [FieldSpec],
    rules: Option<&'a CompiledForm>,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(document_type: DocumentType, rules: &'a CompiledRules) -> Self {
        FieldExtractor {
            document_type,
            expected: expected_fields(document_type),
            rules: rules.form(document_type),
        }
    }

    pub fn extract(&self, text: &str) -> Result<Extraction, DocumentError> {
        let mut fields = Fields::new();
        if let Some(rules) = self.rules {
            self.match_lines(rules, text, &mut fields)?;
            self.match_patterns(rules, text, &mut fields)?;
        }

        let confidence = if self.expected.is_empty() {
            0.0
        } else {
            fields.len() as f64 / self.expected.len() as f64
        };
        Ok(Extraction { fields, confidence })
    }

    /// Structural phase. A rule fires on a line only if none of its target
    /// fields is populated yet, so repeated lines of the same shape fill the
    /// next rule in table order.
    fn match_lines(&self, rules: &CompiledForm, text: &str, fields: &mut Fields) -> Result<(), DocumentError> {
        for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
            for rule in &rules.line_rules {
                if rule.fields.iter().flatten().any(|f| fields.contains_key(f)) {
                    continue;
                }
                let Some(captures) = rule.regex.captures(line) else {
                    continue;
                };
                log::debug!("{}: line rule '{}' matched '{}'", self.document_type, rule.name, line);
                for (index, field) in rule.fields.iter().enumerate() {
                    let (Some(field), Some(value)) = (field, captures.get(index + 1)) else {
                        continue;
                    };
                    let value = self.parse_value(field, value.as_str())?;
                    fields.insert(field.clone(), value);
                }
                break;
            }
        }
        Ok(())
    }

    /// Fallback phase for every expected field the structural phase missed.
    fn match_patterns(&self, rules: &CompiledForm, text: &str, fields: &mut Fields) -> Result<(), DocumentError> {
        for pattern in &rules.field_patterns {
            if fields.contains_key(&pattern.field) {
                continue;
            }
            let Some(found) = pattern.regex.captures(text).and_then(|c| c.get(1)) else {
                continue;
            };
            let raw = found.as_str().trim();
            if raw.chars().count() < pattern.min_length {
                log::debug!("{}: discarding short match '{}' for {}", self.document_type, raw, pattern.field);
                continue;
            }
            let value = self.parse_value(&pattern.field, raw)?;
            fields.insert(pattern.field.clone(), value);
        }
        Ok(())
    }

    fn parse_value(&self, field: &str, raw: &str) -> Result<FieldValue, DocumentError> {
        let kind = field_spec(self.document_type, field).map_or(FieldKind::Text, |spec| spec.kind);
        match kind {
            FieldKind::Amount => parse_amount(raw)
                .map(FieldValue::Amount)
                .ok_or_else(|| DocumentError::InvalidAmount {
                    field: field.to_string(),
                    value: raw.to_string(),
                }),
            FieldKind::Text => Ok(FieldValue::Text(raw.trim().to_string())),
        }
    }
}

/// Parse a dollar amount such as `$12,000.00`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | ',') && !c.is_whitespace())
        .collect();
    cleaned.parse::<Decimal>().ok().filter(|d| !d.is_sign_negative())
}
