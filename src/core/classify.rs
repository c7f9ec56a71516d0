use super::document::DocumentType;

const W2_INDICATORS: &[&str] = &[
    "FORM W-2",
    "WAGE AND TAX STATEMENT",
    "EMPLOYER IDENTIFICATION NUMBER",
];

const INT_1099_INDICATORS: &[&str] = &["FORM 1099-INT", "INTEREST INCOME", "PAYER'S NAME"];

const NEC_1099_INDICATORS: &[&str] = &[
    "FORM 1099-NEC",
    "NONEMPLOYEE COMPENSATION",
    "PAYER'S NAME",
];

/// Document type with the fraction of its indicators found in the text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub document_type: DocumentType,
    pub confidence: f64,
}

pub fn indicators(document_type: DocumentType) -> &'static [&'static str] {
    match document_type {
        DocumentType::W2 => W2_INDICATORS,
        DocumentType::Int1099 => INT_1099_INDICATORS,
        DocumentType::Nec1099 => NEC_1099_INDICATORS,
        DocumentType::Unknown => &[],
    }
}

/// Score every classifiable type, in priority order.
pub fn indicator_scores(text: &str) -> Vec<Classification> {
    let text = text.to_uppercase();
    DocumentType::PRIORITY
        .iter()
        .map(|&document_type| {
            let phrases = indicators(document_type);
            let present = phrases.iter().filter(|p| text.contains(*p)).count();
            Classification {
                document_type,
                confidence: present as f64 / phrases.len() as f64,
            }
        })
        .collect()
}

/// Pick the highest scoring type. Ties go to the earlier type in
/// [`DocumentType::PRIORITY`], so text with no indicators at all comes back as
/// a W-2 with zero confidence.
pub fn classify(text: &str) -> Classification {
    let scores = indicator_scores(text);
    let mut best = scores[0];
    for candidate in &scores[1..] {
        if candidate.confidence > best.confidence {
            best = *candidate;
        }
    }
    log::debug!(
        "classified as {} (confidence {:.3})",
        best.document_type,
        best.confidence
    );
    best
}
