//! Text extraction from raw document bytes.
//!
//! Strategies are tried in order until one yields non-blank text. Every failure
//! inside a strategy, including a panic in an underlying PDF library, is logged
//! and treated as "no text produced". An empty string is a valid result.

use anyhow::{anyhow, bail};
use std::panic::{self, AssertUnwindSafe};

/// How far into the byte stream to look for the PDF header
const PDF_HEADER_WINDOW: usize = 1024;

/// A single way of turning bytes into text
pub trait TextStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, bytes: &[u8]) -> anyhow::Result<String>;
}

/// Layout-aware PDF extraction, better for multi-column forms
#[derive(Debug, Default)]
pub struct LayoutPdfText;

impl TextStrategy for LayoutPdfText {
    fn name(&self) -> &'static str {
        "pdf-extract"
    }

    fn extract(&self, bytes: &[u8]) -> anyhow::Result<String> {
        if !is_pdf(bytes) {
            bail!("not a PDF document");
        }
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| anyhow!("{e}"))
    }
}

/// Basic page-by-page PDF text extraction
#[derive(Debug, Default)]
pub struct BasicPdfText;

impl TextStrategy for BasicPdfText {
    fn name(&self) -> &'static str {
        "lopdf"
    }

    fn extract(&self, bytes: &[u8]) -> anyhow::Result<String> {
        if !is_pdf(bytes) {
            bail!("not a PDF document");
        }
        let document = lopdf::Document::load_mem(bytes)?;
        let mut text = String::new();
        for page_number in document.get_pages().keys() {
            match document.extract_text(&[*page_number]) {
                Ok(page_text) => {
                    text.push_str(&page_text);
                    text.push('\n');
                }
                Err(e) => log::debug!("lopdf: skipping page {}: {}", page_number, e),
            }
        }
        Ok(text)
    }
}

/// Born-digital text exports; anything that is not a PDF but is valid UTF-8
#[derive(Debug, Default)]
pub struct PlainText;

impl TextStrategy for PlainText {
    fn name(&self) -> &'static str {
        "plain-text"
    }

    fn extract(&self, bytes: &[u8]) -> anyhow::Result<String> {
        if is_pdf(bytes) {
            return Ok(String::new());
        }
        Ok(std::str::from_utf8(bytes)?.to_string())
    }
}

pub struct TextExtractor {
    strategies: Vec<Box<dyn TextStrategy>>,
}

impl Default for TextExtractor {
    fn default() -> Self {
        TextExtractor::new(vec![
            Box::new(LayoutPdfText),
            Box::new(BasicPdfText),
            Box::new(PlainText),
        ])
    }
}

impl TextExtractor {
    pub fn new(strategies: Vec<Box<dyn TextStrategy>>) -> Self {
        TextExtractor { strategies }
    }

    /// Extract trimmed text, or an empty string if no strategy produced any.
    pub fn extract(&self, bytes: &[u8]) -> String {
        for strategy in &self.strategies {
            match run_isolated(strategy.as_ref(), bytes) {
                Ok(text) if !text.trim().is_empty() => {
                    log::debug!("{}: extracted {} chars", strategy.name(), text.len());
                    return text.trim().to_string();
                }
                Ok(_) => log::debug!("{}: no text produced", strategy.name()),
                Err(e) => log::warn!("{} failed: {:#}", strategy.name(), e),
            }
        }
        String::new()
    }
}

fn run_isolated(strategy: &dyn TextStrategy, bytes: &[u8]) -> anyhow::Result<String> {
    match panic::catch_unwind(AssertUnwindSafe(|| strategy.extract(bytes))) {
        Ok(result) => result,
        Err(payload) => {
            let reason = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(anyhow!("panicked: {reason}"))
        }
    }
}

fn is_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl TextStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn extract(&self, _bytes: &[u8]) -> anyhow::Result<String> {
            bail!("corrupt stream")
        }
    }

    struct Panicking;

    impl TextStrategy for Panicking {
        fn name(&self) -> &'static str {
            "panicking"
        }

        fn extract(&self, _bytes: &[u8]) -> anyhow::Result<String> {
            panic!("index out of bounds")
        }
    }

    struct Fixed(&'static str);

    impl TextStrategy for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        fn extract(&self, _bytes: &[u8]) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn plain_text_documents_pass_through_trimmed() {
        let text = TextExtractor::default().extract(b"  Form W-2 Wage and Tax Statement\n\n");
        assert_eq!(text, "Form W-2 Wage and Tax Statement");
    }

    #[test]
    fn falls_back_when_primary_fails() {
        let extractor = TextExtractor::new(vec![Box::new(Failing), Box::new(Fixed("fallback"))]);
        assert_eq!(extractor.extract(b"anything"), "fallback");
    }

    #[test]
    fn falls_back_when_primary_yields_blank_text() {
        let extractor = TextExtractor::new(vec![Box::new(Fixed("  \n ")), Box::new(Fixed("second"))]);
        assert_eq!(extractor.extract(b"anything"), "second");
    }

    #[test]
    fn panics_are_absorbed() {
        let extractor = TextExtractor::new(vec![Box::new(Panicking), Box::new(Fixed("recovered"))]);
        assert_eq!(extractor.extract(b"anything"), "recovered");
    }

    #[test]
    fn all_strategies_failing_yields_empty_text() {
        let extractor = TextExtractor::new(vec![Box::new(Failing), Box::new(Panicking)]);
        assert_eq!(extractor.extract(b"anything"), "");
    }

    #[test]
    fn corrupt_pdf_yields_empty_text() {
        let text = TextExtractor::default().extract(b"%PDF-1.7\nthis is not really a pdf");
        assert_eq!(text, "");
    }

    #[test]
    fn binary_garbage_yields_empty_text() {
        let text = TextExtractor::default().extract(&[0xff, 0xfe, 0x00, 0x81]);
        assert_eq!(text, "");
    }

    #[test]
    fn detects_pdf_header() {
        assert!(is_pdf(b"%PDF-1.4\n..."));
        assert!(is_pdf(b"\n\n%PDF-1.4"));
        assert!(!is_pdf(b"Form W-2"));
        assert!(!is_pdf(b""));
    }
}
