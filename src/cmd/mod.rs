pub mod calculate;
pub mod display;
pub mod estimate;
pub mod process;
pub mod schema;

use crate::core::{DocumentProcessor, ExtractionRules};
use anyhow::Context;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Build the document processor from the built-in rules, or from a JSON rules file
pub fn load_processor(rules: Option<&Path>) -> anyhow::Result<DocumentProcessor> {
    let rules = match rules {
        Some(path) => read_rules(path)?,
        None => ExtractionRules::default(),
    };
    let processor = DocumentProcessor::with_rules(&rules)?;
    Ok(processor)
}

fn read_rules(path: &Path) -> anyhow::Result<ExtractionRules> {
    let file = File::open(path).with_context(|| format!("failed to open rules file {}", path.display()))?;
    let rules = ExtractionRules::from_json(BufReader::new(file))
        .with_context(|| format!("failed to load rules from {}", path.display()))?;
    log::info!("loaded {} form rule sets from {}", rules.forms.len(), path.display());
    Ok(rules)
}
