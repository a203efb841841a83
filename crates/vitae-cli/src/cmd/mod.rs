pub mod completions;
pub mod inspect;
pub mod rank;
pub mod score;

use crate::loader::{SkippedFile, load_resumes, read_text};
use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use vitae_search::{BuildWarning, Embedder, HybridIndex, VitaeConfig, create_embedder};

/// An index built from a resume directory, with everything that went wrong
/// along the way.
pub struct BuiltIndex {
    pub index: HybridIndex,
    pub warnings: Vec<BuildWarning>,
    pub skipped: Vec<SkippedFile>,
}

/// Instantiate the configured embedder.
///
/// # Errors
///
/// Returns an error if the embedder cannot be created (e.g. a missing model).
pub fn embedder_from_config(config: &VitaeConfig) -> Result<Arc<dyn Embedder>> {
    let embedder = create_embedder(&config.embedder).context("Failed to create embedder")?;
    Ok(Arc::from(embedder))
}

/// Load resumes from `dir` and build the hybrid index over them.
///
/// # Errors
///
/// Returns an error if the directory cannot be listed or the embedder
/// cannot be created.
pub fn build_index(dir: &Path, config: &VitaeConfig) -> Result<BuiltIndex> {
    let loaded = load_resumes(dir)?;
    let embedder = embedder_from_config(config)?;
    let report = HybridIndex::build(loaded.documents, embedder, config);
    Ok(BuiltIndex {
        index: report.index,
        warnings: report.warnings,
        skipped: loaded.skipped,
    })
}

/// Text given inline or read from a file; clap guarantees exactly one.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn resolve_text(inline: Option<&str>, file: Option<&Path>) -> Result<String> {
    match (inline, file) {
        (_, Some(path)) => read_text(path),
        (Some(text), None) => Ok(vitae_search::clean_text(text)),
        (None, None) => Ok(String::new()),
    }
}

/// Shorten `text` to at most `max` characters for display.
pub fn preview(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_on_char_boundaries() {
        assert_eq!(preview("short", 10), "short");
        assert_eq!(preview("abcdefghij", 5), "abcd…");
        assert_eq!(preview("żółwżółw", 4), "żół…");
    }

    #[test]
    fn resolve_text_prefers_file_and_cleans_inline() {
        assert_eq!(
            resolve_text(Some("  rust \n dev "), None).expect("inline"),
            "rust dev"
        );
        assert_eq!(resolve_text(None, None).expect("none"), "");
    }
}
