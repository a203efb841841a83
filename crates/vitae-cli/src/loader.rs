//! Plain-text resume loading.
//!
//! Reads `*.txt` and `*.md` files directly inside a directory (no
//! recursion), sorted by file name so corpus order is stable across runs.
//! Files that cannot be read are skipped with a warning.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use vitae_search::{Document, clean_text};

const EXTENSIONS: &[&str] = &["txt", "md"];

/// A file that was found but could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedFile {
    pub path: PathBuf,
    pub reason: String,
}

/// Documents loaded from a directory, in file-name order.
#[derive(Debug, Default)]
pub struct LoadedResumes {
    pub documents: Vec<Document>,
    pub skipped: Vec<SkippedFile>,
}

fn has_resume_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
}

/// Load every resume in `dir`.
///
/// # Errors
///
/// Returns an error if `dir` cannot be listed. Individual unreadable files
/// are reported in [`LoadedResumes::skipped`] instead.
pub fn load_resumes(dir: &Path) -> Result<LoadedResumes> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read resume directory {}", dir.display()))?;

    let mut paths: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_resume_extension(path))
        .collect();
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let mut loaded = LoadedResumes::default();
    for path in paths {
        let identity = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match fs::read_to_string(&path) {
            Ok(text) => {
                debug!(%identity, bytes = text.len(), "loaded resume");
                loaded
                    .documents
                    .push(Document::new(identity, clean_text(&text)));
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "skipping unreadable resume");
                loaded.skipped.push(SkippedFile {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    Ok(loaded)
}

/// Read a single text file (job description or one resume), cleaned.
///
/// # Errors
///
/// Returns an error if the file cannot be read as UTF-8 text.
pub fn read_text(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(clean_text(&text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn loads_text_and_markdown_sorted_by_name() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("b.txt"), "Second  resume\n").expect("write");
        fs::write(dir.path().join("a.md"), "  First\tresume ").expect("write");
        fs::write(dir.path().join("notes.pdf"), "binary").expect("write");
        fs::create_dir(dir.path().join("nested.txt")).expect("mkdir");

        let loaded = load_resumes(dir.path()).expect("load");
        let ids: Vec<&str> = loaded
            .documents
            .iter()
            .map(|d| d.identity.as_str())
            .collect();
        assert_eq!(ids, vec!["a.md", "b.txt"]);
        assert_eq!(loaded.documents[0].content, "First resume");
        assert_eq!(loaded.documents[1].content, "Second resume");
        assert!(loaded.skipped.is_empty());
    }

    #[test]
    fn invalid_utf8_is_skipped() {
        let dir = TempDir::new().expect("tempdir");
        fs::write(dir.path().join("good.txt"), "rust engineer").expect("write");
        fs::write(dir.path().join("bad.txt"), [0xff_u8, 0xfe, 0xfd]).expect("write");

        let loaded = load_resumes(dir.path()).expect("load");
        assert_eq!(loaded.documents.len(), 1);
        assert_eq!(loaded.skipped.len(), 1);
        assert!(loaded.skipped[0].path.ends_with("bad.txt"));
    }

    #[test]
    fn uppercase_extensions_are_accepted() {
        assert!(has_resume_extension(Path::new("CV.TXT")));
        assert!(has_resume_extension(Path::new("cv.Md")));
        assert!(!has_resume_extension(Path::new("cv.docx")));
        assert!(!has_resume_extension(Path::new("README")));
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let err = load_resumes(&dir.path().join("absent")).expect_err("missing dir");
        assert!(err.to_string().contains("resume directory"));
    }

    #[test]
    fn read_text_cleans_whitespace() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("job.txt");
        fs::write(&path, "Senior\n\nRust   engineer\n").expect("write");
        assert_eq!(read_text(&path).expect("read"), "Senior Rust engineer");
    }
}
