//! Reading-note export

mod clippings;

pub use clippings::{parse_clippings, Clipping, ClippingKind};

use crate::error::AnnotateError;
use crate::types::BookMeta;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Capability: append a book's reading notes to the notes log.
pub trait AnnotationExporter: Send + Sync {
    /// Export any notes found for `meta`'s book. Returns how many entries
    /// were appended to the log.
    fn export(&self, book: &Path, meta: &BookMeta) -> Result<usize, AnnotateError>;
}

/// Exporter reading a Kindle clippings dump and appending org-mode entries
/// to the notes file.
pub struct KindleClippings {
    notes_path: PathBuf,
    source: Option<PathBuf>,
}

/// Default clippings locations, tried in order: the mounted device, then an
/// export dropped in the working directory.
const SOURCE_CANDIDATES: &[&str] = &[
    "/Volumes/Kindle/documents/My Clippings.txt",
    "kindle-clippings.txt",
];

impl KindleClippings {
    pub fn new(notes_path: impl Into<PathBuf>) -> Self {
        Self {
            notes_path: notes_path.into(),
            source: None,
        }
    }

    /// Read clippings from an explicit file instead of the default locations.
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    fn find_source(&self) -> Option<PathBuf> {
        if let Some(path) = &self.source {
            return path.is_file().then(|| path.clone());
        }
        SOURCE_CANDIDATES
            .iter()
            .map(PathBuf::from)
            .find(|p| p.is_file())
    }
}

impl AnnotationExporter for KindleClippings {
    fn export(&self, _book: &Path, meta: &BookMeta) -> Result<usize, AnnotateError> {
        let Some(source) = self.find_source() else {
            tracing::debug!("no clippings source found; nothing to export");
            return Ok(0);
        };

        let text = std::fs::read_to_string(&source).map_err(|source_err| {
            AnnotateError::Unreadable {
                path: source.clone(),
                source: source_err,
            }
        })?;
        let selected: Vec<Clipping> = parse_clippings(&text)
            .into_iter()
            .filter(|c| c.matches_title(&meta.title))
            .collect();
        if selected.is_empty() {
            return Ok(0);
        }

        let mut notes = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.notes_path)?;
        write!(notes, "{}", format_section(meta, &selected))?;
        tracing::debug!(
            notes = %self.notes_path.display(),
            count = selected.len(),
            "appended clippings"
        );
        Ok(selected.len())
    }
}

/// Render one book's clippings as an org subtree.
fn format_section(meta: &BookMeta, clippings: &[Clipping]) -> String {
    let mut out = String::new();
    match meta.primary_author() {
        Some(author) => out.push_str(&format!("\n* {} ({})\n", meta.title, author)),
        None => out.push_str(&format!("\n* {}\n", meta.title)),
    }
    out.push_str("  :PROPERTIES:\n");
    out.push_str(&format!("  :BIBID: {}\n", meta.bibid));
    out.push_str(&format!(
        "  :EXPORTED: {}\n",
        chrono::Local::now().format("[%Y-%m-%d %a]")
    ));
    out.push_str("  :END:\n");

    for clipping in clippings {
        if clipping.location.is_empty() {
            out.push_str(&format!("\n** {}\n", clipping.kind));
        } else {
            out.push_str(&format!("\n** {} at {}\n", clipping.kind, clipping.location));
        }
        if !clipping.text.is_empty() {
            for line in clipping.text.lines() {
                out.push_str(&format!("   {line}\n"));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CLIPPINGS: &str = "Moby Dick (Herman Melville)\n\
- Your Highlight on page 5 | Location 100-102 | Added on Monday, April 29, 2013\n\
\n\
Call me Ishmael.\n\
==========\n\
Walden (Henry David Thoreau)\n\
- Your Highlight on page 9 | Location 88-90 | Added on Tuesday, April 30, 2013\n\
\n\
Simplify, simplify.\n\
==========\n";

    fn meta() -> BookMeta {
        BookMeta::new("melville1851moby", "Moby Dick").with_author("Herman Melville")
    }

    #[test]
    fn exports_matching_clippings_only() {
        let dir = TempDir::new().unwrap();
        let clippings_path = dir.path().join("clippings.txt");
        let notes_path = dir.path().join("ref.org");
        fs::write(&clippings_path, CLIPPINGS).unwrap();

        let exporter = KindleClippings::new(&notes_path).with_source(&clippings_path);
        let count = exporter
            .export(Path::new("unused.mobi"), &meta())
            .unwrap();
        assert_eq!(count, 1);

        let notes = fs::read_to_string(&notes_path).unwrap();
        assert!(notes.contains("* Moby Dick (Herman Melville)"));
        assert!(notes.contains(":BIBID: melville1851moby"));
        assert!(notes.contains("** Highlight at page 5 | Location 100-102"));
        assert!(notes.contains("   Call me Ishmael."));
        assert!(!notes.contains("Simplify"));
    }

    #[test]
    fn no_source_means_nothing_to_export() {
        let dir = TempDir::new().unwrap();
        let notes_path = dir.path().join("ref.org");

        let exporter = KindleClippings::new(&notes_path)
            .with_source(dir.path().join("absent.txt"));
        let count = exporter
            .export(Path::new("unused.mobi"), &meta())
            .unwrap();
        assert_eq!(count, 0);
        assert!(!notes_path.exists());
    }

    #[test]
    fn no_matching_title_appends_nothing() {
        let dir = TempDir::new().unwrap();
        let clippings_path = dir.path().join("clippings.txt");
        let notes_path = dir.path().join("ref.org");
        fs::write(&clippings_path, CLIPPINGS).unwrap();

        let exporter = KindleClippings::new(&notes_path).with_source(&clippings_path);
        let other = BookMeta::new("austen1813pride", "Pride and Prejudice");
        assert_eq!(
            exporter.export(Path::new("unused.mobi"), &other).unwrap(),
            0
        );
        assert!(!notes_path.exists());
    }

    #[test]
    fn sections_accumulate() {
        let dir = TempDir::new().unwrap();
        let clippings_path = dir.path().join("clippings.txt");
        let notes_path = dir.path().join("ref.org");
        fs::write(&clippings_path, CLIPPINGS).unwrap();

        let exporter = KindleClippings::new(&notes_path).with_source(&clippings_path);
        let walden = BookMeta::new("thoreau1854walden", "Walden");
        exporter.export(Path::new("unused.mobi"), &meta()).unwrap();
        exporter.export(Path::new("unused.mobi"), &walden).unwrap();

        let notes = fs::read_to_string(&notes_path).unwrap();
        assert!(notes.contains("* Moby Dick"));
        assert!(notes.contains("* Walden"));
    }
}
