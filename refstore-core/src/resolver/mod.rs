//! Metadata resolution: turning a book file into a bibliographic identity

mod bibid;
mod epub;
mod mobi;
mod pdf;

pub use bibid::{derive_bibid, format_entry, normalize_isbn};

use crate::error::ResolveError;
use crate::types::{BibRecord, BookMeta, DocType};
use std::path::Path;

/// Capability: derive a book's bib entry and metadata from its file.
pub trait MetadataResolver: Send + Sync {
    /// Produce the formatted bib entry and the metadata backing it.
    /// The returned metadata carries the unique `bibid`.
    fn resolve(&self, path: &Path, doctype: DocType) -> Result<(BibRecord, BookMeta), ResolveError>;
}

/// Resolver reading the metadata embedded in the book file itself.
///
/// EPUB and MOBI/AZW files carry structured metadata; PDFs are scanned for
/// an ISBN in their front matter. Anything else falls back to the file stem.
/// No network lookups are involved.
pub struct EmbeddedResolver;

impl MetadataResolver for EmbeddedResolver {
    fn resolve(&self, path: &Path, doctype: DocType) -> Result<(BibRecord, BookMeta), ResolveError> {
        let mut meta = match path.extension().and_then(|e| e.to_str()) {
            Some("epub") => epub::read_meta(path)?,
            Some("mobi") | Some("azw") | Some("azw3") | Some("prc") => mobi::read_meta(path)?,
            Some("pdf") => pdf::read_meta(path)?,
            _ => bibid::stem_meta(path),
        };
        meta.bibid = bibid::derive_bibid(&meta, path);
        tracing::debug!(book = %path.display(), bibid = %meta.bibid, "resolved");

        let record = BibRecord::new(meta.bibid.clone(), bibid::format_entry(&meta, doctype));
        Ok((record, meta))
    }
}
