//! EPUB metadata extraction

use super::bibid;
use crate::error::ResolveError;
use crate::types::BookMeta;
use epub::doc::EpubDoc;
use std::path::Path;

pub(super) fn read_meta(path: &Path) -> Result<BookMeta, ResolveError> {
    let doc = EpubDoc::new(path).map_err(|e| ResolveError::InvalidEpub(e.to_string()))?;

    let title = doc
        .mdata("title")
        .unwrap_or_else(|| bibid::stem_meta(path).title);

    let mut meta = BookMeta::new(String::new(), title);
    if let Some(creators) = doc.metadata.get("creator") {
        meta.authors = creators.clone();
    }
    meta.year = doc.mdata("date").and_then(|d| bibid::parse_year(&d));
    meta.publisher = doc.mdata("publisher");
    meta.language = doc.mdata("language");
    // dc:identifier holds anything from UUIDs to `urn:isbn:` URNs; keep the
    // first value that actually is an ISBN.
    meta.isbn = doc
        .metadata
        .get("identifier")
        .into_iter()
        .flatten()
        .find_map(|id| bibid::normalize_isbn(id));

    Ok(meta)
}
