//! PDF identity: ISBN scan over the front matter

use super::bibid;
use crate::error::ResolveError;
use crate::types::BookMeta;
use std::path::Path;

/// How much extracted text to scan. ISBNs live on the copyright page, well
/// inside the first few thousand characters.
const SCAN_LIMIT: usize = 20_000;

pub(super) fn read_meta(path: &Path) -> Result<BookMeta, ResolveError> {
    let text =
        pdf_extract::extract_text(path).map_err(|e| ResolveError::InvalidPdf(e.to_string()))?;
    let front: String = text.chars().take(SCAN_LIMIT).collect();

    // PDFs carry no reliable structured metadata; the stem names the book
    // and the text scan may still pin down an ISBN.
    let mut meta = bibid::stem_meta(path);
    meta.isbn = bibid::find_isbn(&front);
    Ok(meta)
}
