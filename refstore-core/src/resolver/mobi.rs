//! MOBI/AZW metadata extraction (EXTH records)

use super::bibid;
use crate::error::ResolveError;
use crate::types::BookMeta;
use mobi::Mobi;
use std::path::Path;

pub(super) fn read_meta(path: &Path) -> Result<BookMeta, ResolveError> {
    let book = Mobi::from_path(path).map_err(|e| ResolveError::InvalidMobi(e.to_string()))?;

    let title = book.title();
    let title = if title.is_empty() {
        bibid::stem_meta(path).title
    } else {
        title.to_string()
    };

    let mut meta = BookMeta::new(String::new(), title);
    if let Some(author) = book.author() {
        meta.authors.push(author.to_string());
    }
    meta.year = book.publish_date().and_then(|d| bibid::parse_year(&d));
    meta.publisher = book.publisher().map(|p| p.to_string());
    meta.isbn = book.isbn().and_then(|i| bibid::normalize_isbn(&i));

    Ok(meta)
}
