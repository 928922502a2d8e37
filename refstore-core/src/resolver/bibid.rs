//! Bib identifier derivation and entry formatting

use crate::types::{BookMeta, DocType};
use regex::Regex;
use std::path::Path;
use std::sync::OnceLock;

/// Title words too generic to key an identifier on.
const STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "on", "in", "and", "or", "to", "for", "with", "la", "el", "le", "de",
];

fn year_pattern() -> &'static Regex {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"\b(1[5-9]\d{2}|20\d{2})\b").unwrap())
}

/// First plausible publication year in a free-form date string.
pub(super) fn parse_year(s: &str) -> Option<i32> {
    year_pattern()
        .captures(s)
        .and_then(|c| c[1].parse().ok())
}

/// Derive the deterministic identifier a book is filed under:
/// `{surname}{year}{first-title-word}`, lowercased, e.g. `reyero2013moby`.
/// Missing parts are simply omitted; with no usable metadata at all, the
/// identifier degrades to a slug of the file stem.
pub fn derive_bibid(meta: &BookMeta, path: &Path) -> String {
    let mut id = String::new();
    if let Some(surname) = meta.primary_author().and_then(surname) {
        id.push_str(&surname);
    }
    if let Some(year) = meta.year {
        id.push_str(&year.to_string());
    }
    if let Some(word) = title_word(&meta.title) {
        id.push_str(&word);
    }
    if id.is_empty() {
        id = slug(&stem(path));
    }
    id
}

/// Lowercased alphanumeric surname of an author given as either
/// "Herman Melville" or "Melville, Herman".
fn surname(author: &str) -> Option<String> {
    let name = match author.split_once(',') {
        Some((last, _)) => last,
        None => author.split_whitespace().last()?,
    };
    let cleaned = slug(name);
    (!cleaned.is_empty()).then_some(cleaned)
}

/// First title word worth keying on.
fn title_word(title: &str) -> Option<String> {
    title
        .split(|c: char| !c.is_alphanumeric())
        .map(|w| w.to_lowercase())
        .find(|w| w.len() > 1 && !STOPWORDS.contains(&w.as_str()))
}

/// Lowercase and strip everything but letters and digits.
fn slug(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// File stem, with separators softened back into spaces.
fn stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("untitled")
        .replace(['-', '_'], " ")
}

/// Fallback metadata for files carrying none: the stem stands in as title.
pub(super) fn stem_meta(path: &Path) -> BookMeta {
    BookMeta::new(String::new(), stem(path))
}

/// Reduce a raw identifier string to a bare ISBN, if it is one.
/// Accepts ISBN-10 (final check digit may be X) and ISBN-13.
pub fn normalize_isbn(raw: &str) -> Option<String> {
    let bare: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == 'x' || *c == 'X')
        .map(|c| c.to_ascii_uppercase())
        .collect();
    match bare.len() {
        10 if bare[..9].chars().all(|c| c.is_ascii_digit()) => Some(bare),
        13 if bare.chars().all(|c| c.is_ascii_digit())
            && (bare.starts_with("978") || bare.starts_with("979")) =>
        {
            Some(bare)
        }
        _ => None,
    }
}

fn isbn_marker() -> &'static Regex {
    static MARKER: OnceLock<Regex> = OnceLock::new();
    MARKER.get_or_init(|| {
        Regex::new(r"(?i)\bISBN(?:-1[03])?[:\s]*([0-9][0-9 Xx-]{8,18}[0-9Xx])").unwrap()
    })
}

/// Scan free text (PDF front matter, typically) for a declared ISBN.
pub(super) fn find_isbn(text: &str) -> Option<String> {
    isbn_marker()
        .captures_iter(text)
        .find_map(|c| normalize_isbn(&c[1]))
}

/// Render the bib entry for `meta`, one field per line.
pub fn format_entry(meta: &BookMeta, doctype: DocType) -> String {
    let mut entry = format!("@{}{{{},\n", doctype, meta.bibid);
    if !meta.authors.is_empty() {
        field(&mut entry, "author", &meta.authors.join(" and "));
    }
    field(&mut entry, "title", &meta.title);
    if let Some(year) = meta.year {
        field(&mut entry, "year", &year.to_string());
    }
    if let Some(publisher) = &meta.publisher {
        field(&mut entry, "publisher", publisher);
    }
    if let Some(isbn) = &meta.isbn {
        field(&mut entry, "isbn", isbn);
    }
    if let Some(language) = &meta.language {
        field(&mut entry, "language", language);
    }
    entry.push('}');
    entry
}

fn field(entry: &mut String, name: &str, value: &str) {
    entry.push_str(&format!("  {name} = {{{value}}},\n"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_identity() {
        let meta = BookMeta::new("", "Moby Dick; or, The Whale")
            .with_author("Juan Reyero")
            .with_year(2013);
        assert_eq!(derive_bibid(&meta, Path::new("moby-dick.epub")), "reyero2013moby");
    }

    #[test]
    fn surname_comma_form() {
        let meta = BookMeta::new("", "Moby Dick")
            .with_author("Melville, Herman")
            .with_year(1851);
        assert_eq!(derive_bibid(&meta, Path::new("x.epub")), "melville1851moby");
    }

    #[test]
    fn stopwords_are_skipped() {
        let meta = BookMeta::new("", "The Art of War")
            .with_author("Sun Tzu")
            .with_year(2005);
        assert_eq!(derive_bibid(&meta, Path::new("x.epub")), "tzu2005art");
    }

    #[test]
    fn missing_parts_are_omitted() {
        let meta = BookMeta::new("", "Walden").with_author("Henry Thoreau");
        assert_eq!(derive_bibid(&meta, Path::new("x.epub")), "thoreauwalden");
    }

    #[test]
    fn empty_metadata_falls_back_to_stem() {
        let meta = BookMeta::new("", "");
        assert_eq!(
            derive_bibid(&meta, Path::new("dir/My_Great-Book.pdf")),
            "mygreatbook"
        );
    }

    #[test]
    fn year_parsing() {
        assert_eq!(parse_year("2013-04-29"), Some(2013));
        assert_eq!(parse_year("29 April 1851"), Some(1851));
        assert_eq!(parse_year("v1.2, 4to"), None);
        assert_eq!(parse_year("3000 BC"), None);
    }

    #[test]
    fn isbn_normalization() {
        assert_eq!(
            normalize_isbn("urn:isbn:978-0-316-76948-8"),
            Some("9780316769488".to_string())
        );
        assert_eq!(normalize_isbn("0-316-76948-X"), Some("031676948X".to_string()));
        assert_eq!(normalize_isbn("uuid:550e8400-e29b-41d4"), None);
        assert_eq!(normalize_isbn("1234567890123"), None); // 13 digits, not 978/979
    }

    #[test]
    fn isbn_scan() {
        let text = "First published 2013.\nISBN: 978-0-316-76948-8\nPrinted in...";
        assert_eq!(find_isbn(text), Some("9780316769488".to_string()));
        assert_eq!(find_isbn("no identifiers here"), None);
    }

    #[test]
    fn entry_formatting() {
        let meta = BookMeta::new("melville1851moby", "Moby Dick")
            .with_author("Herman Melville")
            .with_year(1851);
        let entry = format_entry(&meta, DocType::Book);
        assert!(entry.starts_with("@book{melville1851moby,\n"));
        assert!(entry.contains("  author = {Herman Melville},\n"));
        assert!(entry.contains("  title = {Moby Dick},\n"));
        assert!(entry.contains("  year = {1851},\n"));
        assert!(entry.ends_with('}'));
    }
}
