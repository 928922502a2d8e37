//! Kindle "My Clippings.txt" parsing
//!
//! The export is a flat text file: each entry is a title line, a metadata
//! line, a blank line, the clipped text, and a `==========` separator.
//! Different device generations vary the metadata wording ("Your Highlight
//! on page 5", "Highlight Loc. 100-102"), so parsing stays loose.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Separator line between entries.
const SEPARATOR: &str = "==========";

/// What kind of note an entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClippingKind {
    Highlight,
    Note,
    Bookmark,
}

impl fmt::Display for ClippingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Highlight => "Highlight",
            Self::Note => "Note",
            Self::Bookmark => "Bookmark",
        })
    }
}

/// One parsed entry from the export.
#[derive(Debug, Clone, PartialEq)]
pub struct Clipping {
    /// Book title as the device recorded it
    pub title: String,
    /// Author, when the title line carried one in parentheses
    pub author: Option<String>,
    pub kind: ClippingKind,
    /// Position part of the metadata line, e.g. "page 5 | Location 100-102"
    pub location: String,
    /// Raw "Added on ..." timestamp text, when present
    pub added: Option<String>,
    /// The clipped text; empty for bookmarks
    pub text: String,
}

impl Clipping {
    /// Whether this entry belongs to a book with the given title.
    pub fn matches_title(&self, title: &str) -> bool {
        self.title.trim().eq_ignore_ascii_case(title.trim())
    }
}

fn title_author() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(.*?)\s*\(([^()]+)\)\s*$").unwrap())
}

/// Parse a whole export. Malformed entries are skipped, not fatal: a single
/// corrupt block must not cost the rest of the notes.
pub fn parse_clippings(text: &str) -> Vec<Clipping> {
    let text = text.trim_start_matches('\u{feff}');
    text.split(SEPARATOR)
        .filter_map(parse_entry)
        .collect()
}

fn parse_entry(block: &str) -> Option<Clipping> {
    let mut lines = block.lines().filter(|l| !l.trim().is_empty());
    let title_line = lines.next()?.trim();
    let meta_line = lines.next()?.trim();
    if !meta_line.starts_with('-') {
        return None;
    }

    let (title, author) = match title_author().captures(title_line) {
        Some(c) => (c[1].trim().to_string(), Some(c[2].trim().to_string())),
        None => (title_line.to_string(), None),
    };
    if title.is_empty() {
        return None;
    }

    let meta = meta_line.trim_start_matches('-').trim();
    let kind = classify(meta)?;
    let (location, added) = match meta.split_once("Added on") {
        Some((pos, added)) => (pos, Some(added.trim().to_string())),
        None => (meta, None),
    };
    let location = location
        .trim()
        .trim_end_matches('|')
        .trim()
        .trim_start_matches("Your ")
        .trim_start_matches("Highlight")
        .trim_start_matches("Note")
        .trim_start_matches("Bookmark")
        .trim()
        .trim_start_matches("on ")
        .trim_start_matches("at ")
        .trim()
        .to_string();

    let text = lines.collect::<Vec<_>>().join("\n").trim().to_string();

    Some(Clipping {
        title,
        author,
        kind,
        location,
        added,
        text,
    })
}

fn classify(meta: &str) -> Option<ClippingKind> {
    let lower = meta.to_lowercase();
    if lower.contains("highlight") {
        Some(ClippingKind::Highlight)
    } else if lower.contains("note") {
        Some(ClippingKind::Note)
    } else if lower.contains("bookmark") {
        Some(ClippingKind::Bookmark)
    } else {
        None
    }
}
