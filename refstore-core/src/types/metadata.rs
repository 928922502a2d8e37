//! Bibliographic metadata types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Metadata resolved for one book.
///
/// Produced once per book by the metadata resolver and treated as immutable
/// input by the rest of the pipeline. The `bibid` is the dedup key and the
/// canonical filename stem.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookMeta {
    /// Unique bib identifier, e.g. `reyero2013moby`
    pub bibid: String,

    /// Book title
    pub title: String,

    /// Authors, as printed on the book
    pub authors: Vec<String>,

    /// Publication year
    pub year: Option<i32>,

    /// Publisher name
    pub publisher: Option<String>,

    /// Language code
    pub language: Option<String>,

    /// ISBN, when the file carries one
    pub isbn: Option<String>,
}

impl BookMeta {
    /// Create metadata with the required fields
    pub fn new(bibid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            bibid: bibid.into(),
            title: title.into(),
            authors: Vec::new(),
            year: None,
            publisher: None,
            language: None,
            isbn: None,
        }
    }

    /// Add an author
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.authors.push(author.into());
        self
    }

    /// Set the publication year
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Set the ISBN
    pub fn with_isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    /// First listed author, if any
    pub fn primary_author(&self) -> Option<&str> {
        self.authors.first().map(|s| s.as_str())
    }
}

/// A formatted bib entry paired with the key it is filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibRecord {
    /// Entry key; equals the metadata's `bibid`
    pub bibid: String,

    /// Full entry text, `@type{key,` header included
    pub entry: String,
}

impl BibRecord {
    pub fn new(bibid: impl Into<String>, entry: impl Into<String>) -> Self {
        Self {
            bibid: bibid.into(),
            entry: entry.into(),
        }
    }
}

/// Document type a bib entry is filed as.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum DocType {
    #[default]
    Book,
    Article,
}

impl DocType {
    /// The bib entry type name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Book => "book",
            Self::Article => "article",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "book" => Ok(Self::Book),
            "article" => Ok(Self::Article),
            other => Err(format!(
                "unknown document type '{other}' (expected 'book' or 'article')"
            )),
        }
    }
}
