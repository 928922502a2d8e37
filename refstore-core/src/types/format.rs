//! Book format classification by file extension

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The formats the importer recognizes, tagged by file extension.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum BookFormat {
    /// Amazon's DRM-protected vendor format; must be decrypted first
    Azw,
    /// Open format; converted to `.mobi` on import
    Epub,
    /// Already canonical; relocated as-is
    Mobi,
    /// Already canonical; relocated as-is
    Pdf,
}

impl BookFormat {
    /// Classify a file by its extension.
    ///
    /// The comparison is exact and case-sensitive: `book.AZW` does not
    /// classify, and is handled like any other unknown extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("azw") => Some(Self::Azw),
            Some("epub") => Some(Self::Epub),
            Some("mobi") => Some(Self::Mobi),
            Some("pdf") => Some(Self::Pdf),
            _ => None,
        }
    }

    /// The extension this format is stored under.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Azw => "azw",
            Self::Epub => "epub",
            Self::Mobi => "mobi",
            Self::Pdf => "pdf",
        }
    }

    /// Whether a file in this format is stored as-is, without conversion.
    pub fn is_canonical(self) -> bool {
        matches!(self, Self::Mobi | Self::Pdf)
    }
}
