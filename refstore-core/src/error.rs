//! Error types for refstore-core

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using ImportError
pub type Result<T> = std::result::Result<T, ImportError>;

/// Top-level error type for one book's import.
///
/// Every variant is fatal for that book only; the batch driver reports it
/// and moves on to the next file.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("book file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot clean up {}: no kindle serial or DeDRM tool configured", .0.display())]
    MissingDecryptor(PathBuf),

    #[error("decryption error: {0}")]
    Decrypt(#[from] DecryptError),

    #[error("metadata resolution error: {0}")]
    Resolve(#[from] ResolveError),

    #[error("conversion error: {0}")]
    Convert(#[from] ConvertError),

    #[error("{} is already recorded but its master copy is missing: {}", bibid, path.display())]
    MissingCanonical { bibid: String, path: PathBuf },

    #[error("annotation export error: {0}")]
    Annotate(#[from] AnnotateError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from deriving a book's bibliographic identity
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid EPUB: {0}")]
    InvalidEpub(String),

    #[error("invalid MOBI: {0}")]
    InvalidMobi(String),

    #[error("unreadable PDF: {0}")]
    InvalidPdf(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the DRM-removal capability
#[derive(Debug, Error)]
pub enum DecryptError {
    #[error("no python interpreter found on PATH")]
    PythonMissing,

    #[error("k4mobidedrm.py not found in {0}")]
    ScriptMissing(String),

    #[error("DeDRM exited with {0}")]
    Failed(std::process::ExitStatus),

    #[error("DeDRM left no output file in {}", .0.display())]
    NoOutput(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the format-conversion capability
#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("ebook-convert not found on PATH (is Calibre installed?)")]
    ToolMissing,

    #[error("converting to {} failed with {}; the source may still carry DRM", dst.display(), status)]
    Failed {
        dst: PathBuf,
        status: std::process::ExitStatus,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from exporting reading notes
#[derive(Debug, Error)]
pub enum AnnotateError {
    #[error("unreadable clippings file {}: {}", path.display(), source)]
    Unreadable {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
