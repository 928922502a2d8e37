//! The import pipeline
//!
//! One book at a time: locate, decrypt if the vendor format demands it,
//! resolve bibliographic identity, dedup against the bib store, materialize
//! the canonical copy, record the entry, export reading notes. Every failure
//! is fatal for that book only.

use crate::annotate::AnnotationExporter;
use crate::bib::BibStore;
use crate::convert::Converter;
use crate::drm::Decryptor;
use crate::error::{ImportError, Result};
use crate::resolver::MetadataResolver;
use crate::types::{BookFormat, DocType};
use std::fs;
use std::path::{Path, PathBuf};

/// Where files end up and which knobs are set for a run.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Directory canonical copies live in
    pub masterdir: PathBuf,
    /// Directory bare filenames are resolved against
    pub sourcedir: PathBuf,
    /// Directory pre-conversion originals are moved into
    pub backupdir: PathBuf,
    /// The bib file entries are recorded in
    pub bibfile: PathBuf,
    /// Entry type new records are filed as
    pub doctype: DocType,
    /// Re-materialize books that are already recorded
    pub also_repeated: bool,
}

impl ImportOptions {
    pub fn new(masterdir: impl Into<PathBuf>, sourcedir: impl Into<PathBuf>) -> Self {
        Self {
            masterdir: masterdir.into(),
            sourcedir: sourcedir.into(),
            backupdir: PathBuf::from("imported"),
            bibfile: PathBuf::from("ref.bib"),
            doctype: DocType::default(),
            also_repeated: false,
        }
    }

    pub fn with_bibfile(mut self, bibfile: impl Into<PathBuf>) -> Self {
        self.bibfile = bibfile.into();
        self
    }

    pub fn with_backupdir(mut self, backupdir: impl Into<PathBuf>) -> Self {
        self.backupdir = backupdir.into();
        self
    }

    pub fn with_doctype(mut self, doctype: DocType) -> Self {
        self.doctype = doctype;
        self
    }

    /// Process books that already appear in the bib file.
    pub fn process_repeated(mut self, also_repeated: bool) -> Self {
        self.also_repeated = also_repeated;
        self
    }
}

/// The import pipeline with its collaborators wired in.
///
/// Resolver, converter and exporter are required capabilities; the decryptor
/// is optional, and DRM-protected books are rejected while it is absent.
pub struct Importer {
    opts: ImportOptions,
    bib: BibStore,
    resolver: Box<dyn MetadataResolver>,
    converter: Box<dyn Converter>,
    decryptor: Option<Box<dyn Decryptor>>,
    exporter: Box<dyn AnnotationExporter>,
}

impl Importer {
    pub fn new(
        opts: ImportOptions,
        resolver: Box<dyn MetadataResolver>,
        converter: Box<dyn Converter>,
        exporter: Box<dyn AnnotationExporter>,
    ) -> Self {
        let bib = BibStore::new(&opts.bibfile);
        Self {
            opts,
            bib,
            resolver,
            converter,
            decryptor: None,
            exporter,
        }
    }

    pub fn with_decryptor(mut self, decryptor: Box<dyn Decryptor>) -> Self {
        self.decryptor = Some(decryptor);
        self
    }

    pub fn options(&self) -> &ImportOptions {
        &self.opts
    }

    /// Import one book; returns the canonical path it now lives at.
    pub fn import(&self, book: impl AsRef<Path>) -> Result<PathBuf> {
        let original = self.locate(book.as_ref())?;
        tracing::info!(book = %original.display(), "importing");

        let format = BookFormat::from_path(&original);

        // DRM comes off first; everything downstream sees the decrypted file.
        let book = if format == Some(BookFormat::Azw) {
            match &self.decryptor {
                Some(decryptor) => decryptor.decrypt(&original)?,
                None => return Err(ImportError::MissingDecryptor(original)),
            }
        } else {
            original.clone()
        };

        let (record, meta) = self.resolver.resolve(&book, self.opts.doctype)?;
        let bibid = meta.bibid.clone();

        let is_new = !self.bib.contains(&bibid)?;
        let canonical = if is_new || self.opts.also_repeated {
            self.materialize(&book, &original, format, &bibid)?
        } else {
            // Already recorded: the master copy is assumed present, and that
            // assumption is checked rather than trusted.
            let canonical = self.canonical_path(format, &bibid);
            if !canonical.is_file() {
                return Err(ImportError::MissingCanonical {
                    bibid,
                    path: canonical,
                });
            }
            tracing::info!(%bibid, "already recorded, skipping");
            canonical
        };

        // Recorded only once the canonical copy is in place, so a failed
        // conversion never leaves an entry without a book behind it.
        self.bib.append(&record)?;

        let appended = self.exporter.export(&canonical, &meta)?;
        if appended > 0 {
            tracing::info!(count = appended, "appended reading notes");
        }

        tracing::info!(dest = %canonical.display(), "imported");
        Ok(canonical)
    }

    /// Resolve a path argument, trying the source directory for bare names.
    fn locate(&self, book: &Path) -> Result<PathBuf> {
        if book.is_file() {
            return Ok(book.to_path_buf());
        }
        let in_source = self.opts.sourcedir.join(book);
        if in_source.is_file() {
            return Ok(in_source);
        }
        Err(ImportError::NotFound(book.to_path_buf()))
    }

    /// Where a book with this identity lives: `{master}/{bibid}.{ext}`,
    /// keeping the source extension only for formats stored as-is.
    fn canonical_path(&self, format: Option<BookFormat>, bibid: &str) -> PathBuf {
        let ext = match format {
            Some(f) if f.is_canonical() => f.extension(),
            _ => "mobi",
        };
        self.opts.masterdir.join(format!("{bibid}.{ext}"))
    }

    /// Put the canonical copy in place: a plain move for formats stored
    /// as-is, a conversion (plus backup of the original) for the rest.
    fn materialize(
        &self,
        book: &Path,
        original: &Path,
        format: Option<BookFormat>,
        bibid: &str,
    ) -> Result<PathBuf> {
        fs::create_dir_all(&self.opts.masterdir)?;
        let canonical = self.canonical_path(format, bibid);

        match format {
            Some(f) if f.is_canonical() => {
                // The move consumes the original; no backup copy exists.
                rename_or_copy(book, &canonical)?;
            }
            _ => {
                self.converter.convert(book, &canonical)?;
                self.backup(original, bibid)?;
            }
        }
        Ok(canonical)
    }

    /// Move the pre-conversion original into the backup directory.
    fn backup(&self, original: &Path, bibid: &str) -> Result<()> {
        fs::create_dir_all(&self.opts.backupdir)?;
        let name = match original.extension().and_then(|e| e.to_str()) {
            Some(ext) => format!("{bibid}.{ext}"),
            None => bibid.to_string(),
        };
        let target = self.opts.backupdir.join(name);
        tracing::info!(from = %original.display(), to = %target.display(), "moving original away");
        rename_or_copy(original, &target)
    }
}

/// List the direct entries of `dir` the batch driver considers importable,
/// in directory-listing order.
pub fn importable_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && BookFormat::from_path(&path).is_some() {
            files.push(path);
        }
    }
    Ok(files)
}

/// Rename, falling back to copy-and-delete when the master directory sits
/// on a different filesystem than the source.
fn rename_or_copy(from: &Path, to: &Path) -> Result<()> {
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    fs::copy(from, to)?;
    fs::remove_file(from)?;
    Ok(())
}
