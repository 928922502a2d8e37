//! refstore CLI - import ebooks into a bib-indexed personal library

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use refstore_core::annotate::KindleClippings;
use refstore_core::convert::EbookConvert;
use refstore_core::drm::DedrmTool;
use refstore_core::resolver::EmbeddedResolver;
use refstore_core::{importable_files, DocType, ImportOptions, Importer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "refstore")]
#[command(author, version)]
#[command(about = "Import books: record a bib entry, store the file under its \
identifier, and append kindle clippings to a notes file")]
struct Cli {
    /// Book files to import; with none given, every importable file in the
    /// source directory is processed
    files: Vec<PathBuf>,

    /// Directory book files are stored in
    #[arg(short, long, value_name = "DIR")]
    master: PathBuf,

    /// Directory to look for books in
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    source: PathBuf,

    /// Bib file entries are appended to
    #[arg(short, long, value_name = "FILE", default_value = "ref.bib")]
    bib: PathBuf,

    /// Org-mode file clippings are appended to
    #[arg(short, long, value_name = "FILE", default_value = "ref.org")]
    org: PathBuf,

    /// Process books that already appear in the bib file
    #[arg(short, long)]
    also_repeated: bool,

    /// Document type entries are filed as (book or article)
    #[arg(short = 't', long, default_value = "book", value_name = "TYPE")]
    doctype: DocType,

    /// Serial of the kindle the books were downloaded for; enables DRM removal
    #[arg(short, long, value_name = "SERIAL")]
    kindle: Option<String>,

    /// Directory holding the DeDRM k4mobidedrm.py script
    #[arg(short, long, value_name = "DIR")]
    dedrm: Option<PathBuf>,

    /// Kindle clippings export to read notes from, instead of the default
    /// locations
    #[arg(long, value_name = "FILE")]
    clippings: Option<PathBuf>,

    /// Directory pre-conversion originals are moved into
    #[arg(long, value_name = "DIR", default_value = "imported")]
    backup_dir: PathBuf,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "refstore_cli=debug,refstore_core=debug"
    } else {
        "refstore_cli=info,refstore_core=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let importer = build_importer(&cli);

    let books = if cli.files.is_empty() {
        importable_files(&cli.source)
            .with_context(|| format!("failed to list {}", cli.source.display()))?
    } else {
        cli.files.clone()
    };

    if books.is_empty() {
        println!("No importable books found in {}", cli.source.display());
        return Ok(());
    }

    run(&importer, &books)
}

fn build_importer(cli: &Cli) -> Importer {
    let opts = ImportOptions::new(&cli.master, &cli.source)
        .with_bibfile(&cli.bib)
        .with_backupdir(&cli.backup_dir)
        .with_doctype(cli.doctype)
        .process_repeated(cli.also_repeated);

    let mut exporter = KindleClippings::new(&cli.org);
    if let Some(clippings) = &cli.clippings {
        exporter = exporter.with_source(clippings);
    }

    let mut importer = Importer::new(
        opts,
        Box::new(EmbeddedResolver),
        Box::new(EbookConvert::new()),
        Box::new(exporter),
    );

    // Either option alone is enough to wire DRM removal; without both the
    // script falls back to a PATH lookup / keyless invocation.
    if cli.kindle.is_some() || cli.dedrm.is_some() {
        importer = importer
            .with_decryptor(Box::new(DedrmTool::new(cli.kindle.clone(), cli.dedrm.clone())));
    }

    importer
}

fn run(importer: &Importer, books: &[PathBuf]) -> Result<()> {
    let pb = ProgressBar::new(books.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>3}/{len:3} {msg}")
            .unwrap()
            .progress_chars("##-"),
    );

    let mut imported = 0usize;
    let mut failed = 0usize;

    for book in books {
        pb.set_message(
            book.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        match importer.import(book) {
            Ok(dest) => {
                imported += 1;
                pb.println(format!("{} -> {}", book.display(), dest.display()));
            }
            Err(e) => {
                failed += 1;
                tracing::error!(book = %book.display(), "import failed: {e}");
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    println!("\nImport complete:");
    println!("  Imported: {imported}");
    println!("  Failed:   {failed}");

    if failed > 0 {
        bail!("{failed} book(s) failed to import");
    }
    Ok(())
}
