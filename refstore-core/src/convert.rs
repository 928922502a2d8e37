//! Format conversion capability

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Capability: produce `dst` from `src`, with the target format implied by
/// `dst`'s extension.
///
/// The import pipeline only ever talks to this trait, so its decision logic
/// can be exercised without a converter installed.
pub trait Converter: Send + Sync {
    fn convert(&self, src: &Path, dst: &Path) -> Result<(), ConvertError>;
}

/// Adapter shelling out to Calibre's `ebook-convert`.
///
/// The tool is looked up lazily so that runs which never convert anything
/// (pure `.mobi`/`.pdf` relocations) work without Calibre installed.
#[derive(Default)]
pub struct EbookConvert;

impl EbookConvert {
    pub fn new() -> Self {
        Self
    }

    fn program() -> Result<PathBuf, ConvertError> {
        which::which("ebook-convert").map_err(|_| ConvertError::ToolMissing)
    }
}

impl Converter for EbookConvert {
    fn convert(&self, src: &Path, dst: &Path) -> Result<(), ConvertError> {
        let program = Self::program()?;
        tracing::info!(src = %src.display(), dst = %dst.display(), "converting");
        // Its own chatter is suppressed; the exit code is the only verdict.
        let status = Command::new(program)
            .arg(src)
            .arg(dst)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if status.success() {
            Ok(())
        } else {
            Err(ConvertError::Failed {
                dst: dst.to_path_buf(),
                status,
            })
        }
    }
}
