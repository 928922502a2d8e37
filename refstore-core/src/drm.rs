//! DRM removal capability

use crate::error::DecryptError;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::SystemTime;

/// Capability: strip vendor DRM from a book file.
pub trait Decryptor: Send + Sync {
    /// Decrypt `path`, returning where the decrypted file landed.
    /// The original file is left in place.
    fn decrypt(&self, path: &Path) -> Result<PathBuf, DecryptError>;
}

/// Adapter around the DeDRM `k4mobidedrm.py` script.
///
/// Serial and tool directory are each optional, but wiring the adapter at
/// all requires at least one of them; without a tool directory the script is
/// looked up on PATH.
pub struct DedrmTool {
    serial: Option<String>,
    tooldir: Option<PathBuf>,
}

impl DedrmTool {
    pub fn new(serial: Option<String>, tooldir: Option<PathBuf>) -> Self {
        Self { serial, tooldir }
    }

    fn script(&self) -> Result<PathBuf, DecryptError> {
        if let Some(dir) = &self.tooldir {
            let script = dir.join("k4mobidedrm.py");
            if script.is_file() {
                return Ok(script);
            }
            return Err(DecryptError::ScriptMissing(dir.display().to_string()));
        }
        which::which("k4mobidedrm.py")
            .map_err(|_| DecryptError::ScriptMissing("PATH".to_string()))
    }

    fn python() -> Result<PathBuf, DecryptError> {
        which::which("python3")
            .or_else(|_| which::which("python"))
            .map_err(|_| DecryptError::PythonMissing)
    }
}

impl Decryptor for DedrmTool {
    fn decrypt(&self, path: &Path) -> Result<PathBuf, DecryptError> {
        let script = self.script()?;
        let python = Self::python()?;

        // The script names its output itself, so give it a dedicated
        // directory and take whatever it leaves there.
        let outdir = path.with_extension("dedrm");
        fs::create_dir_all(&outdir)?;

        let mut cmd = Command::new(python);
        cmd.arg(&script);
        if let Some(serial) = &self.serial {
            cmd.args(["-s", serial.as_str()]);
        }
        tracing::info!(book = %path.display(), "removing DRM");
        let status = cmd
            .arg(path)
            .arg(&outdir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if !status.success() {
            return Err(DecryptError::Failed(status));
        }

        newest_file(&outdir)?.ok_or(DecryptError::NoOutput(outdir))
    }
}

fn newest_file(dir: &Path) -> Result<Option<PathBuf>, DecryptError> {
    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let modified = fs::metadata(&path)?.modified()?;
        if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
            newest = Some((modified, path));
        }
    }
    Ok(newest.map(|(_, path)| path))
}
