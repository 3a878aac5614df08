use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::error::AudioError;
use super::file::{AudioFile, CapturedAudio};

/// A capture written to disk for the duration of one decode
///
/// The file is removed when the guard drops, whichever way the turn exits.
pub struct ScratchFile {
    file: Option<NamedTempFile>,
}

impl ScratchFile {
    pub fn write(dir: &Path, bytes: &[u8]) -> Result<Self, AudioError> {
        fs::create_dir_all(dir)?;

        let mut file = tempfile::Builder::new()
            .prefix("capture-")
            .suffix(".wav")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;

        debug!("Wrote scratch capture: {}", file.path().display());

        Ok(Self { file: Some(file) })
    }

    pub fn path(&self) -> &Path {
        self.file
            .as_ref()
            .map(|f| f.path())
            .unwrap_or_else(|| Path::new(""))
    }
}

impl Drop for ScratchFile {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let path: PathBuf = file.path().to_path_buf();
            match file.close() {
                Ok(()) => debug!("Released scratch capture: {}", path.display()),
                Err(e) => warn!("Failed to remove scratch capture {}: {}", path.display(), e),
            }
        }
    }
}

/// Decode raw capture bytes (a WAV container) into mono PCM at `target_sample_rate`
pub fn decode_capture(
    bytes: &[u8],
    scratch_dir: &Path,
    target_sample_rate: u32,
) -> Result<CapturedAudio, AudioError> {
    if bytes.is_empty() {
        return Err(AudioError::Empty);
    }

    let scratch = ScratchFile::write(scratch_dir, bytes)?;
    let audio = AudioFile::open(scratch.path())?;
    audio.to_captured(target_sample_rate)
}
