use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use super::ExportError;

/// Where exported bytes end up. The platform "download" primitive.
pub trait FileSink: Send + Sync {
    /// Saves `bytes` as `filename` and returns the final location.
    fn save_file(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, ExportError>;
}

/// Saves into a fixed directory. Writes go to a temp file in the same
/// directory and are renamed into place, so a reader never sees a partial file.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileSink for DirectorySink {
    fn save_file(&self, bytes: &[u8], filename: &str) -> Result<PathBuf, ExportError> {
        if Path::new(filename).file_name().and_then(|n| n.to_str()) != Some(filename) {
            return Err(ExportError::Save(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("'{filename}' is not a plain file name"),
            )));
        }

        std::fs::create_dir_all(&self.dir)?;
        let mut tmp = NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(bytes)?;
        tmp.flush()?;

        let path = self.dir.join(filename);
        tmp.persist(&path).map_err(|e| e.error)?;

        info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
