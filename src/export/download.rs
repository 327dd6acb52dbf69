use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::foundation::error::{StickerError, StickerResult};

/// Delivery collaborator: hands a finished file to the user.
pub trait DownloadTarget {
    /// Deliver `bytes` under `file_name`.
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> StickerResult<()>;
}

/// [`DownloadTarget`] writing into a local directory.
#[derive(Debug)]
pub struct DirectoryTarget {
    dir: PathBuf,
    delivered: Vec<PathBuf>,
}

impl DirectoryTarget {
    /// Target `dir`; it is created on first delivery.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            delivered: Vec::new(),
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far.
    pub fn delivered(&self) -> &[PathBuf] {
        &self.delivered
    }
}

impl DownloadTarget for DirectoryTarget {
    fn deliver(&mut self, file_name: &str, bytes: &[u8]) -> StickerResult<()> {
        if file_name.is_empty()
            || file_name == "."
            || file_name == ".."
            || file_name.contains(['/', '\\'])
        {
            return Err(StickerError::validation(format!(
                "invalid download name '{file_name}'"
            )));
        }

        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes).with_context(|| format!("write '{}'", path.display()))?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "delivered");
        self.delivered.push(path);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/download.rs"]
mod tests;
