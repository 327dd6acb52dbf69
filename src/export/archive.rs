use std::io::{Cursor, Write};

use crate::foundation::error::{StickerError, StickerResult};

/// Write-only archive collaborator: accumulate `(path, bytes)` entries, then serialize once.
pub trait ArchiveWriter {
    /// Add one entry.
    fn add_file(&mut self, path: &str, bytes: &[u8]) -> StickerResult<()>;
    /// Produce the finished container. Further calls fail.
    fn serialize(&mut self) -> StickerResult<Vec<u8>>;
}

/// [`ArchiveWriter`] producing a deflate-compressed zip in memory.
pub struct ZipArchiveWriter {
    inner: Option<zip::ZipWriter<Cursor<Vec<u8>>>>,
}

impl Default for ZipArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ZipArchiveWriter {
    /// Start an empty zip.
    pub fn new() -> Self {
        Self {
            inner: Some(zip::ZipWriter::new(Cursor::new(Vec::new()))),
        }
    }

    fn writer(&mut self) -> StickerResult<&mut zip::ZipWriter<Cursor<Vec<u8>>>> {
        self.inner
            .as_mut()
            .ok_or_else(|| StickerError::archive("zip already serialized"))
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn add_file(&mut self, path: &str, bytes: &[u8]) -> StickerResult<()> {
        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let w = self.writer()?;
        w.start_file(path, options)
            .map_err(|e| StickerError::archive(format!("start entry '{path}': {e}")))?;
        w.write_all(bytes)
            .map_err(|e| StickerError::archive(format!("write entry '{path}': {e}")))
    }

    fn serialize(&mut self) -> StickerResult<Vec<u8>> {
        let w = self
            .inner
            .take()
            .ok_or_else(|| StickerError::archive("zip already serialized"))?;
        let cursor = w
            .finish()
            .map_err(|e| StickerError::archive(format!("finish zip: {e}")))?;
        Ok(cursor.into_inner())
    }
}

/// In-memory archive for tests and debugging.
///
/// `serialize` returns a plain listing, one `path<TAB>len` line per entry.
#[derive(Debug, Default)]
pub struct InMemoryArchive {
    entries: Vec<(String, Vec<u8>)>,
    serialized: bool,
}

impl InMemoryArchive {
    /// Create an empty archive.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captured entries in insertion order.
    pub fn entries(&self) -> &[(String, Vec<u8>)] {
        &self.entries
    }

    /// Captured entry paths in insertion order.
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|(p, _)| p.as_str()).collect()
    }
}

impl ArchiveWriter for InMemoryArchive {
    fn add_file(&mut self, path: &str, bytes: &[u8]) -> StickerResult<()> {
        if self.serialized {
            return Err(StickerError::archive("archive already serialized"));
        }
        if self.entries.iter().any(|(p, _)| p == path) {
            return Err(StickerError::archive(format!("duplicate entry '{path}'")));
        }
        self.entries.push((path.to_string(), bytes.to_vec()));
        Ok(())
    }

    fn serialize(&mut self) -> StickerResult<Vec<u8>> {
        if self.serialized {
            return Err(StickerError::archive("archive already serialized"));
        }
        self.serialized = true;
        let mut out = String::new();
        for (path, bytes) in &self.entries {
            out.push_str(&format!("{path}\t{}\n", bytes.len()));
        }
        Ok(out.into_bytes())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/archive.rs"]
mod tests;
