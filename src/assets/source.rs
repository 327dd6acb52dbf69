use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::StickerResult;

/// Media types accepted by the transformer.
pub const SUPPORTED_MEDIA_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

/// Whether `media_type` is one of [`SUPPORTED_MEDIA_TYPES`] (case-insensitive).
pub fn is_supported_media_type(media_type: &str) -> bool {
    SUPPORTED_MEDIA_TYPES
        .iter()
        .any(|t| t.eq_ignore_ascii_case(media_type.trim()))
}

/// A raw user-selected image: bytes, declared media type and original file name.
#[derive(Clone, Debug)]
pub struct SourceImage {
    file_name: String,
    media_type: String,
    bytes: Arc<Vec<u8>>,
}

impl SourceImage {
    /// Build a source from in-memory bytes and a declared media type.
    pub fn new(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes: Arc::new(bytes.into()),
        }
    }

    /// Read a file from disk; the media type is derived from its extension.
    pub fn from_path(path: impl AsRef<Path>) -> StickerResult<Self> {
        let path = path.as_ref();
        let bytes =
            std::fs::read(path).with_context(|| format!("read source '{}'", path.display()))?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(file_name, media_type_for_path(path), bytes))
    }

    /// Original file name, as selected.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Declared media type.
    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    /// Raw encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether the declared type is in the `image/` family at all.
    pub fn is_image_type(&self) -> bool {
        self.media_type
            .get(..6)
            .is_some_and(|p| p.eq_ignore_ascii_case("image/"))
    }
}

/// Map a file extension to a media type the way a browser file picker would.
pub(crate) fn media_type_for_path(path: &Path) -> String {
    path.extension()
        .and_then(|ext| image::ImageFormat::from_extension(ext))
        .map(|f| f.to_mime_type().to_string())
        .unwrap_or_else(|| UNKNOWN_MEDIA_TYPE.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/source.rs"]
mod tests;
