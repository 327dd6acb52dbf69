use std::sync::Arc;

use base64::Engine as _;

use crate::assets::codec::OutputFormat;

/// Encoded image bytes tagged with their format.
///
/// Bytes are reference-counted so stickers can be cloned into export tasks cheaply.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodedImage {
    format: OutputFormat,
    bytes: Arc<Vec<u8>>,
}

impl EncodedImage {
    /// Wrap already-encoded bytes.
    pub fn new(format: OutputFormat, bytes: Vec<u8>) -> Self {
        Self {
            format,
            bytes: Arc::new(bytes),
        }
    }

    /// Encoding of [`Self::bytes`].
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Encoded bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Encoded size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether no bytes are held.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Displayable preview as a `data:` URL.
    pub fn preview_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.media_type(),
            base64::engine::general_purpose::STANDARD.encode(self.bytes.as_slice())
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/encoded.rs"]
mod tests;
