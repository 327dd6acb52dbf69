use std::path::Path;

use anyhow::Context;

use crate::effects::outline::OutlineStyle;
use crate::export::build::ExportSettings;
use crate::foundation::error::{StickerError, StickerResult};
use crate::transform::sticker::TransformSettings;

/// Longest side of every produced sticker, in pixels.
pub const DEFAULT_TARGET_SIZE: u32 = 512;
/// Size above which a sticker is flagged as oversize (512 KiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 512 * 1024;
/// Maximum length of a sanitized base name.
pub const DEFAULT_NAME_MAX_LEN: usize = 50;

/// User-facing configuration, loadable from JSON.
///
/// Every field has a default so a partial (or empty) JSON object is valid.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StickerConfig {
    /// Longest side of the output raster.
    pub target_size: u32,
    /// Nominal outline stroke width; the dark band uses twice this radius.
    pub stroke_width: u32,
    /// Encoded size above which an oversize warning is recorded.
    pub max_file_bytes: u64,
    /// Maximum sanitized base-name length.
    pub name_max_len: usize,
    /// Base substituted when a name sanitizes to nothing.
    pub fallback_base: String,
    /// Encoder quality for the canonical PNG encode.
    pub canonical_quality: f32,
    /// Encoder quality for the alternate (WebP) re-encode.
    pub alternate_quality: f32,
    /// Folder namespace inside exported archives.
    pub archive_folder: String,
    /// Sort committed stickers by assigned name after each batch.
    pub sort_by_name: bool,
    /// Override the number of rayon worker threads. `None` uses rayon defaults.
    pub threads: Option<usize>,
}

impl Default for StickerConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            stroke_width: 1,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            name_max_len: DEFAULT_NAME_MAX_LEN,
            fallback_base: "sticker".to_string(),
            canonical_quality: 0.92,
            alternate_quality: 0.90,
            archive_folder: "TelegramStickers".to_string(),
            sort_by_name: true,
            threads: None,
        }
    }
}

impl StickerConfig {
    /// Parse and validate a JSON config document.
    pub fn from_json_str(s: &str) -> StickerResult<Self> {
        let cfg: Self =
            serde_json::from_str(s).map_err(|e| StickerError::config(format!("parse: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Read, parse and validate a JSON config file.
    pub fn from_path(path: impl AsRef<Path>) -> StickerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json_str(&text)
    }

    /// Check value ranges.
    pub fn validate(&self) -> StickerResult<()> {
        if self.target_size == 0 {
            return Err(StickerError::config("target_size must be > 0"));
        }
        if self.stroke_width == 0 || self.stroke_width > self.target_size {
            return Err(StickerError::config(
                "stroke_width must be within 1..=target_size",
            ));
        }
        if self.name_max_len == 0 {
            return Err(StickerError::config("name_max_len must be > 0"));
        }
        if self.fallback_base.is_empty()
            || self
                .fallback_base
                .chars()
                .any(|c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        {
            return Err(StickerError::config(
                "fallback_base must be non-empty and contain only [A-Za-z0-9_-]",
            ));
        }
        for (name, q) in [
            ("canonical_quality", self.canonical_quality),
            ("alternate_quality", self.alternate_quality),
        ] {
            if !q.is_finite() || !(0.0..=1.0).contains(&q) {
                return Err(StickerError::config(format!("{name} must be within 0..=1")));
            }
        }
        if self.archive_folder.is_empty() || self.archive_folder.contains(['/', '\\']) {
            return Err(StickerError::config(
                "archive_folder must be a single non-empty path segment",
            ));
        }
        if let Some(0) = self.threads {
            return Err(StickerError::config("threads must be >= 1 when set"));
        }
        Ok(())
    }

    /// Settings consumed by [`transform_sticker`](crate::transform_sticker).
    pub fn transform_settings(&self) -> TransformSettings {
        TransformSettings {
            target_size: self.target_size,
            outline: OutlineStyle {
                stroke_width: self.stroke_width,
                ..OutlineStyle::default()
            },
            quality: self.canonical_quality,
            max_file_bytes: self.max_file_bytes,
        }
    }

    /// Settings consumed by [`build_archive`](crate::build_archive).
    pub fn export_settings(&self) -> ExportSettings {
        ExportSettings {
            folder: self.archive_folder.clone(),
            alternate_quality: self.alternate_quality,
            fallback_base: self.fallback_base.clone(),
            threads: self.threads,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;
