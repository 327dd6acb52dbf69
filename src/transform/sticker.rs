use crate::assets::codec::{ImageCodec, OutputFormat};
use crate::assets::encoded::EncodedImage;
use crate::assets::source::{SourceImage, is_supported_media_type};
use crate::effects::outline::{OutlineStyle, compose_outline};
use crate::foundation::config::{DEFAULT_MAX_FILE_BYTES, DEFAULT_TARGET_SIZE};
use crate::foundation::error::{StickerError, StickerResult};
use crate::transform::resize::resize_to_target;

/// Per-image transformation parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TransformSettings {
    /// Longest side of the output raster.
    pub target_size: u32,
    /// Outline style, applied only when requested per call.
    pub outline: OutlineStyle,
    /// Encoder quality passed to the canonical encode.
    pub quality: f32,
    /// Size above which the result is flagged oversize.
    pub max_file_bytes: u64,
}

impl Default for TransformSettings {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            outline: OutlineStyle::default(),
            quality: 0.92,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
        }
    }
}

/// Output of a successful transformation.
#[derive(Clone, Debug)]
pub struct TransformedSticker {
    /// Original file name of the source.
    pub file_name: String,
    /// Output raster width.
    pub width: u32,
    /// Output raster height.
    pub height: u32,
    /// Canonical (PNG) encoding.
    pub image: EncodedImage,
    /// Encoded size exceeds `max_file_bytes`.
    pub oversize: bool,
}

/// Turn one source image into a fixed-size canonical sticker.
///
/// Steps: media type check, decode, resize (longest side = `target_size`), optional outline,
/// PNG encode. An oversize result is logged but still returned.
#[tracing::instrument(skip(source, settings, codec), fields(file = source.file_name()))]
pub fn transform_sticker(
    source: &SourceImage,
    add_outline: bool,
    settings: &TransformSettings,
    codec: &dyn ImageCodec,
) -> StickerResult<TransformedSticker> {
    if !is_supported_media_type(source.media_type()) {
        return Err(StickerError::unsupported_media_type(source.media_type()));
    }

    let decoded = codec.decode(source.bytes()).map_err(|e| {
        StickerError::invalid_image(format!("failed to load {}: {e:#}", source.file_name()))
    })?;

    let resized = resize_to_target(&decoded, settings.target_size)?;
    drop(decoded);

    let raster = if add_outline {
        compose_outline(&resized, &settings.outline)?
    } else {
        resized
    };

    let bytes = codec
        .encode(&raster, OutputFormat::Png, settings.quality)
        .map_err(|e| StickerError::encode(format!("{}: {e:#}", source.file_name())))?;

    let oversize = bytes.len() as u64 > settings.max_file_bytes;
    if oversize {
        tracing::warn!(
            file = source.file_name(),
            size_kb = bytes.len() / 1024,
            limit_kb = settings.max_file_bytes / 1024,
            "sticker exceeds the platform size limit"
        );
    }

    Ok(TransformedSticker {
        file_name: source.file_name().to_string(),
        width: raster.width(),
        height: raster.height(),
        image: EncodedImage::new(OutputFormat::Png, bytes),
        oversize,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/transform/sticker.rs"]
mod tests;
