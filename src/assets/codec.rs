use anyhow::Context;
use image::{ExtendedColorType, ImageEncoder, RgbaImage};

/// Encodings a sticker can be stored or exported in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless PNG, the canonical stored format.
    Png,
    /// WebP, the alternate export format.
    Webp,
}

impl OutputFormat {
    /// File extension including the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => ".png",
            Self::Webp => ".webp",
        }
    }

    /// Short lowercase label (`png` / `webp`).
    pub fn label(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    /// IANA media type.
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }

    /// Parse a format from its extension (with or without the dot, case-insensitive).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        if ext.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else if ext.eq_ignore_ascii_case("webp") {
            Some(Self::Webp)
        } else {
            None
        }
    }
}

/// Decode/encode collaborator.
///
/// Implementations must be shareable across rayon workers. `encode` failing is reported by the
/// caller as an encode error.
pub trait ImageCodec: Send + Sync {
    /// Decode encoded bytes into a straight-alpha RGBA8 raster.
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<RgbaImage>;

    /// Encode a straight-alpha RGBA8 raster. `quality` is in `0..=1`.
    fn encode(&self, raster: &RgbaImage, format: OutputFormat, quality: f32)
    -> anyhow::Result<Vec<u8>>;
}

/// [`ImageCodec`] backed by the `image` crate.
///
/// Both encoders are lossless, so `quality` does not change the output pixels.
#[derive(Clone, Copy, Debug, Default)]
pub struct ImageRsCodec;

impl ImageCodec for ImageRsCodec {
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<RgbaImage> {
        let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
        Ok(dyn_img.to_rgba8())
    }

    fn encode(
        &self,
        raster: &RgbaImage,
        format: OutputFormat,
        _quality: f32,
    ) -> anyhow::Result<Vec<u8>> {
        let (width, height) = raster.dimensions();
        let mut out = Vec::new();
        match format {
            OutputFormat::Png => image::codecs::png::PngEncoder::new(&mut out)
                .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
                .context("encode png")?,
            OutputFormat::Webp => image::codecs::webp::WebPEncoder::new_lossless(&mut out)
                .encode(raster.as_raw(), width, height, ExtendedColorType::Rgba8)
                .context("encode webp")?,
        }
        anyhow::ensure!(!out.is_empty(), "{} encoder produced no output", format.label());
        Ok(out)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/codec.rs"]
mod tests;
