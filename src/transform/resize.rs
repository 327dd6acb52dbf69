use image::RgbaImage;
use image::imageops::FilterType;

use crate::foundation::error::{StickerError, StickerResult};
use crate::foundation::math::rgba8_len;

/// Output dimensions with the longest side scaled to exactly `target`.
///
/// Aspect ratio is preserved, each side is rounded to the nearest integer and clamped to at
/// least 1. Small images are scaled up.
pub fn target_dimensions(width: u32, height: u32, target: u32) -> StickerResult<(u32, u32)> {
    if width == 0 || height == 0 {
        return Err(StickerError::invalid_image(format!(
            "image has zero dimension ({width}x{height})"
        )));
    }
    if target == 0 {
        return Err(StickerError::validation("resize target must be > 0"));
    }

    let longest = f64::from(width.max(height));
    let scale = |side: u32| -> u32 {
        let scaled = (f64::from(side) * f64::from(target) / longest).round();
        (scaled as u32).max(1)
    };
    Ok((scale(width), scale(height)))
}

/// Resize `raster` so its longest side equals `target`.
pub fn resize_to_target(raster: &RgbaImage, target: u32) -> StickerResult<RgbaImage> {
    let (width, height) = raster.dimensions();
    let (tw, th) = target_dimensions(width, height, target)?;
    if rgba8_len(tw, th).is_none() {
        return Err(StickerError::surface(format!(
            "cannot allocate {tw}x{th} surface"
        )));
    }
    if (tw, th) == (width, height) {
        return Ok(raster.clone());
    }
    Ok(image::imageops::resize(raster, tw, th, FilterType::Triangle))
}

#[cfg(test)]
#[path = "../../tests/unit/transform/resize.rs"]
mod tests;
