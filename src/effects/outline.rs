//! Two-tone sticker outline built from stamped silhouettes.
//!
//! The silhouette of the subject is stamped at eight compass offsets twice: first in a soft
//! dark color at twice the stroke radius, then in white at the stroke radius. The subject is
//! then drawn on top, so the bands only show around it.

use image::RgbaImage;

use crate::effects::composite::{
    PremulRgba8, over_in_place, premultiply_in_place, stamp_mask, unpremultiply_in_place,
};
use crate::foundation::error::{StickerError, StickerResult};
use crate::foundation::math::rgba8_len;

/// Outline stroke parameters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutlineStyle {
    /// Radius of the light inner band; the dark outer band uses twice this.
    pub stroke_width: u32,
    /// Outer band color, premultiplied.
    pub dark: PremulRgba8,
    /// Inner band color, premultiplied.
    pub light: PremulRgba8,
}

impl Default for OutlineStyle {
    fn default() -> Self {
        Self {
            stroke_width: 1,
            // rgba(0, 0, 0, 0.65)
            dark: [0, 0, 0, 166],
            light: [255, 255, 255, 255],
        }
    }
}

/// The eight compass offsets at `radius`, in row-major order starting top-left.
pub fn outline_offsets(radius: i32) -> [(i32, i32); 8] {
    let s = radius;
    [
        (-s, -s),
        (0, -s),
        (s, -s),
        (-s, 0),
        (s, 0),
        (-s, s),
        (0, s),
        (s, s),
    ]
}

/// Coverage mask of `raster`: its alpha channel, one byte per pixel.
pub fn silhouette(raster: &RgbaImage) -> Vec<u8> {
    raster.pixels().map(|p| p.0[3]).collect()
}

/// Composite the two-tone outline behind `raster` and return the new straight-alpha raster.
///
/// Output has the same dimensions as the input; bands that would fall outside are clipped.
pub fn compose_outline(raster: &RgbaImage, style: &OutlineStyle) -> StickerResult<RgbaImage> {
    let (width, height) = raster.dimensions();
    let len = rgba8_len(width, height)
        .ok_or_else(|| StickerError::surface("outline surface size overflow"))?;
    let radius = i32::try_from(style.stroke_width)
        .ok()
        .and_then(|r| r.checked_mul(2).map(|outer| (r, outer)))
        .ok_or_else(|| StickerError::validation("outline stroke width too large"))?;

    let mask = silhouette(raster);
    let mut canvas = vec![0u8; len];

    let (inner, outer) = radius;
    for offset in outline_offsets(outer) {
        stamp_mask(&mut canvas, width, height, &mask, offset, style.dark)?;
    }
    for offset in outline_offsets(inner) {
        stamp_mask(&mut canvas, width, height, &mask, offset, style.light)?;
    }

    let mut subject = raster.as_raw().clone();
    premultiply_in_place(&mut subject);
    over_in_place(&mut canvas, &subject)?;
    unpremultiply_in_place(&mut canvas);

    RgbaImage::from_raw(width, height, canvas)
        .ok_or_else(|| StickerError::surface("outline buffer does not match raster size"))
}

#[cfg(test)]
#[path = "../../tests/unit/effects/outline.rs"]
mod tests;
