use crate::foundation::error::{StickerError, StickerResult};
use crate::foundation::math::mul_div255_u8;

/// Premultiplied RGBA8 pixel (r,g,b already multiplied by a).
pub type PremulRgba8 = [u8; 4];

/// Source-over composite of one premultiplied pixel onto another.
pub fn over(dst: PremulRgba8, src: PremulRgba8, opacity: f32) -> PremulRgba8 {
    let opacity = opacity.clamp(0.0, 1.0);
    if opacity <= 0.0 || src[3] == 0 {
        return dst;
    }

    let op = ((opacity * 255.0).round() as i32).clamp(0, 255) as u16;
    let sa = mul_div255(u16::from(src[3]), op);
    if sa == 0 {
        return dst;
    }

    let inv = 255u16 - u16::from(sa);

    let mut out = [0u8; 4];
    out[3] = add_sat_u8(sa, mul_div255(u16::from(dst[3]), inv));

    for i in 0..3 {
        let sc = mul_div255(u16::from(src[i]), op);
        let dc = mul_div255(u16::from(dst[i]), inv);
        out[i] = add_sat_u8(sc, dc);
    }
    out
}

/// Source-over of a whole premultiplied buffer onto another of equal length.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> StickerResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(StickerError::surface(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]], 1.0);
        d.copy_from_slice(&out);
    }
    Ok(())
}

/// Stamp `color`, masked by `mask` coverage, onto `dst` shifted by `(dx, dy)`.
///
/// `mask` holds one coverage byte per pixel of a `width * height` surface; pixels shifted
/// outside the surface are clipped.
pub(crate) fn stamp_mask(
    dst: &mut [u8],
    width: u32,
    height: u32,
    mask: &[u8],
    offset: (i32, i32),
    color: PremulRgba8,
) -> StickerResult<()> {
    let px = (width as usize) * (height as usize);
    if mask.len() != px || dst.len() != px * 4 {
        return Err(StickerError::surface(
            "stamp_mask expects mask and dst matching width*height",
        ));
    }
    let (dx, dy) = offset;
    let (w, h) = (width as i64, height as i64);

    for y in 0..h {
        let ty = y + i64::from(dy);
        if ty < 0 || ty >= h {
            continue;
        }
        for x in 0..w {
            let tx = x + i64::from(dx);
            if tx < 0 || tx >= w {
                continue;
            }
            let cov = mask[(y * w + x) as usize];
            if cov == 0 {
                continue;
            }
            let src = [
                mul_div255(u16::from(color[0]), u16::from(cov)),
                mul_div255(u16::from(color[1]), u16::from(cov)),
                mul_div255(u16::from(color[2]), u16::from(cov)),
                mul_div255(u16::from(color[3]), u16::from(cov)),
            ];
            let idx = ((ty * w + tx) as usize) * 4;
            let d = [dst[idx], dst[idx + 1], dst[idx + 2], dst[idx + 3]];
            dst[idx..idx + 4].copy_from_slice(&over(d, src, 1.0));
        }
    }
    Ok(())
}

/// Convert straight-alpha RGBA8 to premultiplied, in place.
pub fn premultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = mul_div255(u16::from(*c), a);
        }
    }
}

/// Convert premultiplied RGBA8 back to straight alpha, in place.
pub fn unpremultiply_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        match u32::from(px[3]) {
            0 => px[..3].fill(0),
            255 => {}
            a => {
                for c in &mut px[..3] {
                    *c = ((u32::from(*c) * 255 + a / 2) / a).min(255) as u8;
                }
            }
        }
    }
}

fn mul_div255(x: u16, y: u16) -> u8 {
    mul_div255_u8(x, y)
}

fn add_sat_u8(a: u8, b: u8) -> u8 {
    a.saturating_add(b)
}

#[cfg(test)]
#[path = "../../tests/unit/effects/composite.rs"]
mod tests;
