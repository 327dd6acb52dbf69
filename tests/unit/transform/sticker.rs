use std::io::Cursor;

use image::RgbaImage;

use super::*;
use crate::assets::codec::ImageRsCodec;

fn png_bytes(w: u32, h: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(w, h, |x, y| {
        if x > w / 4 && x < 3 * w / 4 && y > h / 4 && y < 3 * h / 4 {
            image::Rgba([30, 160, 90, 255])
        } else {
            image::Rgba([0, 0, 0, 0])
        }
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

struct FailingEncoder;

impl ImageCodec for FailingEncoder {
    fn decode(&self, bytes: &[u8]) -> anyhow::Result<RgbaImage> {
        ImageRsCodec.decode(bytes)
    }

    fn encode(&self, _: &RgbaImage, _: OutputFormat, _: f32) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("no output")
    }
}

fn small_settings() -> TransformSettings {
    TransformSettings {
        target_size: 64,
        ..TransformSettings::default()
    }
}

#[test]
fn transform_resizes_and_encodes_png() {
    let src = SourceImage::new("cat.png", "image/png", png_bytes(40, 20));
    let out = transform_sticker(&src, false, &small_settings(), &ImageRsCodec).unwrap();
    assert_eq!((out.width, out.height), (64, 32));
    assert_eq!(out.image.format(), OutputFormat::Png);
    assert!(!out.oversize);

    let decoded = image::load_from_memory(out.image.bytes()).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (64, 32));
}

#[test]
fn unsupported_media_type_is_rejected_before_decode() {
    let src = SourceImage::new("old.bmp", "image/bmp", png_bytes(4, 4));
    let err = transform_sticker(&src, false, &small_settings(), &ImageRsCodec).unwrap_err();
    assert!(matches!(
        err,
        StickerError::UnsupportedMediaType { ref media_type } if media_type == "image/bmp"
    ));
}

#[test]
fn corrupt_bytes_are_invalid_image() {
    let src = SourceImage::new("broken.png", "image/png", b"nope".to_vec());
    let err = transform_sticker(&src, false, &small_settings(), &ImageRsCodec).unwrap_err();
    assert!(matches!(err, StickerError::InvalidImage(_)));
    assert!(err.to_string().contains("broken.png"));
}

#[test]
fn encoder_failure_is_encode_error() {
    let src = SourceImage::new("ok.png", "image/png", png_bytes(8, 8));
    let err = transform_sticker(&src, false, &small_settings(), &FailingEncoder).unwrap_err();
    assert!(matches!(err, StickerError::Encode(_)));
}

#[test]
fn oversize_is_flagged_not_failed() {
    let src = SourceImage::new("big.png", "image/png", png_bytes(16, 16));
    let settings = TransformSettings {
        max_file_bytes: 1,
        ..small_settings()
    };
    let out = transform_sticker(&src, false, &settings, &ImageRsCodec).unwrap();
    assert!(out.oversize);
}

#[test]
fn outline_output_is_byte_identical_across_runs() {
    let src = SourceImage::new("shape.png", "image/png", png_bytes(30, 50));
    let a = transform_sticker(&src, true, &small_settings(), &ImageRsCodec).unwrap();
    let b = transform_sticker(&src, true, &small_settings(), &ImageRsCodec).unwrap();
    assert_eq!(a.image.bytes(), b.image.bytes());

    let plain = transform_sticker(&src, false, &small_settings(), &ImageRsCodec).unwrap();
    assert_ne!(a.image.bytes(), plain.image.bytes());
    assert_eq!((a.width, a.height), (plain.width, plain.height));
}
