use super::*;

fn dot(size: u32, at: (u32, u32)) -> RgbaImage {
    let mut img = RgbaImage::new(size, size);
    img.put_pixel(at.0, at.1, image::Rgba([200, 10, 10, 255]));
    img
}

#[test]
fn offsets_cover_eight_directions() {
    let o = outline_offsets(2);
    assert_eq!(o.len(), 8);
    assert!(!o.contains(&(0, 0)));
    assert!(o.iter().all(|&(dx, dy)| dx.abs() == 2 || dy.abs() == 2));
    assert_eq!(o[0], (-2, -2));
    assert_eq!(o[7], (2, 2));
}

#[test]
fn silhouette_is_alpha_channel() {
    let mut img = RgbaImage::new(2, 1);
    img.put_pixel(1, 0, image::Rgba([1, 2, 3, 77]));
    assert_eq!(silhouette(&img), vec![0, 77]);
}

#[test]
fn single_pixel_gets_white_inner_and_dark_outer_ring() {
    let img = dot(9, (4, 4));
    let out = compose_outline(&img, &OutlineStyle::default()).unwrap();
    assert_eq!(out.dimensions(), (9, 9));

    // Subject is drawn on top, unchanged.
    assert_eq!(out.get_pixel(4, 4).0, [200, 10, 10, 255]);

    for (dx, dy) in outline_offsets(1) {
        let p = out.get_pixel((4 + dx) as u32, (4 + dy) as u32).0;
        assert_eq!(p, [255, 255, 255, 255], "inner band at ({dx},{dy})");
    }
    for (dx, dy) in outline_offsets(2) {
        let p = out.get_pixel((4 + dx) as u32, (4 + dy) as u32).0;
        assert_eq!(p, [0, 0, 0, 166], "outer band at ({dx},{dy})");
    }

    // Untouched corner and a gap between stamped directions stay transparent.
    assert_eq!(out.get_pixel(0, 0).0[3], 0);
    assert_eq!(out.get_pixel(3, 2).0[3], 0);
}

#[test]
fn bands_are_clipped_at_the_edges() {
    let img = dot(3, (0, 0));
    let out = compose_outline(&img, &OutlineStyle::default()).unwrap();
    assert_eq!(out.get_pixel(0, 0).0, [200, 10, 10, 255]);
    assert_eq!(out.get_pixel(1, 1).0, [255, 255, 255, 255]);
    assert_eq!(out.get_pixel(2, 2).0, [0, 0, 0, 166]);
}

#[test]
fn compositing_is_deterministic() {
    let mut img = RgbaImage::new(16, 12);
    for y in 3..9 {
        for x in 4..12 {
            img.put_pixel(x, y, image::Rgba([(x * 10) as u8, (y * 20) as u8, 90, 180]));
        }
    }
    let style = OutlineStyle {
        stroke_width: 2,
        ..OutlineStyle::default()
    };
    let a = compose_outline(&img, &style).unwrap();
    let b = compose_outline(&img, &style).unwrap();
    assert_eq!(a.as_raw(), b.as_raw());
}
