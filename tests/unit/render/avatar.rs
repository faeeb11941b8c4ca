use super::*;

fn px(img: &RasterImage, x: u32, y: u32) -> [u8; 4] {
    img.pixel_clamped(i64::from(x), i64::from(y))
}

fn split_image() -> RasterImage {
    // 2x1: left red, right blue.
    RasterImage::from_premul_rgba8(2, 1, vec![255, 0, 0, 255, 0, 0, 255, 255]).unwrap()
}

#[test]
fn cover_rect_crops_the_long_side() {
    assert_eq!(cover_rect(2.0, 140.0), (-70.0, 0.0, 280.0, 140.0));
    assert_eq!(cover_rect(0.5, 140.0), (0.0, -70.0, 140.0, 280.0));
    assert_eq!(cover_rect(1.0, 140.0), (0.0, 0.0, 140.0, 140.0));
}

#[test]
fn disc_is_clipped_to_a_circle() {
    let src = RasterImage::from_premul_rgba8(1, 1, vec![10, 20, 30, 255]).unwrap();
    let disc = avatar_disc(&src, 70, &ImageTransform::default()).unwrap();
    assert_eq!((disc.width, disc.height), (70, 70));
    assert_eq!(px(&disc, 35, 35), [10, 20, 30, 255]);
    assert_eq!(px(&disc, 0, 0)[3], 0);
    assert_eq!(px(&disc, 69, 69)[3], 0);
}

#[test]
fn landscape_image_is_centered() {
    let disc = avatar_disc(&split_image(), 140, &ImageTransform::default()).unwrap();
    // Left half leans red, right half leans blue.
    let left = px(&disc, 20, 70);
    let right = px(&disc, 120, 70);
    assert!(left[0] > left[2]);
    assert!(right[2] > right[0]);
    assert_eq!((left[3], right[3]), (255, 255));
}

#[test]
fn pan_moves_content() {
    let t = ImageTransform {
        scale: 1.0,
        x: -60.0,
        y: 0.0,
    };
    let disc = avatar_disc(&split_image(), 140, &t).unwrap();
    // Panning left by 60 brings blue under the avatar center.
    let center = px(&disc, 70, 70);
    assert!(center[2] > 200 && center[0] < 55);
}

#[test]
fn zoom_out_reveals_transparent_margin() {
    let src = RasterImage::from_premul_rgba8(1, 1, vec![255, 255, 255, 255]).unwrap();
    let t = ImageTransform {
        scale: 0.5,
        x: 0.0,
        y: 0.0,
    };
    let disc = avatar_disc(&src, 140, &t).unwrap();
    assert_eq!(px(&disc, 70, 70)[3], 255);
    // Inside the circle but outside the half-size image.
    assert_eq!(px(&disc, 70, 8)[3], 0);
}
