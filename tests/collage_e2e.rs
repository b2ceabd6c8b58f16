//! End-to-end tests for collage composition.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, GenericImageView, ImageEncoder, Rgb, RgbImage};

use photobooth::collage::{compose, CollageStyle, CompositionError};
use photobooth::encoded::{EncodedFormat, EncodedImage};
use photobooth::layout::{resolve, Layout, LayoutSpec, PhotoCount};

fn solid_png(width: u32, height: u32, color: [u8; 3]) -> EncodedImage {
    let img = RgbImage::from_pixel(width, height, Rgb(color));
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .unwrap();
    EncodedImage::new(EncodedFormat::Png, width, height, bytes)
}

fn close_to(actual: [u8; 3], expected: [u8; 3]) -> bool {
    actual
        .iter()
        .zip(expected)
        .all(|(&a, e)| (i16::from(a) - i16::from(e)).abs() <= 24)
}

const RED: [u8; 3] = [220, 30, 30];
const GREEN: [u8; 3] = [30, 200, 40];
const BLUE: [u8; 3] = [30, 40, 210];
const YELLOW: [u8; 3] = [230, 210, 20];

#[tokio::test]
async fn test_canvas_size_matches_layout() {
    let cases = [
        (PhotoCount::Two, Layout::SideBySide, 1400, 800),
        (PhotoCount::Two, Layout::UpAndDown, 800, 1400),
        (PhotoCount::Three, Layout::SideBySide, 2000, 800),
        (PhotoCount::Four, Layout::SideBySide, 2600, 800),
        (PhotoCount::Four, Layout::Grid2x2, 1400, 1400),
    ];

    for (count, layout, width, height) in cases {
        let captures: Vec<_> = (0..count.get())
            .map(|_| solid_png(64, 36, RED))
            .collect();
        let collage = compose(&captures, resolve(count, layout), &CollageStyle::default())
            .await
            .unwrap();

        assert_eq!(collage.image.format(), EncodedFormat::Jpeg);
        let decoded = collage.image.decode().unwrap();
        assert_eq!(
            decoded.dimensions(),
            (width, height),
            "{} photos {}",
            count,
            layout
        );
        assert_eq!(collage.geometry.photos.len(), count.get());
    }
}

#[tokio::test]
async fn test_grid_places_photos_in_row_major_order() {
    let colors = [RED, GREEN, BLUE, YELLOW];
    let captures: Vec<_> = colors.iter().map(|&c| solid_png(80, 60, c)).collect();

    let collage = compose(&captures, LayoutSpec::FOUR_GRID, &CollageStyle::default())
        .await
        .unwrap();
    let decoded = collage.image.decode().unwrap().to_rgb8();

    let expected_cells = [(0, 0), (0, 1), (1, 0), (1, 1)];
    for (i, photo) in collage.geometry.photos.iter().enumerate() {
        assert_eq!(photo.placement.index, i);
        assert_eq!(
            (photo.placement.row, photo.placement.column),
            expected_cells[i]
        );

        let (cx, cy) = photo.drawn.center();
        let pixel = decoded.get_pixel(cx as u32, cy as u32).0;
        assert!(
            close_to(pixel, colors[i]),
            "photo {} centre is {:?}, expected {:?}",
            i,
            pixel,
            colors[i]
        );
    }
}

#[tokio::test]
async fn test_background_and_card_colors() {
    let captures = vec![solid_png(40, 30, BLUE), solid_png(40, 30, BLUE)];
    let collage = compose(&captures, LayoutSpec::TWO_SIDE_BY_SIDE, &CollageStyle::default())
        .await
        .unwrap();
    let decoded = collage.image.decode().unwrap().to_rgb8();

    // top-left corner is padding
    assert!(close_to(decoded.get_pixel(2, 2).0, [0xFA, 0xD2, 0xE1]));

    // caption strip of the first card is white
    let card = collage.geometry.photos[0].placement.card;
    let caption_y = card.bottom() - card.height * 0.1;
    let pixel = decoded.get_pixel(card.center().0 as u32, caption_y as u32).0;
    assert!(close_to(pixel, [255, 255, 255]), "caption is {:?}", pixel);
}

#[tokio::test]
async fn test_wide_photo_is_letterboxed() {
    let captures = vec![solid_png(1280, 720, RED), solid_png(720, 1280, GREEN)];
    let collage = compose(&captures, LayoutSpec::TWO_SIDE_BY_SIDE, &CollageStyle::default())
        .await
        .unwrap();

    for photo in &collage.geometry.photos {
        let bounds = photo.placement.photo_box;
        let drawn = photo.drawn;
        let (w, h) = photo.source_size;

        assert!(bounds.contains(&drawn));
        assert!((drawn.aspect_ratio() - f64::from(w) / f64::from(h)).abs() < 1e-6);

        let full_width = (drawn.width - bounds.width).abs() < 1e-6;
        let full_height = (drawn.height - bounds.height).abs() < 1e-6;
        assert!(full_width || full_height);
        // centred on the axis with slack
        assert!((drawn.center().0 - bounds.center().0).abs() < 1e-6);
        assert!((drawn.center().1 - bounds.center().1).abs() < 1e-6);
    }

    // 16:9 in a near-square box fills the width, 9:16 fills the height
    let wide = &collage.geometry.photos[0];
    assert!((wide.drawn.width - wide.placement.photo_box.width).abs() < 1e-6);
    let tall = &collage.geometry.photos[1];
    assert!((tall.drawn.height - tall.placement.photo_box.height).abs() < 1e-6);
}

#[tokio::test]
async fn test_geometry_is_deterministic() {
    let captures = vec![solid_png(64, 48, RED), solid_png(48, 64, BLUE)];
    let style = CollageStyle::default();

    let first = compose(&captures, LayoutSpec::TWO_UP_AND_DOWN, &style)
        .await
        .unwrap();
    let second = compose(&captures, LayoutSpec::TWO_UP_AND_DOWN, &style)
        .await
        .unwrap();

    assert_eq!(first.geometry, second.geometry);
    assert_eq!(first.image, second.image);
}

#[tokio::test]
async fn test_undecodable_capture_fails_whole_composition() {
    let broken = EncodedImage::new(EncodedFormat::Png, 10, 10, vec![0x89, b'P', b'N', b'G']);
    let captures = vec![
        solid_png(20, 20, RED),
        broken.clone(),
        solid_png(20, 20, BLUE),
        broken,
    ];

    let err = compose(&captures, LayoutSpec::FOUR_GRID, &CollageStyle::default())
        .await
        .unwrap_err();
    match err {
        CompositionError::Decode { index, .. } => assert_eq!(index, 1),
        other => panic!("Expected decode error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_jpeg_input_is_accepted() {
    let img = RgbImage::from_pixel(50, 40, Rgb(GREEN));
    let mut jpeg = Vec::new();
    image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg, 90)
        .write_image(img.as_raw(), 50, 40, ExtendedColorType::Rgb8)
        .unwrap();
    let capture = EncodedImage::from_bytes(jpeg).unwrap();
    assert_eq!(capture.format(), EncodedFormat::Jpeg);

    let collage = compose(
        &[capture.clone(), capture],
        LayoutSpec::TWO_SIDE_BY_SIDE,
        &CollageStyle::default(),
    )
    .await
    .unwrap();
    assert_eq!(collage.geometry.photos[1].source_size, (50, 40));
}
