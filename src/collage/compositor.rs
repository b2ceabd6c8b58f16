//! Collage compositing: decode the captures, draw the polaroid cards, encode
//! the result.

use futures_util::future::join_all;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError, Rgba, RgbaImage};
use std::time::Instant;

use super::geometry::{fit_aspect, place_cards, CardPlacement, CollageStyle, PixelRect, Rect, Shadow};
use crate::encoded::{EncodedFormat, EncodedImage};
use crate::layout::LayoutSpec;

const CARD_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// Errors that can occur while composing a collage.
#[derive(Debug, thiserror::Error)]
pub enum CompositionError {
    #[error("no captures to compose")]
    NoCaptures,
    #[error("{captures} captures do not fit a layout with {cells} slots")]
    TooManyCaptures { captures: usize, cells: u32 },
    #[error("failed to decode capture {index}: {source}")]
    Decode {
        index: usize,
        #[source]
        source: ImageError,
    },
    #[error("failed to encode collage: {0}")]
    Encode(#[source] ImageError),
    #[error("decode task failed: {0}")]
    TaskFailed(String),
}

/// One photo as drawn on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedPhoto {
    pub placement: CardPlacement,
    /// Aspect-fit rectangle the bitmap was scaled into
    pub drawn: Rect,
    /// Size of the source bitmap
    pub source_size: (u32, u32),
}

/// Everything that was laid out for one collage.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageGeometry {
    pub spec: LayoutSpec,
    pub photos: Vec<PlacedPhoto>,
}

/// A finished collage.
#[derive(Debug, Clone)]
pub struct Collage {
    pub image: EncodedImage,
    pub geometry: CollageGeometry,
}

/// Compose captures into a single JPEG collage.
///
/// All captures are decoded concurrently; drawing starts only after every
/// decode has settled, and photos are placed in input order. Any decode
/// failure fails the whole composition.
pub async fn compose(
    captures: &[EncodedImage],
    spec: LayoutSpec,
    style: &CollageStyle,
) -> Result<Collage, CompositionError> {
    if captures.is_empty() {
        return Err(CompositionError::NoCaptures);
    }
    if captures.len() > spec.cells() as usize {
        return Err(CompositionError::TooManyCaptures {
            captures: captures.len(),
            cells: spec.cells(),
        });
    }

    let started = Instant::now();
    let bitmaps = decode_all(captures).await?;
    log::debug!(
        "Decoded {} capture(s) in {:?}",
        bitmaps.len(),
        started.elapsed()
    );

    let (canvas, geometry) = render(&bitmaps, &spec, style);
    let image = encode_jpeg(canvas, style.jpeg_quality)?;
    log::debug!(
        "Composed {}x{} collage ({} bytes) in {:?}",
        image.width(),
        image.height(),
        image.len(),
        started.elapsed()
    );

    Ok(Collage { image, geometry })
}

/// Decode every capture on the blocking pool.
///
/// The returned bitmaps are in input order regardless of which decode
/// finished first. If several decodes fail, the lowest index is reported.
pub async fn decode_all(captures: &[EncodedImage]) -> Result<Vec<DynamicImage>, CompositionError> {
    let tasks = captures.iter().cloned().map(|capture| {
        tokio::task::spawn_blocking(move || capture.decode())
    });

    let settled = join_all(tasks).await;

    let mut bitmaps = Vec::with_capacity(settled.len());
    for (index, outcome) in settled.into_iter().enumerate() {
        match outcome {
            Ok(Ok(bitmap)) => bitmaps.push(bitmap),
            Ok(Err(source)) => return Err(CompositionError::Decode { index, source }),
            Err(e) => return Err(CompositionError::TaskFailed(e.to_string())),
        }
    }
    Ok(bitmaps)
}

/// Draw decoded bitmaps onto a fresh canvas.
///
/// This is the synchronous raster step of [`compose`]; it never fails.
pub fn render(
    bitmaps: &[DynamicImage],
    spec: &LayoutSpec,
    style: &CollageStyle,
) -> (RgbaImage, CollageGeometry) {
    let [r, g, b] = style.background;
    let mut canvas = RgbaImage::from_pixel(spec.canvas_width, spec.canvas_height, Rgba([r, g, b, 255]));

    let placements = place_cards(spec, bitmaps.len(), style);
    let mut shadow_cache: Option<((u32, u32), RgbaImage)> = None;
    let mut photos = Vec::with_capacity(bitmaps.len());

    for (placement, bitmap) in placements.into_iter().zip(bitmaps) {
        let card = placement.card.to_pixels();

        if let Some(shadow) = style.shadow {
            let size = (card.width, card.height);
            let tile = match shadow_cache.take() {
                Some((cached_size, tile)) if cached_size == size => tile,
                _ => shadow_tile(card.width, card.height, &shadow),
            };
            let spread = i64::from(shadow.spread());
            imageops::overlay(
                &mut canvas,
                &tile,
                card.x - spread,
                card.y - spread + shadow.offset_y.round() as i64,
            );
            shadow_cache = Some((size, tile));
        }

        fill_rect(&mut canvas, card, CARD_COLOR);

        let source_size = (bitmap.width(), bitmap.height());
        let drawn = fit_aspect(source_size.0, source_size.1, &placement.photo_box);
        let target = drawn.to_pixels();
        let scaled = imageops::resize(
            &bitmap.to_rgba8(),
            target.width,
            target.height,
            FilterType::Triangle,
        );
        imageops::overlay(&mut canvas, &scaled, target.x, target.y);

        photos.push(PlacedPhoto {
            placement,
            drawn,
            source_size,
        });
    }

    (
        canvas,
        CollageGeometry {
            spec: *spec,
            photos,
        },
    )
}

/// Encode the canvas as a JPEG, dropping the alpha channel.
pub fn encode_jpeg(canvas: RgbaImage, quality: u8) -> Result<EncodedImage, CompositionError> {
    let rgb = DynamicImage::ImageRgba8(canvas).into_rgb8();
    let (width, height) = rgb.dimensions();

    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality.clamp(1, 100))
        .write_image(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(CompositionError::Encode)?;

    Ok(EncodedImage::new(EncodedFormat::Jpeg, width, height, bytes))
}

/// Fill a rectangle, clipped to the canvas.
fn fill_rect(canvas: &mut RgbaImage, rect: PixelRect, color: Rgba<u8>) {
    let x0 = rect.x.clamp(0, i64::from(canvas.width())) as u32;
    let y0 = rect.y.clamp(0, i64::from(canvas.height())) as u32;
    let x1 = (rect.x + i64::from(rect.width)).clamp(0, i64::from(canvas.width())) as u32;
    let y1 = (rect.y + i64::from(rect.height)).clamp(0, i64::from(canvas.height())) as u32;

    for y in y0..y1 {
        for x in x0..x1 {
            canvas.put_pixel(x, y, color);
        }
    }
}

/// Render the blurred shadow of a `width`×`height` card.
///
/// The tile is padded by the shadow spread on every side. A Gaussian blur of
/// a rectangle is separable, so each axis is blurred as a 1D step and the two
/// profiles are multiplied.
fn shadow_tile(width: u32, height: u32, shadow: &Shadow) -> RgbaImage {
    let spread = shadow.spread();
    let kernel = gaussian_kernel(shadow.sigma(), spread);
    let columns = blurred_step(width, spread, &kernel);
    let rows = blurred_step(height, spread, &kernel);

    let alpha = f32::from(shadow.alpha);
    RgbaImage::from_fn(width + spread * 2, height + spread * 2, |x, y| {
        let coverage = columns[x as usize] * rows[y as usize];
        Rgba([0, 0, 0, (alpha * coverage).round() as u8])
    })
}

/// Normalised Gaussian weights for offsets `-radius..=radius`.
fn gaussian_kernel(sigma: f32, radius: u32) -> Vec<f32> {
    let radius = radius as i64;
    if sigma <= 0.0 {
        return vec![1.0];
    }
    let weights: Vec<f32> = (-radius..=radius)
        .map(|offset| {
            let d = offset as f32;
            (-(d * d) / (2.0 * sigma * sigma)).exp()
        })
        .collect();
    let total: f32 = weights.iter().sum();
    weights.into_iter().map(|w| w / total).collect()
}

/// Coverage of a 1D box of `length` cells (starting at `spread`) after
/// convolution with `kernel`, sampled over `length + 2 * spread` cells.
fn blurred_step(length: u32, spread: u32, kernel: &[f32]) -> Vec<f32> {
    let size = (length + spread * 2) as i64;
    let start = i64::from(spread);
    let end = start + i64::from(length);
    let radius = (kernel.len() as i64 - 1) / 2;

    (0..size)
        .map(|i| {
            kernel
                .iter()
                .enumerate()
                .filter(|(k, _)| {
                    let j = i + *k as i64 - radius;
                    j >= start && j < end
                })
                .map(|(_, w)| *w)
                .sum()
        })
        .collect()
}
