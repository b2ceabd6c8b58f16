//! Pure geometry for the polaroid collage: card placement, photo insets and
//! aspect-preserving fits.

use crate::layout::LayoutSpec;

/// Canvas background, a baby pink.
pub const DEFAULT_BACKGROUND: [u8; 3] = [0xFA, 0xD2, 0xE1];

/// Padding around and between cards, as a fraction of the canvas width.
pub const PADDING_RATIO: f64 = 0.03;

/// Photo inset on the sides and top of a card, as a fraction of the card width.
pub const PHOTO_INSET_RATIO: f64 = 0.05;

/// Caption strip below the photo, as a fraction of the card height.
pub const CAPTION_RATIO: f64 = 0.20;

/// Default JPEG quality of the finished collage.
pub const DEFAULT_JPEG_QUALITY: u8 = 90;

/// Axis-aligned rectangle in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.width / self.height
    }

    /// Whether `other` lies entirely inside this rectangle (with a small
    /// tolerance for float error).
    pub fn contains(&self, other: &Rect) -> bool {
        const EPS: f64 = 1e-6;
        other.x >= self.x - EPS
            && other.y >= self.y - EPS
            && other.right() <= self.right() + EPS
            && other.bottom() <= self.bottom() + EPS
    }

    /// Snap to whole pixels by rounding each edge.
    pub fn to_pixels(&self) -> PixelRect {
        let x0 = self.x.round() as i64;
        let y0 = self.y.round() as i64;
        let x1 = self.right().round() as i64;
        let y1 = self.bottom().round() as i64;
        PixelRect {
            x: x0,
            y: y0,
            width: (x1 - x0).max(1) as u32,
            height: (y1 - y0).max(1) as u32,
        }
    }
}

/// A rectangle snapped to the pixel grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Drop shadow under each card.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Shadow {
    /// Shadow opacity (0.15 of black)
    pub alpha: u8,
    /// Blur radius in pixels; the Gaussian sigma is half of this
    pub blur: f32,
    /// Downward offset in pixels
    pub offset_y: f64,
}

impl Default for Shadow {
    fn default() -> Self {
        Self {
            alpha: 38,
            blur: 25.0,
            offset_y: 8.0,
        }
    }
}

impl Shadow {
    pub fn sigma(&self) -> f32 {
        self.blur / 2.0
    }

    /// How far the blurred shadow can bleed past the card edge.
    pub fn spread(&self) -> u32 {
        (self.sigma() * 3.0).ceil() as u32
    }
}

/// Visual parameters of a collage.
#[derive(Debug, Clone, PartialEq)]
pub struct CollageStyle {
    pub background: [u8; 3],
    pub padding_ratio: f64,
    pub photo_inset_ratio: f64,
    pub caption_ratio: f64,
    pub shadow: Option<Shadow>,
    pub jpeg_quality: u8,
}

impl Default for CollageStyle {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND,
            padding_ratio: PADDING_RATIO,
            photo_inset_ratio: PHOTO_INSET_RATIO,
            caption_ratio: CAPTION_RATIO,
            shadow: Some(Shadow::default()),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

/// Where one capture lands on the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardPlacement {
    pub index: usize,
    pub row: u32,
    pub column: u32,
    /// The white polaroid card
    pub card: Rect,
    /// The region inside the card reserved for the photo
    pub photo_box: Rect,
}

/// Size of one card for a layout.
pub fn card_size(spec: &LayoutSpec, style: &CollageStyle) -> (f64, f64) {
    let padding = padding(spec, style);
    let width = (f64::from(spec.canvas_width) - padding * f64::from(spec.columns + 1))
        / f64::from(spec.columns);
    let height = (f64::from(spec.canvas_height) - padding * f64::from(spec.rows + 1))
        / f64::from(spec.rows);
    (width, height)
}

/// Padding between cards and around the canvas edge.
pub fn padding(spec: &LayoutSpec, style: &CollageStyle) -> f64 {
    f64::from(spec.canvas_width) * style.padding_ratio
}

/// Place `count` cards in row-major order: the top row fills left to right,
/// then wraps.
pub fn place_cards(spec: &LayoutSpec, count: usize, style: &CollageStyle) -> Vec<CardPlacement> {
    let padding = padding(spec, style);
    let (card_width, card_height) = card_size(spec, style);
    let columns = spec.columns.max(1) as usize;

    (0..count)
        .map(|index| {
            let row = (index / columns) as u32;
            let column = (index % columns) as u32;
            let card = Rect::new(
                padding + f64::from(column) * (card_width + padding),
                padding + f64::from(row) * (card_height + padding),
                card_width,
                card_height,
            );
            CardPlacement {
                index,
                row,
                column,
                card,
                photo_box: photo_box(&card, style),
            }
        })
        .collect()
}

/// Region of a card the photo is fitted into.
pub fn photo_box(card: &Rect, style: &CollageStyle) -> Rect {
    let inset = card.width * style.photo_inset_ratio;
    let caption = card.height * style.caption_ratio;
    Rect::new(
        card.x + inset,
        card.y + inset,
        card.width - inset * 2.0,
        card.height - (inset + caption),
    )
}

/// Fit a `src_width`×`src_height` image into `bounds` without cropping or
/// distortion, centred along the axis with slack.
pub fn fit_aspect(src_width: u32, src_height: u32, bounds: &Rect) -> Rect {
    if src_width == 0 || src_height == 0 {
        return *bounds;
    }
    let image_ratio = f64::from(src_width) / f64::from(src_height);

    if image_ratio > bounds.aspect_ratio() {
        // wider than the box: full width, letterboxed
        let height = bounds.width / image_ratio;
        Rect::new(
            bounds.x,
            bounds.y + (bounds.height - height) / 2.0,
            bounds.width,
            height,
        )
    } else {
        // taller (or equal): full height, pillarboxed
        let width = bounds.height * image_ratio;
        Rect::new(
            bounds.x + (bounds.width - width) / 2.0,
            bounds.y,
            width,
            bounds.height,
        )
    }
}
