//! Polaroid collage rendering.
//!
//! - Layout geometry via [`place_cards`] and [`fit_aspect`]
//! - Compositing via [`compose`]
//! - Styling via [`CollageStyle`]

mod compositor;
mod geometry;

pub use compositor::{
    compose, decode_all, encode_jpeg, render, Collage, CollageGeometry, CompositionError,
    PlacedPhoto,
};
pub use geometry::{
    card_size, fit_aspect, padding, photo_box, place_cards, CardPlacement, CollageStyle,
    PixelRect, Rect, Shadow, CAPTION_RATIO, DEFAULT_BACKGROUND, DEFAULT_JPEG_QUALITY,
    PADDING_RATIO, PHOTO_INSET_RATIO,
};
