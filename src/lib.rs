//! photobooth library crate.
//!
//! A webcam photobooth: a four-step session (welcome, selection, capture,
//! collage) that takes 2-4 photos and composes them into a polaroid-style
//! JPEG collage.
//!
//! - [`flow::PhotoBooth`] drives a session against a [`camera::CameraBackend`]
//! - [`collage::compose`] renders captures into a collage
//! - [`layout::resolve`] maps a count and layout to canvas geometry

pub mod camera;
pub mod collage;
pub mod config;
pub mod encoded;
pub mod error;
pub mod export;
pub mod flow;
pub mod grabber;
pub mod layout;

pub use encoded::{EncodedFormat, EncodedImage};
pub use error::BoothError;
pub use flow::{PhotoBooth, Session, Step};
pub use layout::{Layout, LayoutSpec, PhotoCount};
