//! Encoded image buffers passed between the grabber, the session and the compositor.

use image::{DynamicImage, ImageFormat, ImageReader, ImageResult};
use std::fmt;
use std::io::Cursor;
use std::sync::Arc;

/// Container format of an [`EncodedImage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodedFormat {
    /// Lossless, used for individual captures
    Png,
    /// Lossy, used for the finished collage
    Jpeg,
}

impl EncodedFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            EncodedFormat::Png => "image/png",
            EncodedFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            EncodedFormat::Png => "png",
            EncodedFormat::Jpeg => "jpg",
        }
    }
}

impl From<EncodedFormat> for ImageFormat {
    fn from(format: EncodedFormat) -> Self {
        match format {
            EncodedFormat::Png => ImageFormat::Png,
            EncodedFormat::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// An encoded still image.
///
/// The byte buffer is shared, so clones are cheap and can be moved onto
/// blocking decode tasks.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedImage {
    format: EncodedFormat,
    width: u32,
    height: u32,
    bytes: Arc<[u8]>,
}

impl EncodedImage {
    pub fn new(format: EncodedFormat, width: u32, height: u32, bytes: Vec<u8>) -> Self {
        Self {
            format,
            width,
            height,
            bytes: bytes.into(),
        }
    }

    /// Wrap bytes of unknown origin (e.g. a file on disk), sniffing the
    /// format and reading the dimensions from the header.
    pub fn from_bytes(bytes: Vec<u8>) -> ImageResult<Self> {
        let format = match image::guess_format(&bytes)? {
            ImageFormat::Jpeg => EncodedFormat::Jpeg,
            _ => EncodedFormat::Png,
        };
        let (width, height) = ImageReader::new(Cursor::new(&bytes))
            .with_guessed_format()?
            .into_dimensions()?;
        Ok(Self::new(format, width, height, bytes))
    }

    pub fn format(&self) -> EncodedFormat {
        self.format
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Decode into an in-memory bitmap.
    pub fn decode(&self) -> ImageResult<DynamicImage> {
        image::load_from_memory_with_format(&self.bytes, self.format.into())
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("len", &self.bytes.len())
            .finish()
    }
}
