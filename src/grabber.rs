//! Still capture from a live stream.

use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder, ImageError, RgbImage};

use crate::camera::{DeviceHandle, Frame, VideoStream};
use crate::encoded::{EncodedFormat, EncodedImage};

/// Reasons a grab produced nothing.
///
/// None of these are shown to the user; the caller logs them and skips the
/// capture.
#[derive(Debug, thiserror::Error)]
pub enum GrabError {
    #[error("camera is not ready")]
    NotReady,
    #[error("no frame available from the camera")]
    NoFrame,
    #[error("frame buffer of {len} bytes does not match {width}x{height} RGB")]
    BufferMismatch { width: u32, height: u32, len: usize },
    #[error("failed to encode frame: {0}")]
    Encode(#[source] ImageError),
}

/// Snapshot the current frame of a ready stream as a PNG.
///
/// The image has the frame's native size, not any display size.
pub fn grab<S: VideoStream>(handle: &mut DeviceHandle<S>) -> Result<EncodedImage, GrabError> {
    if !handle.is_ready() {
        return Err(GrabError::NotReady);
    }
    let frame = handle
        .stream_mut()
        .and_then(|stream| stream.latest_frame())
        .ok_or(GrabError::NoFrame)?;
    encode_frame(frame)
}

/// Losslessly encode a raw RGB frame.
pub fn encode_frame(frame: Frame) -> Result<EncodedImage, GrabError> {
    let (width, height) = (frame.width, frame.height);
    let len = frame.data.len();
    let raster = RgbImage::from_raw(width, height, frame.data)
        .ok_or(GrabError::BufferMismatch { width, height, len })?;

    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes)
        .write_image(raster.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(GrabError::Encode)?;

    Ok(EncodedImage::new(EncodedFormat::Png, width, height, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{CameraSettings, DeviceManager, FrameFormat, Resolution, SyntheticCamera};
    use std::time::{Duration, Instant};

    #[test]
    fn test_encode_frame_keeps_native_size() {
        let frame = Frame {
            data: vec![200; 5 * 3 * 3],
            width: 5,
            height: 3,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        };
        let image = encode_frame(frame).unwrap();
        assert_eq!(image.format(), EncodedFormat::Png);
        assert_eq!((image.width(), image.height()), (5, 3));

        let decoded = image.decode().unwrap().to_rgb8();
        assert_eq!(decoded.get_pixel(4, 2).0, [200, 200, 200]);
    }

    #[test]
    fn test_encode_frame_rejects_short_buffer() {
        let frame = Frame {
            data: vec![0; 10],
            width: 5,
            height: 3,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        };
        assert!(matches!(
            encode_frame(frame),
            Err(GrabError::BufferMismatch { len: 10, .. })
        ));
    }

    #[test]
    fn test_grab_from_synthetic_camera() {
        let resolution = Resolution {
            width: 64,
            height: 48,
        };
        let camera = SyntheticCamera::new().with_resolution(resolution);
        let mut manager = DeviceManager::new(camera, CameraSettings::default());
        manager.acquire().unwrap();

        let image = grab(manager.handle_mut().unwrap()).unwrap();
        assert_eq!((image.width(), image.height()), (64, 48));
    }

    #[test]
    fn test_grab_before_ready_fails() {
        let camera = SyntheticCamera::new().with_warmup(Duration::from_secs(60));
        let mut manager = DeviceManager::new(camera, CameraSettings::default());
        manager.acquire().unwrap();
        assert!(matches!(
            grab(manager.handle_mut().unwrap()),
            Err(GrabError::NotReady)
        ));
    }

    #[test]
    fn test_grab_after_release_fails() {
        let camera = SyntheticCamera::new();
        let mut manager = DeviceManager::new(camera, CameraSettings::default());
        manager.acquire().unwrap();
        let handle = manager.handle_mut().unwrap();
        handle.release();
        assert!(matches!(grab(handle), Err(GrabError::NotReady)));
    }
}
