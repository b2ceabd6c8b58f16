//! Frame conversion and transformation utilities.

use super::types::Frame;

/// Convert a nokhwa buffer to an RGB [`Frame`].
///
/// Handles the camera's native format (MJPEG, YUYV, NV12, ...) through
/// nokhwa's `decode_image`. Returns `None` for unsupported or corrupt data.
#[cfg(feature = "webcam")]
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    use nokhwa::pixel_format::RgbFormat;

    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        format: super::types::FrameFormat::Rgb,
        timestamp: std::time::Instant::now(),
    })
}

/// Mirror a frame horizontally (flip left-right) for selfie mode.
pub fn mirror_horizontal(frame: &mut Frame) {
    let width = frame.width as usize;
    let bpp = frame.bytes_per_pixel();
    let row_len = width * bpp;
    if row_len == 0 {
        return;
    }

    for row in frame.data.chunks_exact_mut(row_len) {
        for x in 0..width / 2 {
            let left = x * bpp;
            let right = (width - 1 - x) * bpp;
            for i in 0..bpp {
                row.swap(left + i, right + i);
            }
        }
    }
}
