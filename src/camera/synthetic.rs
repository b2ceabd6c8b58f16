//! Test-pattern camera.
//!
//! Produces a moving colour gradient instead of real video. Useful for demos
//! on machines without a webcam and for exercising the capture flow in tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::backend::{CameraBackend, VideoStream};
use super::frame_utils::mirror_horizontal;
use super::types::{CameraError, CameraSettings, Frame, FrameFormat, Resolution};

/// A camera backend that synthesises frames.
///
/// Clones share their stream counters, so a test can keep a clone and watch
/// streams being opened and stopped after handing the original away.
#[derive(Debug, Clone, Default)]
pub struct SyntheticCamera {
    resolution: Option<Resolution>,
    warmup: Duration,
    deny: bool,
    live: Arc<AtomicUsize>,
    opened: Arc<AtomicUsize>,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self::default()
    }

    /// A camera whose access is always refused, like a denied permission prompt.
    pub fn denying() -> Self {
        Self {
            deny: true,
            ..Self::default()
        }
    }

    /// Override the requested resolution.
    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    /// Delay before the first frame becomes available.
    pub fn with_warmup(mut self, warmup: Duration) -> Self {
        self.warmup = warmup;
        self
    }

    /// Streams opened and not yet stopped.
    pub fn live_streams(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Streams opened over the camera's lifetime.
    pub fn total_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl CameraBackend for SyntheticCamera {
    type Stream = SyntheticStream;

    fn open(&mut self, settings: &CameraSettings) -> Result<SyntheticStream, CameraError> {
        if self.deny {
            return Err(CameraError::PermissionDenied);
        }

        let resolution = self.resolution.unwrap_or(settings.resolution);
        if resolution.width == 0 || resolution.height == 0 {
            return Err(CameraError::OpenFailed(format!(
                "invalid resolution {}",
                resolution
            )));
        }

        self.live.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);

        Ok(SyntheticStream {
            resolution,
            mirror: settings.mirror,
            ready_at: Instant::now() + self.warmup,
            frame_index: 0,
            stopped: false,
            live: Arc::clone(&self.live),
        })
    }
}

/// Stream produced by [`SyntheticCamera`].
#[derive(Debug)]
pub struct SyntheticStream {
    resolution: Resolution,
    mirror: bool,
    ready_at: Instant,
    frame_index: u32,
    stopped: bool,
    live: Arc<AtomicUsize>,
}

impl SyntheticStream {
    fn render(&self) -> Frame {
        let Resolution { width, height } = self.resolution;
        let shift = (self.frame_index.wrapping_mul(37) % 256) as u8;
        let mut data = Vec::with_capacity(width as usize * height as usize * 3);

        for y in 0..height {
            let g = (y * 255 / height.max(1)) as u8;
            for x in 0..width {
                let r = ((x * 255 / width.max(1)) as u8).wrapping_add(shift);
                data.extend_from_slice(&[r, g, shift]);
            }
        }

        let mut frame = Frame {
            data,
            width,
            height,
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        };
        if self.mirror {
            mirror_horizontal(&mut frame);
        }
        frame
    }
}

impl VideoStream for SyntheticStream {
    fn dimensions(&self) -> Option<Resolution> {
        if self.stopped || Instant::now() < self.ready_at {
            None
        } else {
            Some(self.resolution)
        }
    }

    fn latest_frame(&mut self) -> Option<Frame> {
        self.dimensions()?;
        let frame = self.render();
        self.frame_index = self.frame_index.wrapping_add(1);
        Some(frame)
    }

    fn stop(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.live.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for SyntheticStream {
    fn drop(&mut self) {
        self.stop();
    }
}
