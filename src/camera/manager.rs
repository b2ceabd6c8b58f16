//! Ownership of the single active camera stream.

use std::time::Instant;

use super::backend::{CameraBackend, VideoStream};
use super::types::{CameraError, CameraSettings, Resolution};

/// An acquired stream.
///
/// Dropping the handle releases the stream; [`DeviceHandle::release`] may be
/// called any number of times.
pub struct DeviceHandle<S: VideoStream> {
    stream: S,
    released: bool,
    acquired_at: Instant,
}

impl<S: VideoStream> DeviceHandle<S> {
    fn new(stream: S) -> Self {
        Self {
            stream,
            released: false,
            acquired_at: Instant::now(),
        }
    }

    /// Ready once the stream reports its native dimensions.
    pub fn is_ready(&self) -> bool {
        self.dimensions().is_some()
    }

    pub fn dimensions(&self) -> Option<Resolution> {
        if self.released {
            return None;
        }
        self.stream.dimensions()
    }

    /// The live stream, or `None` after release.
    pub fn stream_mut(&mut self) -> Option<&mut S> {
        if self.released {
            None
        } else {
            Some(&mut self.stream)
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn acquired_at(&self) -> Instant {
        self.acquired_at
    }

    /// Stop all tracks of the stream.
    pub fn release(&mut self) {
        if !self.released {
            self.stream.stop();
            self.released = true;
        }
    }
}

impl<S: VideoStream> Drop for DeviceHandle<S> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<S: VideoStream> std::fmt::Debug for DeviceHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceHandle")
            .field("released", &self.released)
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}

/// Acquires and releases the camera, holding at most one stream at a time.
pub struct DeviceManager<B: CameraBackend> {
    backend: B,
    settings: CameraSettings,
    handle: Option<DeviceHandle<B::Stream>>,
}

impl<B: CameraBackend> DeviceManager<B> {
    pub fn new(backend: B, settings: CameraSettings) -> Self {
        Self {
            backend,
            settings,
            handle: None,
        }
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Open the camera unless a stream is already held.
    ///
    /// Failures are returned as-is; the caller decides how to surface them
    /// and must not retry automatically.
    pub fn acquire(&mut self) -> Result<(), CameraError> {
        if self.handle.is_some() {
            log::debug!("Camera already acquired, reusing the active stream");
            return Ok(());
        }

        match self.backend.open(&self.settings) {
            Ok(stream) => {
                log::info!(
                    "Camera {} acquired (requested {} @ {} fps)",
                    self.settings.device_index,
                    self.settings.resolution,
                    self.settings.fps
                );
                self.handle = Some(DeviceHandle::new(stream));
                Ok(())
            }
            Err(e) => {
                log::warn!("Camera acquisition failed: {}", e);
                Err(e)
            }
        }
    }

    /// Release the held stream, if any.
    pub fn release(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            handle.release();
            log::info!(
                "Camera released after {:?}",
                handle.acquired_at().elapsed()
            );
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn is_ready(&self) -> bool {
        self.handle.as_ref().is_some_and(DeviceHandle::is_ready)
    }

    pub fn handle_mut(&mut self) -> Option<&mut DeviceHandle<B::Stream>> {
        self.handle.as_mut()
    }
}

impl<B: CameraBackend> Drop for DeviceManager<B> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<B: CameraBackend> std::fmt::Debug for DeviceManager<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeviceManager")
            .field("settings", &self.settings)
            .field("active", &self.is_active())
            .field("ready", &self.is_ready())
            .finish_non_exhaustive()
    }
}
