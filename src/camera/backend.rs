//! Abstractions over camera sources.
//!
//! A [`CameraBackend`] opens streams; a [`VideoStream`] delivers frames until
//! it is stopped. Production code uses the nokhwa backend, tests and demos use
//! [`SyntheticCamera`](super::SyntheticCamera).

use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Something that can open a live video stream.
pub trait CameraBackend {
    /// The stream type returned by `open`.
    type Stream: VideoStream;

    /// Request a stream matching `settings` as closely as possible.
    fn open(&mut self, settings: &CameraSettings) -> Result<Self::Stream, CameraError>;
}

/// A live video stream.
pub trait VideoStream {
    /// Native frame size, or `None` until the first frame has arrived.
    fn dimensions(&self) -> Option<Resolution>;

    /// The most recent frame, if any.
    fn latest_frame(&mut self) -> Option<Frame>;

    /// Stop every track of the stream. Calling it again is a no-op.
    fn stop(&mut self);
}

/// Backend used when the build has no camera support.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableBackend;

/// Stream type of [`UnavailableBackend`]; it can never be constructed.
#[derive(Debug)]
pub enum NoStream {}

impl VideoStream for NoStream {
    fn dimensions(&self) -> Option<Resolution> {
        match *self {}
    }

    fn latest_frame(&mut self) -> Option<Frame> {
        match *self {}
    }

    fn stop(&mut self) {
        match *self {}
    }
}

impl CameraBackend for UnavailableBackend {
    type Stream = NoStream;

    fn open(&mut self, _settings: &CameraSettings) -> Result<NoStream, CameraError> {
        Err(CameraError::Unsupported)
    }
}
