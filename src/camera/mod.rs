//! Camera access for the photobooth.
//!
//! - Backends implement [`CameraBackend`] and hand out [`VideoStream`]s
//! - [`DeviceManager`] owns the single active stream and releases it
//! - [`SyntheticCamera`] is a test-pattern source; the nokhwa webcam backend
//!   is available with the `webcam` feature

mod backend;
#[cfg(feature = "webcam")]
mod capture;
#[cfg(feature = "webcam")]
mod capture_loop;
mod device;
mod frame_utils;
mod manager;
mod synthetic;
mod types;

pub use backend::{CameraBackend, NoStream, UnavailableBackend, VideoStream};
#[cfg(feature = "webcam")]
pub use capture::{CameraCapture, NokhwaBackend};
pub use device::list_devices;
pub use frame_utils::mirror_horizontal;
pub use manager::{DeviceHandle, DeviceManager};
pub use synthetic::{SyntheticCamera, SyntheticStream};
pub use types::{CameraError, CameraInfo, CameraSettings, Facing, Frame, FrameFormat, Resolution};

/// The webcam backend of this build.
#[cfg(feature = "webcam")]
pub type PlatformBackend = NokhwaBackend;

/// The webcam backend of this build.
#[cfg(not(feature = "webcam"))]
pub type PlatformBackend = UnavailableBackend;
