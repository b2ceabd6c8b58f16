//! Crate-level error type for the photobooth flow.

use crate::camera::CameraError;
use crate::collage::CompositionError;
use crate::export::ExportError;
use crate::flow::Step;

/// Errors surfaced by [`PhotoBooth`](crate::flow::PhotoBooth).
#[derive(Debug, thiserror::Error)]
pub enum BoothError {
    /// Camera permission denied or no camera capability. The session has
    /// already been reset to the welcome step.
    #[error("camera unavailable: {0}")]
    DeviceUnavailable(#[source] CameraError),
    /// A capture could not be decoded or the collage could not be encoded.
    #[error("collage composition failed: {0}")]
    CompositionFailed(#[from] CompositionError),
    /// The action is not valid on the current step; nothing changed.
    #[error("cannot {action} on the {step} step")]
    InvalidStep { action: &'static str, step: Step },
    #[error(transparent)]
    Export(#[from] ExportError),
}

impl BoothError {
    /// Whether the user should be told about this error. Everything else is
    /// log-only.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, BoothError::DeviceUnavailable(_))
    }
}
