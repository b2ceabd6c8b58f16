//! Session state machine and the controller that drives the camera and the
//! compositor.
//!
//! The flow is strictly forward: welcome → selection → capture → collage,
//! with "start over" returning to welcome from anywhere. [`Session`] holds
//! the state and a pure transition function ([`Session::apply`]) that
//! returns [`Effect`]s; [`PhotoBooth`] executes those effects.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::camera::{CameraBackend, CameraSettings, DeviceManager};
use crate::collage::{self, Collage, CollageStyle, CompositionError};
use crate::encoded::EncodedImage;
use crate::error::BoothError;
use crate::export::{self, ExportError};
use crate::grabber::grab;
use crate::layout::{normalize, resolve, Layout, LayoutSpec, PhotoCount};

/// The four screens of the booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    Welcome,
    Selection,
    Capture,
    Collage,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Welcome => "welcome",
            Step::Selection => "selection",
            Step::Capture => "capture",
            Step::Collage => "collage",
        };
        f.write_str(name)
    }
}

/// State of the collage for a completed capture set.
#[derive(Debug, Clone)]
pub enum Composition {
    Pending,
    Ready(Collage),
    Failed(String),
}

/// Per-step session data.
#[derive(Debug, Clone)]
enum Stage {
    Welcome,
    Selection,
    Capture {
        captures: Vec<EncodedImage>,
    },
    Collage {
        captures: Vec<EncodedImage>,
        composition: Composition,
    },
}

/// User actions and events fed into the session.
#[derive(Debug, Clone)]
pub enum Action {
    /// Leave the welcome screen
    Begin,
    /// Dismiss the selection dialog
    Cancel,
    SelectCount(PhotoCount),
    SelectLayout(Layout),
    /// Confirm count and layout, start the camera
    Confirm,
    /// A frame was grabbed
    Captured(EncodedImage),
    /// The camera could not be acquired
    DeviceFailed,
    StartOver,
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::Begin => "begin",
            Action::Cancel => "cancel",
            Action::SelectCount(_) => "select a count",
            Action::SelectLayout(_) => "select a layout",
            Action::Confirm => "confirm",
            Action::Captured(_) => "capture",
            Action::DeviceFailed => "report a camera failure",
            Action::StartOver => "start over",
        }
    }
}

/// Work the session asks its host to perform.
#[derive(Debug, Clone)]
pub enum Effect {
    AcquireDevice,
    ReleaseDevice,
    Compose(CompositionJob),
    Notify(Notice),
}

/// A composition request tied to the capture set that produced it.
#[derive(Debug, Clone)]
pub struct CompositionJob {
    pub generation: u64,
    pub captures: Vec<EncodedImage>,
    pub spec: LayoutSpec,
}

/// A user-visible, non-blocking message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: String,
    /// Rendered as an error rather than information
    pub destructive: bool,
}

impl Notice {
    pub fn webcam_error() -> Self {
        Self {
            title: "Oh no! Webcam Error".to_string(),
            description: "Couldn't access your camera. Please check permissions and try again."
                .to_string(),
            destructive: true,
        }
    }
}

/// In-memory state of one photobooth interaction.
#[derive(Debug, Clone)]
pub struct Session {
    count: PhotoCount,
    layout: Layout,
    stage: Stage,
    generation: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            count: PhotoCount::default(),
            layout: Layout::default(),
            stage: Stage::Welcome,
            generation: 0,
        }
    }
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        match self.stage {
            Stage::Welcome => Step::Welcome,
            Stage::Selection => Step::Selection,
            Stage::Capture { .. } => Step::Capture,
            Stage::Collage { .. } => Step::Collage,
        }
    }

    pub fn count(&self) -> PhotoCount {
        self.count
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    /// Bumped whenever a new capture set starts or the session resets.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Collage geometry for the current selection.
    pub fn spec(&self) -> LayoutSpec {
        resolve(self.count, self.layout)
    }

    /// Captures so far, oldest first.
    pub fn captures(&self) -> &[EncodedImage] {
        match &self.stage {
            Stage::Capture { captures } | Stage::Collage { captures, .. } => captures,
            _ => &[],
        }
    }

    pub fn composition(&self) -> Option<&Composition> {
        match &self.stage {
            Stage::Collage { composition, .. } => Some(composition),
            _ => None,
        }
    }

    pub fn collage(&self) -> Option<&Collage> {
        match self.composition() {
            Some(Composition::Ready(collage)) => Some(collage),
            _ => None,
        }
    }

    /// The finished collage image, once composed.
    pub fn result(&self) -> Option<&EncodedImage> {
        self.collage().map(|c| &c.image)
    }

    /// The pending composition, if the collage step is still waiting for one.
    pub fn composition_job(&self) -> Option<CompositionJob> {
        match &self.stage {
            Stage::Collage {
                captures,
                composition: Composition::Pending,
            } => Some(CompositionJob {
                generation: self.generation,
                captures: captures.clone(),
                spec: self.spec(),
            }),
            _ => None,
        }
    }

    /// Apply an action and return the effects it requires.
    ///
    /// Actions that make no sense on the current step are rejected and leave
    /// the session untouched.
    pub fn apply(&mut self, action: Action) -> Result<Vec<Effect>, BoothError> {
        let from = self.step();

        let effects = match action {
            Action::StartOver => {
                self.reset();
                vec![Effect::ReleaseDevice]
            }
            Action::Begin if from == Step::Welcome => {
                self.stage = Stage::Selection;
                Vec::new()
            }
            Action::Cancel if from == Step::Selection => {
                self.stage = Stage::Welcome;
                Vec::new()
            }
            Action::SelectCount(count) if from == Step::Selection => {
                self.count = count;
                Vec::new()
            }
            Action::SelectLayout(layout) if from == Step::Selection => {
                self.layout = layout;
                Vec::new()
            }
            Action::Confirm if from == Step::Selection => {
                // only layouts offered for the count reach the compositor
                self.layout = normalize(self.count, self.layout);
                self.generation += 1;
                self.stage = Stage::Capture {
                    captures: Vec::with_capacity(self.count.get()),
                };
                vec![Effect::AcquireDevice]
            }
            Action::Captured(image) if from == Step::Capture => self.push_capture(image),
            Action::DeviceFailed if from == Step::Capture => {
                self.reset();
                vec![Effect::ReleaseDevice, Effect::Notify(Notice::webcam_error())]
            }
            action => {
                log::warn!("Ignoring '{}' on the {} step", action.name(), from);
                return Err(BoothError::InvalidStep {
                    action: action.name(),
                    step: from,
                });
            }
        };

        let to = self.step();
        if from != to {
            log::info!("Step {} -> {}", from, to);
        }
        Ok(effects)
    }

    fn push_capture(&mut self, image: EncodedImage) -> Vec<Effect> {
        let Stage::Capture { captures } = &mut self.stage else {
            return Vec::new();
        };
        captures.push(image);
        if captures.len() < self.count.get() {
            return Vec::new();
        }

        let captures = std::mem::take(captures);
        let job = CompositionJob {
            generation: self.generation,
            captures: captures.clone(),
            spec: resolve(self.count, self.layout),
        };
        self.stage = Stage::Collage {
            captures,
            composition: Composition::Pending,
        };
        vec![Effect::ReleaseDevice, Effect::Compose(job)]
    }

    /// Store the outcome of a composition job.
    ///
    /// Returns `false` and drops the outcome when the job belongs to an older
    /// capture set or the collage was already settled.
    pub fn commit(&mut self, generation: u64, outcome: Result<Collage, String>) -> bool {
        if generation != self.generation {
            log::warn!(
                "Discarding stale composition (generation {}, current {})",
                generation,
                self.generation
            );
            return false;
        }
        match &mut self.stage {
            Stage::Collage { composition, .. } if matches!(*composition, Composition::Pending) => {
                *composition = match outcome {
                    Ok(collage) => Composition::Ready(collage),
                    Err(message) => Composition::Failed(message),
                };
                true
            }
            _ => {
                log::warn!("Discarding composition result: nothing pending");
                false
            }
        }
    }

    fn reset(&mut self) {
        self.count = PhotoCount::default();
        self.layout = Layout::default();
        self.stage = Stage::Welcome;
        self.generation += 1;
    }
}

/// What a capture attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The camera has not reported its dimensions yet
    NotReady,
    /// The grab failed internally and nothing was appended
    Skipped,
    /// A photo was added
    Captured { taken: usize, total: usize },
    /// The last photo was added; the session moved to the collage step
    Complete,
}

/// The photobooth controller.
///
/// Owns the session, the camera and the collage style, and turns user
/// actions into camera and compositor work.
pub struct PhotoBooth<B: CameraBackend> {
    session: Session,
    device: DeviceManager<B>,
    style: CollageStyle,
    pending: Option<CompositionJob>,
    notices: Vec<Notice>,
}

impl<B: CameraBackend> PhotoBooth<B> {
    pub fn new(backend: B, settings: CameraSettings, style: CollageStyle) -> Self {
        Self {
            session: Session::new(),
            device: DeviceManager::new(backend, settings),
            style,
            pending: None,
            notices: Vec::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step()
    }

    pub fn style(&self) -> &CollageStyle {
        &self.style
    }

    pub fn device(&self) -> &DeviceManager<B> {
        &self.device
    }

    /// Drain the user-visible notices raised since the last call.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    /// Apply an action and carry out its effects.
    pub fn dispatch(&mut self, action: Action) -> Result<(), BoothError> {
        let effects = self.session.apply(action)?;
        self.run_effects(effects)
    }

    pub fn begin(&mut self) -> Result<(), BoothError> {
        self.dispatch(Action::Begin)
    }

    pub fn cancel(&mut self) -> Result<(), BoothError> {
        self.dispatch(Action::Cancel)
    }

    pub fn select(&mut self, count: PhotoCount, layout: Layout) -> Result<(), BoothError> {
        self.dispatch(Action::SelectCount(count))?;
        self.dispatch(Action::SelectLayout(layout))
    }

    /// Confirm the selection and acquire the camera.
    ///
    /// On [`BoothError::DeviceUnavailable`] the session is already back on
    /// the welcome step and a notice is queued; do not retry automatically.
    pub fn confirm(&mut self) -> Result<(), BoothError> {
        self.dispatch(Action::Confirm)
    }

    /// Reset everything and release the camera.
    pub fn start_over(&mut self) {
        // start over is valid from every step
        if let Err(e) = self.dispatch(Action::StartOver) {
            log::error!("Start over failed: {}", e);
        }
        self.pending = None;
    }

    pub fn is_camera_ready(&self) -> bool {
        self.device.is_ready()
    }

    /// Poll the camera until it reports its dimensions or `timeout` passes.
    pub async fn wait_until_ready(&self, timeout: Duration) -> bool {
        let mut poll = tokio::time::interval(Duration::from_millis(20));
        poll.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            if self.device.is_ready() {
                return true;
            }
            if !self.device.is_active() || tokio::time::Instant::now() >= deadline {
                return false;
            }
            poll.tick().await;
        }
    }

    /// Grab a photo from the live camera.
    pub fn capture(&mut self) -> Result<CaptureOutcome, BoothError> {
        if self.step() != Step::Capture {
            return Err(BoothError::InvalidStep {
                action: "capture",
                step: self.step(),
            });
        }

        let Some(handle) = self.device.handle_mut() else {
            return Ok(CaptureOutcome::NotReady);
        };
        if !handle.is_ready() {
            return Ok(CaptureOutcome::NotReady);
        }

        let image = match grab(handle) {
            Ok(image) => image,
            Err(e) => {
                log::error!("Frame grab failed, nothing captured: {}", e);
                return Ok(CaptureOutcome::Skipped);
            }
        };

        self.dispatch(Action::Captured(image))?;

        if self.step() == Step::Collage {
            Ok(CaptureOutcome::Complete)
        } else {
            Ok(CaptureOutcome::Captured {
                taken: self.session.captures().len(),
                total: self.session.count().get(),
            })
        }
    }

    /// Hand out the pending composition so a host can run it elsewhere.
    ///
    /// Feed the outcome back through [`PhotoBooth::commit`].
    pub fn take_composition_job(&mut self) -> Option<CompositionJob> {
        self.pending.take()
    }

    /// Commit an externally run composition; stale results are dropped.
    pub fn commit(&mut self, generation: u64, outcome: Result<Collage, CompositionError>) -> bool {
        let outcome = outcome.map_err(|e| {
            log::error!("Collage composition failed: {}", e);
            e.to_string()
        });
        self.session.commit(generation, outcome)
    }

    /// Compose the collage for the completed capture set.
    ///
    /// Runs at most once per capture set: later calls return the stored
    /// collage. A job handed out by [`PhotoBooth::take_composition_job`] and
    /// never committed is rebuilt from the session and run here. Returns
    /// `Ok(None)` only when this capture set already failed to compose.
    pub async fn compose(&mut self) -> Result<Option<&Collage>, BoothError> {
        if self.step() != Step::Collage {
            return Err(BoothError::InvalidStep {
                action: "compose",
                step: self.step(),
            });
        }

        let job = self
            .pending
            .take()
            .or_else(|| self.session.composition_job());
        if let Some(job) = job {
            let outcome = collage::compose(&job.captures, job.spec, &self.style).await;
            match outcome {
                Ok(collage) => {
                    self.session.commit(job.generation, Ok(collage));
                }
                Err(e) => {
                    log::error!("Collage composition failed: {}", e);
                    self.session.commit(job.generation, Err(e.to_string()));
                    return Err(BoothError::CompositionFailed(e));
                }
            }
        }

        Ok(self.session.collage())
    }

    /// Save the finished collage into `dir`.
    pub fn save(&self, dir: &Path) -> Result<PathBuf, BoothError> {
        let image = self.session.result().ok_or(ExportError::NoResult)?;
        Ok(export::save_collage(image, dir)?)
    }

    fn run_effects(&mut self, effects: Vec<Effect>) -> Result<(), BoothError> {
        for effect in effects {
            match effect {
                Effect::AcquireDevice => {
                    if let Err(e) = self.device.acquire() {
                        let recovery = self.session.apply(Action::DeviceFailed)?;
                        self.run_effects(recovery)?;
                        return Err(BoothError::DeviceUnavailable(e));
                    }
                }
                Effect::ReleaseDevice => self.device.release(),
                Effect::Compose(job) => {
                    log::debug!(
                        "Collage of {} photo(s) queued at {}x{}",
                        job.captures.len(),
                        job.spec.canvas_width,
                        job.spec.canvas_height
                    );
                    self.pending = Some(job);
                }
                Effect::Notify(notice) => {
                    log::warn!("{}: {}", notice.title, notice.description);
                    self.notices.push(notice);
                }
            }
        }
        Ok(())
    }
}

impl<B: CameraBackend> fmt::Debug for PhotoBooth<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhotoBooth")
            .field("session", &self.session)
            .field("device", &self.device)
            .field("pending", &self.pending.is_some())
            .finish_non_exhaustive()
    }
}
