//! End-to-end tests for the photobooth flow with a synthetic camera.

use std::time::Duration;

use photobooth::camera::{CameraSettings, Resolution, SyntheticCamera};
use photobooth::collage::{compose, CollageStyle};
use photobooth::flow::{CaptureOutcome, Composition, PhotoBooth, Step};
use photobooth::layout::{Layout, LayoutSpec, PhotoCount};
use photobooth::BoothError;

const SMALL: Resolution = Resolution {
    width: 64,
    height: 48,
};

fn booth(camera: &SyntheticCamera) -> PhotoBooth<SyntheticCamera> {
    PhotoBooth::new(
        camera.clone().with_resolution(SMALL),
        CameraSettings::default(),
        CollageStyle::default(),
    )
}

async fn start(booth: &mut PhotoBooth<SyntheticCamera>, count: PhotoCount, layout: Layout) {
    booth.begin().unwrap();
    booth.select(count, layout).unwrap();
    booth.confirm().unwrap();
    assert!(booth.wait_until_ready(Duration::from_secs(2)).await);
}

#[tokio::test]
async fn test_full_session_up_and_down() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);
    assert_eq!(booth.step(), Step::Welcome);

    start(&mut booth, PhotoCount::Two, Layout::UpAndDown).await;
    assert_eq!(booth.step(), Step::Capture);
    assert_eq!(camera.live_streams(), 1);

    assert_eq!(
        booth.capture().unwrap(),
        CaptureOutcome::Captured { taken: 1, total: 2 }
    );
    assert_eq!(booth.capture().unwrap(), CaptureOutcome::Complete);
    assert_eq!(booth.step(), Step::Collage);
    // camera is released as soon as the last photo is taken
    assert_eq!(camera.live_streams(), 0);

    // captures keep the frame's native size
    for capture in booth.session().captures() {
        assert_eq!((capture.width(), capture.height()), (64, 48));
    }

    let collage = booth.compose().await.unwrap().unwrap();
    assert_eq!(collage.geometry.spec, LayoutSpec::TWO_UP_AND_DOWN);
    let decoded = collage.image.decode().unwrap();
    assert_eq!((decoded.width(), decoded.height()), (800, 1400));

    let dir = tempfile::tempdir().unwrap();
    let path = booth.save(dir.path()).unwrap();
    assert!(path.exists());
    assert_eq!(
        std::fs::read(&path).unwrap(),
        booth.session().result().unwrap().as_bytes()
    );
}

#[tokio::test]
async fn test_three_photos_always_side_by_side() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);
    start(&mut booth, PhotoCount::Three, Layout::Grid2x2).await;

    for _ in 0..3 {
        booth.capture().unwrap();
    }
    let collage = booth.compose().await.unwrap().unwrap();
    assert_eq!(collage.geometry.spec, LayoutSpec::THREE_SIDE_BY_SIDE);
    assert_eq!(collage.image.width(), 2000);
}

#[tokio::test]
async fn test_compose_runs_once_per_capture_set() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);
    start(&mut booth, PhotoCount::Two, Layout::SideBySide).await;
    booth.capture().unwrap();
    booth.capture().unwrap();

    let first = booth.compose().await.unwrap().unwrap().image.clone();
    let second = booth.compose().await.unwrap().unwrap().image.clone();
    assert_eq!(first, second);
    assert!(booth.take_composition_job().is_none());
}

#[tokio::test]
async fn test_captures_never_exceed_count() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);
    start(&mut booth, PhotoCount::Four, Layout::Grid2x2).await;

    for _ in 0..4 {
        booth.capture().unwrap();
    }
    assert!(matches!(
        booth.capture(),
        Err(BoothError::InvalidStep {
            step: Step::Collage,
            ..
        })
    ));
    assert_eq!(booth.session().captures().len(), 4);
}

#[tokio::test]
async fn test_start_over_resets_and_releases() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);
    start(&mut booth, PhotoCount::Four, Layout::SideBySide).await;
    booth.capture().unwrap();
    assert_eq!(camera.live_streams(), 1);

    booth.start_over();

    assert_eq!(booth.step(), Step::Welcome);
    assert_eq!(booth.session().count(), PhotoCount::Two);
    assert_eq!(booth.session().layout(), Layout::SideBySide);
    assert!(booth.session().captures().is_empty());
    assert_eq!(camera.live_streams(), 0);
    assert!(!booth.device().is_active());
}

#[tokio::test]
async fn test_one_acquisition_per_capture_set() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);

    start(&mut booth, PhotoCount::Two, Layout::SideBySide).await;
    booth.start_over();
    start(&mut booth, PhotoCount::Two, Layout::SideBySide).await;

    assert_eq!(camera.total_opened(), 2);
    assert_eq!(camera.live_streams(), 1);
}

#[tokio::test]
async fn test_denied_camera_returns_to_welcome_with_notice() {
    let camera = SyntheticCamera::denying();
    let mut booth = booth(&camera);

    booth.begin().unwrap();
    booth.select(PhotoCount::Four, Layout::Grid2x2).unwrap();
    let err = booth.confirm().unwrap_err();

    assert!(matches!(err, BoothError::DeviceUnavailable(_)));
    assert!(err.is_user_facing());
    assert_eq!(booth.step(), Step::Welcome);
    assert_eq!(booth.session().count(), PhotoCount::Two);

    let notices = booth.take_notices();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].title, "Oh no! Webcam Error");
    assert!(notices[0].destructive);
    assert!(booth.take_notices().is_empty());

    // no automatic retry
    assert_eq!(camera.total_opened(), 0);
}

#[tokio::test]
async fn test_capture_before_ready_is_a_no_op() {
    let camera = SyntheticCamera::new().with_warmup(Duration::from_secs(60));
    let mut booth = PhotoBooth::new(
        camera.clone().with_resolution(SMALL),
        CameraSettings::default(),
        CollageStyle::default(),
    );
    booth.begin().unwrap();
    booth.confirm().unwrap();

    assert!(!booth.is_camera_ready());
    assert!(!booth.wait_until_ready(Duration::from_millis(50)).await);
    assert_eq!(booth.capture().unwrap(), CaptureOutcome::NotReady);
    assert!(booth.session().captures().is_empty());
}

#[tokio::test]
async fn test_actions_rejected_on_wrong_step() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);

    assert!(booth.capture().is_err());
    assert!(booth.confirm().is_err());
    assert!(booth.compose().await.is_err());
    assert!(booth.save(std::path::Path::new(".")).is_err());
    assert_eq!(booth.step(), Step::Welcome);
    assert_eq!(camera.total_opened(), 0);
}

#[tokio::test]
async fn test_stale_composition_is_discarded() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);
    start(&mut booth, PhotoCount::Two, Layout::SideBySide).await;
    booth.capture().unwrap();
    booth.capture().unwrap();

    // run the job outside the controller, then start over before it lands
    let job = booth.take_composition_job().unwrap();
    let outcome = compose(&job.captures, job.spec, booth.style()).await;
    booth.start_over();

    assert!(!booth.commit(job.generation, outcome));
    assert!(booth.session().result().is_none());
    assert_eq!(booth.step(), Step::Welcome);
}

#[tokio::test]
async fn test_external_composition_commits() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);
    start(&mut booth, PhotoCount::Two, Layout::SideBySide).await;
    booth.capture().unwrap();
    booth.capture().unwrap();

    let job = booth.take_composition_job().unwrap();
    let outcome = compose(&job.captures, job.spec, booth.style()).await;
    assert!(booth.commit(job.generation, outcome));
    assert!(matches!(
        booth.session().composition(),
        Some(Composition::Ready(_))
    ));
    assert!(booth.compose().await.unwrap().is_some());
}

#[tokio::test]
async fn test_abandoned_external_job_is_recomposed() {
    let camera = SyntheticCamera::new();
    let mut booth = booth(&camera);
    start(&mut booth, PhotoCount::Two, Layout::SideBySide).await;
    booth.capture().unwrap();
    booth.capture().unwrap();

    // the host takes the job and never commits it
    drop(booth.take_composition_job().unwrap());
    assert!(matches!(
        booth.session().composition(),
        Some(Composition::Pending)
    ));

    let collage = booth.compose().await.unwrap().unwrap();
    assert_eq!(collage.geometry.spec, LayoutSpec::TWO_SIDE_BY_SIDE);
    assert!(matches!(
        booth.session().composition(),
        Some(Composition::Ready(_))
    ));
}
