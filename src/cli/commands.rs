//! Subcommand handlers.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use super::args::{ComposeArgs, ConfigAction, ShootArgs};
use photobooth::camera::{self, CameraBackend, PlatformBackend, SyntheticCamera};
use photobooth::collage;
use photobooth::config::{self, Config};
use photobooth::encoded::EncodedImage;
use photobooth::export;
use photobooth::flow::{CaptureOutcome, PhotoBooth, Step};
use photobooth::layout::{normalize, resolve, Layout, PhotoCount};
use photobooth::BoothError;

/// How long to wait for the first camera frame.
const READY_TIMEOUT: Duration = Duration::from_secs(10);

/// List available cameras and print them to stdout.
pub fn list_cameras() {
    match camera::list_devices() {
        Ok(devices) => {
            if devices.is_empty() {
                println!("No cameras found.");
                println!();
                println!("Make sure your camera is connected and permissions are granted.");
                println!(
                    "On macOS, grant access in System Settings > Privacy & Security > Camera."
                );
            } else {
                println!("Available cameras:");
                for device in devices {
                    println!("  {}", device);
                }
                println!();
                println!("Use --camera <index> to select a camera.");
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, config_path: Option<&Path>) {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(config::default_path);

    match action {
        ConfigAction::Show => {
            let cfg = match Config::load(config_path) {
                Ok(c) => c,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let settings = cfg.camera_settings();

            println!("Current configuration:");
            println!("  Camera: {}", settings.device_index);
            println!("  Resolution: {}", settings.resolution);
            println!("  FPS: {}", settings.fps);
            println!("  Mirror: {}", if settings.mirror { "yes" } else { "no" });
            println!("  Facing: {:?}", settings.facing);
            println!("  Background: {}", cfg.collage.background);
            println!("  JPEG quality: {}", cfg.collage.jpeg_quality);
            println!("  Shadow: {}", if cfg.collage.shadow { "yes" } else { "no" });
            println!("  Output: {}", cfg.output_dir().display());
            println!();

            if path.exists() {
                println!("Config file: {} (exists)", path.display());
            } else {
                println!("Config file: {} (not found)", path.display());
            }
        }
        ConfigAction::Init { force } => {
            if let Err(e) = config::write_default(&path, force) {
                eprintln!("Error: {}", e);
                eprintln!("Use 'photobooth config show' to view current settings.");
                std::process::exit(1);
            }
            println!("Created config file: {}", path.display());
        }
    }
}

/// One line of user input during a shoot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    Continue,
    Restart,
    Quit,
}

impl Input {
    pub fn parse(line: &str) -> Self {
        match line.trim().to_lowercase().as_str() {
            "q" | "quit" | "exit" => Input::Quit,
            "r" | "restart" => Input::Restart,
            _ => Input::Continue,
        }
    }
}

/// Read the next line, treating EOF and Ctrl+C as quit.
async fn next_input(lines: &mut Lines<BufReader<Stdin>>) -> Result<Input, String> {
    tokio::select! {
        line = lines.next_line() => match line {
            Ok(Some(line)) => Ok(Input::parse(&line)),
            Ok(None) => Ok(Input::Quit),
            Err(e) => Err(format!("Failed to read input: {}", e)),
        },
        _ = tokio::signal::ctrl_c() => {
            println!();
            Ok(Input::Quit)
        }
    }
}

/// The layout used for `count` photos, telling the user when theirs is not offered.
fn offered_layout(count: PhotoCount, requested: Layout) -> Layout {
    let layout = normalize(count, requested);
    if layout != requested {
        println!(
            "{} is not offered for {} photos, using {}.",
            requested, count, layout
        );
    }
    layout
}

/// Confirm the selection, opening the camera off the async worker.
///
/// Webcam backends block until the stream is open.
fn confirm_blocking<B: CameraBackend>(booth: &mut PhotoBooth<B>) -> Result<(), BoothError> {
    tokio::task::block_in_place(|| booth.confirm())
}

/// Run the interactive shoot.
pub async fn run_shoot(args: ShootArgs, cfg: &Config) -> Result<(), String> {
    let count = PhotoCount::try_from(args.count).map_err(|e| e.to_string())?;
    let layout = offered_layout(count, args.layout.into());

    let mut settings = cfg.camera_settings();
    if let Some(index) = args.camera {
        settings.device_index = index;
    }
    let style = cfg.collage_style().map_err(|e| e.to_string())?;
    let output_dir = args.output.unwrap_or_else(|| cfg.output_dir());

    let saved = if args.synthetic {
        let booth = PhotoBooth::new(SyntheticCamera::new(), settings, style);
        shoot(booth, count, layout, &output_dir).await?
    } else {
        let booth = PhotoBooth::new(PlatformBackend::default(), settings, style);
        shoot(booth, count, layout, &output_dir).await?
    };

    if let Some(path) = saved {
        println!("Saved collage: {}", path.display());
    }
    Ok(())
}

async fn shoot<B: CameraBackend>(
    mut booth: PhotoBooth<B>,
    count: PhotoCount,
    layout: Layout,
    output_dir: &Path,
) -> Result<Option<PathBuf>, String> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        match booth.step() {
            Step::Welcome => {
                println!();
                println!("Photobooth! Press Enter to begin, q to quit.");
                if next_input(&mut lines).await? == Input::Quit {
                    return Ok(None);
                }
                booth.begin().map_err(|e| e.to_string())?;
            }
            Step::Selection => {
                booth.select(count, layout).map_err(|e| e.to_string())?;
                match confirm_blocking(&mut booth) {
                    Ok(()) => {}
                    Err(BoothError::DeviceUnavailable(e)) => {
                        for notice in booth.take_notices() {
                            eprintln!("{}", notice.title);
                            eprintln!("{}", notice.description);
                        }
                        return Err(e.to_string());
                    }
                    Err(e) => return Err(e.to_string()),
                }

                println!("Starting camera...");
                if !booth.wait_until_ready(READY_TIMEOUT).await {
                    booth.start_over();
                    return Err("Camera did not deliver a frame in time".to_string());
                }
                let spec = booth.session().spec();
                println!(
                    "Taking {} photos ({}, {}x{}).",
                    count,
                    booth.session().layout(),
                    spec.canvas_width,
                    spec.canvas_height
                );
            }
            Step::Capture => {
                let session = booth.session();
                println!(
                    "Photo {}/{}: press Enter to capture, r to start over, q to quit.",
                    session.captures().len() + 1,
                    session.count()
                );
                match next_input(&mut lines).await? {
                    Input::Quit => {
                        booth.start_over();
                        return Ok(None);
                    }
                    Input::Restart => {
                        booth.start_over();
                        println!("Starting over.");
                    }
                    Input::Continue => match booth.capture().map_err(|e| e.to_string())? {
                        CaptureOutcome::NotReady => println!("Camera is still warming up."),
                        CaptureOutcome::Skipped => println!("That one didn't work, try again."),
                        CaptureOutcome::Captured { taken, total } => {
                            println!("Captured {}/{}.", taken, total)
                        }
                        CaptureOutcome::Complete => println!("Got them all! Building collage..."),
                    },
                }
            }
            Step::Collage => {
                let collage = match booth.compose().await {
                    Ok(Some(collage)) => collage,
                    Ok(None) => return Err("Collage could not be composed".to_string()),
                    Err(e) => return Err(e.to_string()),
                };
                log::debug!("Collage geometry: {:?}", collage.geometry);
                let path = booth.save(output_dir).map_err(|e| e.to_string())?;
                return Ok(Some(path));
            }
        }
    }
}

/// Compose existing image files into a collage.
pub async fn run_compose(args: ComposeArgs, cfg: &Config) -> Result<(), String> {
    let count = PhotoCount::try_from(args.files.len()).map_err(|e| e.to_string())?;
    let spec = resolve(count, offered_layout(count, args.layout.into()));
    let style = cfg.collage_style().map_err(|e| e.to_string())?;

    let mut captures = Vec::with_capacity(args.files.len());
    for path in &args.files {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
        let image = EncodedImage::from_bytes(bytes)
            .map_err(|e| format!("'{}' is not a supported image: {}", path.display(), e))?;
        captures.push(image);
    }

    let collage = collage::compose(&captures, spec, &style)
        .await
        .map_err(|e| e.to_string())?;

    let path = match args.output {
        Some(path) => {
            tokio::fs::write(&path, collage.image.as_bytes())
                .await
                .map_err(|e| format!("Failed to write '{}': {}", path.display(), e))?;
            path
        }
        None => export::save_collage(&collage.image, &cfg.output_dir()).map_err(|e| e.to_string())?,
    };

    println!(
        "Saved {}x{} collage: {}",
        spec.canvas_width,
        spec.canvas_height,
        path.display()
    );
    Ok(())
}
