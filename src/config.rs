//! Configuration file handling for photobooth.
//!
//! Loads configuration from `<config dir>/photobooth/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::camera::{CameraSettings, Facing, Resolution};
use crate::collage::{CollageStyle, Shadow, DEFAULT_JPEG_QUALITY};
use crate::export;

/// Configuration file structure for photobooth.
/// Loaded from the platform config dir (or custom path via --config).
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub collage: CollageConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CameraConfig {
    #[serde(default)]
    pub device: u32,
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_true")]
    pub mirror: bool,
    #[serde(default)]
    pub facing: Facing,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            mirror: true,
            facing: Facing::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CollageConfig {
    /// `#RRGGBB`
    #[serde(default = "default_background")]
    pub background: String,
    #[serde(default = "default_jpeg_quality")]
    pub jpeg_quality: u8,
    #[serde(default = "default_true")]
    pub shadow: bool,
}

impl Default for CollageConfig {
    fn default() -> Self {
        Self {
            background: default_background(),
            jpeg_quality: default_jpeg_quality(),
            shadow: true,
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct OutputConfig {
    #[serde(default)]
    pub directory: Option<PathBuf>,
}

fn default_true() -> bool {
    true
}

fn default_width() -> u32 {
    Resolution::HIGH.width
}

fn default_height() -> u32 {
    Resolution::HIGH.height
}

fn default_fps() -> u32 {
    30
}

fn default_background() -> String {
    "#FAD2E1".to_string()
}

fn default_jpeg_quality() -> u8 {
    DEFAULT_JPEG_QUALITY
}

/// Written by `photobooth config init`.
pub const DEFAULT_CONFIG: &str = r##"# photobooth configuration

[camera]
# Camera device index (see `photobooth list-cameras`)
device = 0
# Requested capture size; the camera may pick something close
width = 1280
height = 720
fps = 30
# Mirror captures like a selfie
mirror = true
# "user" or "environment"
facing = "user"

[collage]
background = "#FAD2E1"
# JPEG quality, 1-100
jpeg_quality = 90
shadow = true

[output]
# Where collages are saved; defaults to your Pictures folder
# directory = "/path/to/photos"
"##;

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the default file doesn't exist.
    /// An explicit path that doesn't exist is an error.
    /// Returns an error if the file exists but cannot be parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_path(), false),
        };

        if !path.exists() {
            if explicit {
                return Err(ConfigError::IoError {
                    source: std::io::Error::new(
                        std::io::ErrorKind::NotFound,
                        "no such file",
                    ),
                    path,
                });
            }
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        let config = Self::parse(&content).map_err(|e| match e {
            ConfigError::ParseError { source, .. } => ConfigError::ParseError {
                path: path.clone(),
                source,
            },
            other => other,
        })?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate config text.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: PathBuf::new(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        parse_hex_color(&self.collage.background)?;
        if !(1..=100).contains(&self.collage.jpeg_quality) {
            return Err(ConfigError::OutOfRange {
                field: "collage.jpeg_quality",
                value: self.collage.jpeg_quality.to_string(),
                expected: "1-100",
            });
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(ConfigError::OutOfRange {
                field: "camera.width/height",
                value: format!("{}x{}", self.camera.width, self.camera.height),
                expected: "greater than 0",
            });
        }
        if !(1..=120).contains(&self.camera.fps) {
            return Err(ConfigError::OutOfRange {
                field: "camera.fps",
                value: self.camera.fps.to_string(),
                expected: "1-120",
            });
        }
        Ok(())
    }

    pub fn camera_settings(&self) -> CameraSettings {
        CameraSettings {
            device_index: self.camera.device,
            resolution: Resolution {
                width: self.camera.width,
                height: self.camera.height,
            },
            fps: self.camera.fps,
            mirror: self.camera.mirror,
            facing: self.camera.facing,
        }
    }

    pub fn collage_style(&self) -> Result<CollageStyle, ConfigError> {
        Ok(CollageStyle {
            background: parse_hex_color(&self.collage.background)?,
            jpeg_quality: self.collage.jpeg_quality,
            shadow: self.collage.shadow.then(Shadow::default),
            ..CollageStyle::default()
        })
    }

    /// Configured output directory, or the platform default.
    pub fn output_dir(&self) -> PathBuf {
        self.output
            .directory
            .clone()
            .unwrap_or_else(export::default_output_dir)
    }
}

/// Parse `#RRGGBB` (the leading `#` is optional).
pub fn parse_hex_color(s: &str) -> Result<[u8; 3], ConfigError> {
    let hex = s.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ConfigError::InvalidColor(s.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ConfigError::InvalidColor(s.to_string()))
    };
    Ok([channel(0)?, channel(2)?, channel(4)?])
}

/// Errors that can occur when loading configuration.
#[derive(Debug)]
pub enum ConfigError {
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    InvalidColor(String),
    OutOfRange {
        field: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError { path, source } => {
                write!(
                    f,
                    "Failed to read config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::ParseError { path, source } => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    source
                )
            }
            ConfigError::InvalidColor(value) => {
                write!(f, "Invalid color '{}'. Use #RRGGBB (e.g. #FAD2E1)", value)
            }
            ConfigError::OutOfRange {
                field,
                value,
                expected,
            } => {
                write!(f, "{} must be {}, got {}", field, expected, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError { source, .. } => Some(source),
            ConfigError::ParseError { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("photobooth")
        .join("config.toml")
}

/// Write the commented default config to `path`, creating parent dirs.
/// Refuses to overwrite an existing file unless `force` is set.
pub fn write_default(path: &Path, force: bool) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::IoError {
        path: path.to_path_buf(),
        source,
    };
    if path.exists() && !force {
        return Err(io_err(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            "config file already exists (use --force to overwrite)",
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, DEFAULT_CONFIG).map_err(io_err)?;
    log::info!("Wrote default config to {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.camera_settings(), CameraSettings::default());
        assert_eq!(config.collage_style().unwrap(), CollageStyle::default());
    }

    #[test]
    fn test_default_file_matches_defaults() {
        assert_eq!(Config::parse(DEFAULT_CONFIG).unwrap(), Config::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
            [camera]
            device = 2
            mirror = false
            facing = "environment"

            [collage]
            shadow = false
            "#,
        )
        .unwrap();

        let settings = config.camera_settings();
        assert_eq!(settings.device_index, 2);
        assert!(!settings.mirror);
        assert_eq!(settings.facing, Facing::Environment);
        assert_eq!(settings.resolution, Resolution::HIGH);

        let style = config.collage_style().unwrap();
        assert!(style.shadow.is_none());
        assert_eq!(style.jpeg_quality, 90);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::parse("[collage]\nbackground = \"pink\""),
            Err(ConfigError::InvalidColor(_))
        ));
        assert!(matches!(
            Config::parse("[collage]\njpeg_quality = 0"),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            Config::parse("[camera]\nfps = 0"),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            Config::parse("[camera\n"),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#FAD2E1").unwrap(), [0xFA, 0xD2, 0xE1]);
        assert_eq!(parse_hex_color("ffffff").unwrap(), [255, 255, 255]);
        assert!(parse_hex_color("#FFF").is_err());
        assert!(parse_hex_color("#GGGGGG").is_err());
    }

    #[test]
    fn test_load_missing_explicit_path_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            Config::load(Some(&missing)),
            Err(ConfigError::IoError { .. })
        ));
    }

    #[test]
    fn test_write_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        write_default(&path, false).unwrap();
        assert!(write_default(&path, false).is_err());
        write_default(&path, true).unwrap();

        assert_eq!(Config::load(Some(&path)).unwrap(), Config::default());
    }

    #[test]
    fn test_output_dir_override() {
        let config = Config::parse("[output]\ndirectory = \"/tmp/booth\"").unwrap();
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/booth"));
    }
}
