//! Saving the finished collage to disk.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

use crate::encoded::EncodedImage;

/// File name prefix of saved collages.
pub const FILE_PREFIX: &str = "photobooth-collage";

/// Errors that can occur while saving a collage.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("there is no finished collage to save yet")]
    NoResult,
    #[error("failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `photobooth-collage-<unix millis>.jpg`
pub fn collage_file_name(at: DateTime<Utc>) -> String {
    format!("{}-{}.jpg", FILE_PREFIX, at.timestamp_millis())
}

/// Default download directory: the user's Pictures folder, else the
/// working directory.
pub fn default_output_dir() -> PathBuf {
    dirs::picture_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Write `image` into `dir` under a timestamped name, creating `dir` if needed.
pub fn save_collage(image: &EncodedImage, dir: &Path) -> Result<PathBuf, ExportError> {
    save_collage_at(image, dir, Utc::now())
}

/// Like [`save_collage`] with an explicit timestamp.
pub fn save_collage_at(
    image: &EncodedImage,
    dir: &Path,
    at: DateTime<Utc>,
) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let path = dir.join(collage_file_name(at));
    std::fs::write(&path, image.as_bytes()).map_err(|source| ExportError::Io {
        path: path.clone(),
        source,
    })?;

    log::info!("Saved collage to {}", path.display());
    Ok(path)
}
