use std::path::{Path, PathBuf};

use anyhow::Result;
use eframe::egui;
use image::RgbaImage;
use thiserror::Error;

use crate::word::Word;

use super::ServiceJob;

pub mod http;

pub type UploadJob = ServiceJob<Result<LoadedImage, UploadError>>;

/// Sends an image to an OCR backend and brings back the processed image with its words.
pub trait UploadService {
    /// Initialise the service (ie. load its configuration file, etc).
    fn init(&mut self) -> Result<()>;
    /// Terminate the service (ie. save its configuration file, etc).
    fn terminate(&mut self) -> Result<()>;

    /// Show the config UI for the service's configuration.
    fn show_config_ui(&mut self, ui: &mut egui::Ui);

    /// Lower-case file extensions this service accepts.
    fn accepted_extensions(&self) -> &[String];

    /// Upload the image at `path` and run OCR on it.
    fn upload(&mut self, path: PathBuf) -> UploadJob;
}

/// A successfully processed image.
pub struct LoadedImage {
    /// The image as served back by the backend, ready to be displayed.
    pub image: RgbaImage,
    /// Size of the image the word boxes refer to.
    pub original_width: f32,
    pub original_height: f32,
    pub words: Vec<Word>,
}

#[derive(Debug, Error)]
pub enum UploadError {
    /// Rejected locally, before anything was sent.
    #[error("cannot upload `{}`: {reason}", .path.display())]
    InvalidFile { path: PathBuf, reason: String },
    /// The request failed or the server answered with a non-2xx status.
    #[error("{0}")]
    Transport(String),
    /// The server answered 2xx but reported that processing failed.
    #[error("{0}")]
    Rejected(String),
    /// The response body or the processed image could not be understood.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

/// Check a file against the accepted extensions and size limit.
pub fn validate_file(
    path: &Path,
    size: u64,
    accepted_extensions: &[String],
    max_bytes: u64,
) -> Result<(), UploadError> {
    let invalid = |reason: String| UploadError::InvalidFile {
        path: path.to_owned(),
        reason,
    };

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase)
        .ok_or_else(|| invalid("file has no extension".to_owned()))?;

    if !accepted_extensions.iter().any(|accepted| *accepted == extension) {
        return Err(invalid(format!(
            "`.{extension}` files are not supported (expected one of: {})",
            accepted_extensions.join(", ")
        )));
    }

    if size > max_bytes {
        return Err(invalid(format!(
            "file is {size} bytes, the limit is {max_bytes} bytes"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn accepted() -> Vec<String> {
        ["png", "jpg", "jpeg", "bmp", "tiff"]
            .into_iter()
            .map(str::to_owned)
            .collect()
    }

    #[test]
    fn accepts_known_extensions_case_insensitively() {
        assert!(validate_file(Path::new("scan.PNG"), 10, &accepted(), 100).is_ok());
        assert!(validate_file(Path::new("dir/photo.jpeg"), 10, &accepted(), 100).is_ok());
    }

    #[test]
    fn rejects_unknown_or_missing_extension() {
        assert!(matches!(
            validate_file(Path::new("notes.pdf"), 10, &accepted(), 100),
            Err(UploadError::InvalidFile { .. })
        ));
        assert!(matches!(
            validate_file(Path::new("README"), 10, &accepted(), 100),
            Err(UploadError::InvalidFile { .. })
        ));
    }

    #[test]
    fn rejects_oversized_files() {
        let e = validate_file(Path::new("big.png"), 101, &accepted(), 100).unwrap_err();
        assert!(e.to_string().contains("big.png"));
        assert!(e.to_string().contains("limit"));
    }
}
