use std::{path::PathBuf, time::Duration};

use anyhow::Context;
use eframe::egui;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::{config::Config, services::ServiceJob, word::Word};

use super::{validate_file, LoadedImage, UploadError, UploadJob, UploadService};

#[derive(Default)]
pub struct HttpUpload {
    config: HttpUploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpUploadConfig {
    address: String,
    port: u16,
    timeout_secs: u64,
    max_upload_bytes: u64,
    accepted_extensions: Vec<String>,
}

impl Default for HttpUploadConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_owned(),
            port: 5001,
            timeout_secs: 60,
            max_upload_bytes: 16 * 1024 * 1024,
            accepted_extensions: ["png", "jpg", "jpeg", "bmp", "tiff"]
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }
}

impl HttpUploadConfig {
    fn base_url(&self) -> String {
        format!("http://{}:{}", self.address, self.port)
    }
}

impl Config for HttpUploadConfig {
    fn path() -> &'static str {
        "upload_services/http.json"
    }

    fn show_ui(&mut self, ui: &mut egui::Ui) {
        ui.label("The OCR server must be started separately.");
        ui.horizontal(|ui| {
            ui.label("Address:");
            ui.text_edit_singleline(&mut self.address);
        });
        ui.horizontal(|ui| {
            ui.label("Port:");
            ui.add(egui::DragValue::new(&mut self.port));
        });
        ui.horizontal(|ui| {
            ui.label("Timeout (s):");
            ui.add(egui::DragValue::new(&mut self.timeout_secs).range(1..=600));
        });

        let mut max_mib = self.max_upload_bytes / (1024 * 1024);
        ui.horizontal(|ui| {
            ui.label("Max upload (MiB):");
            ui.add(egui::DragValue::new(&mut max_mib).range(1..=1024));
        });
        self.max_upload_bytes = max_mib * 1024 * 1024;

        ui.label(format!(
            "Accepted files: {}",
            self.accepted_extensions.join(", ")
        ));
    }
}

impl UploadService for HttpUpload {
    fn init(&mut self) -> anyhow::Result<()> {
        self.config =
            HttpUploadConfig::load().context("HttpUpload: Failed to load configuration file")?;
        Ok(())
    }

    fn terminate(&mut self) -> anyhow::Result<()> {
        self.config
            .save()
            .context("HttpUpload: Failed to save configuration file")?;
        Ok(())
    }

    fn show_config_ui(&mut self, ui: &mut egui::Ui) {
        self.config.show_ui(ui);
    }

    fn accepted_extensions(&self) -> &[String] {
        &self.config.accepted_extensions
    }

    fn upload(&mut self, path: PathBuf) -> UploadJob {
        let config = self.config.clone();
        ServiceJob::new(move || upload_blocking(&config, path))
    }
}

fn upload_blocking(config: &HttpUploadConfig, path: PathBuf) -> Result<LoadedImage, UploadError> {
    let invalid = |reason: String| UploadError::InvalidFile {
        path: path.clone(),
        reason,
    };

    let size = std::fs::metadata(&path)
        .map_err(|e| invalid(e.to_string()))?
        .len();
    validate_file(
        &path,
        size,
        &config.accepted_extensions,
        config.max_upload_bytes,
    )?;
    let bytes = std::fs::read(&path).map_err(|e| invalid(e.to_string()))?;

    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("upload");
    let form = attohttpc::MultipartBuilder::new()
        .with_file(attohttpc::MultipartFile::new("file", &bytes).with_filename(filename))
        .build()
        .map_err(|e| UploadError::Transport(format!("could not build upload form: {e}")))?;

    let url = format!("{}/upload", config.base_url());
    info!("Uploading `{}` ({} bytes) to {url}", path.display(), bytes.len());

    let response = attohttpc::post(&url)
        .timeout(Duration::from_secs(config.timeout_secs))
        .body(form)
        .send()
        .map_err(|e| UploadError::Transport(format!("upload to {url} failed: {e}")))?;
    let status = response.status().as_u16();
    let body = response
        .bytes()
        .map_err(|e| UploadError::Transport(format!("could not read upload response: {e}")))?;
    debug!("Upload response status: {status}");

    let processed = parse_upload_response(status, &body)?;
    let image = fetch_image(config, &processed.image_url)?;

    Ok(LoadedImage {
        image,
        original_width: processed.image_width,
        original_height: processed.image_height,
        words: processed.words,
    })
}

/// The fields of a successful `/upload` response.
#[derive(Debug)]
struct ProcessedUpload {
    image_url: String,
    image_width: f32,
    image_height: f32,
    words: Vec<Word>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    #[serde(default)]
    success: bool,
    image_url: Option<String>,
    image_width: Option<f32>,
    image_height: Option<f32>,
    #[serde(default)]
    ocr_data: Vec<Word>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<String>,
}

fn parse_upload_response(status: u16, body: &[u8]) -> Result<ProcessedUpload, UploadError> {
    if !(200..300).contains(&status) {
        let message = serde_json::from_slice::<ErrorResponse>(body)
            .ok()
            .and_then(|response| response.error)
            .unwrap_or_else(|| "could not parse error response".to_owned());
        return Err(UploadError::Transport(format!(
            "server error: {status} - {message}"
        )));
    }

    let response: UploadResponse = serde_json::from_slice(body)
        .map_err(|e| UploadError::MalformedResponse(format!("invalid JSON body: {e}")))?;

    if !response.success {
        return Err(UploadError::Rejected(
            response
                .error
                .unwrap_or_else(|| "OCR processing failed".to_owned()),
        ));
    }

    let missing = |field: &str| UploadError::MalformedResponse(format!("missing `{field}`"));
    Ok(ProcessedUpload {
        image_url: response.image_url.ok_or_else(|| missing("imageUrl"))?,
        image_width: response.image_width.ok_or_else(|| missing("imageWidth"))?,
        image_height: response.image_height.ok_or_else(|| missing("imageHeight"))?,
        words: response.ocr_data,
    })
}

/// Absolute URL for an image URL as returned by the server, which is usually a path.
fn resolve_image_url(base_url: &str, image_url: &str) -> String {
    if image_url.starts_with("http://") || image_url.starts_with("https://") {
        image_url.to_owned()
    } else {
        format!(
            "{}/{}",
            base_url.trim_end_matches('/'),
            image_url.trim_start_matches('/')
        )
    }
}

fn fetch_image(config: &HttpUploadConfig, image_url: &str) -> Result<image::RgbaImage, UploadError> {
    let url = resolve_image_url(&config.base_url(), image_url);
    let unloadable =
        |reason: String| UploadError::MalformedResponse(format!("could not load image `{url}`: {reason}"));

    let response = attohttpc::get(&url)
        .timeout(Duration::from_secs(config.timeout_secs))
        .send()
        .map_err(|e| unloadable(e.to_string()))?;
    if !response.is_success() {
        return Err(unloadable(format!("status {}", response.status().as_u16())));
    }
    let bytes = response.bytes().map_err(|e| unloadable(e.to_string()))?;

    let image = image::load_from_memory(&bytes).map_err(|e| unloadable(e.to_string()))?;
    Ok(image.to_rgba8())
}
