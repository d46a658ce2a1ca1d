use std::{fs::File, path::Path, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use eframe::egui;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    export::PREVIEW_MAX_CHARS,
    services::upload::{http::HttpUpload, UploadService},
};

pub trait Config: Serialize + DeserializeOwned + Default {
    /// Path of the configuration file, relative to this application's config directory.
    fn path() -> &'static str;
    fn show_ui(&mut self, ui: &mut egui::Ui);

    /// Loads the configuration file, or creates a default configuration struct if the file does not exist.
    fn load() -> Result<Self> {
        Self::load_from(&config_path::<Self>()?)
    }

    fn save(&self) -> Result<()> {
        self.save_to(&config_path::<Self>()?)
    }

    fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let file = File::open(config_path).with_context(|| {
            format!(
                "Could not open configuration file: `{}`",
                config_path.display()
            )
        })?;

        serde_json::from_reader(file).with_context(|| {
            format!(
                "Could not read configuration file: `{}`",
                config_path.display(),
            )
        })
    }

    fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(config_dir) = config_path.parent() {
            std::fs::create_dir_all(config_dir).with_context(|| {
                format!(
                    "Could not create configuration directory: `{}`",
                    config_dir.display()
                )
            })?;
        }

        let file = File::create(config_path).with_context(|| {
            format!(
                "Could not write to configuration file: `{}`",
                config_path.display()
            )
        })?;

        serde_json::to_writer_pretty(file, self).with_context(|| {
            format!(
                "Could not serialise configuration file: `{}`",
                config_path.display()
            )
        })
    }
}

fn config_path<C: Config>() -> Result<PathBuf> {
    let mut config_path =
        dirs::config_dir().ok_or_else(|| anyhow!("Could not find suitable config directory"))?;
    config_path.push(env!("CARGO_PKG_NAME"));
    config_path.push(C::path());
    Ok(config_path)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub upload_service: UploadServiceList,
    /// Unpremultiplied RGBA fill used for line highlights.
    pub highlight_colour: [u8; 4],
    pub preview_max_chars: usize,
    /// How long a "copied" message stays in the status line.
    pub status_timeout_ms: u64,
    pub window_width: u32,
    pub window_height: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            upload_service: UploadServiceList::Http,
            highlight_colour: [0, 120, 215, 77],
            preview_max_chars: PREVIEW_MAX_CHARS,
            status_timeout_ms: 2000,
            window_width: 1280,
            window_height: 800,
        }
    }
}

impl Config for AppConfig {
    fn path() -> &'static str {
        "config.json"
    }

    fn show_ui(&mut self, ui: &mut egui::Ui) {
        egui::ComboBox::from_label("Upload Service")
            .selected_text(self.upload_service.name())
            .show_ui(ui, |ui| {
                ui.selectable_value(
                    &mut self.upload_service,
                    UploadServiceList::Http,
                    UploadServiceList::Http.name(),
                );
            });

        ui.horizontal(|ui| {
            ui.label("Highlight colour:");
            ui.color_edit_button_srgba_unmultiplied(&mut self.highlight_colour);
        });
        ui.horizontal(|ui| {
            ui.label("Preview length:");
            ui.add(egui::DragValue::new(&mut self.preview_max_chars).range(1..=500));
        });
        ui.horizontal(|ui| {
            ui.label("Status timeout (ms):");
            ui.add(egui::DragValue::new(&mut self.status_timeout_ms).speed(50));
        });
        ui.horizontal(|ui| {
            ui.label("Window size:");
            ui.add(egui::DragValue::new(&mut self.window_width));
            ui.label("x");
            ui.add(egui::DragValue::new(&mut self.window_height));
        });
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub enum UploadServiceList {
    Http,
}

impl UploadServiceList {
    pub fn create_service(&self) -> Box<dyn UploadService> {
        match self {
            Self::Http => Box::new(HttpUpload::default()),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Http => "HTTP (/upload)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.highlight_colour, [0, 120, 215, 77]);
        assert_eq!(config.preview_max_chars, 50);
        assert_eq!(config.upload_service, UploadServiceList::Http);
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = AppConfig {
            highlight_colour: [255, 0, 0, 128],
            preview_max_chars: 20,
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.highlight_colour, [255, 0, 0, 128]);
        assert_eq!(loaded.preview_max_chars, 20);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "status_timeout_ms": 5000 }"#).unwrap();

        let loaded = AppConfig::load_from(&path).unwrap();
        assert_eq!(loaded.status_timeout_ms, 5000);
        assert_eq!(loaded.window_width, 1280);
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        let e = AppConfig::load_from(&path).unwrap_err();
        assert!(e.to_string().contains("config.json"));
    }
}
