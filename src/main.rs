use std::{path::PathBuf, time::Duration, time::Instant};

use anyhow::{anyhow, Context, Result};
use config::{AppConfig, Config};
use eframe::egui::{self, TextureHandle};
use gui::{config_window::show_config_window, status::Status, viewer};
use log::{error, info, warn};
use services::{clipboard::EguiClipboard, clipboard::SystemClipboard, upload::UploadJob, Services};
use session::{Session, UploadTicket};

pub mod config;
pub mod export;
pub mod geometry;
pub mod gui;
pub mod highlight;
pub mod selection;
pub mod services;
pub mod session;
pub mod word;
pub mod word_index;

const WINDOW_TITLE: &str = "OCR Word Selector";

fn main() -> Result<()> {
    let mut logger = pretty_env_logger::formatted_builder();
    logger.filter_module(env!("CARGO_CRATE_NAME"), log::LevelFilter::Info);
    if let Ok(filters) = std::env::var("RUST_LOG") {
        logger.parse_filters(&filters);
    }
    logger.init();

    let config = AppConfig::load().context("Could not load main configuration file")?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title(WINDOW_TITLE)
            .with_inner_size([config.window_width as f32, config.window_height as f32])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        WINDOW_TITLE,
        options,
        Box::new(|_cc| {
            let app = App::new(config)?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow!("{e}"))
}

pub struct App {
    config: AppConfig,
    services: Services,
    session: Session,
    texture: Option<TextureHandle>,
    upload: Option<(UploadTicket, UploadJob)>,
    clipboard: SystemClipboard,
    status: Status,
    show_config: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let services = Services::new(&config).with_context(|| {
            format!(
                "Failed to initialise upload service `{}`",
                config.upload_service.name()
            )
        })?;

        Ok(Self {
            config,
            services,
            session: Session::new(),
            texture: None,
            upload: None,
            clipboard: SystemClipboard::default(),
            status: Status::default(),
            show_config: false,
        })
    }

    fn start_upload(&mut self, path: PathBuf) {
        info!("Image selected: `{}`", path.display());

        // any job still running is dropped here and its result can no longer be applied
        let ticket = self.session.begin_upload();
        self.texture = None;
        self.status.info("Uploading and processing image...");
        self.upload = Some((ticket, self.services.upload.upload(path)));
    }

    fn poll_upload(&mut self, ctx: &egui::Context) {
        let Some((ticket, job)) = &mut self.upload else {
            return;
        };
        let ticket = *ticket;

        let result = match job.try_wait() {
            Ok(None) => {
                ctx.request_repaint_after(Duration::from_millis(100));
                return;
            }
            Ok(Some(result)) => result,
            Err(e) => {
                self.upload = None;
                self.status.error(e.context("Upload job failed"));
                return;
            }
        };
        self.upload = None;

        match result {
            Ok(loaded) => {
                if !self.session.finish_upload(
                    ticket,
                    loaded.words,
                    loaded.original_width,
                    loaded.original_height,
                ) {
                    return;
                }
                self.texture = Some(viewer::load_texture(ctx, &loaded.image));
                self.status.success(
                    format!(
                        "Image loaded. {} words recognised.",
                        self.session.words().len()
                    ),
                    None,
                );
            }
            Err(e) => {
                error!("Upload failed: {e}");
                self.status.error(anyhow::Error::new(e).context("Upload failed"));
            }
        }
    }

    fn pick_file(&mut self) {
        let extensions = self.services.upload.accepted_extensions().to_vec();
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Images", extensions.as_slice())
            .pick_file()
        {
            self.start_upload(path);
        }
    }

    fn copy_selection(&mut self, ctx: &egui::Context) {
        let mut fallback = EguiClipboard::new(ctx.clone());
        let Some(outcome) = self
            .session
            .copy_selection(&mut self.clipboard, &mut fallback)
        else {
            return;
        };

        let timeout = Some(Duration::from_millis(self.config.status_timeout_ms));
        match (outcome.succeeded, outcome.used_fallback) {
            (true, false) => self.status.success("Copied to clipboard!", timeout),
            (true, true) => self
                .status
                .success("Copied to clipboard! (fallback)", timeout),
            (false, _) => self.status.error_message("Copy failed"),
        }
    }

    fn top_bar_ui(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            if ui.button("Open image…").clicked() {
                self.pick_file();
            }
            ui.toggle_value(&mut self.show_config, "Settings");
        });
    }

    fn bottom_bar_ui(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        egui_extras::StripBuilder::new(ui)
            .size(egui_extras::Size::exact(22.0))
            .size(egui_extras::Size::exact(22.0))
            .vertical(|mut strip| {
                strip.cell(|ui| self.status.show(ui));

                strip.cell(|ui| {
                    ui.horizontal(|ui| {
                        let copy = ui.add_enabled(
                            self.session.can_export(),
                            egui::Button::new("Copy"),
                        );
                        if copy.clicked() {
                            self.copy_selection(ctx);
                        }

                        let preview = self
                            .session
                            .preview(self.config.preview_max_chars)
                            .unwrap_or_else(|| "-".to_owned());
                        ui.label(format!("Selection: {preview}"));
                    });
                });
            });
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        // egui turns Ctrl/Cmd+C into a copy event
        let copy_requested = ctx.input(|input| {
            input
                .events
                .iter()
                .any(|event| matches!(event, egui::Event::Copy))
        });
        let widget_focused = ctx.memory(|memory| memory.focused().is_some());

        if copy_requested && !widget_focused && self.session.can_export() {
            self.copy_selection(ctx);
        }
    }

    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        let mut paths = dropped.into_iter().filter_map(|file| file.path);

        if let Some(path) = paths.next() {
            if paths.next().is_some() {
                warn!("Several files dropped, only the first one is used");
            }
            self.start_upload(path);
        }
    }
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_upload(ctx);
        self.handle_dropped_files(ctx);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| self.top_bar_ui(ui));
        egui::TopBottomPanel::bottom("bottom_bar").show(ctx, |ui| self.bottom_bar_ui(ui, ctx));

        egui::CentralPanel::default().show(ctx, |ui| {
            viewer::image_panel(
                ui,
                &mut self.session,
                self.texture.as_ref(),
                self.upload.is_some(),
                self.config.highlight_colour,
            );
        });

        self.handle_shortcuts(ctx);

        if self.show_config {
            show_config_window(self, ctx);
        }

        if let Some(remaining) = self.status.expire(Instant::now()) {
            ctx.request_repaint_after(remaining);
        }
    }
}
