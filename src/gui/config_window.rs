use eframe::egui;

use crate::{config::Config, services::Services, App};

pub fn show_config_window(app: &mut App, ctx: &egui::Context) {
    let mut open = app.show_config;

    egui::Window::new(concat!(env!("CARGO_PKG_NAME"), " Settings"))
        .open(&mut open)
        .resizable(true)
        .default_width(360.0)
        .show(ctx, |ui| {
            let header_size = 18.0;

            egui::ScrollArea::vertical().show(ui, |ui| {
                app.config.show_ui(ui);

                ui.separator();

                egui::CollapsingHeader::new(
                    egui::RichText::new(format!(
                        "Upload: {}",
                        app.config.upload_service.name()
                    ))
                    .size(header_size),
                )
                .default_open(true)
                .show_unindented(ui, |ui| {
                    app.services.upload.show_config_ui(ui);
                });
            });

            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    if let Err(e) = app.config.save() {
                        app.status.error(e);
                    }
                }

                if ui.button("Reload Services").clicked() {
                    // service configs are read back from disk on init
                    if let Err(e) = app.services.upload.terminate() {
                        app.status.error(e);
                        return;
                    }
                    match Services::new(&app.config) {
                        Ok(services) => app.services = services,
                        Err(e) => app.status.error(e),
                    }
                }
            });
        });

    app.show_config = open;
}
