//! Copy sinks backed by the system clipboard and by egui's own clipboard output.

use arboard::Clipboard;
use eframe::egui;

use crate::export::{ClipboardError, CopySink};

/// The system clipboard via `arboard`.
///
/// The handle is kept open after the first copy: on some platforms the copied text only lives as long as the handle.
#[derive(Default)]
pub struct SystemClipboard {
    clipboard: Option<Clipboard>,
}

impl CopySink for SystemClipboard {
    fn name(&self) -> &'static str {
        "system clipboard"
    }

    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        let clipboard = match self.clipboard.take() {
            Some(clipboard) => clipboard,
            None => Clipboard::new().map_err(|e| ClipboardError::Unavailable(e.to_string()))?,
        };
        let clipboard = self.clipboard.insert(clipboard);

        clipboard
            .set_text(text)
            .map_err(|e| ClipboardError::CopyFailed(e.to_string()))
    }
}

/// Hands the text to egui, which writes it out through the windowing backend at the end of the frame.
pub struct EguiClipboard {
    ctx: egui::Context,
}

impl EguiClipboard {
    pub fn new(ctx: egui::Context) -> Self {
        Self { ctx }
    }
}

impl CopySink for EguiClipboard {
    fn name(&self) -> &'static str {
        "window clipboard"
    }

    fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.ctx.copy_text(text.to_owned());
        Ok(())
    }
}
