use std::time::{Duration, Instant};

use eframe::egui::{self, Color32};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// The single-line status message shown at the bottom of the window.
#[derive(Debug)]
pub struct Status {
    message: String,
    kind: StatusKind,
    expires_at: Option<Instant>,
}

impl Default for Status {
    fn default() -> Self {
        Self {
            message: "Open an image to get started.".to_owned(),
            kind: StatusKind::Info,
            expires_at: None,
        }
    }
}

impl Status {
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn kind(&self) -> StatusKind {
        self.kind
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.set(message.into(), StatusKind::Info, None);
    }

    /// Show a success message, cleared again after `timeout` if one is given.
    pub fn success(&mut self, message: impl Into<String>, timeout: Option<Duration>) {
        self.set(message.into(), StatusKind::Success, timeout);
    }

    pub fn error_message(&mut self, message: impl Into<String>) {
        self.set(message.into(), StatusKind::Error, None);
    }

    /// Show an error together with its chain of causes.
    pub fn error(&mut self, e: anyhow::Error) {
        let mut s = format!("Error: {e}");

        for (idx, error) in e.chain().enumerate().skip(1) {
            s.push_str(&format!("\n\t{}. {}", idx, error));
        }

        self.error_message(s);
    }

    fn set(&mut self, message: String, kind: StatusKind, timeout: Option<Duration>) {
        self.message = message;
        self.kind = kind;
        self.expires_at = timeout.map(|timeout| Instant::now() + timeout);
    }

    /// Clear the message if it has expired. Returns how long until it expires otherwise.
    pub fn expire(&mut self, now: Instant) -> Option<Duration> {
        let expires_at = self.expires_at?;
        if now >= expires_at {
            self.message.clear();
            self.kind = StatusKind::Info;
            self.expires_at = None;
            None
        } else {
            Some(expires_at - now)
        }
    }

    pub fn show(&self, ui: &mut egui::Ui) {
        let colour = match self.kind {
            StatusKind::Info => ui.visuals().text_color(),
            StatusKind::Success => Color32::from_rgb(60, 160, 80),
            StatusKind::Error => ui.visuals().error_fg_color,
        };
        ui.label(egui::RichText::new(&self.message).color(colour));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_lists_causes() {
        let mut status = Status::default();
        let e = anyhow::anyhow!("connection refused").context("Upload failed");
        status.error(e);

        assert_eq!(status.kind(), StatusKind::Error);
        assert_eq!(
            status.message(),
            "Error: Upload failed\n\t1. connection refused"
        );
    }

    #[test]
    fn success_with_timeout_expires() {
        let mut status = Status::default();
        status.success("Copied to clipboard!", Some(Duration::from_secs(2)));
        let now = Instant::now();

        assert!(status.expire(now).is_some());
        assert_eq!(status.message(), "Copied to clipboard!");

        assert!(status.expire(now + Duration::from_secs(3)).is_none());
        assert_eq!(status.message(), "");
        assert_eq!(status.kind(), StatusKind::Info);
    }

    #[test]
    fn messages_without_timeout_stay() {
        let mut status = Status::default();
        status.error_message("Copy failed");
        assert!(status.expire(Instant::now() + Duration::from_secs(60)).is_none());
        assert_eq!(status.message(), "Copy failed");
    }

    #[test]
    fn new_message_replaces_pending_expiry() {
        let mut status = Status::default();
        status.success("Copied to clipboard!", Some(Duration::from_millis(1)));
        status.info("Uploading and processing image...");
        assert!(status.expire(Instant::now() + Duration::from_secs(1)).is_none());
        assert_eq!(status.message(), "Uploading and processing image...");
    }
}
