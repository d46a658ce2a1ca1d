use log::{error, info, warn};
use thiserror::Error;

use crate::{selection::Selection, word_index::WordIndex};

/// Default number of characters shown in the selection preview.
pub const PREVIEW_MAX_CHARS: usize = 50;

const ELLIPSIS: &str = "...";

/// The selected words joined by single spaces, in reading order.
pub fn selected_text(selection: &Selection, words: &WordIndex) -> String {
    let text = selection
        .iter()
        .filter_map(|id| words.find_by_index(id))
        .map(|word| word.text.as_str())
        .collect::<Vec<_>>()
        .join(" ");
    text.trim().to_owned()
}

/// Shorten `text` for display, appending an ellipsis if anything was cut off.
pub fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        None => text.to_owned(),
        Some((cut, _)) => format!("{}{ELLIPSIS}", &text[..cut]),
    }
}

#[derive(Debug, Error)]
pub enum ClipboardError {
    /// The clipboard could not be reached at all.
    #[error("clipboard unavailable: {0}")]
    Unavailable(String),
    #[error("failed to copy to clipboard: {0}")]
    CopyFailed(String),
}

/// A destination for copied text.
pub trait CopySink {
    fn name(&self) -> &'static str;
    fn copy(&mut self, text: &str) -> Result<(), ClipboardError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyOutcome {
    pub succeeded: bool,
    pub used_fallback: bool,
}

/// Copy `text` through `primary`, retrying once through `fallback` if the primary sink fails.
pub fn copy_with_fallback(
    text: &str,
    primary: &mut dyn CopySink,
    fallback: &mut dyn CopySink,
) -> CopyOutcome {
    let primary_error = match primary.copy(text) {
        Ok(()) => {
            info!("Copied {} characters via {}", text.chars().count(), primary.name());
            return CopyOutcome {
                succeeded: true,
                used_fallback: false,
            };
        }
        Err(e) => e,
    };

    warn!(
        "{} failed ({primary_error}), falling back to {}",
        primary.name(),
        fallback.name()
    );

    match fallback.copy(text) {
        Ok(()) => CopyOutcome {
            succeeded: true,
            used_fallback: true,
        },
        Err(e) => {
            error!("{} failed as well: {e}", fallback.name());
            CopyOutcome {
                succeeded: false,
                used_fallback: true,
            }
        }
    }
}
