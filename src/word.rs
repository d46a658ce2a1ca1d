use serde::{Deserialize, Serialize};

/// A single word recognised by the OCR backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Word {
    /// Position of the word in reading order across the whole image.
    pub global_index: usize,
    /// Words sharing a `line_index` sit on the same visual line.
    pub line_index: usize,
    /// Position of the word inside its line.
    #[serde(default)]
    pub word_index: usize,
    #[serde(rename = "word")]
    pub text: String,
    /// Bounds in original-image pixels.
    #[serde(rename = "box")]
    pub bbox: WordBox,
}

/// `[x, y, width, height]` in original-image pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 4]", into = "[f32; 4]")]
pub struct WordBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl From<[f32; 4]> for WordBox {
    fn from([x, y, width, height]: [f32; 4]) -> Self {
        WordBox {
            x,
            y,
            width,
            height,
        }
    }
}

impl From<WordBox> for [f32; 4] {
    fn from(value: WordBox) -> Self {
        [value.x, value.y, value.width, value.height]
    }
}
