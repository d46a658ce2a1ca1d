use std::collections::BTreeMap;

use log::debug;

use crate::{
    geometry::{ImageGeometry, Rect},
    selection::Selection,
    word_index::WordIndex,
};

/// Something highlight rectangles can be drawn onto.
pub trait Surface {
    /// Erase everything previously drawn.
    fn clear(&mut self);
    /// Fill `rect` (rendered coordinates) with an unpremultiplied RGBA colour.
    fn fill_rect(&mut self, rect: Rect, colour: [u8; 4]);
}

/// The merged bounds of all selected words on one line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HighlightGroup {
    pub line_index: usize,
    pub rect: Rect,
}

/// One group per distinct line among the selected words, ordered by `line_index`.
///
/// Selected ids missing from `words` are ignored.
pub fn highlight_groups(
    selection: &Selection,
    words: &WordIndex,
    geometry: &ImageGeometry,
) -> Vec<HighlightGroup> {
    let mut lines: BTreeMap<usize, Rect> = BTreeMap::new();

    for word in selection.iter().filter_map(|id| words.find_by_index(id)) {
        let rendered = geometry.to_rendered(&word.bbox);
        lines
            .entry(word.line_index)
            .and_modify(|rect| *rect = rect.union(&rendered))
            .or_insert(rendered);
    }

    lines
        .into_iter()
        .map(|(line_index, rect)| HighlightGroup { line_index, rect })
        .collect()
}

/// Clear `surface` and draw one rectangle per selected line. Returns the number of rectangles drawn.
pub fn render(
    selection: &Selection,
    words: &WordIndex,
    geometry: &ImageGeometry,
    surface: &mut impl Surface,
    colour: [u8; 4],
) -> usize {
    surface.clear();

    if selection.is_empty() {
        return 0;
    }

    let mut drawn = 0;
    for group in highlight_groups(selection, words, geometry) {
        if !group.rect.has_area() {
            debug!(
                "Skipping empty highlight for line {}: {:?}",
                group.line_index, group.rect
            );
            continue;
        }
        surface.fill_rect(group.rect, colour);
        drawn += 1;
    }
    drawn
}
