use log::debug;

use crate::{
    geometry::{ImageGeometry, Point, Rect},
    word_index::WordIndex,
};

/// Selected `global_index` values, always ascending and free of duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection(Vec<usize>);

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, global_index: usize) -> bool {
        self.0.binary_search(&global_index).is_ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }
}

impl FromIterator<usize> for Selection {
    fn from_iter<T: IntoIterator<Item = usize>>(iter: T) -> Self {
        let mut indices: Vec<usize> = iter.into_iter().collect();
        indices.sort_unstable();
        indices.dedup();
        Selection(indices)
    }
}

/// Every word whose rendered box overlaps `rect`.
pub fn hit_test(rect: &Rect, words: &WordIndex, geometry: &ImageGeometry) -> Selection {
    words
        .all()
        .iter()
        .filter(|word| rect.overlaps(&geometry.to_rendered(&word.bbox)))
        .map(|word| word.global_index)
        .collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        start: Point,
        /// `None` until the pointer has moved at least once.
        rect: Option<Rect>,
    },
}

/// Tracks a rectangle drag over the image and the words it currently selects.
#[derive(Debug, Clone, Default)]
pub struct SelectionEngine {
    state: DragState,
    selection: Selection,
}

impl SelectionEngine {
    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The live drag rectangle, if a drag is in progress and the pointer has moved.
    pub fn selection_rect(&self) -> Option<Rect> {
        match self.state {
            DragState::Dragging { rect, .. } => rect,
            DragState::Idle => None,
        }
    }

    /// Begin a drag at `start`. Ignored when there are no words to select.
    ///
    /// Returns whether a drag was started.
    pub fn drag_start(&mut self, start: Point, words: &WordIndex) -> bool {
        if words.is_empty() {
            return false;
        }

        debug!("Drag started at ({}, {})", start.x, start.y);
        self.state = DragState::Dragging { start, rect: None };
        self.selection = Selection::default();
        true
    }

    /// Recompute the drag rectangle and the selection from scratch. No-op while idle.
    ///
    /// Returns whether the selection changed.
    pub fn drag_move(&mut self, to: Point, words: &WordIndex, geometry: &ImageGeometry) -> bool {
        let DragState::Dragging { start, rect } = &mut self.state else {
            return false;
        };

        let new_rect = Rect::from_two_points(*start, to);
        *rect = Some(new_rect);

        let selection = hit_test(&new_rect, words, geometry);
        let changed = selection != self.selection;
        self.selection = selection;
        changed
    }

    /// Finish the drag, keeping the current selection. No-op while idle.
    ///
    /// Returns whether a drag was actually finished.
    pub fn drag_end(&mut self) -> bool {
        if !self.is_dragging() {
            return false;
        }

        debug!("Drag finished with {} selected words", self.selection.len());
        self.state = DragState::Idle;
        true
    }

    /// Drop any drag in progress and empty the selection.
    pub fn reset(&mut self) {
        self.state = DragState::Idle;
        self.selection = Selection::default();
    }
}
