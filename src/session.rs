use log::{debug, info, warn};

use crate::{
    export::{self, CopyOutcome, CopySink},
    geometry::{ImageGeometry, Point, Rect},
    highlight::{self, Surface},
    selection::{Selection, SelectionEngine},
    word::Word,
    word_index::WordIndex,
};

/// Identifies one upload attempt. Only the most recently started attempt may apply its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadTicket(u64);

/// Everything known about the currently displayed image and the user's selection on it.
#[derive(Debug, Default)]
pub struct Session {
    words: WordIndex,
    geometry: ImageGeometry,
    engine: SelectionEngine,
    export_enabled: bool,
    generation: u64,
    warned_degenerate: bool,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn words(&self) -> &WordIndex {
        &self.words
    }

    pub fn geometry(&self) -> &ImageGeometry {
        &self.geometry
    }

    pub fn selection(&self) -> &Selection {
        self.engine.selection()
    }

    pub fn selection_rect(&self) -> Option<Rect> {
        self.engine.selection_rect()
    }

    pub fn is_dragging(&self) -> bool {
        self.engine.is_dragging()
    }

    /// Whether the copy action should be offered: a drag has been committed and left words selected.
    pub fn can_export(&self) -> bool {
        self.export_enabled && !self.engine.selection().is_empty()
    }

    /// Start a new upload, discarding the current image and invalidating any earlier ticket.
    pub fn begin_upload(&mut self) -> UploadTicket {
        self.generation += 1;
        self.words = WordIndex::default();
        self.geometry = ImageGeometry::default();
        self.warned_degenerate = false;
        self.clear();
        debug!("Upload #{} started", self.generation);
        UploadTicket(self.generation)
    }

    /// Whether `ticket` belongs to the most recently started upload.
    pub fn is_current(&self, ticket: UploadTicket) -> bool {
        ticket.0 == self.generation
    }

    /// Install the words and original size of a finished upload.
    ///
    /// Returns `false` and changes nothing if a newer upload has been started since `ticket` was issued.
    pub fn finish_upload(
        &mut self,
        ticket: UploadTicket,
        words: Vec<Word>,
        original_width: f32,
        original_height: f32,
    ) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Discarding result of upload #{}, #{} is current",
                ticket.0, self.generation
            );
            return false;
        }

        self.clear();
        self.words.load(words);
        self.geometry = ImageGeometry {
            original_width,
            original_height,
            ..Default::default()
        };
        self.warned_degenerate = false;
        info!(
            "Upload #{} applied: {}x{} image with {} words",
            ticket.0,
            original_width,
            original_height,
            self.words.len()
        );
        true
    }

    /// Record the on-screen size of the image.
    pub fn set_rendered_size(&mut self, width: f32, height: f32) {
        if self.geometry.rendered_width == width && self.geometry.rendered_height == height {
            return;
        }

        self.geometry.rendered_width = width;
        self.geometry.rendered_height = height;

        if self.geometry.is_degenerate() {
            if !self.warned_degenerate {
                warn!(
                    "Image geometry is degenerate ({:?}), using a scale of 1",
                    self.geometry
                );
                self.warned_degenerate = true;
            }
        } else {
            self.warned_degenerate = false;
            debug!(
                "Image scale factors: x={} y={}",
                self.geometry.scale_x(),
                self.geometry.scale_y()
            );
        }
    }

    /// Begin a drag. The previous selection is dropped, so export stays off until the drag ends.
    pub fn drag_start(&mut self, at: Point) -> bool {
        let started = self.engine.drag_start(at, &self.words);
        if started {
            self.export_enabled = false;
        }
        started
    }

    /// Returns whether the selection changed.
    pub fn drag_move(&mut self, to: Point) -> bool {
        self.engine.drag_move(to, &self.words, &self.geometry)
    }

    /// Pointer released. Returns whether a drag was finished.
    pub fn drag_end(&mut self) -> bool {
        let finished = self.engine.drag_end();
        if finished {
            self.export_enabled = !self.engine.selection().is_empty();
        }
        finished
    }

    /// The pointer left the image. Finishes a drag in progress exactly like a release.
    pub fn pointer_left(&mut self) -> bool {
        self.drag_end()
    }

    /// Drop the selection and any drag in progress.
    pub fn clear(&mut self) {
        self.engine.reset();
        self.export_enabled = false;
    }

    /// Redraw the highlight overlay. Returns the number of rectangles drawn.
    pub fn render_highlights(&self, surface: &mut impl Surface, colour: [u8; 4]) -> usize {
        highlight::render(
            self.engine.selection(),
            &self.words,
            &self.geometry,
            surface,
            colour,
        )
    }

    pub fn selected_text(&self) -> String {
        export::selected_text(self.engine.selection(), &self.words)
    }

    /// Shortened selected text for display, `None` when nothing is selected.
    pub fn preview(&self, max_chars: usize) -> Option<String> {
        if self.engine.selection().is_empty() {
            return None;
        }
        Some(export::preview(&self.selected_text(), max_chars))
    }

    /// Copy the full selected text. Returns `None` without touching either sink when export is disabled.
    pub fn copy_selection(
        &self,
        primary: &mut dyn CopySink,
        fallback: &mut dyn CopySink,
    ) -> Option<CopyOutcome> {
        if !self.can_export() {
            return None;
        }
        Some(export::copy_with_fallback(
            &self.selected_text(),
            primary,
            fallback,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{export::ClipboardError, word::WordBox};

    fn word(global_index: usize, line_index: usize, text: &str, bbox: [f32; 4]) -> Word {
        Word {
            global_index,
            line_index,
            word_index: 0,
            text: text.to_owned(),
            bbox: WordBox::from(bbox),
        }
    }

    fn loaded_session() -> Session {
        let mut session = Session::new();
        let ticket = session.begin_upload();
        assert!(session.finish_upload(
            ticket,
            vec![
                word(0, 0, "hello", [10.0, 10.0, 20.0, 20.0]),
                word(1, 0, "world", [40.0, 10.0, 20.0, 20.0]),
                word(2, 1, "again", [10.0, 50.0, 20.0, 20.0]),
            ],
            1000.0,
            1000.0,
        ));
        session.set_rendered_size(500.0, 500.0);
        session
    }

    #[derive(Default)]
    struct Sink(Vec<String>);

    impl CopySink for Sink {
        fn name(&self) -> &'static str {
            "test"
        }

        fn copy(&mut self, text: &str) -> Result<(), ClipboardError> {
            self.0.push(text.to_owned());
            Ok(())
        }
    }

    #[test]
    fn drag_over_scaled_image_commits_selection() {
        let mut session = loaded_session();

        // the first two words render at (5, 5, 10, 10) and (20, 5, 10, 10)
        assert!(session.drag_start(Point::new(0.0, 0.0)));
        assert!(session.drag_move(Point::new(22.0, 12.0)));
        assert!(!session.can_export());

        assert!(session.drag_end());
        assert!(session.can_export());
        assert_eq!(session.selection().as_slice(), &[0, 1]);
        assert_eq!(session.selected_text(), "hello world");
        assert_eq!(session.preview(50).as_deref(), Some("hello world"));
    }

    #[test]
    fn pointer_leave_finishes_drag() {
        let mut session = loaded_session();
        session.drag_start(Point::new(0.0, 0.0));
        session.drag_move(Point::new(100.0, 100.0));

        assert!(session.pointer_left());
        assert!(!session.is_dragging());
        assert_eq!(session.selection().len(), 3);
        assert!(session.can_export());
        assert!(!session.pointer_left());
    }

    #[test]
    fn empty_drag_keeps_export_disabled() {
        let mut session = loaded_session();
        session.drag_start(Point::new(200.0, 200.0));
        session.drag_move(Point::new(210.0, 210.0));
        session.drag_end();

        assert!(!session.can_export());
        assert_eq!(session.preview(50), None);
        let mut primary = Sink::default();
        let mut fallback = Sink::default();
        assert_eq!(session.copy_selection(&mut primary, &mut fallback), None);
        assert!(primary.0.is_empty());
    }

    #[test]
    fn new_upload_during_drag_resets_everything() {
        let mut session = loaded_session();
        session.drag_start(Point::new(0.0, 0.0));
        session.drag_move(Point::new(100.0, 100.0));

        session.begin_upload();

        assert!(!session.is_dragging());
        assert!(session.selection().is_empty());
        assert_eq!(session.selection_rect(), None);
        assert!(!session.can_export());
        assert!(session.words().is_empty());
        assert!(!session.drag_start(Point::new(0.0, 0.0)));
    }

    #[test]
    fn stale_upload_result_is_discarded() {
        let mut session = Session::new();
        let slow = session.begin_upload();
        let fast = session.begin_upload();

        assert!(session.finish_upload(fast, vec![word(0, 0, "new", [0.0, 0.0, 5.0, 5.0])], 10.0, 10.0));
        assert!(!session.finish_upload(slow, vec![word(0, 0, "old", [0.0, 0.0, 5.0, 5.0])], 20.0, 20.0));

        assert_eq!(session.words().find_by_index(0).unwrap().text, "new");
        assert_eq!(session.geometry().original_width, 10.0);
        assert!(!session.is_current(slow));
    }

    #[test]
    fn unmeasured_image_maps_with_identity() {
        let mut session = Session::new();
        let ticket = session.begin_upload();
        session.finish_upload(ticket, vec![word(0, 0, "a", [100.0, 100.0, 10.0, 10.0])], 1000.0, 1000.0);
        session.set_rendered_size(0.0, 0.0);

        session.drag_start(Point::new(95.0, 95.0));
        session.drag_move(Point::new(101.0, 101.0));
        assert_eq!(session.selection().as_slice(), &[0]);
    }

    #[test]
    fn copy_sends_full_text_to_primary() {
        let mut session = loaded_session();
        session.drag_start(Point::new(0.0, 0.0));
        session.drag_move(Point::new(100.0, 100.0));
        session.drag_end();

        let mut primary = Sink::default();
        let mut fallback = Sink::default();
        let outcome = session.copy_selection(&mut primary, &mut fallback).unwrap();

        assert!(outcome.succeeded);
        assert!(!outcome.used_fallback);
        assert_eq!(primary.0, vec!["hello world again".to_owned()]);
    }

    #[test]
    fn new_drag_withdraws_committed_export() {
        let mut session = loaded_session();
        session.drag_start(Point::new(0.0, 0.0));
        session.drag_move(Point::new(12.0, 12.0));
        session.drag_end();
        assert!(session.can_export());

        assert!(session.drag_start(Point::new(90.0, 90.0)));
        assert!(session.selection().is_empty());
        assert!(!session.can_export());

        let mut primary = Sink::default();
        let mut fallback = Sink::default();
        assert_eq!(session.copy_selection(&mut primary, &mut fallback), None);
        assert!(primary.0.is_empty());
        assert!(fallback.0.is_empty());
    }

    #[test]
    fn live_selection_is_not_exportable_until_release() {
        let mut session = loaded_session();
        session.drag_start(Point::new(200.0, 200.0));
        session.drag_end();
        assert!(!session.can_export());

        session.drag_start(Point::new(0.0, 0.0));
        session.drag_move(Point::new(100.0, 100.0));
        assert_eq!(session.selection().len(), 3);
        assert!(!session.can_export());

        let mut primary = Sink::default();
        let mut fallback = Sink::default();
        assert_eq!(session.copy_selection(&mut primary, &mut fallback), None);

        session.drag_end();
        assert!(session.can_export());
        let outcome = session.copy_selection(&mut primary, &mut fallback).unwrap();
        assert!(outcome.succeeded);
        assert_eq!(primary.0, vec!["hello world again".to_owned()]);
    }

    #[test]
    fn clear_disables_export() {
        let mut session = loaded_session();
        session.drag_start(Point::new(0.0, 0.0));
        session.drag_move(Point::new(100.0, 100.0));
        session.drag_end();

        session.clear();
        assert!(session.selection().is_empty());
        assert!(!session.can_export());
        assert_eq!(session.words().len(), 3);
    }
}
