use log::warn;

use crate::word::Word;

/// All words recognised on the current image, ordered by `global_index`.
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    words: Vec<Word>,
}

impl WordIndex {
    /// Build an index from backend output. See [`WordIndex::load`] for the filtering rules.
    pub fn new(words: Vec<Word>) -> Self {
        let mut index = Self::default();
        index.load(words);
        index
    }

    /// Replace the whole index.
    ///
    /// Words with blank text or a negative size are dropped, and only the first word for each
    /// `global_index` is kept. The new set is built completely before it replaces the old one.
    pub fn load(&mut self, words: Vec<Word>) {
        let mut words: Vec<Word> = words
            .into_iter()
            .filter(|word| {
                let keep = !word.text.trim().is_empty()
                    && word.bbox.width >= 0.0
                    && word.bbox.height >= 0.0;
                if !keep {
                    warn!(
                        "Dropping unusable OCR word #{} ({:?}, {:?})",
                        word.global_index, word.text, word.bbox
                    );
                }
                keep
            })
            .collect();

        // stable, so the first occurrence of a duplicate id survives dedup
        words.sort_by_key(|word| word.global_index);
        let before = words.len();
        words.dedup_by_key(|word| word.global_index);
        if words.len() != before {
            warn!(
                "Dropped {} OCR words with duplicate global indices",
                before - words.len()
            );
        }

        self.words = words;
    }

    pub fn find_by_index(&self, global_index: usize) -> Option<&Word> {
        self.words
            .binary_search_by_key(&global_index, |word| word.global_index)
            .ok()
            .map(|position| &self.words[position])
    }

    /// Every word, in ascending `global_index` order.
    pub fn all(&self) -> &[Word] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}
