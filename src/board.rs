/// Outcome of a fill attempt against one goal slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillResult {
    Correct,
    /// The slot was already filled; rejected so nothing double-counts.
    AlreadyFilled,
    /// The character does not match the slot. `word_index` binds 1:1 to the
    /// expected character, so this is a diagnostic outcome rather than a
    /// normal game result.
    Mismatch,
}

/// A fixed goal position expecting one specific letter at one word index.
#[derive(Clone, Debug, PartialEq)]
pub struct GoalSlot {
    pub index: usize,
    pub expected: char,
    pub filled: bool,
}

/// The ordered goal slots for the current word, one per letter. Rebuilt from
/// scratch whenever the word changes.
#[derive(Debug, Default)]
pub struct GoalBoard {
    word: String,
    slots: Vec<GoalSlot>,
}

impl GoalBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all slots with one unfilled slot per character of `word`.
    pub fn build(&mut self, word: &str) {
        self.word = word.to_string();
        self.slots = word
            .chars()
            .enumerate()
            .map(|(index, expected)| GoalSlot {
                index,
                expected,
                filled: false,
            })
            .collect();
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn slots(&self) -> &[GoalSlot] {
        &self.slots
    }

    pub fn expected(&self, index: usize) -> Option<char> {
        self.slots.get(index).map(|s| s.expected)
    }

    pub fn is_filled(&self, index: usize) -> bool {
        self.slots.get(index).is_some_and(|s| s.filled)
    }

    /// Attempt to fill the slot at `word_index` with `ch`. Filling an
    /// already-filled slot is rejected idempotently; a character mismatch is
    /// reported as a diagnostic but asserted against in debug builds, since
    /// callers derive `ch` from the same word the slots were built from.
    pub fn try_fill(&mut self, word_index: usize, ch: char) -> FillResult {
        let Some(slot) = self.slots.get_mut(word_index) else {
            debug_assert!(false, "fill index {word_index} out of range");
            return FillResult::Mismatch;
        };
        if slot.filled {
            return FillResult::AlreadyFilled;
        }
        if slot.expected != ch {
            debug_assert!(
                false,
                "token char {ch:?} does not match slot {word_index} ({:?})",
                slot.expected
            );
            return FillResult::Mismatch;
        }
        slot.filled = true;
        FillResult::Correct
    }

    pub fn is_complete(&self) -> bool {
        !self.slots.is_empty() && self.slots.iter().all(|s| s.filled)
    }

    pub fn unfilled_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.slots
            .iter()
            .filter(|s| !s.filled)
            .map(|s| s.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_creates_one_slot_per_letter() {
        let mut board = GoalBoard::new();
        board.build("cat");

        assert_eq!(board.len(), 3);
        assert_eq!(board.expected(0), Some('c'));
        assert_eq!(board.expected(1), Some('a'));
        assert_eq!(board.expected(2), Some('t'));
        assert!(!board.is_complete());
    }

    #[test]
    fn test_try_fill_correct() {
        let mut board = GoalBoard::new();
        board.build("cat");

        assert_eq!(board.try_fill(0, 'c'), FillResult::Correct);
        assert!(board.is_filled(0));
        assert!(!board.is_filled(1));
    }

    #[test]
    fn test_try_fill_already_filled_is_idempotent_rejection() {
        let mut board = GoalBoard::new();
        board.build("cat");

        assert_eq!(board.try_fill(1, 'a'), FillResult::Correct);
        assert_eq!(board.try_fill(1, 'a'), FillResult::AlreadyFilled);
        assert!(board.is_filled(1));
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn test_try_fill_mismatch_release() {
        let mut board = GoalBoard::new();
        board.build("cat");

        assert_eq!(board.try_fill(0, 'x'), FillResult::Mismatch);
        assert!(!board.is_filled(0));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not match slot")]
    fn test_try_fill_mismatch_asserts_in_debug() {
        let mut board = GoalBoard::new();
        board.build("cat");
        board.try_fill(0, 'x');
    }

    #[test]
    fn test_completion_after_each_letter_placed_once() {
        let mut board = GoalBoard::new();
        board.build("cat");

        for (i, ch) in "cat".chars().enumerate() {
            assert!(!board.is_complete());
            assert_eq!(board.try_fill(i, ch), FillResult::Correct);
        }
        assert!(board.is_complete());
    }

    #[test]
    fn test_duplicate_letters_fill_independently() {
        let mut board = GoalBoard::new();
        board.build("apple");

        // Both 'p' slots must fill at their own index, not by character.
        assert_eq!(board.try_fill(1, 'p'), FillResult::Correct);
        assert!(!board.is_filled(2));
        assert_eq!(board.try_fill(2, 'p'), FillResult::Correct);
        assert_eq!(board.try_fill(2, 'p'), FillResult::AlreadyFilled);
    }

    #[test]
    fn test_unfilled_indices_shrink_as_slots_fill() {
        let mut board = GoalBoard::new();
        board.build("dog");

        assert_eq!(board.unfilled_indices().collect::<Vec<_>>(), vec![0, 1, 2]);
        board.try_fill(1, 'o');
        assert_eq!(board.unfilled_indices().collect::<Vec<_>>(), vec![0, 2]);
    }

    #[test]
    fn test_rebuild_replaces_previous_slots() {
        let mut board = GoalBoard::new();
        board.build("cat");
        board.try_fill(0, 'c');

        board.build("dog");
        assert_eq!(board.len(), 3);
        assert!(!board.is_filled(0));
        assert_eq!(board.word(), "dog");
    }

    #[test]
    fn test_empty_board_is_not_complete() {
        let board = GoalBoard::new();
        assert!(!board.is_complete());
    }
}
