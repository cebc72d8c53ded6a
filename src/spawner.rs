use crate::board::GoalBoard;
use crate::token::{LetterToken, RetireReason, TokenId, TokenState};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashMap;

/// Creates, throttles and retires the letter tokens for the current word.
///
/// Invariant: the live tokens' `word_index` values form a subset of the
/// unfilled slot indices, with no duplicates, so two tokens can never race
/// for the same slot.
#[derive(Debug, Default)]
pub struct TokenSpawner {
    max_live: usize,
    next_id: u64,
    tokens: HashMap<TokenId, LetterToken>,
    live_by_index: HashMap<usize, TokenId>,
}

impl TokenSpawner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the concurrent-token cap for the current word. Called alongside
    /// `reset` when the word changes.
    pub fn configure(&mut self, max_live: usize) {
        self.max_live = max_live;
    }

    pub fn live_count(&self) -> usize {
        self.live_by_index.len()
    }

    /// Spawn one token for a uniformly random word index that is neither
    /// filled nor already represented by a live token. No-op when the cap is
    /// reached, the board has no slots yet, or every index is covered;
    /// callers retry on a later tick.
    pub fn spawn(&mut self, board: &GoalBoard, x: f64, y: f64, now: f64) -> Option<TokenId> {
        if self.live_count() >= self.max_live || board.is_empty() {
            return None;
        }

        let mut rng = rand::thread_rng();
        let eligible: Vec<usize> = board
            .unfilled_indices()
            .filter(|i| !self.live_by_index.contains_key(i))
            .collect();
        let word_index = *eligible.choose(&mut rng)?;
        let ch = board.expected(word_index)?;

        let id = TokenId(self.next_id);
        self.next_id += 1;
        self.tokens.insert(
            id,
            LetterToken {
                id,
                ch,
                word_index,
                state: TokenState::Spawned,
                x,
                y,
                // Entry velocity: drop into view from the spawn point.
                vel_x: rng.gen_range(-60.0..60.0),
                vel_y: rng.gen_range(120.0..240.0),
                spawned_at: now,
            },
        );
        self.live_by_index.insert(word_index, id);
        Some(id)
    }

    /// `Spawned -> Dragging`. False when the token is missing or not in a
    /// draggable state.
    pub fn begin_drag(&mut self, id: TokenId) -> bool {
        match self.tokens.get_mut(&id) {
            Some(t) if t.is_draggable() => {
                t.state = TokenState::Dragging;
                true
            }
            _ => false,
        }
    }

    /// `Dragging -> Spawned`: the token stays live and interactable.
    pub fn release(&mut self, id: TokenId) {
        if let Some(t) = self.tokens.get_mut(&id) {
            if t.state == TokenState::Dragging {
                t.state = TokenState::Spawned;
            }
        }
    }

    /// Remove a token from the live set. `Placed` locks it in place for
    /// display; `ReturnedToPool` drops it and frees its word index for a
    /// fresh spawn on a later tick.
    pub fn retire(&mut self, id: TokenId, reason: RetireReason) {
        let Some(token) = self.tokens.get_mut(&id) else {
            return;
        };
        self.live_by_index.remove(&token.word_index);
        match reason {
            RetireReason::Placed => token.state = TokenState::PlacedCorrect,
            RetireReason::ReturnedToPool => {
                token.state = TokenState::Retired;
                self.tokens.remove(&id);
            }
        }
    }

    /// Retire every live token and clear bookkeeping; called when the word
    /// changes.
    pub fn reset(&mut self) {
        self.tokens.clear();
        self.live_by_index.clear();
    }

    pub fn get(&self, id: TokenId) -> Option<&LetterToken> {
        self.tokens.get(&id)
    }

    pub fn get_mut(&mut self, id: TokenId) -> Option<&mut LetterToken> {
        self.tokens.get_mut(&id)
    }

    pub fn live_token_for_index(&self, word_index: usize) -> Option<TokenId> {
        self.live_by_index.get(&word_index).copied()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &LetterToken> {
        self.tokens.values()
    }

    pub fn tokens_mut(&mut self) -> impl Iterator<Item = &mut LetterToken> {
        self.tokens.values_mut()
    }

    /// Nearest live token within `radius` of a point; the input layer uses
    /// this to resolve a press into a drag target.
    pub fn token_at(&self, x: f64, y: f64, radius: f64) -> Option<TokenId> {
        self.tokens
            .values()
            .filter(|t| t.is_live())
            .map(|t| {
                let d2 = (t.x - x).powi(2) + (t.y - y).powi(2);
                (t.id, d2)
            })
            .filter(|&(_, d2)| d2 <= radius * radius)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(id, _)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_for(word: &str) -> GoalBoard {
        let mut board = GoalBoard::new();
        board.build(word);
        board
    }

    fn spawner(cap: usize) -> TokenSpawner {
        let mut s = TokenSpawner::new();
        s.configure(cap);
        s
    }

    #[test]
    fn test_spawn_respects_cap() {
        let board = board_for("cat");
        let mut s = spawner(2);

        assert!(s.spawn(&board, 0.0, 0.0, 0.0).is_some());
        assert!(s.spawn(&board, 0.0, 0.0, 0.0).is_some());
        assert!(s.spawn(&board, 0.0, 0.0, 0.0).is_none(), "cap reached");
        assert_eq!(s.live_count(), 2);
    }

    #[test]
    fn test_spawn_noop_without_board() {
        let board = GoalBoard::new();
        let mut s = spawner(3);
        assert!(s.spawn(&board, 0.0, 0.0, 0.0).is_none());
    }

    #[test]
    fn test_one_live_token_per_index() {
        let board = board_for("apple");
        let mut s = spawner(5);

        let mut indices = Vec::new();
        while let Some(id) = s.spawn(&board, 0.0, 0.0, 0.0) {
            indices.push(s.get(id).unwrap().word_index);
        }

        indices.sort_unstable();
        assert_eq!(indices, vec![0, 1, 2, 3, 4], "every index covered exactly once");
    }

    #[test]
    fn test_spawn_skips_filled_slots() {
        let mut board = board_for("cat");
        board.try_fill(0, 'c');
        let mut s = spawner(3);

        let mut indices = Vec::new();
        while let Some(id) = s.spawn(&board, 0.0, 0.0, 0.0) {
            indices.push(s.get(id).unwrap().word_index);
        }

        indices.sort_unstable();
        assert_eq!(indices, vec![1, 2]);
    }

    #[test]
    fn test_retire_placed_keeps_token_for_display() {
        let board = board_for("cat");
        let mut s = spawner(3);
        let id = s.spawn(&board, 0.0, 0.0, 0.0).unwrap();
        let index = s.get(id).unwrap().word_index;

        s.retire(id, RetireReason::Placed);

        assert_eq!(s.get(id).unwrap().state, TokenState::PlacedCorrect);
        assert_eq!(s.live_token_for_index(index), None);
        assert_eq!(s.live_count(), 0);
    }

    #[test]
    fn test_retire_returned_frees_index_for_respawn() {
        let board = board_for("a");
        let mut s = spawner(1);
        let id = s.spawn(&board, 0.0, 0.0, 0.0).unwrap();

        s.retire(id, RetireReason::ReturnedToPool);
        assert!(s.get(id).is_none());

        let respawned = s.spawn(&board, 0.0, 0.0, 0.0).unwrap();
        assert_eq!(s.get(respawned).unwrap().word_index, 0);
    }

    #[test]
    fn test_drag_state_transitions() {
        let board = board_for("cat");
        let mut s = spawner(3);
        let id = s.spawn(&board, 0.0, 0.0, 0.0).unwrap();

        assert!(s.begin_drag(id));
        assert_eq!(s.get(id).unwrap().state, TokenState::Dragging);
        assert!(!s.begin_drag(id), "already dragging");

        s.release(id);
        assert_eq!(s.get(id).unwrap().state, TokenState::Spawned);
    }

    #[test]
    fn test_reset_clears_everything() {
        let board = board_for("cat");
        let mut s = spawner(3);
        s.spawn(&board, 0.0, 0.0, 0.0);
        s.spawn(&board, 0.0, 0.0, 0.0);

        s.reset();
        assert_eq!(s.live_count(), 0);
        assert_eq!(s.tokens().count(), 0);
    }

    #[test]
    fn test_token_at_picks_nearest_live() {
        let board = board_for("cat");
        let mut s = spawner(3);
        let a = s.spawn(&board, 0.0, 0.0, 0.0).unwrap();
        let b = s.spawn(&board, 100.0, 0.0, 0.0).unwrap();

        assert_eq!(s.token_at(10.0, 0.0, 30.0), Some(a));
        assert_eq!(s.token_at(90.0, 0.0, 30.0), Some(b));
        assert_eq!(s.token_at(500.0, 500.0, 30.0), None);
    }
}
