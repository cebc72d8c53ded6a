use crate::catalog::Word;
use crate::token::{RetireReason, TokenId};

/// Notifications queued by the engine for the presentation layer, drained in
/// order through `Engine::drain_events`. An explicit queue between the two
/// layers; no scene-wide listener registration.
#[derive(Clone, Debug, PartialEq)]
pub enum GameEvent {
    /// A new current word was established and its board built.
    WordSelected(Word),
    TokenSpawned {
        id: TokenId,
        ch: char,
        word_index: usize,
    },
    TokenRetired {
        id: TokenId,
        reason: RetireReason,
    },
    CorrectPlacement {
        word_index: usize,
    },
    IncorrectPlacement,
    WordCompleted(Word),
    SessionComplete,
}
