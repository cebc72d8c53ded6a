/// Opaque handle for a letter token, stable for the token's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u64);

/// Lifecycle of a token: `Spawned -> Dragging -> {PlacedCorrect | Spawned}`,
/// with `Retired` for tokens removed from play. Only a `Dragging` token can
/// resolve a drop; `PlacedCorrect` and `Retired` are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TokenState {
    Spawned,
    Dragging,
    PlacedCorrect,
    Retired,
}

/// Why a token left the live set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RetireReason {
    Placed,
    ReturnedToPool,
}

/// One unplaced letter instance in play. `word_index` binds the token to
/// exactly one goal slot; duplicate letters in a word are distinguished by
/// index, never by character.
///
/// Position and velocity are the physics attachment; placement logic reads
/// only `word_index`, `ch` and `state`.
#[derive(Clone, Debug)]
pub struct LetterToken {
    pub id: TokenId,
    pub ch: char,
    pub word_index: usize,
    pub state: TokenState,
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    /// Engine clock at spawn, for time-to-place analytics.
    pub spawned_at: f64,
}

impl LetterToken {
    /// Live tokens occupy their word index; placed and retired ones do not.
    pub fn is_live(&self) -> bool {
        matches!(self.state, TokenState::Spawned | TokenState::Dragging)
    }

    pub fn is_draggable(&self) -> bool {
        self.state == TokenState::Spawned
    }
}
