use crate::board::{FillResult, GoalBoard};
use crate::config::GameConfig;
use crate::spawner::TokenSpawner;
use crate::token::{RetireReason, TokenId, TokenState};

/// Where a drop landed after classification.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropTarget {
    Goal(usize),
    PlayArea,
    Outside,
}

/// Result of resolving a drag-release.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropOutcome {
    /// Verified placement into the token's own slot; terminal for the token.
    Correct { word_index: usize },
    /// Wrong goal, already-filled goal, or off-board: the token is returned
    /// to the free-play area and stays interactable.
    Incorrect,
    /// Released over open play space; repositioned, no scoring effect.
    FreePlay,
    /// The token was missing or not in a droppable state; nothing happened.
    Ignored,
}

/// Slot hit-regions plus the free-play rectangle for the current word.
/// Rebuilt whenever the word (and therefore the slot count) changes.
#[derive(Clone, Debug, Default)]
pub struct BoardGeometry {
    goal_centers: Vec<(f64, f64)>,
    hit_radius: f64,
    width: f64,
    height: f64,
}

impl BoardGeometry {
    /// Goal centers are spread evenly along the goal row; everything inside
    /// the board rectangle that is not a goal is free-play space.
    pub fn for_word_len(config: &GameConfig, len: usize) -> Self {
        let spacing = config.play_width / (len as f64 + 1.0);
        let goal_centers = (1..=len)
            .map(|i| (spacing * i as f64, config.goal_row_y))
            .collect();
        Self {
            goal_centers,
            hit_radius: config.goal_hit_radius,
            width: config.play_width,
            height: config.play_height,
        }
    }

    pub fn goal_center(&self, index: usize) -> Option<(f64, f64)> {
        self.goal_centers.get(index).copied()
    }

    pub fn goal_count(&self) -> usize {
        self.goal_centers.len()
    }

    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Where fresh tokens enter: above the board, over the center, so they
    /// drop into view.
    pub fn spawn_point(&self) -> (f64, f64) {
        (self.width / 2.0, -40.0)
    }

    pub fn play_center(&self) -> (f64, f64) {
        (self.width / 2.0, self.height * 0.6)
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= 0.0 && x <= self.width && y >= 0.0 && y <= self.height
    }

    pub fn clamp_to_play(&self, x: f64, y: f64) -> (f64, f64) {
        (x.clamp(0.0, self.width), y.clamp(0.0, self.height))
    }

    /// Is the point loitering inside some goal's hit-region? Physics uses
    /// this to repel idle tokens out of the goals.
    pub fn in_any_goal(&self, x: f64, y: f64) -> bool {
        self.nearest_goal(x, y).is_some()
    }

    fn nearest_goal(&self, x: f64, y: f64) -> Option<usize> {
        self.goal_centers
            .iter()
            .enumerate()
            .map(|(i, &(gx, gy))| (i, (gx - x).powi(2) + (gy - y).powi(2)))
            .filter(|&(_, d2)| d2 <= self.hit_radius * self.hit_radius)
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(i, _)| i)
    }

    /// Classify a drop point: a specific goal's hit-region wins over the
    /// general play area; anything else is off-board.
    pub fn classify(&self, x: f64, y: f64) -> DropTarget {
        if let Some(index) = self.nearest_goal(x, y) {
            return DropTarget::Goal(index);
        }
        if self.contains(x, y) {
            return DropTarget::PlayArea;
        }
        DropTarget::Outside
    }
}

/// Resolves drag-releases against the board and drives the resulting token
/// and slot transitions. Holds no state of its own.
#[derive(Debug, Default)]
pub struct PlacementController;

impl PlacementController {
    /// Resolve a drag-release at `(x, y)`. Atomic with respect to board
    /// state: the fill check and the fill write happen in one call, with no
    /// suspension in between.
    ///
    /// Only a genuine match — the slot whose index equals the token's
    /// `word_index`, unfilled, with the expected character — is terminal for
    /// the token. Every other goal drop shares the incorrect-drop recovery:
    /// the token goes back to the play area and stays draggable.
    pub fn resolve_drop(
        &self,
        board: &mut GoalBoard,
        spawner: &mut TokenSpawner,
        geometry: &BoardGeometry,
        id: TokenId,
        x: f64,
        y: f64,
    ) -> DropOutcome {
        let Some(token) = spawner.get(id) else {
            return DropOutcome::Ignored;
        };
        if token.state != TokenState::Dragging {
            return DropOutcome::Ignored;
        }
        let (word_index, ch) = (token.word_index, token.ch);

        match geometry.classify(x, y) {
            DropTarget::Goal(slot_index) if slot_index == word_index => {
                match board.try_fill(word_index, ch) {
                    FillResult::Correct => {
                        let (gx, gy) = geometry
                            .goal_center(slot_index)
                            .unwrap_or_else(|| geometry.play_center());
                        if let Some(t) = spawner.get_mut(id) {
                            t.x = gx;
                            t.y = gy;
                            t.vel_x = 0.0;
                            t.vel_y = 0.0;
                        }
                        spawner.retire(id, RetireReason::Placed);
                        DropOutcome::Correct { word_index }
                    }
                    FillResult::AlreadyFilled | FillResult::Mismatch => {
                        self.return_to_play(spawner, geometry, id)
                    }
                }
            }
            // A goal bound to a different letter position.
            DropTarget::Goal(_) => self.return_to_play(spawner, geometry, id),
            DropTarget::PlayArea => {
                let (px, py) = geometry.clamp_to_play(x, y);
                spawner.release(id);
                if let Some(t) = spawner.get_mut(id) {
                    t.x = px;
                    t.y = py;
                }
                DropOutcome::FreePlay
            }
            // Unresolvable location: recover exactly like a wrong goal so
            // tokens never strand off-board.
            DropTarget::Outside => self.return_to_play(spawner, geometry, id),
        }
    }

    fn return_to_play(
        &self,
        spawner: &mut TokenSpawner,
        geometry: &BoardGeometry,
        id: TokenId,
    ) -> DropOutcome {
        let (cx, cy) = geometry.play_center();
        spawner.release(id);
        if let Some(t) = spawner.get_mut(id) {
            t.x = cx;
            t.y = cy;
            t.vel_x = 0.0;
            t.vel_y = 0.0;
        }
        DropOutcome::Incorrect
    }
}
