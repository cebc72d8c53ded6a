use crate::board::GoalBoard;
use crate::catalog::{Word, WordCatalog, WordSampler};
use crate::config::GameConfig;
use crate::events::GameEvent;
use crate::physics::{Physics, TOKEN_RADIUS};
use crate::placement::{BoardGeometry, DropOutcome, PlacementController};
use crate::scheduler::{Deferred, Scheduler};
use crate::score::ScoreTracker;
use crate::session::{CompletionOutcome, SessionError, SessionManager};
use crate::spawner::TokenSpawner;
use crate::stats::{LetterStatsDb, PlacementStat};
use crate::token::{LetterToken, RetireReason, TokenId, TokenState};
use chrono::Local;
use rand::Rng;
use std::collections::VecDeque;

#[derive(Clone, Copy, Debug)]
struct DragState {
    id: TokenId,
    target_x: f64,
    target_y: f64,
}

/// The composition root. Owns every component, consumes the input-layer
/// commands, and queues `GameEvent`s for presentation to drain.
///
/// Single-threaded and tick-driven: input commands and `tick` calls arrive
/// from one loop, drop resolution never suspends mid-operation, and all
/// waits are scheduler entries rather than blocking calls.
pub struct Engine {
    config: GameConfig,
    catalog: WordCatalog,
    session: SessionManager,
    board: GoalBoard,
    spawner: TokenSpawner,
    placement: PlacementController,
    score: ScoreTracker,
    scheduler: Scheduler,
    physics: Physics,
    geometry: BoardGeometry,
    events: VecDeque<GameEvent>,
    drag: Option<DragState>,
    stats_db: Option<LetterStatsDb>,
}

impl Engine {
    pub fn new(catalog: WordCatalog, config: GameConfig) -> Self {
        let stats_db = LetterStatsDb::new().ok();
        Self::with_stats_db(catalog, config, stats_db)
    }

    /// Engine without analytics persistence; used by headless tests.
    pub fn without_stats(catalog: WordCatalog, config: GameConfig) -> Self {
        Self::with_stats_db(catalog, config, None)
    }

    fn with_stats_db(
        catalog: WordCatalog,
        config: GameConfig,
        stats_db: Option<LetterStatsDb>,
    ) -> Self {
        Self {
            session: SessionManager::new(config.active_set_limit),
            score: ScoreTracker::new(config.progress_mode),
            physics: Physics::new(&config),
            board: GoalBoard::new(),
            spawner: TokenSpawner::new(),
            placement: PlacementController,
            scheduler: Scheduler::new(),
            geometry: BoardGeometry::default(),
            events: VecDeque::new(),
            drag: None,
            stats_db,
            catalog,
            config,
        }
    }

    // ---- commands -------------------------------------------------------

    /// Start a fresh session and select its first word.
    pub fn start_session(
        &mut self,
        sampler: &dyn WordSampler,
        language: Option<&str>,
        count: usize,
    ) -> Result<(), SessionError> {
        self.session
            .start_session(&self.catalog, sampler, language, count)?;

        let session = self.session.session().expect("session just started");
        self.score.start(session.total_letters(), session.total_words());
        self.select_current_word();
        Ok(())
    }

    /// Attempt to spawn one token now. No-op when the cap is reached, the
    /// board isn't ready, or every index is covered; the spawn scheduler
    /// retries on later ticks.
    pub fn request_spawn(&mut self) {
        let (sx, sy) = self.geometry.spawn_point();
        let now = self.scheduler.now();
        if let Some(id) = self.spawner.spawn(&self.board, sx, sy, now) {
            let token = self.spawner.get(id).expect("token just spawned");
            self.events.push_back(GameEvent::TokenSpawned {
                id,
                ch: token.ch,
                word_index: token.word_index,
            });
        }
    }

    /// Begin dragging a token. False when it isn't draggable (already
    /// dragged, placed, or gone). One pointer: starting a new drag releases
    /// any token left mid-drag.
    pub fn begin_drag(&mut self, id: TokenId) -> bool {
        if let Some(prev) = self.drag.take() {
            if prev.id != id {
                self.spawner.release(prev.id);
            }
        }
        if !self.spawner.begin_drag(id) {
            return false;
        }
        let token = self.spawner.get(id).expect("token exists");
        self.drag = Some(DragState {
            id,
            target_x: token.x,
            target_y: token.y,
        });
        true
    }

    /// Update the pointer target the dragged token is pulled toward.
    /// Physics-only; no game state changes until the release.
    pub fn drag_to(&mut self, id: TokenId, x: f64, y: f64) {
        if let Some(drag) = self.drag.as_mut() {
            if drag.id == id {
                drag.target_x = x;
                drag.target_y = y;
            }
        }
    }

    /// Resolve a drag-release at `(x, y)`.
    pub fn end_drag(&mut self, id: TokenId, x: f64, y: f64) {
        if self.drag.map(|d| d.id) == Some(id) {
            self.drag = None;
        }

        let dropped = self
            .spawner
            .get(id)
            .map(|t| (t.ch, t.spawned_at, self.board.word().to_string()));

        let outcome =
            self.placement
                .resolve_drop(&mut self.board, &mut self.spawner, &self.geometry, id, x, y);

        match outcome {
            DropOutcome::Correct { word_index } => {
                self.score.on_correct_placement();
                self.record_attempt(dropped, true);
                self.events
                    .push_back(GameEvent::CorrectPlacement { word_index });
                self.events.push_back(GameEvent::TokenRetired {
                    id,
                    reason: RetireReason::Placed,
                });
                self.scheduler
                    .schedule_in(self.config.placement_spawn_delay, Deferred::Spawn);
                self.check_word_completion();
            }
            DropOutcome::Incorrect => {
                self.score.on_incorrect_placement();
                self.record_attempt(dropped, false);
                self.events.push_back(GameEvent::IncorrectPlacement);
            }
            DropOutcome::FreePlay | DropOutcome::Ignored => {}
        }
    }

    /// Clear a completed word's board and move on to the next word (or the
    /// end of the session). Fired by the word-clear timer; also available to
    /// the input layer as a "skip the pause" command. No-op while the
    /// current board is unfinished.
    pub fn advance_session(&mut self) {
        if !self.board.is_complete() {
            return;
        }
        self.select_current_word();
    }

    /// Advance the engine clock: fire due timers, expire stale tokens, and
    /// integrate motion. Position updates never mutate fill or placement
    /// state, so ticking cannot race a drop resolution.
    pub fn tick(&mut self, dt: f64) {
        for action in self.scheduler.advance(dt) {
            match action {
                Deferred::Spawn => self.request_spawn(),
                Deferred::AdvanceWord => self.advance_session(),
            }
        }

        self.expire_tokens();

        let drag = self.drag.map(|d| (d.id, d.target_x, d.target_y));
        self.physics.step(&mut self.spawner, &self.geometry, drag, dt);
    }

    /// Drain queued events, oldest first.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain(..).collect()
    }

    // ---- views ----------------------------------------------------------

    pub fn board(&self) -> &GoalBoard {
        &self.board
    }

    pub fn geometry(&self) -> &BoardGeometry {
        &self.geometry
    }

    pub fn score(&self) -> &ScoreTracker {
        &self.score
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn current_word(&self) -> Option<&Word> {
        self.session.current_word()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &LetterToken> {
        self.spawner.tokens()
    }

    pub fn live_token_for_index(&self, word_index: usize) -> Option<TokenId> {
        self.spawner.live_token_for_index(word_index)
    }

    /// Hit-test a press against the live tokens, for the input layer.
    pub fn pick_token(&self, x: f64, y: f64) -> Option<TokenId> {
        self.spawner.token_at(x, y, TOKEN_RADIUS * 1.4)
    }

    pub fn letter_summary(&self) -> Option<Vec<crate::stats::LetterSummary>> {
        self.stats_db.as_ref().and_then(|db| db.letter_summary().ok())
    }

    // ---- internals ------------------------------------------------------

    /// Tear down the old word's board, tokens and timers, then build the
    /// next word's. The generation bump precedes everything else so no
    /// pending timer can resurrect tokens for the retired word.
    fn select_current_word(&mut self) {
        self.drag = None;
        self.scheduler.bump_generation();
        self.spawner.reset();

        let Some(word) = self.session.current_word().cloned() else {
            self.board = GoalBoard::new();
            self.geometry = BoardGeometry::default();
            return;
        };

        self.board.build(&word.text);
        self.geometry = BoardGeometry::for_word_len(&self.config, self.board.len());
        let cap = self.config.token_cap(self.board.len());
        self.spawner.configure(cap);

        // Stagger the initial spawns so tokens trickle in.
        let mut rng = rand::thread_rng();
        let mut delay = 0.0;
        for _ in 0..cap {
            delay += rng.gen_range(self.config.spawn_stagger_min..self.config.spawn_stagger_max);
            self.scheduler.schedule_in(delay, Deferred::Spawn);
        }

        self.events.push_back(GameEvent::WordSelected(word));
    }

    fn check_word_completion(&mut self) {
        if !self.board.is_complete() {
            return;
        }

        let Some(word) = self.session.current_word().cloned() else {
            return;
        };
        debug_assert_eq!(word.text, self.board.word());

        self.events.push_back(GameEvent::WordCompleted(word.clone()));
        self.score.on_word_completed();

        let outcome = self.session.complete_word(&word.text);
        self.scheduler
            .schedule_in(self.config.word_clear_delay, Deferred::AdvanceWord);

        let finished = outcome == CompletionOutcome::SessionComplete
            || self.score.progress_ratio() >= 1.0;
        if finished && self.score.try_signal_session_complete() {
            self.events.push_back(GameEvent::SessionComplete);
            let language = word.language.clone();
            let _ = self.score.save_session_log(&language);
        }
    }

    /// Retire tokens that outlived their lifespan and queue replacements.
    /// Dragged tokens are left alone.
    fn expire_tokens(&mut self) {
        let now = self.scheduler.now();
        let lifespan = self.config.token_lifespan;
        let expired: Vec<TokenId> = self
            .spawner
            .tokens()
            .filter(|t| t.state == TokenState::Spawned && now - t.spawned_at > lifespan)
            .map(|t| t.id)
            .collect();

        for id in expired {
            self.spawner.retire(id, RetireReason::ReturnedToPool);
            self.events.push_back(GameEvent::TokenRetired {
                id,
                reason: RetireReason::ReturnedToPool,
            });
            self.scheduler
                .schedule_in(self.config.respawn_delay, Deferred::Spawn);
        }
    }

    fn record_attempt(&mut self, dropped: Option<(char, f64, String)>, was_correct: bool) {
        let Some(db) = self.stats_db.as_ref() else {
            return;
        };
        let Some((letter, spawned_at, word)) = dropped else {
            return;
        };
        let elapsed = (self.scheduler.now() - spawned_at).max(0.0);
        let stat = PlacementStat {
            letter,
            was_correct,
            time_to_place_ms: (elapsed * 1000.0) as u64,
            word,
            timestamp: Local::now(),
        };
        let _ = db.record_attempt(&stat);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{RandomSampler, WordEntry, WordList};
    use crate::config::ProgressMode;

    fn catalog_of(words: &[&str]) -> WordCatalog {
        WordCatalog::from_lists(vec![WordList {
            language: "english".into(),
            name: "english".into(),
            words: words
                .iter()
                .map(|w| WordEntry {
                    text: w.to_string(),
                    category: None,
                    image: None,
                    audio: None,
                })
                .collect(),
        }])
    }

    fn engine_for(words: &[&str]) -> Engine {
        let mut engine = Engine::without_stats(catalog_of(words), GameConfig::default());
        engine
            .start_session(&RandomSampler, Some("english"), words.len())
            .unwrap();
        engine
    }

    /// Spawn every remaining token immediately, bypassing the stagger.
    fn spawn_all(engine: &mut Engine) {
        for _ in 0..engine.board().len() {
            engine.request_spawn();
        }
    }

    fn drop_on_slot(engine: &mut Engine, word_index: usize, slot: usize) {
        let id = engine.live_token_for_index(word_index).unwrap();
        assert!(engine.begin_drag(id));
        let (gx, gy) = engine.geometry().goal_center(slot).unwrap();
        engine.drag_to(id, gx, gy);
        engine.end_drag(id, gx, gy);
    }

    #[test]
    fn test_start_session_selects_word_and_builds_board() {
        let mut engine = engine_for(&["cat"]);
        let events = engine.drain_events();

        assert!(matches!(events[0], GameEvent::WordSelected(_)));
        assert_eq!(engine.board().len(), 3);
        assert_eq!(engine.current_word().unwrap().text, "cat");
    }

    #[test]
    fn test_empty_catalog_surfaces_error() {
        let mut engine =
            Engine::without_stats(WordCatalog::from_lists(vec![]), GameConfig::default());
        let result = engine.start_session(&RandomSampler, Some("english"), 3);
        assert_eq!(result, Err(SessionError::EmptyCatalog));
    }

    #[test]
    fn test_staggered_spawns_fire_over_time() {
        let mut engine = engine_for(&["cat"]);
        engine.drain_events();

        assert_eq!(engine.tokens().count(), 0);
        for _ in 0..60 {
            engine.tick(0.1);
        }
        assert_eq!(
            engine.tokens().filter(|t| t.is_live()).count(),
            3,
            "all three tokens spawned by the stagger timers"
        );
    }

    #[test]
    fn test_correct_placement_flow() {
        let mut engine = engine_for(&["cat"]);
        spawn_all(&mut engine);
        engine.drain_events();

        drop_on_slot(&mut engine, 0, 0);
        let events = engine.drain_events();

        assert!(events.contains(&GameEvent::CorrectPlacement { word_index: 0 }));
        assert!(engine.board().is_filled(0));
        assert!((engine.score().progress_ratio() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_wrong_slot_emits_incorrect_and_keeps_token() {
        let mut engine = engine_for(&["cat"]);
        spawn_all(&mut engine);
        engine.drain_events();

        drop_on_slot(&mut engine, 0, 1);
        let events = engine.drain_events();

        assert!(events.contains(&GameEvent::IncorrectPlacement));
        assert!(!engine.board().is_filled(1));
        let id = engine.live_token_for_index(0).unwrap();
        assert!(engine.begin_drag(id), "token stays draggable");
    }

    #[test]
    fn test_new_drag_releases_a_stranded_one() {
        let mut engine = engine_for(&["cat"]);
        spawn_all(&mut engine);

        let first = engine.live_token_for_index(0).unwrap();
        let second = engine.live_token_for_index(1).unwrap();
        assert!(engine.begin_drag(first));
        assert!(engine.begin_drag(second));

        let first = engine.tokens().find(|t| t.id == first).unwrap();
        assert_eq!(first.state, TokenState::Spawned, "previous drag released");
    }

    #[test]
    fn test_word_completion_fires_once_and_schedules_advance() {
        let mut engine = engine_for(&["cat", "dog"]);
        spawn_all(&mut engine);
        engine.drain_events();

        for i in 0..3 {
            drop_on_slot(&mut engine, i, i);
        }
        let events = engine.drain_events();
        let completions = events
            .iter()
            .filter(|e| matches!(e, GameEvent::WordCompleted(_)))
            .count();
        assert_eq!(completions, 1);
        assert!(!events.contains(&GameEvent::SessionComplete));

        // The word-clear timer selects the next word.
        for _ in 0..30 {
            engine.tick(0.1);
        }
        let events = engine.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::WordSelected(_))));
        assert!(!engine.board().is_complete());
    }

    #[test]
    fn test_two_word_session_completes_exactly_once() {
        let mut engine = engine_for(&["cat", "dog"]);
        engine.drain_events();

        let mut session_completes = 0;
        for _ in 0..2 {
            spawn_all(&mut engine);
            let len = engine.board().len();
            for i in 0..len {
                drop_on_slot(&mut engine, i, i);
            }
            session_completes += engine
                .drain_events()
                .iter()
                .filter(|e| **e == GameEvent::SessionComplete)
                .count();
            for _ in 0..30 {
                engine.tick(0.1);
            }
            engine.drain_events();
        }

        assert_eq!(session_completes, 1);
        assert!(engine.session().is_complete());
        assert!(engine.board().is_empty(), "board cleared after the session");
    }

    #[test]
    fn test_word_progress_in_words_mode() {
        let config = GameConfig {
            progress_mode: ProgressMode::Words,
            ..GameConfig::default()
        };
        let mut engine = Engine::without_stats(catalog_of(&["cat", "dog"]), config);
        engine
            .start_session(&RandomSampler, Some("english"), 2)
            .unwrap();

        spawn_all(&mut engine);
        for i in 0..3 {
            drop_on_slot(&mut engine, i, i);
        }
        assert_eq!(engine.score().progress_ratio(), 0.5);
    }

    #[test]
    fn test_stale_spawn_timers_die_with_the_word() {
        let mut engine = engine_for(&["cat", "dog"]);
        spawn_all(&mut engine);
        engine.drain_events();

        // Placing a letter schedules a respawn; completing the word right
        // after must cancel it.
        for i in 0..3 {
            drop_on_slot(&mut engine, i, i);
        }
        for _ in 0..30 {
            engine.tick(0.1);
        }
        engine.drain_events();

        // All tokens now belong to the new word's board.
        let len = engine.board().len();
        for token in engine.tokens().filter(|t| t.is_live()) {
            assert!(token.word_index < len);
        }
        assert!(
            engine.tokens().filter(|t| t.is_live()).count() <= len,
            "no resurrected tokens from the previous word"
        );
    }

    #[test]
    fn test_expired_tokens_respawn() {
        let config = GameConfig {
            token_lifespan: 0.5,
            respawn_delay: 0.1,
            ..GameConfig::default()
        };
        let mut engine = Engine::without_stats(catalog_of(&["cat"]), config);
        engine
            .start_session(&RandomSampler, Some("english"), 1)
            .unwrap();
        spawn_all(&mut engine);
        engine.drain_events();

        let mut retired = 0;
        let mut respawned = 0;
        for _ in 0..30 {
            engine.tick(0.1);
            for event in engine.drain_events() {
                match event {
                    GameEvent::TokenRetired {
                        reason: RetireReason::ReturnedToPool,
                        ..
                    } => retired += 1,
                    GameEvent::TokenSpawned { .. } => respawned += 1,
                    _ => {}
                }
            }
        }

        assert!(retired > 0, "tokens expired after their lifespan");
        assert!(respawned > 0, "replacements spawned after expiry");
    }

    #[test]
    fn test_accuracy_tracks_attempts() {
        let mut engine = engine_for(&["cat"]);
        spawn_all(&mut engine);

        drop_on_slot(&mut engine, 0, 1); // wrong goal
        drop_on_slot(&mut engine, 0, 0);
        drop_on_slot(&mut engine, 1, 1);
        drop_on_slot(&mut engine, 2, 2);

        assert_eq!(engine.score().accuracy_ratio(), 0.75);
    }

    #[test]
    fn test_free_play_drop_has_no_scoring_effect() {
        let mut engine = engine_for(&["cat"]);
        spawn_all(&mut engine);

        let id = engine.live_token_for_index(0).unwrap();
        engine.begin_drag(id);
        engine.end_drag(id, 400.0, 450.0);

        assert_eq!(engine.score().accuracy_ratio(), 1.0);
        assert_eq!(engine.score().correct_letters(), 0);
        assert_eq!(engine.score().wrong_attempts(), 0);
    }

    #[test]
    fn test_pick_token_resolves_press_to_nearest() {
        let mut engine = engine_for(&["cat"]);
        spawn_all(&mut engine);

        let id = engine.live_token_for_index(1).unwrap();
        let (x, y) = {
            let t = engine.tokens().find(|t| t.id == id).unwrap();
            (t.x, t.y)
        };
        // All tokens spawn at the same point, so picking there returns one
        // of the live tokens.
        assert!(engine.pick_token(x, y).is_some());
    }
}
