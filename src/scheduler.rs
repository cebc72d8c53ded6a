/// Deferred engine actions, stored as data so pending work can be inspected
/// and discarded when the board it was scheduled against is gone.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Deferred {
    /// Attempt to spawn one token.
    Spawn,
    /// Clear the completed word and advance the session.
    AdvanceWord,
}

#[derive(Clone, Copy, Debug)]
struct Entry {
    fire_at: f64,
    generation: u64,
    action: Deferred,
}

/// Tick-driven timer queue. Every entry is stamped with the generation
/// current at schedule time; the generation is bumped whenever the word
/// changes, so a timer scheduled against a retired word can never fire
/// against the new word's board.
#[derive(Debug, Default)]
pub struct Scheduler {
    now: f64,
    generation: u64,
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// The engine clock, in seconds since construction.
    pub fn now(&self) -> f64 {
        self.now
    }

    pub fn schedule_in(&mut self, delay: f64, action: Deferred) {
        self.entries.push(Entry {
            fire_at: self.now + delay.max(0.0),
            generation: self.generation,
            action,
        });
    }

    /// Invalidate everything scheduled so far. Entries are also dropped
    /// eagerly so the queue doesn't accumulate stale work.
    pub fn bump_generation(&mut self) {
        self.generation += 1;
        let generation = self.generation;
        self.entries.retain(|e| e.generation == generation);
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Advance the clock and return the actions that came due, in firing
    /// order. Stale entries (scheduled before the last generation bump) are
    /// discarded silently.
    pub fn advance(&mut self, dt: f64) -> Vec<Deferred> {
        self.now += dt;
        let now = self.now;
        let generation = self.generation;

        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.fire_at <= now {
                if e.generation == generation {
                    due.push(*e);
                }
                false
            } else {
                true
            }
        });

        due.sort_by(|a, b| {
            a.fire_at
                .partial_cmp(&b.fire_at)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        due.into_iter().map(|e| e.action).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_only_after_delay() {
        let mut s = Scheduler::new();
        s.schedule_in(1.0, Deferred::Spawn);

        assert!(s.advance(0.5).is_empty());
        assert_eq!(s.advance(0.6), vec![Deferred::Spawn]);
        assert_eq!(s.pending(), 0);
    }

    #[test]
    fn test_fires_in_schedule_order() {
        let mut s = Scheduler::new();
        s.schedule_in(2.0, Deferred::AdvanceWord);
        s.schedule_in(1.0, Deferred::Spawn);

        assert_eq!(s.advance(3.0), vec![Deferred::Spawn, Deferred::AdvanceWord]);
    }

    #[test]
    fn test_generation_bump_discards_pending() {
        let mut s = Scheduler::new();
        s.schedule_in(1.0, Deferred::Spawn);
        s.schedule_in(1.0, Deferred::AdvanceWord);

        s.bump_generation();
        assert_eq!(s.pending(), 0);
        assert!(s.advance(2.0).is_empty());
    }

    #[test]
    fn test_entries_after_bump_still_fire() {
        let mut s = Scheduler::new();
        s.schedule_in(1.0, Deferred::Spawn);
        s.bump_generation();
        s.schedule_in(1.0, Deferred::AdvanceWord);

        assert_eq!(s.advance(1.5), vec![Deferred::AdvanceWord]);
    }

    #[test]
    fn test_clock_accumulates() {
        let mut s = Scheduler::new();
        s.advance(0.25);
        s.advance(0.25);
        assert!((s.now() - 0.5).abs() < 1e-9);

        s.schedule_in(0.4, Deferred::Spawn);
        assert!(s.advance(0.3).is_empty());
        assert_eq!(s.advance(0.2), vec![Deferred::Spawn]);
    }

    #[test]
    fn test_zero_delay_fires_next_tick() {
        let mut s = Scheduler::new();
        s.schedule_in(0.0, Deferred::Spawn);
        assert_eq!(s.advance(0.01), vec![Deferred::Spawn]);
    }
}
