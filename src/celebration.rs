use rand::Rng;

/// Particle for the word-completion burst
#[derive(Debug, Clone)]
pub struct CelebrationParticle {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
}

impl CelebrationParticle {
    fn new(x: f64, y: f64, symbol: char) -> Self {
        let mut rng = rand::thread_rng();

        Self {
            x,
            y,
            vel_x: rng.gen_range(-14.0..14.0),
            vel_y: rng.gen_range(-10.0..-3.0),
            symbol,
            color_index: rng.gen_range(0..7),
            age: 0.0,
            max_age: rng.gen_range(1.5..3.0),
        }
    }

    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += 12.0 * dt; // gravity

        self.age += dt;
        self.age < self.max_age
    }
}

/// Burst animation shown when a word is completed: the word's letters fly
/// apart from the goal row, in terminal cell coordinates.
#[derive(Debug, Default)]
pub struct CelebrationAnimation {
    pub particles: Vec<CelebrationParticle>,
    pub is_active: bool,
}

impl CelebrationAnimation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scatter the letters of `word` from the top of a `width` x `height`
    /// cell area.
    pub fn start_word_burst(&mut self, word: &str, width: u16, height: u16) {
        let mut rng = rand::thread_rng();
        let cx = width as f64 / 2.0;
        let cy = (height as f64 / 5.0).max(1.0);

        self.particles.clear();
        for ch in word.chars() {
            // A handful of copies of each letter makes the burst readable.
            for _ in 0..3 {
                let x = cx + rng.gen_range(-8.0..8.0);
                let y = cy + rng.gen_range(-1.0..1.0);
                self.particles
                    .push(CelebrationParticle::new(x, y, ch.to_ascii_uppercase()));
            }
        }
        self.is_active = true;
    }

    pub fn update(&mut self, dt: f64) {
        if !self.is_active {
            return;
        }
        self.particles.retain_mut(|p| p.update(dt));
        if self.particles.is_empty() {
            self.is_active = false;
        }
    }
}
