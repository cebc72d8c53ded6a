use crate::config::GameConfig;
use crate::placement::BoardGeometry;
use crate::spawner::TokenSpawner;
use crate::token::{TokenId, TokenState};
use rand::Rng;

/// Visual radius of a token, used for wall containment.
pub const TOKEN_RADIUS: f64 = 25.0;

/// Per-tick motion integration for tokens: pointer spring while dragging,
/// organic drift and goal-repel while idle, wall bounces at the play-area
/// edges. Mutates position and velocity only; fill and placement state are
/// never touched here, so motion can never race the placement logic.
#[derive(Debug, Clone)]
pub struct Physics {
    drag_pull: f64,
    drag_damping: f64,
    max_drag_speed: f64,
    drift_threshold: f64,
    drift_impulse: f64,
    goal_repel: f64,
    restitution: f64,
    air_friction: f64,
}

impl Physics {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            drag_pull: config.drag_pull,
            drag_damping: config.drag_damping,
            max_drag_speed: config.max_drag_speed,
            drift_threshold: config.drift_threshold,
            drift_impulse: config.drift_impulse,
            goal_repel: config.goal_repel,
            restitution: config.restitution,
            air_friction: config.air_friction,
        }
    }

    /// Integrate one tick of `dt` seconds. `drag` is the pointer target the
    /// dragged token is pulled toward, if a drag is in progress.
    pub fn step(
        &self,
        spawner: &mut TokenSpawner,
        geometry: &BoardGeometry,
        drag: Option<(TokenId, f64, f64)>,
        dt: f64,
    ) {
        let mut rng = rand::thread_rng();

        for token in spawner.tokens_mut() {
            match token.state {
                TokenState::PlacedCorrect | TokenState::Retired => continue,
                TokenState::Dragging => {
                    let Some((id, tx, ty)) = drag else { continue };
                    if id != token.id {
                        continue;
                    }
                    // P-controller toward the pointer, clamped so the token
                    // can't tunnel across the board in one tick.
                    let mut vx = (tx - token.x) * self.drag_pull;
                    let mut vy = (ty - token.y) * self.drag_pull;
                    let speed = (vx * vx + vy * vy).sqrt();
                    if speed > self.max_drag_speed {
                        let scale = self.max_drag_speed / speed;
                        vx *= scale;
                        vy *= scale;
                    }
                    token.vel_x = vx * self.drag_damping;
                    token.vel_y = vy * self.drag_damping;
                    token.x += token.vel_x * dt;
                    token.y += token.vel_y * dt;
                }
                TokenState::Spawned => {
                    if geometry.in_any_goal(token.x, token.y) {
                        // Idle tokens don't get to loiter in a goal mouth.
                        let (cx, cy) = geometry.play_center();
                        let dx = cx - token.x;
                        let dy = cy - token.y;
                        let len = (dx * dx + dy * dy).sqrt().max(1e-6);
                        token.vel_x += dx / len * self.goal_repel * dt;
                        token.vel_y += dy / len * self.goal_repel * dt;
                    } else if rng.gen::<f64>() > self.drift_threshold {
                        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
                        token.vel_x += angle.cos() * self.drift_impulse;
                        token.vel_y += angle.sin() * self.drift_impulse;
                    }

                    let decay = (1.0 - self.air_friction).powf(dt * 60.0);
                    token.vel_x *= decay;
                    token.vel_y *= decay;
                    token.x += token.vel_x * dt;
                    token.y += token.vel_y * dt;

                    self.contain(token, geometry);
                }
            }
        }
    }

    /// Bounce off the play-area edges. The top edge only reflects upward
    /// motion so freshly spawned tokens can still drop in from above.
    fn contain(&self, token: &mut crate::token::LetterToken, geometry: &BoardGeometry) {
        let (w, h) = geometry.size();
        let r = TOKEN_RADIUS;

        if token.x < r {
            token.x = r;
            token.vel_x = -token.vel_x * self.restitution;
        } else if token.x > w - r {
            token.x = w - r;
            token.vel_x = -token.vel_x * self.restitution;
        }

        if token.y < r && token.vel_y < 0.0 {
            token.y = r;
            token.vel_y = -token.vel_y * self.restitution;
        } else if token.y > h - r {
            token.y = h - r;
            token.vel_y = -token.vel_y * self.restitution;
        }
    }
}
