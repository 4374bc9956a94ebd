//! Time-gated random projectile generation
//!
//! Spawn cadence and fall speed both scale with the loop count, with floors
//! so the rain never becomes instantaneous. Draws come from an owned seeded
//! Pcg32, so a run is reproducible from its seed.

use glam::Vec2;
use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::sim::state::Projectile;

/// Spawned projectiles start this far above the screen
const SPAWN_Y: f32 = -100.0;
/// Horizontal margin kept clear at both camera edges
const SPAWN_MARGIN: i32 = 50;

/// Difficulty-scaled projectile spawner
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: Pcg32,
    last_spawn_ms: u64,
    next_delay_ms: u64,
}

/// Spawn interval bounds in milliseconds for a loop count.
///
/// Both bounds shrink with difficulty and stop at their floors (150, 350).
pub fn interval_bounds(loop_count: u32) -> (u64, u64) {
    let low = (700i64 - loop_count as i64 * 80).max(150) as u64;
    let high = (1100i64 - loop_count as i64 * 60).max(350) as u64;
    (low, high)
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        let mut spawner = Self {
            rng: Pcg32::seed_from_u64(seed),
            last_spawn_ms: 0,
            next_delay_ms: 0,
        };
        spawner.rearm(0, 0);
        spawner
    }

    /// Reset the timer and draw the next delay from the current bounds
    fn rearm(&mut self, now_ms: u64, loop_count: u32) {
        let (low, high) = interval_bounds(loop_count);
        self.last_spawn_ms = now_ms;
        self.next_delay_ms = self.rng.random_range(low..=high);
    }

    /// Produce a projectile if the delay has expired.
    ///
    /// The spawn lands at a uniform x inside the visible camera window with a
    /// difficulty-scaled fall speed plus jitter.
    pub fn update(
        &mut self,
        now_ms: u64,
        loop_count: u32,
        camera_x: f32,
        template_count: usize,
    ) -> Option<Projectile> {
        if template_count == 0 || now_ms.saturating_sub(self.last_spawn_ms) <= self.next_delay_ms {
            return None;
        }
        let template = self.rng.random_range(0..template_count);
        let x = self
            .rng
            .random_range(camera_x as i32 + SPAWN_MARGIN..=camera_x as i32 + SCREEN_WIDTH - SPAWN_MARGIN);
        let vel = 7.0 + loop_count as f32 * 1.2 + self.rng.random_range(-1.0..2.5);
        self.rearm(now_ms, loop_count);
        Some(Projectile {
            template,
            pos: Vec2::new(x as f32, SPAWN_Y),
            vel,
        })
    }

    /// Restart the cadence (new run)
    pub fn reset(&mut self, now_ms: u64) {
        self.rearm(now_ms, 0);
    }
}
