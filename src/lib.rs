//! Ruins of Sindh - a side-scrolling runner core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, pixel-mask collisions, game state machine)
//! - `sprite`: Alpha-channel images, collision bitmasks, sprite-sheet entity extraction
//! - `audio`: Procedural PCM synthesis (sound effects + tempo-scaled theme) and sink traits
//! - `leaderboard`: Top-5 persisted high scores
//!
//! Rendering, windowing, asset decoding and audio output devices are external
//! collaborators: the core consumes alpha channels and logical input, and
//! exposes a per-frame [`sim::FrameSnapshot`] plus [`audio::PcmBuffer`]s.

pub mod audio;
pub mod leaderboard;
pub mod sim;
pub mod sprite;

pub use leaderboard::Leaderboard;
pub use sim::{Game, GameMode, TickInput};

/// Game configuration constants
pub mod consts {
    /// Fixed frame rate (one tick = one rendered frame)
    pub const FRAME_RATE: u32 = 60;

    /// Screen dimensions
    pub const SCREEN_WIDTH: i32 = 1280;
    pub const SCREEN_HEIGHT: i32 = 720;

    /// Player spawn point
    pub const PLAYER_START_X: f32 = 400.0;
    pub const PLAYER_START_Y: f32 = 615.0;

    /// Ground height: standing at or below this y snaps the player down
    pub const GROUND_Y: f32 = 615.0;
    /// Falling past this y is a pitfall death
    pub const DEATH_Y: f32 = (SCREEN_HEIGHT + 100) as f32;

    /// Motion model
    pub const GRAVITY: f32 = 0.8;
    pub const JUMP_VELOCITY: f32 = -16.0;
    pub const BASE_SPEED: f32 = 8.0;
    /// Extra horizontal speed gained per completed loop
    pub const SPEED_PER_LOOP: f32 = 0.4;
    /// Jumps available between landings (double jump)
    pub const MAX_JUMPS: u8 = 2;

    /// Camera trails the player by this much
    pub const CAMERA_LEAD: f32 = 400.0;

    /// Health
    pub const MAX_HP: u8 = 4;
    /// Post-hit grace period in frames
    pub const INVULN_FRAMES: u32 = 60;

    /// Heartbeat warning interval at 1 hp, in milliseconds
    pub const HEARTBEAT_INTERVAL_MS: u64 = 600;

    /// Score awarded per pickup, multiplied by (loop_count + 1)
    pub const PICKUP_SCORE: u64 = 500;

    /// Longest allowed leaderboard name
    pub const MAX_NAME_LEN: usize = 12;
}

/// Milliseconds elapsed after `frames` ticks of the fixed 60 Hz clock.
///
/// The spawner and heartbeat intervals are specified in milliseconds; deriving
/// them from the frame counter keeps the simulation deterministic.
#[inline]
pub fn frames_to_ms(frames: u64) -> u64 {
    frames * 1000 / consts::FRAME_RATE as u64
}
