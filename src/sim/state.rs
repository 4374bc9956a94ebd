//! Core simulation state: player, run, inventory, projectiles
//!
//! All mutable run state lives in explicit aggregates owned by [`crate::sim::Game`]
//! and passed by reference into the update functions - no ambient globals.

use glam::Vec2;

use crate::audio::SfxKind;
use crate::consts::*;
use crate::sprite::PixelRect;

/// Top-level game mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameMode {
    /// Title screen with leaderboard
    Menu,
    /// Entering a player name before a run
    Naming,
    /// Active run (pause and reading-card are sub-flags of RunState)
    Playing,
    /// Run ended, waiting for acknowledgement
    GameOver,
}

/// Side effects the simulation wants from the audio boundary.
///
/// Drained once per frame and fed to [`crate::audio::AudioDirector::apply`];
/// the core never touches playback devices itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Sfx(SfxKind),
    /// Stop the current theme and start it again at the tempo for this loop
    ThemeRestart { loop_count: u32 },
    ThemeStop,
}

/// The player character
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// World position; y is the feet line (sprites anchor midbottom)
    pub pos: Vec2,
    /// Vertical velocity, positive is downward
    pub vel_y: f32,
    /// Facing direction, 1 right / -1 left
    pub facing: i8,
    /// Jumps remaining before the next landing
    pub jumps_left: u8,
    pub grounded: bool,
    /// Frames of post-hit grace remaining
    pub invuln_frames: u32,
    /// Discrete frame index into the active animation set
    pub anim_index: usize,
    /// Sub-frame accumulator; the index advances when it crosses 1.0
    pub anim_timer: f32,
    /// Whether a directional input was active this frame (selects run vs idle)
    pub moving: bool,
    /// Jump key was down last frame (edge debounce)
    pub jump_held: bool,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            pos: Vec2::new(PLAYER_START_X, PLAYER_START_Y),
            vel_y: 0.0,
            facing: 1,
            jumps_left: MAX_JUMPS,
            grounded: true,
            invuln_frames: 0,
            anim_index: 0,
            anim_timer: 0.0,
            moving: false,
            jump_held: false,
        }
    }
}

impl PlayerState {
    /// Horizontal speed for the current difficulty
    pub fn current_speed(&self, loop_count: u32) -> f32 {
        BASE_SPEED + loop_count as f32 * SPEED_PER_LOOP
    }
}

/// Mutable per-run state
#[derive(Debug, Clone, PartialEq)]
pub struct RunState {
    /// Health, 0..=4
    pub hp: u8,
    /// Completed level traversals
    pub loop_count: u32,
    pub score: u64,
    /// Camera left edge in world space
    pub camera_x: f32,
    pub paused: bool,
    /// Index into [`ARTIFACTS`] of the card being read, if any
    pub reading_card: Option<usize>,
    /// Frames ticked since the run started
    pub frame: u64,
    /// Last heartbeat emission, in derived milliseconds
    pub heartbeat_ms: u64,
    /// Set once at game over when the run beat the stored best
    pub is_high_score: bool,
}

impl Default for RunState {
    fn default() -> Self {
        Self {
            hp: MAX_HP,
            loop_count: 0,
            score: 0,
            camera_x: 0.0,
            paused: false,
            reading_card: None,
            frame: 0,
            heartbeat_ms: 0,
            is_high_score: false,
        }
    }
}

/// An in-flight projectile. The image and mask stay with the template; the
/// instance only owns its motion state.
#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    /// Index into the template set
    pub template: usize,
    /// World position of the template rect's top-left
    pub pos: Vec2,
    /// Downward speed per frame
    pub vel: f32,
}

/// One collected artifact in the HUD strip
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryEntry {
    pub name: String,
    /// Screen-space icon rect, recomputed every frame for tap hit-testing
    pub rect: PixelRect,
}

/// Collected artifacts, keyed by name, insertion-ordered.
///
/// Collecting an already-held artifact name overwrites in place rather than
/// duplicating, so the HUD strip keeps its layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inventory {
    entries: Vec<InventoryEntry>,
}

impl Inventory {
    pub fn insert(&mut self, name: &str) {
        if !self.entries.iter().any(|e| e.name == name) {
            self.entries.push(InventoryEntry {
                name: name.to_string(),
                rect: PixelRect::default(),
            });
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    /// Recompute the HUD icon rects (right-aligned strip, newest leftmost)
    pub fn layout(&mut self) {
        for (i, entry) in self.entries.iter_mut().enumerate() {
            entry.rect = PixelRect::new(SCREEN_WIDTH - 80 - (i as i32 * 90), 20, 60, 80);
        }
    }

    /// Name of the icon under a tap, if any
    pub fn hit_test(&self, x: i32, y: i32) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.rect.contains(x, y))
            .map(|e| e.name.as_str())
    }
}

/// A museum artifact: pickup category plus the card text shown when its
/// inventory icon is tapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Artifact {
    pub name: &'static str,
    pub info: &'static str,
}

/// The artifact catalog
pub const ARTIFACTS: [Artifact; 4] = [
    Artifact {
        name: "Dancing Girl",
        info: "Bronze statuette (2300 BC). It shows high metal-working skill.",
    },
    Artifact {
        name: "Priest-King",
        info: "A soapstone sculpture representing a powerful leader or deity.",
    },
    Artifact {
        name: "Unicorn Seal",
        info: "Used for trade. Features a mythical creature and ancient Indus script.",
    },
    Artifact {
        name: "Painted Pottery",
        info: "Sturdy red clay pottery with floral and geometric motifs from the Indus Valley.",
    },
];

/// Label cycle applied to extracted pickup blobs, left to right
pub const ARTIFACT_CYCLE: [&str; 7] = [
    "Painted Pottery",
    "Dancing Girl",
    "Unicorn Seal",
    "Priest-King",
    "Dancing Girl",
    "Unicorn Seal",
    "Painted Pottery",
];

/// Catalog index for an artifact name
pub fn artifact_index(name: &str) -> Option<usize> {
    ARTIFACTS.iter().position(|a| a.name == name)
}
