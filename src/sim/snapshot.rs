//! Per-frame render data
//!
//! The update phase resolves everything the presentation layer needs - the
//! active animation frame, screen rects, overlay flags - and hands it over in
//! one snapshot instead of letting the renderer re-derive simulation state.

use crate::sim::state::{Artifact, GameMode, InventoryEntry};
use crate::sprite::PixelRect;

/// Resolved player pose for drawing
#[derive(Debug, Clone, Copy)]
pub struct PlayerPose {
    /// World position of the feet line
    pub x: f32,
    pub y: f32,
    /// 1 right / -1 left (render mirrored when negative)
    pub facing: i8,
    /// Index into the active animation set
    pub frame_index: usize,
    /// True: run set, false: idle set
    pub running: bool,
    /// Sheet rect of the active frame (what to blit)
    pub frame_rect: PixelRect,
    /// Invulnerability blink: skip drawing when false
    pub visible: bool,
}

/// One in-flight projectile, ready to draw
#[derive(Debug, Clone, Copy)]
pub struct ProjectileView {
    pub template: usize,
    pub x: f32,
    pub y: f32,
}

/// Pickup placement for the current loop
#[derive(Debug, Clone, Copy)]
pub struct PickupView {
    /// Index into the extracted pickup set
    pub index: usize,
    pub active: bool,
    /// Sheet-local rect (render code adds the background tiling offset)
    pub rect: PixelRect,
}

/// Name-entry overlay state
#[derive(Debug, Clone)]
pub struct NamingView {
    pub name: String,
    /// Show the "name taken" warning
    pub warning: bool,
}

/// Everything the rendering sink needs for one frame
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub mode: GameMode,
    pub camera_x: f32,
    pub player: PlayerPose,
    pub projectiles: Vec<ProjectileView>,
    pub pickups: Vec<PickupView>,
    pub hp: u8,
    pub max_hp: u8,
    pub score: u64,
    pub loop_count: u32,
    /// HUD icon strip, insertion order, rects already laid out
    pub inventory: Vec<InventoryEntry>,
    pub paused: bool,
    /// Card overlay content, if one is open
    pub reading_card: Option<Artifact>,
    /// Menu "how to play" overlay
    pub show_guide: bool,
    pub naming: Option<NamingView>,
    /// Game-over overlay shows the celebratory banner
    pub high_score: bool,
    /// Pulsing red vignette at 1 hp
    pub low_hp_pulse: bool,
    /// Leaderboard rows for the menu card (name, score), best first
    pub leaderboard: Vec<(String, u64)>,
}
