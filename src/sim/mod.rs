//! Deterministic game simulation
//!
//! The update loop is a pure fixed-step function of its inputs: logical input
//! plus the seed given at construction. Everything device-facing (rendering,
//! audio playback, real clocks) stays outside; the loop communicates outward
//! through [`GameEvent`]s and [`FrameSnapshot`]s.

mod collision;
mod physics;
mod snapshot;
mod spawner;
mod state;
mod tick;

pub use collision::{pickup_pass, projectile_pass, PlayerProbe};
pub use physics::MoveInput;
pub use snapshot::{FrameSnapshot, NamingView, PickupView, PlayerPose, ProjectileView};
pub use spawner::{interval_bounds, Spawner};
pub use state::{
    artifact_index, Artifact, GameEvent, GameMode, Inventory, InventoryEntry, PlayerState,
    Projectile, RunState, ARTIFACTS, ARTIFACT_CYCLE,
};
pub use tick::{Game, GameAssets, NamingState, ShellRequest, TickInput};
