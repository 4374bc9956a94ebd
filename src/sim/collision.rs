//! Pixel-mask collision passes: projectiles against the player, then pickups
//!
//! Both passes share the same primitive: offset one entity's mask into the
//! player's current animation-frame mask (screen space) and test for any
//! mutually opaque pixel. Bounding boxes are never compared directly - the
//! masks already encode them.

use glam::Vec2;

use crate::audio::SfxKind;
use crate::consts::*;
use crate::sim::state::{GameEvent, Inventory, PlayerState, Projectile, RunState};
use crate::sprite::{Entity, Mask, PixelRect};

/// The player's collision shape for this frame: the active animation frame's
/// mask anchored midbottom at the player's screen position
#[derive(Debug, Clone, Copy)]
pub struct PlayerProbe<'a> {
    pub mask: &'a Mask,
    pub rect: PixelRect,
}

impl<'a> PlayerProbe<'a> {
    /// Anchor `frame` so its bottom-center sits at the player's feet
    pub fn new(frame: &'a Entity, player: &PlayerState, camera_x: f32) -> Self {
        let w = frame.rect.w;
        let h = frame.rect.h;
        let x = (player.pos.x - camera_x) as i32 - w as i32 / 2;
        let y = player.pos.y as i32 - h as i32;
        Self { mask: &frame.mask, rect: PixelRect::new(x, y, w, h) }
    }

    /// Does `mask`, placed at screen position (sx, sy), touch the player?
    fn touches(&self, mask: &Mask, sx: f32, sy: f32) -> bool {
        let offset = (sx as i32 - self.rect.x, sy as i32 - self.rect.y);
        self.mask.overlap(mask, offset)
    }
}

/// Move every projectile and resolve player overlap.
///
/// Policy for simultaneous overlaps (first-hit-wins): the first overlapping
/// projectile in iteration order deals the damage and starts the grace
/// window; any later overlap this frame, or during the window, still
/// consumes the projectile but deals nothing. Projectiles that fall past the
/// bottom of the screen vanish silently.
pub fn projectile_pass(
    probe: &PlayerProbe<'_>,
    templates: &[Entity],
    projectiles: &mut Vec<Projectile>,
    player: &mut PlayerState,
    run: &mut RunState,
    events: &mut Vec<GameEvent>,
) {
    projectiles.retain_mut(|p| {
        p.pos.y += p.vel;
        let screen_x = p.pos.x - run.camera_x;
        if probe.touches(&templates[p.template].mask, screen_x, p.pos.y) {
            if player.invuln_frames == 0 {
                run.hp = run.hp.saturating_sub(1);
                player.invuln_frames = INVULN_FRAMES;
                events.push(GameEvent::Sfx(SfxKind::Hit));
            }
            return false;
        }
        p.pos.y <= SCREEN_HEIGHT as f32
    });
}

/// Resolve pickup overlap.
///
/// A pickup's world x is its sheet-local x shifted by one full level width
/// per completed loop, so it stays reachable after every wrap. Collection
/// deactivates it until the loop resets, records the artifact, and scores
/// 500 x (loop_count + 1).
pub fn pickup_pass(
    probe: &PlayerProbe<'_>,
    pickups: &mut [Entity],
    inventory: &mut Inventory,
    run: &mut RunState,
    level_width: f32,
    events: &mut Vec<GameEvent>,
) {
    for pickup in pickups.iter_mut() {
        if !pickup.active {
            continue;
        }
        let world_x = pickup.rect.x as f32 + run.loop_count as f32 * level_width;
        let screen = Vec2::new(world_x - run.camera_x, pickup.rect.y as f32);
        if probe.touches(&pickup.mask, screen.x, screen.y) {
            pickup.active = false;
            events.push(GameEvent::Sfx(SfxKind::Pickup));
            inventory.insert(&pickup.label);
            run.score += PICKUP_SCORE * (run.loop_count as u64 + 1);
        }
    }
}
