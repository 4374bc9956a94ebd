//! Per-frame motion: horizontal running, jump arcs, ground probing, animation
//!
//! The ground model is pixel-based: besides the fixed ground line, elevated
//! platforms are wherever the "floating guides" background layer is opaque.
//! The player lands on a platform only while falling, so jumping up through
//! one works.

use crate::consts::*;
use crate::sim::state::{GameEvent, PlayerState, RunState};
use crate::audio::SfxKind;
use crate::sprite::AlphaImage;

/// Directional/jump inputs already reduced to logical actions
#[derive(Debug, Clone, Copy, Default)]
pub struct MoveInput {
    pub left: bool,
    pub right: bool,
    /// Jump key currently down (the edge is detected here, not by the caller)
    pub jump: bool,
}

/// Advance the player one frame: movement, jump, gravity, camera, ground.
///
/// Emits jump sounds into `events`. The animation step is separate
/// ([`advance_animation`]) because it needs the active set's frame count.
pub fn step(
    player: &mut PlayerState,
    run: &mut RunState,
    input: MoveInput,
    guides: &AlphaImage,
    level_width: f32,
    events: &mut Vec<GameEvent>,
) {
    let speed = player.current_speed(run.loop_count);

    player.moving = false;
    if input.right {
        player.pos.x += speed;
        player.facing = 1;
        player.moving = true;
    }
    // Never walk off the left edge of the camera
    if input.left && player.pos.x > run.camera_x {
        player.pos.x -= speed;
        player.facing = -1;
        player.moving = true;
    }

    // Fresh press only: holding the key must not drain the jump budget
    if input.jump && !player.jump_held && player.jumps_left > 0 {
        player.vel_y = JUMP_VELOCITY;
        player.jumps_left -= 1;
        player.grounded = false;
        events.push(GameEvent::Sfx(SfxKind::Jump));
    }
    player.jump_held = input.jump;

    player.vel_y += GRAVITY;
    player.pos.y += player.vel_y;

    run.camera_x = (player.pos.x - CAMERA_LEAD).max(0.0);

    resolve_ground(player, guides, level_width);
}

/// Snap to the ground line or to an opaque guides pixel when falling onto one.
///
/// Out-of-bounds samples read as transparent, so probing past the layer's
/// edge simply finds no platform.
fn resolve_ground(player: &mut PlayerState, guides: &AlphaImage, level_width: f32) {
    player.grounded = false;

    let lx = (player.pos.x.rem_euclid(level_width.max(1.0))) as i32;
    let ly = player.pos.y as i32;
    let on_platform = player.vel_y > 0.0 && guides.is_opaque(lx, ly);

    if player.pos.y >= GROUND_Y || on_platform {
        player.pos.y = if player.pos.y >= GROUND_Y { GROUND_Y } else { ly as f32 };
        player.vel_y = 0.0;
        player.jumps_left = MAX_JUMPS;
        player.grounded = true;
    }
}

/// Advance the animation accumulator and frame index.
///
/// The accumulator gains 0.15 per frame, plus 0.08 while moving, and the
/// index steps (mod `frame_count`) each time it crosses 1.0.
pub fn advance_animation(player: &mut PlayerState, frame_count: usize) {
    player.anim_timer += 0.15;
    if player.moving {
        player.anim_timer += 0.08;
    }
    if player.anim_timer >= 1.0 && frame_count > 0 {
        player.anim_index = (player.anim_index + 1) % frame_count;
        player.anim_timer = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{PlayerState, RunState};

    fn no_guides() -> AlphaImage {
        AlphaImage::from_fn(1280, 720, |_, _| 0)
    }

    fn step_with(player: &mut PlayerState, run: &mut RunState, input: MoveInput) -> Vec<GameEvent> {
        let mut events = Vec::new();
        step(player, run, input, &no_guides(), 1280.0, &mut events);
        events
    }

    #[test]
    fn test_horizontal_speed_grows_per_loop() {
        let mut player = PlayerState::default();
        let mut run = RunState::default();
        let x0 = player.pos.x;
        step_with(&mut player, &mut run, MoveInput { right: true, ..Default::default() });
        assert_eq!(player.pos.x, x0 + BASE_SPEED);

        run.loop_count = 3;
        let x1 = player.pos.x;
        step_with(&mut player, &mut run, MoveInput { right: true, ..Default::default() });
        assert!((player.pos.x - (x1 + BASE_SPEED + 1.2)).abs() < 1e-4);
    }

    #[test]
    fn test_left_clamped_at_camera_edge() {
        let mut player = PlayerState::default();
        let mut run = RunState::default();
        player.pos.x = 0.0;
        step_with(&mut player, &mut run, MoveInput { left: true, ..Default::default() });
        assert_eq!(player.pos.x, 0.0);
        assert!(!player.moving);
    }

    #[test]
    fn test_jump_is_edge_triggered() {
        let mut player = PlayerState::default();
        let mut run = RunState::default();
        let jump = MoveInput { jump: true, ..Default::default() };

        let events = step_with(&mut player, &mut run, jump);
        assert_eq!(player.jumps_left, 1);
        assert!(events.contains(&GameEvent::Sfx(SfxKind::Jump)));

        // Held key must not consume the second jump
        for _ in 0..5 {
            step_with(&mut player, &mut run, jump);
        }
        assert_eq!(player.jumps_left, 1);

        // Release then press again: double jump
        step_with(&mut player, &mut run, MoveInput::default());
        step_with(&mut player, &mut run, jump);
        assert_eq!(player.jumps_left, 0);

        // Budget exhausted mid-air
        step_with(&mut player, &mut run, MoveInput::default());
        let events = step_with(&mut player, &mut run, jump);
        assert_eq!(player.jumps_left, 0);
        assert!(events.is_empty());
    }

    #[test]
    fn test_landing_restores_jump_budget() {
        let mut player = PlayerState::default();
        let mut run = RunState::default();
        step_with(&mut player, &mut run, MoveInput { jump: true, ..Default::default() });
        assert!(!player.grounded);

        // Fall back down; the arc is symmetric so this terminates
        for _ in 0..200 {
            step_with(&mut player, &mut run, MoveInput::default());
            if player.grounded {
                break;
            }
        }
        assert!(player.grounded);
        assert_eq!(player.pos.y, GROUND_Y);
        assert_eq!(player.vel_y, 0.0);
        assert_eq!(player.jumps_left, MAX_JUMPS);
    }

    #[test]
    fn test_platform_catches_falling_player_only() {
        // Opaque guides band at y in [400, 410)
        let guides = AlphaImage::from_fn(1280, 720, |_, y| if (400..410).contains(&y) { 255 } else { 0 });
        let mut player = PlayerState::default();
        let mut run = RunState::default();
        let mut events = Vec::new();

        // Falling through the band: lands on it
        player.pos.y = 398.0;
        player.vel_y = 5.0;
        player.grounded = false;
        player.jumps_left = 0;
        step(&mut player, &mut run, MoveInput::default(), &guides, 1280.0, &mut events);
        assert!(player.grounded);
        assert!(player.pos.y < GROUND_Y);
        assert_eq!(player.jumps_left, MAX_JUMPS);

        // Moving upward through the same band: passes through
        player.pos.y = 415.0;
        player.vel_y = -12.0;
        player.grounded = false;
        step(&mut player, &mut run, MoveInput::default(), &guides, 1280.0, &mut events);
        assert!(!player.grounded);
    }

    #[test]
    fn test_probe_wraps_level_width() {
        // Platform only near x=100 of a 1280-wide level
        let guides = AlphaImage::from_fn(1280, 720, |x, y| {
            if (90..110).contains(&x) && (500..505).contains(&y) { 255 } else { 0 }
        });
        let mut player = PlayerState::default();
        let mut run = RunState { loop_count: 2, ..Default::default() };
        let mut events = Vec::new();

        // Two loops in: world x 2660 wraps to local x 100
        player.pos.x = 2660.0;
        player.pos.y = 499.0;
        player.vel_y = 4.0;
        player.grounded = false;
        step(&mut player, &mut run, MoveInput::default(), &guides, 1280.0, &mut events);
        assert!(player.grounded);
    }

    #[test]
    fn test_animation_accumulator() {
        let mut player = PlayerState::default();
        player.moving = false;
        // 0.15/frame: seven frames to cross 1.0
        for _ in 0..6 {
            advance_animation(&mut player, 6);
        }
        assert_eq!(player.anim_index, 0);
        advance_animation(&mut player, 6);
        assert_eq!(player.anim_index, 1);
        assert_eq!(player.anim_timer, 0.0);

        // Moving accumulates 0.23/frame: five frames suffice
        player.moving = true;
        for _ in 0..5 {
            advance_animation(&mut player, 6);
        }
        assert_eq!(player.anim_index, 2);
    }

    #[test]
    fn test_animation_wraps_frame_count() {
        let mut player = PlayerState::default();
        player.anim_index = 5;
        player.anim_timer = 0.99;
        advance_animation(&mut player, 6);
        assert_eq!(player.anim_index, 0);
    }
}
