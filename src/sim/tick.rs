//! Game orchestration: mode machine, input routing, fixed-step update
//!
//! [`Game`] owns all run state and advances one frame per [`Game::tick`].
//! The shell feeds it logical input (keys already mapped to actions, taps in
//! screen coordinates) and drains [`GameEvent`]s for the audio boundary; a
//! couple of requests (quit, music toggle) flow the other way.

use crate::audio::SfxKind;
use crate::consts::*;
use crate::frames_to_ms;
use crate::leaderboard::Leaderboard;
use crate::sim::collision::{self, PlayerProbe};
use crate::sim::physics::{self, MoveInput};
use crate::sim::snapshot::{
    FrameSnapshot, NamingView, PickupView, PlayerPose, ProjectileView,
};
use crate::sim::spawner::Spawner;
use crate::sim::state::{
    artifact_index, GameEvent, GameMode, Inventory, PlayerState, Projectile, RunState,
    ARTIFACTS, ARTIFACT_CYCLE,
};
use crate::sprite::{extract_entities, split_frames, AlphaImage, Entity, PixelRect};

/// Animation columns in the player sprite sheets
const PLAYER_SHEET_COLS: u32 = 6;

/// On-screen touch controls (fixed hitboxes, bottom corners)
const LEFT_HIT: PixelRect = PixelRect::new(50, SCREEN_HEIGHT - 150, 100, 100);
const RIGHT_HIT: PixelRect = PixelRect::new(180, SCREEN_HEIGHT - 150, 100, 100);
const JUMP_HIT: PixelRect = PixelRect::new(SCREEN_WIDTH - 160, SCREEN_HEIGHT - 160, 120, 120);

/// Menu buttons
const PLAY_BUTTON: PixelRect = PixelRect::new(SCREEN_WIDTH / 2 - 380, 380, 280, 60);
const GUIDE_BUTTON: PixelRect = PixelRect::new(SCREEN_WIDTH / 2 - 380, 460, 280, 60);
const MUSIC_BUTTON: PixelRect = PixelRect::new(30, SCREEN_HEIGHT - 110, 80, 80);
const QUIT_BUTTON: PixelRect = PixelRect::new(130, SCREEN_HEIGHT - 110, 80, 80);
/// "Main menu" button on the pause overlay
const PAUSE_MENU_BUTTON: PixelRect = PixelRect::new(SCREEN_WIDTH / 2 - 140, 450, 280, 60);

/// Immutable per-session content derived from the sprite sheets
#[derive(Debug, Clone)]
pub struct GameAssets {
    /// Platform layer; opaque pixels are standable
    pub guides: AlphaImage,
    /// Width of one background repetition in pixels
    pub level_width: f32,
    pub idle_frames: Vec<Entity>,
    pub run_frames: Vec<Entity>,
    pub pickups: Vec<Entity>,
    pub projectile_templates: Vec<Entity>,
}

impl GameAssets {
    /// Build the asset set from raw alpha channels.
    ///
    /// Pickup blobs take artifact names from the fixed left-to-right cycle;
    /// an undersized pickups or arrows sheet yields empty sets, which the
    /// game tolerates (nothing spawns, nothing is collectable).
    pub fn from_sheets(
        idle_sheet: &AlphaImage,
        run_sheet: &AlphaImage,
        pickups_sheet: &AlphaImage,
        arrows_sheet: &AlphaImage,
        guides: AlphaImage,
        level_width: f32,
    ) -> Self {
        let assets = Self {
            guides,
            level_width,
            idle_frames: split_frames(idle_sheet, PLAYER_SHEET_COLS),
            run_frames: split_frames(run_sheet, PLAYER_SHEET_COLS),
            pickups: extract_entities(pickups_sheet, &ARTIFACT_CYCLE),
            projectile_templates: extract_entities(arrows_sheet, &[""]),
        };
        log::info!(
            "Assets ready: {} pickups, {} projectile templates, level width {}",
            assets.pickups.len(),
            assets.projectile_templates.len(),
            assets.level_width
        );
        assets
    }

    /// Fully transparent stand-in assets for headless runs
    pub fn placeholder() -> Self {
        let blank = AlphaImage::placeholder();
        Self::from_sheets(
            &blank,
            &blank,
            &blank,
            &blank,
            AlphaImage::new(
                SCREEN_WIDTH as u32,
                SCREEN_HEIGHT as u32,
                vec![0; (SCREEN_WIDTH * SCREEN_HEIGHT) as usize],
            ),
            SCREEN_WIDTH as f32,
        )
    }
}

/// Logical input for one frame
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Pause key pressed this frame (already edge-detected by the shell)
    pub pause: bool,
    /// Tap or click that started this frame, in screen coordinates
    pub tap_down: Option<(i32, i32)>,
    /// Tap or click released this frame
    pub tap_up: bool,
}

/// Things only the shell can do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellRequest {
    ToggleMusic,
    Quit,
}

/// Name-entry screen state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamingState {
    pub name: String,
    /// The entered name is already on the leaderboard
    pub warning: bool,
}

/// The whole game: mode machine plus the active run
pub struct Game {
    pub mode: GameMode,
    pub player: PlayerState,
    pub run: RunState,
    pub inventory: Inventory,
    pub projectiles: Vec<Projectile>,
    pub naming: NamingState,
    /// "How to play" overlay on the menu
    pub show_guide: bool,
    assets: GameAssets,
    pickups: Vec<Entity>,
    spawner: Spawner,
    leaderboard: Leaderboard,
    events: Vec<GameEvent>,
    touch_left: bool,
    touch_right: bool,
}

impl Game {
    /// The menu theme starts immediately, so the first event drain already
    /// carries a theme restart.
    pub fn new(assets: GameAssets, leaderboard: Leaderboard, seed: u64) -> Self {
        let pickups = assets.pickups.clone();
        Self {
            mode: GameMode::Menu,
            player: PlayerState::default(),
            run: RunState::default(),
            inventory: Inventory::default(),
            projectiles: Vec::new(),
            naming: NamingState::default(),
            show_guide: false,
            assets,
            pickups,
            spawner: Spawner::new(seed),
            leaderboard,
            events: vec![GameEvent::ThemeRestart { loop_count: 0 }],
            touch_left: false,
            touch_right: false,
        }
    }

    /// Advance one frame: route taps and the pause key, then run the
    /// simulation step if a run is active and not suspended.
    pub fn tick(&mut self, input: &TickInput) -> Option<ShellRequest> {
        if input.tap_up {
            self.touch_left = false;
            self.touch_right = false;
        }
        let request = match input.tap_down {
            Some((x, y)) => self.handle_tap(x, y),
            None => None,
        };
        if input.pause {
            self.handle_pause_key();
        }
        if self.mode == GameMode::Playing && !self.run.paused && self.run.reading_card.is_none() {
            self.update_playing(input);
        }
        request
    }

    /// Events produced since the last drain, in emission order
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    fn handle_pause_key(&mut self) {
        if self.mode != GameMode::Playing {
            return;
        }
        if self.run.reading_card.is_some() {
            self.run.reading_card = None;
        } else {
            self.run.paused = !self.run.paused;
            self.events.push(GameEvent::Sfx(SfxKind::Click));
        }
    }

    fn handle_tap(&mut self, x: i32, y: i32) -> Option<ShellRequest> {
        match self.mode {
            GameMode::Menu => self.handle_menu_tap(x, y),
            GameMode::Naming => None,
            GameMode::Playing => {
                self.handle_playing_tap(x, y);
                None
            }
            GameMode::GameOver => {
                self.acknowledge_game_over();
                None
            }
        }
    }

    fn handle_menu_tap(&mut self, x: i32, y: i32) -> Option<ShellRequest> {
        if self.show_guide {
            self.show_guide = false;
        } else if PLAY_BUTTON.contains(x, y) {
            self.events.push(GameEvent::Sfx(SfxKind::Click));
            self.begin_naming();
        } else if GUIDE_BUTTON.contains(x, y) {
            self.events.push(GameEvent::Sfx(SfxKind::Click));
            self.show_guide = true;
        } else if MUSIC_BUTTON.contains(x, y) {
            return Some(ShellRequest::ToggleMusic);
        } else if QUIT_BUTTON.contains(x, y) {
            return Some(ShellRequest::Quit);
        }
        None
    }

    fn handle_playing_tap(&mut self, x: i32, y: i32) {
        if self.run.paused {
            if PAUSE_MENU_BUTTON.contains(x, y) {
                self.events.push(GameEvent::Sfx(SfxKind::Click));
                self.run.paused = false;
                self.mode = GameMode::Menu;
            }
            return;
        }
        if self.run.reading_card.is_some() {
            self.run.reading_card = None;
            return;
        }
        if let Some(name) = self.inventory.hit_test(x, y) {
            self.run.reading_card = artifact_index(name);
            self.events.push(GameEvent::Sfx(SfxKind::Click));
            return;
        }
        // Touch moves are latched until tap_up; the two directions exclude
        // each other so a sliding finger never runs both ways
        if LEFT_HIT.contains(x, y) {
            self.touch_left = true;
            self.touch_right = false;
        } else if RIGHT_HIT.contains(x, y) {
            self.touch_right = true;
            self.touch_left = false;
        } else if JUMP_HIT.contains(x, y) && self.player.jumps_left > 0 {
            // The on-screen button jumps per tap, no edge debounce needed
            self.player.vel_y = JUMP_VELOCITY;
            self.player.jumps_left -= 1;
            self.player.grounded = false;
            self.events.push(GameEvent::Sfx(SfxKind::Jump));
        }
    }

    /// Menu -> Naming
    pub fn begin_naming(&mut self) {
        self.naming = NamingState::default();
        self.mode = GameMode::Naming;
    }

    /// Append a typed character, up to the name length cap. Any keystroke
    /// clears the duplicate-name warning.
    pub fn push_char(&mut self, c: char) {
        if self.mode != GameMode::Naming {
            return;
        }
        self.naming.warning = false;
        if self.naming.name.chars().count() < MAX_NAME_LEN && !c.is_control() {
            self.naming.name.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if self.mode != GameMode::Naming {
            return;
        }
        self.naming.warning = false;
        self.naming.name.pop();
    }

    /// Naming -> Menu without starting a run
    pub fn cancel_naming(&mut self) {
        if self.mode == GameMode::Naming {
            self.naming.warning = false;
            self.mode = GameMode::Menu;
        }
    }

    /// Try to start the run with the entered name.
    ///
    /// Rejects an empty (after trimming) name silently and a name already on
    /// the leaderboard with the warning flag. The board is re-read first so a
    /// name claimed by another process since startup still counts as taken.
    pub fn confirm_name(&mut self) -> bool {
        if self.mode != GameMode::Naming {
            return false;
        }
        self.naming.warning = false;
        if self.naming.name.trim().is_empty() {
            return false;
        }
        self.leaderboard.reload();
        if self.leaderboard.name_taken(self.naming.name.trim()) {
            self.naming.warning = true;
            return false;
        }
        self.events.push(GameEvent::Sfx(SfxKind::Click));
        self.reset_game();
        self.mode = GameMode::Playing;
        log::info!("Run started for {:?}", self.naming.name.trim());
        true
    }

    /// GameOver -> Menu, recording the finished run
    pub fn acknowledge_game_over(&mut self) {
        if self.mode != GameMode::GameOver {
            return;
        }
        self.leaderboard
            .record(self.naming.name.trim(), self.run.score);
        self.reset_game();
        self.mode = GameMode::Menu;
    }

    /// Put every run variable back to its starting value. Idempotent: a
    /// second call changes nothing but re-emits the theme restart.
    fn reset_game(&mut self) {
        self.player = PlayerState::default();
        self.run = RunState::default();
        self.inventory.clear();
        self.projectiles.clear();
        for pickup in &mut self.pickups {
            pickup.active = true;
        }
        self.spawner.reset(0);
        self.touch_left = false;
        self.touch_right = false;
        self.events.push(GameEvent::ThemeRestart { loop_count: 0 });
    }

    /// The active animation frame, if the sheets produced any
    fn active_frame(&self) -> Option<&Entity> {
        let frames = if self.player.moving {
            &self.assets.run_frames
        } else {
            &self.assets.idle_frames
        };
        if frames.is_empty() {
            None
        } else {
            frames.get(self.player.anim_index % frames.len())
        }
    }

    fn update_playing(&mut self, input: &TickInput) {
        self.run.frame += 1;
        let now_ms = frames_to_ms(self.run.frame);

        if self.player.invuln_frames > 0 {
            self.player.invuln_frames -= 1;
        }
        if self.run.hp == 1 && now_ms - self.run.heartbeat_ms > HEARTBEAT_INTERVAL_MS {
            self.events.push(GameEvent::Sfx(SfxKind::Heartbeat));
            self.run.heartbeat_ms = now_ms;
        }

        let move_input = MoveInput {
            left: input.left || self.touch_left,
            right: input.right || self.touch_right,
            jump: input.jump,
        };
        physics::step(
            &mut self.player,
            &mut self.run,
            move_input,
            &self.assets.guides,
            self.assets.level_width,
            &mut self.events,
        );
        let frame_count = if self.player.moving {
            self.assets.run_frames.len()
        } else {
            self.assets.idle_frames.len()
        };
        physics::advance_animation(&mut self.player, frame_count);

        if let Some(projectile) = self.spawner.update(
            now_ms,
            self.run.loop_count,
            self.run.camera_x,
            self.assets.projectile_templates.len(),
        ) {
            self.projectiles.push(projectile);
            self.events.push(GameEvent::Sfx(SfxKind::Whoosh));
        }

        // Field-level borrows: the probe holds onto the asset frame while the
        // passes mutate player, run and the entity sets
        let frames = if self.player.moving {
            &self.assets.run_frames
        } else {
            &self.assets.idle_frames
        };
        let frame = if frames.is_empty() {
            None
        } else {
            frames.get(self.player.anim_index % frames.len())
        };
        if let Some(frame) = frame {
            let probe = PlayerProbe::new(frame, &self.player, self.run.camera_x);
            collision::projectile_pass(
                &probe,
                &self.assets.projectile_templates,
                &mut self.projectiles,
                &mut self.player,
                &mut self.run,
                &mut self.events,
            );
            collision::pickup_pass(
                &probe,
                &mut self.pickups,
                &mut self.inventory,
                &mut self.run,
                self.assets.level_width,
                &mut self.events,
            );
        }
        self.inventory.layout();

        if self.player.pos.x > (self.run.loop_count + 1) as f32 * self.assets.level_width {
            self.run.loop_count += 1;
            for pickup in &mut self.pickups {
                pickup.active = true;
            }
            self.events.push(GameEvent::ThemeRestart {
                loop_count: self.run.loop_count,
            });
            log::info!("Loop {} reached, score {}", self.run.loop_count, self.run.score);
        }

        if self.run.hp == 0 || self.player.pos.y > DEATH_Y {
            self.finish_run();
        }
    }

    fn finish_run(&mut self) {
        self.mode = GameMode::GameOver;
        self.events.push(GameEvent::ThemeStop);
        self.run.is_high_score = self.leaderboard.is_new_best(self.run.score);
        self.events.push(GameEvent::Sfx(if self.run.is_high_score {
            SfxKind::HighScore
        } else {
            SfxKind::GameOver
        }));
        // A fall past the bottom gets the pitfall scream on top
        if self.player.pos.y > SCREEN_HEIGHT as f32 {
            self.events.push(GameEvent::Sfx(SfxKind::Pitfall));
        }
        log::info!(
            "Run over: score {}, loop {}, high score {}",
            self.run.score,
            self.run.loop_count,
            self.run.is_high_score
        );
    }

    /// Resolve everything the presentation layer needs for this frame
    pub fn snapshot(&self) -> FrameSnapshot {
        let active_len = if self.player.moving {
            self.assets.run_frames.len()
        } else {
            self.assets.idle_frames.len()
        };
        let player = PlayerPose {
            x: self.player.pos.x,
            y: self.player.pos.y,
            facing: self.player.facing,
            frame_index: self.player.anim_index % active_len.max(1),
            running: self.player.moving,
            frame_rect: self
                .active_frame()
                .map(|f| f.rect)
                .unwrap_or_default(),
            visible: self.player.invuln_frames % 10 < 5,
        };
        FrameSnapshot {
            mode: self.mode,
            camera_x: self.run.camera_x,
            player,
            projectiles: self
                .projectiles
                .iter()
                .map(|p| ProjectileView {
                    template: p.template,
                    x: p.pos.x,
                    y: p.pos.y,
                })
                .collect(),
            pickups: self
                .pickups
                .iter()
                .enumerate()
                .map(|(index, p)| PickupView {
                    index,
                    active: p.active,
                    rect: p.rect,
                })
                .collect(),
            hp: self.run.hp,
            max_hp: MAX_HP,
            score: self.run.score,
            loop_count: self.run.loop_count,
            inventory: self.inventory.entries().to_vec(),
            paused: self.run.paused,
            reading_card: self.run.reading_card.map(|i| ARTIFACTS[i]),
            show_guide: self.show_guide,
            naming: (self.mode == GameMode::Naming).then(|| NamingView {
                name: self.naming.name.clone(),
                warning: self.naming.warning,
            }),
            high_score: self.run.is_high_score,
            low_hp_pulse: self.mode == GameMode::Playing && self.run.hp == 1,
            leaderboard: self
                .leaderboard
                .entries()
                .iter()
                .map(|e| (e.name.clone(), e.score))
                .collect(),
        }
    }
}
