//! Ruins of Sindh entry point
//!
//! The native binary runs a short headless demo: placeholder assets, a null
//! audio sink, and a scripted run. A playable build wires a windowing and
//! audio shell around the same [`Game`] API.

use ruins_of_sindh::audio::{AudioDirector, NullSink};
use ruins_of_sindh::consts::*;
use ruins_of_sindh::sim::{GameAssets, GameMode, ShellRequest};
use ruins_of_sindh::{Game, Leaderboard, TickInput};

fn main() {
    env_logger::init();
    log::info!("Ruins of Sindh (headless demo) starting...");

    let leaderboard = Leaderboard::load("leaderboard.json");
    let seed = std::time::UNIX_EPOCH
        .elapsed()
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut game = Game::new(GameAssets::placeholder(), leaderboard, seed);
    let mut director = AudioDirector::new(NullSink::default(), seed);
    log::info!("Game initialized with seed: {seed}");

    // Menu -> Naming -> Playing, the way a shell would drive it
    game.tick(&TickInput {
        tap_down: Some((SCREEN_WIDTH / 2 - 300, 400)),
        ..Default::default()
    });
    for c in "Wanderer".chars() {
        game.push_char(c);
    }
    if !game.confirm_name() {
        // Name already on the board from an earlier demo run
        for c in format!("{}", seed % 10_000).chars() {
            game.push_char(c);
        }
        let _ = game.confirm_name();
    }
    director.apply(&game.take_events());

    // Ten seconds of running right with a jump every second
    let mut frame = 0u32;
    while game.mode == GameMode::Playing && frame < 10 * FRAME_RATE {
        let input = TickInput {
            right: true,
            jump: frame % FRAME_RATE == 0,
            ..Default::default()
        };
        if let Some(request) = game.tick(&input) {
            match request {
                ShellRequest::ToggleMusic => {
                    let enabled = !director.music_enabled();
                    director.set_music_enabled(enabled);
                }
                ShellRequest::Quit => break,
            }
        }
        director.apply(&game.take_events());
        frame += 1;
    }

    let snapshot = game.snapshot();
    println!(
        "Demo finished: mode {:?}, score {}, loop {}, player at x={:.0}",
        snapshot.mode, snapshot.score, snapshot.loop_count, snapshot.player.x
    );
    for (rank, (name, score)) in snapshot.leaderboard.iter().enumerate() {
        println!("  {}. {name} - {score}", rank + 1);
    }
}
