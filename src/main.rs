//! Orbits Arena headless runner
//!
//! Plays a whole game between the configured players at a fixed frame rate
//! and logs the result. Usage: `orbits-arena [settings.json]`

#[cfg(not(target_arch = "wasm32"))]
use orbits_arena::{
    GameSettings, SimError,
    consts::FRAME_DT,
    sim::{Game, GameStage, Team},
};

/// A round still running after this long is ended by force
#[cfg(not(target_arch = "wasm32"))]
const ROUND_TIME_LIMIT: f32 = 180.0;

/// Give up on games that never produce a winner (one hour of play)
#[cfg(not(target_arch = "wasm32"))]
const MAX_FRAMES: u64 = 60 * 60 * 60;

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), SimError> {
    let settings = match std::env::args().nth(1) {
        Some(path) => GameSettings::load(path)?,
        None => GameSettings::default(),
    };
    let mut game = Game::new(&settings)?;
    log::info!(
        "Orbits Arena: {} players, seed {}",
        game.num_players(),
        game.state().seed()
    );

    let mut frames = 0u64;
    while game.stage() != GameStage::EndScreen {
        if frames >= MAX_FRAMES {
            log::warn!("no winner after {frames} frames, giving up");
            break;
        }
        if game.stage() == GameStage::Gaming && game.state().timer > ROUND_TIME_LIMIT {
            log::info!("round time limit reached, eliminating everyone");
            let alive: Vec<usize> = game.state().alive_players().map(|(i, _)| i).collect();
            for slot in alive {
                game.process_player_death(slot, 0)?;
            }
        }
        game.update(FRAME_DT)?;
        frames += 1;
    }

    log::info!(
        "finished after {frames} frames ({:.1} s)",
        frames as f32 * FRAME_DT
    );
    for (slot, score) in game.scores().iter().enumerate() {
        log::info!("player {slot}: {score} points");
    }
    match game.someone_won().and_then(Team::from_color) {
        Some(team) => log::info!("{} team wins", team.as_str()),
        None => log::info!("no winner"),
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    if let Err(e) = run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is driven by the host page on wasm
}
