//! Note Hopper entry point
//!
//! Runs a headless session in real time with the autopilot steering.
//!
//! Usage: `note-hopper [settings.json] [max_ticks]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::thread;
    use std::time::Instant;

    use note_hopper::audio::output::default_factory;
    use note_hopper::game::encouragement;
    use note_hopper::renderer::{LogRenderer, Renderer};
    use note_hopper::{AudioEngine, GameLoop, Settings, TickSignal};

    env_logger::init();
    log::info!("Note Hopper (headless) starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => Settings::load(path),
        None => Settings::default(),
    };
    let max_ticks = args.next().and_then(|arg| match arg.parse::<u64>() {
        Ok(ticks) => Some(ticks),
        Err(err) => {
            log::warn!("Ignoring tick limit {:?}: {}", arg, err);
            None
        }
    });

    let seed = settings.seed.unwrap_or_else(rand::random);
    log::info!("Game initialized with seed: {}", seed);

    let mut audio = AudioEngine::new(settings.audio.clone(), default_factory());
    let mut renderer = LogRenderer::default();
    let period = settings.tick_period();

    let mut game = GameLoop::new(&settings, seed, &mut audio, Instant::now());
    game.set_autopilot(true);

    let mut next_tick = Instant::now();
    let mut ticks = 0u64;
    let final_score = loop {
        let report = game.on_tick(Instant::now());
        renderer.render(&report.snapshot);

        if let TickSignal::GameOver(score) = report.signal {
            break score;
        }

        ticks += 1;
        if max_ticks.is_some_and(|limit| ticks >= limit) {
            log::info!("Tick limit reached");
            break game.score();
        }

        // Fixed period; skip ahead instead of bursting after a stall
        next_tick += period;
        match next_tick.checked_duration_since(Instant::now()) {
            Some(wait) => thread::sleep(wait),
            None => next_tick = Instant::now(),
        }
    };

    // Shutting the audio down lets the game-over notes play out
    game.decline();
    log::info!("Final score: {} ({} frames)", final_score, renderer.frames());
    if let Some(message) = encouragement(final_score) {
        log::info!("{}", message);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser shell; the library is driven by the host page
}
