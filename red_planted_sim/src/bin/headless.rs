// Headless driver for the Red Planted game core.
//
// Runs one round without a window: ticks the game, renders into a
// `RecordingSink` at a fixed frame interval, and logs what happened. With
// `--autoplay` a scripted player clicks every ripe fruit and every fly it
// can see on each rendered frame, which is enough to play a round to the end
// and to exercise click dispatch outside the tests.
//
// Usage:
//   red_planted_headless [OPTIONS]
//     --seed <N>            PRNG seed (default: 1)
//     --ticks <N>           Ticks to simulate at most (default: 36000)
//     --render-every <N>    Render a frame every N ticks (default: 1)
//     --config <PATH>       Load a JSON GameConfig
//     --fast                Use the accelerated preset
//     --autoplay            Click ripe fruit and flies automatically
//
// Logging follows RUST_LOG and defaults to `info`.

use red_planted_sim::config::GameConfig;
use red_planted_sim::event::GameEventKind;
use red_planted_sim::game::{GameState, GameStatus};
use red_planted_sim::interaction::InteractionTarget;
use red_planted_sim::render::RecordingSink;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

struct Options {
    seed: u64,
    ticks: u64,
    render_every: u64,
    config_path: Option<String>,
    fast: bool,
    autoplay: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            seed: 1,
            ticks: 36_000,
            render_every: 1,
            config_path: None,
            fast: false,
            autoplay: false,
        }
    }
}

#[derive(Default)]
struct Tally {
    picked: u32,
    cut: u32,
    swatted: u32,
    stolen: u32,
    bred: u32,
    ripened: u32,
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let options = parse_args();
    let config = match load_config(&options) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };

    let mut game = GameState::new(options.seed, config);
    let mut sink = RecordingSink::new(game.world_camera());
    let mut tally = Tally::default();
    let mut primitives = 0usize;

    for _ in 0..options.ticks {
        let result = game.update();
        for event in &result.events {
            match &event.kind {
                GameEventKind::FruitPicked { .. } => tally.picked += 1,
                GameEventKind::PlantCut { .. } => tally.cut += 1,
                GameEventKind::FlySwatted { .. } => tally.swatted += 1,
                GameEventKind::FruitStolen { .. } => tally.stolen += 1,
                GameEventKind::FlyBred { .. } => tally.bred += 1,
                GameEventKind::FruitRipened { .. } => tally.ripened += 1,
                GameEventKind::TomatoDelivered { .. } | GameEventKind::TomatoHarvested { .. } => {}
                GameEventKind::GameOver { status } => {
                    info!(tick = event.tick, ?status, "round finished");
                }
            }
        }
        if game.status() != GameStatus::Running {
            break;
        }

        if game.tick % options.render_every.max(1) == 0 {
            sink.clear();
            game.render(&mut sink);
            game.render_minimap(&mut sink);
            game.render_overlay(&mut sink);
            primitives = sink.commands().len();
            if options.autoplay {
                autoplay(&mut game);
            }
        }

        if game.tick % (u64::from(game.config.view.ticks_per_second) * 10).max(1) == 0 {
            info!(
                tick = game.tick,
                score = game.tomato_score,
                stolen = game.spaceship.total_collected_tomatoes,
                flies = game.spaceship.flies.len(),
                primitives,
                "progress"
            );
        }
    }

    if game.status() == GameStatus::Running {
        warn!(tick = game.tick, "tick limit reached before the round ended");
    }
    info!(
        ticks = game.tick,
        status = ?game.status(),
        score = game.tomato_score,
        stolen = game.spaceship.total_collected_tomatoes,
        picked = tally.picked,
        ripened = tally.ripened,
        cut = tally.cut,
        swatted = tally.swatted,
        fruit_stolen = tally.stolen,
        bred = tally.bred,
        "summary"
    );
}

/// Click every ripe fruit and every fly of the last frame, one at a time.
fn autoplay(game: &mut GameState) {
    let targets: Vec<_> = game
        .interactions()
        .iter()
        .filter(|r| matches!(r.target, InteractionTarget::Fruit(_) | InteractionTarget::Fly(_)))
        .map(|r| r.region.center())
        .collect();
    for point in targets {
        game.mouse_down(point);
        game.mouse_up(point);
    }
}

fn load_config(options: &Options) -> Result<GameConfig, Box<dyn std::error::Error>> {
    let config = match &options.config_path {
        Some(path) => GameConfig::from_json(&std::fs::read_to_string(path)?)?,
        None if options.fast => GameConfig::fast(),
        None => GameConfig::default(),
    };
    Ok(config)
}

/// Parse command-line arguments with plain `std::env::args()` matching.
fn parse_args() -> Options {
    let mut options = Options::default();
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--seed" => {
                i += 1;
                options.seed = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--seed requires a number");
                    std::process::exit(1);
                });
            }
            "--ticks" => {
                i += 1;
                options.ticks = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--ticks requires a number");
                    std::process::exit(1);
                });
            }
            "--render-every" => {
                i += 1;
                options.render_every =
                    args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                        eprintln!("--render-every requires a number");
                        std::process::exit(1);
                    });
            }
            "--config" => {
                i += 1;
                options.config_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--fast" => options.fast = true,
            "--autoplay" => options.autoplay = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    options
}

fn print_usage() {
    println!("Usage: red_planted_headless [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --seed <N>            PRNG seed (default: 1)");
    println!("  --ticks <N>           Ticks to simulate at most (default: 36000)");
    println!("  --render-every <N>    Render a frame every N ticks (default: 1)");
    println!("  --config <PATH>       Load a JSON GameConfig");
    println!("  --fast                Use the accelerated preset");
    println!("  --autoplay            Click ripe fruit and flies automatically");
    println!("  --help, -h            Show this help");
}
