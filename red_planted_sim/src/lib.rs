// red_planted_sim: pure Rust game core for Red Planted.
//
// A planet seen from an orbiting camera, sectors of procedurally grown tomato
// plants, a player who harvests and cuts them, and fruit flies that try to
// steal the same tomatoes. This crate owns the growth model, the planetary
// coordinate system, the per-frame interaction geometry, and the adversary
// agents. It has no window, GPU, or audio dependencies: drawing goes through
// the `RenderSink` trait and sounds are reported as `GameEvent`s.
//
// Module overview:
// - `game.rs`:        Top-level GameState: tick loop, render passes, click
//                      dispatch, cursor feedback.
// - `sector.rs`:      Angular slices of the planet that own plants, replanting,
//                      and the plant trash heap.
// - `plant.rs`:       A plant: growth/rot state machine, wind/shake, AABB derivation, draw pass.
// - `branch.rs`:      Recursive branch tree: stochastic construction and per-frame geometry.
// - `planet.rs`:      Planet geometry and the surface transform.
// - `types.rs`:       SurfaceCoordinate, plant/fly IDs, branch paths, vector helpers.
// - `interaction.rs`: Clickable regions, click priorities, hit-testing, AABB helpers.
// - `render.rs`:      RenderSink trait, transform stack, camera, recording sink.
// - `artwork.rs`:     Sprite handles and sizes (tomato ripeness stages, leaves, rocks, fly frames).
// - `fly.rs`:         FruitFly: roams around the spaceship, steals ripe fruit.
// - `spaceship.rs`:   The flies' mobile base: descends on sectors, breeds flies.
// - `timebox.rs`:     TimeBoxed<T>: entries that expire after a fixed number of ticks.
// - `event.rs`:       GameEvent: things the frontend turns into sounds and UI updates.
// - `config.rs`:      GameConfig and nested parameter groups, JSON loading and validation.
// - `error.rs`:       ConfigError.
// - `prng`:           Re-exported from `red_planted_prng`: GameRng and the RandomSource seam.
//
// Control flow per tick: `GameState::update()` drives `Sector::update()`,
// which drives `Plant::update()` and `Branch::update()`, then the spaceship
// and its flies. Per frame: `GameState::render()` walks the same trees,
// derives branch geometry, emits draw primitives, and rebuilds the
// interaction list used for clicks and cursor feedback.
//
// All randomness flows through a seeded `GameRng` owned by the game state, so
// a run is reproducible from its seed and config.

pub mod artwork;
pub mod branch;
pub mod config;
pub mod error;
pub mod event;
pub mod fly;
pub mod game;
pub mod interaction;
pub mod planet;
pub mod plant;
pub use red_planted_prng as prng;
pub mod render;
pub mod sector;
pub mod spaceship;
pub mod timebox;
pub mod types;
