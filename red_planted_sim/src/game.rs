// Top-level game state: one round of Red Planted.
//
// `GameState` owns everything a round needs (config, PRNG, artwork table,
// planet, sectors, rocks, spaceship) plus the view state the input handlers
// depend on: the planet rotation, the minimap rectangle, and the interaction
// records of the last main-view render. The frontend drives it with four
// kinds of calls:
//
// - `update()` once per simulation tick. Sectors grow and rot, harvest
//   animations advance, then the spaceship and its flies move. Returns a
//   `StepResult` with the events of the tick plus any queued by input or
//   rendering since the last update.
// - `render()`, `render_minimap()` and `render_overlay()` once per frame,
//   into a `RenderSink`. Only `render()` rebuilds the interaction list.
// - `scroll()`, `mouse_down()`, `mouse_up()` for input.
// - `cursor_at()` for cursor feedback.
//
// Click dispatch walks the records under the pointer in priority order
// (fruit, plant, fly, sector, other) and stops at the first receiver that
// accepts the click. Sectors and the minimap never accept, so a click on
// empty canopy falls through to nothing.
//
// Time is deterministic: `now()` is the tick count over `ticks_per_second`,
// never the wall clock, so a seed and a list of inputs replay exactly.
//
// See also: `sector.rs`, `spaceship.rs`, `interaction.rs`, `event.rs`.

use crate::artwork::Artwork;
use crate::config::GameConfig;
use crate::event::{GameEvent, GameEventKind};
use crate::interaction::{
    ClickPriority, CursorMode, InteractionList, InteractionRecord, InteractionTarget,
    LABEL_MINIMAP,
};
use crate::planet::Planet;
use crate::render::{Camera, Color, Layer, RenderSink, Viewport};
use crate::sector::Sector;
use crate::spaceship::{ShipTick, Spaceship};
use crate::types::SurfaceCoordinate;
use kurbo::{Point, Rect, Size, Vec2};
use red_planted_prng::GameRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Zoom adjustment for ship and flies when drawn into the minimap.
const MINIMAP_ZOOM_ADJUSTMENT: f64 = 2.0;

/// Offset of the score counter from the minimap's bottom-right corner.
const SCORE_COUNTER_OFFSET: Vec2 = Vec2::new(-55.0, 23.0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    Running,
    FliesWin,
    PlayerWins,
}

/// Result of a single `update()`.
#[derive(Clone, Debug, Default)]
pub struct StepResult {
    pub events: Vec<GameEvent>,
}

/// Cursor the frontend should show at a point.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CursorFeedback {
    pub mode: CursorMode,
    /// Cursor rotation in degrees, set when hovering a plant.
    pub rotation_degrees: Option<f64>,
}

// ---------------------------------------------------------------------------
// Scenery and animations
// ---------------------------------------------------------------------------

/// Decorative rock between two sectors.
#[derive(Clone, Copy, Debug)]
pub struct Rock {
    pub position: SurfaceCoordinate,
    pub sprite: usize,
}

impl Rock {
    pub fn draw(&self, sink: &mut dyn RenderSink, planet: &Planet, artwork: &Artwork) {
        let sprite = artwork.rock(self.sprite);
        sink.push_transform();
        planet.apply_surface_transform(sink, self.position);
        sink.draw_sprite(
            sprite,
            Point::new(-sprite.size.width / 2.0, -sprite.size.height + 10.0),
            Vec2::new(1.0, 1.0),
            Layer::Ground,
        );
        sink.pop_transform();
    }
}

/// A picked tomato flying from the click point into the score counter, in
/// overlay coordinates.
#[derive(Clone, Copy, Debug)]
pub struct HarvestedTomato {
    pub start: Point,
    pub target: Point,
    pub position: Point,
    started: f64,
    duration: f64,
    pub done: bool,
}

impl HarvestedTomato {
    pub fn new(start: Point, target: Point, now: f64, duration: f64) -> Self {
        Self {
            start,
            target,
            position: start,
            started: now,
            duration,
            done: false,
        }
    }

    /// Advance to `now`. Returns true on the update that finishes the flight.
    pub fn update(&mut self, now: f64) -> bool {
        if self.done {
            return false;
        }
        let alpha = if self.duration > 0.0 {
            ((now - self.started) / self.duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let eased = 1.0 - (1.0 - alpha) * (1.0 - alpha);
        self.position = self.start.lerp(self.target, eased);
        if alpha >= 1.0 {
            self.done = true;
            return true;
        }
        false
    }

    pub fn draw(&self, sink: &mut dyn RenderSink, artwork: &Artwork) {
        let sprite = artwork.ripe_tomato();
        sink.draw_sprite(
            sprite,
            self.position - sprite.size.to_vec2() / 2.0,
            Vec2::new(1.0, 1.0),
            Layer::Fruit,
        );
    }
}

// ---------------------------------------------------------------------------
// Game state
// ---------------------------------------------------------------------------

pub struct GameState {
    pub config: GameConfig,
    pub rng: GameRng,
    pub artwork: Artwork,
    pub planet: Planet,
    pub sectors: Vec<Sector>,
    pub rocks: Vec<Rock>,
    pub spaceship: Spaceship,
    /// Ticks simulated so far.
    pub tick: u64,
    /// View rotation in degrees, `[0, 360)`.
    pub rotation_angle_degrees: f64,
    pub tomato_score: u32,
    pub harvested_tomatoes: Vec<HarvestedTomato>,
    pub viewport: Viewport,
    /// Minimap placement in overlay coordinates.
    pub minimap_rect: Rect,
    /// Interaction records of the last main-view render.
    interactions: InteractionList,
    harvest_on_mouseup: bool,
    pending: Vec<GameEventKind>,
    game_over_reported: bool,
}

impl GameState {
    /// Start a round with the default artwork table.
    pub fn new(seed: u64, config: GameConfig) -> Self {
        Self::with_artwork(seed, config, Artwork::default())
    }

    pub fn with_artwork(seed: u64, config: GameConfig, artwork: Artwork) -> Self {
        let mut rng = GameRng::new(seed);
        let planet = Planet::new(&config.planet);

        let count = config.sectors.count;
        let mut sectors = Vec::with_capacity(count);
        let mut rocks = Vec::with_capacity(count);
        for i in 0..count {
            let base_angle = i as f64 * config.sectors.spread_degrees / count as f64;
            let sector = Sector::new(i, base_angle, &config, &artwork, &mut rng);
            rocks.push(Rock {
                position: SurfaceCoordinate::on_surface(
                    sector.center_angle() + 0.5 * 360.0 / count as f64,
                ),
                sprite: artwork.random_rock(&mut rng),
            });
            sectors.push(sector);
        }

        let spaceship = Spaceship::new(&sectors, &config, &mut rng);

        let viewport = Viewport::new(config.view.viewport_width, config.view.viewport_height);
        let minimap_size =
            Size::new(viewport.width, viewport.height) * config.view.minimap_fraction;
        let border = config.view.minimap_border;
        let minimap_rect = Rect::from_origin_size(
            Point::new(viewport.width - border - minimap_size.width, border),
            minimap_size,
        );

        info!(seed, sectors = count, flies = spaceship.flies.len(), "round started");

        Self {
            config,
            rng,
            artwork,
            planet,
            sectors,
            rocks,
            spaceship,
            tick: 0,
            rotation_angle_degrees: 0.0,
            tomato_score: 0,
            harvested_tomatoes: Vec::new(),
            viewport,
            minimap_rect,
            interactions: InteractionList::new(),
            harvest_on_mouseup: false,
            pending: Vec::new(),
            game_over_reported: false,
        }
    }

    /// Game time in seconds.
    pub fn now(&self) -> f64 {
        self.tick as f64 / f64::from(self.config.view.ticks_per_second.max(1))
    }

    pub fn status(&self) -> GameStatus {
        if self.spaceship.total_collected_tomatoes >= self.config.flies_win_threshold {
            GameStatus::FliesWin
        } else if self.tomato_score >= self.config.player_wins_threshold {
            GameStatus::PlayerWins
        } else {
            GameStatus::Running
        }
    }

    pub fn interactions(&self) -> &InteractionList {
        &self.interactions
    }

    /// Replace every sector's plants with fresh ones.
    pub fn make_new_plants(&mut self) {
        for sector in &mut self.sectors {
            sector.make_new_plants(&self.config.plants, &self.artwork, &mut self.rng);
        }
    }

    /// Advance one tick. A finished round no longer changes; its single
    /// `GameOver` event is reported by the first update after it ended.
    pub fn update(&mut self) -> StepResult {
        if self.status() == GameStatus::Running {
            self.tick += 1;
            let now = self.now();

            for sector in &mut self.sectors {
                sector.update(&self.config.plants);
            }

            for tomato in &mut self.harvested_tomatoes {
                if tomato.update(now) {
                    self.tomato_score += 1;
                    debug!(score = self.tomato_score, "tomato harvested");
                    self.pending.push(GameEventKind::TomatoHarvested {
                        score: self.tomato_score,
                    });
                }
            }
            self.harvested_tomatoes.retain(|t| !t.done);

            self.spaceship.update(
                ShipTick {
                    sectors: &mut self.sectors,
                    planet: &self.planet,
                    artwork: &self.artwork,
                    config: &self.config,
                    now,
                },
                &mut self.rng,
                &mut self.pending,
            );
        }

        let status = self.status();
        if status != GameStatus::Running && !self.game_over_reported {
            self.game_over_reported = true;
            info!(
                ?status,
                tick = self.tick,
                harvested = self.tomato_score,
                stolen = self.spaceship.total_collected_tomatoes,
                "game over"
            );
            self.pending.push(GameEventKind::GameOver { status });
        }

        let tick = self.tick;
        StepResult {
            events: self
                .pending
                .drain(..)
                .map(|kind| GameEvent { tick, kind })
                .collect(),
        }
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    pub fn world_camera(&self) -> Camera {
        Camera::world(
            self.viewport,
            &self.planet,
            1.0,
            self.rotation_angle_degrees / 360.0,
        )
    }

    pub fn minimap_camera(&self) -> Camera {
        Camera::world(
            self.viewport,
            &self.planet,
            0.0,
            self.rotation_angle_degrees / 360.0,
        )
        .in_rect(self.minimap_rect)
    }

    /// Draw the main view and rebuild the interaction list from it.
    pub fn render(&mut self, sink: &mut dyn RenderSink) {
        let now = self.now();
        let params = &self.config.plants;
        sink.set_camera(self.world_camera());

        let mut interactions = InteractionList::new();
        for sector in &mut self.sectors {
            let frame = sector.draw(sink, &self.planet, &self.artwork, now, params);
            interactions.append(frame.interactions);
            for fruit in frame.ripened {
                self.pending.push(GameEventKind::FruitRipened { fruit });
            }
        }

        for rock in &self.rocks {
            rock.draw(sink, &self.planet, &self.artwork);
        }

        let flies = self.spaceship.draw(
            sink,
            &self.planet,
            &self.artwork,
            &self.sectors,
            now,
            0.0,
            false,
            &self.config.flies,
        );
        interactions.append(flies);

        interactions.push(InteractionRecord::new(
            LABEL_MINIMAP,
            Color::rgb(0, 255, 255),
            self.minimap_rect,
            InteractionTarget::Minimap,
            ClickPriority::Other,
        ));
        self.interactions = interactions;
    }

    /// Draw the zoomed-out planet into the minimap rectangle. Plants are
    /// left out and nothing becomes clickable.
    pub fn render_minimap(&mut self, sink: &mut dyn RenderSink) {
        let now = self.now();
        sink.set_camera(self.minimap_camera());
        for rock in &self.rocks {
            rock.draw(sink, &self.planet, &self.artwork);
        }
        self.spaceship.draw(
            sink,
            &self.planet,
            &self.artwork,
            &self.sectors,
            now,
            MINIMAP_ZOOM_ADJUSTMENT,
            true,
            &self.config.flies,
        );
    }

    /// Draw overlay elements in pixel coordinates.
    pub fn render_overlay(&self, sink: &mut dyn RenderSink) {
        sink.set_camera(Camera::overlay(self.viewport));
        for tomato in &self.harvested_tomatoes {
            tomato.draw(sink, &self.artwork);
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Rotate the planet. Either scroll axis turns it.
    pub fn scroll(&mut self, dx: f64, dy: f64) {
        let amount = dy - dx;
        if amount == 0.0 {
            return;
        }
        for sector in &mut self.sectors {
            sector.invalidate_aabb();
        }
        let degrees = amount * self.config.view.scroll_sensitivity / self.planet.circumference();
        self.rotation_angle_degrees = (self.rotation_angle_degrees + degrees).rem_euclid(360.0);
    }

    /// Dispatch a click at an overlay point. Returns the target that
    /// accepted it.
    pub fn mouse_down(&mut self, point: Point) -> Option<InteractionTarget> {
        if self.status() != GameStatus::Running {
            return None;
        }
        let hits: Vec<InteractionRecord> = self.interactions.hits(point).cloned().collect();
        for record in hits {
            debug!("clicked on: {}", record.label);
            if self.dispatch_click(&record.target) {
                debug!("click was handled");
                return Some(record.target);
            }
        }
        None
    }

    fn dispatch_click(&mut self, target: &InteractionTarget) -> bool {
        match target {
            InteractionTarget::Fruit(fruit) => {
                let shake = self.config.plants.shake_amplitude;
                let picked = self
                    .sectors
                    .get_mut(fruit.plant.sector)
                    .and_then(|s| s.plant_mut(fruit.plant))
                    .is_some_and(|p| p.pick_fruit(&fruit.branch, shake));
                if picked {
                    self.harvest_on_mouseup = true;
                    self.pending.push(GameEventKind::FruitPicked {
                        fruit: fruit.clone(),
                    });
                }
                picked
            }
            InteractionTarget::Plant(id) => {
                let Some(sector) = self.sectors.get_mut(id.sector) else {
                    return false;
                };
                match sector.replant(*id, &self.config.plants, &self.artwork, &mut self.rng) {
                    Some(new) => {
                        self.pending.push(GameEventKind::PlantCut { old: *id, new });
                        true
                    }
                    None => false,
                }
            }
            InteractionTarget::Fly(id) => {
                let swatted = self.spaceship.swat(*id);
                if swatted {
                    self.pending.push(GameEventKind::FlySwatted { fly: *id });
                }
                swatted
            }
            InteractionTarget::Sector(index) => self
                .sectors
                .get(*index)
                .is_some_and(Sector::clicked),
            InteractionTarget::Minimap => false,
        }
    }

    /// Finish a click. A picked fruit starts flying into the score counter.
    pub fn mouse_up(&mut self, point: Point) {
        if !std::mem::take(&mut self.harvest_on_mouseup) {
            return;
        }
        let target = Point::new(self.minimap_rect.x1, self.minimap_rect.y1) + SCORE_COUNTER_OFFSET;
        self.harvested_tomatoes.push(HarvestedTomato::new(
            point,
            target,
            self.now(),
            self.config.view.harvest_animation_secs,
        ));
    }

    /// Cursor for the topmost-priority record under `point`.
    pub fn cursor_at(&self, point: Point) -> Option<CursorFeedback> {
        if self.status() != GameStatus::Running {
            return None;
        }
        let record = self.interactions.first_hit(point)?;
        let mode = record.target.cursor()?;
        let rotation_degrees = match &record.target {
            InteractionTarget::Plant(id) => self
                .sectors
                .get(id.sector)
                .and_then(|s| s.plant(*id))
                .map(|p| self.rotation_angle_degrees + p.position.angle_degrees),
            _ => None,
        };
        Some(CursorFeedback {
            mode,
            rotation_degrees,
        })
    }
}
