// Data-driven game configuration.
//
// Every gameplay tunable lives in `GameConfig`, loadable from JSON. The core
// reads thresholds, speeds, and lifetimes from here instead of hard-coding
// them, so balance can be iterated without recompiling. `GameConfig::fast()`
// is the accelerated preset used to get to the interesting part of a round
// quickly (fast growth, low win thresholds, frequent breeding).
//
// Parameters are grouped into nested structs by the object they tune:
// `PlanetParams`, `SectorParams`, `PlantParams`, `FlyParams`, `SpaceshipParams`,
// `ViewParams`.
// Top-level fields are the round-level rules (win thresholds, fly population,
// global growth speed, fertility range).
//
// See also: `game.rs` which owns the config as part of `GameState`,
// `sector.rs` which rolls per-sector fertility and speeds from these ranges,
// `error.rs` for `ConfigError`.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Nested parameter groups
// ---------------------------------------------------------------------------

/// Planet geometry.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanetParams {
    /// Planet radius in world units. Must be positive.
    pub radius: f64,
    /// Atmosphere height is `max(min_atmosphere_height, radius * atmosphere_fraction)`.
    pub min_atmosphere_height: f64,
    pub atmosphere_fraction: f64,
}

/// One entry of the plant-count table: how many plants a sector holds and
/// how wide (before the multiplier) the sector is in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlantLayout {
    pub plants: usize,
    pub width_degrees: f64,
}

/// Sector layout and per-sector random ranges.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SectorParams {
    /// Number of sectors around the planet.
    pub count: usize,
    /// Sector base angles are spread over `[0, spread_degrees)`.
    pub spread_degrees: f64,
    /// Plant-count choices, one picked uniformly per sector.
    pub layouts: Vec<PlantLayout>,
    /// Multiplier applied to `PlantLayout::width_degrees`.
    pub width_multiplier: f64,
    /// Per-sector growth speed is `uniform(range) * GameConfig::growth_speed`.
    pub growth_speed_range: (f64, f64),
    /// Per-sector health loss per tick once plants are fully grown.
    pub rotting_speed_range: (f64, f64),
}

/// Plant lifecycle and interaction tunables.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlantParams {
    /// Screen-space padding (px, each side) around derived plant AABBs.
    pub aabb_padding: f64,
    /// Fruit rots once plant health drops below this.
    pub rot_threshold: f64,
    /// Wind amplitude set by a shake; decays by 1 per tick.
    pub shake_amplitude: f64,
    /// Ticks a cut plant keeps drifting away before it is discarded.
    pub trash_lifetime_ticks: u32,
    /// Upward drift per tick of a cut plant, in local units.
    pub trash_drift_per_tick: f64,
    /// Spin per tick of a cut plant, in radians.
    pub trash_spin_per_tick: f64,
    /// Root branch length is drawn from this range before fertility scaling.
    pub root_length_range: (f64, f64),
    pub wind_speed_range: (f64, f64),
}

/// Fruit fly tunables.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FlyParams {
    /// Flight speed (world units per tick) while carrying a tomato.
    pub speed_carrying: f64,
    /// Flight speed (world units per tick) otherwise.
    pub speed_free: f64,
    /// Screen-space padding (px, each side) around a fly's clickable region.
    pub aabb_padding: f64,
    /// Ticks a swatted fly keeps drifting away before it is discarded.
    pub dead_lifetime_ticks: u32,
    pub escape_drift_per_tick: f64,
    pub escape_spin_per_tick: f64,
}

/// Spaceship flight tunables.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpaceshipParams {
    /// Elevation when a round starts.
    pub start_elevation: f64,
    /// Elevation the ship hovers at above its target sector.
    pub hover_elevation: f64,
    /// Per-tick blend factor toward the target coordinate.
    pub approach_alpha: f64,
    /// The ship counts as near its sector below `hover + near_elevation_margin`...
    pub near_elevation_margin: f64,
    /// ...and within this many degrees of the sector centre.
    pub near_angle_degrees: f64,
}

/// Camera, timing, and overlay layout.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewParams {
    pub viewport_width: f64,
    pub viewport_height: f64,
    /// Simulation ticks per second of game time.
    pub ticks_per_second: u32,
    /// Degrees of rotation per scroll unit are `scroll_sensitivity / circumference`.
    pub scroll_sensitivity: f64,
    /// Minimap size as a fraction of the viewport.
    pub minimap_fraction: f64,
    /// Minimap distance from the top-right viewport corner.
    pub minimap_border: f64,
    /// Seconds a harvested tomato takes to fly into the score counter.
    pub harvest_animation_secs: f64,
}

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// All gameplay tunables for a round.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GameConfig {
    /// Flies win once they have delivered this many tomatoes.
    pub flies_win_threshold: u32,
    /// The player wins once this many tomatoes have been harvested.
    pub player_wins_threshold: u32,
    /// The spaceship tops its fleet up to `min_flies` every N ticks.
    pub breeding_every_n_ticks: u64,
    /// The spaceship considers switching sectors every N ticks.
    pub moving_to_other_sector_every_n_ticks: u64,
    /// Delivered tomatoes needed to breed one extra fly.
    pub tomatoes_per_fly: u32,
    pub min_flies: usize,
    pub max_flies: usize,
    /// Global multiplier on per-sector growth speed.
    pub growth_speed: f64,
    /// Per-sector fertility is drawn from this range and truncated.
    pub fertility: (f64, f64),

    pub planet: PlanetParams,
    pub sectors: SectorParams,
    pub plants: PlantParams,
    pub flies: FlyParams,
    pub spaceship: SpaceshipParams,
    pub view: ViewParams,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            flies_win_threshold: 10,
            player_wins_threshold: 25,
            breeding_every_n_ticks: 400,
            moving_to_other_sector_every_n_ticks: 50,
            tomatoes_per_fly: 1,
            min_flies: 3,
            max_flies: 12,
            growth_speed: 3.0,
            fertility: (20.0, 50.0),
            planet: PlanetParams {
                radius: 500.0,
                min_atmosphere_height: 100.0,
                atmosphere_fraction: 0.4,
            },
            sectors: SectorParams {
                count: 5,
                spread_degrees: 340.0,
                layouts: vec![
                    PlantLayout {
                        plants: 2,
                        width_degrees: 5.0,
                    },
                    PlantLayout {
                        plants: 3,
                        width_degrees: 6.0,
                    },
                    PlantLayout {
                        plants: 5,
                        width_degrees: 14.0,
                    },
                    PlantLayout {
                        plants: 6,
                        width_degrees: 14.0,
                    },
                ],
                width_multiplier: 3.0,
                growth_speed_range: (0.02, 0.06),
                rotting_speed_range: (0.01, 0.02),
            },
            plants: PlantParams {
                aabb_padding: 40.0,
                rot_threshold: 25.0,
                shake_amplitude: 90.0,
                trash_lifetime_ticks: 180,
                trash_drift_per_tick: 10.0,
                trash_spin_per_tick: 0.1,
                root_length_range: (100.0, 500.0),
                wind_speed_range: (0.9, 1.3),
            },
            flies: FlyParams {
                speed_carrying: 2.0,
                speed_free: 4.0,
                aabb_padding: 40.0,
                dead_lifetime_ticks: 180,
                escape_drift_per_tick: 10.0,
                escape_spin_per_tick: 0.1,
            },
            spaceship: SpaceshipParams {
                start_elevation: 2000.0,
                hover_elevation: 300.0,
                approach_alpha: 0.01,
                near_elevation_margin: 50.0,
                near_angle_degrees: 15.0,
            },
            view: ViewParams {
                viewport_width: 1280.0,
                viewport_height: 720.0,
                ticks_per_second: 60,
                scroll_sensitivity: 30000.0,
                minimap_fraction: 1.0 / 8.0,
                minimap_border: 20.0,
                harvest_animation_secs: 0.6,
            },
        }
    }
}

impl GameConfig {
    /// Accelerated round: plants grow fast, flies breed and move often, and
    /// both sides win after four tomatoes.
    pub fn fast() -> Self {
        Self {
            flies_win_threshold: 4,
            player_wins_threshold: 4,
            breeding_every_n_ticks: 100,
            moving_to_other_sector_every_n_ticks: 10,
            growth_speed: 100.0,
            ..Self::default()
        }
    }

    /// Parse and validate a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the game cannot run with. Values that merely look odd
    /// (e.g. fertility outside the usual band) are accepted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.planet.radius.is_nan() || self.planet.radius <= 0.0 {
            return Err(ConfigError::invalid(
                "planet.radius",
                format!("must be positive, got {}", self.planet.radius),
            ));
        }
        check_range("fertility", self.fertility)?;
        check_range("sectors.growth_speed_range", self.sectors.growth_speed_range)?;
        check_range("sectors.rotting_speed_range", self.sectors.rotting_speed_range)?;
        check_range("plants.root_length_range", self.plants.root_length_range)?;
        check_range("plants.wind_speed_range", self.plants.wind_speed_range)?;
        if self.sectors.count == 0 {
            return Err(ConfigError::invalid("sectors.count", "need at least one sector"));
        }
        if self.sectors.layouts.is_empty() {
            return Err(ConfigError::invalid("sectors.layouts", "need at least one layout"));
        }
        if let Some(layout) = self.sectors.layouts.iter().find(|l| l.plants == 0) {
            return Err(ConfigError::invalid(
                "sectors.layouts",
                format!("layout with width {} has no plants", layout.width_degrees),
            ));
        }
        if self.view.ticks_per_second == 0 {
            return Err(ConfigError::invalid("view.ticks_per_second", "must be non-zero"));
        }
        if self.plants.trash_lifetime_ticks == 0 {
            return Err(ConfigError::invalid("plants.trash_lifetime_ticks", "must be non-zero"));
        }
        if self.flies.dead_lifetime_ticks == 0 {
            return Err(ConfigError::invalid("flies.dead_lifetime_ticks", "must be non-zero"));
        }
        let alpha = self.spaceship.approach_alpha;
        if alpha.is_nan() || alpha <= 0.0 || alpha > 1.0 {
            return Err(ConfigError::invalid(
                "spaceship.approach_alpha",
                format!("must be in (0, 1], got {alpha}"),
            ));
        }
        if self.breeding_every_n_ticks == 0 || self.moving_to_other_sector_every_n_ticks == 0 {
            return Err(ConfigError::invalid(
                "breeding_every_n_ticks",
                "tick intervals must be non-zero",
            ));
        }
        if self.min_flies > self.max_flies {
            return Err(ConfigError::invalid(
                "min_flies",
                format!("{} exceeds max_flies {}", self.min_flies, self.max_flies),
            ));
        }
        Ok(())
    }
}

fn check_range(field: &'static str, (low, high): (f64, f64)) -> Result<(), ConfigError> {
    if low.is_finite() && high.is_finite() && low <= high {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("bad range ({low}, {high})")))
    }
}
