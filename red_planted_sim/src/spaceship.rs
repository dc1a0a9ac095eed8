// The spaceship: the flies' mobile base.
//
// The ship starts high above a randomly chosen sector and eases toward a
// hover point above the sector centre, blending its coordinate toward a
// wobbling target by a fixed fraction every tick. Once it hovers low enough
// and close enough to the centre it counts as "near" the sector, which is
// what lets its flies go raiding.
//
// Every `breeding_every_n_ticks` the fleet is topped up to `min_flies`.
// Every `moving_to_other_sector_every_n_ticks`, if the current sector is
// cleared (all flies idle around the ship), the ship retargets, preferring
// sectors that showed ripe fruit on the last draw. Delivered tomatoes count
// toward the flies' win and every `tomatoes_per_fly` of them breeds an extra
// fly, up to `max_flies`.
//
// Swatted flies move to a time-boxed dead list and keep drifting out of
// orbit until they expire.
//
// See also: `fly.rs` for fly behaviour, `sector.rs` for ripe fruit lists.

use crate::artwork::Artwork;
use crate::config::{FlyParams, GameConfig};
use crate::event::GameEventKind;
use crate::fly::{FlyDrawContext, FlyWorld, FruitFly};
use crate::interaction::InteractionList;
use crate::planet::Planet;
use crate::render::{Layer, RenderSink};
use crate::sector::Sector;
use crate::timebox::TimeBoxed;
use crate::types::{FlyId, FruitRef, SurfaceCoordinate};
use kurbo::{Point, Vec2};
use red_planted_prng::RandomSource;
use tracing::{debug, info};

#[derive(Clone, Debug)]
pub struct Spaceship {
    /// Index of the sector the ship is heading for.
    pub target_sector: usize,
    pub near_target_sector: bool,
    pub coordinates: SurfaceCoordinate,
    pub target_coordinates: SurfaceCoordinate,
    pub ticks: u64,
    pub flies: Vec<FruitFly>,
    pub dead_flies: TimeBoxed<FruitFly>,
    pub total_collected_tomatoes: u32,
    pub tomato_to_fly_counter: u32,
    next_fly_id: u64,
}

/// Inputs to one spaceship update.
pub struct ShipTick<'a> {
    pub sectors: &'a mut [Sector],
    pub planet: &'a Planet,
    pub artwork: &'a Artwork,
    pub config: &'a GameConfig,
    /// Game time in seconds.
    pub now: f64,
}

impl Spaceship {
    /// A ship high above a random sector with a starting fleet.
    pub fn new<R: RandomSource>(sectors: &[Sector], config: &GameConfig, rng: &mut R) -> Self {
        let target_sector = pick_target_sector(sectors, rng);
        let centre = sectors
            .get(target_sector)
            .map(Sector::center_angle)
            .unwrap_or(0.0);
        let flight = &config.spaceship;
        let mut ship = Self {
            target_sector,
            near_target_sector: false,
            coordinates: SurfaceCoordinate::new(centre, flight.start_elevation),
            target_coordinates: SurfaceCoordinate::new(centre, flight.hover_elevation),
            ticks: 0,
            flies: Vec::new(),
            dead_flies: TimeBoxed::new(config.flies.dead_lifetime_ticks),
            total_collected_tomatoes: 0,
            tomato_to_fly_counter: 0,
            next_fly_id: 0,
        };
        ship.breed_flies_if_needed(config, rng);
        ship
    }

    pub fn world_position(&self, planet: &Planet) -> Point {
        planet.at(self.coordinates)
    }

    pub fn add_fly<R: RandomSource>(&mut self, rng: &mut R) -> FlyId {
        let id = FlyId(self.next_fly_id);
        self.next_fly_id += 1;
        self.flies.push(FruitFly::new(id, rng));
        id
    }

    /// Top the fleet up to `min_flies`. Returns the new flies.
    pub fn breed_flies_if_needed<R: RandomSource>(
        &mut self,
        config: &GameConfig,
        rng: &mut R,
    ) -> Vec<FlyId> {
        let missing = config.min_flies.saturating_sub(self.flies.len());
        (0..missing).map(|_| self.add_fly(rng)).collect()
    }

    /// Count a delivered tomato. Returns a fly bred as a reward.
    pub fn add_tomato<R: RandomSource>(
        &mut self,
        config: &GameConfig,
        rng: &mut R,
    ) -> Option<FlyId> {
        self.total_collected_tomatoes += 1;
        self.tomato_to_fly_counter += 1;
        if self.tomato_to_fly_counter == config.tomatoes_per_fly
            && self.flies.len() < config.max_flies
        {
            self.tomato_to_fly_counter = 0;
            Some(self.add_fly(rng))
        } else {
            None
        }
    }

    /// First ripe fruit of the target sector no fly is after.
    pub fn available_fruit(&self, sectors: &[Sector]) -> Option<FruitRef> {
        let sector = sectors.get(self.target_sector)?;
        sector
            .ripe_fruits
            .iter()
            .find(|fruit| !self.flies.iter().any(|fly| fly.is_after(fruit)))
            .cloned()
    }

    /// The ship hovers at its sector and every fly idles around it.
    pub fn current_sector_cleared(&self) -> bool {
        self.near_target_sector && self.flies.iter().all(FruitFly::is_idle)
    }

    /// Move a live fly to the dead list. Returns whether it was alive.
    pub fn swat(&mut self, id: FlyId) -> bool {
        let Some(index) = self.flies.iter().position(|f| f.id == id) else {
            return false;
        };
        let fly = self.flies.remove(index);
        self.dead_flies.push(fly);
        debug!(fly = %id, "fly swatted");
        true
    }

    pub fn update<R: RandomSource>(
        &mut self,
        tick: ShipTick<'_>,
        rng: &mut R,
        events: &mut Vec<GameEventKind>,
    ) {
        let config = tick.config;
        let params = &config.flies;
        let flight = &config.spaceship;
        self.ticks += 1;

        if self.ticks % config.breeding_every_n_ticks == 0 {
            for fly in self.breed_flies_if_needed(config, rng) {
                debug!(fly = %fly, "fly bred to fleet minimum");
                events.push(GameEventKind::FlyBred { fly });
            }
        }

        if self.ticks % config.moving_to_other_sector_every_n_ticks == 0
            && self.current_sector_cleared()
        {
            self.target_sector = pick_target_sector(tick.sectors, rng);
            debug!(sector = self.target_sector, "spaceship retargeted");
        }

        let centre = tick
            .sectors
            .get(self.target_sector)
            .map(Sector::center_angle)
            .unwrap_or(self.coordinates.angle_degrees);
        self.target_coordinates = SurfaceCoordinate::new(
            centre + 10.0 * (tick.now / 10.0).sin(),
            flight.hover_elevation + 30.0 * tick.now.cos(),
        );
        self.coordinates = self
            .coordinates
            .lerp(self.target_coordinates, flight.approach_alpha);

        self.near_target_sector = self.coordinates.elevation
            < flight.hover_elevation + flight.near_elevation_margin
            && (self.coordinates.angle_degrees - centre).abs() < flight.near_angle_degrees;

        let ship_position = self.world_position(tick.planet);
        for i in 0..self.flies.len() {
            let available_fruit = self.available_fruit(tick.sectors);
            let mut world = FlyWorld {
                sectors: &mut *tick.sectors,
                ship_position,
                ship_size: tick.artwork.spaceship,
                near_target_sector: self.near_target_sector,
                available_fruit,
                now: tick.now,
                params,
                shake_amplitude: config.plants.shake_amplitude,
            };
            let outcome = self.flies[i].update(&mut world);
            let fly = self.flies[i].id;

            if let Some(fruit) = outcome.stolen {
                debug!(fly = %fly, plant = %fruit.plant, "fruit stolen");
                events.push(GameEventKind::FruitStolen { fly, fruit });
            }
            if outcome.delivered {
                let bred = self.add_tomato(config, rng);
                info!(total = self.total_collected_tomatoes, "tomato delivered to spaceship");
                events.push(GameEventKind::TomatoDelivered {
                    total: self.total_collected_tomatoes,
                });
                if let Some(bred) = bred {
                    debug!(fly = %bred, "fly bred from delivered tomatoes");
                    events.push(GameEventKind::FlyBred { fly: bred });
                }
            }
        }

        self.dead_flies.tick();
    }

    /// Draw the ship and its flies. Returns the flies' interaction records.
    #[allow(clippy::too_many_arguments)]
    pub fn draw(
        &mut self,
        sink: &mut dyn RenderSink,
        planet: &Planet,
        artwork: &Artwork,
        sectors: &[Sector],
        now: f64,
        zoom_adjustment: f64,
        minimap: bool,
        params: &FlyParams,
    ) -> InteractionList {
        let scale_up = 1.0 + zoom_adjustment;
        let sprite = artwork.spaceship();

        sink.push_transform();
        planet.apply_surface_transform(sink, self.coordinates);
        sink.draw_sprite(
            sprite,
            (-sprite.size.to_vec2() / 2.0 * scale_up).to_point(),
            Vec2::new(scale_up, scale_up),
            Layer::Flies,
        );
        sink.pop_transform();

        let ctx = FlyDrawContext {
            planet,
            artwork,
            sectors,
            ship_position: self.world_position(planet),
            ship_angle_degrees: self.coordinates.angle_degrees,
            now,
            scale_up,
            minimap,
            params,
        };

        let mut interactions = InteractionList::new();
        for fly in &mut self.flies {
            if let Some(record) = fly.draw(sink, &ctx, None) {
                interactions.push_front(record);
            }
        }
        for (age, fly) in self.dead_flies.iter_mut() {
            fly.draw(sink, &ctx, Some(age));
        }
        interactions
    }
}

/// A random sector, preferring those with ripe fruit.
pub fn pick_target_sector<R: RandomSource>(sectors: &[Sector], rng: &mut R) -> usize {
    let ripe: Vec<usize> = sectors
        .iter()
        .filter(|s| !s.ripe_fruits.is_empty())
        .map(|s| s.index)
        .collect();
    if !ripe.is_empty() {
        *rng.choose(&ripe)
    } else if sectors.is_empty() {
        0
    } else {
        rng.choose_index(sectors.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use red_planted_prng::GameRng;

    fn world(seed: u64) -> (Vec<Sector>, GameConfig, Artwork, GameRng) {
        let config = GameConfig::default();
        let artwork = Artwork::default();
        let mut rng = GameRng::new(seed);
        let sectors = (0..config.sectors.count)
            .map(|i| Sector::new(i, i as f64 * 68.0, &config, &artwork, &mut rng))
            .collect();
        (sectors, config, artwork, rng)
    }

    #[test]
    fn starts_high_with_minimum_fleet() {
        let (sectors, config, _, mut rng) = world(1);
        let ship = Spaceship::new(&sectors, &config, &mut rng);
        assert_eq!(ship.flies.len(), config.min_flies);
        assert_eq!(ship.coordinates.elevation, 2000.0);
        assert_eq!(ship.coordinates.angle_degrees, sectors[ship.target_sector].center_angle());
    }

    #[test]
    fn descends_and_becomes_near() {
        let (mut sectors, config, artwork, mut rng) = world(2);
        let planet = Planet::new(&config.planet);
        let mut ship = Spaceship::new(&sectors, &config, &mut rng);
        let mut events = Vec::new();
        let mut last = ship.coordinates.elevation;
        let mut ever_near = false;
        for t in 0..100 {
            let tick = ShipTick {
                sectors: &mut sectors,
                planet: &planet,
                artwork: &artwork,
                config: &config,
                now: t as f64 / 60.0,
            };
            ship.update(tick, &mut rng, &mut events);
            assert!(ship.coordinates.elevation < last);
            last = ship.coordinates.elevation;
        }
        for t in 100..2000 {
            let tick = ShipTick {
                sectors: &mut sectors,
                planet: &planet,
                artwork: &artwork,
                config: &config,
                now: t as f64 / 60.0,
            };
            ship.update(tick, &mut rng, &mut events);
            ever_near |= ship.near_target_sector;
        }
        assert!(ever_near);
    }

    #[test]
    fn tomatoes_breed_flies_up_to_maximum() {
        let (sectors, config, _, mut rng) = world(3);
        let mut ship = Spaceship::new(&sectors, &config, &mut rng);
        for _ in 0..20 {
            ship.add_tomato(&config, &mut rng);
        }
        assert_eq!(ship.total_collected_tomatoes, 20);
        assert_eq!(ship.flies.len(), config.max_flies);
    }

    #[test]
    fn swatting_moves_fly_to_dead_list() {
        let (sectors, config, _, mut rng) = world(4);
        let mut ship = Spaceship::new(&sectors, &config, &mut rng);
        let id = ship.flies[0].id;
        assert!(ship.swat(id));
        assert!(!ship.swat(id));
        assert_eq!(ship.flies.len(), config.min_flies - 1);
        assert_eq!(ship.dead_flies.len(), 1);
    }

    #[test]
    fn breeding_restores_minimum() {
        let (sectors, config, _, mut rng) = world(5);
        let mut ship = Spaceship::new(&sectors, &config, &mut rng);
        let id = ship.flies[0].id;
        ship.swat(id);
        let bred = ship.breed_flies_if_needed(&config, &mut rng);
        assert_eq!(bred.len(), 1);
        assert_ne!(bred[0], id);
        assert_eq!(ship.flies.len(), config.min_flies);
    }

    #[test]
    fn retargeting_prefers_ripe_sectors() {
        let (mut sectors, _, _, mut rng) = world(6);
        let plant = sectors[3].plants[0].id;
        sectors[3].ripe_fruits.push(FruitRef {
            plant,
            branch: Default::default(),
        });
        for _ in 0..20 {
            assert_eq!(pick_target_sector(&sectors, &mut rng), 3);
        }
    }

    #[test]
    fn claimed_fruit_is_not_available() {
        let (mut sectors, config, _, mut rng) = world(7);
        let mut ship = Spaceship::new(&sectors, &config, &mut rng);
        let target = ship.target_sector;
        let fruit = FruitRef {
            plant: sectors[target].plants[0].id,
            branch: Default::default(),
        };
        sectors[target].ripe_fruits.push(fruit.clone());
        assert_eq!(ship.available_fruit(&sectors), Some(fruit.clone()));
        ship.flies[0].roaming_target = crate::fly::RoamingTarget::Fruit(fruit);
        assert_eq!(ship.available_fruit(&sectors), None);
    }
}
