// Fruit flies: circle the spaceship, steal ripe fruit, deliver it.
//
// A fly's position is always relative to what it is roaming around: the
// spaceship or one fruit. `roaming_offset` is the vector from that target to
// the fly. Switching targets (`reparent`) rewrites the offset so the fly does
// not jump; flying toward a target shrinks the offset at constant speed until
// it reaches zero, which counts as arrival on the following tick.
//
// Per tick a fly is in one of three modes:
// - returning: head back to the ship (slower when carrying a tomato) and
//   deliver on arrival;
// - raiding: while the ship hovers near its target sector and there is a
//   fruit to go for, fly to it, shake the plant, take the fruit, and turn
//   back. A fruit that vanished on the way (picked, or its plant cut) sends
//   the fly home empty-handed;
// - orbiting: otherwise trace an ellipse around the ship.
//
// Fruit is addressed by `FruitRef`, resolved against the sectors every tick.
// The last resolved position is cached so a fly whose fruit disappeared
// entirely (its plant left the trash heap) still has somewhere to turn from.
//
// See also: `spaceship.rs` which owns flies and picks available fruit,
// `sector.rs` for fruit lookup.

use crate::artwork::Artwork;
use crate::config::FlyParams;
use crate::interaction::{
    ClickPriority, InteractionRecord, InteractionTarget, LABEL_FLY, padded_aabb,
};
use crate::planet::Planet;
use crate::render::{Color, Layer, RenderSink};
use crate::sector::{FruitStatus, Sector};
use crate::types::{FlyId, FruitRef};
use kurbo::{Point, Rect, Size, Vec2};
use red_planted_prng::RandomSource;
use std::f64::consts::TAU;

/// What a fly roams around.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoamingTarget {
    Spaceship,
    Fruit(FruitRef),
}

/// Spaceship and world state a fly reads during its update.
pub struct FlyWorld<'a> {
    pub sectors: &'a mut [Sector],
    pub ship_position: Point,
    pub ship_size: Size,
    pub near_target_sector: bool,
    /// Ripe fruit in the target sector no other fly is after.
    pub available_fruit: Option<FruitRef>,
    /// Game time in seconds.
    pub now: f64,
    pub params: &'a FlyParams,
    /// Shake applied to a plant whose fruit gets taken.
    pub shake_amplitude: f64,
}

/// What happened during one fly update.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FlyUpdate {
    /// Fruit taken off a live plant this tick.
    pub stolen: Option<FruitRef>,
    /// A tomato was handed over at the ship this tick.
    pub delivered: bool,
}

/// Per-frame drawing inputs shared by all flies.
pub struct FlyDrawContext<'a> {
    pub planet: &'a Planet,
    pub artwork: &'a Artwork,
    pub sectors: &'a [Sector],
    pub ship_position: Point,
    /// Flies are drawn upright relative to the ship's surface angle.
    pub ship_angle_degrees: f64,
    pub now: f64,
    pub scale_up: f64,
    /// Minimap passes draw flies but register no interactions.
    pub minimap: bool,
    pub params: &'a FlyParams,
}

#[derive(Clone, Debug)]
pub struct FruitFly {
    pub id: FlyId,
    /// Orbit phase in `[0, 2*pi)`.
    pub phase: f64,
    pub roaming_target: RoamingTarget,
    pub roaming_offset: Vec2,
    /// `-1` when the last move went left, `+1` otherwise. Mirrors the sprite.
    pub x_direction: f64,
    pub returning_to_spaceship: bool,
    pub carrying_fruit: bool,
    /// Screen region as of the last draw, when clickable.
    pub aabb: Option<Rect>,
    trash_rotation_direction: f64,
    last_fruit_position: Point,
}

impl FruitFly {
    pub fn new<R: RandomSource>(id: FlyId, rng: &mut R) -> Self {
        let phase = rng.uniform(0.0, TAU);
        let trash_rotation_direction = rng.sign();
        Self {
            id,
            phase,
            roaming_target: RoamingTarget::Spaceship,
            roaming_offset: Vec2::ZERO,
            x_direction: 1.0,
            returning_to_spaceship: false,
            carrying_fruit: false,
            aabb: None,
            trash_rotation_direction,
            last_fruit_position: Point::ORIGIN,
        }
    }

    pub fn is_after(&self, fruit: &FruitRef) -> bool {
        matches!(&self.roaming_target, RoamingTarget::Fruit(f) if f == fruit)
    }

    /// Whether the fly idles around the ship.
    pub fn is_idle(&self) -> bool {
        self.roaming_target == RoamingTarget::Spaceship && !self.returning_to_spaceship
    }

    fn target_position(
        &self,
        target: &RoamingTarget,
        ship_position: Point,
        sectors: &[Sector],
    ) -> Point {
        match target {
            RoamingTarget::Spaceship => ship_position,
            RoamingTarget::Fruit(fruit) => fruit_status(sectors, fruit)
                .map(|s| s.world_position)
                .unwrap_or(self.last_fruit_position),
        }
    }

    pub fn world_position(&self, ship_position: Point, sectors: &[Sector]) -> Point {
        self.target_position(&self.roaming_target, ship_position, sectors) + self.roaming_offset
    }

    /// Switch targets without moving.
    pub fn reparent(&mut self, target: RoamingTarget, ship_position: Point, sectors: &[Sector]) {
        let here = self.world_position(ship_position, sectors);
        let there = self.target_position(&target, ship_position, sectors);
        self.roaming_offset = here - there;
        self.roaming_target = target;
    }

    /// Offset after moving `step` toward the target, and whether the fly had
    /// already arrived.
    pub fn fly_towards_target(&self, step: f64) -> (Vec2, bool) {
        let length = self.roaming_offset.length();
        if length > 0.0 {
            let remaining = (length - step).max(0.0);
            (self.roaming_offset / length * remaining, false)
        } else {
            (self.roaming_offset, true)
        }
    }

    pub fn update(&mut self, world: &mut FlyWorld<'_>) -> FlyUpdate {
        let mut outcome = FlyUpdate::default();
        let angle = world.now * 1.1 + self.phase;
        let ship = world.ship_position;

        let new_offset = if self.returning_to_spaceship {
            self.reparent(RoamingTarget::Spaceship, ship, world.sectors);
            let speed = if self.carrying_fruit {
                world.params.speed_carrying
            } else {
                world.params.speed_free
            };
            let (offset, arrived) = self.fly_towards_target(speed);
            if arrived {
                self.returning_to_spaceship = false;
                if self.carrying_fruit {
                    self.carrying_fruit = false;
                    outcome.delivered = true;
                }
            }
            offset
        } else {
            let fruit = match &self.roaming_target {
                RoamingTarget::Fruit(fruit) => Some(fruit.clone()),
                RoamingTarget::Spaceship => world.available_fruit.clone(),
            };

            match fruit {
                Some(fruit) if world.near_target_sector => {
                    let status = fruit_status(world.sectors, &fruit);
                    let takeable = status.is_some_and(|s| s.has_fruit && !s.was_deleted);
                    if !takeable {
                        self.returning_to_spaceship = true;
                    }

                    self.reparent(RoamingTarget::Fruit(fruit.clone()), ship, world.sectors);
                    if let Some(status) = status {
                        self.last_fruit_position = status.world_position;
                    }
                    let (offset, arrived) = self.fly_towards_target(world.params.speed_free);
                    if arrived {
                        self.carrying_fruit = takeable;
                        if let Some(plant) = world
                            .sectors
                            .get_mut(fruit.plant.sector)
                            .and_then(|s| s.plant_mut(fruit.plant))
                        {
                            plant.shake(world.shake_amplitude);
                            if let Some(branch) = plant.root.get_mut(&fruit.branch) {
                                branch.has_fruit = false;
                            }
                        }
                        self.returning_to_spaceship = true;
                        if takeable {
                            outcome.stolen = Some(fruit);
                        }
                    }
                    offset
                }
                _ => {
                    self.roaming_target = RoamingTarget::Spaceship;
                    Vec2::new(
                        world.ship_size.width / 2.0 * angle.sin(),
                        world.ship_size.height / 2.0 * angle.cos(),
                    )
                }
            }
        };

        self.x_direction = if new_offset.x < self.roaming_offset.x { -1.0 } else { 1.0 };
        self.roaming_offset = new_offset;
        outcome
    }

    /// Draw the fly. `escape_age` is the number of ticks since it was swatted,
    /// `None` for a live fly. Returns the fly's interaction record when it is
    /// clickable: alive, inside the atmosphere, and not on the minimap.
    pub fn draw(
        &mut self,
        sink: &mut dyn RenderSink,
        ctx: &FlyDrawContext<'_>,
        escape_age: Option<u32>,
    ) -> Option<InteractionRecord> {
        self.aabb = None;

        let sprite = ctx.artwork.fly(ctx.now);
        let direction = self.x_direction;
        let mut sprite_offset = -sprite.size.to_vec2() / 2.0;
        sprite_offset.x *= direction;

        let world = self.world_position(ctx.ship_position, ctx.sectors);
        let top_left = world + sprite_offset * ctx.scale_up;
        let mut rotation = ctx.ship_angle_degrees.to_radians();

        sink.push_transform();

        if let Some(age) = escape_age.filter(|&age| age > 0) {
            let t = age as f64;
            let outward = world.to_vec2();
            if outward.length() > 0.0 {
                sink.translate(outward.normalize() * (ctx.params.escape_drift_per_tick * t));
            }
            rotation += t * ctx.params.escape_spin_per_tick * self.trash_rotation_direction;
        }

        sink.translate(world.to_vec2());
        sink.rotate(rotation);
        sink.translate(-world.to_vec2());

        let scale = Vec2::new(direction * ctx.scale_up, ctx.scale_up);
        let mut corners = sink.draw_sprite(sprite, top_left, scale, Layer::Flies).to_vec();
        if self.carrying_fruit {
            let tomato = ctx.artwork.ripe_tomato();
            corners.extend(sink.draw_sprite(tomato, top_left, scale, Layer::Fruit));
        }

        if escape_age.is_none() && !ctx.minimap && ctx.planet.within_atmosphere(world) {
            let screen: Vec<Point> = corners.iter().map(|&p| sink.to_screen_space(p)).collect();
            self.aabb = padded_aabb(&screen, ctx.params.aabb_padding);
        }

        sink.pop_transform();

        self.aabb.map(|region| {
            InteractionRecord::new(
                LABEL_FLY,
                Color::rgb(255, 0, 0),
                region,
                InteractionTarget::Fly(self.id),
                ClickPriority::Fly,
            )
        })
    }
}

fn fruit_status(sectors: &[Sector], fruit: &FruitRef) -> Option<FruitStatus> {
    sectors.get(fruit.plant.sector)?.fruit_status(fruit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::render::{Camera, RecordingSink, Viewport};
    use red_planted_prng::GameRng;

    fn fly() -> FruitFly {
        FruitFly::new(FlyId(0), &mut GameRng::new(1))
    }

    #[test]
    fn flying_shrinks_offset_then_arrives() {
        let mut f = fly();
        f.roaming_offset = Vec2::new(3.0, 4.0);
        let (offset, arrived) = f.fly_towards_target(2.0);
        assert!(!arrived);
        assert!((offset.length() - 3.0).abs() < 1e-12);
        f.roaming_offset = offset;
        let (offset, arrived) = f.fly_towards_target(10.0);
        assert!(!arrived);
        assert_eq!(offset.length(), 0.0);
        f.roaming_offset = offset;
        let (_, arrived) = f.fly_towards_target(10.0);
        assert!(arrived);
    }

    #[test]
    fn reparent_keeps_world_position() {
        let mut f = fly();
        f.roaming_offset = Vec2::new(10.0, -5.0);
        let ship = Point::new(100.0, -800.0);
        let before = f.world_position(ship, &[]);
        let fruit = FruitRef {
            plant: crate::types::PlantId {
                sector: 7,
                serial: 0,
            },
            branch: Default::default(),
        };
        f.last_fruit_position = Point::new(0.0, -520.0);
        f.reparent(RoamingTarget::Fruit(fruit), ship, &[]);
        assert!((f.world_position(ship, &[]) - before).length() < 1e-9);
    }

    #[test]
    fn orbits_ship_when_nothing_to_raid() {
        let config = GameConfig::default();
        let mut f = fly();
        let mut world = FlyWorld {
            sectors: &mut [],
            ship_position: Point::new(0.0, -2500.0),
            ship_size: Size::new(160.0, 96.0),
            near_target_sector: false,
            available_fruit: None,
            now: 0.0,
            params: &config.flies,
            shake_amplitude: 90.0,
        };
        let outcome = f.update(&mut world);
        assert_eq!(outcome, FlyUpdate::default());
        assert_eq!(f.roaming_target, RoamingTarget::Spaceship);
        assert!(f.roaming_offset.x.abs() <= 80.0);
        assert!(f.roaming_offset.y.abs() <= 48.0);
    }

    #[test]
    fn carrying_fly_delivers_on_arrival() {
        let config = GameConfig::default();
        let mut f = fly();
        f.returning_to_spaceship = true;
        f.carrying_fruit = true;
        f.roaming_offset = Vec2::new(0.0, 3.0);
        let mut world = FlyWorld {
            sectors: &mut [],
            ship_position: Point::new(0.0, -2500.0),
            ship_size: Size::new(160.0, 96.0),
            near_target_sector: true,
            available_fruit: None,
            now: 0.0,
            params: &config.flies,
            shake_amplitude: 90.0,
        };
        assert!(!f.update(&mut world).delivered);
        assert!(!f.update(&mut world).delivered);
        assert!(f.update(&mut world).delivered);
        assert!(!f.carrying_fruit);
        assert!(!f.returning_to_spaceship);
    }

    #[test]
    fn only_live_flies_in_atmosphere_are_clickable() {
        let config = GameConfig::default();
        let planet = Planet::new(&config.planet);
        let artwork = Artwork::default();
        let camera = Camera::world(Viewport::new(1280.0, 720.0), &planet, 1.0, 0.0);
        let mut sink = RecordingSink::new(camera);
        let mut ctx = FlyDrawContext {
            planet: &planet,
            artwork: &artwork,
            sectors: &[],
            ship_position: Point::new(0.0, -650.0),
            ship_angle_degrees: 0.0,
            now: 0.0,
            scale_up: 1.0,
            minimap: false,
            params: &config.flies,
        };
        let mut f = fly();
        assert!(f.draw(&mut sink, &ctx, None).is_some());
        assert!(f.draw(&mut sink, &ctx, Some(10)).is_none());

        ctx.minimap = true;
        assert!(f.draw(&mut sink, &ctx, None).is_none());

        ctx.minimap = false;
        ctx.ship_position = Point::new(0.0, -2000.0);
        assert!(f.draw(&mut sink, &ctx, None).is_none());
        assert_eq!(sink.transform_depth(), 0);
    }
}
