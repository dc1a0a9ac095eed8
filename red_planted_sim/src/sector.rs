// Sectors: angular slices of the planet that own plants.
//
// Each sector rolls its character once at creation: how many plants it holds
// (one entry of the layout table), how wide it is, its fertility, and how fast
// its plants grow and rot. Plants are spread evenly from `base_angle` to
// `base_angle + sector_width_degrees`, first and last plant on the edges.
//
// `replant()` cuts one plant: the old plant is flagged deleted and moved to
// the trash heap, where it keeps drifting off for a fixed number of ticks,
// and a fresh plant with a new `PlantId` takes over the same list slot at the
// same coordinate. Plant slots are stable; plant identities are not.
//
// The draw pass rebuilds the sector's `ripe_fruits` and its `aabb` (the
// union of all plant canopies) from what was drawn, and returns the sector's
// interaction records: fruit from the plants, one "cut" record per plant on
// its root region, and one record for the whole sector.
//
// See also: `plant.rs` for the plant lifecycle, `spaceship.rs` which targets
// sectors by their ripe fruit, `timebox.rs` for the trash heap.

use crate::artwork::Artwork;
use crate::config::{GameConfig, PlantParams};
use crate::interaction::{
    ClickPriority, InteractionList, InteractionRecord, InteractionTarget, LABEL_PLANT,
    LABEL_SECTOR,
};
use crate::plant::Plant;
use crate::planet::Planet;
use crate::render::{Color, RenderSink};
use crate::timebox::TimeBoxed;
use crate::types::{FruitRef, PlantId, SurfaceCoordinate};
use kurbo::{Point, Rect};
use red_planted_prng::RandomSource;
use tracing::debug;

/// What one draw of a sector produced besides primitives.
#[derive(Clone, Debug, Default)]
pub struct SectorFrame {
    pub interactions: InteractionList,
    /// Fruit drawn ripe for the first time this frame.
    pub ripened: Vec<FruitRef>,
}

/// Fruit state as seen by a fly.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FruitStatus {
    pub has_fruit: bool,
    /// The plant was cut and sits on the trash heap.
    pub was_deleted: bool,
    pub world_position: Point,
}

#[derive(Clone, Debug)]
pub struct Sector {
    pub index: usize,
    pub base_angle: f64,
    pub number_of_plants: usize,
    pub sector_width_degrees: f64,
    pub fertility: f64,
    pub growth_speed: f64,
    pub rotting_speed: f64,
    /// Live plants, one per slot.
    pub plants: Vec<Plant>,
    pub plant_trash_heap: TimeBoxed<Plant>,
    /// Union of the plant canopies as of the last draw.
    pub aabb: Option<Rect>,
    /// Ripe fruit as of the last draw, in draw order.
    pub ripe_fruits: Vec<FruitRef>,
    next_serial: u64,
}

impl Sector {
    pub fn new<R: RandomSource>(
        index: usize,
        base_angle: f64,
        config: &GameConfig,
        artwork: &Artwork,
        rng: &mut R,
    ) -> Self {
        let params = &config.sectors;
        let layout = *rng.choose(&params.layouts);
        let (fert_lo, fert_hi) = config.fertility;
        let fertility = rng.uniform(fert_lo, fert_hi).trunc();
        let (grow_lo, grow_hi) = params.growth_speed_range;
        let growth_speed = rng.uniform(grow_lo, grow_hi) * config.growth_speed;
        let (rot_lo, rot_hi) = params.rotting_speed_range;
        let rotting_speed = rng.uniform(rot_lo, rot_hi);

        let mut sector = Self {
            index,
            base_angle,
            number_of_plants: layout.plants,
            sector_width_degrees: layout.width_degrees * params.width_multiplier,
            fertility,
            growth_speed,
            rotting_speed,
            plants: Vec::new(),
            plant_trash_heap: TimeBoxed::new(config.plants.trash_lifetime_ticks),
            aabb: None,
            ripe_fruits: Vec::new(),
            next_serial: 0,
        };
        sector.make_new_plants(&config.plants, artwork, rng);
        debug!(
            sector = index,
            plants = sector.number_of_plants,
            fertility,
            "sector created"
        );
        sector
    }

    pub fn center_angle(&self) -> f64 {
        self.base_angle + self.sector_width_degrees / 2.0
    }

    /// Ground coordinate of plant slot `slot`.
    pub fn plant_coordinate(&self, slot: usize) -> SurfaceCoordinate {
        if self.number_of_plants < 2 {
            return SurfaceCoordinate::on_surface(self.center_angle());
        }
        let t = slot as f64 / (self.number_of_plants - 1) as f64;
        SurfaceCoordinate::on_surface(self.base_angle + self.sector_width_degrees * t)
    }

    fn next_id(&mut self) -> PlantId {
        let id = PlantId {
            sector: self.index,
            serial: self.next_serial,
        };
        self.next_serial += 1;
        id
    }

    /// Trash every plant and grow a fresh set.
    pub fn make_new_plants<R: RandomSource>(
        &mut self,
        params: &PlantParams,
        artwork: &Artwork,
        rng: &mut R,
    ) {
        for mut plant in std::mem::take(&mut self.plants) {
            plant.was_deleted = true;
            self.plant_trash_heap.push(plant);
        }
        for slot in 0..self.number_of_plants {
            let id = self.next_id();
            let position = self.plant_coordinate(slot);
            let plant = Plant::new(id, position, self.fertility, params, artwork, rng);
            self.plants.push(plant);
        }
        self.aabb = None;
    }

    /// Cut plant `id` and grow a replacement in its slot. Returns the new
    /// plant's id, or `None` if `id` is not a live plant of this sector.
    pub fn replant<R: RandomSource>(
        &mut self,
        id: PlantId,
        params: &PlantParams,
        artwork: &Artwork,
        rng: &mut R,
    ) -> Option<PlantId> {
        let slot = self.slot_of(id)?;
        let new_id = self.next_id();
        let position = self.plants[slot].position;
        let fresh = Plant::new(new_id, position, self.fertility, params, artwork, rng);
        let mut old = std::mem::replace(&mut self.plants[slot], fresh);
        old.was_deleted = true;
        self.plant_trash_heap.push(old);
        debug!(sector = self.index, slot, old = %id, new = %new_id, "replanted");
        Some(new_id)
    }

    /// Slot index of a live plant.
    pub fn slot_of(&self, id: PlantId) -> Option<usize> {
        self.plants.iter().position(|p| p.id == id)
    }

    /// A plant by id, live or on the trash heap.
    pub fn plant(&self, id: PlantId) -> Option<&Plant> {
        self.plants
            .iter()
            .chain(self.plant_trash_heap.iter().map(|(_, p)| p))
            .find(|p| p.id == id)
    }

    pub fn plant_mut(&mut self, id: PlantId) -> Option<&mut Plant> {
        self.plants
            .iter_mut()
            .chain(self.plant_trash_heap.iter_mut().map(|(_, p)| p))
            .find(|p| p.id == id)
    }

    pub fn fruit_status(&self, fruit: &FruitRef) -> Option<FruitStatus> {
        let plant = self.plant(fruit.plant)?;
        let branch = plant.root.get(&fruit.branch)?;
        Some(FruitStatus {
            has_fruit: branch.has_fruit,
            was_deleted: plant.was_deleted,
            world_position: branch.fruit_world_position,
        })
    }

    /// Force every plant to recompute its screen regions on the next draw.
    pub fn invalidate_aabb(&mut self) {
        self.aabb = None;
        for plant in &mut self.plants {
            plant.need_aabb = true;
        }
    }

    /// The sector itself takes no clicks.
    pub fn clicked(&self) -> bool {
        debug!(sector = self.index, "sector clicked");
        false
    }

    pub fn update(&mut self, params: &PlantParams) {
        for plant in &mut self.plants {
            plant.update(self.growth_speed, self.rotting_speed, params);
        }
        self.plant_trash_heap.tick();
    }

    pub fn draw(
        &mut self,
        sink: &mut dyn RenderSink,
        planet: &Planet,
        artwork: &Artwork,
        now: f64,
        params: &PlantParams,
    ) -> SectorFrame {
        let mut frame = SectorFrame::default();
        self.aabb = None;
        self.ripe_fruits.clear();

        for (age, plant) in self.plant_trash_heap.iter_mut() {
            plant.draw(sink, planet, artwork, now, Some(age), params);
        }

        for plant in &mut self.plants {
            let plant_frame = plant.draw(sink, planet, artwork, now, None, params);
            frame.interactions.append(plant_frame.interactions);
            frame.ripened.extend(plant_frame.ripened);
            self.ripe_fruits.extend(plant_frame.ripe_fruits);

            if let Some(root_aabb) = plant.root_aabb {
                frame.interactions.push(InteractionRecord::new(
                    format!("{LABEL_PLANT} ({:.0}%)", plant.health),
                    Color::rgb(0, 128, 128),
                    root_aabb,
                    InteractionTarget::Plant(plant.id),
                    ClickPriority::Plant,
                ));
                if let Some(canopy) = plant.aabb {
                    self.aabb = Some(match self.aabb {
                        Some(aabb) => aabb.union(canopy),
                        None => canopy,
                    });
                }
            }
        }

        if let Some(aabb) = self.aabb {
            frame.interactions.push(InteractionRecord::new(
                format!("{LABEL_SECTOR} {}", self.index),
                Color::rgb(128, 255, 128),
                aabb,
                InteractionTarget::Sector(self.index),
                ClickPriority::Sector,
            ));
        }

        frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{Camera, RecordingSink, Viewport};
    use red_planted_prng::GameRng;

    fn sector(seed: u64) -> (Sector, GameConfig, Artwork, GameRng) {
        let config = GameConfig::default();
        let artwork = Artwork::default();
        let mut rng = GameRng::new(seed);
        let s = Sector::new(0, 30.0, &config, &artwork, &mut rng);
        (s, config, artwork, rng)
    }

    #[test]
    fn plants_span_the_sector_evenly() {
        for seed in 0..10 {
            let (s, ..) = sector(seed);
            assert_eq!(s.plants.len(), s.number_of_plants);
            assert!([2, 3, 5, 6].contains(&s.number_of_plants));
            let first = s.plants[0].position.angle_degrees;
            let last = s.plants[s.plants.len() - 1].position.angle_degrees;
            assert!((first - s.base_angle).abs() < 1e-9);
            assert!((last - (s.base_angle + s.sector_width_degrees)).abs() < 1e-9);
        }
    }

    #[test]
    fn rolled_values_stay_in_configured_ranges() {
        for seed in 0..10 {
            let (s, config, ..) = sector(seed);
            assert!((20.0..50.0).contains(&s.fertility));
            assert_eq!(s.fertility, s.fertility.trunc());
            assert!(s.growth_speed >= 0.02 * config.growth_speed);
            assert!(s.growth_speed < 0.06 * config.growth_speed);
            assert!((0.01..0.02).contains(&s.rotting_speed));
        }
    }

    #[test]
    fn single_plant_layout_sits_in_the_middle() {
        let (mut s, ..) = sector(1);
        s.number_of_plants = 1;
        let coord = s.plant_coordinate(0);
        assert_eq!(coord.angle_degrees, s.center_angle());
    }

    #[test]
    fn replant_keeps_slot_and_coordinate() {
        let (mut s, config, artwork, mut rng) = sector(4);
        let old_id = s.plants[1].id;
        let old_position = s.plants[1].position;

        let new_id = s.replant(old_id, &config.plants, &artwork, &mut rng).unwrap();

        assert_ne!(new_id, old_id);
        assert_eq!(s.plants[1].id, new_id);
        assert_eq!(s.plants[1].position, old_position);
        assert_eq!(s.plants[1].growth, 0.0);
        let trashed = s.plant(old_id).unwrap();
        assert!(trashed.was_deleted);
        assert_eq!(s.plant_trash_heap.len(), 1);
        // The old id is no longer a live plant.
        assert!(s.replant(old_id, &config.plants, &artwork, &mut rng).is_none());
    }

    #[test]
    fn trash_heap_empties_after_lifetime() {
        let (mut s, config, artwork, mut rng) = sector(4);
        let id = s.plants[0].id;
        s.replant(id, &config.plants, &artwork, &mut rng);
        for _ in 0..config.plants.trash_lifetime_ticks - 1 {
            s.update(&config.plants);
        }
        assert_eq!(s.plant_trash_heap.len(), 1);
        s.update(&config.plants);
        assert!(s.plant_trash_heap.is_empty());
    }

    #[test]
    fn make_new_plants_trashes_everything() {
        let (mut s, config, artwork, mut rng) = sector(6);
        let old: Vec<PlantId> = s.plants.iter().map(|p| p.id).collect();
        s.make_new_plants(&config.plants, &artwork, &mut rng);
        assert_eq!(s.plant_trash_heap.len(), old.len());
        for id in old {
            assert!(s.slot_of(id).is_none());
            assert!(s.plant(id).unwrap().was_deleted);
        }
    }

    #[test]
    fn draw_registers_plants_and_sector() {
        let (mut s, config, artwork, _) = sector(8);
        let planet = Planet::new(&config.planet);
        for plant in &mut s.plants {
            plant.growth = 100.0;
        }
        let viewport = Viewport::new(1280.0, 720.0);
        let mut sink = RecordingSink::new(Camera::world(viewport, &planet, 1.0, 0.0));
        let frame = s.draw(&mut sink, &planet, &artwork, 0.0, &config.plants);

        let plants = frame
            .interactions
            .iter()
            .filter(|r| r.priority == ClickPriority::Plant)
            .count();
        assert_eq!(plants, s.plants.len());
        let last = frame.interactions.iter().last().unwrap();
        assert_eq!(last.target, InteractionTarget::Sector(0));
        let aabb = s.aabb.unwrap();
        for plant in &s.plants {
            let canopy = plant.aabb.unwrap();
            assert_eq!(aabb.union(canopy), aabb);
        }
        let fruit_records = frame
            .interactions
            .iter()
            .filter(|r| r.priority == ClickPriority::Fruit)
            .count();
        assert_eq!(fruit_records, s.ripe_fruits.len());
        assert_eq!(sink.transform_depth(), 0);
    }

    #[test]
    fn invalidate_requests_new_regions() {
        let (mut s, ..) = sector(8);
        for plant in &mut s.plants {
            plant.need_aabb = false;
        }
        s.invalidate_aabb();
        assert!(s.plants.iter().all(|p| p.need_aabb));
        assert!(!s.clicked());
    }
}
