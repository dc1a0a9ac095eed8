// A plant: growth/rot state machine, wind and shake, draw pass and AABBs.
//
// A plant owns the root of a branch tree built once at construction (three
// guaranteed first-order children, then a stochastic `moregrow`). Per tick it
// first grows from 0 to 100 at its sector's growth speed; once fully grown it
// rots, losing health at the sector's rotting speed. The two phases never
// overlap and never restart. Fruit rots once health falls below the rot
// threshold.
//
// Drawing happens in two steps. `Branch::frame_geometry()` computes the
// frame's segments, leaves and fruit as plain data; `Plant::draw()` emits
// them under the plant's surface transform and derives clickable regions from
// what was emitted. When `need_aabb` is set, every segment endpoint is mapped
// to screen space and the padded bounding box becomes the plant's `aabb`; the
// first point alone (the trunk base) becomes `root_aabb`, the "cut" target.
// Ripe fruit registers its own record at the front of the list so it wins
// over the enclosing plant and sector regions, and records its world position
// so flies can aim at it.
//
// A plant that was cut (`was_deleted`) is still drawn while it sits on its
// sector's trash heap, drifting upward and spinning away. It registers no
// interactions and no ripe fruit.
//
// See also: `branch.rs` for the tree, `sector.rs` which owns plants and the
// trash heap, `interaction.rs` for records and AABB helpers.

use crate::artwork::Artwork;
use crate::branch::{Branch, FrameGeometry, GrowthContext, PlantContext};
use crate::config::PlantParams;
use crate::interaction::{
    ClickPriority, InteractionList, InteractionRecord, InteractionTarget, LABEL_FRUIT,
    aabb_from_points, padded_aabb,
};
use crate::planet::Planet;
use crate::render::{Color, Layer, RenderSink};
use crate::types::{BranchPath, FruitRef, PlantId, SurfaceCoordinate};
use kurbo::{Point, Rect, Vec2};
use red_planted_prng::RandomSource;
use std::f64::consts::TAU;

#[derive(Clone, Debug)]
pub struct Plant {
    pub id: PlantId,
    pub position: SurfaceCoordinate,
    pub root: Branch,
    /// Growth in `[0, 100]`.
    pub growth: f64,
    /// Health in `[0, 100]`.
    pub health: f64,
    pub fertility: f64,
    pub wind_phase: f64,
    pub wind_speed: f64,
    /// Shake strength; decays by one per tick toward zero.
    pub wind_amplitude: f64,
    /// Recompute `aabb`/`root_aabb` on the next draw.
    pub need_aabb: bool,
    pub aabb: Option<Rect>,
    pub root_aabb: Option<Rect>,
    pub was_deleted: bool,
    trash_rotation_direction: f64,
}

/// What one draw of a plant produced besides primitives.
#[derive(Clone, Debug, Default)]
pub struct PlantFrame {
    pub interactions: InteractionList,
    /// Every ripe fruit drawn this frame.
    pub ripe_fruits: Vec<FruitRef>,
    /// Fruit drawn ripe for the first time.
    pub ripened: Vec<FruitRef>,
}

impl Plant {
    pub fn new<R: RandomSource>(
        id: PlantId,
        position: SurfaceCoordinate,
        fertility: f64,
        params: &PlantParams,
        artwork: &Artwork,
        rng: &mut R,
    ) -> Self {
        let wind_phase = rng.uniform(0.0, TAU);
        let (speed_lo, speed_hi) = params.wind_speed_range;
        let wind_speed = rng.uniform(speed_lo, speed_hi);
        let (len_lo, len_hi) = params.root_length_range;
        let length = rng.uniform(len_lo, len_hi) * (0.5 + 0.5 * fertility / 100.0) / 2.0;

        let mut ctx = GrowthContext {
            fertility,
            artwork,
            rng: &mut *rng,
        };
        let mut root = Branch::new(0.0, length, 1.0, 0, &mut ctx);
        root.grow(&mut ctx);
        root.grow(&mut ctx);
        root.grow(&mut ctx);
        root.moregrow(true, &mut ctx);

        let trash_rotation_direction = rng.sign();

        Self {
            id,
            position,
            root,
            growth: 0.0,
            health: 100.0,
            fertility,
            wind_phase,
            wind_speed,
            wind_amplitude: 0.0,
            need_aabb: true,
            aabb: None,
            root_aabb: None,
            was_deleted: false,
            trash_rotation_direction,
        }
    }

    /// Advance one tick: grow until fully grown, then rot.
    pub fn update(&mut self, growth_speed: f64, rotting_speed: f64, params: &PlantParams) {
        if self.growth < 100.0 {
            self.growth = (self.growth + growth_speed).min(100.0);
        } else {
            self.health = (self.health - rotting_speed).max(0.0);
        }
        self.need_aabb = true;

        if self.wind_amplitude > 0.0 {
            self.wind_amplitude = (self.wind_amplitude - 1.0).max(0.0);
        } else if self.wind_amplitude < 0.0 {
            self.wind_amplitude = (self.wind_amplitude + 1.0).min(0.0);
        }

        self.root.update(self.health, params.rot_threshold);
    }

    /// Start a shake, or reverse a running one.
    pub fn shake(&mut self, amplitude: f64) {
        self.wind_amplitude = if self.wind_amplitude <= 0.0 {
            amplitude
        } else {
            -amplitude
        };
    }

    /// Pick the fruit on `path`. Shakes the plant when there was one.
    pub fn pick_fruit(&mut self, path: &[u16], shake_amplitude: f64) -> bool {
        let picked = self
            .root
            .get_mut(path)
            .is_some_and(|branch| branch.clicked());
        if picked {
            self.shake(shake_amplitude);
        }
        picked
    }

    /// World position of the fruit on `path`, if it is still there.
    pub fn fruit_position(&self, path: &[u16]) -> Option<Point> {
        self.root
            .get(path)
            .filter(|b| b.has_fruit)
            .map(|b| b.fruit_world_position)
    }

    pub fn context(&self, now: f64) -> PlantContext {
        PlantContext {
            growth: self.growth,
            health: self.health,
            wind_phase: self.wind_phase,
            wind_speed: self.wind_speed,
            wind_amplitude: self.wind_amplitude,
            now,
        }
    }

    pub fn frame_geometry(&self, now: f64, artwork: &Artwork) -> FrameGeometry {
        self.root.frame_geometry(&self.context(now), artwork)
    }

    /// Draw the plant and collect its interaction records.
    ///
    /// `trash_age` is the number of ticks the plant has spent on the trash
    /// heap, `None` for a live plant.
    pub fn draw(
        &mut self,
        sink: &mut dyn RenderSink,
        planet: &Planet,
        artwork: &Artwork,
        now: f64,
        trash_age: Option<u32>,
        params: &PlantParams,
    ) -> PlantFrame {
        let geometry = self.frame_geometry(now, artwork);
        let mut frame = PlantFrame::default();

        sink.push_transform();
        planet.apply_surface_transform(sink, self.position);

        if let Some(age) = trash_age.filter(|&age| age > 0) {
            let t = age as f64;
            let half_height = self.root.length * self.growth / 100.0 / 2.0;
            sink.translate(Vec2::new(0.0, -t * params.trash_drift_per_tick));
            sink.translate(Vec2::new(0.0, -half_height));
            sink.rotate(t * params.trash_spin_per_tick * self.trash_rotation_direction);
            sink.translate(Vec2::new(0.0, half_height));
        }

        for segment in &geometry.segments {
            sink.draw_line(segment.color, segment.from, segment.to, segment.width, Layer::Branches);
        }
        for leaf in &geometry.leaves {
            let scale = Vec2::new(leaf.scale, leaf.scale);
            sink.draw_sprite(leaf.sprite, leaf.top_left, scale, Layer::Leaves);
        }
        for fruit in &geometry.fruits {
            let scale = Vec2::new(fruit.scale, fruit.scale);
            sink.draw_sprite(fruit.sprite, fruit.top_left, scale, Layer::Fruit);
        }

        if self.need_aabb {
            let points: Vec<Point> = geometry
                .outline()
                .into_iter()
                .map(|p| sink.to_screen_space(p))
                .collect();
            if let Some(aabb) = padded_aabb(&points, params.aabb_padding) {
                self.aabb = Some(aabb);
                self.root_aabb = padded_aabb(&points[..1], params.aabb_padding);
                self.need_aabb = false;
            }
        }

        if !self.was_deleted {
            let surface = planet.surface_transform(self.position);
            for fruit in geometry.fruits.iter().filter(|f| f.ripe) {
                let corners = fruit.corners().map(|p| sink.to_screen_space(p));
                let Some(region) = aabb_from_points(&corners) else {
                    continue;
                };
                let fruit_ref = self.fruit_ref(&fruit.path);
                frame.interactions.push_front(InteractionRecord::new(
                    LABEL_FRUIT,
                    Color::WHITE,
                    region,
                    InteractionTarget::Fruit(fruit_ref.clone()),
                    ClickPriority::Fruit,
                ));

                if let Some(branch) = self.root.get_mut(&fruit.path) {
                    branch.fruit_world_position = surface * fruit.anchor();
                    if !branch.was_ripe {
                        branch.was_ripe = true;
                        frame.ripened.push(fruit_ref.clone());
                    }
                }
                frame.ripe_fruits.push(fruit_ref);
            }
        }

        sink.pop_transform();
        frame
    }

    fn fruit_ref(&self, path: &BranchPath) -> FruitRef {
        FruitRef {
            plant: self.id,
            branch: path.clone(),
        }
    }
}
