// Recursive branch tree: stochastic construction and per-frame geometry.
//
// A plant is a tree of `Branch` nodes. The topology is built once, when the
// plant is created, by two procedures:
//
// - `grow()` appends exactly one child with a random phase (the fraction of
//   the parent's growth at which the child starts extending) and a random
//   length fraction of the parent. Children alternate lean direction.
// - `moregrow()` expands the tree stochastically. It builds a candidate
//   multiset where every existing child appears `max(1, fertility / 20)`
//   times, then `fertility / 5` times draws a candidate without replacement
//   and either grows it directly or recurses one level into it. A branch
//   with no children sprouts one with probability 1/4. More fertile plants
//   favour direct growth, which makes them bushier.
//
// After construction the topology never changes. What changes per tick is
// the owning plant's growth and health, and the only per-branch state that
// changes is fruit (picked, rotten, ripe notification).
//
// Per-frame geometry is a pure function of the tree and a `PlantContext`
// snapshot. `frame_geometry()` walks the tree and returns line segments,
// leaf quads and fruit quads in the plant's local frame; the plant draws
// them and derives its clickable regions from them. Angles go through a
// health-dependent bend curve that makes sick plants droop hard without
// ever exceeding a half-turn, plus a wind sway that fades with depth and an
// extra shake term after a fruit is picked.
//
// See also: `plant.rs` which owns the root branch and turns frame geometry
// into draw calls and interaction records, `artwork.rs` for sprite sizes.

use crate::artwork::{Artwork, SpriteRef};
use crate::render::Color;
use crate::types::{BranchPath, rotate_degrees};
use kurbo::{Point, Vec2};
use red_planted_prng::RandomSource;

/// Growth factor below which a branch (and its subtree) is not drawn.
const MIN_VISIBLE_FACTOR: f64 = 0.01;

/// Extra length of the trunk over the rolled root length.
const TRUNK_EXTRA_LENGTH: f64 = 40.0;

// ---------------------------------------------------------------------------
// Contexts
// ---------------------------------------------------------------------------

/// What branch construction reads from the plant being built.
pub struct GrowthContext<'a, R: RandomSource> {
    pub fertility: f64,
    pub artwork: &'a Artwork,
    pub rng: &'a mut R,
}

/// Snapshot of whole-plant state for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlantContext {
    /// Plant growth in `[0, 100]`.
    pub growth: f64,
    /// Plant health in `[0, 100]`.
    pub health: f64,
    pub wind_phase: f64,
    pub wind_speed: f64,
    pub wind_amplitude: f64,
    /// Game time in seconds.
    pub now: f64,
}

// ---------------------------------------------------------------------------
// Frame geometry
// ---------------------------------------------------------------------------

/// One drawn branch segment, in plant-local coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    pub from: Point,
    pub to: Point,
    pub color: Color,
    pub width: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LeafQuad {
    pub sprite: SpriteRef,
    pub top_left: Point,
    pub scale: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FruitQuad {
    /// Branch carrying the fruit.
    pub path: BranchPath,
    pub sprite: SpriteRef,
    pub top_left: Point,
    pub scale: f64,
    /// Whether this is the ripe sprite. Only ripe fruit is clickable.
    pub ripe: bool,
}

impl FruitQuad {
    /// Local corners of the drawn quad.
    pub fn corners(&self) -> [Point; 4] {
        crate::render::sprite_corners(
            self.sprite.size,
            self.top_left,
            Vec2::new(self.scale, self.scale),
        )
    }

    /// Centre of the unscaled sprite anchored at `top_left`. Flies aim here.
    pub fn anchor(&self) -> Point {
        self.top_left + self.sprite.size.to_vec2() / 2.0
    }
}

/// Everything one frame of a plant draws, in depth-first order. The first
/// segment starts at the trunk base.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameGeometry {
    pub segments: Vec<Segment>,
    pub leaves: Vec<LeafQuad>,
    pub fruits: Vec<FruitQuad>,
}

impl FrameGeometry {
    /// Segment endpoints in draw order, two per segment.
    pub fn outline(&self) -> Vec<Point> {
        self.segments.iter().flat_map(|s| [s.from, s.to]).collect()
    }
}

// ---------------------------------------------------------------------------
// Branch
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
pub struct Branch {
    /// Fraction of the parent's growth at which this branch starts.
    pub phase: f64,
    pub depth: u32,
    /// Static lean in degrees.
    pub angle: f64,
    pub length: f64,
    pub thickness: f64,
    pub children: Vec<Branch>,
    pub has_fruit: bool,
    pub has_leaf: bool,
    pub fruit_rotten: bool,
    /// World position of the fruit as of the last frame it was ripe.
    pub fruit_world_position: Point,
    /// Set once the fruit has been reported ripe.
    pub was_ripe: bool,
    color_mod: f64,
    color_mod2: f64,
    leaf: usize,
    leaf_appearance: f64,
    fruit_appearance: f64,
}

impl Branch {
    /// Build a single childless branch. `leftright` is `+1` or `-1`.
    pub fn new<R: RandomSource>(
        phase: f64,
        length: f64,
        leftright: f64,
        depth: u32,
        ctx: &mut GrowthContext<'_, R>,
    ) -> Self {
        let depth_factor = if depth == 0 { 0.0 } else { depth as f64 / 2.0 };
        let angle = leftright * ctx.rng.uniform(50.0, 70.0) * depth_factor;
        let length = if depth == 0 {
            length + TRUNK_EXTRA_LENGTH
        } else {
            length
        };
        let thickness = ((ctx.fertility / 5.0) / depth.max(1) as f64).trunc().max(8.0);
        let color_mod = ctx.rng.uniform(0.4, 1.0);
        let color_mod2 = ctx.rng.uniform(0.4, 1.0);
        let has_fruit = ctx.rng.uniform(0.0, 300.0) < ctx.fertility + 10.0;
        let leaf = ctx.artwork.random_leaf(&mut *ctx.rng);
        let leaf_appearance = ctx.rng.uniform(20.0, 70.0);
        let fruit_appearance = ctx.rng.uniform(40.0, 70.0);

        Self {
            phase,
            depth,
            angle,
            length,
            thickness,
            children: Vec::new(),
            has_fruit,
            has_leaf: !has_fruit,
            fruit_rotten: false,
            fruit_world_position: Point::ORIGIN,
            was_ripe: false,
            color_mod,
            color_mod2,
            leaf,
            leaf_appearance,
            fruit_appearance,
        }
    }

    /// Append one child.
    pub fn grow<R: RandomSource>(&mut self, ctx: &mut GrowthContext<'_, R>) {
        let mut phase = ctx.rng.uniform(0.1, 0.9);
        if self.depth == 0 {
            phase = phase.max(1.0 - ctx.fertility.clamp(0.4, 0.6));
        }
        let length_fraction = ctx.rng.uniform(0.2, 0.3) * 2.0;
        let leftright = if self.children.len() % 2 == 0 { 1.0 } else { -1.0 };
        let child = Branch::new(
            phase,
            self.length * length_fraction,
            leftright,
            self.depth + 1,
            ctx,
        );
        self.children.push(child);
    }

    /// Fertility-weighted random expansion. With `recurse` false every draw
    /// grows its candidate directly.
    pub fn moregrow<R: RandomSource>(&mut self, recurse: bool, ctx: &mut GrowthContext<'_, R>) {
        if self.children.is_empty() {
            if *ctx.rng.choose(&[false, false, false, true]) {
                self.grow(ctx);
            }
            return;
        }

        let copies = (ctx.fertility / 20.0).max(1.0) as usize;
        let mut candidates: Vec<usize> = (0..copies)
            .flat_map(|_| 0..self.children.len())
            .collect();
        let grow_weights: &[bool] = if ctx.fertility > 30.0 {
            &[true, false]
        } else {
            &[false, false, true]
        };

        let draws = (ctx.fertility / 5.0).max(0.0) as usize;
        for _ in 0..draws {
            if candidates.is_empty() {
                break;
            }
            let pick = ctx.rng.choose_index(candidates.len());
            let child = candidates.swap_remove(pick);

            if *ctx.rng.choose(grow_weights) || !recurse {
                self.children[child].grow(ctx);
            } else {
                self.children[child].moregrow(false, ctx);
            }
        }
    }

    /// Propagate plant health: fruit rots once health is below the threshold.
    pub fn update(&mut self, health: f64, rot_threshold: f64) {
        if health < rot_threshold {
            self.fruit_rotten = true;
        }
        for child in &mut self.children {
            child.update(health, rot_threshold);
        }
    }

    /// Pick the fruit. Returns whether there was one.
    pub fn clicked(&mut self) -> bool {
        if self.has_fruit {
            self.has_fruit = false;
            true
        } else {
            false
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.children.is_empty()
    }

    /// Number of branches in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Branch::node_count).sum::<usize>()
    }

    /// Deepest `depth` in this subtree.
    pub fn max_depth(&self) -> u32 {
        self.children
            .iter()
            .map(Branch::max_depth)
            .max()
            .unwrap_or(self.depth)
    }

    pub fn get(&self, path: &[u16]) -> Option<&Branch> {
        match path.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.children.get(i as usize)?.get(rest),
        }
    }

    pub fn get_mut(&mut self, path: &[u16]) -> Option<&mut Branch> {
        match path.split_first() {
            None => Some(self),
            Some((&i, rest)) => self.children.get_mut(i as usize)?.get_mut(rest),
        }
    }

    /// Visit every branch in this subtree, parents before children.
    pub fn for_each(&self, f: &mut impl FnMut(&Branch)) {
        f(self);
        for child in &self.children {
            child.for_each(f);
        }
    }

    /// Geometry of this tree for one frame, rooted at the local origin.
    pub fn frame_geometry(&self, ctx: &PlantContext, artwork: &Artwork) -> FrameGeometry {
        let mut out = FrameGeometry::default();
        let mut path = BranchPath::new();
        self.collect_geometry(
            &mut path,
            Point::ORIGIN,
            ctx.growth / 100.0,
            0.0,
            ctx,
            artwork,
            &mut out,
        );
        out
    }

    #[allow(clippy::too_many_arguments)]
    fn collect_geometry(
        &self,
        path: &mut BranchPath,
        pos: Point,
        factor: f64,
        parent_angle: f64,
        ctx: &PlantContext,
        artwork: &Artwork,
        out: &mut FrameGeometry,
    ) {
        if factor < MIN_VISIBLE_FACTOR {
            return;
        }

        let angle = bend_angle(parent_angle, factor, self.angle, ctx.growth, ctx.health);
        let direction = rotate_degrees(
            Vec2::new(0.0, -self.length),
            angle + wind_angle(self.depth, ctx),
        );
        let to = pos + direction * factor;

        out.segments.push(Segment {
            from: pos,
            to,
            color: branch_color(self.color_mod, self.color_mod2, ctx.health),
            width: self.thickness * ctx.growth / 100.0,
        });

        for (i, child) in self.children.iter().enumerate() {
            path.push(i as u16);
            child.collect_geometry(
                path,
                pos + direction * child.phase * factor,
                child_factor(factor, child.phase),
                angle,
                ctx,
                artwork,
                out,
            );
            path.pop();
        }

        if !self.is_terminal() {
            return;
        }
        if self.has_fruit {
            if ctx.growth > self.fruit_appearance {
                let sprite = artwork.tomato_sprite(factor, self.fruit_rotten);
                out.fruits.push(FruitQuad {
                    path: path.clone(),
                    sprite,
                    top_left: to + Vec2::new(-sprite.size.width * factor / 2.0, 0.0),
                    scale: factor,
                    ripe: artwork.is_tomato_ripe(&sprite),
                });
            }
        } else if self.has_leaf && ctx.growth > self.leaf_appearance {
            let scale = (ctx.growth - self.leaf_appearance) / (100.0 - self.leaf_appearance);
            let sprite = artwork.leaf(self.leaf);
            out.leaves.push(LeafQuad {
                sprite,
                top_left: to + Vec2::new(-sprite.size.width * scale / 2.0, 0.0),
                scale,
            });
        }
    }
}

// ---------------------------------------------------------------------------
// Geometry helpers
// ---------------------------------------------------------------------------

/// Growth factor handed to a child with the given phase. Zero until the
/// parent passes the phase, then catches up to reach 1 with the parent.
pub fn child_factor(factor: f64, phase: f64) -> f64 {
    if phase >= 1.0 {
        return if factor >= 1.0 { 1.0 } else { 0.0 };
    }
    ((factor - phase) / (1.0 - phase)).max(0.0)
}

/// Effective branch angle in degrees, always within `[-180, 180]`.
///
/// The inherited angle scales with the branch's own growth factor, the static
/// lean scales with plant growth, and poor health amplifies both. The result
/// is then pushed toward a half-turn by a power curve whose exponent is the
/// clamped health fraction.
pub fn bend_angle(parent_angle: f64, factor: f64, lean: f64, growth: f64, health: f64) -> f64 {
    let mut angle = parent_angle * factor + lean * growth / 100.0;
    angle *= 1.0 + 0.01 * (100.0 - health);

    let normalized = angle / 180.0;
    let sign = if normalized < 0.0 { -1.0 } else { 1.0 };
    let exponent = health.clamp(10.0, 100.0) / 100.0;
    let magnitude = normalized.abs().powf(exponent).min(1.0);
    magnitude * 180.0 * sign
}

/// Sway in degrees: ambient wind fading with depth plus the shake term.
pub fn wind_angle(depth: u32, ctx: &PlantContext) -> f64 {
    let damping = (5.0 - depth as f64).max(1.0);
    let ambient = 10.0 * (ctx.wind_phase + ctx.wind_speed * ctx.now).sin() / damping;
    ambient + (ctx.wind_amplitude / 10.0) * (ctx.now * 5.0).sin()
}

/// Healthy branches are green, sick ones turn brown. The modifiers vary the
/// tint per branch and matter less as health drops.
pub fn branch_color(color_mod: f64, color_mod2: f64, health: f64) -> Color {
    let cm1 = 1.0 - (1.0 - color_mod) * health / 100.0;
    let cm2 = 1.0 - (1.0 - color_mod2) * health / 100.0;
    Color::from_f64(cm1 * (100.0 - health), cm2 * (94.0 + health * 1.5), 0.0)
}
