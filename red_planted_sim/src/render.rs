// Rendering seam: the sink the core draws into, the transform stack, and the
// cameras.
//
// The core never talks to a graphics API. Everything drawable submits lines
// and sprites to a `RenderSink`, positioned through a modelview transform
// stack (push / translate / rotate / pop, strictly balanced within one draw
// call). The sink also answers `to_screen_space`, which is how clickable
// regions are derived from the geometry that was actually drawn.
//
// `Camera` reproduces the view setups of the game: the world view
// (orthographic, centred, zoomed and rotated around the planet), the same view
// squeezed into a screen rectangle (the minimap), and the overlay view (pixel
// coordinates). A render pass starts with `set_camera`. `RecordingSink` is the
// in-crate sink: it records every primitive in screen space with its z-layer,
// which is what the headless driver and the tests draw into. A GPU frontend
// would implement `RenderSink` itself and batch by layer the same way.
//
// See also: `planet.rs` for the surface transform pushed around every
// surface-anchored draw, `artwork.rs` for `SpriteRef`.

use crate::artwork::SpriteRef;
use crate::planet::Planet;
use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Colors and layers
// ---------------------------------------------------------------------------

/// 8-bit RGBA color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Build an opaque color from unclamped float channels. Channels are
    /// clamped into `[0, 255]` and truncated.
    pub fn from_f64(r: f64, g: f64, b: f64) -> Self {
        let channel = |v: f64| v.clamp(0.0, 255.0) as u8;
        Self::rgb(channel(r), channel(g), channel(b))
    }
}

/// Z-layer of a primitive. Higher layers draw on top.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Ground,
    Branches,
    Leaves,
    Fruit,
    Flies,
}

impl Layer {
    /// Numeric z-order used by batching frontends.
    pub fn z(self) -> u32 {
        match self {
            Layer::Ground => 0,
            Layer::Branches => 60,
            Layer::Leaves => 70,
            Layer::Fruit => 80,
            Layer::Flies => 90,
        }
    }
}

// ---------------------------------------------------------------------------
// Sink trait
// ---------------------------------------------------------------------------

/// Everything the core needs from a renderer.
///
/// Coordinates passed to `draw_line`/`draw_sprite` are local to the current
/// modelview transform.
pub trait RenderSink {
    /// Start a pass: switch cameras and reset the modelview to the camera's.
    fn set_camera(&mut self, camera: Camera);

    fn draw_line(&mut self, color: Color, from: Point, to: Point, width: f64, layer: Layer);

    /// Draw `sprite` with its top-left corner at `top_left`, scaled per axis.
    /// Returns the four local-space corners of the drawn quad.
    fn draw_sprite(
        &mut self,
        sprite: SpriteRef,
        top_left: Point,
        scale: Vec2,
        layer: Layer,
    ) -> [Point; 4];

    fn push_transform(&mut self);
    fn pop_transform(&mut self);
    fn translate(&mut self, offset: Vec2);
    fn rotate(&mut self, radians: f64);

    /// Map a local point through the current modelview and the projection to
    /// pixel coordinates (origin top-left).
    fn to_screen_space(&self, point: Point) -> Point;
}

/// Local-space corners of a sprite quad: top-left, top-right, bottom-left,
/// bottom-right.
pub fn sprite_corners(size: Size, top_left: Point, scale: Vec2) -> [Point; 4] {
    let w = size.width * scale.x;
    let h = size.height * scale.y;
    [
        top_left,
        top_left + Vec2::new(w, 0.0),
        top_left + Vec2::new(0.0, h),
        top_left + Vec2::new(w, h),
    ]
}

// ---------------------------------------------------------------------------
// Transform stack
// ---------------------------------------------------------------------------

/// A stack of affine transforms. Operations compose onto the top entry so the
/// most recent operation applies to points first.
#[derive(Clone, Debug)]
pub struct TransformStack {
    stack: Vec<Affine>,
}

impl Default for TransformStack {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformStack {
    pub fn new() -> Self {
        Self {
            stack: vec![Affine::IDENTITY],
        }
    }

    pub fn current(&self) -> Affine {
        *self.stack.last().unwrap_or(&Affine::IDENTITY)
    }

    /// Number of pushed entries above the base.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    pub fn push(&mut self) {
        let top = self.current();
        self.stack.push(top);
    }

    /// Pop the top entry. The base entry is never popped.
    pub fn pop(&mut self) {
        debug_assert!(self.stack.len() > 1, "transform stack underflow");
        if self.stack.len() > 1 {
            self.stack.pop();
        }
    }

    /// Replace the top entry.
    pub fn set(&mut self, transform: Affine) {
        if let Some(top) = self.stack.last_mut() {
            *top = transform;
        }
    }

    pub fn identity(&mut self) {
        self.set(Affine::IDENTITY);
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.set(self.current() * Affine::translate(offset));
    }

    pub fn rotate(&mut self, radians: f64) {
        self.set(self.current() * Affine::rotate(radians));
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.set(self.current() * Affine::scale_non_uniform(sx, sy));
    }

    pub fn apply(&self, point: Point) -> Point {
        self.current() * point
    }
}

// ---------------------------------------------------------------------------
// Camera
// ---------------------------------------------------------------------------

/// Pixel size of the render target.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Projection plus initial modelview for one render pass.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub viewport: Viewport,
    /// Maps camera space into normalized device coordinates `[-1, 1]`.
    pub projection: Affine,
    /// Modelview the transform stack starts from.
    pub modelview: Affine,
    /// Pixel rectangle normalized device coordinates land in.
    pub screen: Rect,
}

impl Camera {
    /// Pixel-space camera for overlays: origin top-left, y down.
    pub fn overlay(viewport: Viewport) -> Self {
        Self {
            viewport,
            projection: ortho(0.0, viewport.width, viewport.height, 0.0),
            modelview: Affine::IDENTITY,
            screen: viewport.rect(),
        }
    }

    /// World camera looking at `planet`.
    ///
    /// `zoom = 1` frames the surface at the bottom of the screen, `zoom = 0`
    /// shows the whole planet with its atmosphere (the minimap view).
    /// `rotation_turns` rotates the world around the planet centre in full
    /// turns.
    pub fn world(viewport: Viewport, planet: &Planet, zoom: f64, rotation_turns: f64) -> Self {
        let Viewport { width, height } = viewport;
        let projection = ortho(-width / 2.0, width / 2.0, height / 2.0, -height / 2.0);

        let min_zoom =
            width.min(height) / ((planet.radius + planet.atmosphere_height) * 2.5);
        let factor = min_zoom + (1.0 - min_zoom) * zoom;

        let mut stack = TransformStack::new();
        stack.translate(-planet.position.to_vec2());
        stack.translate(Vec2::new(
            0.0,
            zoom.powf(0.8) * (planet.radius + height / 8.0),
        ));
        stack.scale(factor, factor);
        stack.rotate(rotation_turns * std::f64::consts::TAU);

        Self {
            viewport,
            projection,
            modelview: stack.current(),
            screen: viewport.rect(),
        }
    }

    /// The same view, squeezed into `screen`.
    pub fn in_rect(self, screen: Rect) -> Self {
        Self { screen, ..self }
    }

    /// Map a point already in camera space (after modelview) to pixels.
    pub fn project(&self, camera_space: Point) -> Point {
        let ndc = self.projection * camera_space;
        Point::new(
            self.screen.x0 + self.screen.width() * (ndc.x + 1.0) / 2.0,
            self.screen.y0 + self.screen.height() * (1.0 - (ndc.y + 1.0) / 2.0),
        )
    }
}

/// Orthographic projection onto `[-1, 1]` in both axes.
fn ortho(left: f64, right: f64, bottom: f64, top: f64) -> Affine {
    let w = right - left;
    let h = top - bottom;
    let tx = -(right + left) / w;
    let ty = -(top + bottom) / h;
    Affine::new([2.0 / w, 0.0, 0.0, 2.0 / h, tx, ty])
}

// ---------------------------------------------------------------------------
// Recording sink
// ---------------------------------------------------------------------------

/// A primitive as recorded by `RecordingSink`, in screen space.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Line {
        color: Color,
        from: Point,
        to: Point,
        width: f64,
        layer: Layer,
    },
    Sprite {
        sprite: SpriteRef,
        corners: [Point; 4],
        layer: Layer,
    },
}

impl DrawCommand {
    pub fn layer(&self) -> Layer {
        match self {
            DrawCommand::Line { layer, .. } | DrawCommand::Sprite { layer, .. } => *layer,
        }
    }
}

/// A `RenderSink` that records primitives instead of drawing them.
#[derive(Clone, Debug)]
pub struct RecordingSink {
    camera: Camera,
    stack: TransformStack,
    commands: Vec<DrawCommand>,
}

impl RecordingSink {
    pub fn new(camera: Camera) -> Self {
        let mut stack = TransformStack::new();
        stack.set(camera.modelview);
        Self {
            camera,
            stack,
            commands: Vec::new(),
        }
    }

    /// Drop recorded commands, keeping the camera.
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// Commands in z-layer order; submission order is kept within a layer.
    pub fn commands_by_layer(&self) -> Vec<&DrawCommand> {
        let mut sorted: Vec<&DrawCommand> = self.commands.iter().collect();
        sorted.sort_by_key(|c| c.layer());
        sorted
    }

    /// Pushed transforms not yet popped. Zero between draw calls.
    pub fn transform_depth(&self) -> usize {
        self.stack.depth()
    }
}

impl RenderSink for RecordingSink {
    fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.stack = TransformStack::new();
        self.stack.set(camera.modelview);
    }

    fn draw_line(&mut self, color: Color, from: Point, to: Point, width: f64, layer: Layer) {
        // A zero-length segment has no side vector to extrude along.
        if from == to {
            return;
        }
        let (from, to) = (self.to_screen_space(from), self.to_screen_space(to));
        self.commands.push(DrawCommand::Line {
            color,
            from,
            to,
            width: width.max(1.0),
            layer,
        });
    }

    fn draw_sprite(
        &mut self,
        sprite: SpriteRef,
        top_left: Point,
        scale: Vec2,
        layer: Layer,
    ) -> [Point; 4] {
        let local = sprite_corners(sprite.size, top_left, scale);
        let corners = local.map(|p| self.to_screen_space(p));
        self.commands.push(DrawCommand::Sprite {
            sprite,
            corners,
            layer,
        });
        local
    }

    fn push_transform(&mut self) {
        self.stack.push();
    }

    fn pop_transform(&mut self) {
        self.stack.pop();
    }

    fn translate(&mut self, offset: Vec2) {
        self.stack.translate(offset);
    }

    fn rotate(&mut self, radians: f64) {
        self.stack.rotate(radians);
    }

    fn to_screen_space(&self, point: Point) -> Point {
        self.camera.project(self.stack.apply(point))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlanetParams;

    fn planet() -> Planet {
        Planet::new(&PlanetParams {
            radius: 500.0,
            min_atmosphere_height: 100.0,
            atmosphere_fraction: 0.4,
        })
    }

    fn close(a: Point, b: Point) -> bool {
        (a - b).length() < 1e-6
    }

    #[test]
    fn overlay_camera_is_pixel_space() {
        let camera = Camera::overlay(Viewport::new(1280.0, 720.0));
        let sink = RecordingSink::new(camera);
        let p = Point::new(100.0, 200.0);
        assert!(close(sink.to_screen_space(p), p));
    }

    #[test]
    fn world_camera_puts_planet_top_below_centre() {
        let camera = Camera::world(Viewport::new(1280.0, 720.0), &planet(), 1.0, 0.0);
        let sink = RecordingSink::new(camera);
        let top = sink.to_screen_space(Point::new(0.0, -500.0));
        assert!(close(top, Point::new(640.0, 450.0)), "{top:?}");
    }

    #[test]
    fn zoomed_out_camera_centres_planet() {
        let camera = Camera::world(Viewport::new(1280.0, 720.0), &planet(), 0.0, 0.0);
        let sink = RecordingSink::new(camera);
        let centre = sink.to_screen_space(Point::ORIGIN);
        assert!(close(centre, Point::new(640.0, 360.0)), "{centre:?}");
    }

    #[test]
    fn minimap_camera_lands_in_its_rect() {
        let viewport = Viewport::new(1280.0, 720.0);
        let rect = Rect::new(1100.0, 20.0, 1260.0, 110.0);
        let camera = Camera::world(viewport, &planet(), 0.0, 0.0).in_rect(rect);
        let centre = camera.project(camera.modelview * Point::ORIGIN);
        assert!(close(centre, rect.center()), "{centre:?}");
    }

    #[test]
    fn set_camera_resets_the_stack() {
        let viewport = Viewport::new(100.0, 100.0);
        let mut sink = RecordingSink::new(Camera::overlay(viewport));
        sink.push_transform();
        sink.translate(Vec2::new(5.0, 5.0));
        sink.set_camera(Camera::overlay(viewport));
        assert_eq!(sink.transform_depth(), 0);
        assert!(close(sink.to_screen_space(Point::ORIGIN), Point::ORIGIN));
    }

    #[test]
    fn transform_stack_restores_on_pop() {
        let mut stack = TransformStack::new();
        stack.translate(Vec2::new(5.0, 0.0));
        stack.push();
        stack.rotate(1.0);
        stack.translate(Vec2::new(0.0, 7.0));
        assert_eq!(stack.depth(), 1);
        stack.pop();
        assert_eq!(stack.depth(), 0);
        assert!(close(stack.apply(Point::ORIGIN), Point::new(5.0, 0.0)));
    }

    #[test]
    fn later_operations_apply_first() {
        let mut stack = TransformStack::new();
        stack.translate(Vec2::new(10.0, 0.0));
        stack.rotate(std::f64::consts::FRAC_PI_2);
        // Rotate (1, 0) to (0, 1), then translate.
        assert!(close(stack.apply(Point::new(1.0, 0.0)), Point::new(10.0, 1.0)));
    }

    #[test]
    fn degenerate_lines_are_dropped() {
        let mut sink = RecordingSink::new(Camera::overlay(Viewport::new(10.0, 10.0)));
        let p = Point::new(1.0, 1.0);
        sink.draw_line(Color::WHITE, p, p, 3.0, Layer::Branches);
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn commands_sort_by_layer_stably() {
        let mut sink = RecordingSink::new(Camera::overlay(Viewport::new(10.0, 10.0)));
        let a = Point::new(0.0, 0.0);
        let b = Point::new(1.0, 0.0);
        sink.draw_line(Color::rgb(1, 0, 0), a, b, 1.0, Layer::Flies);
        sink.draw_line(Color::rgb(2, 0, 0), a, b, 1.0, Layer::Branches);
        sink.draw_line(Color::rgb(3, 0, 0), a, b, 1.0, Layer::Branches);
        let order: Vec<Color> = sink
            .commands_by_layer()
            .into_iter()
            .map(|c| match c {
                DrawCommand::Line { color, .. } => *color,
                DrawCommand::Sprite { .. } => unreachable!(),
            })
            .collect();
        assert_eq!(order, vec![Color::rgb(2, 0, 0), Color::rgb(3, 0, 0), Color::rgb(1, 0, 0)]);
    }

    #[test]
    fn color_channels_clamp() {
        assert_eq!(Color::from_f64(-5.0, 300.0, 12.7), Color::rgb(0, 255, 12));
    }
}
