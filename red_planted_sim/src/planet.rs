// Planet geometry and the surface transform.
//
// Everything placed on or above the planet is addressed by a
// `SurfaceCoordinate`. `Planet::at()` resolves one to an absolute world
// position by rotating the "straight up" vector `(0, -(radius + elevation))`
// around the planet centre. `surface_transform()` is the matching
// translate-then-rotate pair: drawing under it puts local `(0, 0)` on the
// coordinate with local "up" (`-y`) pointing away from the planet centre.
//
// See also: `types.rs` for `SurfaceCoordinate` and `rotate_degrees`,
// `render.rs` for the transform stack the surface transform is pushed onto.

use crate::config::PlanetParams;
use crate::render::RenderSink;
use crate::types::{SurfaceCoordinate, rotate_degrees};
use kurbo::{Affine, Point, Vec2};
use std::f64::consts::TAU;

#[derive(Clone, Debug)]
pub struct Planet {
    pub position: Point,
    pub radius: f64,
    pub atmosphere_height: f64,
}

impl Planet {
    /// A planet centred on the world origin.
    pub fn new(params: &PlanetParams) -> Self {
        Self {
            position: Point::ORIGIN,
            radius: params.radius,
            atmosphere_height: params
                .min_atmosphere_height
                .max(params.radius * params.atmosphere_fraction),
        }
    }

    pub fn circumference(&self) -> f64 {
        self.radius * TAU
    }

    /// Absolute world position of a surface coordinate.
    pub fn at(&self, coord: SurfaceCoordinate) -> Point {
        let up = Vec2::new(0.0, -(self.radius + coord.elevation));
        self.position + rotate_degrees(up, coord.angle_degrees)
    }

    /// Local-to-world transform of something standing at `coord`.
    pub fn surface_transform(&self, coord: SurfaceCoordinate) -> Affine {
        Affine::translate(self.at(coord).to_vec2())
            * Affine::rotate(coord.angle_degrees.to_radians())
    }

    /// Compose the surface transform onto the sink's current modelview.
    /// Callers bracket this with `push_transform`/`pop_transform`.
    pub fn apply_surface_transform(&self, sink: &mut dyn RenderSink, coord: SurfaceCoordinate) {
        sink.translate(self.at(coord).to_vec2());
        sink.rotate(coord.angle_degrees.to_radians());
    }

    /// Whether a world point lies inside the atmosphere (or the planet).
    pub fn within_atmosphere(&self, point: Point) -> bool {
        (point - self.position).length() < self.radius + self.atmosphere_height
    }
}
