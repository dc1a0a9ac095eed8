// Core types shared across the game core.
//
// Defines the planetary addressing scheme (`SurfaceCoordinate`), identifiers
// for plants and flies, the `BranchPath` used to point at one branch inside a
// plant's tree, and the degree-based vector rotation every placement
// computation uses.
//
// Coordinate conventions: world space is 2D with y pointing down (screen
// convention). Angles are in degrees and rotate a vector from +x toward +y,
// so rotating "straight up" `(0, -1)` by 90 degrees yields `(1, 0)`.

use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;

// ---------------------------------------------------------------------------
// Spatial types
// ---------------------------------------------------------------------------

/// A position relative to the planet surface: an angle around the planet and
/// a height above the ground.
///
/// `angle_degrees` is not normalized; callers treat it modulo 360.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceCoordinate {
    pub angle_degrees: f64,
    pub elevation: f64,
}

impl SurfaceCoordinate {
    pub const fn new(angle_degrees: f64, elevation: f64) -> Self {
        Self {
            angle_degrees,
            elevation,
        }
    }

    /// A point on the ground at the given angle.
    pub const fn on_surface(angle_degrees: f64) -> Self {
        Self::new(angle_degrees, 0.0)
    }

    /// Linear blend toward `target`; `alpha = 0` is `self`, `alpha = 1` is `target`.
    pub fn lerp(self, target: Self, alpha: f64) -> Self {
        Self {
            angle_degrees: (1.0 - alpha) * self.angle_degrees + alpha * target.angle_degrees,
            elevation: (1.0 - alpha) * self.elevation + alpha * target.elevation,
        }
    }
}

impl fmt::Display for SurfaceCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}°@{:.1}", self.angle_degrees, self.elevation)
    }
}

/// Rotate `v` by `degrees` (from +x toward +y).
pub fn rotate_degrees(v: Vec2, degrees: f64) -> Vec2 {
    let (s, c) = degrees.to_radians().sin_cos();
    Vec2::new(v.x * c - v.y * s, v.x * s + v.y * c)
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Identity of one plant object. A replanted slot gets a fresh `PlantId`, so
/// a stale reference never resolves to the replacement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlantId {
    /// Index of the owning sector.
    pub sector: usize,
    /// Per-sector serial number, never reused.
    pub serial: u64,
}

impl fmt::Display for PlantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "plant {}.{}", self.sector, self.serial)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FlyId(pub u64);

impl fmt::Display for FlyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fly {}", self.0)
    }
}

/// Child indices from a plant's root branch down to one branch. The empty
/// path is the root itself.
pub type BranchPath = SmallVec<[u16; 8]>;

/// A fruit on a specific plant. Flies and interaction records hold these
/// instead of references into the tree.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FruitRef {
    pub plant: PlantId,
    pub branch: BranchPath,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_halfway() {
        let a = SurfaceCoordinate::new(0.0, 0.0);
        let b = SurfaceCoordinate::new(90.0, 100.0);
        assert_eq!(a.lerp(b, 0.5), SurfaceCoordinate::new(45.0, 50.0));
    }

    #[test]
    fn lerp_endpoints() {
        let a = SurfaceCoordinate::new(10.0, 300.0);
        let b = SurfaceCoordinate::new(70.0, 2000.0);
        assert_eq!(a.lerp(b, 0.0), a);
        assert_eq!(a.lerp(b, 1.0), b);
    }

    #[test]
    fn rotate_up_by_quarter_turn_points_right() {
        let v = rotate_degrees(Vec2::new(0.0, -1.0), 90.0);
        assert!((v.x - 1.0).abs() < 1e-12, "{v:?}");
        assert!(v.y.abs() < 1e-12, "{v:?}");
    }

    #[test]
    fn rotate_preserves_length() {
        let v = rotate_degrees(Vec2::new(3.0, -4.0), 37.0);
        assert!((v.length() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn plant_ids_distinguish_serials() {
        let a = PlantId {
            sector: 1,
            serial: 0,
        };
        let b = PlantId {
            sector: 1,
            serial: 1,
        };
        assert_ne!(a, b);
        assert_eq!(a.to_string(), "plant 1.0");
    }
}
