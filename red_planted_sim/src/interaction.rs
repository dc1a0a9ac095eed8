// Clickable regions and hit-testing.
//
// Every drawable that can be clicked registers an `InteractionRecord` while it
// is drawn: a label, a debug color, a screen-space rectangle, the target it
// stands for, and a click priority. Records are rebuilt from scratch every
// render pass. Draw functions return them as `InteractionList` values that
// the caller concatenates, so nothing deep in a tree walk mutates a shared
// registry.
//
// Two orderings matter. Hit-testing walks records by ascending
// `ClickPriority` (fruit beats plant beats fly beats sector beats anything
// else), stable in list order. Debug overlays walk the list in list order,
// where fruit and fly records were inserted at the front: the most recently
// front-inserted record comes first.
//
// Screen rectangles are derived from rendered geometry: the points that were
// actually drawn are mapped to screen space and reduced with
// `aabb_from_points`, which reports an empty point set as `None` instead of
// producing a degenerate box.
//
// See also: `game.rs` for click dispatch and cursor feedback,
// `branch.rs`/`plant.rs`/`fly.rs`/`sector.rs` for where records come from.

use crate::render::Color;
use crate::types::{FlyId, FruitRef, PlantId};
use kurbo::{Point, Rect};

pub const LABEL_FRUIT: &str = "fruit";
pub const LABEL_MINIMAP: &str = "minimap";
pub const LABEL_PLANT: &str = "plant";
pub const LABEL_SECTOR: &str = "sector";
pub const LABEL_FLY: &str = "fly";

/// Hit-test priority. Lower values win.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ClickPriority {
    Fruit = 0,
    Plant = 1,
    Fly = 2,
    Sector = 3,
    Other = 4,
}

/// What a record stands for.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InteractionTarget {
    Fruit(FruitRef),
    Plant(PlantId),
    Fly(FlyId),
    Sector(usize),
    Minimap,
}

/// Cursor shown while hovering a target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CursorMode {
    Harvest,
    Cut,
    Hunt,
}

impl InteractionTarget {
    pub fn cursor(&self) -> Option<CursorMode> {
        match self {
            InteractionTarget::Fruit(_) => Some(CursorMode::Harvest),
            InteractionTarget::Plant(_) => Some(CursorMode::Cut),
            InteractionTarget::Fly(_) => Some(CursorMode::Hunt),
            InteractionTarget::Sector(_) | InteractionTarget::Minimap => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionRecord {
    pub label: String,
    pub color: Color,
    pub region: Rect,
    pub target: InteractionTarget,
    pub priority: ClickPriority,
}

impl InteractionRecord {
    pub fn new(
        label: impl Into<String>,
        color: Color,
        region: Rect,
        target: InteractionTarget,
        priority: ClickPriority,
    ) -> Self {
        Self {
            label: label.into(),
            color,
            region,
            target,
            priority,
        }
    }

    /// Whether `point` falls in the region. Left and top edges are inside,
    /// right and bottom edges are outside.
    pub fn hit(&self, point: Point) -> bool {
        let r = self.region;
        point.x >= r.x0 && point.x < r.x1 && point.y >= r.y0 && point.y < r.y1
    }
}

/// Per-frame interaction records.
///
/// Stored as two halves so front insertion stays cheap: `front` holds
/// front-inserted records oldest first, `back` holds appended records.
#[derive(Clone, Debug, Default)]
pub struct InteractionList {
    front: Vec<InteractionRecord>,
    back: Vec<InteractionRecord>,
}

impl InteractionList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert ahead of every record already in the list.
    pub fn push_front(&mut self, record: InteractionRecord) {
        self.front.push(record);
    }

    pub fn push(&mut self, record: InteractionRecord) {
        self.back.push(record);
    }

    /// Merge records collected elsewhere, as if they had been registered on
    /// this list in the same order.
    pub fn append(&mut self, mut other: InteractionList) {
        self.front.append(&mut other.front);
        self.back.append(&mut other.back);
    }

    pub fn len(&self) -> usize {
        self.front.len() + self.back.len()
    }

    pub fn is_empty(&self) -> bool {
        self.front.is_empty() && self.back.is_empty()
    }

    pub fn clear(&mut self) {
        self.front.clear();
        self.back.clear();
    }

    /// Records in list order.
    pub fn iter(&self) -> impl Iterator<Item = &InteractionRecord> {
        self.front.iter().rev().chain(self.back.iter())
    }

    /// Records in hit-test order: ascending priority, list order within a
    /// priority.
    pub fn by_priority(&self) -> Vec<&InteractionRecord> {
        let mut sorted: Vec<&InteractionRecord> = self.iter().collect();
        sorted.sort_by_key(|r| r.priority);
        sorted
    }

    /// Records containing `point`, in hit-test order.
    pub fn hits(&self, point: Point) -> impl Iterator<Item = &InteractionRecord> {
        self.by_priority().into_iter().filter(move |r| r.hit(point))
    }

    pub fn first_hit(&self, point: Point) -> Option<&InteractionRecord> {
        self.hits(point).next()
    }
}

/// Bounding box of `points`, or `None` for an empty slice.
pub fn aabb_from_points(points: &[Point]) -> Option<Rect> {
    let (first, rest) = points.split_first()?;
    Some(
        rest.iter()
            .fold(Rect::from_points(*first, *first), |r, p| r.union_pt(*p)),
    )
}

/// Bounding box of `points` grown by `padding` on every side.
pub fn padded_aabb(points: &[Point], padding: f64) -> Option<Rect> {
    aabb_from_points(points).map(|r| r.inflate(padding, padding))
}
