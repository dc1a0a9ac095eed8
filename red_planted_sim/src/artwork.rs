// Sprite handles and their sizes.
//
// The core never loads images. It refers to sprites through `SpriteRef`, a
// kind tag plus the pixel size the frontend's texture has, which is all the
// geometry code needs (fruit and leaf quads are positioned and scaled from
// the sprite size). A frontend builds an `Artwork` from the sizes of the
// textures it actually loaded; tests and the headless driver use
// `Artwork::default()`, a fixed stand-in table.
//
// Tomato sprites come in ripeness stages. The stage index is derived from the
// fruit's growth factor and clamped into the valid range, so a growth factor
// outside `[0, 1]` can never select a missing sprite.
//
// See also: `branch.rs` which picks tomato and leaf sprites per frame,
// `event.rs` for the sound cues the frontend plays instead of this module.

use kurbo::Size;
use red_planted_prng::RandomSource;
use serde::{Deserialize, Serialize};

/// Ripeness stage of a tomato sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TomatoStage {
    Fresh,
    Yellow,
    Ripe,
    Rotten,
}

impl TomatoStage {
    const GROWING: [TomatoStage; 3] = [TomatoStage::Fresh, TomatoStage::Yellow, TomatoStage::Ripe];

    /// Stage for a fruit at growth `factor`. The index is clamped into the
    /// growing stages; `rotten` overrides everything.
    pub fn from_factor(factor: f64, rotten: bool) -> Self {
        if rotten {
            return TomatoStage::Rotten;
        }
        // `as` saturates NaN to 0, the clamp handles the rest.
        let index = ((factor * 2.3) as i64).clamp(0, 2) as usize;
        Self::GROWING[index]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpriteKind {
    Tomato(TomatoStage),
    Leaf(usize),
    Rock(usize),
    Fly { frame: usize },
    Spaceship,
}

/// A sprite as the core sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteRef {
    pub kind: SpriteKind,
    pub size: Size,
}

/// Sprite size table shared by every drawable.
#[derive(Clone, Debug)]
pub struct Artwork {
    /// Indexed like `TomatoStage`: fresh, yellow, ripe, rotten.
    pub tomato: [Size; 4],
    pub leaves: Vec<Size>,
    pub rocks: Vec<Size>,
    /// One size per animation frame.
    pub fly_frames: Vec<Size>,
    pub fly_frame_ms: u64,
    pub spaceship: Size,
}

impl Default for Artwork {
    fn default() -> Self {
        Self {
            tomato: [Size::new(32.0, 32.0); 4],
            leaves: vec![Size::new(24.0, 40.0), Size::new(28.0, 40.0), Size::new(24.0, 36.0)],
            rocks: vec![
                Size::new(64.0, 40.0),
                Size::new(48.0, 32.0),
                Size::new(80.0, 48.0),
                Size::new(56.0, 44.0),
            ],
            fly_frames: vec![Size::new(24.0, 24.0), Size::new(24.0, 24.0)],
            fly_frame_ms: 200,
            spaceship: Size::new(160.0, 96.0),
        }
    }
}

impl Artwork {
    pub fn tomato(&self, stage: TomatoStage) -> SpriteRef {
        let index = match stage {
            TomatoStage::Fresh => 0,
            TomatoStage::Yellow => 1,
            TomatoStage::Ripe => 2,
            TomatoStage::Rotten => 3,
        };
        SpriteRef {
            kind: SpriteKind::Tomato(stage),
            size: self.tomato[index],
        }
    }

    pub fn tomato_sprite(&self, factor: f64, rotten: bool) -> SpriteRef {
        self.tomato(TomatoStage::from_factor(factor, rotten))
    }

    pub fn ripe_tomato(&self) -> SpriteRef {
        self.tomato(TomatoStage::Ripe)
    }

    pub fn is_tomato_ripe(&self, sprite: &SpriteRef) -> bool {
        sprite.kind == SpriteKind::Tomato(TomatoStage::Ripe)
    }

    /// Leaf sprite by index; out-of-range indices wrap.
    pub fn leaf(&self, index: usize) -> SpriteRef {
        let index = index % self.leaves.len().max(1);
        SpriteRef {
            kind: SpriteKind::Leaf(index),
            size: self.leaves.get(index).copied().unwrap_or(Size::ZERO),
        }
    }

    pub fn random_leaf(&self, rng: &mut impl RandomSource) -> usize {
        rng.choose_index(self.leaves.len())
    }

    pub fn rock(&self, index: usize) -> SpriteRef {
        let index = index % self.rocks.len().max(1);
        SpriteRef {
            kind: SpriteKind::Rock(index),
            size: self.rocks.get(index).copied().unwrap_or(Size::ZERO),
        }
    }

    pub fn random_rock(&self, rng: &mut impl RandomSource) -> usize {
        rng.choose_index(self.rocks.len())
    }

    /// Fly animation frame shown at game time `now` (seconds).
    pub fn fly(&self, now: f64) -> SpriteRef {
        let frames = self.fly_frames.len().max(1);
        let elapsed_ms = (now.max(0.0) * 1000.0) as u64;
        let frame = (elapsed_ms / self.fly_frame_ms.max(1)) as usize % frames;
        SpriteRef {
            kind: SpriteKind::Fly { frame },
            size: self.fly_frames.get(frame).copied().unwrap_or(Size::ZERO),
        }
    }

    pub fn spaceship(&self) -> SpriteRef {
        SpriteRef {
            kind: SpriteKind::Spaceship,
            size: self.spaceship,
        }
    }
}
