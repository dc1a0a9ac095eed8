// Game events: things the frontend turns into sounds and UI updates.
//
// The core plays no audio and owns no UI. Whatever the player should hear or
// see acknowledged (a fruit picked, a plant mowed, a fly swatted, a tomato
// ripening, the round ending) is reported as a `GameEvent` stamped with the
// tick it happened on. `GameState::update()` returns the events of its tick;
// events raised by input and render passes are queued and returned by the
// next update, so the frontend has a single place to drain them.
//
// `GameEventKind::sound()` maps events onto the game's sound cues; the
// frontend picks a concrete sample per cue.
//
// See also: `game.rs` for `StepResult` and where events are raised.

use crate::game::GameStatus;
use crate::types::{FlyId, FruitRef, PlantId};
use serde::{Deserialize, Serialize};

/// An event emitted by the game core.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEvent {
    pub tick: u64,
    pub kind: GameEventKind,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GameEventKind {
    /// The player picked a ripe fruit.
    FruitPicked { fruit: FruitRef },
    /// A fruit was drawn ripe for the first time.
    FruitRipened { fruit: FruitRef },
    /// The player cut a plant; a new one sprouted in its slot.
    PlantCut { old: PlantId, new: PlantId },
    FlySwatted { fly: FlyId },
    /// A fly took a fruit off a plant.
    FruitStolen { fly: FlyId, fruit: FruitRef },
    /// A fly handed a tomato over at the spaceship.
    TomatoDelivered { total: u32 },
    FlyBred { fly: FlyId },
    /// A harvested tomato reached the score counter.
    TomatoHarvested { score: u32 },
    GameOver { status: GameStatus },
}

/// Sound cues the game knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundCue {
    Pick,
    Mowing,
    Slap,
    Ripe,
}

impl GameEventKind {
    pub fn sound(&self) -> Option<SoundCue> {
        match self {
            GameEventKind::FruitPicked { .. } => Some(SoundCue::Pick),
            GameEventKind::FruitRipened { .. } => Some(SoundCue::Ripe),
            GameEventKind::PlantCut { .. } => Some(SoundCue::Mowing),
            GameEventKind::FlySwatted { .. } => Some(SoundCue::Slap),
            GameEventKind::FruitStolen { .. }
            | GameEventKind::TomatoDelivered { .. }
            | GameEventKind::FlyBred { .. }
            | GameEventKind::TomatoHarvested { .. }
            | GameEventKind::GameOver { .. } => None,
        }
    }
}
