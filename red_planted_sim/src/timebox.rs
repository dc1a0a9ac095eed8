// TimeBoxed<T>: entries that live for a fixed number of ticks.
//
// Cut plants and swatted flies keep being drawn for a while as they drift off
// into space, then disappear. Both use this container: every entry carries an
// age in ticks, `tick()` ages everything by one and drops entries whose age
// reached the horizon. Drawables read the age to drive their exit animation.

/// Entries with an age counter, expired at a fixed horizon.
#[derive(Clone, Debug)]
pub struct TimeBoxed<T> {
    entries: Vec<(u32, T)>,
    horizon: u32,
}

impl<T> TimeBoxed<T> {
    /// Entries are dropped once `horizon` ticks have elapsed since insertion.
    pub fn new(horizon: u32) -> Self {
        Self {
            entries: Vec::new(),
            horizon,
        }
    }

    pub fn horizon(&self) -> u32 {
        self.horizon
    }

    /// Insert at age zero.
    pub fn push(&mut self, item: T) {
        self.entries.push((0, item));
    }

    /// Age every entry by one tick and drop the expired ones.
    pub fn tick(&mut self) {
        let horizon = self.horizon;
        for (age, _) in &mut self.entries {
            *age += 1;
        }
        self.entries.retain(|(age, _)| *age < horizon);
    }

    /// Entries with their ages, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.entries.iter().map(|(age, item)| (*age, item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (u32, &mut T)> {
        self.entries.iter_mut().map(|(age, item)| (*age, item))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
