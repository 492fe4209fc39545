//! Drivable trigger lines.

use std::cell::Cell;
use std::rc::Rc;

use puente_core::{Level, NUM_CHANNELS, TriggerLine};

/// Simulated trigger pin driven from the test.
///
/// Clones share the same line: hand one clone to the interface as the
/// sensing line and keep another to drive the level mid-test.
#[derive(Debug, Clone)]
pub struct SimTriggerLine {
    level: Rc<Cell<Level>>,
}

impl SimTriggerLine {
    /// Creates a line resting at the given level.
    #[must_use]
    pub fn new(initial: Level) -> Self {
        Self {
            level: Rc::new(Cell::new(initial)),
        }
    }

    /// Drives the line to a level.
    pub fn drive(&self, level: Level) {
        self.level.set(level);
    }

    /// Returns the level currently driven.
    #[must_use]
    pub fn driven(&self) -> Level {
        self.level.get()
    }
}

impl TriggerLine for SimTriggerLine {
    fn level(&mut self) -> Level {
        self.level.get()
    }
}

/// Builds four independent lines plus a driving handle for each.
///
/// The first array goes to the interface; the second stays with the test.
#[must_use]
pub fn sim_trigger_bank(
    initial: Level,
) -> (
    [SimTriggerLine; NUM_CHANNELS],
    [SimTriggerLine; NUM_CHANNELS],
) {
    let lines: [SimTriggerLine; NUM_CHANNELS] =
        core::array::from_fn(|_| SimTriggerLine::new(initial));
    let handles = lines.clone();
    (lines, handles)
}
