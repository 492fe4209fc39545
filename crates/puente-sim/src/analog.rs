//! Scripted analog source.

use puente_core::{AnalogLine, AnalogSource, Channel, NUM_CHANNELS};

/// Scripted stand-in for the ADC behind the CV and knob banks.
///
/// Holds one 10-bit level per line, set by the test between polling
/// cycles. Every sample taken is counted, so a test can assert not only
/// what was read but that nothing was.
#[derive(Debug, Clone, Default)]
pub struct SimAnalogSource {
    cv: [u16; NUM_CHANNELS],
    knobs: [u16; NUM_CHANNELS],
    reads: usize,
}

impl SimAnalogSource {
    /// Creates a source with every line at 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a source with the given CV and knob levels.
    #[must_use]
    pub fn with_levels(cv: [u16; NUM_CHANNELS], knobs: [u16; NUM_CHANNELS]) -> Self {
        Self {
            cv,
            knobs,
            reads: 0,
        }
    }

    /// Sets one CV input's level.
    pub fn set_cv(&mut self, channel: Channel, value: u16) {
        self.cv[channel.index()] = value;
    }

    /// Sets one knob's level.
    pub fn set_knob(&mut self, channel: Channel, value: u16) {
        self.knobs[channel.index()] = value;
    }

    /// Returns how many samples have been taken in total.
    #[must_use]
    pub const fn reads(&self) -> usize {
        self.reads
    }
}

impl AnalogSource for SimAnalogSource {
    fn read_raw(&mut self, line: AnalogLine) -> u16 {
        self.reads += 1;
        match line {
            AnalogLine::Cv(ch) => self.cv[ch.index()],
            AnalogLine::Knob(ch) => self.knobs[ch.index()],
        }
    }
}
