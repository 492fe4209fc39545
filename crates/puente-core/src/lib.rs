//! Puente Core - Signal conditioning and DAC protocol for the puente interface
//!
//! This crate is the hardware abstraction core for a four-channel
//! CV/trigger/MIDI interface module: four analog CV inputs, four knob
//! inputs, four digital trigger inputs, and four CV outputs driven by two
//! dual-channel serial DAC chips on a shared bus. It turns raw hardware
//! signals into stable, semantically scaled values and edge events.
//!
//! # Core Abstractions
//!
//! ## Channels
//!
//! - [`AnalogChannel`] - Smoothed analog line with current/previous history
//! - [`TriggerChannel`] - Debounced digital line with polarity-corrected
//!   edge and level queries
//! - [`Channel`] - Logical channel id (1-4) shared by every bank
//!
//! ## Conditioning
//!
//! - [`Smoother`] / [`Debouncer`] - Opaque capability traits for analog
//!   smoothing and digital debouncing
//! - [`ResponsiveSmoother`] / [`IntervalDebouncer`] - The built-in
//!   implementations the module ships with
//!
//! ## Output
//!
//! - [`DacFrame`] - The bit-exact two-byte frame the DAC chips expect
//! - [`RoutingTable`] - Logical output to (chip select, sub-DAC) mapping
//! - [`DacWriter`] - Frame encoding plus claim/transmit/release sequencing
//!
//! ## Facade
//!
//! - [`Puente`] - Owns all twelve channels and the writer; exposes the
//!   polling, query, scaling, and write surface
//!
//! # Polling Model
//!
//! Everything is driven by a single sequential polling loop. Analog change
//! queries refresh themselves; trigger edge queries do not - the caller
//! must refresh the trigger bank first each cycle. That asymmetry is part
//! of the module's contract, not an accident of this implementation; see
//! [`TriggerChannel`] for the details.
//!
//! # no_std Support
//!
//! This crate is `no_std` compatible for embedded targets. Disable the
//! default `std` feature in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! puente-core = { version = "0.1", default-features = false }
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use puente_core::{Config, Puente};
//!
//! let mut puente = Puente::with_defaults(Config::default(), trigger_pins)?;
//!
//! loop {
//!     puente.read_all_inputs(millis(), &mut adc);
//!
//!     if puente.trigger_rose(1) {
//!         let value = puente.read_knob_dac(1, &mut adc);
//!         puente.write_out(1, value as u16, &mut spi, &mut selects)?;
//!     }
//! }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

pub mod analog;
pub mod conditioning;
pub mod config;
pub mod dac;
pub mod error;
pub mod interface;
pub mod scale;
pub mod trigger;

// Re-export main types at crate root
pub use analog::AnalogChannel;
pub use conditioning::{Debouncer, IntervalDebouncer, ResponsiveSmoother, Smoother, TriggerLine};
pub use config::Config;
pub use dac::{
    BitOrder, ChipSelect, ClockPhase, ClockPolarity, DacFrame, DacRoute, DacWriter, RoutingTable,
    SelectLine, SelectLines, SpiBus, SpiSettings, SubDac,
};
pub use error::{ConfigError, WriteError};
pub use interface::Puente;
pub use scale::{analog_to_dac, analog_to_midi, midi_to_dac};
pub use trigger::TriggerChannel;

/// Number of channels in every bank (CV in, knob, trigger, CV out).
///
/// Fixed by the board: the hardware carries four of each.
pub const NUM_CHANNELS: usize = 4;

/// Maximum value of the 10-bit analog input domain.
pub const ANALOG_MAX: u16 = 1023;

/// Maximum value of the 12-bit DAC output domain.
pub const DAC_MAX: u16 = 4095;

/// Maximum value of the 7-bit MIDI controller domain.
pub const MIDI_MAX: u8 = 127;

/// A logical channel id, 1-4.
///
/// Every bank (CV inputs, knobs, triggers, CV outputs) is addressed by the
/// same four ids, matching the numbering printed on the panel. Public
/// operations take a raw `u8` id so out-of-range requests can flow in and
/// degrade to a sentinel; [`Channel::from_id`] is the checked boundary.
///
/// # Example
///
/// ```rust
/// use puente_core::Channel;
///
/// assert_eq!(Channel::from_id(1), Some(Channel::Ch1));
/// assert_eq!(Channel::from_id(0), None);
/// assert_eq!(Channel::from_id(5), None);
/// assert_eq!(Channel::Ch3.index(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Channel 1.
    Ch1,
    /// Channel 2.
    Ch2,
    /// Channel 3.
    Ch3,
    /// Channel 4.
    Ch4,
}

impl Channel {
    /// All four channels, in id order.
    pub const ALL: [Channel; NUM_CHANNELS] = [
        Channel::Ch1,
        Channel::Ch2,
        Channel::Ch3,
        Channel::Ch4,
    ];

    /// Converts a 1-based panel id to a channel.
    ///
    /// Returns `None` for anything outside 1-4.
    #[inline]
    pub const fn from_id(id: u8) -> Option<Self> {
        match id {
            1 => Some(Channel::Ch1),
            2 => Some(Channel::Ch2),
            3 => Some(Channel::Ch3),
            4 => Some(Channel::Ch4),
            _ => None,
        }
    }

    /// Returns the 1-based panel id.
    #[inline]
    pub const fn id(self) -> u8 {
        self.index() as u8 + 1
    }

    /// Returns the 0-based array index.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Channel::Ch1 => 0,
            Channel::Ch2 => 1,
            Channel::Ch3 => 2,
            Channel::Ch4 => 3,
        }
    }
}

/// A logic level on a digital line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// Electrically low.
    Low,
    /// Electrically high.
    High,
}

impl Level {
    /// Returns the opposite level.
    #[inline]
    pub const fn inverted(self) -> Self {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }

    /// Returns true if this is [`Level::High`].
    #[inline]
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

/// Address of one of the eight analog input lines.
///
/// The module has two analog banks: the four CV input jacks and the four
/// panel knobs. A sample source maps each line to whatever pin or mux
/// setting backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalogLine {
    /// A CV input jack.
    Cv(Channel),
    /// A panel knob.
    Knob(Channel),
}

impl AnalogLine {
    /// Returns the logical channel within the line's bank.
    #[inline]
    pub const fn channel(self) -> Channel {
        match self {
            AnalogLine::Cv(ch) | AnalogLine::Knob(ch) => ch,
        }
    }
}

/// Raw analog sample source.
///
/// The one capability the analog side consumes: an instantaneous,
/// unconditioned 10-bit sample for a given line. On hardware this is the
/// ADC read; in tests it is a scripted source. Implementations must report
/// values in the 10-bit domain `[0, 1023]`.
pub trait AnalogSource {
    /// Samples the given line once and returns the raw 10-bit value.
    fn read_raw(&mut self, line: AnalogLine) -> u16;
}
