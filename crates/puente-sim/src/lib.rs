//! Deterministic simulated hardware for the puente interface core.
//!
//! Real hardware behind the core is an ADC feeding the CV and knob banks,
//! four GPIO trigger pins, and two DAC chips sharing a serial bus behind
//! two chip-select lines. This crate stands in for all of it:
//!
//! - [`SimAnalogSource`] - scripted analog levels with a read counter
//! - [`SimTriggerLine`] - trigger pin driven from the test through a
//!   shared handle
//! - [`SimBus`] / [`SimSelectLine`] / [`sim_rig`] - a bus rig that records
//!   every electrical action, in order, into one shared [`EventLog`]
//! - [`verify_frame_protocol`] - checks a capture against the bus
//!   discipline the DAC chips require
//!
//! Everything is synchronous and allocation-cheap; a test drives the same
//! polling loop the firmware would and then asserts on the capture.
//!
//! ## Quick Start
//!
//! ```rust
//! use puente_core::{Config, Level, Puente};
//! use puente_sim::{sim_rig, sim_trigger_bank};
//!
//! let (mut bus, mut selects, log) = sim_rig();
//! let (lines, _handles) = sim_trigger_bank(Level::Low);
//! let puente = Puente::with_defaults(Config::default(), lines).unwrap();
//!
//! puente.write_out(1, 0x0ABC, &mut bus, &mut selects).unwrap();
//! log.verify().unwrap();
//! ```

mod analog;
mod bus;
mod trigger;

pub use analog::SimAnalogSource;
pub use bus::{
    BusEvent, EventLog, SimBus, SimSelectLine, captured_frames, sim_rig, verify_frame_protocol,
};
pub use trigger::{SimTriggerLine, sim_trigger_bank};

use puente_core::ChipSelect;

/// A frame-protocol violation found in a captured event sequence.
///
/// The checker models what the DAC chips tolerate, not what the core
/// happens to emit; see [`verify_frame_protocol`] for the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolViolation {
    /// A second select line went low while another was still low.
    #[error("{second} asserted while {first} is still asserted")]
    OverlappingSelection {
        /// The chip already selected.
        first: ChipSelect,
        /// The chip whose selection overlapped.
        second: ChipSelect,
    },

    /// A selected chip was deselected while the bus was still claimed.
    #[error("{chip} deasserted while the bus is still claimed")]
    DeselectWhileClaimed {
        /// The chip that was deselected mid-claim.
        chip: ChipSelect,
    },

    /// The bus was claimed with no chip selected.
    #[error("bus claimed with no chip selected")]
    ClaimOutsideSelection,

    /// The bus was claimed twice without an intervening release.
    #[error("bus claimed twice without release")]
    DoubleClaim,

    /// A byte was transferred outside a claim window.
    #[error("byte transferred outside a claim window")]
    TransferOutsideClaim,

    /// The bus was released without a matching claim.
    #[error("bus released without a matching claim")]
    ReleaseOutsideClaim,

    /// A chip was still selected when the capture ended.
    #[error("{chip} still asserted at end of capture")]
    DanglingSelection {
        /// The chip left selected.
        chip: ChipSelect,
    },

    /// The bus was still claimed when the capture ended.
    #[error("bus still claimed at end of capture")]
    DanglingClaim,
}
