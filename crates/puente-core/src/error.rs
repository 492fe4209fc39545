//! Error types for configuration validation and output writes.
//!
//! Nothing here is a runtime fault of the polling path: invalid channel ids
//! on the read side degrade to sentinels (see [`crate::interface`]), and
//! out-of-domain values are clamped. These types cover the two places a
//! caller gets a hard answer instead - rejecting a bad configuration before
//! the module starts, and refusing an output write that could not be sent
//! safely.

use thiserror::Error;

use crate::dac::{ChipSelect, DacRoute};

/// Errors detected while validating module configuration.
///
/// All variants are programmer or wiring-description errors: they are
/// reported once, at construction, before any channel or bus object exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Two logical outputs route to the same physical destination.
    ///
    /// Routing must be one-to-one; a duplicate would make one panel jack
    /// silently shadow another.
    #[error("outputs {first_out} and {second_out} both route to {route}")]
    DuplicateRoute {
        /// Lower of the two colliding logical output ids.
        first_out: u8,
        /// Higher of the two colliding logical output ids.
        second_out: u8,
        /// The shared destination.
        route: DacRoute,
    },

    /// The routing table never selects one of the two DAC chips.
    ///
    /// Four one-to-one routes over two dual-channel chips must touch both;
    /// a table that misses a chip describes a different board.
    #[error("routing table never selects chip {chip}")]
    ChipUnused {
        /// The chip no route points at.
        chip: ChipSelect,
    },

    /// The configured bus clock rate is zero.
    #[error("bus clock rate must be nonzero")]
    ZeroClock,
}

impl ConfigError {
    /// Creates a [`ConfigError::DuplicateRoute`] from two colliding output
    /// ids and their shared destination.
    #[must_use]
    pub fn duplicate_route(first_out: u8, second_out: u8, route: DacRoute) -> Self {
        Self::DuplicateRoute {
            first_out,
            second_out,
            route,
        }
    }
}

/// Errors surfaced by a CV output write.
///
/// A failed write means no bus activity happened at all: the frame is never
/// sent best-effort, because the far end is a fixed-function chip with no
/// way to report that it latched garbage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteError {
    /// The logical output id is outside 1-4.
    #[error("no CV output with id {id}")]
    InvalidChannel {
        /// The id the caller passed.
        id: u8,
    },

    /// Another chip-select line is still asserted.
    ///
    /// Driving a second line low while one is active would latch the same
    /// frame into both chips, so the write is refused instead.
    #[error("select line {active} is still asserted")]
    BusBusy {
        /// The line currently held low.
        active: ChipSelect,
    },
}
