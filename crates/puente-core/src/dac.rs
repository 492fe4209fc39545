//! DAC routing, frame encoding, and the serial write protocol.
//!
//! The module's four CV outputs live on two dual-channel serial DAC chips
//! sharing one bus, each chip with its own select line. Everything in this
//! module exists to get one thing exactly right: the 16-bit frame a chip
//! latches, and the claim/transmit/release discipline around it. The far
//! end is a fixed-function converter with no acknowledgment path - a
//! malformed frame is not an error, it is a wrong voltage on a jack.
//!
//! A write is always the same five steps: assert the destination's select
//! line, open an exclusive bus transaction, send the high byte then the
//! low byte, close the transaction, release the line. The one safety
//! invariant sits on top: both select lines must never be low at once,
//! because two asserted chips would latch the same frame. [`SelectLines`]
//! owns both lines and enforces that exclusion; [`DacWriter`] performs the
//! sequence.

use core::fmt;

use crate::error::{ConfigError, WriteError};
use crate::{Channel, DAC_MAX, NUM_CHANNELS};

/// One of the two DAC chip-select lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChipSelect {
    /// The chip on select line 1.
    Cs1,
    /// The chip on select line 2.
    Cs2,
}

impl ChipSelect {
    /// Both select lines, in id order.
    pub const ALL: [ChipSelect; 2] = [ChipSelect::Cs1, ChipSelect::Cs2];

    /// Returns the 0-based line index.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            ChipSelect::Cs1 => 0,
            ChipSelect::Cs2 => 1,
        }
    }
}

impl fmt::Display for ChipSelect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChipSelect::Cs1 => f.write_str("CS1"),
            ChipSelect::Cs2 => f.write_str("CS2"),
        }
    }
}

/// One of the two converter channels inside a dual-channel DAC chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubDac {
    /// Converter channel A.
    A,
    /// Converter channel B.
    B,
}

impl SubDac {
    /// Returns the selector bit as it appears in the frame's high byte
    /// (bit 7): 0 for A, 1 for B.
    #[inline]
    pub const fn bit(self) -> u8 {
        match self {
            SubDac::A => 0,
            SubDac::B => 1,
        }
    }
}

impl fmt::Display for SubDac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubDac::A => f.write_str("A"),
            SubDac::B => f.write_str("B"),
        }
    }
}

/// A physical output destination: one converter channel on one chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DacRoute {
    chip: ChipSelect,
    sub: SubDac,
}

impl DacRoute {
    /// Creates a route.
    #[inline]
    pub const fn new(chip: ChipSelect, sub: SubDac) -> Self {
        Self { chip, sub }
    }

    /// Returns the chip-select line.
    #[inline]
    pub const fn chip(self) -> ChipSelect {
        self.chip
    }

    /// Returns the converter channel within the chip.
    #[inline]
    pub const fn sub(self) -> SubDac {
        self.sub
    }
}

impl fmt::Display for DacRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.chip, self.sub)
    }
}

/// The logical-output to physical-destination map.
///
/// Four entries, one per CV output jack, fixed for the life of the module.
/// This is configuration, not logic - but a wrong table silently drives
/// the wrong jack with no detectable error, so [`validate`]
/// (RoutingTable::validate) must pass before any writer is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingTable {
    routes: [DacRoute; NUM_CHANNELS],
}

impl RoutingTable {
    /// Creates a table from four routes, indexed by logical output 1-4.
    ///
    /// The table is not validated here; see
    /// [`validate`](RoutingTable::validate).
    #[inline]
    pub const fn new(routes: [DacRoute; NUM_CHANNELS]) -> Self {
        Self { routes }
    }

    /// Returns the destination for a logical output.
    #[inline]
    pub const fn route(&self, out: Channel) -> DacRoute {
        self.routes[out.index()]
    }

    /// Checks that the table describes a real board.
    ///
    /// Every route must be distinct (the map is one-to-one) and both chips
    /// must appear (four outputs over two dual-channel chips).
    pub fn validate(&self) -> Result<(), ConfigError> {
        for chip in ChipSelect::ALL {
            if !self.routes.iter().any(|r| r.chip() == chip) {
                return Err(ConfigError::ChipUnused { chip });
            }
        }
        for i in 0..NUM_CHANNELS {
            for j in (i + 1)..NUM_CHANNELS {
                if self.routes[i] == self.routes[j] {
                    return Err(ConfigError::duplicate_route(
                        i as u8 + 1,
                        j as u8 + 1,
                        self.routes[i],
                    ));
                }
            }
        }
        Ok(())
    }
}

impl Default for RoutingTable {
    /// The shipped board wiring.
    fn default() -> Self {
        Self::new([
            DacRoute::new(ChipSelect::Cs2, SubDac::B),
            DacRoute::new(ChipSelect::Cs1, SubDac::A),
            DacRoute::new(ChipSelect::Cs2, SubDac::A),
            DacRoute::new(ChipSelect::Cs1, SubDac::B),
        ])
    }
}

/// Bit transmission order on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOrder {
    /// Most significant bit first.
    MsbFirst,
    /// Least significant bit first.
    LsbFirst,
}

/// Clock line idle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPolarity {
    /// Clock idles low.
    IdleLow,
    /// Clock idles high.
    IdleHigh,
}

/// Which clock transition captures data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockPhase {
    /// Data is captured on the first (leading) transition.
    CaptureOnFirstTransition,
    /// Data is captured on the second (trailing) transition.
    CaptureOnSecondTransition,
}

/// Bus transaction parameters for one peripheral.
///
/// Passed to [`SpiBus::claim`] at the start of every transaction, so a bus
/// shared with unrelated peripherals is reconfigured per claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiSettings {
    /// Clock rate in hertz.
    pub clock_hz: u32,
    /// Bit order within each byte.
    pub bit_order: BitOrder,
    /// Clock idle state.
    pub polarity: ClockPolarity,
    /// Capture transition.
    pub phase: ClockPhase,
}

impl Default for SpiSettings {
    /// What the DAC chips require: 4 MHz, MSB first, clock idle low,
    /// capture on the leading edge.
    fn default() -> Self {
        Self {
            clock_hz: 4_000_000,
            bit_order: BitOrder::MsbFirst,
            polarity: ClockPolarity::IdleLow,
            phase: ClockPhase::CaptureOnFirstTransition,
        }
    }
}

/// Control bits occupying the high nibble of every frame: output
/// unbuffered, gain 1x, shutdown inactive.
const CONTROL_BITS: u8 = 0b0011_0000;

/// One complete 16-bit DAC frame: destination plus 12-bit value.
///
/// Built and consumed within a single write. The value is clamped to the
/// 12-bit domain at construction, so a frame is always encodable.
///
/// # Wire layout
///
/// ```text
/// high byte: | sub-DAC | 0 | 1 | 1 | value bits 11-8 |
/// low byte:  |            value bits 7-0             |
/// ```
///
/// The two fixed 1-bits are the gain and shutdown control bits; the
/// transmitted order is high byte first.
///
/// # Example
///
/// ```rust
/// use puente_core::{ChipSelect, DacFrame, DacRoute, SubDac};
///
/// let route = DacRoute::new(ChipSelect::Cs1, SubDac::A);
/// let frame = DacFrame::new(route, 0x0ABC);
/// assert_eq!(frame.to_bytes(), [0x3A, 0xBC]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DacFrame {
    route: DacRoute,
    value: u16,
}

impl DacFrame {
    /// Creates a frame, clamping the value into `[0, 4095]`.
    #[inline]
    pub const fn new(route: DacRoute, value: u16) -> Self {
        let value = if value > DAC_MAX { DAC_MAX } else { value };
        Self { route, value }
    }

    /// Returns the destination.
    #[inline]
    pub const fn route(self) -> DacRoute {
        self.route
    }

    /// Returns the clamped 12-bit value.
    #[inline]
    pub const fn value(self) -> u16 {
        self.value
    }

    /// Returns the first transmitted byte: sub-DAC selector, control bits,
    /// and value bits 11-8.
    #[inline]
    pub const fn high_byte(self) -> u8 {
        (self.route.sub().bit() << 7) | CONTROL_BITS | ((self.value >> 8) as u8 & 0x0F)
    }

    /// Returns the second transmitted byte: value bits 7-0.
    #[inline]
    pub const fn low_byte(self) -> u8 {
        (self.value & 0xFF) as u8
    }

    /// Returns both bytes in transmission order.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 2] {
        [self.high_byte(), self.low_byte()]
    }
}

/// Exclusive serial bus transactions.
///
/// The one capability the output side consumes from the platform. A
/// transaction is `claim`, one or more `transmit`s, `release`; the bus may
/// be shared with unrelated peripherals between transactions, which is why
/// `claim` takes the settings every time. Transmission is fire-and-forget:
/// the DAC chips have no acknowledgment path, so nothing here is fallible.
pub trait SpiBus {
    /// Opens an exclusive transaction with the given parameters.
    fn claim(&mut self, settings: SpiSettings);

    /// Shifts one byte out.
    fn transmit(&mut self, byte: u8);

    /// Closes the transaction.
    fn release(&mut self);
}

/// One chip-select output line.
pub trait SelectLine {
    /// Drives the line low (asserts the chip).
    fn set_low(&mut self);

    /// Drives the line high (deasserts the chip).
    fn set_high(&mut self);
}

/// Owner of both chip-select lines, enforcing mutual exclusion.
///
/// Both select lines pass through this guard, which tracks which one is
/// asserted and refuses to assert a second while the first is low. That
/// is the protocol's core safety invariant: two low lines would latch the
/// same frame into both chips.
///
/// Construction deasserts both lines, matching the hardware's power-up
/// requirement that no chip starts selected.
#[derive(Debug)]
pub struct SelectLines<L> {
    lines: [L; 2],
    active: Option<ChipSelect>,
}

impl<L: SelectLine> SelectLines<L> {
    /// Takes ownership of both lines and drives them high.
    pub fn new(cs1: L, cs2: L) -> Self {
        let mut lines = [cs1, cs2];
        for line in &mut lines {
            line.set_high();
        }
        Self {
            lines,
            active: None,
        }
    }

    /// Asserts one line.
    ///
    /// Fails without touching any line if a line is currently asserted -
    /// including the same one, since a re-assert means the caller lost
    /// track of the sequence.
    pub fn assert(&mut self, chip: ChipSelect) -> Result<(), WriteError> {
        if let Some(active) = self.active {
            return Err(WriteError::BusBusy { active });
        }
        self.lines[chip.index()].set_low();
        self.active = Some(chip);
        Ok(())
    }

    /// Deasserts one line.
    ///
    /// Always drives the line high; clears the active marker when it was
    /// this line.
    pub fn release(&mut self, chip: ChipSelect) {
        self.lines[chip.index()].set_high();
        if self.active == Some(chip) {
            self.active = None;
        }
    }

    /// Returns the currently asserted line, if any.
    #[inline]
    pub const fn active(&self) -> Option<ChipSelect> {
        self.active
    }
}

/// Frame encoder and transmitter.
///
/// Stateless beyond its bus settings: every write builds a fresh frame and
/// runs the full five-step sequence against the bus and select lines the
/// caller passes in. Destinations are typed, so a malformed destination is
/// unrepresentable; the remaining rejectable condition - a select line
/// already held low - fails before any bus activity.
#[derive(Debug, Clone, Copy)]
pub struct DacWriter {
    settings: SpiSettings,
}

impl DacWriter {
    /// Creates a writer with the given bus settings.
    #[inline]
    pub const fn new(settings: SpiSettings) -> Self {
        Self { settings }
    }

    /// Returns the bus settings used for every transaction.
    #[inline]
    pub const fn settings(&self) -> SpiSettings {
        self.settings
    }

    /// Encodes and transmits one value to one destination.
    ///
    /// The sequence is fixed: assert the destination's select line, claim
    /// the bus, transmit high byte then low byte, release the bus,
    /// deassert the line. The value is clamped to `[0, 4095]`.
    pub fn write<B, L>(
        &self,
        route: DacRoute,
        value: u16,
        bus: &mut B,
        lines: &mut SelectLines<L>,
    ) -> Result<(), WriteError>
    where
        B: SpiBus,
        L: SelectLine,
    {
        let frame = DacFrame::new(route, value);
        lines.assert(route.chip())?;
        bus.claim(self.settings);
        bus.transmit(frame.high_byte());
        bus.transmit(frame.low_byte());
        bus.release();
        lines.release(route.chip());

        #[cfg(feature = "tracing")]
        tracing::trace!(
            route = %route,
            value = frame.value(),
            "dac frame transmitted"
        );

        Ok(())
    }
}
