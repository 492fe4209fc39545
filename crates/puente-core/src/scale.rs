//! Domain scaling between the module's three integer resolutions.
//!
//! The module speaks three fixed-width value domains: the 10-bit analog
//! input domain `[0, 1023]`, the 12-bit DAC output domain `[0, 4095]`, and
//! the 7-bit MIDI controller domain `[0, 127]`. These functions are the
//! only sanctioned conversions between them.
//!
//! All three are pure and total: out-of-domain input is clamped to the
//! nearest domain endpoint rather than rejected, since upstream values come
//! from noisy analog measurement and a stray count past the rail is normal.
//!
//! [`analog_to_midi`] is a plain right-shift - deliberately lossy (the low
//! three bits are discarded) and deliberately cheap, not a rounding
//! conversion. The two DAC expansions map endpoints exactly and truncate
//! fractional remainders toward zero.

use crate::{ANALOG_MAX, DAC_MAX, MIDI_MAX};

/// Converts a 10-bit analog value to a 7-bit MIDI controller value.
///
/// Arithmetic right-shift by 3: `0 -> 0`, `1023 -> 127`. The low three
/// bits are discarded, so eight adjacent analog values collapse onto each
/// MIDI value.
///
/// # Example
///
/// ```rust
/// use puente_core::analog_to_midi;
///
/// assert_eq!(analog_to_midi(0), 0);
/// assert_eq!(analog_to_midi(1023), 127);
/// assert_eq!(analog_to_midi(512), 64);
/// // Out-of-domain input clamps to the top endpoint.
/// assert_eq!(analog_to_midi(5000), 127);
/// ```
#[inline]
#[must_use]
pub const fn analog_to_midi(value: u16) -> u8 {
    let clamped = if value > ANALOG_MAX { ANALOG_MAX } else { value };
    (clamped >> 3) as u8
}

/// Converts a 7-bit MIDI controller value to a 12-bit DAC value.
///
/// Linear interpolation with exact endpoints (`0 -> 0`, `127 -> 4095`);
/// intermediate values truncate toward zero.
///
/// # Example
///
/// ```rust
/// use puente_core::midi_to_dac;
///
/// assert_eq!(midi_to_dac(0), 0);
/// assert_eq!(midi_to_dac(127), 4095);
/// assert_eq!(midi_to_dac(64), 2063);
/// assert_eq!(midi_to_dac(200), 4095);
/// ```
#[inline]
#[must_use]
pub const fn midi_to_dac(value: u8) -> u16 {
    let clamped = if value > MIDI_MAX { MIDI_MAX } else { value };
    ((clamped as u32 * DAC_MAX as u32) / MIDI_MAX as u32) as u16
}

/// Converts a 10-bit analog value to a 12-bit DAC value.
///
/// Linear interpolation with exact endpoints (`0 -> 0`, `1023 -> 4095`);
/// intermediate values truncate toward zero.
///
/// # Example
///
/// ```rust
/// use puente_core::analog_to_dac;
///
/// assert_eq!(analog_to_dac(0), 0);
/// assert_eq!(analog_to_dac(1023), 4095);
/// assert_eq!(analog_to_dac(256), 1024);
/// ```
#[inline]
#[must_use]
pub const fn analog_to_dac(value: u16) -> u16 {
    let clamped = if value > ANALOG_MAX { ANALOG_MAX } else { value };
    ((clamped as u32 * DAC_MAX as u32) / ANALOG_MAX as u32) as u16
}
