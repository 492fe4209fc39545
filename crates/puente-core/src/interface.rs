//! The module facade: inputs, queries, scaling, and output writes.

use crate::analog::AnalogChannel;
use crate::conditioning::{Debouncer, IntervalDebouncer, ResponsiveSmoother, Smoother, TriggerLine};
use crate::config::Config;
use crate::dac::{DacWriter, RoutingTable, SelectLine, SelectLines, SpiBus};
use crate::error::{ConfigError, WriteError};
use crate::scale::{analog_to_dac, analog_to_midi, midi_to_dac};
use crate::trigger::TriggerChannel;
use crate::{AnalogLine, AnalogSource, Channel, NUM_CHANNELS};

/// Sentinel returned by value reads given an invalid channel id.
const INVALID_VALUE: i16 = -1;

/// Checked boundary for caller-supplied channel ids.
///
/// Invalid ids are a diagnosable no-op everywhere on the polling surface,
/// never a failure: the loop must keep running whatever a caller passes.
fn channel_or_warn(id: u8) -> Option<Channel> {
    let ch = Channel::from_id(id);
    #[cfg(feature = "tracing")]
    if ch.is_none() {
        tracing::warn!(id, "request for nonexistent channel");
    }
    ch
}

/// The four-channel CV/trigger interface.
///
/// Owns the two analog banks (CV inputs and knobs), the trigger bank, and
/// the DAC writer, and exposes the whole polling surface keyed by the
/// 1-based channel ids printed on the panel. Hardware access is passed in
/// by reference per call - an [`AnalogSource`] for reads, an [`SpiBus`]
/// plus [`SelectLines`] for writes - so the same core runs against an ADC
/// and DAC chips or against simulated stand-ins.
///
/// # Refresh model
///
/// The two input sides refresh differently, on purpose, and callers rely
/// on the difference:
///
/// - Analog change queries ([`cv_changed`](Puente::cv_changed),
///   [`knob_changed`](Puente::knob_changed)) refresh themselves: each call
///   samples the source, advances the channel, then answers.
/// - Trigger queries ([`trigger_rose`](Puente::trigger_rose) and friends)
///   never refresh anything. Call [`read_triggers`](Puente::read_triggers)
///   (or [`read_trigger`](Puente::read_trigger)) once per polling cycle
///   first; the queries are then cheap flag reads, repeatable within the
///   cycle without consuming edges.
///
/// # Sentinels
///
/// Ids outside 1-4 make value reads return −1 and boolean queries return
/// `false`, touching no hardware. Out-of-domain values are clamped. The
/// only hard errors are construction ([`ConfigError`]) and output writes
/// ([`WriteError`]), both surfaced as `Result`s.
///
/// # Example
///
/// ```rust,ignore
/// let mut puente = Puente::with_defaults(Config::default(), trigger_pins)?;
///
/// loop {
///     puente.read_all_inputs(millis(), &mut adc);
///     if puente.trigger_rose(2) && puente.knob_changed(2, &mut adc) {
///         let value = puente.read_knob_dac(2, &mut adc);
///         puente.write_out(2, value as u16, &mut spi, &mut selects)?;
///     }
/// }
/// ```
#[derive(Debug)]
pub struct Puente<S, D> {
    cvs: [AnalogChannel<S>; NUM_CHANNELS],
    knobs: [AnalogChannel<S>; NUM_CHANNELS],
    triggers: [TriggerChannel<D>; NUM_CHANNELS],
    routing: RoutingTable,
    writer: DacWriter,
}

impl<S: Smoother, D: Debouncer> Puente<S, D> {
    /// Builds the interface from a validated configuration and one
    /// conditioning collaborator per channel.
    ///
    /// Collaborator arrays are ordered by channel id. Fails if
    /// [`Config::validate`] does; nothing is constructed on failure.
    pub fn new(
        config: Config,
        cv_smoothers: [S; NUM_CHANNELS],
        knob_smoothers: [S; NUM_CHANNELS],
        debouncers: [D; NUM_CHANNELS],
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let [cs1, cs2, cs3, cs4] = cv_smoothers;
        let [ks1, ks2, ks3, ks4] = knob_smoothers;
        let [d1, d2, d3, d4] = debouncers;
        Ok(Self {
            cvs: [
                AnalogChannel::new(Channel::Ch1, cs1),
                AnalogChannel::new(Channel::Ch2, cs2),
                AnalogChannel::new(Channel::Ch3, cs3),
                AnalogChannel::new(Channel::Ch4, cs4),
            ],
            knobs: [
                AnalogChannel::new(Channel::Ch1, ks1),
                AnalogChannel::new(Channel::Ch2, ks2),
                AnalogChannel::new(Channel::Ch3, ks3),
                AnalogChannel::new(Channel::Ch4, ks4),
            ],
            triggers: [
                TriggerChannel::new(Channel::Ch1, d1),
                TriggerChannel::new(Channel::Ch2, d2),
                TriggerChannel::new(Channel::Ch3, d3),
                TriggerChannel::new(Channel::Ch4, d4),
            ],
            routing: config.routing,
            writer: DacWriter::new(config.spi),
        })
    }

    /// Returns the active routing table.
    #[inline]
    pub const fn routing(&self) -> &RoutingTable {
        &self.routing
    }

    // ---- bulk polling ----

    /// Refreshes all four trigger channels with the current time.
    ///
    /// Call once per polling cycle before any trigger query.
    pub fn read_triggers(&mut self, now_ms: u32) {
        for trigger in &mut self.triggers {
            trigger.refresh(now_ms);
        }
    }

    /// Reads and smooths all four CV inputs.
    pub fn read_cvs<A: AnalogSource>(&mut self, source: &mut A) {
        for cv in &mut self.cvs {
            let raw = source.read_raw(AnalogLine::Cv(cv.id()));
            cv.update(raw);
        }
    }

    /// Reads and smooths all four knobs.
    pub fn read_knobs<A: AnalogSource>(&mut self, source: &mut A) {
        for knob in &mut self.knobs {
            let raw = source.read_raw(AnalogLine::Knob(knob.id()));
            knob.update(raw);
        }
    }

    /// Reads every input bank: triggers, then CV inputs, then knobs.
    ///
    /// The order is part of the interface: trigger edges observed by the
    /// queries afterwards are from the same cycle as the analog values.
    pub fn read_all_inputs<A: AnalogSource>(&mut self, now_ms: u32, source: &mut A) {
        self.read_triggers(now_ms);
        self.read_cvs(source);
        self.read_knobs(source);
    }

    // ---- per-channel reads ----

    /// Reads, smooths, and returns one CV input.
    ///
    /// Returns −1 for an invalid id, without sampling anything.
    pub fn read_cv<A: AnalogSource>(&mut self, id: u8, source: &mut A) -> i16 {
        match channel_or_warn(id) {
            Some(ch) => {
                let raw = source.read_raw(AnalogLine::Cv(ch));
                self.cvs[ch.index()].update(raw) as i16
            }
            None => INVALID_VALUE,
        }
    }

    /// Reads, smooths, and returns one knob.
    ///
    /// Returns −1 for an invalid id, without sampling anything.
    pub fn read_knob<A: AnalogSource>(&mut self, id: u8, source: &mut A) -> i16 {
        match channel_or_warn(id) {
            Some(ch) => {
                let raw = source.read_raw(AnalogLine::Knob(ch));
                self.knobs[ch.index()].update(raw) as i16
            }
            None => INVALID_VALUE,
        }
    }

    /// Returns one CV input's instantaneous raw sample, bypassing the
    /// smoother.
    ///
    /// Diagnostic read: channel history is untouched. Returns −1 for an
    /// invalid id.
    pub fn read_cv_raw<A: AnalogSource>(&self, id: u8, source: &mut A) -> i16 {
        match channel_or_warn(id) {
            Some(ch) => source.read_raw(AnalogLine::Cv(ch)) as i16,
            None => INVALID_VALUE,
        }
    }

    /// Returns one knob's instantaneous raw sample, bypassing the
    /// smoother.
    ///
    /// Diagnostic read: channel history is untouched. Returns −1 for an
    /// invalid id.
    pub fn read_knob_raw<A: AnalogSource>(&self, id: u8, source: &mut A) -> i16 {
        match channel_or_warn(id) {
            Some(ch) => source.read_raw(AnalogLine::Knob(ch)) as i16,
            None => INVALID_VALUE,
        }
    }

    /// Refreshes one trigger channel with the current time.
    ///
    /// Returns false (refreshing nothing) for an invalid id.
    pub fn read_trigger(&mut self, id: u8, now_ms: u32) -> bool {
        match channel_or_warn(id) {
            Some(ch) => {
                self.triggers[ch.index()].refresh(now_ms);
                true
            }
            None => false,
        }
    }

    // ---- converted reads ----

    /// Reads one CV input and scales it to the 7-bit MIDI domain.
    ///
    /// The −1 sentinel passes through unscaled.
    pub fn read_cv_midi<A: AnalogSource>(&mut self, id: u8, source: &mut A) -> i16 {
        let value = self.read_cv(id, source);
        if value < 0 {
            value
        } else {
            i16::from(analog_to_midi(value as u16))
        }
    }

    /// Reads one knob and scales it to the 7-bit MIDI domain.
    ///
    /// The −1 sentinel passes through unscaled.
    pub fn read_knob_midi<A: AnalogSource>(&mut self, id: u8, source: &mut A) -> i16 {
        let value = self.read_knob(id, source);
        if value < 0 {
            value
        } else {
            i16::from(analog_to_midi(value as u16))
        }
    }

    /// Reads one knob and scales it to the 12-bit DAC domain, ready for
    /// [`write_out`](Puente::write_out).
    ///
    /// The −1 sentinel passes through unscaled.
    pub fn read_knob_dac<A: AnalogSource>(&mut self, id: u8, source: &mut A) -> i16 {
        let value = self.read_knob(id, source);
        if value < 0 {
            value
        } else {
            analog_to_dac(value as u16) as i16
        }
    }

    // ---- change queries (self-refreshing) ----

    /// Samples one CV input and reports whether its smoothed value moved.
    ///
    /// Self-refreshing: this call performs a full channel update (the
    /// smoother advances, `current`/`last` move) and then answers. Returns
    /// false for an invalid id.
    pub fn cv_changed<A: AnalogSource>(&mut self, id: u8, source: &mut A) -> bool {
        match channel_or_warn(id) {
            Some(ch) => {
                let raw = source.read_raw(AnalogLine::Cv(ch));
                let channel = &mut self.cvs[ch.index()];
                channel.update(raw);
                channel.changed()
            }
            None => false,
        }
    }

    /// Samples one knob and reports whether its smoothed value moved.
    ///
    /// Self-refreshing, like [`cv_changed`](Puente::cv_changed). Returns
    /// false for an invalid id.
    pub fn knob_changed<A: AnalogSource>(&mut self, id: u8, source: &mut A) -> bool {
        match channel_or_warn(id) {
            Some(ch) => {
                let raw = source.read_raw(AnalogLine::Knob(ch));
                let channel = &mut self.knobs[ch.index()];
                channel.update(raw);
                channel.changed()
            }
            None => false,
        }
    }

    // ---- trigger queries (refresh-dependent) ----

    /// Returns true iff a rising edge arrived at the trigger jack during
    /// the most recent refresh.
    ///
    /// Never refreshes; see the type-level notes. Returns false for an
    /// invalid id.
    pub fn trigger_rose(&self, id: u8) -> bool {
        channel_or_warn(id).is_some_and(|ch| self.triggers[ch.index()].rose())
    }

    /// Returns true iff a falling edge arrived at the trigger jack during
    /// the most recent refresh.
    ///
    /// Never refreshes. Returns false for an invalid id.
    pub fn trigger_fell(&self, id: u8) -> bool {
        channel_or_warn(id).is_some_and(|ch| self.triggers[ch.index()].fell())
    }

    /// Returns true iff the trigger jack reads a high level.
    ///
    /// Never refreshes. Returns false for an invalid id.
    pub fn trigger_high(&self, id: u8) -> bool {
        channel_or_warn(id).is_some_and(|ch| self.triggers[ch.index()].is_high())
    }

    /// Returns true iff the trigger jack reads a low level.
    ///
    /// Never refreshes. Returns false for an invalid id.
    pub fn trigger_low(&self, id: u8) -> bool {
        channel_or_warn(id).is_some_and(|ch| self.triggers[ch.index()].is_low())
    }

    // ---- state accessors ----

    /// Returns one CV input's smoothed value as of its most recent update,
    /// or −1 for an invalid id.
    pub fn cv_current(&self, id: u8) -> i16 {
        channel_or_warn(id).map_or(INVALID_VALUE, |ch| self.cvs[ch.index()].current() as i16)
    }

    /// Returns one CV input's smoothed value as of the update before the
    /// most recent one, or −1 for an invalid id.
    pub fn cv_last(&self, id: u8) -> i16 {
        channel_or_warn(id).map_or(INVALID_VALUE, |ch| self.cvs[ch.index()].last() as i16)
    }

    /// Returns one knob's smoothed value as of its most recent update, or
    /// −1 for an invalid id.
    pub fn knob_current(&self, id: u8) -> i16 {
        channel_or_warn(id).map_or(INVALID_VALUE, |ch| self.knobs[ch.index()].current() as i16)
    }

    /// Returns one knob's smoothed value as of the update before the most
    /// recent one, or −1 for an invalid id.
    pub fn knob_last(&self, id: u8) -> i16 {
        channel_or_warn(id).map_or(INVALID_VALUE, |ch| self.knobs[ch.index()].last() as i16)
    }

    // ---- output ----

    /// Writes a 12-bit value to one CV output.
    ///
    /// Routes the logical output to its DAC destination and runs the full
    /// frame sequence. The value is clamped to `[0, 4095]`. An invalid id
    /// or a busy select line fails before any bus activity.
    pub fn write_out<B, L>(
        &self,
        id: u8,
        value: u16,
        bus: &mut B,
        lines: &mut SelectLines<L>,
    ) -> Result<(), WriteError>
    where
        B: SpiBus,
        L: SelectLine,
    {
        let Some(ch) = Channel::from_id(id) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(id, "write to nonexistent CV output");
            return Err(WriteError::InvalidChannel { id });
        };
        self.writer.write(self.routing.route(ch), value, bus, lines)
    }

    /// Writes a 7-bit MIDI value to one CV output, expanding it to the
    /// 12-bit domain first.
    pub fn write_out_midi<B, L>(
        &self,
        id: u8,
        value: u8,
        bus: &mut B,
        lines: &mut SelectLines<L>,
    ) -> Result<(), WriteError>
    where
        B: SpiBus,
        L: SelectLine,
    {
        self.write_out(id, midi_to_dac(value), bus, lines)
    }
}

impl<P: TriggerLine> Puente<ResponsiveSmoother, IntervalDebouncer<P>> {
    /// Builds the interface with the built-in conditioning, tuned from the
    /// configuration.
    ///
    /// Each trigger line is wrapped in an [`IntervalDebouncer`], which
    /// samples it once to seed its level; every analog channel gets a
    /// [`ResponsiveSmoother`].
    pub fn with_defaults(
        config: Config,
        trigger_lines: [P; NUM_CHANNELS],
    ) -> Result<Self, ConfigError> {
        let [l1, l2, l3, l4] = trigger_lines;
        Self::new(
            config,
            core::array::from_fn(|_| config.smoother()),
            core::array::from_fn(|_| config.smoother()),
            [
                config.debouncer(l1),
                config.debouncer(l2),
                config.debouncer(l3),
                config.debouncer(l4),
            ],
        )
    }
}
