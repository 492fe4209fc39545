//! Debounced trigger channel with polarity-corrected queries.

use crate::conditioning::Debouncer;
use crate::{Channel, Level};

/// One debounced digital trigger input.
///
/// The input stage inverts trigger polarity: a rising edge at the panel
/// jack arrives at the sensing pin as a falling transition, and a high
/// level at the jack reads electrically low. This type owns the debounce
/// collaborator and presents the panel's point of view, so callers never
/// reason about the inversion:
///
/// - [`rose`](TriggerChannel::rose) is true iff the collaborator saw a
///   *falling* debounced transition.
/// - [`fell`](TriggerChannel::fell) is true iff the collaborator saw a
///   *rising* debounced transition.
/// - [`is_high`](TriggerChannel::is_high) is true iff the pin reads
///   electrically low, and [`is_low`](TriggerChannel::is_low) the
///   reverse.
///
/// # Refresh contract
///
/// [`refresh`](TriggerChannel::refresh) must be called for this channel
/// during the current polling cycle before any of the four queries; the
/// queries never sample or refresh anything themselves. This is the
/// opposite of the analog side, where the facade's change queries refresh
/// on demand. The asymmetry is long-standing interface behavior that
/// callers rely on - queries here are cheap flag reads you can issue any
/// number of times per cycle without consuming edges.
#[derive(Debug, Clone)]
pub struct TriggerChannel<D> {
    id: Channel,
    debouncer: D,
}

impl<D: Debouncer> TriggerChannel<D> {
    /// Creates a channel around its debounce collaborator.
    pub fn new(id: Channel, debouncer: D) -> Self {
        Self { id, debouncer }
    }

    /// Returns the logical channel id.
    #[inline]
    pub const fn id(&self) -> Channel {
        self.id
    }

    /// Advances the debounce collaborator with the current time.
    ///
    /// Call once per polling cycle, before any edge or level query.
    pub fn refresh(&mut self, now_ms: u32) {
        self.debouncer.refresh(now_ms);
    }

    /// Returns true iff a rising edge arrived at the panel jack during the
    /// most recent refresh (electrically, a falling transition).
    #[inline]
    pub fn rose(&self) -> bool {
        self.debouncer.fell()
    }

    /// Returns true iff a falling edge arrived at the panel jack during
    /// the most recent refresh (electrically, a rising transition).
    #[inline]
    pub fn fell(&self) -> bool {
        self.debouncer.rose()
    }

    /// Returns true iff the panel jack is at a high level (electrically,
    /// the pin reads low).
    #[inline]
    pub fn is_high(&self) -> bool {
        self.debouncer.level() == Level::Low
    }

    /// Returns true iff the panel jack is at a low level (electrically,
    /// the pin reads high).
    #[inline]
    pub fn is_low(&self) -> bool {
        self.debouncer.level() == Level::High
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A debouncer whose answers are set directly by the test.
    struct ScriptedDebouncer {
        rose: bool,
        fell: bool,
        level: Level,
        refreshed_at: Option<u32>,
    }

    impl ScriptedDebouncer {
        fn new(level: Level) -> Self {
            Self {
                rose: false,
                fell: false,
                level,
                refreshed_at: None,
            }
        }
    }

    impl Debouncer for ScriptedDebouncer {
        fn refresh(&mut self, now_ms: u32) {
            self.refreshed_at = Some(now_ms);
        }
        fn rose(&self) -> bool {
            self.rose
        }
        fn fell(&self) -> bool {
            self.fell
        }
        fn level(&self) -> Level {
            self.level
        }
    }

    #[test]
    fn collaborator_fell_means_rose() {
        let mut d = ScriptedDebouncer::new(Level::Low);
        d.fell = true;
        let ch = TriggerChannel::new(Channel::Ch1, d);
        assert!(ch.rose());
        assert!(!ch.fell());
    }

    #[test]
    fn collaborator_rose_means_fell() {
        let mut d = ScriptedDebouncer::new(Level::High);
        d.rose = true;
        let ch = TriggerChannel::new(Channel::Ch2, d);
        assert!(ch.fell());
        assert!(!ch.rose());
    }

    #[test]
    fn electrical_low_reads_high() {
        let ch = TriggerChannel::new(Channel::Ch3, ScriptedDebouncer::new(Level::Low));
        assert!(ch.is_high());
        assert!(!ch.is_low());
    }

    #[test]
    fn electrical_high_reads_low() {
        let ch = TriggerChannel::new(Channel::Ch4, ScriptedDebouncer::new(Level::High));
        assert!(ch.is_low());
        assert!(!ch.is_high());
    }

    #[test]
    fn refresh_forwards_time() {
        let mut ch = TriggerChannel::new(Channel::Ch1, ScriptedDebouncer::new(Level::High));
        ch.refresh(12345);
        assert_eq!(ch.debouncer.refreshed_at, Some(12345));
    }

    #[test]
    fn queries_never_refresh() {
        let mut ch = TriggerChannel::new(Channel::Ch1, ScriptedDebouncer::new(Level::High));
        ch.debouncer.rose = true;
        let _ = ch.rose();
        let _ = ch.fell();
        let _ = ch.is_high();
        let _ = ch.is_low();
        assert_eq!(ch.debouncer.refreshed_at, None);
    }
}
