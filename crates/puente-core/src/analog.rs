//! Smoothed analog channel with current/previous history.

use crate::conditioning::Smoother;
use crate::Channel;

/// One smoothed analog line (a CV input or a knob).
///
/// Owns its smoothing collaborator and two pieces of history: `current`,
/// the smoothed value as of the most recent [`update`](AnalogChannel::update),
/// and `last`, the smoothed value as of the update before that. Both are
/// always in `[0, 1023]` and both start at 0.
///
/// # Invariants
///
/// - `current` and `last` change only inside `update`; no query mutates
///   them.
/// - After any `update`, `last` holds what `current` held when that update
///   began - never the same call's value.
///
/// [`changed`](AnalogChannel::changed) is a pure delegate to the
/// collaborator's change flag and describes the most recent `update` on
/// this channel. Calling it before the first update of a polling cycle
/// reports the previous cycle's answer; that ordering is the caller's
/// contract, deliberately unchecked in the polling path.
#[derive(Debug, Clone)]
pub struct AnalogChannel<S> {
    id: Channel,
    smoother: S,
    current: u16,
    last: u16,
}

impl<S: Smoother> AnalogChannel<S> {
    /// Creates a channel around its smoothing collaborator.
    pub fn new(id: Channel, smoother: S) -> Self {
        Self {
            id,
            smoother,
            current: 0,
            last: 0,
        }
    }

    /// Returns the logical channel id.
    #[inline]
    pub const fn id(&self) -> Channel {
        self.id
    }

    /// Feeds one raw sample through the collaborator and advances history.
    ///
    /// `last` takes the previous `current`; `current` takes the
    /// collaborator's newly reported smoothed value, which is also
    /// returned.
    pub fn update(&mut self, raw: u16) -> u16 {
        self.smoother.update(raw);
        self.last = self.current;
        self.current = self.smoother.value();
        self.current
    }

    /// Returns the smoothed value as of the most recent update.
    #[inline]
    pub const fn current(&self) -> u16 {
        self.current
    }

    /// Returns the smoothed value as of the update before the most recent
    /// one.
    #[inline]
    pub const fn last(&self) -> u16 {
        self.last
    }

    /// Returns the collaborator's change verdict for the most recent
    /// update on this channel.
    #[inline]
    pub fn changed(&self) -> bool {
        self.smoother.changed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reports each raw sample unchanged; changed when the value moved.
    struct EchoSmoother {
        value: u16,
        changed: bool,
    }

    impl EchoSmoother {
        fn new() -> Self {
            Self {
                value: 0,
                changed: false,
            }
        }
    }

    impl Smoother for EchoSmoother {
        fn update(&mut self, raw: u16) {
            self.changed = raw != self.value;
            self.value = raw;
        }
        fn value(&self) -> u16 {
            self.value
        }
        fn changed(&self) -> bool {
            self.changed
        }
    }

    #[test]
    fn starts_at_zero() {
        let ch = AnalogChannel::new(Channel::Ch1, EchoSmoother::new());
        assert_eq!(ch.current(), 0);
        assert_eq!(ch.last(), 0);
        assert!(!ch.changed());
    }

    #[test]
    fn update_advances_history() {
        let mut ch = AnalogChannel::new(Channel::Ch2, EchoSmoother::new());
        assert_eq!(ch.update(300), 300);
        assert_eq!(ch.current(), 300);
        assert_eq!(ch.last(), 0);

        ch.update(700);
        assert_eq!(ch.current(), 700);
        assert_eq!(ch.last(), 300);
    }

    #[test]
    fn repeated_update_keeps_current_moves_last() {
        let mut ch = AnalogChannel::new(Channel::Ch3, EchoSmoother::new());
        ch.update(512);
        ch.update(512);
        assert_eq!(ch.current(), 512);
        assert_eq!(ch.last(), 512);
    }

    #[test]
    fn changed_delegates_to_collaborator() {
        let mut ch = AnalogChannel::new(Channel::Ch4, EchoSmoother::new());
        ch.update(100);
        assert!(ch.changed());
        ch.update(100);
        assert!(!ch.changed());
    }

    #[test]
    fn queries_do_not_mutate() {
        let mut ch = AnalogChannel::new(Channel::Ch1, EchoSmoother::new());
        ch.update(42);
        let before = (ch.current(), ch.last());
        let _ = ch.changed();
        let _ = ch.current();
        let _ = ch.last();
        assert_eq!((ch.current(), ch.last()), before);
    }
}
