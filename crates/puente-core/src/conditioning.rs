//! Signal conditioning capabilities: smoothing and debouncing.
//!
//! The channel types in [`crate::analog`] and [`crate::trigger`] do not
//! condition signals themselves - they own a conditioning collaborator and
//! consume it through the narrow traits defined here. The algorithms are
//! deliberately opaque: any implementation satisfying the trait contracts
//! plugs in, and the tuning of a particular algorithm is none of the
//! channel layer's business.
//!
//! Two built-ins cover the stock hardware:
//!
//! - [`ResponsiveSmoother`] - adaptive snap-curve smoothing for the 10-bit
//!   analog inputs. Holds dead still through noise, tracks fast moves
//!   almost immediately.
//! - [`IntervalDebouncer`] - stable-interval debouncing for the trigger
//!   inputs, driven by caller-supplied millisecond time.

use crate::{ANALOG_MAX, Level};

/// Adaptive smoothing of a noisy analog line.
///
/// The contract the analog channels consume:
///
/// - `update(raw)` feeds one raw 10-bit sample and advances the
///   collaborator's state.
/// - `value()` reports the current smoothed value, always in `[0, 1023]`.
/// - `changed()` is true iff the most recent `update()` moved the reported
///   value, per the implementation's own policy. It describes that update
///   only; it is not sticky.
pub trait Smoother {
    /// Feeds one raw sample and advances the smoothing state.
    fn update(&mut self, raw: u16);

    /// Returns the current smoothed value in `[0, 1023]`.
    fn value(&self) -> u16;

    /// Returns true iff the most recent [`update`](Smoother::update)
    /// changed the reported value.
    fn changed(&self) -> bool;
}

/// Instantaneous electrical level of a digital sensing input.
///
/// The raw pin a debouncer samples. On hardware this is a GPIO read; in
/// tests it is a script.
pub trait TriggerLine {
    /// Samples the line once.
    fn level(&mut self) -> Level;
}

/// Debouncing of a noisy digital line into clean transitions.
///
/// The contract the trigger channels consume:
///
/// - `refresh(now_ms)` samples the line once and advances the debounce
///   state using the supplied wall-clock time.
/// - `rose()` / `fell()` report a debounced transition that completed
///   during the most recent `refresh()`, and only that one.
/// - `level()` reports the current debounced level.
///
/// Queries never sample the line; all sampling happens in `refresh`.
pub trait Debouncer {
    /// Samples the line once and advances the debounce state.
    ///
    /// `now_ms` is a free-running millisecond clock; wrapping is fine.
    fn refresh(&mut self, now_ms: u32);

    /// Returns true iff the most recent refresh completed a low-to-high
    /// transition.
    fn rose(&self) -> bool;

    /// Returns true iff the most recent refresh completed a high-to-low
    /// transition.
    fn fell(&self) -> bool;

    /// Returns the current debounced level.
    fn level(&self) -> Level;
}

/// The analog input domain as the smoother's float resolution.
const RESOLUTION: f32 = 1024.0;

/// Weight of the newest sample in the activity error average.
const ERROR_EMA_WEIGHT: f32 = 0.4;

/// Adaptive snap-curve smoother for 10-bit analog input.
///
/// An exponential moving average whose coefficient is not fixed: each
/// update moves the smoothed value toward the input by a factor taken from
/// a snap curve of the input-to-output distance. Small distances (noise)
/// get a factor near zero and are averaged away hard; large distances (a
/// real move) get a factor near one and land almost immediately.
///
/// With sleep enabled, a second moving average tracks recent error. While
/// its magnitude stays under the activity threshold the smoother sleeps:
/// the reported value holds perfectly still regardless of input noise.
/// Near-edge inputs are dragged toward the rails while sleep is enabled so
/// that 0 and 1023 stay reachable despite the averaging.
///
/// # Example
///
/// ```rust
/// use puente_core::{ResponsiveSmoother, Smoother};
///
/// let mut smoother = ResponsiveSmoother::new(0.015, 10.0, true);
/// smoother.update(500);
/// assert_eq!(smoother.value(), 500); // a big step lands at once
/// assert!(smoother.changed());
/// ```
#[derive(Debug, Clone)]
pub struct ResponsiveSmoother {
    snap_multiplier: f32,
    activity_threshold: f32,
    sleep_enabled: bool,
    smoothed: f32,
    error_ema: f32,
    sleeping: bool,
    reported: u16,
    changed: bool,
}

impl ResponsiveSmoother {
    /// Creates a smoother.
    ///
    /// `snap_multiplier` scales the input-output distance before the snap
    /// curve; smaller values mean heavier smoothing. `activity_threshold`
    /// is the error magnitude (in counts) below which a sleep-enabled
    /// smoother stops moving.
    #[must_use]
    pub fn new(snap_multiplier: f32, activity_threshold: f32, sleep_enabled: bool) -> Self {
        Self {
            snap_multiplier,
            activity_threshold,
            sleep_enabled,
            smoothed: 0.0,
            error_ema: 0.0,
            sleeping: false,
            reported: 0,
            changed: false,
        }
    }

    /// Returns true if sleep is enabled and the smoother is currently
    /// holding its value.
    #[inline]
    pub const fn is_sleeping(&self) -> bool {
        self.sleeping
    }

    /// Clears all smoothing state back to zero.
    pub fn reset(&mut self) {
        self.smoothed = 0.0;
        self.error_ema = 0.0;
        self.sleeping = false;
        self.reported = 0;
        self.changed = false;
    }

    /// Maps a scaled distance to a movement factor in `[0, 1]`.
    ///
    /// Zero at zero distance, rising steeply, saturating at one.
    fn snap_curve(x: f32) -> f32 {
        let y = (1.0 - 1.0 / (x + 1.0)) * 2.0;
        if y > 1.0 { 1.0 } else { y }
    }
}

impl Smoother for ResponsiveSmoother {
    fn update(&mut self, raw: u16) {
        let raw = if raw > ANALOG_MAX { ANALOG_MAX } else { raw };
        let mut input = f32::from(raw);

        // Drag near-edge inputs past the rails so the clamped output can
        // actually reach 0 and 1023 before sleep freezes it.
        if self.sleep_enabled {
            if input < self.activity_threshold {
                input = input * 2.0 - self.activity_threshold;
            } else if input > RESOLUTION - self.activity_threshold {
                input = input * 2.0 - RESOLUTION + self.activity_threshold;
            }
        }

        let diff = libm::fabsf(input - self.smoothed);
        self.error_ema += (input - self.smoothed - self.error_ema) * ERROR_EMA_WEIGHT;

        if self.sleep_enabled {
            self.sleeping = libm::fabsf(self.error_ema) < self.activity_threshold;
        }

        if !(self.sleep_enabled && self.sleeping) {
            let snap = Self::snap_curve(diff * self.snap_multiplier);
            self.smoothed += (input - self.smoothed) * snap;
            self.smoothed = self.smoothed.clamp(0.0, RESOLUTION - 1.0);
        }

        let reported = self.smoothed as u16;
        self.changed = reported != self.reported;
        self.reported = reported;
    }

    #[inline]
    fn value(&self) -> u16 {
        self.reported
    }

    #[inline]
    fn changed(&self) -> bool {
        self.changed
    }
}

/// Stable-interval debouncer over an owned [`TriggerLine`].
///
/// A raw level change restarts the interval timer; a raw level that has
/// held steady for a full interval and differs from the debounced level
/// becomes the new debounced level, raising the matching one-refresh
/// rose/fell flag. Time is a caller-supplied free-running millisecond
/// counter; all comparisons use wrapping arithmetic, so rollover is safe.
///
/// Construction samples the line once to seed the initial level.
#[derive(Debug, Clone)]
pub struct IntervalDebouncer<P> {
    line: P,
    interval_ms: u16,
    debounced: Level,
    unstable: Level,
    changed: bool,
    last_transition_ms: u32,
}

impl<P: TriggerLine> IntervalDebouncer<P> {
    /// Creates a debouncer around a sensing line.
    ///
    /// Samples the line once; the initial debounced level is whatever the
    /// line reads at construction, with no pending edge.
    pub fn new(mut line: P, interval_ms: u16) -> Self {
        let initial = line.level();
        Self {
            line,
            interval_ms,
            debounced: initial,
            unstable: initial,
            changed: false,
            last_transition_ms: 0,
        }
    }

    /// Returns the debounce interval in milliseconds.
    #[inline]
    pub const fn interval_ms(&self) -> u16 {
        self.interval_ms
    }
}

impl<P: TriggerLine> Debouncer for IntervalDebouncer<P> {
    fn refresh(&mut self, now_ms: u32) {
        self.changed = false;
        let raw = self.line.level();
        if raw != self.unstable {
            self.unstable = raw;
            self.last_transition_ms = now_ms;
        } else if now_ms.wrapping_sub(self.last_transition_ms) >= u32::from(self.interval_ms)
            && raw != self.debounced
        {
            self.debounced = raw;
            self.last_transition_ms = now_ms;
            self.changed = true;
        }
    }

    #[inline]
    fn rose(&self) -> bool {
        self.changed && self.debounced == Level::High
    }

    #[inline]
    fn fell(&self) -> bool {
        self.changed && self.debounced == Level::Low
    }

    #[inline]
    fn level(&self) -> Level {
        self.debounced
    }
}
