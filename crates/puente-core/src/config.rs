//! Module configuration: conditioning tuning, routing, bus parameters.

use crate::conditioning::{IntervalDebouncer, ResponsiveSmoother, TriggerLine};
use crate::dac::{RoutingTable, SpiSettings};
use crate::error::ConfigError;

/// Tuning and wiring description for one module instance.
///
/// Everything a caller may want to adjust before bringing the module up,
/// in one plain struct. [`Config::default`] reproduces the shipped
/// hardware's tuning; override fields before construction to experiment
/// without recompiling anything else.
///
/// # Example
///
/// ```rust
/// use puente_core::Config;
///
/// let mut config = Config::default();
/// config.debounce_interval_ms = 10;
/// config.sleep_enabled = false;
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Debounce interval for the trigger inputs, in milliseconds.
    pub debounce_interval_ms: u16,
    /// Snap multiplier for the analog smoothers; smaller means heavier
    /// smoothing.
    pub snap_multiplier: f32,
    /// Activity threshold, in counts, under which a sleeping smoother
    /// holds still.
    pub activity_threshold: f32,
    /// Whether the analog smoothers sleep when their input goes quiet.
    pub sleep_enabled: bool,
    /// Logical output to DAC destination map.
    pub routing: RoutingTable,
    /// Bus transaction parameters for the DAC chips.
    pub spi: SpiSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            debounce_interval_ms: 5,
            snap_multiplier: 0.015,
            activity_threshold: 10.0,
            sleep_enabled: true,
            routing: RoutingTable::default(),
            spi: SpiSettings::default(),
        }
    }
}

impl Config {
    /// Checks the configuration describes a usable module.
    ///
    /// Routing must pass [`RoutingTable::validate`] and the bus clock must
    /// be nonzero. Run before construction; a bad configuration is a
    /// programmer error and never reaches the bus.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.routing.validate()?;
        if self.spi.clock_hz == 0 {
            return Err(ConfigError::ZeroClock);
        }
        Ok(())
    }

    /// Builds one analog smoother with this configuration's tuning.
    #[must_use]
    pub fn smoother(&self) -> ResponsiveSmoother {
        ResponsiveSmoother::new(
            self.snap_multiplier,
            self.activity_threshold,
            self.sleep_enabled,
        )
    }

    /// Builds one trigger debouncer around a sensing line with this
    /// configuration's interval.
    pub fn debouncer<P: TriggerLine>(&self, line: P) -> IntervalDebouncer<P> {
        IntervalDebouncer::new(line, self.debounce_interval_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conditioning::Smoother;
    use crate::dac::{ChipSelect, DacRoute, SubDac};

    #[test]
    fn test_default_matches_shipped_tuning() {
        let config = Config::default();
        assert_eq!(config.debounce_interval_ms, 5);
        assert!((config.snap_multiplier - 0.015).abs() < f32::EPSILON);
        assert!((config.activity_threshold - 10.0).abs() < f32::EPSILON);
        assert!(config.sleep_enabled);
    }

    #[test]
    fn test_default_validates() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_zero_clock_rejected() {
        let mut config = Config::default();
        config.spi.clock_hz = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroClock));
    }

    #[test]
    fn test_routing_errors_propagate() {
        let mut config = Config::default();
        config.routing = RoutingTable::new([
            DacRoute::new(ChipSelect::Cs1, SubDac::A),
            DacRoute::new(ChipSelect::Cs1, SubDac::B),
            DacRoute::new(ChipSelect::Cs1, SubDac::A),
            DacRoute::new(ChipSelect::Cs1, SubDac::B),
        ]);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ChipUnused { .. })
        ));
    }

    #[test]
    fn test_smoother_uses_tuning() {
        let mut config = Config::default();
        config.sleep_enabled = false;
        let mut smoother = config.smoother();
        smoother.update(400);
        assert!(!smoother.is_sleeping());
    }

    #[test]
    fn test_debouncer_uses_interval() {
        let mut config = Config::default();
        config.debounce_interval_ms = 25;
        let debouncer = config.debouncer(FixedLine);
        assert_eq!(debouncer.interval_ms(), 25);
    }

    struct FixedLine;

    impl TriggerLine for FixedLine {
        fn level(&mut self) -> crate::Level {
            crate::Level::Low
        }
    }
}
