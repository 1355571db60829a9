//! Configuration types deserialized from `cyclebench.toml`.

use cyclebench_common::Period;
use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::ConfigError;

/// The top-level harness configuration parsed from `cyclebench.toml`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HarnessConfig {
    /// Run-wide timing: default clock, reset and settle windows.
    #[serde(default)]
    pub harness: HarnessSection,
    /// Names of the DUT pins the harness drives and observes.
    #[serde(default)]
    pub pins: PinMap,
    /// Bit mapping of the control bus.
    #[serde(default)]
    pub controls: ControlMap,
    /// Per-scenario overrides keyed by scenario name.
    #[serde(default)]
    pub scenarios: BTreeMap<String, ScenarioOverride>,
    /// Waveform trace output.
    #[serde(default)]
    pub trace: TraceConfig,
}

/// Run-wide harness settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessSection {
    /// A label for the run, used in logs.
    pub name: String,
    /// Default clock period (e.g. `"1us"`), parsed to [`Period`].
    pub clock_period: String,
    /// Number of cycles reset is held asserted.
    pub reset_cycles: u64,
    /// Cycles waited after reset deassertion before outputs must be resolvable.
    pub settle_cycles: u64,
}

impl Default for HarnessSection {
    fn default() -> Self {
        Self {
            name: "cyclebench".to_string(),
            clock_period: "1us".to_string(),
            reset_cycles: 20,
            settle_cycles: 50,
        }
    }
}

/// DUT pin names.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PinMap {
    /// Clock input.
    pub clock: String,
    /// Active-low reset input.
    pub reset: String,
    /// Enable input, held active during stimulus.
    pub enable: String,
    /// Control bus input (buttons).
    pub controls: String,
    /// Bidirectional bus input, held at 0.
    pub bidir: String,
    /// Packed output bus.
    pub output: String,
}

impl Default for PinMap {
    fn default() -> Self {
        Self {
            clock: "clk".to_string(),
            reset: "rst_n".to_string(),
            enable: "ena".to_string(),
            controls: "ui_in".to_string(),
            bidir: "uio_in".to_string(),
            output: "uo_out".to_string(),
        }
    }
}

impl PinMap {
    /// Inputs zeroed by every reset sequence.
    pub fn idle_inputs(&self) -> Vec<String> {
        vec![self.controls.clone(), self.bidir.clone()]
    }
}

/// Bit positions of the buttons on the control bus.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlMap {
    /// Width of the control bus in bits.
    pub width: u32,
    /// Bit that moves the shooter right.
    pub right: u32,
    /// Bit that moves the shooter left.
    pub left: u32,
    /// Bit that fires.
    pub fire: u32,
}

impl Default for ControlMap {
    fn default() -> Self {
        Self {
            width: 4,
            right: 0,
            left: 1,
            fire: 2,
        }
    }
}

/// Overrides for one named scenario.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScenarioOverride {
    /// Clock period for this scenario instead of the harness default.
    pub clock_period: Option<String>,
    /// Length of the scenario's main observation phase, in cycles.
    pub cycles: Option<u64>,
    /// Set to `false` to leave the scenario out of the suite.
    pub enabled: Option<bool>,
}

/// Waveform trace settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TraceConfig {
    /// Path of a VCD file receiving every pin change. No trace when absent.
    pub vcd: Option<String>,
}

impl HarnessConfig {
    /// The default clock period.
    pub fn clock_period(&self) -> Result<Period, ConfigError> {
        parse_period("harness.clock_period", &self.harness.clock_period)
    }

    /// The clock period for `scenario`, or `fallback` if it has no override.
    pub fn scenario_period(&self, scenario: &str, fallback: Period) -> Result<Period, ConfigError> {
        match self
            .scenarios
            .get(scenario)
            .and_then(|o| o.clock_period.as_deref())
        {
            Some(text) => parse_period(&format!("scenarios.{scenario}.clock_period"), text),
            None => Ok(fallback),
        }
    }

    /// The main-phase cycle count for `scenario`, or `fallback`.
    pub fn scenario_cycles(&self, scenario: &str, fallback: u64) -> u64 {
        self.scenarios
            .get(scenario)
            .and_then(|o| o.cycles)
            .unwrap_or(fallback)
    }

    /// Whether `scenario` should be registered.
    pub fn is_enabled(&self, scenario: &str) -> bool {
        self.scenarios
            .get(scenario)
            .and_then(|o| o.enabled)
            .unwrap_or(true)
    }
}

/// Parses a period string, rejecting periods that cannot drive a clock.
pub(crate) fn parse_period(field: &str, text: &str) -> Result<Period, ConfigError> {
    let period: Period = text
        .parse()
        .map_err(|e| ConfigError::ValidationError(format!("{field}: {e}")))?;
    if !period.is_valid() {
        return Err(ConfigError::ValidationError(format!(
            "{field}: period {period} must be a non-zero even number of femtoseconds"
        )));
    }
    Ok(period)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_tiny_tapeout_pins() {
        let config = HarnessConfig::default();
        assert_eq!(config.pins.clock, "clk");
        assert_eq!(config.pins.reset, "rst_n");
        assert_eq!(config.pins.output, "uo_out");
        assert_eq!(config.pins.idle_inputs(), vec!["ui_in", "uio_in"]);
        assert_eq!(config.harness.reset_cycles, 20);
        assert_eq!(config.harness.settle_cycles, 50);
        assert_eq!(config.controls.fire, 2);
    }

    #[test]
    fn default_clock_period_is_one_microsecond() {
        let config = HarnessConfig::default();
        assert_eq!(config.clock_period().unwrap(), Period::from_us(1));
    }

    #[test]
    fn scenario_override_lookup() {
        let mut config = HarnessConfig::default();
        config.scenarios.insert(
            "test_reset".to_string(),
            ScenarioOverride {
                clock_period: Some("40ns".to_string()),
                cycles: Some(10),
                enabled: Some(false),
            },
        );
        let fallback = Period::from_us(1);
        assert_eq!(
            config.scenario_period("test_reset", fallback).unwrap(),
            Period::from_ns(40)
        );
        assert_eq!(config.scenario_period("other", fallback).unwrap(), fallback);
        assert_eq!(config.scenario_cycles("test_reset", 99), 10);
        assert_eq!(config.scenario_cycles("other", 99), 99);
        assert!(!config.is_enabled("test_reset"));
        assert!(config.is_enabled("other"));
    }

    #[test]
    fn odd_period_rejected() {
        let err = parse_period("harness.clock_period", "3fs").unwrap_err();
        assert!(err.to_string().contains("even number"));
    }
}
