//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::{parse_period, HarnessConfig};
use std::collections::BTreeSet;
use std::path::Path;

/// File name looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = "cyclebench.toml";

/// Loads and validates `<project_dir>/cyclebench.toml`.
pub fn load_config(project_dir: &Path) -> Result<HarnessConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE_NAME))?;
    load_config_from_str(&content)
}

/// Parses and validates a configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<HarnessConfig, ConfigError> {
    let config: HarnessConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

/// Checks pin names, timing windows, clock periods, and the control bit map.
fn validate_config(config: &HarnessConfig) -> Result<(), ConfigError> {
    let pins = &config.pins;
    for (field, name) in [
        ("pins.clock", &pins.clock),
        ("pins.reset", &pins.reset),
        ("pins.enable", &pins.enable),
        ("pins.controls", &pins.controls),
        ("pins.bidir", &pins.bidir),
        ("pins.output", &pins.output),
    ] {
        if name.trim().is_empty() {
            return Err(ConfigError::MissingField(field.to_string()));
        }
    }

    if config.harness.reset_cycles == 0 {
        return Err(ConfigError::ValidationError(
            "harness.reset_cycles must be at least 1".to_string(),
        ));
    }

    config.clock_period()?;
    for (name, over) in &config.scenarios {
        if let Some(text) = &over.clock_period {
            parse_period(&format!("scenarios.{name}.clock_period"), text)?;
        }
    }

    let controls = &config.controls;
    if controls.width == 0 || controls.width > 64 {
        return Err(ConfigError::ValidationError(format!(
            "controls.width must be between 1 and 64, got {}",
            controls.width
        )));
    }
    let mut seen = BTreeSet::new();
    for (field, bit) in [
        ("right", controls.right),
        ("left", controls.left),
        ("fire", controls.fire),
    ] {
        if bit >= controls.width {
            return Err(ConfigError::ValidationError(format!(
                "controls.{field} = {bit} is outside a {}-bit control bus",
                controls.width
            )));
        }
        if !seen.insert(bit) {
            return Err(ConfigError::ValidationError(format!(
                "controls.{field} reuses bit {bit}"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclebench_common::Period;

    #[test]
    fn empty_file_uses_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.pins.clock, "clk");
        assert_eq!(config.harness.reset_cycles, 20);
        assert!(config.trace.vcd.is_none());
    }

    #[test]
    fn parse_full_config() {
        let toml = r#"
[harness]
name = "vga_shooter"
clock_period = "1us"
reset_cycles = 10
settle_cycles = 100

[pins]
clock = "clk"
reset = "rst_n"
enable = "ena"
controls = "ui_in"
bidir = "uio_in"
output = "uo_out"

[controls]
width = 4
right = 0
left = 1
fire = 2

[scenarios.test_reset]
clock_period = "40ns"

[scenarios.test_vga_sync]
cycles = 5000

[scenarios.test_random_buttons]
enabled = false

[trace]
vcd = "waves/run.vcd"
"#;
        let config = load_config_from_str(toml).unwrap();
        assert_eq!(config.harness.name, "vga_shooter");
        assert_eq!(config.harness.reset_cycles, 10);
        assert_eq!(config.harness.settle_cycles, 100);
        assert_eq!(
            config
                .scenario_period("test_reset", Period::from_us(1))
                .unwrap(),
            Period::from_ns(40)
        );
        assert_eq!(config.scenario_cycles("test_vga_sync", 200_000), 5000);
        assert!(!config.is_enabled("test_random_buttons"));
        assert_eq!(config.trace.vcd.as_deref(), Some("waves/run.vcd"));
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let config = load_config_from_str("[harness]\nreset_cycles = 5\n").unwrap();
        assert_eq!(config.harness.reset_cycles, 5);
        assert_eq!(config.harness.settle_cycles, 50);
        assert_eq!(config.harness.clock_period, "1us");
    }

    #[test]
    fn parse_error_for_bad_toml() {
        let err = load_config_from_str("[harness\n").unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn empty_pin_name_rejected() {
        let err = load_config_from_str("[pins]\noutput = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::MissingField(f) if f == "pins.output"));
    }

    #[test]
    fn zero_reset_cycles_rejected() {
        let err = load_config_from_str("[harness]\nreset_cycles = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn bad_clock_period_rejected() {
        let err = load_config_from_str("[harness]\nclock_period = \"fast\"\n").unwrap_err();
        assert!(err.to_string().contains("harness.clock_period"));
    }

    #[test]
    fn bad_scenario_period_rejected() {
        let err =
            load_config_from_str("[scenarios.test_reset]\nclock_period = \"7fs\"\n").unwrap_err();
        assert!(err.to_string().contains("scenarios.test_reset.clock_period"));
    }

    #[test]
    fn control_bit_outside_bus_rejected() {
        let err = load_config_from_str("[controls]\nfire = 4\n").unwrap_err();
        assert!(err.to_string().contains("outside a 4-bit control bus"));
    }

    #[test]
    fn duplicate_control_bits_rejected() {
        let err = load_config_from_str("[controls]\nfire = 0\n").unwrap_err();
        assert!(err.to_string().contains("reuses bit 0"));
    }

    #[test]
    fn load_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "[harness]\nsettle_cycles = 75\n",
        )
        .unwrap();
        let config = load_config(dir.path()).unwrap();
        assert_eq!(config.harness.settle_cycles, 75);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
