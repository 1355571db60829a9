//! The canonical scenarios and suite assembly.
//!
//! Every scenario follows the same prelude: start its clock, pulse reset for
//! `harness.reset_cycles`, wait `harness.settle_cycles`, and require a
//! resolvable output bus. Scenario-specific stimulus follows.

use std::fs::File;
use std::io::BufWriter;

use cyclebench_common::Period;
use cyclebench_config::{ConfigError, HarnessConfig};
use cyclebench_harness::{
    apply_reset, Backend, Condition, ObserveMode, RunReport, Scenario, ScenarioScheduler,
    SimContext, VcdRecorder,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use crate::controls::ControlInputs;
use crate::error::SuiteError;
use crate::output::{HSYNC_BIT, VSYNC_BIT};

/// Names of the canonical scenarios, in run order.
pub const SCENARIO_NAMES: [&str; 6] = [
    "test_reset",
    "test_vga_sync",
    "test_shooter_movement",
    "test_fire_button",
    "test_double_reset",
    "test_random_buttons",
];

/// Seed of the button sequence in `test_random_buttons`.
pub const RANDOM_BUTTONS_SEED: u64 = 0x5EED_B077;

const VGA_SYNC_CYCLES: u64 = 200_000;
const MOVE_CYCLES: u64 = 1000;
const FIRE_CYCLES: u64 = 20;
const RANDOM_BUTTON_CYCLES: u64 = 5000;
const MAX_HOLD_CYCLES: u64 = 200;

/// Clock, reset, settle, without the closing resolvability check.
fn prelude(cfg: &HarnessConfig, name: &str, period: Period) -> Scenario {
    let pins = &cfg.pins;
    Scenario::new(name)
        .log(format!("=== {name} START ==="))
        .start_clock(&pins.clock, period)
        .reset(apply_reset(
            &pins.clock,
            &pins.reset,
            cfg.harness.reset_cycles,
            &pins.enable,
            pins.idle_inputs(),
        ))
        .wait_cycles(&pins.clock, cfg.harness.settle_cycles)
}

fn settled(cfg: &HarnessConfig, name: &str, period: Period) -> Scenario {
    prelude(cfg, name, period).assert_resolvable(
        &cfg.pins.output,
        format!("{} has X or Z after reset!", cfg.pins.output),
    )
}

fn press(scenario: Scenario, cfg: &HarnessConfig, buttons: ControlInputs) -> Scenario {
    scenario.set_u64(&cfg.pins.controls, buttons.to_ui_in(&cfg.controls))
}

fn default_period(cfg: &HarnessConfig, name: &str) -> Result<Period, ConfigError> {
    cfg.scenario_period(name, cfg.clock_period()?)
}

/// Reset at 25 MHz, then the output bus must be resolvable.
pub fn test_reset(cfg: &HarnessConfig) -> Result<Scenario, ConfigError> {
    let name = "test_reset";
    let period = cfg.scenario_period(name, Period::from_ns(40))?;
    let out = &cfg.pins.output;
    Ok(prelude(cfg, name, period)
        .sample(out, format!("{out} after reset"))
        .assert_resolvable(out, format!("{out} has X or Z after reset!"))
        .log(format!("=== {name} DONE ===")))
}

/// HSYNC or VSYNC must be seen high at a rising edge within the run.
pub fn test_vga_sync(cfg: &HarnessConfig) -> Result<Scenario, ConfigError> {
    let name = "test_vga_sync";
    let period = default_period(cfg, name)?;
    let cycles = cfg.scenario_cycles(name, VGA_SYNC_CYCLES);
    let out = &cfg.pins.output;
    Ok(settled(cfg, name, period)
        .log(format!("Running for {cycles} cycles at {period} ..."))
        .observe(
            &cfg.pins.clock,
            out,
            cycles,
            Condition::AnyBitSet(vec![HSYNC_BIT, VSYNC_BIT]),
            ObserveMode::Eventually,
            "HSYNC and VSYNC never toggled from 0 within the time tested",
        )
        .sample(out, format!("{out} final"))
        .log(format!("=== {name} DONE ===")))
}

/// Right, release, left, release; the bus stays resolvable at every edge.
pub fn test_shooter_movement(cfg: &HarnessConfig) -> Result<Scenario, ConfigError> {
    let name = "test_shooter_movement";
    let period = default_period(cfg, name)?;
    let hold = cfg.scenario_cycles(name, MOVE_CYCLES);
    let (clock, out, controls) = (&cfg.pins.clock, &cfg.pins.output, &cfg.pins.controls);
    let held_resolvable = |scenario: Scenario, button: &str| {
        scenario.observe(
            clock,
            out,
            hold,
            Condition::Resolvable,
            ObserveMode::Always,
            format!("{out} has X or Z while {button} is pressed"),
        )
    };

    let s = settled(cfg, name, period).wait_cycles(clock, hold);
    let s = press(s.log("Pressing RIGHT button"), cfg, ControlInputs::RIGHT);
    let s = held_resolvable(s, "RIGHT")
        .zero(controls)
        .wait_cycles(clock, hold / 2);
    let s = press(s.log("Pressing LEFT button"), cfg, ControlInputs::LEFT);
    Ok(held_resolvable(s, "LEFT")
        .zero(controls)
        .wait_cycles(clock, hold * 2)
        .sample(out, out.to_string())
        .assert_resolvable(out, format!("{out} has X or Z after movement test!"))
        .log(format!("=== {name} DONE ===")))
}

/// A short fire press, then a long flight; the bus must stay resolvable.
pub fn test_fire_button(cfg: &HarnessConfig) -> Result<Scenario, ConfigError> {
    let name = "test_fire_button";
    let period = default_period(cfg, name)?;
    let flight = cfg.scenario_cycles(name, 10_000);
    let (clock, out) = (&cfg.pins.clock, &cfg.pins.output);

    let s = settled(cfg, name, period).wait_cycles(clock, 2 * MOVE_CYCLES);
    Ok(press(s.log("Pressing FIRE button"), cfg, ControlInputs::FIRE)
        .wait_cycles(clock, FIRE_CYCLES)
        .zero(&cfg.pins.controls)
        .wait_cycles(clock, flight)
        .sample(out, format!("{out} after firing"))
        .assert_resolvable(out, format!("{out} has X or Z after firing test!"))
        .log(format!("=== {name} DONE ===")))
}

/// Two reset pulses, one cycle apart, leave the bus as resolvable as one.
pub fn test_double_reset(cfg: &HarnessConfig) -> Result<Scenario, ConfigError> {
    let name = "test_double_reset";
    let period = default_period(cfg, name)?;
    let pins = &cfg.pins;
    Ok(Scenario::new(name)
        .log(format!("=== {name} START ==="))
        .start_clock(&pins.clock, period)
        .reset(apply_reset(
            &pins.clock,
            &pins.reset,
            cfg.harness.reset_cycles,
            &pins.enable,
            pins.idle_inputs(),
        ))
        .wait_cycles(&pins.clock, 1)
        .reset(apply_reset(
            &pins.clock,
            &pins.reset,
            cfg.harness.reset_cycles,
            &pins.enable,
            pins.idle_inputs(),
        ))
        .wait_cycles(&pins.clock, cfg.harness.settle_cycles)
        .sample(&pins.output, format!("{} after second reset", pins.output))
        .assert_resolvable(
            &pins.output,
            format!("{} has X or Z after double reset!", pins.output),
        )
        .log(format!("=== {name} DONE ===")))
}

/// Seeded random button combinations, each held for a random time, with
/// the bus resolvable at every edge.
pub fn test_random_buttons(cfg: &HarnessConfig, seed: u64) -> Result<Scenario, ConfigError> {
    let name = "test_random_buttons";
    let period = default_period(cfg, name)?;
    let budget = cfg.scenario_cycles(name, RANDOM_BUTTON_CYCLES);
    let (clock, out) = (&cfg.pins.clock, &cfg.pins.output);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut s = settled(cfg, name, period).log(format!("button sequence seed {seed:#x}"));
    let mut spent = 0;
    while spent < budget {
        let buttons = ControlInputs::random(&mut rng);
        let hold = rng.gen_range(1..=MAX_HOLD_CYCLES).min(budget - spent);
        s = press(s, cfg, buttons).observe(
            clock,
            out,
            hold,
            Condition::Resolvable,
            ObserveMode::Always,
            format!("{out} has X or Z under buttons {buttons:?}"),
        );
        spent += hold;
    }
    debug!(scenario = name, steps = s.steps().len(), "random button program built");
    Ok(s.zero(&cfg.pins.controls)
        .assert_resolvable(out, format!("{out} has X or Z after random buttons!"))
        .log(format!("=== {name} DONE ===")))
}

/// Registers every canonical scenario enabled in `cfg`.
pub fn standard_suite(cfg: &HarnessConfig) -> Result<ScenarioScheduler, SuiteError> {
    let mut sched = ScenarioScheduler::new();
    let scenarios = [
        test_reset(cfg)?,
        test_vga_sync(cfg)?,
        test_shooter_movement(cfg)?,
        test_fire_button(cfg)?,
        test_double_reset(cfg)?,
        test_random_buttons(cfg, RANDOM_BUTTONS_SEED)?,
    ];
    for scenario in scenarios {
        if !cfg.is_enabled(scenario.name()) {
            info!(scenario = scenario.name(), "disabled by configuration");
            continue;
        }
        sched.register(scenario)?;
    }
    Ok(sched)
}

/// Runs the enabled canonical scenarios whose names contain `filter`
/// against `backend`, tracing to `trace.vcd` if configured.
pub fn run_suite(
    cfg: &HarnessConfig,
    backend: Box<dyn Backend>,
    filter: Option<&str>,
) -> Result<RunReport, SuiteError> {
    let mut sched = standard_suite(cfg)?;
    sched.set_filter(filter.map(str::to_string));

    let mut ctx = SimContext::new(backend);
    if let Some(path) = &cfg.trace.vcd {
        let file = File::create(path).map_err(|source| SuiteError::TraceFile {
            path: path.clone(),
            source,
        })?;
        ctx.set_recorder(Box::new(VcdRecorder::new(
            BufWriter::new(file),
            cfg.harness.name.clone(),
        )))?;
        info!(path = %path, "tracing pins to VCD");
    }

    info!(run = %cfg.harness.name, scenarios = sched.len(), "starting run");
    Ok(sched.run(&mut ctx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclebench_config::load_config_from_str;
    use cyclebench_harness::Step;

    fn count_observes(s: &Scenario) -> Vec<u64> {
        s.steps()
            .iter()
            .filter_map(|step| match step {
                Step::Observe { cycles, .. } => Some(*cycles),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn reset_scenario_uses_fast_clock() {
        let s = test_reset(&HarnessConfig::default()).unwrap();
        assert_eq!(s.name(), "test_reset");
        assert!(s.steps().contains(&Step::StartClock {
            clock: "clk".into(),
            period: Period::from_ns(40),
        }));
    }

    #[test]
    fn vga_sync_window_is_configurable() {
        let cfg = load_config_from_str(
            r#"
[scenarios.test_vga_sync]
cycles = 1000
clock_period = "2us"
"#,
        )
        .unwrap();
        let s = test_vga_sync(&cfg).unwrap();
        assert_eq!(count_observes(&s), vec![1000]);
        assert!(s.steps().contains(&Step::StartClock {
            clock: "clk".into(),
            period: Period::from_us(2),
        }));
    }

    #[test]
    fn movement_drives_mapped_bits() {
        let s = test_shooter_movement(&HarnessConfig::default()).unwrap();
        let driven: Vec<u64> = s
            .steps()
            .iter()
            .filter_map(|step| match step {
                Step::SetUint { signal, value } if signal == "ui_in" => Some(*value),
                _ => None,
            })
            .collect();
        assert_eq!(driven, vec![0b0001, 0b0010]);
        assert_eq!(count_observes(&s), vec![1000, 1000]);
    }

    #[test]
    fn random_program_spends_exact_budget() {
        let cfg = HarnessConfig::default();
        let s = test_random_buttons(&cfg, 42).unwrap();
        assert_eq!(count_observes(&s).iter().sum::<u64>(), RANDOM_BUTTON_CYCLES);
        assert_eq!(s, test_random_buttons(&cfg, 42).unwrap());
        assert_ne!(s, test_random_buttons(&cfg, 43).unwrap());
    }

    #[test]
    fn suite_honours_enabled_flag() {
        let cfg = load_config_from_str(
            r#"
[scenarios.test_vga_sync]
enabled = false
"#,
        )
        .unwrap();
        let sched = standard_suite(&cfg).unwrap();
        assert_eq!(sched.len(), 5);
        assert!(!sched.names().contains(&"test_vga_sync"));
        assert_eq!(
            standard_suite(&HarnessConfig::default()).unwrap().names(),
            SCENARIO_NAMES.to_vec()
        );
    }

    #[test]
    fn bad_period_override_is_config_error() {
        let mut cfg = HarnessConfig::default();
        cfg.scenarios.insert(
            "test_fire_button".into(),
            cyclebench_config::ScenarioOverride {
                clock_period: Some("3fs".into()),
                cycles: None,
                enabled: None,
            },
        );
        assert!(matches!(
            standard_suite(&cfg),
            Err(SuiteError::Config(ConfigError::ValidationError(_)))
        ));
    }
}
