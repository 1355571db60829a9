//! Parsing and validation of `cyclebench.toml` harness configuration files.
//!
//! The configuration names the DUT's pins, fixes the control-bus bit mapping,
//! and sets the reset, settle, and clock timing shared by every scenario.
//! Every section is optional; defaults describe a Tiny Tapeout style pinout.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
