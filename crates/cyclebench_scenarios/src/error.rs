//! Suite construction errors.

use std::io;

use cyclebench_config::ConfigError;
use cyclebench_harness::{BackendError, SchedulerError};

/// Errors raised while assembling or starting a suite run.
#[derive(Debug, thiserror::Error)]
pub enum SuiteError {
    /// The configuration could not be used.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A scenario could not be registered.
    #[error("registration error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// The VCD file could not be created.
    #[error("cannot create trace file '{path}': {source}")]
    TraceFile {
        /// The configured path.
        path: String,
        /// The underlying I/O error.
        source: io::Error,
    },

    /// The backend rejected the trace setup.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
}
