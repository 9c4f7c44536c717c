//! # Ledger Telemetry
//!
//! Log setup for offline ledger peers.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//!     // Ledger spans and events are now written to stdout
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OL_SERVICE_NAME` | `offline-ledger` | Service name in logs |
//! | `OL_LOG_LEVEL` / `RUST_LOG` | `info` | Log level filter |
//! | `OL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `OL_JSON_LOGS` | `false` | JSON lines instead of pretty output |

mod config;
mod logging;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use tracing_setup::build_env_filter;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global tracing subscriber described by `config`.
///
/// Fails with `SubscriberInit` if a global subscriber is already set.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    tracing_setup::init_tracing(config)
}
