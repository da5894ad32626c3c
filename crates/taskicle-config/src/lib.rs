#![allow(clippy::must_use_candidate)]

pub mod client;
mod env;
mod loader;
pub mod telemetry;

use serde::Deserialize;

pub use client::*;
pub use telemetry::*;

/// Top-level Taskicle client configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub client: ClientConfig,
    /// Logging settings
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}
