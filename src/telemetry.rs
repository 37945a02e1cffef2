// Copyright (c) 2025 - Cowboy AI, Inc.
//! Tracing subscriber setup for binaries and integration tests

use tracing_subscriber::EnvFilter;

use crate::errors::{EventError, EventResult};

/// Install a global `fmt` subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (e.g. `"info"` or
/// `"ecosystem_events=debug"`) is used. Fails if a global subscriber is
/// already installed.
pub fn init_tracing(default_filter: &str) -> EventResult<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .map_err(|e| EventError::Configuration(format!("invalid log filter: {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| EventError::Configuration(format!("tracing already initialised: {e}")))
}
