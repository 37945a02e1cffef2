// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event bus configuration
//!
//! # Environment
//!
//! | Variable                | Meaning                                   |
//! |-------------------------|-------------------------------------------|
//! | `EVENT_BUS_NAMESPACE`   | Topic namespace (`{namespace}:{kind}`)    |
//! | `EVENT_BUS_MAX_DEPTH`   | Cap on nested publishes from handlers     |
//! | `EVENT_BUS_NATS_URL`    | Comma separated NATS servers; enables the network sink |
//! | `EVENT_BUS_CLIENT_NAME` | NATS client name                          |

use std::env;

use crate::bus::DEFAULT_MAX_DISPATCH_DEPTH;
use crate::errors::{EventError, EventResult};
use crate::nats::NatsConfig;
use crate::subjects::{validate_namespace, DEFAULT_NAMESPACE};

/// Configuration for building an [`crate::bus::EventBus`]
#[derive(Debug, Clone, PartialEq)]
pub struct EventBusConfig {
    /// Topic namespace for network sinks
    pub namespace: String,
    /// Cap on nested publishes from inside handlers
    pub max_dispatch_depth: usize,
    /// NATS connection for the network sink; `None` keeps the bus in-memory
    pub network: Option<NatsConfig>,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
            network: None,
        }
    }
}

impl EventBusConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> EventResult<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup
    pub fn from_lookup<F>(lookup: F) -> EventResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(namespace) = lookup("EVENT_BUS_NAMESPACE") {
            config.namespace = namespace;
        }

        if let Some(depth) = lookup("EVENT_BUS_MAX_DEPTH") {
            config.max_dispatch_depth = depth.trim().parse().map_err(|_| {
                EventError::Configuration(format!("EVENT_BUS_MAX_DEPTH is not a number: '{depth}'"))
            })?;
        }

        if let Some(urls) = lookup("EVENT_BUS_NATS_URL") {
            let servers: Vec<String> = urls
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();

            let mut nats = NatsConfig {
                servers,
                ..NatsConfig::default()
            };
            if let Some(name) = lookup("EVENT_BUS_CLIENT_NAME") {
                nats.name = name;
            }
            config.network = Some(nats);
        }

        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values the bus cannot work with
    pub fn validate(&self) -> EventResult<()> {
        validate_namespace(&self.namespace)?;

        if self.max_dispatch_depth == 0 {
            return Err(EventError::Configuration(
                "max_dispatch_depth must be at least 1".into(),
            ));
        }

        if let Some(nats) = &self.network {
            if nats.servers.is_empty() {
                return Err(EventError::Configuration(
                    "network sink configured without NATS servers".into(),
                ));
            }
        }
        Ok(())
    }
}
