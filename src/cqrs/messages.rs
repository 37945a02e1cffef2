// Copyright (c) 2025 - Cowboy AI, Inc.
//! Command and query values

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::CommandError;
use crate::events::EventEnvelope;

/// Request to change state, routed by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    pub command_id: Uuid,
    /// Discriminator used to find the handler (e.g. `create_document`)
    pub kind: String,
    #[serde(default)]
    pub payload: Value,
    #[serde(default)]
    pub correlation_id: Option<String>,
    pub issued_at: DateTime<Utc>,
}

impl Command {
    pub fn new(kind: impl Into<String>, payload: Value) -> Self {
        Self {
            command_id: Uuid::now_v7(),
            kind: kind.into(),
            payload,
            correlation_id: None,
            issued_at: Utc::now(),
        }
    }

    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Decode the payload into a typed struct
    pub fn payload_as<T: DeserializeOwned>(&self) -> Result<T, CommandError> {
        serde_json::from_value(self.payload.clone())
            .map_err(|e| CommandError::Validation(format!("invalid '{}' payload: {}", self.kind, e)))
    }
}

/// Request to read state, routed by `kind`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub query_id: Uuid,
    pub kind: String,
    #[serde(default)]
    pub parameters: Value,
}

impl Query {
    pub fn new(kind: impl Into<String>, parameters: Value) -> Self {
        Self {
            query_id: Uuid::now_v7(),
            kind: kind.into(),
            parameters,
        }
    }

    /// Decode the parameters into a typed struct
    pub fn parameters_as<T: DeserializeOwned>(&self) -> Result<T, CommandError> {
        serde_json::from_value(self.parameters.clone())
            .map_err(|e| CommandError::Validation(format!("invalid '{}' parameters: {}", self.kind, e)))
    }
}

/// What a command handler produced
///
/// `events` are published in order, after the handler returns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandOutcome {
    pub events: Vec<EventEnvelope>,
    pub result: Option<Value>,
}

impl CommandOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_events(events: Vec<EventEnvelope>) -> Self {
        Self {
            events,
            result: None,
        }
    }

    pub fn with_result(mut self, result: Value) -> Self {
        self.result = Some(result);
        self
    }
}
