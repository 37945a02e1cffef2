// Copyright (c) 2025 - Cowboy AI, Inc.
//! Immutable event envelope

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

use super::kind::EventKind;
use super::payloads::EventPayload;
use crate::errors::{EventError, EventResult};

/// One event occurrence
///
/// Fields are private: an envelope is built once (constructor plus the
/// consuming `with_*` builders) and is read-only from then on. Cloning yields
/// an identical value with the same `event_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    /// Unique event ID (UUID v7 for time-ordering)
    event_id: Uuid,

    /// When the event occurred (producer clock, not monotonic across processes)
    occurred_at: DateTime<Utc>,

    /// Links events that belong to the same flow
    #[serde(default)]
    correlation_id: Option<String>,

    /// Open key/value metadata (source system, user context, ...)
    #[serde(default)]
    metadata: BTreeMap<String, Value>,

    /// Kind-specific fields, flattened next to the envelope fields
    #[serde(flatten)]
    payload: EventPayload,
}

impl EventEnvelope {
    /// Wrap a payload in a fresh envelope
    pub fn new(payload: impl Into<EventPayload>) -> Self {
        Self {
            event_id: Uuid::now_v7(),
            occurred_at: Utc::now(),
            correlation_id: None,
            metadata: BTreeMap::new(),
            payload: payload.into(),
        }
    }

    /// Rebuild an envelope from stored parts
    pub fn from_parts(
        event_id: Uuid,
        occurred_at: DateTime<Utc>,
        correlation_id: Option<String>,
        metadata: BTreeMap<String, Value>,
        payload: EventPayload,
    ) -> Self {
        Self {
            event_id,
            occurred_at,
            correlation_id,
            metadata,
            payload,
        }
    }

    /// Set the correlation ID
    pub fn with_correlation_id(mut self, correlation_id: impl Into<String>) -> Self {
        self.correlation_id = Some(correlation_id.into());
        self
    }

    /// Add a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn kind(&self) -> EventKind {
        self.payload.kind()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    pub fn payload(&self) -> &EventPayload {
        &self.payload
    }

    pub fn into_payload(self) -> EventPayload {
        self.payload
    }

    /// Flat wire map consumed by network sinks
    ///
    /// `{event_id, kind, occurred_at, correlation_id, metadata, ...payload fields}`
    pub fn to_canonical_map(&self) -> EventResult<Map<String, Value>> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(EventError::Serialization(format!(
                "envelope serialized to non-object value: {other}"
            ))),
        }
    }

    /// Serialize to JSON bytes
    pub fn to_json(&self) -> EventResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Parse an envelope from JSON bytes
    pub fn from_json(bytes: &[u8]) -> EventResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
