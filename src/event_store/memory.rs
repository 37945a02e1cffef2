// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory event store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use super::EventStore;
use crate::errors::{EventError, EventResult};
use crate::events::EventEnvelope;

/// Process-local event store
///
/// Each `save` appends under a single write lock, so concurrent readers see
/// either none or all of a batch. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    logs: RwLock<HashMap<String, Vec<EventEnvelope>>>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// IDs of every aggregate with at least one event
    pub fn aggregate_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .logs
            .read()
            .map(|logs| logs.keys().cloned().collect())
            .unwrap_or_default();
        ids.sort();
        ids
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn save(&self, aggregate_id: &str, events: &[EventEnvelope]) -> EventResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        let mut logs = self
            .logs
            .write()
            .map_err(|_| EventError::EventStore("lock poisoned".to_string()))?;
        logs.entry(aggregate_id.to_string())
            .or_default()
            .extend_from_slice(events);
        Ok(())
    }

    async fn load(&self, aggregate_id: &str) -> EventResult<Vec<EventEnvelope>> {
        let logs = self
            .logs
            .read()
            .map_err(|_| EventError::EventStore("lock poisoned".to_string()))?;
        Ok(logs.get(aggregate_id).cloned().unwrap_or_default())
    }
}
