// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Sourcing Integration
//!
//! Keeps an append-only log per aggregate and republishes every saved event
//! through the [`EventBus`].
//!
//! ```text
//! save_events(A, [e1, e2]) ──► EventStore (atomic append) ──► publish(e1) ──► publish(e2)
//! replay_events(A, f)      ──► EventStore::load            ──► f(e1) ──► f(e2)
//! ```
//!
//! Logs are immutable once written, so replaying an aggregate twice invokes
//! the consumer with the same sequence both times.

use std::sync::Arc;
use tracing::{debug, info};

use crate::bus::EventBus;
use crate::errors::EventResult;
use crate::event_store::{EventStore, InMemoryEventStore};
use crate::events::EventEnvelope;

/// Per-aggregate log with publish-on-save and ordered replay
pub struct EventSourcingIntegration {
    bus: Arc<EventBus>,
    store: Arc<dyn EventStore>,
}

impl EventSourcingIntegration {
    /// Logs are kept in process memory
    pub fn new(bus: Arc<EventBus>) -> Self {
        let store: Arc<dyn EventStore> = Arc::new(InMemoryEventStore::new());
        Self::with_store(bus, store)
    }

    /// Logs are kept in the given store
    pub fn with_store(bus: Arc<EventBus>, store: Arc<dyn EventStore>) -> Self {
        Self { bus, store }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn store(&self) -> &Arc<dyn EventStore> {
        &self.store
    }

    /// Append events to an aggregate, then publish them in the same order
    ///
    /// Nothing is published if the append fails. If the bus rejects an event,
    /// publishing stops there and
    /// [`crate::errors::EventError::PublishIncomplete`] reports
    /// the prefix that went out; the log itself keeps every event, so replay
    /// still sees them all. An empty slice is a no-op.
    pub async fn save_events(&self, aggregate_id: &str, events: &[EventEnvelope]) -> EventResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        self.store.save(aggregate_id, events).await?;
        debug!(aggregate_id = %aggregate_id, count = events.len(), "Saved events");

        self.bus.publish_sequence(events).await?;
        Ok(())
    }

    /// Full ordered log of an aggregate; empty when nothing was saved
    pub async fn load_events(&self, aggregate_id: &str) -> EventResult<Vec<EventEnvelope>> {
        self.store.load(aggregate_id).await
    }

    /// Feed every event of an aggregate to `consumer` in append order
    ///
    /// Returns how many events were replayed. Replay never publishes.
    pub async fn replay_events<F>(&self, aggregate_id: &str, mut consumer: F) -> EventResult<usize>
    where
        F: FnMut(&EventEnvelope),
    {
        let events = self.store.load(aggregate_id).await?;
        for event in &events {
            consumer(event);
        }

        info!(aggregate_id = %aggregate_id, count = events.len(), "Replayed aggregate");
        Ok(events.len())
    }

    /// Number of events in an aggregate's log
    pub async fn aggregate_version(&self, aggregate_id: &str) -> EventResult<usize> {
        Ok(self.store.load(aggregate_id).await?.len())
    }
}
