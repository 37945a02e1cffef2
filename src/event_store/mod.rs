// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Store Abstraction
//!
//! Pluggable persistence for per-aggregate event logs.
//!
//! # Architecture
//!
//! ```text
//! save_events(A, [e1, e2]) → EventStore::save → EventBus::publish(e1), publish(e2)
//! replay_events(A, f)      → EventStore::load → f(e1), f(e2)
//! ```
//!
//! # Event Store Requirements
//!
//! 1. **Append-Only**: logs grow monotonically, nothing is edited in place
//! 2. **Ordered**: `load` returns events in append order
//! 3. **Atomic Appends**: readers never observe half of a `save` batch
//! 4. **Absence Is Valid**: loading an unknown aggregate yields an empty log
//!
//! # Implementations
//!
//! - [`InMemoryEventStore`] - process-local, not crash-durable
//! - [`NatsEventStore`] - durable, backed by NATS JetStream

use async_trait::async_trait;
use std::sync::Arc;

use crate::errors::EventResult;
use crate::events::EventEnvelope;

pub mod memory;
pub mod nats;

pub use memory::InMemoryEventStore;
pub use nats::NatsEventStore;

/// Append-only storage for aggregate event logs
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Append events to an aggregate's log, preserving their order
    async fn save(&self, aggregate_id: &str, events: &[EventEnvelope]) -> EventResult<()>;

    /// Full log of an aggregate in append order; empty when unknown
    async fn load(&self, aggregate_id: &str) -> EventResult<Vec<EventEnvelope>>;
}

#[async_trait]
impl<S> EventStore for Arc<S>
where
    S: EventStore + ?Sized,
{
    async fn save(&self, aggregate_id: &str, events: &[EventEnvelope]) -> EventResult<()> {
        (**self).save(aggregate_id, events).await
    }

    async fn load(&self, aggregate_id: &str) -> EventResult<Vec<EventEnvelope>> {
        (**self).load(aggregate_id).await
    }
}
