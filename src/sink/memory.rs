// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-memory sink

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, warn};

use super::EventSink;
use crate::errors::{EventError, EventResult};
use crate::events::{EventEnvelope, EventKind};

/// Callback invoked directly by the in-memory sink
///
/// These are separate from bus handlers: they run inline, in registration
/// order, after the envelope has been recorded.
pub type SinkCallback = Arc<dyn Fn(&EventEnvelope) -> anyhow::Result<()> + Send + Sync>;

/// In-process event log
///
/// Default sink when no broker is configured. Never fails unless its lock is
/// poisoned.
#[derive(Default)]
pub struct InMemorySink {
    events: RwLock<Vec<EventEnvelope>>,
    callbacks: RwLock<HashMap<EventKind, Vec<SinkCallback>>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback for one kind
    pub fn register_callback<F>(&self, kind: EventKind, callback: F)
    where
        F: Fn(&EventEnvelope) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        match self.callbacks.write() {
            Ok(mut callbacks) => callbacks.entry(kind).or_default().push(Arc::new(callback)),
            Err(_) => warn!(kind = %kind, "Callback registry poisoned, callback dropped"),
        }
    }

    /// Snapshot of everything recorded so far, in publish order
    pub fn events(&self) -> Vec<EventEnvelope> {
        self.events.read().map(|e| e.clone()).unwrap_or_default()
    }

    /// Recorded events of one kind
    pub fn events_of_kind(&self, kind: EventKind) -> Vec<EventEnvelope> {
        self.events()
            .into_iter()
            .filter(|e| e.kind() == kind)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.events.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every recorded event
    pub fn clear(&self) {
        if let Ok(mut events) = self.events.write() {
            events.clear();
        }
    }

    fn record(&self, envelopes: &[EventEnvelope]) -> EventResult<()> {
        let mut events = self
            .events
            .write()
            .map_err(|_| EventError::SinkDelivery("in-memory sink lock poisoned".into()))?;
        events.extend_from_slice(envelopes);
        Ok(())
    }

    fn run_callbacks(&self, envelope: &EventEnvelope) {
        let callbacks = match self.callbacks.read() {
            Ok(callbacks) => callbacks.get(&envelope.kind()).cloned().unwrap_or_default(),
            Err(_) => return,
        };

        for callback in callbacks {
            if let Err(e) = callback(envelope) {
                warn!(
                    event_id = %envelope.event_id(),
                    kind = %envelope.kind(),
                    error = %format!("{e:#}"),
                    "In-memory sink callback failed"
                );
            }
        }
    }
}

#[async_trait]
impl EventSink for InMemorySink {
    fn name(&self) -> &str {
        "memory"
    }

    async fn publish(&self, envelope: &EventEnvelope) -> EventResult<()> {
        self.record(std::slice::from_ref(envelope))?;
        debug!(event_id = %envelope.event_id(), kind = %envelope.kind(), "Recorded event");
        self.run_callbacks(envelope);
        Ok(())
    }

    async fn publish_batch(&self, envelopes: &[EventEnvelope]) -> EventResult<()> {
        self.record(envelopes)?;
        debug!(count = envelopes.len(), "Recorded event batch");
        for envelope in envelopes {
            self.run_callbacks(envelope);
        }
        Ok(())
    }

    async fn close(&self) -> EventResult<()> {
        Ok(())
    }
}
