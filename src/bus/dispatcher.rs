// Copyright (c) 2025 - Cowboy AI, Inc.
//! Handler registry and concurrent fan-out
//!
//! For each envelope the dispatcher snapshots the handlers registered for its
//! kind, spawns one task per handler and joins them all. A failing or
//! panicking handler is recorded in the [`DispatchReport`] and logged; it
//! never blocks or fails its siblings. There is no ordering between handlers
//! of the same kind.
//!
//! Each handler task carries its dispatch depth in a task-local so that a
//! handler publishing from inside its own callback can be bounded by the bus.
//! It also owns an [`InFlightGuard`], so work keeps being counted after the
//! publisher that spawned it is cancelled.

use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use super::handler::EventHandler;
use crate::events::{EventEnvelope, EventKind};

tokio::task_local! {
    static DISPATCH_DEPTH: usize;
}

/// Number of handler dispatches enclosing the current task
pub fn current_depth() -> usize {
    DISPATCH_DEPTH.try_with(|depth| *depth).unwrap_or(0)
}

/// A handler that failed for one envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerFailure {
    pub handler_id: String,
    pub error: String,
}

/// Outcome of publishing one envelope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub event_id: Uuid,
    pub kind: EventKind,
    /// False when the bus was not running and the envelope was dropped
    pub delivered: bool,
    pub handlers_invoked: usize,
    pub failures: Vec<HandlerFailure>,
}

impl DispatchReport {
    fn new(envelope: &EventEnvelope, delivered: bool) -> Self {
        Self {
            event_id: envelope.event_id(),
            kind: envelope.kind(),
            delivered,
            handlers_invoked: 0,
            failures: Vec::new(),
        }
    }

    /// Report for an envelope dropped by a stopped bus
    pub fn skipped(envelope: &EventEnvelope) -> Self {
        Self::new(envelope, false)
    }

    /// True when every invoked handler succeeded
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.handlers_invoked - self.failures.len()
    }
}

/// Kind -> ordered set of handlers, keyed by handler ID
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<EventKind, Vec<Arc<dyn EventHandler>>>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for every kind it declares
    ///
    /// A handler ID already present for a kind is replaced in place.
    pub fn register(&self, handler: Arc<dyn EventHandler>) {
        let Ok(mut handlers) = self.handlers.write() else {
            warn!(handler_id = %handler.handler_id(), "Handler registry poisoned, subscription dropped");
            return;
        };

        let mut kinds = handler.kinds();
        kinds.sort();
        kinds.dedup();

        for kind in kinds {
            let entry = handlers.entry(kind).or_default();
            match entry
                .iter()
                .position(|h| h.handler_id() == handler.handler_id())
            {
                Some(index) => entry[index] = Arc::clone(&handler),
                None => entry.push(Arc::clone(&handler)),
            }
        }
    }

    /// Remove a handler from every kind; returns whether it was registered
    pub fn remove(&self, handler_id: &str) -> bool {
        let Ok(mut handlers) = self.handlers.write() else {
            return false;
        };

        let mut removed = false;
        handlers.retain(|_, entry| {
            let before = entry.len();
            entry.retain(|h| h.handler_id() != handler_id);
            removed |= entry.len() != before;
            !entry.is_empty()
        });
        removed
    }

    /// Handlers for a kind at this instant
    pub fn snapshot(&self, kind: EventKind) -> Vec<Arc<dyn EventHandler>> {
        self.handlers
            .read()
            .ok()
            .and_then(|handlers| handlers.get(&kind).cloned())
            .unwrap_or_default()
    }

    pub fn count(&self, kind: EventKind) -> usize {
        self.handlers
            .read()
            .map(|handlers| handlers.get(&kind).map_or(0, Vec::len))
            .unwrap_or(0)
    }
}

/// Counts publishes and handler tasks that have not finished yet
#[derive(Debug, Clone)]
pub struct InFlight {
    counter: Arc<watch::Sender<usize>>,
}

impl Default for InFlight {
    fn default() -> Self {
        let (counter, _) = watch::channel(0);
        Self {
            counter: Arc::new(counter),
        }
    }
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one unit of work until the returned guard is dropped
    pub fn enter(&self) -> InFlightGuard {
        self.counter.send_modify(|count| *count += 1);
        InFlightGuard {
            counter: Arc::clone(&self.counter),
        }
    }

    pub fn count(&self) -> usize {
        *self.counter.borrow()
    }

    /// Resolve once nothing is in flight
    pub async fn drained(&self) {
        let mut receiver = self.counter.subscribe();
        // The sender is held by `self`, so the channel cannot close while waiting
        let _ = receiver.wait_for(|count| *count == 0).await;
    }
}

/// Decrements the in-flight count on drop
#[derive(Debug)]
pub struct InFlightGuard {
    counter: Arc<watch::Sender<usize>>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.counter.send_modify(|count| *count -= 1);
    }
}

/// Fans envelopes out to registered handlers
#[derive(Default)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    in_flight: InFlight,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &HandlerRegistry {
        &self.registry
    }

    pub fn in_flight(&self) -> &InFlight {
        &self.in_flight
    }

    /// Run every handler registered for the envelope's kind and join them
    ///
    /// `depth` is the depth of the publishing task; handlers run at `depth + 1`.
    pub async fn dispatch(&self, envelope: &EventEnvelope, depth: usize) -> DispatchReport {
        let mut report = DispatchReport::new(envelope, true);

        let handlers = self.registry.snapshot(envelope.kind());
        if handlers.is_empty() {
            debug!(event_id = %envelope.event_id(), kind = %envelope.kind(), "No handlers for event");
            return report;
        }

        let shared = Arc::new(envelope.clone());
        let tasks = handlers.into_iter().map(|handler| {
            let handler_id = handler.handler_id().to_string();
            let envelope = Arc::clone(&shared);
            let guard = self.in_flight.enter();
            let task = tokio::spawn(DISPATCH_DEPTH.scope(depth + 1, async move {
                let _guard = guard;
                handler.handle(&envelope).await
            }));
            async move { (handler_id, task.await) }
        });

        let results = join_all(tasks).await;
        report.handlers_invoked = results.len();

        for (handler_id, result) in results {
            let error = match result {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => format!("{e:#}"),
                Err(join_error) if join_error.is_panic() => "handler panicked".to_string(),
                Err(_) => "handler task cancelled".to_string(),
            };

            warn!(
                handler_id = %handler_id,
                event_id = %envelope.event_id(),
                kind = %envelope.kind(),
                error = %error,
                "Event handler failed"
            );
            report.failures.push(HandlerFailure { handler_id, error });
        }

        debug!(
            event_id = %envelope.event_id(),
            handlers = report.handlers_invoked,
            failed = report.failures.len(),
            "Dispatched event"
        );
        report
    }
}
