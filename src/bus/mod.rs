// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Bus
//!
//! The bus owns one [`EventSink`] and a handler registry. Publishing an
//! envelope runs two independent failure domains:
//!
//! ```text
//! publish(E)
//!   ├─ sink.publish(E)          external delivery, error surfaced only if exhausted
//!   └─ dispatcher.dispatch(E)   in-process handlers, failures isolated and reported
//! ```
//!
//! # Lifecycle
//!
//! `stopped --start()--> running --stop()--> stopped`. Both transitions are
//! idempotent. `stop()` refuses new publishes first, waits for in-flight
//! publishes and every handler task they spawned to drain, then closes the
//! sink. Handler tasks are counted even when the publishing future is
//! cancelled.
//!
//! # Re-entrancy
//!
//! A handler may publish from inside its own callback. Each nested publish
//! runs one level deeper; publishing at or beyond `max_dispatch_depth` fails
//! with [`EventError::DispatchDepthExceeded`], which the dispatcher reports as
//! a failure of the publishing handler.
//!
//! # Ownership
//!
//! There is no global bus. Construct one per process or context and share it
//! as `Arc<EventBus>` with the collaborators that need it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::config::EventBusConfig;
use crate::errors::{EventError, EventResult};
use crate::events::{EventEnvelope, EventKind};
use crate::sink::{create_sink, EventSink, InMemorySink};

pub mod dispatcher;
pub mod handler;

pub use dispatcher::{
    current_depth, DispatchReport, Dispatcher, HandlerFailure, HandlerRegistry, InFlight,
    InFlightGuard,
};
pub use handler::{EventHandler, FnEventHandler};

/// Default cap on nested publishes from inside handlers
pub const DEFAULT_MAX_DISPATCH_DEPTH: usize = 8;

/// In-process event bus
pub struct EventBus {
    sink: Arc<dyn EventSink>,
    memory: Option<Arc<InMemorySink>>,
    dispatcher: Dispatcher,
    running: AtomicBool,
    max_dispatch_depth: usize,
}

impl EventBus {
    /// Create a stopped bus delivering to `sink`
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            memory: None,
            dispatcher: Dispatcher::new(),
            running: AtomicBool::new(false),
            max_dispatch_depth: DEFAULT_MAX_DISPATCH_DEPTH,
        }
    }

    /// Create a stopped bus from configuration
    pub async fn from_config(config: &EventBusConfig) -> EventResult<Self> {
        config.validate()?;
        let (memory, sink) = create_sink(config).await?;

        let mut bus = Self::new(sink).with_max_dispatch_depth(config.max_dispatch_depth);
        bus.memory = Some(memory);
        Ok(bus)
    }

    /// Override the re-entrant publish cap
    ///
    /// Values below 1 are raised to 1 so top-level publishes always pass.
    pub fn with_max_dispatch_depth(mut self, max_dispatch_depth: usize) -> Self {
        if max_dispatch_depth == 0 {
            warn!("max_dispatch_depth of 0 raised to 1");
        }
        self.max_dispatch_depth = max_dispatch_depth.max(1);
        self
    }

    pub fn max_dispatch_depth(&self) -> usize {
        self.max_dispatch_depth
    }

    pub fn sink(&self) -> &Arc<dyn EventSink> {
        &self.sink
    }

    /// The in-memory floor sink, when the bus was built from configuration
    pub fn memory(&self) -> Option<&Arc<InMemorySink>> {
        self.memory.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Number of handlers currently registered for a kind
    pub fn handler_count(&self, kind: EventKind) -> usize {
        self.dispatcher.registry().count(kind)
    }

    /// Start accepting publishes
    pub fn start(&self) {
        if !self.running.swap(true, Ordering::AcqRel) {
            info!(sink = %self.sink.name(), "Event bus started");
        }
    }

    /// Stop accepting publishes, drain in-flight work and close the sink
    ///
    /// Safe to call repeatedly; only the first call after a start closes the
    /// sink. Called from inside a handler it does not wait for the drain,
    /// since the calling handler is itself part of the in-flight work.
    pub async fn stop(&self) -> EventResult<()> {
        let was_running = self.running.swap(false, Ordering::AcqRel);

        if current_depth() == 0 {
            self.dispatcher.in_flight().drained().await;
        } else {
            warn!("Event bus stopped from inside a handler, not waiting for drain");
        }

        if was_running {
            self.sink.close().await?;
            info!("Event bus stopped");
        }
        Ok(())
    }

    /// Register a handler for the kinds it declares
    pub fn subscribe(&self, handler: Arc<dyn EventHandler>) {
        debug!(handler_id = %handler.handler_id(), kinds = ?handler.kinds(), "Subscribing handler");
        self.dispatcher.registry().register(handler);
    }

    /// Remove a handler; returns whether it was registered
    pub fn unsubscribe(&self, handler_id: &str) -> bool {
        let removed = self.dispatcher.registry().remove(handler_id);
        debug!(handler_id, removed, "Unsubscribing handler");
        removed
    }

    fn check_depth(&self) -> EventResult<usize> {
        let depth = current_depth();
        if depth >= self.max_dispatch_depth {
            warn!(depth, limit = self.max_dispatch_depth, "Refusing nested publish");
            return Err(EventError::DispatchDepthExceeded {
                depth,
                limit: self.max_dispatch_depth,
            });
        }
        Ok(depth)
    }

    fn enter(&self) -> Option<InFlightGuard> {
        let guard = self.dispatcher.in_flight().enter();
        if self.is_running() {
            Some(guard)
        } else {
            None
        }
    }

    /// Publish one envelope to the sink and to every matching handler
    ///
    /// Returns the dispatch report. The only error a caller sees besides the
    /// depth limit is a sink that could not deliver through any path; handlers
    /// still run in that case.
    pub async fn publish(&self, envelope: &EventEnvelope) -> EventResult<DispatchReport> {
        let Some(_in_flight) = self.enter() else {
            warn!(event_id = %envelope.event_id(), kind = %envelope.kind(), "Event bus not running, event dropped");
            return Ok(DispatchReport::skipped(envelope));
        };
        let depth = self.check_depth()?;

        let delivery = self.sink.publish(envelope).await;
        if let Err(e) = &delivery {
            error!(event_id = %envelope.event_id(), kind = %envelope.kind(), error = %e, "Sink delivery failed");
        }

        let report = self.dispatcher.dispatch(envelope, depth).await;
        delivery.map(|()| report)
    }

    /// Publish causally ordered envelopes one at a time
    ///
    /// Stops at the first envelope that fails, so consumers never see a later
    /// event without the ones before it. The error reports how many envelopes
    /// went out before the failure.
    pub async fn publish_sequence(&self, envelopes: &[EventEnvelope]) -> EventResult<Vec<DispatchReport>> {
        let mut reports = Vec::with_capacity(envelopes.len());
        for envelope in envelopes {
            match self.publish(envelope).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    error!(
                        event_id = %envelope.event_id(),
                        published = reports.len(),
                        total = envelopes.len(),
                        error = %e,
                        "Ordered publish interrupted"
                    );
                    return Err(EventError::PublishIncomplete {
                        published: reports.len(),
                        total: envelopes.len(),
                        failed_event_id: envelope.event_id(),
                        source: Box::new(e),
                    });
                }
            }
        }
        Ok(reports)
    }

    /// Publish several envelopes with one sink call
    ///
    /// Handlers are dispatched per envelope, in batch order. Nothing is atomic
    /// across the batch.
    pub async fn publish_batch(&self, envelopes: &[EventEnvelope]) -> EventResult<Vec<DispatchReport>> {
        if envelopes.is_empty() {
            return Ok(Vec::new());
        }
        let Some(_in_flight) = self.enter() else {
            warn!(count = envelopes.len(), "Event bus not running, batch dropped");
            return Ok(envelopes.iter().map(DispatchReport::skipped).collect());
        };
        let depth = self.check_depth()?;

        let delivery = self.sink.publish_batch(envelopes).await;
        if let Err(e) = &delivery {
            error!(count = envelopes.len(), error = %e, "Sink batch delivery failed");
        }

        let mut reports = Vec::with_capacity(envelopes.len());
        for envelope in envelopes {
            reports.push(self.dispatcher.dispatch(envelope, depth).await);
        }
        delivery.map(|()| reports)
    }
}
