// Copyright (c) 2025 - Cowboy AI, Inc.
//! Fan-out sink

use async_trait::async_trait;
use futures::future::join_all;
use std::sync::Arc;
use tracing::{error, warn};

use super::EventSink;
use crate::errors::{EventError, EventResult, SinkFailure};
use crate::events::EventEnvelope;

/// Delivers to every member sink concurrently
///
/// Individual failures are logged. A composite built with
/// [`CompositeSink::with_floor`] fails whenever its floor sink fails, no
/// matter how the other members fared; without a floor it only fails when
/// every member failed. Both cases return [`EventError::SinksExhausted`]
/// with one entry per failed sink.
pub struct CompositeSink {
    sinks: Vec<Arc<dyn EventSink>>,
    /// Index of the sink whose success the composite requires
    floor: Option<usize>,
}

impl CompositeSink {
    pub fn new(sinks: Vec<Arc<dyn EventSink>>) -> Self {
        Self { sinks, floor: None }
    }

    /// Composite whose outcome is decided by `floor`
    ///
    /// `others` are best-effort: their failures are logged only.
    pub fn with_floor(floor: Arc<dyn EventSink>, others: Vec<Arc<dyn EventSink>>) -> Self {
        let mut sinks = Vec::with_capacity(others.len() + 1);
        sinks.push(floor);
        sinks.extend(others);
        Self {
            sinks,
            floor: Some(0),
        }
    }

    /// Add a best-effort sink at the end of the list
    pub fn push(&mut self, sink: Arc<dyn EventSink>) {
        self.sinks.push(sink);
    }

    pub fn sinks(&self) -> &[Arc<dyn EventSink>] {
        &self.sinks
    }

    /// The sink whose success is required, if one was designated
    pub fn floor(&self) -> Option<&Arc<dyn EventSink>> {
        self.floor.and_then(|index| self.sinks.get(index))
    }

    fn settle(&self, operation: &str, results: Vec<(String, EventResult<()>)>) -> EventResult<()> {
        let total = results.len();
        let floor_failed = self
            .floor
            .is_some_and(|index| results.get(index).is_some_and(|(_, result)| result.is_err()));

        let failures: Vec<SinkFailure> = results
            .into_iter()
            .filter_map(|(sink, result)| {
                result.err().map(|e| SinkFailure {
                    sink,
                    error: e.to_string(),
                })
            })
            .collect();

        let exhausted = match self.floor {
            Some(_) => floor_failed,
            None => total > 0 && failures.len() == total,
        };
        if exhausted {
            error!(operation, failures = ?failures, "Sink delivery path exhausted");
            return Err(EventError::SinksExhausted { failures });
        }

        for failure in &failures {
            warn!(
                operation,
                sink = %failure.sink,
                error = %failure.error,
                "Sink failed, continuing with remaining sinks"
            );
        }
        Ok(())
    }
}

#[async_trait]
impl EventSink for CompositeSink {
    fn name(&self) -> &str {
        "composite"
    }

    async fn publish(&self, envelope: &EventEnvelope) -> EventResult<()> {
        let results = join_all(self.sinks.iter().map(|sink| async move {
            (sink.name().to_string(), sink.publish(envelope).await)
        }))
        .await;

        self.settle("publish", results)
    }

    async fn publish_batch(&self, envelopes: &[EventEnvelope]) -> EventResult<()> {
        let results = join_all(self.sinks.iter().map(|sink| async move {
            (sink.name().to_string(), sink.publish_batch(envelopes).await)
        }))
        .await;

        self.settle("publish_batch", results)
    }

    async fn close(&self) -> EventResult<()> {
        let results = join_all(
            self.sinks
                .iter()
                .map(|sink| async move { (sink.name().to_string(), sink.close().await) }),
        )
        .await;

        self.settle("close", results)
    }
}
