// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Sinks
//!
//! A sink is an external-facing delivery target for published envelopes. The
//! bus treats a sink as an opaque capability: each implementation owns and
//! synchronizes its own connections.
//!
//! # Variants
//!
//! - [`InMemorySink`] - in-process log, always present, the delivery floor
//! - [`NetworkSink`] - best-effort broker publishing on `{namespace}:{kind}`
//! - [`CompositeSink`] - concurrent fan-out to several sinks
//!
//! # Construction
//!
//! [`create_sink`] always includes an [`InMemorySink`]; a configured network
//! sink is added next to it inside a [`CompositeSink`].

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::EventBusConfig;
use crate::errors::EventResult;
use crate::events::EventEnvelope;
use crate::nats::NatsClient;

pub mod composite;
pub mod memory;
pub mod network;

pub use composite::CompositeSink;
pub use memory::{InMemorySink, SinkCallback};
pub use network::{Broker, NetworkSink};

/// Delivery target for published envelopes
#[async_trait]
pub trait EventSink: Send + Sync {
    /// Name used in logs and failure reports
    fn name(&self) -> &str;

    /// Deliver one envelope
    async fn publish(&self, envelope: &EventEnvelope) -> EventResult<()>;

    /// Deliver several envelopes
    ///
    /// No atomicity: a failure part-way leaves the earlier envelopes delivered.
    async fn publish_batch(&self, envelopes: &[EventEnvelope]) -> EventResult<()> {
        for envelope in envelopes {
            self.publish(envelope).await?;
        }
        Ok(())
    }

    /// Release connections and background work
    async fn close(&self) -> EventResult<()>;
}

/// Build the sink described by `config`
///
/// Returns the in-memory sink alone, or a composite with the in-memory sink
/// as its floor and a NATS-backed network sink as a best-effort member. A
/// network sink that cannot connect is left out with a warning.
pub async fn create_sink(
    config: &EventBusConfig,
) -> EventResult<(Arc<InMemorySink>, Arc<dyn EventSink>)> {
    let memory = Arc::new(InMemorySink::new());

    let Some(nats_config) = &config.network else {
        info!("No network sink configured, using in-memory sink");
        let sink: Arc<dyn EventSink> = memory.clone();
        return Ok((memory, sink));
    };

    match NatsClient::new(nats_config).await {
        Ok(client) => {
            let network: Arc<dyn EventSink> =
                Arc::new(NetworkSink::new(client, config.namespace.clone())?);
            let floor: Arc<dyn EventSink> = memory.clone();
            let sink: Arc<dyn EventSink> =
                Arc::new(CompositeSink::with_floor(floor, vec![network]));
            info!(namespace = %config.namespace, "Using in-memory + NATS composite sink");
            Ok((memory, sink))
        }
        Err(e) => {
            warn!(error = %e, "Network sink unavailable, falling back to in-memory sink");
            let sink: Arc<dyn EventSink> = memory.clone();
            Ok((memory, sink))
        }
    }
}
