// Copyright (c) 2025 - Cowboy AI, Inc.
//! Broker-backed network sink
//!
//! Serializes each envelope to its canonical map and publishes it on
//! `{namespace}:{kind}`. Delivery is best-effort: serialization and broker
//! errors are logged and counted, never returned to the bus.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use super::EventSink;
use crate::errors::EventResult;
use crate::events::EventEnvelope;
use crate::nats::NatsClient;
use crate::subjects::{topic_for, validate_namespace};

/// Message broker the network sink publishes through
#[async_trait]
pub trait Broker: Send + Sync {
    /// Publish an encoded payload on a topic
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> EventResult<()>;

    /// Flush anything buffered
    async fn flush(&self) -> EventResult<()>;
}

#[async_trait]
impl<B> Broker for Arc<B>
where
    B: Broker + ?Sized,
{
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> EventResult<()> {
        (**self).publish(topic, payload).await
    }

    async fn flush(&self) -> EventResult<()> {
        (**self).flush().await
    }
}

#[async_trait]
impl Broker for NatsClient {
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> EventResult<()> {
        self.publish_bytes(topic, payload).await
    }

    async fn flush(&self) -> EventResult<()> {
        NatsClient::flush(self).await
    }
}

/// Best-effort sink publishing to a broker
pub struct NetworkSink<B> {
    broker: B,
    namespace: String,
    closed: AtomicBool,
    failed: AtomicU64,
}

impl<B: Broker> NetworkSink<B> {
    /// Create a sink publishing under `namespace`
    pub fn new(broker: B, namespace: impl Into<String>) -> EventResult<Self> {
        let namespace = namespace.into();
        validate_namespace(&namespace)?;

        Ok(Self {
            broker,
            namespace,
            closed: AtomicBool::new(false),
            failed: AtomicU64::new(0),
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Number of envelopes that could not be delivered
    pub fn failed_deliveries(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }

    pub fn broker(&self) -> &B {
        &self.broker
    }

    async fn deliver(&self, envelope: &EventEnvelope) {
        let topic = topic_for(&self.namespace, envelope.kind());

        let payload = match envelope
            .to_canonical_map()
            .and_then(|map| Ok(serde_json::to_vec(&map)?))
        {
            Ok(payload) => payload,
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    event_id = %envelope.event_id(),
                    topic = %topic,
                    error = %e,
                    "Failed to serialize event for network sink"
                );
                return;
            }
        };

        match self.broker.publish(&topic, payload).await {
            Ok(()) => debug!(event_id = %envelope.event_id(), topic = %topic, "Published event"),
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(
                    event_id = %envelope.event_id(),
                    topic = %topic,
                    error = %e,
                    "Network sink delivery failed"
                );
            }
        }
    }
}

#[async_trait]
impl<B: Broker> EventSink for NetworkSink<B> {
    fn name(&self) -> &str {
        "network"
    }

    async fn publish(&self, envelope: &EventEnvelope) -> EventResult<()> {
        if self.closed.load(Ordering::Acquire) {
            warn!(event_id = %envelope.event_id(), "Network sink closed, event dropped");
            return Ok(());
        }
        self.deliver(envelope).await;
        Ok(())
    }

    async fn publish_batch(&self, envelopes: &[EventEnvelope]) -> EventResult<()> {
        if self.closed.load(Ordering::Acquire) {
            warn!(count = envelopes.len(), "Network sink closed, batch dropped");
            return Ok(());
        }
        for envelope in envelopes {
            self.deliver(envelope).await;
        }
        if let Err(e) = self.broker.flush().await {
            warn!(error = %e, "Network sink flush failed");
        }
        Ok(())
    }

    async fn close(&self) -> EventResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        if let Err(e) = self.broker.flush().await {
            warn!(error = %e, "Network sink flush on close failed");
        }
        debug!(namespace = %self.namespace, "Network sink closed");
        Ok(())
    }
}
