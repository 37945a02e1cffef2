// Copyright (c) 2025 - Cowboy AI, Inc.
//! NATS JetStream Event Store Implementation
//!
//! Each aggregate's log lives on its own subject (`aggregates.{id}`) inside a
//! single stream. Loading creates an ephemeral pull consumer filtered to that
//! subject and drains it in bounded batches.

use async_nats::jetstream::{self, stream::Stream};
use async_trait::async_trait;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::{EventError, EventResult};
use crate::event_store::EventStore;
use crate::events::EventEnvelope;
use crate::jetstream::{create_event_stream, JetStreamConfig};
use crate::nats::{NatsClient, NatsConfig};
use crate::subjects::aggregate_subject;

/// Fetch batch size when draining an aggregate's subject
const BATCH_SIZE: usize = 10_000;

/// How long a fetch waits before an empty subject counts as drained
const FETCH_EXPIRY: Duration = Duration::from_secs(2);

/// Record written to JetStream for every stored envelope
///
/// The raw aggregate ID is kept alongside the envelope because subject
/// sanitisation can map distinct IDs onto the same subject token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub aggregate_id: String,
    pub envelope: EventEnvelope,
}

/// NATS JetStream-backed event store
///
/// # Example
///
/// ```rust,no_run
/// use ecosystem_events::event_store::NatsEventStore;
/// use ecosystem_events::nats::NatsConfig;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = NatsEventStore::connect(&NatsConfig::default()).await?;
///     // Use store...
///     Ok(())
/// }
/// ```
pub struct NatsEventStore {
    jetstream: jetstream::Context,
    stream: Stream,
    subject_prefix: String,
    /// Serialises appends so batches from this process never interleave
    append_lock: Mutex<()>,
}

impl NatsEventStore {
    /// Connect to NATS and create or reuse the default aggregate stream
    pub async fn connect(config: &NatsConfig) -> EventResult<Self> {
        Self::connect_with_config(config, JetStreamConfig::default()).await
    }

    /// Connect with a custom stream configuration
    pub async fn connect_with_config(
        config: &NatsConfig,
        stream_config: JetStreamConfig,
    ) -> EventResult<Self> {
        let client = NatsClient::new(config).await?;
        Self::from_client(&client, stream_config).await
    }

    /// Build the store on an already connected client
    pub async fn from_client(
        client: &NatsClient,
        stream_config: JetStreamConfig,
    ) -> EventResult<Self> {
        let jetstream = jetstream::new(client.inner().clone());
        let stream = create_event_stream(&jetstream, &stream_config).await?;

        Ok(Self {
            jetstream,
            stream,
            subject_prefix: stream_config.subject_prefix,
            append_lock: Mutex::new(()),
        })
    }

    fn subject(&self, aggregate_id: &str) -> String {
        aggregate_subject(&self.subject_prefix, aggregate_id)
    }
}

#[async_trait]
impl EventStore for NatsEventStore {
    async fn save(&self, aggregate_id: &str, events: &[EventEnvelope]) -> EventResult<()> {
        if events.is_empty() {
            return Ok(());
        }

        let subject = self.subject(aggregate_id);
        let _guard = self.append_lock.lock().await;

        for envelope in events {
            let stored = StoredEvent {
                aggregate_id: aggregate_id.to_string(),
                envelope: envelope.clone(),
            };
            let payload = serde_json::to_vec(&stored)?;

            // Wait for the server ack so order on the stream matches order here
            self.jetstream
                .publish(subject.clone(), payload.into())
                .await
                .map_err(|e| EventError::EventStore(e.to_string()))?
                .await
                .map_err(|e| EventError::EventStore(e.to_string()))?;
        }

        debug!(
            aggregate_id = %aggregate_id,
            count = events.len(),
            "Appended events to JetStream"
        );
        Ok(())
    }

    async fn load(&self, aggregate_id: &str) -> EventResult<Vec<EventEnvelope>> {
        let consumer = self
            .stream
            .create_consumer(jetstream::consumer::pull::Config {
                filter_subject: self.subject(aggregate_id),
                ..Default::default()
            })
            .await
            .map_err(|e| EventError::EventStore(e.to_string()))?;

        let mut events = Vec::new();

        loop {
            let messages_result = consumer
                .fetch()
                .max_messages(BATCH_SIZE)
                .expires(FETCH_EXPIRY)
                .messages()
                .await;

            // A timeout on an empty subject means the log is drained
            let mut messages = match messages_result {
                Ok(msgs) => msgs,
                Err(e) => {
                    let err_msg = e.to_string().to_lowercase();
                    if err_msg.contains("timeout")
                        || err_msg.contains("timed out")
                        || err_msg.contains("no messages")
                    {
                        break;
                    }
                    return Err(EventError::EventStore(e.to_string()));
                }
            };

            let mut batch_count = 0;

            while let Some(message) = messages.next().await {
                let msg = message.map_err(|e| EventError::EventStore(e.to_string()))?;

                let stored: StoredEvent = serde_json::from_slice(&msg.payload)?;
                if stored.aggregate_id == aggregate_id {
                    events.push(stored.envelope);
                }

                msg.ack()
                    .await
                    .map_err(|e| EventError::EventStore(e.to_string()))?;

                batch_count += 1;
            }

            if batch_count < BATCH_SIZE {
                break;
            }
        }

        Ok(events)
    }
}
