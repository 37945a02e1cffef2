// Copyright (c) 2025 - Cowboy AI, Inc.

//! JetStream configuration and setup for aggregate event logs
//!
//! JetStream provides the durable backing for [`crate::event_store::NatsEventStore`]:
//! - **Persistent Streams**: aggregate logs survive restarts
//! - **Subject Filtering**: one subject per aggregate (`aggregates.{id}`)
//! - **Ordering Guarantees**: stream sequence numbers preserve append order
//!
//! # Example
//!
//! ```rust,no_run
//! use ecosystem_events::jetstream::{create_event_stream, JetStreamConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = async_nats::connect("nats://localhost:4222").await?;
//!     let jetstream = async_nats::jetstream::new(client);
//!
//!     let stream = create_event_stream(&jetstream, &JetStreamConfig::default()).await?;
//!
//!     Ok(())
//! }
//! ```

use async_nats::jetstream::{self, stream::Stream};
use std::time::Duration;

use crate::errors::{EventError, EventResult};
use crate::subjects::AGGREGATE_ROOT;

/// Configuration for the aggregate event stream
#[derive(Debug, Clone, PartialEq)]
pub struct JetStreamConfig {
    /// Stream name
    pub stream_name: String,

    /// Subject prefix for aggregate logs (stream captures `{prefix}.>`)
    pub subject_prefix: String,

    /// Maximum age of messages; zero keeps them forever
    pub max_age: Duration,

    /// Maximum bytes stored in stream (-1 for unlimited)
    pub max_bytes: i64,

    /// Storage type (File or Memory)
    pub storage: StorageType,

    /// Number of replicas (for clustered NATS)
    pub replicas: usize,
}

impl Default for JetStreamConfig {
    fn default() -> Self {
        Self {
            stream_name: "AGGREGATE_EVENTS".to_string(),
            subject_prefix: AGGREGATE_ROOT.to_string(),
            max_age: Duration::ZERO,
            max_bytes: -1,
            storage: StorageType::File,
            replicas: 1,
        }
    }
}

impl JetStreamConfig {
    /// Wildcard subject captured by the stream
    pub fn stream_subject(&self) -> String {
        format!("{}.>", self.subject_prefix)
    }
}

/// Storage type for JetStream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    /// File-based storage (persistent across restarts)
    File,
    /// Memory-based storage (faster, but lost on restart)
    Memory,
}

/// Create or update the aggregate event stream
///
/// Idempotent: the stream is created if missing and reused otherwise.
pub async fn create_event_stream(
    jetstream: &jetstream::Context,
    config: &JetStreamConfig,
) -> EventResult<Stream> {
    let storage = match config.storage {
        StorageType::File => jetstream::stream::StorageType::File,
        StorageType::Memory => jetstream::stream::StorageType::Memory,
    };

    let stream_config = jetstream::stream::Config {
        name: config.stream_name.clone(),
        subjects: vec![config.stream_subject()],
        max_age: config.max_age,
        max_bytes: config.max_bytes,
        storage,
        num_replicas: config.replicas,
        // Logs are append-only: limits retention, never work-queue deletion
        retention: jetstream::stream::RetentionPolicy::Limits,
        ..Default::default()
    };

    jetstream
        .get_or_create_stream(stream_config)
        .await
        .map_err(|e| EventError::NatsConnection(e.to_string()))
}
