//! NATS client abstraction used by the network sink and the JetStream store

use async_nats::{Client, ConnectOptions};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info};

use crate::errors::{EventError, EventResult};

/// Configuration for NATS connection
#[derive(Debug, Clone, PartialEq)]
pub struct NatsConfig {
    /// NATS server URLs
    pub servers: Vec<String>,
    /// Client name
    pub name: String,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for NatsConfig {
    fn default() -> Self {
        Self {
            servers: vec!["nats://localhost:4222".to_string()],
            name: "ecosystem-events".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(5),
        }
    }
}

/// NATS client wrapper
#[derive(Clone)]
pub struct NatsClient {
    client: Client,
}

impl NatsClient {
    /// Create a new NATS client with the given configuration
    pub async fn new(config: &NatsConfig) -> EventResult<Self> {
        let connect_options = ConnectOptions::new()
            .name(&config.name)
            .connection_timeout(config.connect_timeout)
            .request_timeout(Some(config.request_timeout));

        let client = async_nats::connect_with_options(config.servers.join(","), connect_options)
            .await
            .map_err(|e| EventError::NatsConnection(e.to_string()))?;

        info!("Connected to NATS at {:?}", config.servers);

        Ok(Self { client })
    }

    /// Publish a serializable message to a subject
    pub async fn publish<T>(&self, subject: &str, message: &T) -> EventResult<()>
    where
        T: Serialize,
    {
        let payload = serde_json::to_vec(message)?;
        self.publish_bytes(subject, payload).await
    }

    /// Publish an already encoded payload to a subject
    pub async fn publish_bytes(&self, subject: &str, payload: Vec<u8>) -> EventResult<()> {
        self.client
            .publish(subject.to_string(), payload.into())
            .await
            .map_err(|e| EventError::NatsPublish(e.to_string()))?;

        debug!("Published message to subject: {}", subject);
        Ok(())
    }

    /// Flush buffered publishes to the server
    pub async fn flush(&self) -> EventResult<()> {
        self.client
            .flush()
            .await
            .map_err(|e| EventError::NatsPublish(e.to_string()))
    }

    /// Get the underlying NATS client for advanced operations
    pub fn inner(&self) -> &Client {
        &self.client
    }
}
