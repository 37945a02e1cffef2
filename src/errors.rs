// Copyright (c) 2025 - Cowboy AI, Inc.
//! Error types for the event bus, sinks, CQRS and event sourcing layers

use thiserror::Error;
use uuid::Uuid;

/// A single sink that failed while a composite was delivering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkFailure {
    /// Name of the failing sink
    pub sink: String,
    /// Rendered error
    pub error: String,
}

/// Errors that can occur while publishing, dispatching or storing events
#[derive(Debug, Error)]
pub enum EventError {
    /// No command or query handler is registered for a kind
    #[error("No handler registered for kind '{kind}'")]
    HandlerNotFound { kind: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A single sink could not deliver
    #[error("Sink delivery error: {0}")]
    SinkDelivery(String),

    /// Every delivery path of a sink failed
    #[error("All {} sink(s) failed to deliver", failures.len())]
    SinksExhausted { failures: Vec<SinkFailure> },

    /// A command handler failed; the original error is preserved
    #[error("Command '{kind}' failed: {source}")]
    Command {
        kind: String,
        #[source]
        source: CommandError,
    },

    /// Re-entrant publish went deeper than the configured limit
    #[error("Dispatch depth {depth} exceeds limit {limit}")]
    DispatchDepthExceeded { depth: usize, limit: usize },

    /// An ordered publish stopped part-way; only the first `published` went out
    #[error("Published {published} of {total} events, stopped at {failed_event_id}: {source}")]
    PublishIncomplete {
        published: usize,
        total: usize,
        failed_event_id: Uuid,
        #[source]
        source: Box<EventError>,
    },

    /// Event store error
    #[error("Event store error: {0}")]
    EventStore(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// NATS connection error
    #[error("NATS connection error: {0}")]
    NatsConnection(String),

    /// NATS publish error
    #[error("NATS publish error: {0}")]
    NatsPublish(String),
}

/// Result type for event operations
pub type EventResult<T> = Result<T, EventError>;

impl From<serde_json::Error> for EventError {
    fn from(err: serde_json::Error) -> Self {
        EventError::Serialization(err.to_string())
    }
}

impl From<async_nats::Error> for EventError {
    fn from(err: async_nats::Error) -> Self {
        EventError::NatsConnection(err.to_string())
    }
}

/// Error returned by command and query handlers
#[derive(Debug, Error)]
pub enum CommandError {
    /// The command payload did not pass validation
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The command was understood but refused by a business rule
    #[error("Command rejected: {0}")]
    Rejected(String),

    /// The command conflicts with current state
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Any other failure inside the handler
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl CommandError {
    /// Stable name of the error variant, recorded on failure events
    pub fn error_type(&self) -> &'static str {
        match self {
            CommandError::Validation(_) => "validation",
            CommandError::Rejected(_) => "rejected",
            CommandError::Conflict(_) => "conflict",
            CommandError::Internal(_) => "internal",
        }
    }
}
