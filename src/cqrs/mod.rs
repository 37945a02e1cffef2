// Copyright (c) 2025 - Cowboy AI, Inc.
//! CQRS Bridge
//!
//! Routes commands and queries to their handlers by `kind` and turns command
//! results into published events.
//!
//! ```text
//! Command ──► CommandHandler ──► CommandOutcome.events ──► EventBus (in order)
//!                    │
//!                    └─ error ──► CommandFailed event ──► EventBus, error returned
//! ```
//!
//! # Ordering
//!
//! Events produced by one command are its direct causal output, so they are
//! published one after another in the order the handler returned them. This
//! differs from handler fan-out, which has no ordering.
//!
//! # Registration
//!
//! One handler per kind. Registering a kind again silently replaces the
//! previous handler, which allows hot-swapping a handler at runtime.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};

use crate::bus::EventBus;
use crate::errors::{CommandError, EventError, EventResult};
use crate::events::{CommandFailed, EventEnvelope};

pub mod handlers;
pub mod messages;

pub use handlers::{CommandHandler, FnCommandHandler, FnQueryHandler, QueryHandler};
pub use messages::{Command, CommandOutcome, Query};

/// Command/query router publishing through an [`EventBus`]
pub struct CqrsIntegration {
    bus: Arc<EventBus>,
    command_handlers: RwLock<HashMap<String, Arc<dyn CommandHandler>>>,
    query_handlers: RwLock<HashMap<String, Arc<dyn QueryHandler>>>,
}

fn poisoned(registry: &str) -> EventError {
    EventError::Configuration(format!("{registry} handler registry poisoned"))
}

impl CqrsIntegration {
    pub fn new(bus: Arc<EventBus>) -> Self {
        Self {
            bus,
            command_handlers: RwLock::new(HashMap::new()),
            query_handlers: RwLock::new(HashMap::new()),
        }
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    /// Register the handler for a command kind, replacing any previous one
    pub fn register_command_handler(
        &self,
        kind: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> EventResult<()> {
        let kind = kind.into();
        let mut handlers = self
            .command_handlers
            .write()
            .map_err(|_| poisoned("command"))?;
        if handlers.insert(kind.clone(), handler).is_some() {
            debug!(kind = %kind, "Replaced command handler");
        } else {
            debug!(kind = %kind, "Registered command handler");
        }
        Ok(())
    }

    /// Register the handler for a query kind, replacing any previous one
    pub fn register_query_handler(
        &self,
        kind: impl Into<String>,
        handler: Arc<dyn QueryHandler>,
    ) -> EventResult<()> {
        let kind = kind.into();
        let mut handlers = self.query_handlers.write().map_err(|_| poisoned("query"))?;
        if handlers.insert(kind.clone(), handler).is_some() {
            debug!(kind = %kind, "Replaced query handler");
        }
        Ok(())
    }

    /// Registered command kinds, sorted
    pub fn command_kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self
            .command_handlers
            .read()
            .map(|handlers| handlers.keys().cloned().collect())
            .unwrap_or_default();
        kinds.sort();
        kinds
    }

    fn command_handler(&self, kind: &str) -> EventResult<Arc<dyn CommandHandler>> {
        self.command_handlers
            .read()
            .map_err(|_| poisoned("command"))?
            .get(kind)
            .cloned()
            .ok_or_else(|| EventError::HandlerNotFound {
                kind: kind.to_string(),
            })
    }

    fn query_handler(&self, kind: &str) -> EventResult<Arc<dyn QueryHandler>> {
        self.query_handlers
            .read()
            .map_err(|_| poisoned("query"))?
            .get(kind)
            .cloned()
            .ok_or_else(|| EventError::HandlerNotFound {
                kind: kind.to_string(),
            })
    }

    /// Run a command and publish what it produced
    ///
    /// On success every event in the outcome is published sequentially before
    /// this returns. Publishing stops at the first event the bus rejects and
    /// [`EventError::PublishIncomplete`] says how many went out.
    ///
    /// On handler failure a `command_failed` event is published (best-effort)
    /// and the handler's error is returned unchanged inside
    /// [`EventError::Command`].
    pub async fn handle_command(&self, command: &Command) -> EventResult<CommandOutcome> {
        let handler = self.command_handler(&command.kind)?;

        debug!(command_id = %command.command_id, kind = %command.kind, "Handling command");

        match handler.handle(command).await {
            Ok(outcome) => {
                self.bus.publish_sequence(&outcome.events).await?;
                info!(
                    command_id = %command.command_id,
                    kind = %command.kind,
                    events = outcome.events.len(),
                    "Command handled"
                );
                Ok(outcome)
            }
            Err(e) => {
                error!(
                    command_id = %command.command_id,
                    kind = %command.kind,
                    error = %e,
                    "Command handler failed"
                );
                self.publish_failure(command, &e).await;
                Err(EventError::Command {
                    kind: command.kind.clone(),
                    source: e,
                })
            }
        }
    }

    async fn publish_failure(&self, command: &Command, error: &CommandError) {
        let mut failure = EventEnvelope::new(CommandFailed {
            command_id: command.command_id.to_string(),
            command_kind: command.kind.clone(),
            error_type: error.error_type().to_string(),
            error_message: error.to_string(),
        });
        if let Some(correlation_id) = &command.correlation_id {
            failure = failure.with_correlation_id(correlation_id.clone());
        }

        if let Err(e) = self.bus.publish(&failure).await {
            warn!(
                command_id = %command.command_id,
                error = %e,
                "Could not publish command failure event"
            );
        }
    }

    /// Run a query; queries publish nothing
    pub async fn handle_query(&self, query: &Query) -> EventResult<serde_json::Value> {
        let handler = self.query_handler(&query.kind)?;
        debug!(query_id = %query.query_id, kind = %query.kind, "Handling query");

        handler
            .handle(query)
            .await
            .map_err(|source| EventError::Command {
                kind: query.kind.clone(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{DocumentCreated, EventKind};
    use crate::sink::InMemorySink;
    use serde_json::json;

    fn setup() -> (CqrsIntegration, Arc<InMemorySink>) {
        let memory = Arc::new(InMemorySink::new());
        let bus = Arc::new(EventBus::new(memory.clone()));
        bus.start();
        (CqrsIntegration::new(bus), memory)
    }

    #[tokio::test]
    async fn test_missing_handler_is_not_found() {
        let (cqrs, memory) = setup();

        let err = cqrs
            .handle_command(&Command::new("archive_document", json!({})))
            .await
            .unwrap_err();

        assert!(matches!(err, EventError::HandlerNotFound { kind } if kind == "archive_document"));
        assert!(memory.is_empty());
    }

    #[tokio::test]
    async fn test_reregistering_replaces_handler() {
        let (cqrs, memory) = setup();

        cqrs.register_command_handler(
            "create_document",
            Arc::new(FnCommandHandler::new(|_| async {
                Err(CommandError::Rejected("old handler".into()))
            })),
        )
        .unwrap();
        cqrs.register_command_handler(
            "create_document",
            Arc::new(FnCommandHandler::new(|_| async {
                Ok(CommandOutcome::with_events(vec![EventEnvelope::new(
                    DocumentCreated {
                        document_id: "doc-1".into(),
                        ..Default::default()
                    },
                )]))
            })),
        )
        .unwrap();

        cqrs.handle_command(&Command::new("create_document", json!({})))
            .await
            .unwrap();

        assert_eq!(cqrs.command_kinds(), vec!["create_document"]);
        assert_eq!(memory.events_of_kind(EventKind::DocumentCreated).len(), 1);
        assert!(memory.events_of_kind(EventKind::CommandFailed).is_empty());
    }

    #[tokio::test]
    async fn test_query_round_trip() {
        let (cqrs, memory) = setup();
        cqrs.register_query_handler(
            "count_documents",
            Arc::new(FnQueryHandler::new(|query: Query| async move {
                Ok(json!({"kind": query.kind, "count": 2}))
            })),
        )
        .unwrap();

        let value = cqrs
            .handle_query(&Query::new("count_documents", json!({})))
            .await
            .unwrap();

        assert_eq!(value["count"], 2);
        assert!(memory.is_empty());
        assert!(matches!(
            cqrs.handle_query(&Query::new("unknown", json!({}))).await,
            Err(EventError::HandlerNotFound { .. })
        ));
    }
}
