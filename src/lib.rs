// Copyright (c) 2025 - Cowboy AI, Inc.
//! # Ecosystem Events
//!
//! Event-driven communication shared by the ecosystem's services.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │ CqrsIntegration              │   │ EventSourcingIntegration     │
//! │ command → events (in order)  │   │ append log → publish → replay│
//! └──────────────┬───────────────┘   └──────────────┬───────────────┘
//!                └───────────────┬──────────────────┘
//!                                ▼
//!                ┌───────────────────────────────┐
//!                │ EventBus                      │
//!                │ sink delivery + handler fan-out│
//!                └───────┬───────────────┬───────┘
//!                        ▼               ▼
//!                  EventSink       Dispatcher ──► EventHandler × N (concurrent)
//!            (memory | network | composite)
//! ```
//!
//! ## Guarantees
//!
//! - Every handler subscribed to a kind runs exactly once per publish, and a
//!   failing or panicking handler never affects its siblings or the caller.
//! - Events produced by one command, and events replayed for one aggregate,
//!   keep their order.
//! - A composite sink delivers if any member delivers.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use ecosystem_events::{EventBus, EventEnvelope, EventKind, FnEventHandler, InMemorySink};
//! use ecosystem_events::events::DocumentCreated;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let bus = EventBus::new(Arc::new(InMemorySink::new()));
//!     bus.subscribe(Arc::new(FnEventHandler::new(
//!         "indexer",
//!         vec![EventKind::DocumentCreated],
//!         |event: EventEnvelope| async move {
//!             println!("indexing {}", event.event_id());
//!             Ok(())
//!         },
//!     )));
//!     bus.start();
//!
//!     let report = bus
//!         .publish(&EventEnvelope::new(DocumentCreated {
//!             document_id: "doc-1".into(),
//!             ..Default::default()
//!         }))
//!         .await?;
//!     assert!(report.is_clean());
//!
//!     bus.stop().await?;
//!     Ok(())
//! }
//! ```

pub mod bus;
pub mod config;
pub mod cqrs;
pub mod errors;
pub mod event_store;
pub mod events;
pub mod jetstream;
pub mod nats;
pub mod sink;
pub mod sourcing;
pub mod subjects;
pub mod telemetry;

// Re-export commonly used types
pub use bus::{DispatchReport, EventBus, EventHandler, FnEventHandler, HandlerFailure};
pub use config::EventBusConfig;
pub use cqrs::{Command, CommandHandler, CommandOutcome, CqrsIntegration, FnCommandHandler, Query};
pub use errors::{CommandError, EventError, EventResult};
pub use event_store::{EventStore, InMemoryEventStore, NatsEventStore};
pub use events::{EventEnvelope, EventKind, EventPayload};
pub use nats::{NatsClient, NatsConfig};
pub use sink::{CompositeSink, EventSink, InMemorySink, NetworkSink};
pub use sourcing::EventSourcingIntegration;
