// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event Model
//!
//! Every occurrence travelling through the bus is an [`EventEnvelope`]: an
//! immutable wrapper holding identity (`event_id`), timing (`occurred_at`),
//! correlation, open metadata and one strongly typed [`EventPayload`].
//!
//! # Event Principles
//!
//! 1. **Events are immutable**: an envelope is never edited after construction
//! 2. **Events are past tense**: `AnalysisCompleted`, not `CompleteAnalysis`
//! 3. **Kinds are closed**: new kinds are new variants of [`EventKind`]
//! 4. **Correlation**: `correlation_id` groups events of the same request flow
//!
//! # Module Organization
//!
//! - [`kind`] - Event kind discriminator
//! - [`payloads`] - Kind-specific payload structs
//! - [`envelope`] - The envelope wrapper and its canonical wire map

pub mod envelope;
pub mod kind;
pub mod payloads;

pub use envelope::EventEnvelope;
pub use kind::EventKind;
pub use payloads::{
    AnalysisCompleted, AnalysisFailed, AnalysisRequested, CommandFailed, DocumentCreated,
    DocumentProcessed, EventPayload, FindingCreated, HealthStatus, Priority, ReportGenerated,
    Severity, SystemHealthCheck, WorkflowTriggered,
};
