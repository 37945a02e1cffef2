// Copyright (c) 2025 - Cowboy AI, Inc.
//! Kind-specific event payloads
//!
//! Each [`EventKind`] has exactly one payload struct. The structs carry only
//! business fields; identity, timing and correlation live on the envelope.
//!
//! Payloads are serialized internally tagged on `kind`, so a payload flattened
//! into an envelope yields the canonical wire map:
//!
//! ```text
//! { "event_id": "...", "kind": "analysis_completed", "occurred_at": "...",
//!   "correlation_id": null, "metadata": {}, "analysis_id": "an-1", ... }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::kind::EventKind;

/// Tagged union of every event payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventPayload {
    /// An analysis was requested for a document
    AnalysisRequested(AnalysisRequested),

    /// An analysis finished successfully
    AnalysisCompleted(AnalysisCompleted),

    /// An analysis finished with an error
    AnalysisFailed(AnalysisFailed),

    /// An analysis produced a finding
    FindingCreated(FindingCreated),

    /// A document was created
    DocumentCreated(DocumentCreated),

    /// A document went through a processing step
    DocumentProcessed(DocumentProcessed),

    /// A workflow was started
    WorkflowTriggered(WorkflowTriggered),

    /// A report was generated
    ReportGenerated(ReportGenerated),

    /// A service reported its health
    SystemHealthCheck(SystemHealthCheck),

    /// A command handler failed
    CommandFailed(CommandFailed),
}

impl EventPayload {
    /// Discriminator of this payload
    pub fn kind(&self) -> EventKind {
        match self {
            EventPayload::AnalysisRequested(_) => EventKind::AnalysisRequested,
            EventPayload::AnalysisCompleted(_) => EventKind::AnalysisCompleted,
            EventPayload::AnalysisFailed(_) => EventKind::AnalysisFailed,
            EventPayload::FindingCreated(_) => EventKind::FindingCreated,
            EventPayload::DocumentCreated(_) => EventKind::DocumentCreated,
            EventPayload::DocumentProcessed(_) => EventKind::DocumentProcessed,
            EventPayload::WorkflowTriggered(_) => EventKind::WorkflowTriggered,
            EventPayload::ReportGenerated(_) => EventKind::ReportGenerated,
            EventPayload::SystemHealthCheck(_) => EventKind::SystemHealthCheck,
            EventPayload::CommandFailed(_) => EventKind::CommandFailed,
        }
    }

    /// Document the payload refers to, when it has one
    pub fn document_id(&self) -> Option<&str> {
        match self {
            EventPayload::AnalysisRequested(e) => Some(&e.document_id),
            EventPayload::AnalysisCompleted(e) => Some(&e.document_id),
            EventPayload::AnalysisFailed(e) => Some(&e.document_id),
            EventPayload::FindingCreated(e) => Some(&e.document_id),
            EventPayload::DocumentCreated(e) => Some(&e.document_id),
            EventPayload::DocumentProcessed(e) => Some(&e.document_id),
            EventPayload::WorkflowTriggered(_)
            | EventPayload::ReportGenerated(_)
            | EventPayload::SystemHealthCheck(_)
            | EventPayload::CommandFailed(_) => None,
        }
    }
}

/// Analysis priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

/// Finding severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

/// Health status reported by a service
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    #[default]
    Healthy,
    Degraded,
    Unhealthy,
}

/// Analysis was requested for a document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequested {
    pub document_id: String,
    pub analysis_type: String,
    pub requested_by: String,
    #[serde(default)]
    pub priority: Priority,
    /// Free-form analyzer configuration
    #[serde(default)]
    pub configuration: Map<String, Value>,
}

/// Analysis completed successfully
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisCompleted {
    pub analysis_id: String,
    pub document_id: String,
    #[serde(default)]
    pub result: Value,
    /// Wall-clock execution time in seconds
    #[serde(default)]
    pub execution_time: f64,
    #[serde(default)]
    pub findings_count: u32,
}

/// Analysis failed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisFailed {
    pub analysis_id: String,
    pub document_id: String,
    pub error_message: String,
    #[serde(default)]
    pub error_type: String,
    #[serde(default)]
    pub retry_count: u32,
}

/// Analysis produced a finding
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FindingCreated {
    pub finding_id: String,
    pub analysis_id: String,
    pub document_id: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

/// Document was created
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentCreated {
    pub document_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub created_by: String,
}

/// Document went through a processing step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentProcessed {
    pub document_id: String,
    pub processing_type: String,
    pub status: String,
    /// Processing time in seconds
    #[serde(default)]
    pub processing_time: f64,
}

/// Workflow was triggered
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTriggered {
    pub workflow_id: String,
    pub workflow_type: String,
    pub trigger_source: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

/// Report was generated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportGenerated {
    pub report_id: String,
    pub report_type: String,
    #[serde(default)]
    pub document_ids: Vec<String>,
    #[serde(default)]
    pub generated_by: String,
    #[serde(default)]
    pub format: String,
}

/// Service health snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemHealthCheck {
    pub service_name: String,
    #[serde(default)]
    pub status: HealthStatus,
    /// Response time in milliseconds
    #[serde(default)]
    pub response_time: f64,
    #[serde(default)]
    pub details: Map<String, Value>,
}

/// Command handler failed
///
/// Published by the CQRS layer before the error is returned to the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandFailed {
    pub command_id: String,
    pub command_kind: String,
    pub error_type: String,
    pub error_message: String,
}

macro_rules! impl_into_payload {
    ($($variant:ident),* $(,)?) => {
        $(
            impl From<$variant> for EventPayload {
                fn from(payload: $variant) -> Self {
                    EventPayload::$variant(payload)
                }
            }
        )*
    };
}

impl_into_payload!(
    AnalysisRequested,
    AnalysisCompleted,
    AnalysisFailed,
    FindingCreated,
    DocumentCreated,
    DocumentProcessed,
    WorkflowTriggered,
    ReportGenerated,
    SystemHealthCheck,
    CommandFailed,
);
