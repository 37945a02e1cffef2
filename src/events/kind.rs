// Copyright (c) 2025 - Cowboy AI, Inc.
//! Event kind discriminator

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::EventError;

/// Discriminator for every event the ecosystem publishes
///
/// The set is closed: adding a kind means adding a variant here and a
/// payload struct in [`super::payloads`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
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
}

impl EventKind {
    /// All kinds, in declaration order
    pub const ALL: [EventKind; 10] = [
        EventKind::AnalysisRequested,
        EventKind::AnalysisCompleted,
        EventKind::AnalysisFailed,
        EventKind::FindingCreated,
        EventKind::DocumentCreated,
        EventKind::DocumentProcessed,
        EventKind::WorkflowTriggered,
        EventKind::ReportGenerated,
        EventKind::SystemHealthCheck,
        EventKind::CommandFailed,
    ];

    /// Wire name of the kind
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::AnalysisRequested => "analysis_requested",
            EventKind::AnalysisCompleted => "analysis_completed",
            EventKind::AnalysisFailed => "analysis_failed",
            EventKind::FindingCreated => "finding_created",
            EventKind::DocumentCreated => "document_created",
            EventKind::DocumentProcessed => "document_processed",
            EventKind::WorkflowTriggered => "workflow_triggered",
            EventKind::ReportGenerated => "report_generated",
            EventKind::SystemHealthCheck => "system_health_check",
            EventKind::CommandFailed => "command_failed",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = EventError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EventError::Serialization(format!("unknown event kind '{s}'")))
    }
}
