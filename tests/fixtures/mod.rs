// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for ecosystem-events
//!
//! Deterministic envelopes and handler helpers shared by the integration
//! suites. All UUIDs and timestamps are fixed constants.
#![allow(dead_code)]

use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use ecosystem_events::events::{
    AnalysisCompleted, AnalysisRequested, DocumentCreated, DocumentProcessed, EventPayload,
    FindingCreated, Priority, Severity,
};
use ecosystem_events::{EventBus, EventEnvelope, EventHandler, EventKind, FnEventHandler, InMemorySink};

pub const EVENT_ID_1: &str = "01934f4a-0001-7000-8000-000000000001";
pub const EVENT_ID_2: &str = "01934f4a-0002-7000-8000-000000000002";
pub const EVENT_ID_3: &str = "01934f4a-0003-7000-8000-000000000003";

pub const DOCUMENT_ID: &str = "doc-42";
pub const AGGREGATE_ID: &str = "agg-42";
pub const CORRELATION_ID: &str = "corr-0001";

// Fixed test timestamp (2026-01-19T12:00:00Z)
pub const FIXED_TIMESTAMP: &str = "2026-01-19T12:00:00Z";

pub fn parse_uuid(s: &str) -> Uuid {
    Uuid::parse_str(s).expect("Invalid UUID in test fixture")
}

pub fn fixed_timestamp() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(FIXED_TIMESTAMP)
        .expect("Invalid timestamp in test fixture")
        .with_timezone(&Utc)
}

/// Envelope with fixed identity, `offset_secs` after the fixed timestamp
pub fn envelope(event_id: &str, offset_secs: i64, payload: impl Into<EventPayload>) -> EventEnvelope {
    EventEnvelope::from_parts(
        parse_uuid(event_id),
        fixed_timestamp() + Duration::seconds(offset_secs),
        Some(CORRELATION_ID.to_string()),
        BTreeMap::new(),
        payload.into(),
    )
}

pub fn analysis_requested() -> AnalysisRequested {
    AnalysisRequested {
        document_id: DOCUMENT_ID.into(),
        analysis_type: "compliance".into(),
        requested_by: "auditor".into(),
        priority: Priority::High,
        ..Default::default()
    }
}

pub fn analysis_completed() -> AnalysisCompleted {
    AnalysisCompleted {
        analysis_id: "analysis-1".into(),
        document_id: DOCUMENT_ID.into(),
        result: serde_json::json!({"score": 0.93}),
        execution_time: 1.25,
        findings_count: 1,
    }
}

pub fn finding_created() -> FindingCreated {
    FindingCreated {
        finding_id: "finding-1".into(),
        analysis_id: "analysis-1".into(),
        document_id: DOCUMENT_ID.into(),
        severity: Severity::Medium,
        category: "retention".into(),
        description: "Retention clause missing".into(),
    }
}

pub fn document_created() -> DocumentCreated {
    DocumentCreated {
        document_id: DOCUMENT_ID.into(),
        title: "Quarterly report".into(),
        created_by: "alice".into(),
    }
}

pub fn document_processed(step: &str) -> DocumentProcessed {
    DocumentProcessed {
        document_id: DOCUMENT_ID.into(),
        processing_type: step.into(),
        status: "ok".into(),
        processing_time: 0.5,
    }
}

/// Three ordered lifecycle events for [`AGGREGATE_ID`]
pub fn lifecycle() -> Vec<EventEnvelope> {
    vec![
        envelope(EVENT_ID_1, 0, document_created()),
        envelope(EVENT_ID_2, 1, document_processed("ocr")),
        envelope(EVENT_ID_3, 2, analysis_requested()),
    ]
}

/// Running bus over an in-memory sink
pub fn running_bus() -> (Arc<EventBus>, Arc<InMemorySink>) {
    let memory = Arc::new(InMemorySink::new());
    let bus = Arc::new(EventBus::new(memory.clone()));
    bus.start();
    (bus, memory)
}

/// Shared log of `(handler_id, event_id)` pairs
pub type CallLog = Arc<Mutex<Vec<(String, Uuid)>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// Handler that records every envelope it sees into `log`
pub fn recording_handler(id: &str, kinds: Vec<EventKind>, log: CallLog) -> Arc<dyn EventHandler> {
    let handler_id = id.to_string();
    Arc::new(FnEventHandler::new(id, kinds, move |event: EventEnvelope| {
        let log = log.clone();
        let handler_id = handler_id.clone();
        async move {
            log.lock().unwrap().push((handler_id, event.event_id()));
            Ok(())
        }
    }))
}

/// Handler that always fails
pub fn failing_handler(id: &str, kinds: Vec<EventKind>) -> Arc<dyn EventHandler> {
    Arc::new(FnEventHandler::new(id, kinds, |_event: EventEnvelope| async {
        Err::<(), _>(anyhow::anyhow!("handler refused the event"))
    }))
}

/// Handler that panics
pub fn panicking_handler(id: &str, kinds: Vec<EventKind>) -> Arc<dyn EventHandler> {
    Arc::new(FnEventHandler::new(id, kinds, |_event: EventEnvelope| async {
        if true {
            panic!("handler blew up");
        }
        Ok(())
    }))
}
