// Copyright (c) 2025 - Cowboy AI, Inc.

//! Topic and subject naming
//!
//! Network sinks publish each event on a topic derived from the bus namespace
//! and the event kind:
//!
//! ```text
//! {namespace}:{kind}
//! ```
//!
//! The JetStream event store keeps one subject per aggregate:
//!
//! ```text
//! {prefix}.{aggregate_id}
//! ```
//!
//! # Examples
//!
//! ```rust
//! use ecosystem_events::events::EventKind;
//! use ecosystem_events::subjects::{aggregate_subject, topic_for};
//!
//! assert_eq!(topic_for("events", EventKind::AnalysisCompleted), "events:analysis_completed");
//! assert_eq!(aggregate_subject("aggregates", "agg.42"), "aggregates.agg_42");
//! ```

use crate::errors::{EventError, EventResult};
use crate::events::EventKind;

/// Default namespace for bus topics
pub const DEFAULT_NAMESPACE: &str = "events";

/// Default subject prefix for aggregate logs
pub const AGGREGATE_ROOT: &str = "aggregates";

/// Topic for an event kind within a namespace
pub fn topic_for(namespace: &str, kind: EventKind) -> String {
    format!("{}:{}", namespace, kind.as_str())
}

/// Subject holding one aggregate's log
///
/// Characters that carry meaning in NATS subjects are replaced with `_` so an
/// aggregate ID always maps to exactly one token.
pub fn aggregate_subject(prefix: &str, aggregate_id: &str) -> String {
    let token: String = aggregate_id
        .chars()
        .map(|c| match c {
            '.' | '*' | '>' => '_',
            c if c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    format!("{}.{}", prefix, token)
}

/// Check that a namespace can be used as a topic prefix
pub fn validate_namespace(namespace: &str) -> EventResult<()> {
    if namespace.is_empty() {
        return Err(EventError::Configuration("namespace must not be empty".into()));
    }
    if namespace.chars().any(|c| c.is_whitespace() || c == '*' || c == '>') {
        return Err(EventError::Configuration(format!(
            "namespace '{}' contains whitespace or wildcard characters",
            namespace
        )));
    }
    Ok(())
}
