// Copyright (c) 2025 - Cowboy AI, Inc.
//! Integration tests for the event bus
//!
//! Covers handler fan-out, failure isolation, sink interaction and lifecycle.

mod fixtures;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;

use ecosystem_events::errors::SinkFailure;
use ecosystem_events::{
    CompositeSink, EventBus, EventEnvelope, EventError, EventKind, EventResult, EventSink,
    FnEventHandler, InMemorySink,
};
use fixtures::*;

struct RejectingSink;

#[async_trait]
impl EventSink for RejectingSink {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn publish(&self, _envelope: &EventEnvelope) -> EventResult<()> {
        Err(EventError::SinkDelivery("broker unreachable".into()))
    }

    async fn close(&self) -> EventResult<()> {
        Ok(())
    }
}

/// Scenario: one failing handler among two healthy ones
#[tokio::test]
async fn test_failing_handler_does_not_affect_siblings() {
    let (bus, memory) = running_bus();
    let log = call_log();

    bus.subscribe(recording_handler("h1", vec![EventKind::AnalysisCompleted], log.clone()));
    bus.subscribe(failing_handler("h2", vec![EventKind::AnalysisCompleted]));
    bus.subscribe(recording_handler("h3", vec![EventKind::AnalysisCompleted], log.clone()));

    let event = envelope(EVENT_ID_1, 0, analysis_completed());
    let report = bus.publish(&event).await.expect("publish should succeed");

    let mut seen: Vec<String> = log.lock().unwrap().iter().map(|(id, _)| id.clone()).collect();
    seen.sort();
    assert_eq!(seen, vec!["h1", "h3"]);

    assert_eq!(report.handlers_invoked, 3);
    assert_eq!(report.succeeded(), 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].handler_id, "h2");
    assert_eq!(memory.events(), vec![event]);
}

#[tokio::test]
async fn test_each_handler_runs_exactly_once() {
    let (bus, _memory) = running_bus();
    let log = call_log();

    for id in ["a", "b", "c", "d"] {
        bus.subscribe(recording_handler(id, vec![EventKind::FindingCreated], log.clone()));
    }

    let event = envelope(EVENT_ID_2, 0, finding_created());
    bus.publish(&event).await.unwrap();

    let calls = log.lock().unwrap().clone();
    assert_eq!(calls.len(), 4);
    for id in ["a", "b", "c", "d"] {
        assert_eq!(calls.iter().filter(|(h, e)| h == id && *e == event.event_id()).count(), 1);
    }
}

#[tokio::test]
async fn test_panicking_handler_is_isolated() {
    let (bus, _memory) = running_bus();
    let log = call_log();

    bus.subscribe(panicking_handler("boom", vec![EventKind::DocumentCreated]));
    bus.subscribe(recording_handler("steady", vec![EventKind::DocumentCreated], log.clone()));

    let report = bus
        .publish(&envelope(EVENT_ID_1, 0, document_created()))
        .await
        .unwrap();

    assert_eq!(log.lock().unwrap().len(), 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].error, "handler panicked");
}

#[tokio::test]
async fn test_handlers_only_receive_their_kinds() {
    let (bus, _memory) = running_bus();
    let log = call_log();

    bus.subscribe(recording_handler("docs", vec![EventKind::DocumentCreated], log.clone()));

    bus.publish(&envelope(EVENT_ID_1, 0, finding_created())).await.unwrap();
    assert!(log.lock().unwrap().is_empty());

    bus.publish(&envelope(EVENT_ID_2, 1, document_created())).await.unwrap();
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_no_handlers_still_reaches_sink() {
    let (bus, memory) = running_bus();

    let report = bus
        .publish(&envelope(EVENT_ID_1, 0, analysis_requested()))
        .await
        .unwrap();

    assert!(report.delivered);
    assert_eq!(report.handlers_invoked, 0);
    assert_eq!(memory.len(), 1);
}

#[tokio::test]
async fn test_stopped_bus_drops_events() {
    let memory = Arc::new(InMemorySink::new());
    let bus = EventBus::new(memory.clone());
    let log = call_log();
    bus.subscribe(recording_handler("h", vec![EventKind::DocumentCreated], log.clone()));

    let report = bus
        .publish(&envelope(EVENT_ID_1, 0, document_created()))
        .await
        .unwrap();

    assert!(!report.delivered);
    assert!(memory.is_empty());
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unsubscribe_stops_delivery() {
    let (bus, _memory) = running_bus();
    let log = call_log();
    bus.subscribe(recording_handler("h", vec![EventKind::DocumentCreated], log.clone()));

    assert!(bus.unsubscribe("h"));
    assert!(!bus.unsubscribe("h"));
    assert_eq!(bus.handler_count(EventKind::DocumentCreated), 0);

    bus.publish(&envelope(EVENT_ID_1, 0, document_created())).await.unwrap();
    assert!(log.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_exhausted_sink_still_dispatches() {
    let sink: Arc<dyn EventSink> = Arc::new(RejectingSink);
    let bus = EventBus::new(sink);
    bus.start();
    let log = call_log();
    bus.subscribe(recording_handler("h", vec![EventKind::DocumentCreated], log.clone()));

    let result = bus.publish(&envelope(EVENT_ID_1, 0, document_created())).await;

    assert!(matches!(result, Err(EventError::SinkDelivery(_))));
    assert_eq!(log.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_composite_partial_failure_is_success() {
    let memory = Arc::new(InMemorySink::new());
    let broken: Arc<dyn EventSink> = Arc::new(RejectingSink);
    let healthy: Arc<dyn EventSink> = memory.clone();
    let sinks = vec![broken, healthy];
    let bus = EventBus::new(Arc::new(CompositeSink::new(sinks)));
    bus.start();

    bus.publish(&envelope(EVENT_ID_1, 0, document_created()))
        .await
        .expect("one healthy member is enough");

    assert_eq!(memory.len(), 1);
}

#[tokio::test]
async fn test_composite_total_failure_lists_members() {
    let first: Arc<dyn EventSink> = Arc::new(RejectingSink);
    let second: Arc<dyn EventSink> = Arc::new(RejectingSink);
    let sinks = vec![first, second];
    let bus = EventBus::new(Arc::new(CompositeSink::new(sinks)));
    bus.start();

    let err = bus
        .publish(&envelope(EVENT_ID_1, 0, document_created()))
        .await
        .unwrap_err();

    match err {
        EventError::SinksExhausted { failures } => {
            assert_eq!(failures.len(), 2);
            assert!(failures.iter().all(|f: &SinkFailure| f.sink == "rejecting"));
        }
        other => panic!("expected SinksExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn test_publish_batch_dispatches_each_envelope() {
    let (bus, memory) = running_bus();
    let log = call_log();
    bus.subscribe(recording_handler(
        "h",
        vec![EventKind::DocumentCreated, EventKind::DocumentProcessed],
        log.clone(),
    ));

    let events = lifecycle();
    let reports = bus.publish_batch(&events).await.unwrap();

    assert_eq!(reports.len(), 3);
    assert_eq!(memory.events(), events);
    // The third envelope is an analysis request, which "h" did not subscribe to
    assert_eq!(log.lock().unwrap().len(), 2);
    assert_eq!(reports[2].handlers_invoked, 0);
}

#[tokio::test]
async fn test_handler_can_publish_follow_up_event() {
    let (bus, memory) = running_bus();
    let inner = Arc::downgrade(&bus);

    bus.subscribe(Arc::new(FnEventHandler::new(
        "analyzer",
        vec![EventKind::AnalysisRequested],
        move |_event: EventEnvelope| {
            let bus = inner.clone();
            async move {
                if let Some(bus) = bus.upgrade() {
                    bus.publish(&EventEnvelope::new(analysis_completed())).await?;
                }
                Ok(())
            }
        },
    )));

    let report = bus
        .publish(&envelope(EVENT_ID_1, 0, analysis_requested()))
        .await
        .unwrap();

    assert!(report.is_clean());
    assert_eq!(memory.events_of_kind(EventKind::AnalysisCompleted).len(), 1);
}

#[tokio::test]
async fn test_publish_batch_dispatches_despite_sink_failure() {
    let sink: Arc<dyn EventSink> = Arc::new(RejectingSink);
    let bus = EventBus::new(sink);
    bus.start();
    let log = call_log();
    bus.subscribe(recording_handler(
        "h",
        vec![
            EventKind::DocumentCreated,
            EventKind::DocumentProcessed,
            EventKind::AnalysisRequested,
        ],
        log.clone(),
    ));

    let events = lifecycle();
    let result = bus.publish_batch(&events).await;

    assert!(matches!(result, Err(EventError::SinkDelivery(_))));
    let seen: Vec<_> = log.lock().unwrap().iter().map(|(_, id)| *id).collect();
    let expected: Vec<_> = events.iter().map(EventEnvelope::event_id).collect();
    assert_eq!(seen, expected);
}

#[tokio::test]
async fn test_stop_drains_handlers_of_cancelled_publish() {
    let (bus, _memory) = running_bus();
    let finished = Arc::new(AtomicBool::new(false));

    let flag = finished.clone();
    bus.subscribe(Arc::new(FnEventHandler::new(
        "slow",
        vec![EventKind::DocumentCreated],
        move |_event: EventEnvelope| {
            let flag = flag.clone();
            async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            }
        },
    )));

    let event = envelope(EVENT_ID_1, 0, document_created());
    let timed_out = tokio::time::timeout(Duration::from_millis(20), bus.publish(&event)).await;
    assert!(timed_out.is_err(), "publish should outlive the timeout");

    bus.stop().await.unwrap();
    assert!(finished.load(Ordering::SeqCst));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_subscription_churn_during_dispatch() {
    let (bus, memory) = running_bus();
    let log = call_log();
    bus.subscribe(recording_handler("stable", vec![EventKind::DocumentCreated], log.clone()));

    let churn = {
        let bus = bus.clone();
        tokio::spawn(async move {
            for round in 0..200 {
                let id = format!("transient-{round}");
                bus.subscribe(recording_handler(&id, vec![EventKind::DocumentCreated], call_log()));
                tokio::task::yield_now().await;
                assert!(bus.unsubscribe(&id));
            }
        })
    };

    let publishers: Vec<_> = (0..4)
        .map(|_| {
            let bus = bus.clone();
            tokio::spawn(async move {
                for _ in 0..25 {
                    bus.publish(&EventEnvelope::new(document_created())).await?;
                }
                Ok::<_, EventError>(())
            })
        })
        .collect();

    for publisher in publishers {
        publisher.await.unwrap().unwrap();
    }
    churn.await.unwrap();

    let stable_calls = log.lock().unwrap().iter().filter(|(h, _)| h == "stable").count();
    assert_eq!(stable_calls, 100);
    assert_eq!(memory.len(), 100);
    assert_eq!(bus.handler_count(EventKind::DocumentCreated), 1);
}

