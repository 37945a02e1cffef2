// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for Aggregate Logs
//!
//! For any sequence of events saved in any batching, loading returns the
//! concatenation of the batches and replay visits it in the same order.

use proptest::prelude::*;
use uuid::Uuid;

use ecosystem_events::{EventEnvelope, EventSourcingIntegration};

use crate::fixtures::{document_processed, running_bus};

fn steps() -> impl Strategy<Value = Vec<Vec<String>>> {
    prop::collection::vec(prop::collection::vec("[a-z]{1,8}", 0..5), 0..6)
}

fn to_envelopes(batch: &[String]) -> Vec<EventEnvelope> {
    batch
        .iter()
        .map(|step| EventEnvelope::new(document_processed(step)))
        .collect()
}

proptest! {
    #[test]
    fn prop_load_returns_concatenated_batches(batches in steps()) {
        let (saved, loaded) = tokio_test::block_on(async {
            let (bus, _memory) = running_bus();
            let sourcing = EventSourcingIntegration::new(bus);

            let mut saved = Vec::new();
            for batch in &batches {
                let events = to_envelopes(batch);
                sourcing.save_events("agg-prop", &events).await.unwrap();
                saved.extend(events);
            }
            (saved, sourcing.load_events("agg-prop").await.unwrap())
        });

        prop_assert_eq!(loaded, saved);
    }

    #[test]
    fn prop_replay_matches_load_order(batches in steps()) {
        let (loaded, first, second) = tokio_test::block_on(async {
            let (bus, _memory) = running_bus();
            let sourcing = EventSourcingIntegration::new(bus);
            for batch in &batches {
                sourcing.save_events("agg-prop", &to_envelopes(batch)).await.unwrap();
            }

            let mut first: Vec<Uuid> = Vec::new();
            let mut second: Vec<Uuid> = Vec::new();
            sourcing.replay_events("agg-prop", |e| first.push(e.event_id())).await.unwrap();
            sourcing.replay_events("agg-prop", |e| second.push(e.event_id())).await.unwrap();

            let loaded: Vec<Uuid> = sourcing
                .load_events("agg-prop")
                .await
                .unwrap()
                .iter()
                .map(EventEnvelope::event_id)
                .collect();
            (loaded, first, second)
        });

        prop_assert_eq!(&first, &loaded);
        prop_assert_eq!(first, second);
    }
}
