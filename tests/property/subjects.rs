// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests for topic and subject naming

use proptest::prelude::*;

use ecosystem_events::subjects::{aggregate_subject, topic_for};
use ecosystem_events::EventKind;

proptest! {
    #[test]
    fn prop_aggregate_subject_is_single_token(id in "\\PC{1,24}") {
        let subject = aggregate_subject("aggregates", &id);
        let tokens: Vec<&str> = subject.split('.').collect();

        prop_assert_eq!(tokens.len(), 2);
        prop_assert_eq!(tokens[0], "aggregates");
        prop_assert!(!tokens[1].contains('*') && !tokens[1].contains('>'));
    }

    #[test]
    fn prop_topic_ends_with_kind(index in 0..EventKind::ALL.len()) {
        let kind = EventKind::ALL[index];
        let topic = topic_for("events", kind);

        prop_assert_eq!(topic, format!("events:{}", kind.as_str()));
    }
}
