// Copyright (c) 2025 - Cowboy AI, Inc.
//! In-process event handlers

use async_trait::async_trait;
use std::future::Future;

use crate::events::{EventEnvelope, EventKind};

/// In-process subscriber reacting to envelopes of specific kinds
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Identity used for registration, unsubscription and failure reports
    fn handler_id(&self) -> &str;

    /// Kinds this handler wants to receive
    fn kinds(&self) -> Vec<EventKind>;

    /// Handle one envelope
    ///
    /// Errors are isolated by the dispatcher: they are logged and reported,
    /// never propagated to the publisher or to sibling handlers.
    async fn handle(&self, envelope: &EventEnvelope) -> anyhow::Result<()>;
}

/// Function-based event handler
pub struct FnEventHandler<F> {
    handler_id: String,
    kinds: Vec<EventKind>,
    handler: F,
}

impl<F, Fut> FnEventHandler<F>
where
    F: Fn(EventEnvelope) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    pub fn new(handler_id: impl Into<String>, kinds: impl Into<Vec<EventKind>>, handler: F) -> Self {
        Self {
            handler_id: handler_id.into(),
            kinds: kinds.into(),
            handler,
        }
    }
}

#[async_trait]
impl<F, Fut> EventHandler for FnEventHandler<F>
where
    F: Fn(EventEnvelope) -> Fut + Send + Sync,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    fn handler_id(&self) -> &str {
        &self.handler_id
    }

    fn kinds(&self) -> Vec<EventKind> {
        self.kinds.clone()
    }

    async fn handle(&self, envelope: &EventEnvelope) -> anyhow::Result<()> {
        (self.handler)(envelope.clone()).await
    }
}
