// Copyright (c) 2025 - Cowboy AI, Inc.
//! Command and query handler traits

use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;

use super::messages::{Command, CommandOutcome, Query};
use crate::errors::CommandError;

/// Handles one command kind
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: &Command) -> Result<CommandOutcome, CommandError>;
}

/// Handles one query kind
#[async_trait]
pub trait QueryHandler: Send + Sync {
    async fn handle(&self, query: &Query) -> Result<Value, CommandError>;
}

/// Function-based command handler
pub struct FnCommandHandler<F> {
    handler: F,
}

impl<F, Fut> FnCommandHandler<F>
where
    F: Fn(Command) -> Fut + Send + Sync,
    Fut: Future<Output = Result<CommandOutcome, CommandError>> + Send,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F, Fut> CommandHandler for FnCommandHandler<F>
where
    F: Fn(Command) -> Fut + Send + Sync,
    Fut: Future<Output = Result<CommandOutcome, CommandError>> + Send,
{
    async fn handle(&self, command: &Command) -> Result<CommandOutcome, CommandError> {
        (self.handler)(command.clone()).await
    }
}

/// Function-based query handler
pub struct FnQueryHandler<F> {
    handler: F,
}

impl<F, Fut> FnQueryHandler<F>
where
    F: Fn(Query) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, CommandError>> + Send,
{
    pub fn new(handler: F) -> Self {
        Self { handler }
    }
}

#[async_trait]
impl<F, Fut> QueryHandler for FnQueryHandler<F>
where
    F: Fn(Query) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Value, CommandError>> + Send,
{
    async fn handle(&self, query: &Query) -> Result<Value, CommandError> {
        (self.handler)(query.clone()).await
    }
}
