//! The `AgentProvider` trait -- the seam behind which an LLM backend sits.
//!
//! Network-backed providers are async, so the trait is too. It is
//! object-safe and can be used as `Box<dyn AgentProvider>`.

use anyhow::Result;
use async_trait::async_trait;

use super::types::{AgentTurn, TurnRequest};

#[async_trait]
pub trait AgentProvider: Send {
    /// Human-readable provider name, for logs.
    fn name(&self) -> &str;

    /// Produce the next turn, or `None` when the agent is done.
    async fn next_turn(&mut self, request: &TurnRequest) -> Result<Option<AgentTurn>>;
}

// Compile-time assertion: AgentProvider must be object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn AgentProvider) {}
};
