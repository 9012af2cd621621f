//! A provider that replays a fixed script of turns.
//!
//! The script is JSON, either a bare array of turns or `{"turns": [...]}`:
//!
//! ```json
//! [
//!   {"message": "Filling February",
//!    "tool_calls": [{"name": "bulk_assign_month",
//!                    "arguments": {"month": 2, "items": ["Kon-peki"]}}]},
//!   {"tool_calls": [{"name": "set_month_theme",
//!                    "arguments": {"month": 2, "theme": "Blues"}}]}
//! ]
//! ```

use std::collections::VecDeque;
use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::trait_def::AgentProvider;
use super::types::{AgentTurn, TurnRequest};

#[derive(Deserialize)]
#[serde(untagged)]
enum ScriptFile {
    Wrapped { turns: Vec<AgentTurn> },
    Bare(Vec<AgentTurn>),
}

/// Replays scripted turns in order, then ends the conversation.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    turns: VecDeque<AgentTurn>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<AgentTurn>) -> Self {
        Self {
            turns: turns.into(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let turns = match serde_json::from_str::<ScriptFile>(text)
            .context("agent script must be a list of turns or {\"turns\": [...]}")?
        {
            ScriptFile::Wrapped { turns } | ScriptFile::Bare(turns) => turns,
        };
        Ok(Self::new(turns))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read agent script {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid agent script {}", path.display()))
    }

    pub fn remaining(&self) -> usize {
        self.turns.len()
    }
}

#[async_trait]
impl AgentProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn next_turn(&mut self, request: &TurnRequest) -> Result<Option<AgentTurn>> {
        let turn = self.turns.pop_front();
        debug!(turn = request.turn, remaining = self.turns.len(), "scripted turn");
        Ok(turn)
    }
}
