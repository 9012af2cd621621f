//! The agent turn loop.

use anyhow::Result;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::tools::ToolRegistry;
use crate::workspace::{TurnCommit, Workspace};

use super::prompt::system_prompt;
use super::trait_def::AgentProvider;
use super::types::{ToolCallResult, TurnRequest};

/// Upper bound on turns per run, so a looping provider cannot spin forever.
pub const DEFAULT_MAX_TURNS: usize = 25;

/// What happened in one turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnRecord {
    pub turn_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub results: Vec<ToolCallResult>,
    pub committed: bool,
}

/// Summary of a full run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub turns: Vec<TurnRecord>,
    /// The run stopped at the turn limit rather than on the provider's
    /// request.
    pub truncated: bool,
}

impl RunReport {
    pub fn tool_calls(&self) -> usize {
        self.turns.iter().map(|t| t.results.len()).sum()
    }

    pub fn failed_calls(&self) -> usize {
        self.turns
            .iter()
            .flat_map(|t| &t.results)
            .filter(|r| !r.output.success)
            .count()
    }
}

/// Drives a provider against a workspace through the tool registry.
#[derive(Debug)]
pub struct AgentRunner {
    registry: ToolRegistry,
    max_turns: usize,
}

impl AgentRunner {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    pub fn with_max_turns(mut self, max_turns: usize) -> Self {
        self.max_turns = max_turns;
        self
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run turns until the provider stops or the turn limit is reached.
    ///
    /// Each turn works on its own snapshot, committed before the next turn
    /// starts.
    pub async fn run(
        &self,
        workspace: &mut Workspace,
        provider: &mut dyn AgentProvider,
        user_message: &str,
    ) -> Result<RunReport> {
        let mut report = RunReport::default();
        let mut previous_results = Vec::new();

        for turn in 0..self.max_turns {
            let request = TurnRequest {
                system_prompt: system_prompt(workspace.items().len(), workspace.year()),
                user_message: user_message.to_string(),
                tools: self.registry.definitions(),
                previous_results: std::mem::take(&mut previous_results),
                turn,
            };

            let Some(agent_turn) = provider.next_turn(&request).await? else {
                info!(provider = provider.name(), turns = turn, "agent finished");
                return Ok(report);
            };

            let mut snapshot = workspace.begin_turn();
            let turn_id = snapshot.id();
            let results: Vec<ToolCallResult> = agent_turn
                .tool_calls
                .into_iter()
                .map(|call| {
                    let output =
                        self.registry
                            .invoke(&mut snapshot, &call.name, call.arguments.clone());
                    if !output.success {
                        info!(tool = %call.name, message = %output.message, "tool call refused");
                    }
                    ToolCallResult { call, output }
                })
                .collect();

            let committed = matches!(
                workspace.commit_turn(snapshot),
                TurnCommit::Applied { .. }
            );

            previous_results = results.clone();
            report.turns.push(TurnRecord {
                turn_id,
                message: agent_turn.message,
                results,
                committed,
            });
        }

        warn!(
            provider = provider.name(),
            max_turns = self.max_turns,
            "agent run stopped at the turn limit"
        );
        report.truncated = true;
        Ok(report)
    }
}
