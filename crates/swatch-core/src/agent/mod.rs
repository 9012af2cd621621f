//! Agent provider seam and the turn loop that drives the tool facade.
//!
//! ```text
//! AgentRunner::run
//!     |
//!     +--> AgentProvider::next_turn(request) --> AgentTurn { tool_calls }
//!     |         (None ends the conversation)
//!     |
//!     +--> Workspace::begin_turn --> ToolRegistry::invoke per call
//!     |
//!     +--> Workspace::commit_turn
//! ```

pub mod prompt;
pub mod runner;
pub mod scripted;
pub mod trait_def;
pub mod types;

pub use prompt::system_prompt;
pub use runner::{AgentRunner, RunReport, TurnRecord};
pub use scripted::ScriptedProvider;
pub use trait_def::AgentProvider;
pub use types::{AgentTurn, ToolCall, ToolCallResult, TurnRequest};
