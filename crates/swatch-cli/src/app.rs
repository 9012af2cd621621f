//! Opening and persisting the working state behind every command.
//!
//! A command opens the collection and session files named by the resolved
//! config, builds a [`Workspace`] from them and, when it changed anything,
//! writes the session (and for `save`, the collection) back.

use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

use swatch_core::Workspace;
use swatch_core::collection::Collection;
use swatch_core::session_file::SessionFile;
use swatch_core::tools::{ToolOutput, ToolRegistry, default_registry};
use swatch_core::workspace::TurnCommit;

use crate::config::SwatchConfig;

pub struct App {
    pub config: SwatchConfig,
    pub collection: Collection,
    pub workspace: Workspace,
    registry: ToolRegistry,
}

impl App {
    /// Load the collection and session files. A missing session file starts
    /// an empty session; a missing collection file is an error.
    pub fn open(config: SwatchConfig) -> Result<Self> {
        let collection = Collection::load(&config.collection_path).with_context(|| {
            format!(
                "cannot open collection; pass --collection or set {}",
                crate::config::COLLECTION_ENV
            )
        })?;
        let session = SessionFile::load_or_default(&config.session_path)
            .context("failed to load session file")?;

        let workspace = Workspace::new(collection.items.clone(), config.year).with_session(session);
        Ok(Self {
            config,
            collection,
            workspace,
            registry: default_registry(),
        })
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Run one tool call as its own turn and commit it.
    ///
    /// Returns the tool output and whether the live state changed.
    pub fn run_tool(&mut self, name: &str, params: Value) -> (ToolOutput, bool) {
        let mut turn = self.workspace.begin_turn();
        let output = self.registry.invoke(&mut turn, name, params);
        let commit = self.workspace.commit_turn(turn);
        debug!(tool = name, success = output.success, ?commit, "tool command finished");
        (output, matches!(commit, TurnCommit::Applied { .. }))
    }

    /// Write the session layer and themes to the session file.
    pub fn save_session(&self) -> Result<()> {
        self.workspace
            .session_file()
            .save(&self.config.session_path)
            .context("failed to write session file")
    }

    /// Write the workspace's items, with any updated comments, back to the
    /// collection file in its original shape.
    pub fn save_collection(&mut self) -> Result<()> {
        self.collection.items = self.workspace.items().to_vec();
        self.collection
            .save(&self.config.collection_path)
            .context("failed to write collection file")
    }
}
