//! Swatch calendar engine.
//!
//! Assigns collection items (ink samples) to the days of a year over two
//! layers: a read-only persisted layer derived from metadata embedded in
//! each item's private comment, and an editable session layer. The
//! [`engine`] is a pure reducer over those layers, [`tools`] exposes it to
//! an LLM agent, and [`workspace`] holds the live state both go through.

pub mod agent;
pub mod codec;
pub mod collection;
pub mod engine;
pub mod model;
pub mod session_file;
pub mod store;
pub mod theme;
pub mod tools;
pub mod workspace;

pub use engine::{ErrorKind, MutationEngine, MutationResult, Operation, OperationKind};
pub use model::{Assignments, Item, ItemIndex, MonthKey};
pub use workspace::{TurnSnapshot, Workspace};
