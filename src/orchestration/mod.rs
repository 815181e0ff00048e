//! Decomposition and assignment orchestration.
//!
//! Splits oversized blueprints into ordered subtasks, routes each piece
//! through the routing engine, and tracks assignment progress through to
//! completion and outcome feedback.

pub mod decompose;
pub mod orchestrator;

pub use decompose::{DecompositionPlanner, DecompositionResult, DecompositionStrategy};
pub use orchestrator::{AssignmentEvent, AssignmentOrchestrator, MetricsSnapshot};
