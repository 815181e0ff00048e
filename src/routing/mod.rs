//! Task routing.
//!
//! Selects the best team member for a blueprint by blending skill match,
//! historical performance, availability and workload, then learns from
//! completion outcomes via EMA-smoothed per-member history.

pub mod engine;
pub mod history;
pub mod semantic;

pub use engine::{CandidateScore, RoutingDecision, RoutingEngine, RoutingPreferences, ScoreWeights};
pub use history::PerformanceTracker;
pub use semantic::{best_similarity, semantic_similarity, SkillCategory};
