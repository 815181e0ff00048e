//! Core domain models for conductor.
//!
//! This module contains the fundamental data structures used throughout
//! the assignment system: blueprints, dependency edges and the graph that
//! orders them, team members, performance history, and assignments.

pub mod blueprint;
pub mod graph;
pub mod member;

pub use blueprint::{validate_id, TaskBlueprint, TaskComplexity, TaskMetadata};
pub use graph::{
    execution_order, validate_edges, DependencyGraph, DependencyKind, TaskDependency,
};
pub use member::{
    generate_assignment_id, AssignmentStatus, PerformanceHistory, TaskAssignment, TeamMember,
};
