//! Integration test suite for conductor.
//!
//! These tests exercise the full assignment pipeline from blueprint
//! creation through decomposition, routing, progress tracking, and
//! outcome learning. They verify that all components work together
//! correctly.
//!
//! # Test Categories
//!
//! - `routing_flow`: End-to-end routing and confidence behavior
//! - `decomposition_flow`: Splitting oversized blueprints and routing subtasks
//! - `graph_ordering`: Dependency validation and execution ordering
//! - `learning`: Outcome feedback and EMA convergence

mod fixtures;

mod decomposition_flow;
mod graph_ordering;
mod learning;
mod routing_flow;
