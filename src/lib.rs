pub mod config;
pub mod core;
pub mod error;
pub mod log;
pub mod orchestration;
pub mod routing;
pub mod scoring;
pub mod store;

pub use config::Config;
pub use error::{Error, Result};
pub use orchestration::AssignmentOrchestrator;
pub use routing::RoutingEngine;
pub use scoring::ComplexityScorer;

/// Core invariant tests.
///
/// These verify the cross-module properties the whole system leans on:
/// - Boundedness: every score-producing path stays inside [0,1]
/// - Determinism: identical inputs always produce identical outputs
/// - Ordering: execution order always respects prerequisites
#[cfg(test)]
mod invariant_tests {
    use crate::core::{execution_order, TaskBlueprint, TaskDependency, TaskMetadata};
    use crate::scoring::ComplexityScorer;

    /// Verify complexity scores stay bounded over a sweep of input shapes.
    #[test]
    fn test_score_boundedness_sweep() {
        let scorer = ComplexityScorer::new();
        let titles = ["", "Fix typo", "Critical distributed migration", "x"];
        let descriptions = ["", "add endpoint", &"kubernetes saga ".repeat(100)];
        let skill_sets: &[&[&str]] = &[&[], &["rust"], &["kubernetes", "cqrs", "ml", "a", "b", "c"]];

        for title in titles {
            for description in descriptions.iter() {
                for set in skill_sets {
                    let skills: Vec<String> = set.iter().map(|s| s.to_string()).collect();
                    let score = scorer.score(title, description, &skills);
                    assert!(
                        (0.0..=1.0).contains(&score),
                        "score {} out of bounds for ({:?}, ..)",
                        score,
                        title
                    );
                }
            }
        }
    }

    /// Verify blueprint construction and scoring agree on the derived bucket.
    #[test]
    fn test_blueprint_score_matches_bucket() {
        let scorer = ComplexityScorer::new();
        let metadata = TaskMetadata::new(120, vec!["rust".to_string()], 0.5).unwrap();
        let bp = TaskBlueprint::new(
            "inv-1",
            "Implement parser module",
            "Create the parser and validate inputs",
            metadata,
            "proj-inv",
            &scorer,
        )
        .unwrap();

        assert_eq!(
            bp.complexity,
            crate::core::TaskComplexity::from_score(bp.complexity_score)
        );
    }

    /// Verify topological output places every prerequisite before its
    /// dependents, for a diamond-shaped graph.
    #[test]
    fn test_execution_order_respects_prerequisites() {
        let edges = vec![
            TaskDependency::blocking("b", "a").unwrap(),
            TaskDependency::blocking("c", "a").unwrap(),
            TaskDependency::blocking("d", "b").unwrap(),
            TaskDependency::blocking("d", "c").unwrap(),
        ];

        let order = execution_order(&edges).unwrap();
        let pos = |id: &str| order.iter().position(|n| n == id).unwrap();

        for edge in &edges {
            assert!(
                pos(&edge.prerequisite_task_id) < pos(&edge.dependent_task_id),
                "{} should precede {}",
                edge.prerequisite_task_id,
                edge.dependent_task_id
            );
        }
    }
}
