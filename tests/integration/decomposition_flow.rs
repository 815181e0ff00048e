//! Decomposition tests: trigger conditions, strategy templates, duration
//! splitting, and routing of the resulting subtasks.

use conductor::orchestration::{DecompositionPlanner, DecompositionStrategy};
use conductor::Config;

use crate::fixtures::{default_roster, orchestrator, pinned_blueprint, scored_blueprint, PROJECT};

#[test]
fn critical_eight_hour_blueprint_splits() {
    let planner = DecompositionPlanner::new(&Config::default());
    let bp = pinned_blueprint("split-1", 480, &["rust"], 0.9);

    let result = planner.decompose(&bp);

    assert!(result.decomposed);
    assert!(
        (3..=5).contains(&result.subtasks.len()),
        "got {} subtasks",
        result.subtasks.len()
    );
    assert!(result.sequential_minutes <= 480);
    assert!(result.parallel_minutes < result.sequential_minutes);
}

#[test]
fn trivial_blueprint_passes_through() {
    let planner = DecompositionPlanner::new(&Config::default());
    let bp = scored_blueprint("split-2", "Fix typo", "Fix typo in README", 30, &[]);

    let result = planner.decompose(&bp);
    assert!(!result.decomposed);
    assert_eq!(result.subtasks.len(), 1);
    assert_eq!(result.subtasks[0].blueprint_id, "split-2");
}

#[test]
fn api_text_selects_api_template() {
    let planner = DecompositionPlanner::new(&Config::default());
    let bp = scored_blueprint(
        "split-3",
        "Build REST API",
        "Design and ship a new endpoint surface",
        480,
        &["rust"],
    );

    let result = planner.decompose(&bp);
    assert_eq!(result.strategy, DecompositionStrategy::ApiDevelopment);
}

#[test]
fn subtasks_chain_in_execution_order() {
    let planner = DecompositionPlanner::new(&Config::default());
    let bp = pinned_blueprint("split-4", 480, &["rust", "sql"], 0.85);

    let result = planner.decompose(&bp);

    let ids: Vec<&str> = result
        .subtasks
        .iter()
        .map(|s| s.blueprint_id.as_str())
        .collect();
    assert_eq!(
        result.execution_order,
        ids.iter().map(|s| s.to_string()).collect::<Vec<_>>()
    );
    // Each subtask after the first blocks on its predecessor
    assert_eq!(result.dependencies.len(), ids.len() - 1);

    for (i, sub) in result.subtasks.iter().enumerate() {
        assert_eq!(sub.metadata.required_skills, bp.metadata.required_skills);
        assert!(sub.metadata.tags.contains(&format!("subtask_{}", i + 1)));
        assert!(sub.complexity_score < bp.complexity_score);
        assert!(sub.metadata.estimated_duration_minutes >= 30);
    }
}

#[test]
fn orchestrator_routes_every_subtask() {
    let orchestrator = orchestrator();
    let bp = pinned_blueprint("split-5", 480, &["rust"], 0.9);

    let (result, assignments) = orchestrator
        .decompose_and_route(&bp, &default_roster(), PROJECT)
        .expect("decompose and route");

    assert!(result.decomposed);
    assert_eq!(assignments.len(), result.subtasks.len());
    for (assignment, id) in assignments.iter().zip(&result.execution_order) {
        assert_eq!(&assignment.blueprint_id, id);
        assert_eq!(assignment.assigned_member, "senior");
    }
}

#[test]
fn decomposition_never_exceeds_parent_budget() {
    let planner = DecompositionPlanner::new(&Config::default());
    for minutes in [300u32, 480, 600, 960] {
        let bp = pinned_blueprint(&format!("budget-{minutes}"), minutes, &["rust"], 0.8);
        let result = planner.decompose(&bp);
        assert!(
            result.sequential_minutes <= minutes,
            "sequential {} exceeds parent {}",
            result.sequential_minutes,
            minutes
        );
    }
}
