//! Outcome-learning tests: EMA convergence and its effect on later
//! routing decisions.

use chrono::Utc;
use conductor::core::TaskComplexity;
use conductor::routing::{PerformanceTracker, RoutingEngine, RoutingPreferences};
use conductor::Config;

use crate::fixtures::{member, orchestrator, scored_blueprint, skills, PROJECT};

#[test]
fn constant_success_converges_to_one() {
    let tracker = PerformanceTracker::new(0.3);
    let now = Utc::now();

    for _ in 0..60 {
        tracker.update_outcome(
            "steady",
            TaskComplexity::Moderate,
            &skills(&["rust"]),
            60,
            60,
            true,
            now,
        );
    }

    let history = tracker.snapshot("steady");
    assert!((history.success_rate - 1.0).abs() < 1e-6);
    assert!((history.average_completion_time_ratio - 1.0).abs() < 1e-6);
    assert!((history.performance_score() - 1.0).abs() < 1e-3);
}

#[test]
fn repeated_failures_sink_success_rate() {
    let tracker = PerformanceTracker::new(0.3);
    let now = Utc::now();

    for _ in 0..30 {
        tracker.update_outcome(
            "struggling",
            TaskComplexity::Complex,
            &skills(&["sql"]),
            60,
            180,
            false,
            now,
        );
    }

    let history = tracker.snapshot("struggling");
    assert!(history.success_rate < 0.01);
    assert!(history.skill_performance["sql"] < 0.01);
    assert!(history.average_completion_time_ratio > 2.5);
}

#[test]
fn history_shifts_performance_ranking() {
    let engine = RoutingEngine::new(&Config::default());
    let bp = scored_blueprint(
        "learn-1",
        "Implement feature",
        "Add a new module",
        60,
        &["rust"],
    );

    // Same profile on paper
    let proven = member("proven", &["rust"], 0.5, 0.2);
    let unproven = member("unproven", &["rust"], 0.5, 0.2);

    let now = Utc::now();
    for _ in 0..6 {
        engine.update_assignment_outcome("proven", &bp, 50, true, now);
    }

    let proven_score = engine.score_candidate(&bp, &proven);
    let unproven_score = engine.score_candidate(&bp, &unproven);
    assert!(
        proven_score.performance > unproven_score.performance,
        "track record should beat the experience proxy"
    );

    let chosen = engine
        .assign_task(&bp, &[unproven, proven], PROJECT, &RoutingPreferences::default())
        .unwrap();
    assert_eq!(chosen.member_id, "proven");
}

#[test]
fn outcomes_flow_through_orchestrator() {
    let orchestrator = orchestrator();
    let roster = vec![member("solo", &["rust"], 0.7, 0.2)];

    for i in 0..4 {
        let bp = scored_blueprint(
            &format!("flow-{i}"),
            "Implement feature",
            "Add a new module",
            60,
            &["rust"],
        );
        let assignment = orchestrator.route(&bp, &roster, PROJECT).unwrap();
        orchestrator
            .complete_assignment(&assignment.assignment_id, 60, true)
            .unwrap();
    }

    let history = orchestrator.router().tracker().snapshot("solo");
    assert_eq!(history.completed_tasks, 4);
    assert!(history.success_rate > 0.7);
    // Velocity reflects the burst of recent assignments
    assert!(history.recent_velocity >= 1.0);
}

#[test]
fn prediction_tightens_with_history() {
    let orchestrator = orchestrator();
    let roster = vec![member("swift", &["rust"], 0.7, 0.1)];

    // Establish a fast, reliable track record
    for i in 0..3 {
        let bp = scored_blueprint(
            &format!("warm-{i}"),
            "Implement feature",
            "Add a new module",
            120,
            &["rust"],
        );
        let assignment = orchestrator.route(&bp, &roster, PROJECT).unwrap();
        orchestrator
            .complete_assignment(&assignment.assignment_id, 60, true)
            .unwrap();
    }

    let bp = scored_blueprint(
        "predict-1",
        "Implement feature",
        "Add a new module",
        120,
        &["rust"],
    );
    let assignment = orchestrator.route(&bp, &roster, PROJECT).unwrap();

    let predicted = orchestrator
        .predict_completion(&assignment.assignment_id, 0.0)
        .unwrap();
    // Fast completions plus high velocity pull the estimate in
    assert!(predicted < assignment.estimated_completion_time);
}
