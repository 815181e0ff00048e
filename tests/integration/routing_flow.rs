//! End-to-end routing tests: candidate selection, tenant isolation,
//! acceptance threshold, and confidence scoring.

use conductor::core::{AssignmentStatus, TeamMember};
use conductor::routing::{RoutingEngine, RoutingPreferences};
use conductor::{Config, Error};

use crate::fixtures::{
    default_roster, member, orchestrator, scored_blueprint, skills, PROJECT,
};

#[test]
fn routes_to_best_skill_match() {
    let orchestrator = orchestrator();
    let bp = scored_blueprint(
        "route-1",
        "Implement feature",
        "Add a new module with tests",
        120,
        &["rust", "sql"],
    );

    let assignment = orchestrator
        .route(&bp, &default_roster(), PROJECT)
        .expect("routing should succeed");

    assert_eq!(assignment.assigned_member, "senior");
    assert_eq!(assignment.status, AssignmentStatus::Assigned);
    assert!(assignment.confidence_score > 0.5);
}

#[test]
fn confident_match_scores_high() {
    let engine = RoutingEngine::new(&Config::default());
    let bp = scored_blueprint(
        "route-2",
        "Implement feature endpoint",
        "Add a new endpoint with tests",
        120,
        &["rust", "sql"],
    );
    let strong = member("strong", &["rust", "sql"], 0.8, 0.1);

    let chosen = engine
        .assign_task(&bp, &[strong.clone()], PROJECT, &RoutingPreferences::default())
        .expect("routing should succeed");
    assert_eq!(chosen.member_id, "strong");

    let confidence = engine.assignment_confidence(&bp, &strong);
    assert!(confidence >= 0.85, "confidence {confidence} too low");
}

#[test]
fn never_crosses_project_boundaries() {
    let orchestrator = orchestrator();
    let bp = scored_blueprint("route-3", "Implement feature", "Add module", 60, &["rust"]);

    let outsider = TeamMember::new(
        "outsider",
        "Outsider",
        skills(&["rust", "sql", "docker"]),
        1.0,
        0.0,
        40.0,
        "another-project",
    )
    .unwrap();

    let err = orchestrator
        .route(&bp, &[outsider], PROJECT)
        .expect_err("cross-project routing must fail");
    match err {
        Error::InsufficientSkills { candidates, .. } => assert_eq!(candidates, 0),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn rejects_when_nobody_clears_threshold() {
    let orchestrator = orchestrator();
    let bp = scored_blueprint(
        "route-4",
        "Obscure work",
        "Needs rare specialists",
        240,
        &["haskell", "prolog", "erlang"],
    );
    let weak = member("weak", &["quilting"], 0.1, 0.95);

    let err = orchestrator
        .route(&bp, &[weak], PROJECT)
        .expect_err("no candidate clears the threshold");
    match err {
        Error::InsufficientSkills {
            required_skills,
            candidates,
        } => {
            assert_eq!(candidates, 1);
            assert!(required_skills.contains(&"haskell".to_string()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn semantic_match_helps_adjacent_skills() {
    let engine = RoutingEngine::new(&Config::default());
    let bp = scored_blueprint(
        "route-5",
        "Implement feature",
        "Database-backed module",
        60,
        &["postgresql"],
    );

    let adjacent = member("adjacent", &["mysql"], 0.8, 0.1);
    let unrelated = member("unrelated", &["quilting"], 0.8, 0.1);

    let adjacent_score = engine.score_candidate(&bp, &adjacent);
    let unrelated_score = engine.score_candidate(&bp, &unrelated);
    assert!(adjacent_score.skill > unrelated_score.skill);
    assert!(adjacent_score.total > unrelated_score.total);
}

#[test]
fn progress_lifecycle_reaches_terminal_state() {
    let orchestrator = orchestrator();
    let bp = scored_blueprint("route-6", "Implement feature", "Add module", 60, &["rust"]);
    let assignment = orchestrator.route(&bp, &default_roster(), PROJECT).unwrap();

    let in_progress = orchestrator
        .update_progress(
            &assignment.assignment_id,
            0.5,
            AssignmentStatus::InProgress,
            Some("halfway".to_string()),
        )
        .unwrap();
    assert!(!in_progress.is_finished());

    let done = orchestrator
        .complete_assignment(&assignment.assignment_id, 55, true)
        .unwrap();
    assert_eq!(done.status, AssignmentStatus::Completed);
    assert!(done.is_finished());
    assert_eq!(done.progress_percentage, 1.0);
}

#[test]
fn unknown_assignment_id_is_not_found() {
    let orchestrator = orchestrator();
    let err = orchestrator
        .update_progress("assign_missing", 0.5, AssignmentStatus::InProgress, None)
        .expect_err("unknown id");
    assert!(matches!(err, Error::NotFound(_)));
}
