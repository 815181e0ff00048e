//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Building blueprints with auto or pinned complexity
//! - Predefined team rosters
//! - A default-configured orchestrator

use conductor::core::{TaskBlueprint, TaskMetadata, TeamMember};
use conductor::orchestration::AssignmentOrchestrator;
use conductor::scoring::ComplexityScorer;
use conductor::Config;

pub const PROJECT: &str = "proj-int";

pub fn skills(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// A blueprint whose complexity is derived from its text.
pub fn scored_blueprint(
    id: &str,
    title: &str,
    description: &str,
    minutes: u32,
    required: &[&str],
) -> TaskBlueprint {
    let scorer = ComplexityScorer::new();
    let metadata = TaskMetadata::new(minutes, skills(required), 0.5)
        .expect("valid metadata");
    TaskBlueprint::new(id, title, description, metadata, PROJECT, &scorer)
        .expect("valid blueprint")
}

/// A blueprint with an explicitly pinned complexity score.
pub fn pinned_blueprint(id: &str, minutes: u32, required: &[&str], score: f64) -> TaskBlueprint {
    let metadata = TaskMetadata::new(minutes, skills(required), 0.7)
        .expect("valid metadata");
    TaskBlueprint::with_score(id, "Pinned work item", "Pinned work item", metadata, PROJECT, score)
        .expect("valid blueprint")
}

pub fn member(
    id: &str,
    member_skills: &[&str],
    experience: f64,
    workload: f64,
) -> TeamMember {
    TeamMember::new(id, id, skills(member_skills), experience, workload, 40.0, PROJECT)
        .expect("valid member")
}

/// A small roster: one strong generalist, one overloaded junior.
pub fn default_roster() -> Vec<TeamMember> {
    vec![
        member("senior", &["rust", "sql", "docker", "api"], 0.8, 0.1),
        member("junior", &["css"], 0.3, 0.9),
    ]
}

pub fn orchestrator() -> AssignmentOrchestrator {
    AssignmentOrchestrator::new(Config::default())
}
