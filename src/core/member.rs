//! Team members, their performance history, and assignments.
//!
//! Members are owned by the caller; routing reads them but never mutates
//! them. Learning happens on the separate [`PerformanceHistory`] entity,
//! which only the outcome-update path touches and which is never deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::blueprint::{normalize_skills, validate_id};
use crate::error::{Error, Result};

/// A member of an engineering team.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TeamMember {
    /// Unique identifier (alphanumeric plus `_`/`-`).
    pub member_id: String,
    /// Display name.
    pub name: String,
    /// Skills possessed, lowercased, in caller order.
    pub skills: Vec<String>,
    /// Experience level in [0,1].
    pub experience_level: f64,
    /// Current workload in [0,1].
    pub current_workload: f64,
    /// Hours available for new work.
    pub availability_hours: f64,
    /// Tenant scope.
    pub project_id: String,
}

impl TeamMember {
    /// Create a validated team member.
    ///
    /// # Errors
    /// Returns `Error::Validation` for malformed ids or out-of-range
    /// experience/workload/availability.
    pub fn new(
        member_id: impl Into<String>,
        name: impl Into<String>,
        skills: Vec<String>,
        experience_level: f64,
        current_workload: f64,
        availability_hours: f64,
        project_id: impl Into<String>,
    ) -> Result<Self> {
        let member_id = member_id.into();
        let project_id = project_id.into();

        validate_id("member_id", &member_id)?;
        validate_id("project_id", &project_id)?;
        if !(0.0..=1.0).contains(&experience_level) {
            return Err(Error::validation(
                "experience_level",
                experience_level.to_string(),
                "must be in [0,1]",
            ));
        }
        if !(0.0..=1.0).contains(&current_workload) {
            return Err(Error::validation(
                "current_workload",
                current_workload.to_string(),
                "must be in [0,1]",
            ));
        }
        if availability_hours < 0.0 {
            return Err(Error::validation(
                "availability_hours",
                availability_hours.to_string(),
                "must be >= 0",
            ));
        }

        Ok(Self {
            member_id,
            name: name.into(),
            skills: normalize_skills(skills),
            experience_level,
            current_workload,
            availability_hours,
            project_id,
        })
    }

    /// Case-insensitive skill possession check.
    pub fn has_skill(&self, skill: &str) -> bool {
        let lower = skill.to_lowercase();
        self.skills.iter().any(|s| *s == lower)
    }
}

/// Accumulated performance statistics for one member.
///
/// All rates are exponential moving averages; defaults are neutral (1.0)
/// so a new member is neither rewarded nor penalized before any outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PerformanceHistory {
    /// Number of completed outcome updates.
    pub completed_tasks: u64,
    /// EMA of actual/estimated completion time.
    pub average_completion_time_ratio: f64,
    /// EMA of success (1.0) / failure (0.0) outcomes.
    pub success_rate: f64,
    /// Per-skill EMA performance scores.
    pub skill_performance: HashMap<String, f64>,
    /// Per-complexity-bucket EMA performance scores, keyed by bucket name.
    pub complexity_performance: HashMap<String, f64>,
    /// Assignments in the last seven days divided by active days.
    pub recent_velocity: f64,
    /// When the history was last updated.
    pub last_updated: DateTime<Utc>,
}

impl Default for PerformanceHistory {
    fn default() -> Self {
        Self {
            completed_tasks: 0,
            average_completion_time_ratio: 1.0,
            success_rate: 1.0,
            skill_performance: HashMap::new(),
            complexity_performance: HashMap::new(),
            recent_velocity: 1.0,
            last_updated: Utc::now(),
        }
    }
}

impl PerformanceHistory {
    /// Blended performance score in [0,1].
    ///
    /// Combines timeliness (how far the completion ratio sits below 2.0),
    /// success rate, and velocity: time component 0.4, success 0.4,
    /// velocity 0.2.
    pub fn performance_score(&self) -> f64 {
        let time_component = (2.0 - self.average_completion_time_ratio).max(0.0).min(1.0);
        let velocity_component = self.recent_velocity.min(1.0);
        (time_component * 0.4 + self.success_rate * 0.4 + velocity_component * 0.2)
            .clamp(0.0, 1.0)
    }
}

/// Lifecycle states of an assignment.
///
/// Completed and Failed are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Assigned,
    InProgress,
    Completed,
    Failed,
}

impl AssignmentStatus {
    /// Check if this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AssignmentStatus::Completed | AssignmentStatus::Failed)
    }
}

impl std::fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentStatus::Assigned => write!(f, "assigned"),
            AssignmentStatus::InProgress => write!(f, "in_progress"),
            AssignmentStatus::Completed => write!(f, "completed"),
            AssignmentStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Generate a unique assignment id: `assign_<epoch-ms>_<hex8>`.
///
/// The hex suffix comes from a v4 UUID, so ids are unguessable even when
/// two assignments land in the same millisecond.
pub fn generate_assignment_id(now: DateTime<Utc>) -> String {
    let hex = uuid::Uuid::new_v4().simple().to_string();
    format!("assign_{}_{}", now.timestamp_millis(), &hex[..8])
}

/// A routed work assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskAssignment {
    /// Unique, securely generated identifier.
    pub assignment_id: String,
    /// The blueprint being worked.
    pub blueprint_id: String,
    /// The member the work was routed to.
    pub assigned_member: String,
    /// Confidence in the assignment, in [0,1].
    pub confidence_score: f64,
    /// Predicted completion timestamp.
    pub estimated_completion_time: DateTime<Utc>,
    /// Tenant scope.
    pub project_id: String,
    /// Current lifecycle state.
    pub status: AssignmentStatus,
    /// Progress in [0,1].
    pub progress_percentage: f64,
    /// Free-form progress notes, newest last.
    pub notes: Vec<String>,
    /// When the assignment was created.
    pub created_at: DateTime<Utc>,
    /// When the assignment was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TaskAssignment {
    /// Create a fresh assignment in the Assigned state.
    pub fn new(
        blueprint_id: impl Into<String>,
        assigned_member: impl Into<String>,
        confidence_score: f64,
        estimated_completion_time: DateTime<Utc>,
        project_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            assignment_id: generate_assignment_id(now),
            blueprint_id: blueprint_id.into(),
            assigned_member: assigned_member.into(),
            confidence_score: confidence_score.clamp(0.0, 1.0),
            estimated_completion_time,
            project_id: project_id.into(),
            status: AssignmentStatus::Assigned,
            progress_percentage: 0.0,
            notes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a progress update, clamping the percentage to [0,1].
    pub fn update_progress(
        &mut self,
        progress: f64,
        status: AssignmentStatus,
        note: Option<String>,
    ) {
        self.progress_percentage = progress.clamp(0.0, 1.0);
        self.status = status;
        if let Some(note) = note {
            self.notes.push(note);
        }
        self.updated_at = Utc::now();
    }

    /// Check if the assignment has reached a terminal state.
    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
