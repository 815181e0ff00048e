//! Assignment orchestration.
//!
//! The `AssignmentOrchestrator` drives the full flow: decompose an
//! oversized blueprint, route each piece to a team member, track
//! progress through the Assigned -> InProgress -> Completed/Failed
//! lifecycle, and feed outcomes back into routing history.

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, RwLock};
use std::time::Instant;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::sync::mpsc;

use crate::clog;
use crate::config::Config;
use crate::core::{AssignmentStatus, TaskAssignment, TaskBlueprint, TeamMember};
use crate::error::{Error, Result};
use crate::orchestration::decompose::{DecompositionPlanner, DecompositionResult};
use crate::routing::{RoutingEngine, RoutingPreferences};

/// Hours in a working day, used for calendar conversion.
const WORKDAY_HOURS: f64 = 8.0;
/// 5-day working week stretched over 7 calendar days.
const CALENDAR_FACTOR: f64 = 1.4;

/// Events emitted as assignments move through their lifecycle.
///
/// Delivery is best effort; a full or absent channel never blocks the
/// orchestrator.
#[derive(Debug, Clone)]
pub enum AssignmentEvent {
    /// A blueprint was routed to a member.
    Assigned {
        assignment_id: String,
        blueprint_id: String,
        member_id: String,
        confidence: f64,
    },
    /// A blueprint was split into subtasks before routing.
    Decomposed {
        blueprint_id: String,
        subtask_count: usize,
        strategy: String,
    },
    /// An assignment's progress or status changed.
    ProgressUpdated {
        assignment_id: String,
        progress: f64,
        status: AssignmentStatus,
    },
    /// An assignment reached a terminal state.
    Completed {
        assignment_id: String,
        success: bool,
    },
}

/// Rolling routing metrics over a bounded window.
#[derive(Debug, Default)]
struct RollingMetrics {
    latencies_ms: VecDeque<f64>,
    confidences: VecDeque<f64>,
}

impl RollingMetrics {
    fn record(&mut self, latency_ms: f64, confidence: f64, cap: usize) {
        if self.latencies_ms.len() >= cap {
            self.latencies_ms.pop_front();
        }
        if self.confidences.len() >= cap {
            self.confidences.pop_front();
        }
        self.latencies_ms.push_back(latency_ms);
        self.confidences.push_back(confidence);
    }

    fn average_confidence(&self) -> f64 {
        if self.confidences.is_empty() {
            return 0.0;
        }
        self.confidences.iter().sum::<f64>() / self.confidences.len() as f64
    }
}

/// Summary of recent routing behavior.
#[derive(Debug, Clone, Copy)]
pub struct MetricsSnapshot {
    pub sample_count: usize,
    pub average_confidence: f64,
}

struct AssignmentRecord {
    assignment: TaskAssignment,
    /// Blueprint retained for outcome feedback and prediction.
    blueprint: TaskBlueprint,
}

/// Top-level coordinator over routing and decomposition.
///
/// Active assignments live in an in-process map; persistence is the
/// caller's concern through the storage traits.
pub struct AssignmentOrchestrator {
    router: RoutingEngine,
    planner: DecompositionPlanner,
    config: Config,
    assignments: RwLock<HashMap<String, AssignmentRecord>>,
    metrics: Mutex<RollingMetrics>,
    event_tx: Option<mpsc::Sender<AssignmentEvent>>,
}

impl AssignmentOrchestrator {
    /// Create an orchestrator without an event channel.
    pub fn new(config: Config) -> Self {
        Self {
            router: RoutingEngine::new(&config),
            planner: DecompositionPlanner::new(&config),
            config,
            assignments: RwLock::new(HashMap::new()),
            metrics: Mutex::new(RollingMetrics::default()),
            event_tx: None,
        }
    }

    /// Create an orchestrator that emits lifecycle events.
    pub fn with_events(config: Config, event_tx: mpsc::Sender<AssignmentEvent>) -> Self {
        let mut orchestrator = Self::new(config);
        orchestrator.event_tx = Some(event_tx);
        orchestrator
    }

    /// Access the underlying routing engine.
    pub fn router(&self) -> &RoutingEngine {
        &self.router
    }

    /// Access the decomposition planner.
    pub fn planner(&self) -> &DecompositionPlanner {
        &self.planner
    }

    /// Route a single blueprint and record the resulting assignment.
    ///
    /// Routing failures propagate unchanged; on success the assignment
    /// is stored, metrics are recorded and an `Assigned` event is
    /// emitted.
    pub fn route(
        &self,
        blueprint: &TaskBlueprint,
        members: &[TeamMember],
        project_id: &str,
    ) -> Result<TaskAssignment> {
        let started = Instant::now();

        let member =
            self.router
                .assign_task(blueprint, members, project_id, &RoutingPreferences::default())?;
        let confidence = self.router.assignment_confidence(blueprint, &member);
        let estimated_completion = self.estimate_completion(blueprint, &member, Utc::now());

        let assignment = TaskAssignment::new(
            &blueprint.blueprint_id,
            &member.member_id,
            confidence,
            estimated_completion,
            project_id,
        );

        clog!(
            "Assigned {} to {} (confidence {:.2}, eta {})",
            blueprint.blueprint_id,
            member.member_id,
            confidence,
            estimated_completion.format("%Y-%m-%d %H:%M")
        );

        self.metrics.lock().unwrap().record(
            started.elapsed().as_secs_f64() * 1000.0,
            confidence,
            self.config.metrics_window,
        );

        self.emit(AssignmentEvent::Assigned {
            assignment_id: assignment.assignment_id.clone(),
            blueprint_id: blueprint.blueprint_id.clone(),
            member_id: member.member_id.clone(),
            confidence,
        });

        self.assignments.write().unwrap().insert(
            assignment.assignment_id.clone(),
            AssignmentRecord {
                assignment: assignment.clone(),
                blueprint: blueprint.clone(),
            },
        );

        Ok(assignment)
    }

    /// Decompose a blueprint if needed, then route every subtask.
    ///
    /// Subtasks are routed in execution order. The first routing failure
    /// aborts the remainder and propagates; assignments already made
    /// stay recorded.
    pub fn decompose_and_route(
        &self,
        blueprint: &TaskBlueprint,
        members: &[TeamMember],
        project_id: &str,
    ) -> Result<(DecompositionResult, Vec<TaskAssignment>)> {
        let result = self.planner.decompose(blueprint);

        if result.decomposed {
            self.emit(AssignmentEvent::Decomposed {
                blueprint_id: blueprint.blueprint_id.clone(),
                subtask_count: result.subtasks.len(),
                strategy: result.strategy.to_string(),
            });
        }

        let mut assignments = Vec::with_capacity(result.subtasks.len());
        for id in &result.execution_order {
            let subtask = result
                .subtasks
                .iter()
                .find(|s| s.blueprint_id == *id)
                .ok_or_else(|| Error::Routing {
                    blueprint_id: blueprint.blueprint_id.clone(),
                    project_id: project_id.to_string(),
                    message: format!("execution order names unknown subtask {id}"),
                })?;
            assignments.push(self.route(subtask, members, project_id)?);
        }

        Ok((result, assignments))
    }

    /// Update progress on an active assignment.
    ///
    /// The percentage is clamped to [0,1]. Unknown ids fail with
    /// [`Error::NotFound`].
    pub fn update_progress(
        &self,
        assignment_id: &str,
        progress: f64,
        status: AssignmentStatus,
        note: Option<String>,
    ) -> Result<TaskAssignment> {
        let mut assignments = self.assignments.write().unwrap();
        let record = assignments
            .get_mut(assignment_id)
            .ok_or_else(|| Error::NotFound(format!("assignment {assignment_id}")))?;

        record.assignment.update_progress(progress, status, note);
        let updated = record.assignment.clone();
        drop(assignments);

        self.emit(AssignmentEvent::ProgressUpdated {
            assignment_id: assignment_id.to_string(),
            progress: updated.progress_percentage,
            status: updated.status,
        });

        Ok(updated)
    }

    /// Predict when an in-flight assignment will finish.
    ///
    /// Members without meaningful history (fewer than 2 completed tasks)
    /// keep the original estimate. Otherwise the remaining work is the
    /// original duration scaled by the member's completion-time ratio
    /// over their velocity, discounted by progress already made.
    pub fn predict_completion(&self, assignment_id: &str, progress: f64) -> Result<DateTime<Utc>> {
        let assignments = self.assignments.read().unwrap();
        let record = assignments
            .get(assignment_id)
            .ok_or_else(|| Error::NotFound(format!("assignment {assignment_id}")))?;

        let history = self
            .router
            .tracker()
            .snapshot(&record.assignment.assigned_member);
        if history.completed_tasks < 2 {
            return Ok(record.assignment.estimated_completion_time);
        }

        let progress = progress.clamp(0.0, 1.0);
        let original_hours =
            record.blueprint.metadata.estimated_duration_minutes as f64 / 60.0;
        let velocity = if history.recent_velocity > 0.0 {
            history.recent_velocity
        } else {
            1.0
        };

        let remaining_hours = original_hours
            * (history.average_completion_time_ratio / velocity)
            * (1.0 - progress);

        Ok(Utc::now() + Self::hours(remaining_hours))
    }

    /// Close out an assignment and feed the outcome back into history.
    ///
    /// Learning is best effort: the history update cannot fail, and the
    /// terminal status is recorded regardless.
    pub fn complete_assignment(
        &self,
        assignment_id: &str,
        actual_minutes: u32,
        success: bool,
    ) -> Result<TaskAssignment> {
        let status = if success {
            AssignmentStatus::Completed
        } else {
            AssignmentStatus::Failed
        };
        let updated = self.update_progress(assignment_id, 1.0, status, None)?;

        let blueprint = {
            let assignments = self.assignments.read().unwrap();
            assignments
                .get(assignment_id)
                .map(|r| r.blueprint.clone())
        };
        if let Some(blueprint) = blueprint {
            self.router.update_assignment_outcome(
                &updated.assigned_member,
                &blueprint,
                actual_minutes,
                success,
                Utc::now(),
            );
        }

        self.emit(AssignmentEvent::Completed {
            assignment_id: assignment_id.to_string(),
            success,
        });

        Ok(updated)
    }

    /// Fetch an assignment by id.
    pub fn assignment(&self, assignment_id: &str) -> Result<TaskAssignment> {
        self.assignments
            .read()
            .unwrap()
            .get(assignment_id)
            .map(|r| r.assignment.clone())
            .ok_or_else(|| Error::NotFound(format!("assignment {assignment_id}")))
    }

    /// Number of assignments currently tracked.
    pub fn assignment_count(&self) -> usize {
        self.assignments.read().unwrap().len()
    }

    /// Current rolling-metrics summary.
    pub fn metrics(&self) -> MetricsSnapshot {
        let metrics = self.metrics.lock().unwrap();
        MetricsSnapshot {
            sample_count: metrics.confidences.len(),
            average_confidence: metrics.average_confidence(),
        }
    }

    /// Completion-time estimate for a fresh assignment.
    ///
    /// Base hours are scaled by the member's historical time ratio and
    /// workload, divided by an experience factor, padded with a
    /// complexity buffer up to +20%, then converted from 8-hour workdays
    /// to calendar days with a 5/7 working-week factor.
    fn estimate_completion(
        &self,
        blueprint: &TaskBlueprint,
        member: &TeamMember,
        now: DateTime<Utc>,
    ) -> DateTime<Utc> {
        let base_hours = blueprint.metadata.estimated_duration_minutes as f64 / 60.0;

        let history = self.router.tracker().snapshot(&member.member_id);
        let historical_factor = if history.completed_tasks > 0 {
            history.average_completion_time_ratio
        } else {
            1.0
        };
        let workload_factor = 1.0 + 0.5 * member.current_workload;
        let experience_factor = 0.75 + 0.5 * member.experience_level;

        let effort_hours = base_hours * historical_factor * workload_factor / experience_factor;
        let buffered_hours = effort_hours * (1.0 + 0.2 * blueprint.complexity_score);

        let calendar_days = buffered_hours / WORKDAY_HOURS * CALENDAR_FACTOR;
        now + Self::hours(calendar_days * 24.0)
    }

    fn hours(hours: f64) -> ChronoDuration {
        ChronoDuration::seconds((hours * 3600.0) as i64)
    }

    fn emit(&self, event: AssignmentEvent) {
        if let Some(tx) = &self.event_tx {
            // Best effort, drop if the channel is full
            let _ = tx.try_send(event);
        }
    }
}
