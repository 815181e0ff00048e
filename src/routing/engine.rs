//! Skill-aware task routing.
//!
//! The `RoutingEngine` scores every in-project candidate against a
//! blueprint along four axes (skill match, historical performance,
//! availability, workload) and picks the best one, subject to an
//! acceptance threshold. Decisions land in a bounded ring buffer that
//! feeds velocity calculation.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::core::{TaskBlueprint, TaskComplexity, TeamMember};
use crate::error::{Error, Result};
use crate::routing::history::PerformanceTracker;
use crate::routing::semantic::best_similarity;
use crate::{clog, clog_debug};

/// One recorded routing decision, kept for velocity and diagnostics.
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub timestamp: DateTime<Utc>,
    pub member_id: String,
    pub blueprint_id: String,
    pub total_score: f64,
    /// How many other eligible candidates were considered.
    pub alternatives: usize,
}

/// Per-candidate score breakdown, exposed for logging and tests.
#[derive(Debug, Clone, Copy)]
pub struct CandidateScore {
    pub skill: f64,
    pub performance: f64,
    pub availability: f64,
    pub workload_penalty: f64,
    pub total: f64,
}

/// Weights blending the four sub-scores into a total.
///
/// The workload weight applies to the inverse of the penalty.
#[derive(Debug, Clone, Copy)]
pub struct ScoreWeights {
    pub skill: f64,
    pub performance: f64,
    pub availability: f64,
    pub workload: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            skill: 0.4,
            performance: 0.3,
            availability: 0.2,
            workload: 0.1,
        }
    }
}

/// Per-call routing overrides.
///
/// `None` fields fall back to the engine's configured values, so
/// `RoutingPreferences::default()` routes exactly as the bare config
/// would.
#[derive(Debug, Clone, Default)]
pub struct RoutingPreferences {
    /// Override for the minimum accepted total score.
    pub acceptance_threshold: Option<f64>,
    /// Override for the sub-score blend.
    pub weights: Option<ScoreWeights>,
}

/// Stateful routing engine.
///
/// Scoring is pure with respect to its inputs; the only mutable state is
/// the performance tracker and the decision ring buffer, each behind its
/// own lock, so concurrent `assign_task` calls are safe.
pub struct RoutingEngine {
    tracker: PerformanceTracker,
    decisions: Mutex<VecDeque<RoutingDecision>>,
    acceptance_threshold: f64,
    history_cap: usize,
}

impl RoutingEngine {
    /// Create an engine from configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            tracker: PerformanceTracker::new(config.ema_alpha),
            decisions: Mutex::new(VecDeque::new()),
            acceptance_threshold: config.acceptance_threshold,
            history_cap: config.max_assignment_history,
        }
    }

    /// Access the performance tracker.
    pub fn tracker(&self) -> &PerformanceTracker {
        &self.tracker
    }

    /// Number of decisions currently retained.
    pub fn decision_count(&self) -> usize {
        self.decisions.lock().unwrap().len()
    }

    /// Pick the best member for a blueprint within a project.
    ///
    /// Candidates from other projects are never eligible. The top-ranked
    /// candidate is accepted only if its total score reaches the
    /// acceptance threshold; otherwise the call fails with
    /// [`Error::InsufficientSkills`] carrying the required skills and the
    /// number of in-project candidates considered. Preferences can
    /// override the threshold and the sub-score blend per call.
    pub fn assign_task(
        &self,
        blueprint: &TaskBlueprint,
        candidates: &[TeamMember],
        project_id: &str,
        preferences: &RoutingPreferences,
    ) -> Result<TeamMember> {
        let threshold = preferences
            .acceptance_threshold
            .unwrap_or(self.acceptance_threshold)
            .clamp(0.0, 1.0);
        let weights = preferences.weights.unwrap_or_default();

        let eligible: Vec<&TeamMember> = candidates
            .iter()
            .filter(|m| m.project_id == project_id)
            .collect();

        if eligible.is_empty() {
            clog!(
                "Routing failed for {}: no candidates in project {}",
                blueprint.blueprint_id,
                project_id
            );
            return Err(Error::InsufficientSkills {
                required_skills: blueprint.metadata.required_skills.clone(),
                candidates: 0,
            });
        }

        let mut ranked: Vec<(&TeamMember, CandidateScore)> = eligible
            .iter()
            .map(|m| (*m, self.score_with(blueprint, m, weights)))
            .collect();
        // Stable sort keeps caller order among equal totals
        ranked.sort_by(|a, b| {
            b.1.total
                .partial_cmp(&a.1.total)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let (best, score) = &ranked[0];
        clog_debug!(
            "Routing {} top candidate {} skill={:.2} perf={:.2} avail={:.2} penalty={:.2} total={:.2}",
            blueprint.blueprint_id,
            best.member_id,
            score.skill,
            score.performance,
            score.availability,
            score.workload_penalty,
            score.total
        );

        if score.total < threshold {
            clog!(
                "Routing rejected for {}: best score {:.2} below threshold {:.2}",
                blueprint.blueprint_id,
                score.total,
                threshold
            );
            return Err(Error::InsufficientSkills {
                required_skills: blueprint.metadata.required_skills.clone(),
                candidates: eligible.len(),
            });
        }

        let selected = (*best).clone();
        self.record_decision(&selected.member_id, blueprint, score.total, ranked.len() - 1);
        Ok(selected)
    }

    /// Confidence in an already-chosen assignment, in [0,1].
    ///
    /// Blends skill match (0.4), how well the member's experience level
    /// lines up with the task's complexity (0.25), remaining workload
    /// headroom (0.1), and historical performance when at least 3 tasks
    /// are on record, experience level otherwise (0.25).
    pub fn assignment_confidence(&self, blueprint: &TaskBlueprint, member: &TeamMember) -> f64 {
        let skill = self.skill_score(blueprint, member);

        let complexity_match =
            (1.0 - (member.experience_level - blueprint.complexity_score).abs() + 0.2).min(1.0);

        let workload_confidence = 1.0 - member.current_workload;

        let performance_confidence = if self.tracker.completed_tasks(&member.member_id) >= 3 {
            self.tracker.snapshot(&member.member_id).performance_score()
        } else {
            member.experience_level
        };

        (skill * 0.4
            + complexity_match * 0.25
            + workload_confidence * 0.1
            + performance_confidence * 0.25)
            .clamp(0.0, 1.0)
    }

    /// Feed a completed assignment back into the performance history.
    ///
    /// Learning is best-effort; this never fails, and velocity is
    /// refreshed from the decision ring buffer afterwards.
    pub fn update_assignment_outcome(
        &self,
        member_id: &str,
        blueprint: &TaskBlueprint,
        actual_minutes: u32,
        success: bool,
        now: DateTime<Utc>,
    ) {
        self.tracker.update_outcome(
            member_id,
            TaskComplexity::from_score(blueprint.complexity_score),
            &blueprint.metadata.required_skills,
            blueprint.metadata.estimated_duration_minutes,
            actual_minutes,
            success,
            now,
        );

        let times = self.member_decision_times(member_id);
        self.tracker.recompute_velocity(member_id, &times, now);
    }

    // ---------------------------------------------------------------
    // Sub-scores
    // ---------------------------------------------------------------

    /// Skill-match sub-score in [0,1].
    ///
    /// Direct case-insensitive matches set the base ratio; skills the
    /// member lacks contribute their best semantic similarity, averaged
    /// and weighted at 0.3 (plus a 0.1 kicker in the final sum). An
    /// experience bonus of 0.1x applies, doubled when the task requires
    /// no skills at all.
    fn skill_score(&self, blueprint: &TaskBlueprint, member: &TeamMember) -> f64 {
        let required = &blueprint.metadata.required_skills;

        if required.is_empty() {
            return (1.0 + member.experience_level * 0.2).min(1.0);
        }

        let missing: Vec<&String> = required.iter().filter(|s| !member.has_skill(s)).collect();
        let direct = required.len() - missing.len();
        let direct_ratio = direct as f64 / required.len() as f64;

        let semantic_avg = if missing.is_empty() {
            0.0
        } else {
            missing
                .iter()
                .map(|s| best_similarity(s, &member.skills))
                .sum::<f64>()
                / missing.len() as f64
        };

        let base = direct_ratio + semantic_avg * 0.3;
        let experience_bonus = member.experience_level * 0.1;

        (base + experience_bonus + semantic_avg * 0.1).min(1.0)
    }

    /// Performance sub-score in [0,1].
    ///
    /// Members with fewer than 2 completed tasks fall back to their
    /// experience level. Otherwise the overall score, the mean of the
    /// required-skill EMAs, and the matching complexity-bucket EMA blend
    /// 0.4 / 0.4 / 0.2, with the overall score standing in for any
    /// missing map entry.
    fn performance_score(&self, blueprint: &TaskBlueprint, member: &TeamMember) -> f64 {
        let history = self.tracker.snapshot(&member.member_id);
        if history.completed_tasks < 2 {
            return member.experience_level;
        }

        let overall = history.performance_score();

        let required = &blueprint.metadata.required_skills;
        let skill_component = if required.is_empty() {
            overall
        } else {
            required
                .iter()
                .map(|s| *history.skill_performance.get(s).unwrap_or(&overall))
                .sum::<f64>()
                / required.len() as f64
        };

        let bucket = TaskComplexity::from_score(blueprint.complexity_score).as_key();
        let complexity_component = *history
            .complexity_performance
            .get(bucket)
            .unwrap_or(&overall);

        (overall * 0.4 + skill_component * 0.4 + complexity_component * 0.2).clamp(0.0, 1.0)
    }

    /// Availability sub-score: 1 minus half the load ratio, 0 when no
    /// hours remain.
    fn availability_score(&self, blueprint: &TaskBlueprint, member: &TeamMember) -> f64 {
        if member.availability_hours <= 0.0 {
            return 0.0;
        }
        let needed = blueprint.metadata.estimated_duration_minutes as f64 / 60.0;
        1.0 - 0.5 * (needed / member.availability_hours).min(1.0)
    }

    /// Quadratic workload penalty plus a capped load-ratio term, in [0,1].
    fn workload_penalty(&self, blueprint: &TaskBlueprint, member: &TeamMember) -> f64 {
        let needed = blueprint.metadata.estimated_duration_minutes as f64 / 60.0;
        let ratio_term = if member.availability_hours <= 0.0 {
            0.5
        } else {
            (needed / member.availability_hours).min(0.5)
        };
        (member.current_workload.powi(2) + ratio_term).min(1.0)
    }

    /// Full breakdown for one candidate under the default blend.
    pub fn score_candidate(&self, blueprint: &TaskBlueprint, member: &TeamMember) -> CandidateScore {
        self.score_with(blueprint, member, ScoreWeights::default())
    }

    fn score_with(
        &self,
        blueprint: &TaskBlueprint,
        member: &TeamMember,
        weights: ScoreWeights,
    ) -> CandidateScore {
        let skill = self.skill_score(blueprint, member);
        let performance = self.performance_score(blueprint, member);
        let availability = self.availability_score(blueprint, member);
        let workload_penalty = self.workload_penalty(blueprint, member);

        let total = skill * weights.skill
            + performance * weights.performance
            + availability * weights.availability
            + (1.0 - workload_penalty) * weights.workload;

        CandidateScore {
            skill,
            performance,
            availability,
            workload_penalty,
            total,
        }
    }

    // ---------------------------------------------------------------
    // Decision history
    // ---------------------------------------------------------------

    fn record_decision(
        &self,
        member_id: &str,
        blueprint: &TaskBlueprint,
        total_score: f64,
        alternatives: usize,
    ) {
        let mut decisions = self.decisions.lock().unwrap();
        if decisions.len() >= self.history_cap {
            decisions.pop_front();
        }
        decisions.push_back(RoutingDecision {
            timestamp: Utc::now(),
            member_id: member_id.to_string(),
            blueprint_id: blueprint.blueprint_id.clone(),
            total_score,
            alternatives,
        });
    }

    fn member_decision_times(&self, member_id: &str) -> Vec<DateTime<Utc>> {
        self.decisions
            .lock()
            .unwrap()
            .iter()
            .filter(|d| d.member_id == member_id)
            .map(|d| d.timestamp)
            .collect()
    }
}
