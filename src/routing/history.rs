//! Historical performance tracking.
//!
//! Per-member [`PerformanceHistory`] records are smoothed with an
//! exponential moving average and mutated only through
//! [`PerformanceTracker::update_outcome`]. Reads return cloned
//! snapshots so scoring never holds the lock while computing.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Datelike, Duration, Utc};

use crate::clog_debug;
use crate::core::{PerformanceHistory, TaskComplexity};

/// EMA-smoothed performance state for all known members.
///
/// The tracker is the single owner of history mutation; the routing
/// engine reads snapshots and feeds outcomes back through it. A missing
/// member yields [`PerformanceHistory::default`], never an error.
pub struct PerformanceTracker {
    histories: RwLock<HashMap<String, PerformanceHistory>>,
    /// EMA learning rate.
    alpha: f64,
}

impl PerformanceTracker {
    /// Create a tracker with the given EMA learning rate.
    pub fn new(alpha: f64) -> Self {
        Self {
            histories: RwLock::new(HashMap::new()),
            alpha: alpha.clamp(0.0, 1.0),
        }
    }

    /// `new = (1 - alpha) * old + alpha * sample`
    fn ema(&self, old: f64, sample: f64) -> f64 {
        (1.0 - self.alpha) * old + self.alpha * sample
    }

    /// Snapshot of a member's history, defaults if unseen.
    pub fn snapshot(&self, member_id: &str) -> PerformanceHistory {
        self.histories
            .read()
            .unwrap()
            .get(member_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Completed-task count for a member, 0 if unseen.
    pub fn completed_tasks(&self, member_id: &str) -> u64 {
        self.histories
            .read()
            .unwrap()
            .get(member_id)
            .map(|h| h.completed_tasks)
            .unwrap_or(0)
    }

    /// Fold one completed assignment into the member's history.
    ///
    /// The time ratio is `actual / estimated` (1.0 when the estimate is
    /// zero). Success feeds the success-rate EMA directly; per-skill and
    /// per-complexity-bucket quality samples are `clamp(2 - ratio, 0, 1)`
    /// on success and 0.0 on failure, so a failed or badly overrun task
    /// drags the relevant skill scores down. Map entries are seeded with
    /// the first sample rather than an assumed prior.
    pub fn update_outcome(
        &self,
        member_id: &str,
        complexity: TaskComplexity,
        required_skills: &[String],
        estimated_minutes: u32,
        actual_minutes: u32,
        success: bool,
        now: DateTime<Utc>,
    ) {
        let ratio = if estimated_minutes == 0 {
            1.0
        } else {
            actual_minutes as f64 / estimated_minutes as f64
        };
        let success_sample = if success { 1.0 } else { 0.0 };
        let quality_sample = if success {
            (2.0 - ratio).clamp(0.0, 1.0)
        } else {
            0.0
        };

        let mut histories = self.histories.write().unwrap();
        let history = histories.entry(member_id.to_string()).or_default();

        history.average_completion_time_ratio =
            self.ema(history.average_completion_time_ratio, ratio);
        history.success_rate = self.ema(history.success_rate, success_sample);

        for skill in required_skills {
            let entry = history
                .skill_performance
                .entry(skill.clone())
                .or_insert(quality_sample);
            *entry = self.ema(*entry, quality_sample);
        }

        let bucket = complexity.as_key().to_string();
        let entry = history
            .complexity_performance
            .entry(bucket)
            .or_insert(quality_sample);
        *entry = self.ema(*entry, quality_sample);

        history.completed_tasks += 1;
        history.last_updated = now;

        clog_debug!(
            "Outcome recorded member={} ratio={:.2} success={} completed={}",
            member_id,
            ratio,
            success,
            history.completed_tasks
        );
    }

    /// Recompute a member's recent velocity from assignment timestamps.
    ///
    /// Velocity is assignments inside the trailing 7-day window divided
    /// by the number of distinct active days in that window (min 1). An
    /// empty window leaves the default of 1.0 untouched.
    pub fn recompute_velocity(
        &self,
        member_id: &str,
        assignment_times: &[DateTime<Utc>],
        now: DateTime<Utc>,
    ) {
        let window_start = now - Duration::days(7);
        let recent: Vec<&DateTime<Utc>> = assignment_times
            .iter()
            .filter(|t| **t >= window_start && **t <= now)
            .collect();
        if recent.is_empty() {
            return;
        }

        let mut active_days: Vec<i64> = recent
            .iter()
            .map(|t| t.date_naive().num_days_from_ce() as i64)
            .collect();
        active_days.sort_unstable();
        active_days.dedup();
        let days = active_days.len().max(1) as f64;

        let velocity = recent.len() as f64 / days;

        let mut histories = self.histories.write().unwrap();
        let history = histories.entry(member_id.to_string()).or_default();
        history.recent_velocity = velocity;
        history.last_updated = now;
    }
}
