//! Task blueprint data model.
//!
//! Blueprints are the units of work routed to team members. Each blueprint
//! carries a derived (or explicitly pinned) complexity score, metadata with
//! the skills and duration needed, and a tenant-scoping project id.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::scoring::ComplexityScorer;

/// Ordered complexity buckets for a blueprint.
///
/// Each bucket carries a representative numeric score used by the routing
/// engine's complexity-performance lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskComplexity {
    Trivial,
    Simple,
    Moderate,
    Complex,
    Critical,
}

impl TaskComplexity {
    /// The representative numeric score for this bucket.
    pub fn score(&self) -> f64 {
        match self {
            TaskComplexity::Trivial => 0.1,
            TaskComplexity::Simple => 0.3,
            TaskComplexity::Moderate => 0.5,
            TaskComplexity::Complex => 0.7,
            TaskComplexity::Critical => 0.9,
        }
    }

    /// Human-readable description of the bucket.
    pub fn description(&self) -> &'static str {
        match self {
            TaskComplexity::Trivial => "Quick fixes and trivial changes",
            TaskComplexity::Simple => "Small, well-understood tasks",
            TaskComplexity::Moderate => "Standard features with known approach",
            TaskComplexity::Complex => "Large features or cross-cutting changes",
            TaskComplexity::Critical => "Architectural or high-risk work",
        }
    }

    /// Stable string key used in performance maps.
    pub fn as_key(&self) -> &'static str {
        match self {
            TaskComplexity::Trivial => "trivial",
            TaskComplexity::Simple => "simple",
            TaskComplexity::Moderate => "moderate",
            TaskComplexity::Complex => "complex",
            TaskComplexity::Critical => "critical",
        }
    }

    /// Map a continuous score to the nearest bucket.
    ///
    /// Thresholds are half-open: <=0.2 Trivial, <=0.4 Simple, <=0.6 Moderate,
    /// <=0.8 Complex, else Critical.
    pub fn from_score(score: f64) -> Self {
        if score <= 0.2 {
            TaskComplexity::Trivial
        } else if score <= 0.4 {
            TaskComplexity::Simple
        } else if score <= 0.6 {
            TaskComplexity::Moderate
        } else if score <= 0.8 {
            TaskComplexity::Complex
        } else {
            TaskComplexity::Critical
        }
    }
}

impl std::fmt::Display for TaskComplexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_key())
    }
}

/// Metadata attached to a blueprint.
///
/// Validated at construction: `priority_score` must be in [0,1]. Skills are
/// normalized to lowercase so matching is case-insensitive everywhere else.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskMetadata {
    /// Estimated duration in minutes.
    pub estimated_duration_minutes: u32,
    /// Skills required to complete the work, lowercased, in caller order.
    pub required_skills: Vec<String>,
    /// Priority in [0,1].
    pub priority_score: f64,
    /// Free-form resource requirements (e.g. "gpu" -> "1").
    pub resource_requirements: HashMap<String, String>,
    /// Free-form tags.
    pub tags: Vec<String>,
    /// When the metadata was created.
    pub created_at: DateTime<Utc>,
    /// When the metadata was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TaskMetadata {
    /// Create validated metadata.
    ///
    /// # Errors
    /// Returns `Error::Validation` if `priority_score` is outside [0,1].
    pub fn new(
        estimated_duration_minutes: u32,
        required_skills: Vec<String>,
        priority_score: f64,
    ) -> Result<Self> {
        if !(0.0..=1.0).contains(&priority_score) {
            return Err(Error::validation(
                "priority_score",
                priority_score.to_string(),
                "must be in [0,1]",
            ));
        }

        let now = Utc::now();
        Ok(Self {
            estimated_duration_minutes,
            required_skills: normalize_skills(required_skills),
            priority_score,
            resource_requirements: HashMap::new(),
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Attach tags, returning self for chaining.
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Attach a resource requirement, returning self for chaining.
    pub fn with_resource(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.resource_requirements.insert(key.into(), value.into());
        self
    }
}

/// Lowercase skills and drop duplicates while preserving first-seen order.
pub(crate) fn normalize_skills(skills: Vec<String>) -> Vec<String> {
    let mut seen = Vec::new();
    for skill in skills {
        let lower = skill.trim().to_lowercase();
        if !lower.is_empty() && !seen.contains(&lower) {
            seen.push(lower);
        }
    }
    seen
}

/// Validate a caller-supplied identifier (blueprint, member, project).
///
/// Identifiers must be non-empty and contain only alphanumerics, `_` or `-`.
pub fn validate_id(field: &str, id: &str) -> Result<()> {
    if id.is_empty() {
        return Err(Error::validation(field, id, "must be non-empty"));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        return Err(Error::validation(
            field,
            id,
            "must be alphanumeric plus '_' or '-'",
        ));
    }
    Ok(())
}

/// A unit of engineering work.
///
/// Created via [`TaskBlueprint::new`], which auto-scores complexity from the
/// title, description, and required skills unless an explicit score is
/// supplied. Mutations that change the text or skills re-score unless the
/// complexity has been pinned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskBlueprint {
    /// Unique identifier (alphanumeric plus `_`/`-`).
    pub blueprint_id: String,
    /// Human-readable title, non-empty.
    pub title: String,
    /// Detailed description of the work.
    pub description: String,
    /// Continuous complexity score in [0,1].
    pub complexity_score: f64,
    /// Bucketed complexity derived from the score.
    pub complexity: TaskComplexity,
    /// When true, mutations never re-score.
    pub complexity_pinned: bool,
    /// Duration, skills, priority, resources, tags.
    pub metadata: TaskMetadata,
    /// Tenant scope. Routing never crosses project boundaries.
    pub project_id: String,
    /// When the blueprint was created.
    pub created_at: DateTime<Utc>,
    /// When the blueprint was last updated.
    pub updated_at: DateTime<Utc>,
}

impl TaskBlueprint {
    /// Create a new blueprint, auto-scoring its complexity.
    ///
    /// # Errors
    /// Returns `Error::Validation` if the id is malformed or the title is
    /// empty.
    pub fn new(
        blueprint_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        metadata: TaskMetadata,
        project_id: impl Into<String>,
        scorer: &ComplexityScorer,
    ) -> Result<Self> {
        let blueprint_id = blueprint_id.into();
        let title = title.into();
        let description = description.into();
        let project_id = project_id.into();

        validate_id("blueprint_id", &blueprint_id)?;
        validate_id("project_id", &project_id)?;
        if title.trim().is_empty() {
            return Err(Error::validation("title", &title, "must be non-empty"));
        }

        let score = scorer.score(&title, &description, &metadata.required_skills);
        let now = Utc::now();

        Ok(Self {
            blueprint_id,
            title,
            description,
            complexity_score: score,
            complexity: TaskComplexity::from_score(score),
            complexity_pinned: false,
            metadata,
            project_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Create a blueprint with an explicitly pinned complexity score.
    ///
    /// Pinned blueprints are never re-scored by later mutations.
    pub fn with_score(
        blueprint_id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        metadata: TaskMetadata,
        project_id: impl Into<String>,
        score: f64,
    ) -> Result<Self> {
        let blueprint_id = blueprint_id.into();
        let title = title.into();
        let project_id = project_id.into();

        validate_id("blueprint_id", &blueprint_id)?;
        validate_id("project_id", &project_id)?;
        if title.trim().is_empty() {
            return Err(Error::validation("title", &title, "must be non-empty"));
        }

        let score = score.clamp(0.0, 1.0);
        let now = Utc::now();

        Ok(Self {
            blueprint_id,
            title,
            description: description.into(),
            complexity_score: score,
            complexity: TaskComplexity::from_score(score),
            complexity_pinned: true,
            metadata,
            project_id,
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the description, re-scoring unless complexity is pinned.
    pub fn update_description(&mut self, description: impl Into<String>, scorer: &ComplexityScorer) {
        self.description = description.into();
        self.rescore(scorer);
    }

    /// Replace the required skills, re-scoring unless complexity is pinned.
    pub fn update_skills(&mut self, skills: Vec<String>, scorer: &ComplexityScorer) {
        self.metadata.required_skills = normalize_skills(skills);
        self.metadata.updated_at = Utc::now();
        self.rescore(scorer);
    }

    /// Pin complexity to an explicit score; later mutations stop re-scoring.
    pub fn pin_complexity(&mut self, score: f64) {
        self.complexity_score = score.clamp(0.0, 1.0);
        self.complexity = TaskComplexity::from_score(self.complexity_score);
        self.complexity_pinned = true;
        self.updated_at = Utc::now();
    }

    /// Estimated duration in fractional hours.
    pub fn estimated_hours(&self) -> f64 {
        f64::from(self.metadata.estimated_duration_minutes) / 60.0
    }

    fn rescore(&mut self, scorer: &ComplexityScorer) {
        if !self.complexity_pinned {
            let score = scorer.score(&self.title, &self.description, &self.metadata.required_skills);
            self.complexity_score = score;
            self.complexity = TaskComplexity::from_score(score);
        }
        self.updated_at = Utc::now();
    }
}
