//! Blueprint decomposition.
//!
//! Oversized or highly complex blueprints are split into ordered subtask
//! blueprints using fixed strategy templates. Decomposition never fails;
//! anything that cannot be split cleanly falls back to a single-subtask
//! result.

use crate::config::Config;
use crate::{clog_debug, clog_warn};
use crate::core::{
    DependencyGraph, DependencyKind, TaskBlueprint, TaskDependency, TaskMetadata,
};
use crate::error::Result;

/// Duration split weights, truncated to the template length and
/// renormalized.
const STEP_WEIGHTS: [f64; 5] = [1.0, 1.5, 1.2, 1.0, 0.8];

/// How a blueprint was split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecompositionStrategy {
    ApiDevelopment,
    FeatureImplementation,
    SystemArchitecture,
    DataProcessing,
}

impl std::fmt::Display for DecompositionStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::ApiDevelopment => "api_development",
            Self::FeatureImplementation => "feature_implementation",
            Self::SystemArchitecture => "system_architecture",
            Self::DataProcessing => "data_processing",
        };
        write!(f, "{name}")
    }
}

struct StrategyTemplate {
    strategy: DecompositionStrategy,
    keywords: &'static [&'static str],
    steps: &'static [&'static str],
}

// feature_implementation is the fallback and is matched last.
const TEMPLATES: &[StrategyTemplate] = &[
    StrategyTemplate {
        strategy: DecompositionStrategy::ApiDevelopment,
        keywords: &["api", "endpoint", "rest", "graphql", "grpc"],
        steps: &[
            "Design API contract",
            "Implement endpoints",
            "Add validation and error handling",
            "Write integration tests",
        ],
    },
    StrategyTemplate {
        strategy: DecompositionStrategy::SystemArchitecture,
        keywords: &[
            "architecture",
            "migration",
            "redesign",
            "infrastructure",
            "distributed",
        ],
        steps: &[
            "Draft architecture proposal",
            "Build proof of concept",
            "Implement core components",
            "Migrate and verify",
        ],
    },
    StrategyTemplate {
        strategy: DecompositionStrategy::DataProcessing,
        keywords: &["data", "pipeline", "etl", "ingestion", "processing"],
        steps: &[
            "Define data schema",
            "Build extraction and transforms",
            "Implement loading and storage",
            "Validate output quality",
        ],
    },
    StrategyTemplate {
        strategy: DecompositionStrategy::FeatureImplementation,
        keywords: &["feature", "implement", "add"],
        steps: &[
            "Design and spec the change",
            "Implement core logic",
            "Integrate with existing modules",
            "Write tests",
            "Polish and document",
        ],
    },
];

/// Outcome of a decomposition call.
#[derive(Debug, Clone)]
pub struct DecompositionResult {
    /// Ordered subtask blueprints. Contains the original blueprint alone
    /// when no decomposition was needed.
    pub subtasks: Vec<TaskBlueprint>,
    /// Blocking edges chaining consecutive subtasks.
    pub dependencies: Vec<TaskDependency>,
    /// Topological execution order over the subtask ids.
    pub execution_order: Vec<String>,
    /// Longest single subtask, the parallel completion estimate.
    pub parallel_minutes: u32,
    /// Sum of all subtask durations, the sequential estimate.
    pub sequential_minutes: u32,
    pub strategy: DecompositionStrategy,
    /// False when the blueprint was returned unsplit.
    pub decomposed: bool,
}

/// Splits oversized blueprints into ordered subtasks.
pub struct DecompositionPlanner {
    complexity_threshold: f64,
    max_decomposition_minutes: u32,
    min_subtask_minutes: u32,
}

impl DecompositionPlanner {
    pub fn new(config: &Config) -> Self {
        Self {
            complexity_threshold: config.complexity_threshold,
            max_decomposition_minutes: config.max_decomposition_minutes,
            min_subtask_minutes: config.min_subtask_duration_minutes,
        }
    }

    /// Whether a blueprint is big enough to warrant splitting.
    pub fn requires_decomposition(&self, blueprint: &TaskBlueprint) -> bool {
        blueprint.complexity_score >= self.complexity_threshold
            || blueprint.metadata.estimated_duration_minutes > self.max_decomposition_minutes
    }

    /// Split a blueprint into ordered subtasks.
    ///
    /// Small blueprints come back as a single-entry result with
    /// `decomposed = false`. Splitting cannot fail: any internal error
    /// degrades to the same single-entry result.
    pub fn decompose(&self, blueprint: &TaskBlueprint) -> DecompositionResult {
        if !self.requires_decomposition(blueprint) {
            return Self::passthrough(blueprint);
        }

        match self.split(blueprint) {
            Ok(result) => result,
            Err(err) => {
                clog_warn!(
                    "Decomposition of {} degraded to passthrough: {}",
                    blueprint.blueprint_id,
                    err
                );
                Self::passthrough(blueprint)
            }
        }
    }

    fn passthrough(blueprint: &TaskBlueprint) -> DecompositionResult {
        let minutes = blueprint.metadata.estimated_duration_minutes;
        DecompositionResult {
            subtasks: vec![blueprint.clone()],
            dependencies: Vec::new(),
            execution_order: vec![blueprint.blueprint_id.clone()],
            parallel_minutes: minutes,
            sequential_minutes: minutes,
            strategy: DecompositionStrategy::FeatureImplementation,
            decomposed: false,
        }
    }

    fn split(&self, blueprint: &TaskBlueprint) -> Result<DecompositionResult> {
        let template = Self::select_template(&blueprint.title, &blueprint.description);
        let durations = self.split_durations(
            blueprint.metadata.estimated_duration_minutes,
            template.steps.len(),
        );
        let subtask_score = (blueprint.complexity_score - 0.2).max(0.1);

        let mut subtasks = Vec::with_capacity(template.steps.len());
        let mut dependencies = Vec::new();
        let mut graph = DependencyGraph::new();

        for (i, (step, minutes)) in template.steps.iter().zip(&durations).enumerate() {
            let n = i + 1;
            let sub_id = format!("{}_sub{}", blueprint.blueprint_id, n);

            let metadata = TaskMetadata::new(
                *minutes,
                blueprint.metadata.required_skills.clone(),
                blueprint.metadata.priority_score,
            )?
            .with_tags({
                let mut tags = blueprint.metadata.tags.clone();
                tags.push(format!("subtask_{n}"));
                tags
            });

            let subtask = TaskBlueprint::with_score(
                &sub_id,
                format!("{}: {}", blueprint.title, step),
                blueprint.description.clone(),
                metadata,
                &blueprint.project_id,
                subtask_score,
            )?;

            graph.add_blueprint(&sub_id);
            if i > 0 {
                let prev_id = format!("{}_sub{}", blueprint.blueprint_id, n - 1);
                let edge =
                    TaskDependency::new(&sub_id, &prev_id, DependencyKind::Blocking, true)?;
                graph.add_dependency(&edge)?;
                dependencies.push(edge);
            }
            subtasks.push(subtask);
        }

        let execution_order = graph.execution_order()?;
        let sequential_minutes = durations.iter().sum();
        let parallel_minutes = durations.iter().copied().max().unwrap_or(0);

        clog_debug!(
            "Decomposed {} into {} subtasks via {} (seq={}m par={}m)",
            blueprint.blueprint_id,
            subtasks.len(),
            template.strategy,
            sequential_minutes,
            parallel_minutes
        );

        Ok(DecompositionResult {
            subtasks,
            dependencies,
            execution_order,
            parallel_minutes,
            sequential_minutes,
            strategy: template.strategy,
            decomposed: true,
        })
    }

    fn select_template(title: &str, description: &str) -> &'static StrategyTemplate {
        let text = format!("{} {}", title, description).to_lowercase();
        TEMPLATES
            .iter()
            .find(|t| t.keywords.iter().any(|k| text.contains(k)))
            .unwrap_or(&TEMPLATES[3])
    }

    /// Split `total` minutes across `steps` using the fixed weights,
    /// floored to integers and clamped to the minimum subtask duration.
    fn split_durations(&self, total: u32, steps: usize) -> Vec<u32> {
        let weights = &STEP_WEIGHTS[..steps.min(STEP_WEIGHTS.len())];
        let weight_sum: f64 = weights.iter().sum();

        weights
            .iter()
            .map(|w| {
                let share = (total as f64 * w / weight_sum).floor() as u32;
                share.max(self.min_subtask_minutes)
            })
            .collect()
    }
}
