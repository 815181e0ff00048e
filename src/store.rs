//! Storage and caching boundaries.
//!
//! The core never talks to a database directly; callers supply a
//! [`BlueprintStore`] for durable blueprint/dependency persistence and
//! optionally a [`PerformanceCache`] for history snapshots. In-memory
//! implementations back tests and single-process deployments.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::{Duration, Instant};

use crate::core::{validate_edges, PerformanceHistory, TaskBlueprint, TaskDependency};
use crate::error::{Error, Result};

/// Durable, project-scoped blueprint storage.
pub trait BlueprintStore: Send + Sync {
    /// Insert or replace a blueprint.
    fn put_blueprint(&self, blueprint: TaskBlueprint) -> Result<()>;
    /// Fetch a blueprint by id.
    fn get_blueprint(&self, blueprint_id: &str) -> Result<TaskBlueprint>;
    /// Delete a blueprint and every dependency edge touching it.
    fn delete_blueprint(&self, blueprint_id: &str) -> Result<()>;
    /// All blueprints in a project, in insertion order.
    fn list_by_project(&self, project_id: &str) -> Result<Vec<TaskBlueprint>>;
    /// Persist a dependency edge after validating the combined edge set
    /// stays acyclic.
    fn put_dependency(&self, edge: TaskDependency) -> Result<()>;
    /// Edges in which the blueprint appears as the dependent.
    fn dependencies_of(&self, blueprint_id: &str) -> Result<Vec<TaskDependency>>;
}

/// Key-value cache for performance-history snapshots.
///
/// Absence of a cache degrades routing to in-memory history only.
pub trait PerformanceCache: Send + Sync {
    fn put(&self, member_id: &str, history: PerformanceHistory, ttl: Duration);
    fn get(&self, member_id: &str) -> Option<PerformanceHistory>;
}

/// Cache key for a member's history snapshot.
pub fn performance_key(member_id: &str) -> String {
    format!("routing:performance:{member_id}")
}

/// In-memory [`BlueprintStore`].
#[derive(Default)]
pub struct MemoryStore {
    blueprints: RwLock<Vec<TaskBlueprint>>,
    edges: RwLock<Vec<TaskDependency>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlueprintStore for MemoryStore {
    fn put_blueprint(&self, blueprint: TaskBlueprint) -> Result<()> {
        let mut blueprints = self.blueprints.write().unwrap();
        if let Some(existing) = blueprints
            .iter_mut()
            .find(|b| b.blueprint_id == blueprint.blueprint_id)
        {
            *existing = blueprint;
        } else {
            blueprints.push(blueprint);
        }
        Ok(())
    }

    fn get_blueprint(&self, blueprint_id: &str) -> Result<TaskBlueprint> {
        self.blueprints
            .read()
            .unwrap()
            .iter()
            .find(|b| b.blueprint_id == blueprint_id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("blueprint {blueprint_id}")))
    }

    fn delete_blueprint(&self, blueprint_id: &str) -> Result<()> {
        let mut blueprints = self.blueprints.write().unwrap();
        let before = blueprints.len();
        blueprints.retain(|b| b.blueprint_id != blueprint_id);
        if blueprints.len() == before {
            return Err(Error::NotFound(format!("blueprint {blueprint_id}")));
        }
        drop(blueprints);

        self.edges.write().unwrap().retain(|e| {
            e.dependent_task_id != blueprint_id && e.prerequisite_task_id != blueprint_id
        });
        Ok(())
    }

    fn list_by_project(&self, project_id: &str) -> Result<Vec<TaskBlueprint>> {
        Ok(self
            .blueprints
            .read()
            .unwrap()
            .iter()
            .filter(|b| b.project_id == project_id)
            .cloned()
            .collect())
    }

    fn put_dependency(&self, edge: TaskDependency) -> Result<()> {
        let mut edges = self.edges.write().unwrap();
        // Dedupe on (dependent, prerequisite)
        if edges.iter().any(|e| {
            e.dependent_task_id == edge.dependent_task_id
                && e.prerequisite_task_id == edge.prerequisite_task_id
        }) {
            return Ok(());
        }

        edges.push(edge);
        if let Err(err) = validate_edges(&edges) {
            edges.pop();
            return Err(err);
        }
        Ok(())
    }

    fn dependencies_of(&self, blueprint_id: &str) -> Result<Vec<TaskDependency>> {
        Ok(self
            .edges
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.dependent_task_id == blueprint_id)
            .cloned()
            .collect())
    }
}

/// In-memory TTL cache for history snapshots.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, (PerformanceHistory, Instant)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PerformanceCache for MemoryCache {
    fn put(&self, member_id: &str, history: PerformanceHistory, ttl: Duration) {
        self.entries
            .lock()
            .unwrap()
            .insert(performance_key(member_id), (history, Instant::now() + ttl));
    }

    fn get(&self, member_id: &str) -> Option<PerformanceHistory> {
        let mut entries = self.entries.lock().unwrap();
        let key = performance_key(member_id);
        match entries.get(&key) {
            Some((history, expires)) if *expires > Instant::now() => Some(history.clone()),
            Some(_) => {
                entries.remove(&key);
                None
            }
            None => None,
        }
    }
}
