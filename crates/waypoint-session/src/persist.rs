//! Workflow persistence backends
//!
//! [`PersistenceService`] is the seam between the editor session and
//! whatever actually stores workflows. [`FilePersistence`] keeps one
//! pretty-printed JSON file per workflow in a directory;
//! [`MemoryPersistence`] backs tests and ephemeral sessions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use waypoint_graph::{NodeData, TriggerEventConfig, WorkflowGraph};

use crate::error::{Result, SessionError};

/// Storage backend for workflow graphs.
///
/// Saving with `workflow_id: None` creates a new workflow and returns
/// its assigned id; subsequent saves pass that id back to overwrite.
#[async_trait]
pub trait PersistenceService: Send + Sync {
    /// Save a graph, returning the workflow id it was stored under.
    async fn save(&self, workflow_id: Option<&str>, graph: &WorkflowGraph) -> Result<String>;

    /// Load a workflow by id.
    async fn load(&self, workflow_id: &str) -> Result<WorkflowGraph>;

    /// Delete a workflow by id. Deleting an unknown id is not an error.
    async fn delete(&self, workflow_id: &str) -> Result<()>;

    /// Trigger configurations of a stored workflow's start node.
    ///
    /// Backends with a cheaper path than a full load may override this.
    async fn load_trigger_events(&self, workflow_id: &str) -> Result<Vec<TriggerEventConfig>> {
        let graph = self.load(workflow_id).await?;
        let triggers = graph
            .start_node()
            .and_then(|node| match &node.data {
                NodeData::Start(data) => Some(data.triggers.clone()),
                _ => None,
            })
            .unwrap_or_default();
        Ok(triggers)
    }
}

/// In-memory backend for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    workflows: Mutex<HashMap<String, WorkflowGraph>>,
    save_count: AtomicUsize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of saves performed, for asserting autosave behavior.
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PersistenceService for MemoryPersistence {
    async fn save(&self, workflow_id: Option<&str>, graph: &WorkflowGraph) -> Result<String> {
        let id = workflow_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("wf-{}", Uuid::new_v4()));
        self.workflows
            .lock()
            .unwrap()
            .insert(id.clone(), graph.clone());
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn load(&self, workflow_id: &str) -> Result<WorkflowGraph> {
        self.workflows
            .lock()
            .unwrap()
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| SessionError::NotFound(workflow_id.to_string()))
    }

    async fn delete(&self, workflow_id: &str) -> Result<()> {
        self.workflows.lock().unwrap().remove(workflow_id);
        Ok(())
    }
}

/// File-backed persistence: one JSON file per workflow in a directory.
#[derive(Debug)]
pub struct FilePersistence {
    dir: PathBuf,
}

impl FilePersistence {
    /// The directory is created on first save if it does not exist.
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// List ids of all workflows stored in the directory.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map_or(false, |e| e == "json") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn path_for(&self, workflow_id: &str) -> PathBuf {
        self.dir.join(format!("{workflow_id}.json"))
    }
}

#[async_trait]
impl PersistenceService for FilePersistence {
    async fn save(&self, workflow_id: Option<&str>, graph: &WorkflowGraph) -> Result<String> {
        let id = workflow_id
            .map(str::to_string)
            .unwrap_or_else(|| format!("wf-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(&id);
        let content = serde_json::to_string_pretty(graph)?;
        std::fs::write(&path, content)?;
        log::debug!("saved workflow '{}' to {:?}", id, path);
        Ok(id)
    }

    async fn load(&self, workflow_id: &str) -> Result<WorkflowGraph> {
        let path = self.path_for(workflow_id);
        if !path.exists() {
            return Err(SessionError::NotFound(workflow_id.to_string()));
        }
        let content = std::fs::read_to_string(&path)?;
        let graph = serde_json::from_str(&content)?;
        log::debug!("loaded workflow '{}' from {:?}", workflow_id, path);
        Ok(graph)
    }

    async fn delete(&self, workflow_id: &str) -> Result<()> {
        let path = self.path_for(workflow_id);
        if path.exists() {
            std::fs::remove_file(&path)?;
            log::debug!("deleted workflow '{}' from {:?}", workflow_id, path);
        }
        Ok(())
    }
}
