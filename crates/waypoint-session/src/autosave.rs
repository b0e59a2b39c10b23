//! Debounced autosave
//!
//! Each edit schedules a save after a quiet period; a newer edit
//! supersedes the older timer, so a burst of edits produces one save of
//! the final state. Cancellation is a generation check made after the
//! quiet period and before the write begins: a save that has already
//! been handed to the backend always runs to completion, while a
//! superseded or torn-down timer wakes, sees a newer generation, and
//! does nothing.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use waypoint_graph::WorkflowGraph;

use crate::error::Result;
use crate::persist::PersistenceService;

/// Debounced persistence driver for one editing session.
pub struct Autosave {
    service: Arc<dyn PersistenceService>,
    delay: Duration,
    /// Assigned on the first completed save of a new workflow, then
    /// reused so later saves overwrite instead of creating copies.
    workflow_id: Arc<Mutex<Option<String>>>,
    /// Bumped by every schedule and cancel; a timer only saves if the
    /// generation it captured is still current when it wakes.
    generation: Arc<AtomicU64>,
}

impl Autosave {
    /// Create an autosave for a workflow that does not exist yet; the
    /// first completed save assigns its id.
    pub fn new(service: Arc<dyn PersistenceService>, delay: Duration) -> Self {
        Self::for_workflow(service, delay, None)
    }

    /// Create an autosave bound to an existing workflow id.
    pub fn for_workflow(
        service: Arc<dyn PersistenceService>,
        delay: Duration,
        workflow_id: Option<String>,
    ) -> Self {
        Self {
            service,
            delay,
            workflow_id: Arc::new(Mutex::new(workflow_id)),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// The workflow id saves go to, once one has been assigned.
    pub fn workflow_id(&self) -> Option<String> {
        self.workflow_id.lock().unwrap().clone()
    }

    /// Schedule a save of this snapshot after the quiet period,
    /// superseding any save still waiting out its timer.
    pub fn schedule(&mut self, graph: WorkflowGraph) {
        let my_generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let service = Arc::clone(&self.service);
        let workflow_id = Arc::clone(&self.workflow_id);
        let generation = Arc::clone(&self.generation);
        let delay = self.delay;

        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // A newer edit, flush, or teardown superseded this timer.
            if generation.load(Ordering::SeqCst) != my_generation {
                return;
            }
            let current_id = workflow_id.lock().unwrap().clone();
            match service.save(current_id.as_deref(), &graph).await {
                Ok(id) => {
                    *workflow_id.lock().unwrap() = Some(id);
                }
                Err(e) => {
                    log::warn!("autosave failed: {}", e);
                }
            }
        });
    }

    /// Save immediately, superseding any pending debounced save.
    pub async fn flush(&mut self, graph: &WorkflowGraph) -> Result<String> {
        self.cancel();
        let current_id = self.workflow_id.lock().unwrap().clone();
        let id = self.service.save(current_id.as_deref(), graph).await?;
        *self.workflow_id.lock().unwrap() = Some(id.clone());
        Ok(id)
    }

    /// Supersede any save still waiting out its timer.
    ///
    /// A save that has already started writing is not interrupted; it
    /// completes normally.
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}

impl Drop for Autosave {
    fn drop(&mut self) {
        self.cancel();
    }
}
