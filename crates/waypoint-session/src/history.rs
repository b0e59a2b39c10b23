//! Undo/redo history for an editing session
//!
//! History entries are full graph snapshots, serialized to JSON and
//! zstd-compressed. Snapshots sidestep inverse operations entirely:
//! any mutation the editor performs can be undone by restoring the
//! previous snapshot, including restructuring moves and auto-fixes.

use std::collections::VecDeque;

use waypoint_graph::WorkflowGraph;

use crate::error::{Result, SessionError};

const COMPRESSION_LEVEL: i32 = 3;

/// Bounded undo/redo stack of compressed graph snapshots.
pub struct EditHistory {
    snapshots: VecDeque<Vec<u8>>,
    /// Index of the snapshot the editor currently shows
    cursor: usize,
    capacity: usize,
}

impl EditHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            snapshots: VecDeque::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Record a new state, discarding any redo entries beyond the
    /// cursor and the oldest entries beyond capacity.
    pub fn record(&mut self, graph: &WorkflowGraph) -> Result<()> {
        let compressed = compress(graph)?;

        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(compressed);
        self.cursor = self.snapshots.len() - 1;

        while self.snapshots.len() > self.capacity {
            self.snapshots.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
        }
        Ok(())
    }

    /// Step back one state, if there is one.
    pub fn undo(&mut self) -> Option<Result<WorkflowGraph>> {
        if self.cursor == 0 {
            return None;
        }
        self.cursor -= 1;
        Some(decompress(&self.snapshots[self.cursor]))
    }

    /// Step forward one state, if an undo left one ahead.
    pub fn redo(&mut self) -> Option<Result<WorkflowGraph>> {
        if self.cursor + 1 >= self.snapshots.len() {
            return None;
        }
        self.cursor += 1;
        Some(decompress(&self.snapshots[self.cursor]))
    }

    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.cursor = 0;
    }
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new(100)
    }
}

fn compress(graph: &WorkflowGraph) -> Result<Vec<u8>> {
    let json = serde_json::to_vec(graph)?;
    zstd::encode_all(&json[..], COMPRESSION_LEVEL)
        .map_err(|e| SessionError::Compression(e.to_string()))
}

fn decompress(snapshot: &[u8]) -> Result<WorkflowGraph> {
    let json =
        zstd::decode_all(snapshot).map_err(|e| SessionError::Compression(e.to_string()))?;
    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use waypoint_graph::{TriggerEventConfig, WorkflowBuilder};

    fn workflow(name: &str) -> WorkflowGraph {
        WorkflowBuilder::new("wf", name)
            .add_start("start", vec![TriggerEventConfig::new("event", "view")], (0.0, 0.0))
            .add_end("end", (100.0, 0.0))
            .connect("start", "end")
            .build()
    }

    #[test]
    fn test_record_and_undo() {
        let mut history = EditHistory::new(10);
        history.record(&workflow("first")).unwrap();
        history.record(&workflow("second")).unwrap();
        history.record(&workflow("third")).unwrap();

        assert_eq!(history.undo().unwrap().unwrap().name, "second");
        assert_eq!(history.undo().unwrap().unwrap().name, "first");
        assert!(history.undo().is_none());
    }

    #[test]
    fn test_redo_after_undo() {
        let mut history = EditHistory::new(10);
        history.record(&workflow("first")).unwrap();
        history.record(&workflow("second")).unwrap();

        history.undo();
        assert_eq!(history.redo().unwrap().unwrap().name, "second");
        assert!(history.redo().is_none());
    }

    #[test]
    fn test_record_truncates_redo_branch() {
        let mut history = EditHistory::new(10);
        history.record(&workflow("first")).unwrap();
        history.record(&workflow("second")).unwrap();
        history.undo();

        history.record(&workflow("replacement")).unwrap();
        assert!(!history.can_redo());
        assert_eq!(history.undo().unwrap().unwrap().name, "first");
    }

    #[test]
    fn test_capacity_drops_oldest() {
        let mut history = EditHistory::new(3);
        for i in 0..5 {
            history.record(&workflow(&format!("v{i}"))).unwrap();
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.undo().unwrap().unwrap().name, "v3");
        assert_eq!(history.undo().unwrap().unwrap().name, "v2");
        assert!(!history.can_undo());
    }

    #[test]
    fn test_clear() {
        let mut history = EditHistory::new(10);
        history.record(&workflow("first")).unwrap();
        history.clear();
        assert!(history.is_empty());
        assert!(!history.can_undo());
        assert!(!history.can_redo());
    }
}
