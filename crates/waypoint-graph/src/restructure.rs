//! Drag-and-drop tree restructuring
//!
//! Moving a node is planned as a pure function over the connection
//! list: detach the dragged node, heal the gap it leaves, then splice
//! it back in relative to the drop target. `plan_move` computes the
//! resulting connection list without touching the graph; `apply_move`
//! commits it. A failed plan therefore leaves the graph exactly as it
//! was.

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::store::WorkflowGraph;
use crate::types::{BranchHandle, Connection, NodeId};

/// Where the dragged node lands relative to the drop target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPosition {
    /// Between the target and its current parent
    Before,
    /// Between the target and its current children
    After,
    /// As a new child of the target, optionally on a branch handle
    Child,
}

/// A drop gesture decoded from the editor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropInstruction {
    pub target: NodeId,
    pub position: DropPosition,
    /// Branch handle for `Child` drops onto a condition node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<BranchHandle>,
}

/// Plan the connection list that results from moving `dragged_id`
/// according to `drop`, without mutating the graph.
pub fn plan_move(
    graph: &WorkflowGraph,
    dragged_id: &str,
    drop: &DropInstruction,
) -> Result<Vec<Connection>> {
    if graph.find_node(dragged_id).is_none() {
        return Err(GraphError::NodeNotFound(dragged_id.to_string()));
    }
    if graph.find_node(&drop.target).is_none() {
        return Err(GraphError::NodeNotFound(drop.target.clone()));
    }
    if dragged_id == drop.target {
        return Err(GraphError::MoveOntoSelf(dragged_id.to_string()));
    }
    if graph.descendants_of(dragged_id).contains(drop.target.as_str()) {
        return Err(GraphError::MoveIntoOwnSubtree {
            dragged: dragged_id.to_string(),
            target: drop.target.clone(),
        });
    }

    let mut planned: Vec<Connection> = graph.connections.clone();

    // Detach: pull out the dragged node's parent edge and child edges.
    let parent_edge = planned
        .iter()
        .position(|c| c.target == dragged_id)
        .map(|i| planned.remove(i));
    let child_edges: Vec<Connection> = {
        let mut out = Vec::new();
        planned.retain(|c| {
            if c.source == dragged_id {
                out.push(c.clone());
                false
            } else {
                true
            }
        });
        out
    };

    // Heal: the dragged node's parent adopts its children, keeping the
    // handle the parent used to reach the dragged node.
    if let Some(parent_edge) = &parent_edge {
        for child in &child_edges {
            push_edge(
                &mut planned,
                &parent_edge.source,
                &child.target,
                parent_edge.source_handle,
            );
        }
    }

    match drop.position {
        DropPosition::Before => {
            // Steal the target's parent edge, keeping its handle.
            let displaced = planned
                .iter()
                .position(|c| c.target == drop.target)
                .map(|i| planned.remove(i));
            if let Some(displaced) = displaced {
                push_edge(&mut planned, &displaced.source, dragged_id, displaced.source_handle);
            }
            push_edge(&mut planned, dragged_id, &drop.target, None);
        }
        DropPosition::After => {
            // The target's children become the dragged node's children.
            let former_children: Vec<Connection> = {
                let mut out = Vec::new();
                planned.retain(|c| {
                    if c.source == drop.target {
                        out.push(c.clone());
                        false
                    } else {
                        true
                    }
                });
                out
            };
            push_edge(&mut planned, &drop.target, dragged_id, None);
            for child in &former_children {
                push_edge(&mut planned, dragged_id, &child.target, None);
            }
        }
        DropPosition::Child => {
            push_edge(&mut planned, &drop.target, dragged_id, drop.branch);
        }
    }

    Ok(planned)
}

/// Plan a move and commit the resulting connection list to the graph.
pub fn apply_move(
    graph: &mut WorkflowGraph,
    dragged_id: &str,
    drop: &DropInstruction,
) -> Result<()> {
    let planned = plan_move(graph, dragged_id, drop)?;
    log::debug!(
        "moving node {} {:?} {} ({} connections)",
        dragged_id,
        drop.position,
        drop.target,
        planned.len()
    );
    graph.connections = planned;
    Ok(())
}

fn push_edge(
    planned: &mut Vec<Connection>,
    source: &str,
    target: &str,
    handle: Option<BranchHandle>,
) {
    if !planned.iter().any(|c| c.matches(source, target, handle)) {
        planned.push(Connection::new(source, target, handle));
    }
}
