//! The workflow graph and its mutation primitives
//!
//! Nodes and connections live in flat vectors keyed by id; every
//! topology query (parent, children, descendants) is derived on demand
//! rather than stored, so removing a node can never leave a dangling
//! back-reference.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::types::{BranchHandle, Connection, ConnectionId, NodeId, WorkflowNode};

/// A complete workflow definition graph
///
/// This is the single source of truth during an editing session. All
/// mutation happens through explicit user edits; there is no
/// background mutation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowGraph {
    /// Unique identifier for this workflow
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Nodes in the graph
    pub nodes: Vec<WorkflowNode>,
    /// Directed connections between nodes
    pub connections: Vec<Connection>,
}

impl WorkflowGraph {
    /// Create a new empty graph
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Find a node by ID
    pub fn find_node(&self, node_id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.id == node_id)
    }

    /// Find a node by ID (mutable)
    pub fn find_node_mut(&mut self, node_id: &str) -> Option<&mut WorkflowNode> {
        self.nodes.iter_mut().find(|n| n.id == node_id)
    }

    /// The start node, if present
    pub fn start_node(&self) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|n| n.data.is_start())
    }

    /// All end nodes
    pub fn end_nodes(&self) -> Vec<&WorkflowNode> {
        self.nodes.iter().filter(|n| n.data.is_end()).collect()
    }

    /// Connections entering a node
    pub fn incoming<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.target == node_id)
    }

    /// Connections leaving a node
    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a Connection> + 'a {
        self.connections.iter().filter(move |c| c.source == node_id)
    }

    /// All direct children of a node, on any handle
    pub fn children_of(&self, node_id: &str) -> Vec<&WorkflowNode> {
        self.outgoing(node_id)
            .filter_map(|c| self.find_node(&c.target))
            .collect()
    }

    /// Direct children reached through a specific handle
    ///
    /// `None` selects the default handle, so condition branches can be
    /// queried without ambiguity.
    pub fn children_on(&self, node_id: &str, handle: Option<BranchHandle>) -> Vec<&WorkflowNode> {
        self.outgoing(node_id)
            .filter(|c| c.source_handle == handle)
            .filter_map(|c| self.find_node(&c.target))
            .collect()
    }

    /// The node's parent: source of the first connection targeting it
    pub fn parent_of(&self, node_id: &str) -> Option<&WorkflowNode> {
        self.parent_connection_of(node_id)
            .and_then(|c| self.find_node(&c.source))
    }

    /// The first connection targeting the node, handle included
    pub fn parent_connection_of(&self, node_id: &str) -> Option<&Connection> {
        self.connections.iter().find(|c| c.target == node_id)
    }

    /// Transitive closure of a node's children via BFS over outgoing edges
    ///
    /// The node itself is not included.
    pub fn descendants_of(&self, node_id: &str) -> HashSet<NodeId> {
        let mut seen: HashSet<NodeId> = HashSet::new();
        let mut queue: VecDeque<&str> = VecDeque::new();
        queue.push_back(node_id);

        while let Some(current) = queue.pop_front() {
            for conn in self.outgoing(current) {
                if seen.insert(conn.target.clone()) {
                    queue.push_back(conn.target.as_str());
                }
            }
        }

        seen.remove(node_id);
        seen
    }

    // =========================================================================
    // Mutation primitives
    // =========================================================================

    /// Add a node, generating an ID if it has none
    pub fn add_node(&mut self, mut node: WorkflowNode) -> Result<NodeId> {
        if node.id.is_empty() {
            node.id = format!("node-{}", uuid::Uuid::new_v4());
        }
        if self.find_node(&node.id).is_some() {
            return Err(GraphError::DuplicateNodeId(node.id));
        }
        let id = node.id.clone();
        self.nodes.push(node);
        Ok(id)
    }

    /// Remove a node and every connection touching it
    ///
    /// When the removed node had exactly one inbound connection and one
    /// or more outbound connections on the default handle, the inbound
    /// source is relinked directly to each outbound target (the
    /// inbound edge's handle is preserved), so a linear chain stays
    /// connected. Branch-handle children are never auto-relinked: which
    /// branch should absorb them is ambiguous, and the caller decides.
    pub fn remove_node(&mut self, node_id: &str) -> Result<WorkflowNode> {
        let index = self
            .nodes
            .iter()
            .position(|n| n.id == node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;

        let inbound: Vec<Connection> = self.incoming(node_id).cloned().collect();
        let default_outbound: Vec<Connection> = self
            .outgoing(node_id)
            .filter(|c| c.source_handle.is_none())
            .cloned()
            .collect();

        self.connections
            .retain(|c| c.source != node_id && c.target != node_id);

        if inbound.len() == 1 && !default_outbound.is_empty() {
            let parent = &inbound[0];
            for child in &default_outbound {
                let relinked =
                    self.add_connection(&parent.source, &child.target, parent.source_handle);
                log::debug!(
                    "Relinked '{}' -> '{}' ({}) after removing '{}'",
                    parent.source,
                    child.target,
                    relinked,
                    node_id
                );
            }
        }

        Ok(self.nodes.remove(index))
    }

    /// Add a connection, or return the existing one on a duplicate
    /// `(source, target, handle)` triple
    pub fn add_connection(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: Option<BranchHandle>,
    ) -> ConnectionId {
        let source = source.into();
        let target = target.into();
        if let Some(existing) = self
            .connections
            .iter()
            .find(|c| c.matches(&source, &target, source_handle))
        {
            return existing.id.clone();
        }
        let conn = Connection::new(source, target, source_handle);
        let id = conn.id.clone();
        self.connections.push(conn);
        id
    }

    /// Remove every connection between two nodes, on any handle
    ///
    /// Returns how many connections were removed.
    pub fn remove_connection(&mut self, source: &str, target: &str) -> usize {
        let before = self.connections.len();
        self.connections
            .retain(|c| !(c.source == source && c.target == target));
        before - self.connections.len()
    }

    /// Remove a single connection by ID
    pub fn remove_connection_by_id(&mut self, connection_id: &str) -> bool {
        let before = self.connections.len();
        self.connections.retain(|c| c.id != connection_id);
        before != self.connections.len()
    }

    /// Move a node to a new canvas position; topology is untouched
    pub fn move_node(&mut self, node_id: &str, position: (f64, f64)) -> Result<()> {
        let node = self
            .find_node_mut(node_id)
            .ok_or_else(|| GraphError::NodeNotFound(node_id.to_string()))?;
        node.position = position;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ActivityData, ConditionData, EndData, NodeData, StartData};

    fn make_node(id: &str, data: NodeData) -> WorkflowNode {
        WorkflowNode::with_id(id, data, (0.0, 0.0))
    }

    fn make_chain() -> WorkflowGraph {
        // start -> a -> b -> end
        let mut graph = WorkflowGraph::new("wf", "Chain");
        graph
            .add_node(make_node("start", NodeData::Start(StartData::default())))
            .unwrap();
        graph
            .add_node(make_node("a", NodeData::Activity(ActivityData::new("A"))))
            .unwrap();
        graph
            .add_node(make_node("b", NodeData::Activity(ActivityData::new("B"))))
            .unwrap();
        graph
            .add_node(make_node("end", NodeData::End(EndData::default())))
            .unwrap();
        graph.add_connection("start", "a", None);
        graph.add_connection("a", "b", None);
        graph.add_connection("b", "end", None);
        graph
    }

    #[test]
    fn test_add_node_generates_missing_id() {
        let mut graph = WorkflowGraph::new("wf", "Test");
        let id = graph
            .add_node(WorkflowNode::with_id(
                "",
                NodeData::End(EndData::default()),
                (0.0, 0.0),
            ))
            .unwrap();
        assert!(!id.is_empty());
        assert!(graph.find_node(&id).is_some());
    }

    #[test]
    fn test_add_node_rejects_duplicate_id() {
        let mut graph = make_chain();
        let result = graph.add_node(make_node("a", NodeData::End(EndData::default())));
        assert!(matches!(result, Err(GraphError::DuplicateNodeId(_))));
    }

    #[test]
    fn test_add_connection_is_idempotent() {
        let mut graph = make_chain();
        let before = graph.connections.len();
        let first = graph.add_connection("start", "a", None);
        assert_eq!(graph.connections.len(), before);
        // The existing connection's id comes back.
        assert_eq!(
            Some(first.as_str()),
            graph
                .connections
                .iter()
                .find(|c| c.source == "start" && c.target == "a")
                .map(|c| c.id.as_str())
        );
    }

    #[test]
    fn test_remove_node_relinks_linear_chain() {
        let mut graph = make_chain();
        graph.remove_node("a").unwrap();

        assert!(graph.find_node("a").is_none());
        assert!(graph
            .connections
            .iter()
            .any(|c| c.source == "start" && c.target == "b"));
        assert!(!graph
            .connections
            .iter()
            .any(|c| c.source == "a" || c.target == "a"));
    }

    #[test]
    fn test_remove_node_skips_branch_children() {
        // start -> cond -(yes)-> a, cond -(no)-> b
        let mut graph = WorkflowGraph::new("wf", "Branch");
        graph
            .add_node(make_node("start", NodeData::Start(StartData::default())))
            .unwrap();
        graph
            .add_node(make_node(
                "cond",
                NodeData::Condition(ConditionData::default()),
            ))
            .unwrap();
        graph
            .add_node(make_node("a", NodeData::Activity(ActivityData::new("A"))))
            .unwrap();
        graph
            .add_node(make_node("b", NodeData::Activity(ActivityData::new("B"))))
            .unwrap();
        graph.add_connection("start", "cond", None);
        graph.add_connection("cond", "a", Some(BranchHandle::Yes));
        graph.add_connection("cond", "b", Some(BranchHandle::No));

        graph.remove_node("cond").unwrap();

        // Ambiguous branches are left detached, not guessed at.
        assert!(graph.connections.is_empty());
    }

    #[test]
    fn test_remove_node_preserves_inbound_handle() {
        // cond -(yes)-> a -> end: removing `a` keeps the yes branch.
        let mut graph = WorkflowGraph::new("wf", "Handle");
        graph
            .add_node(make_node(
                "cond",
                NodeData::Condition(ConditionData::default()),
            ))
            .unwrap();
        graph
            .add_node(make_node("a", NodeData::Activity(ActivityData::new("A"))))
            .unwrap();
        graph
            .add_node(make_node("end", NodeData::End(EndData::default())))
            .unwrap();
        graph.add_connection("cond", "a", Some(BranchHandle::Yes));
        graph.add_connection("a", "end", None);

        graph.remove_node("a").unwrap();

        assert_eq!(graph.connections.len(), 1);
        let conn = &graph.connections[0];
        assert_eq!(conn.source, "cond");
        assert_eq!(conn.target, "end");
        assert_eq!(conn.source_handle, Some(BranchHandle::Yes));
    }

    #[test]
    fn test_parent_and_children_queries() {
        let graph = make_chain();
        assert_eq!(graph.parent_of("b").unwrap().id, "a");
        assert_eq!(graph.children_of("a").len(), 1);
        assert_eq!(graph.children_of("a")[0].id, "b");
        assert!(graph.parent_of("start").is_none());
    }

    #[test]
    fn test_parent_connection_includes_handle() {
        let mut graph = WorkflowGraph::new("wf", "Handle");
        graph
            .add_node(make_node(
                "cond",
                NodeData::Condition(ConditionData::default()),
            ))
            .unwrap();
        graph
            .add_node(make_node("a", NodeData::Activity(ActivityData::new("A"))))
            .unwrap();
        graph.add_connection("cond", "a", Some(BranchHandle::Yes));

        let conn = graph.parent_connection_of("a").unwrap();
        assert_eq!(conn.source, "cond");
        assert_eq!(conn.source_handle, Some(BranchHandle::Yes));
        assert!(graph.parent_connection_of("cond").is_none());
    }

    #[test]
    fn test_children_on_handle() {
        let mut graph = WorkflowGraph::new("wf", "Branch");
        graph
            .add_node(make_node(
                "cond",
                NodeData::Condition(ConditionData::default()),
            ))
            .unwrap();
        graph
            .add_node(make_node("yes", NodeData::Activity(ActivityData::new("Y"))))
            .unwrap();
        graph
            .add_node(make_node("no", NodeData::Activity(ActivityData::new("N"))))
            .unwrap();
        graph.add_connection("cond", "yes", Some(BranchHandle::Yes));
        graph.add_connection("cond", "no", Some(BranchHandle::No));

        let yes_children = graph.children_on("cond", Some(BranchHandle::Yes));
        assert_eq!(yes_children.len(), 1);
        assert_eq!(yes_children[0].id, "yes");
        assert!(graph.children_on("cond", None).is_empty());
    }

    #[test]
    fn test_descendants_bfs() {
        let graph = make_chain();
        let descendants = graph.descendants_of("a");
        assert!(descendants.contains("b"));
        assert!(descendants.contains("end"));
        assert!(!descendants.contains("start"));
        assert!(!descendants.contains("a"));
    }

    #[test]
    fn test_move_node_only_changes_position() {
        let mut graph = make_chain();
        let connections = graph.connections.clone();
        graph.move_node("a", (250.0, 125.0)).unwrap();
        assert_eq!(graph.find_node("a").unwrap().position, (250.0, 125.0));
        assert_eq!(graph.connections, connections);
    }

    #[test]
    fn test_remove_connection_any_handle() {
        let mut graph = WorkflowGraph::new("wf", "Test");
        graph
            .add_node(make_node(
                "cond",
                NodeData::Condition(ConditionData::default()),
            ))
            .unwrap();
        graph
            .add_node(make_node("a", NodeData::Activity(ActivityData::new("A"))))
            .unwrap();
        graph.add_connection("cond", "a", Some(BranchHandle::Yes));
        graph.add_connection("cond", "a", Some(BranchHandle::No));

        assert_eq!(graph.remove_connection("cond", "a"), 2);
        assert!(graph.connections.is_empty());
    }
}
