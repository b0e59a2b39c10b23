//! Fluent construction of workflow graphs
//!
//! Mostly used by tests and fixtures; connection ids are sequential
//! rather than random so built graphs compare stably.

use crate::store::WorkflowGraph;
use crate::types::{
    ActionItem, ActivityData, ActivityRoute, BranchHandle, ConditionData, ConditionOperator,
    Connection, DelayData, DelayUnit, EndData, NodeData, StartData, TriggerEventConfig,
    WorkflowNode,
};

/// Builder for assembling a [`WorkflowGraph`] node by node.
#[derive(Debug)]
pub struct WorkflowBuilder {
    graph: WorkflowGraph,
    next_connection: usize,
    last_activity: Option<String>,
}

impl WorkflowBuilder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            graph: WorkflowGraph {
                id: id.into(),
                name: name.into(),
                ..WorkflowGraph::default()
            },
            next_connection: 0,
            last_activity: None,
        }
    }

    pub fn add_start(
        mut self,
        id: impl Into<String>,
        triggers: Vec<TriggerEventConfig>,
        position: (f64, f64),
    ) -> Self {
        let mut data = StartData {
            triggers,
            ..StartData::default()
        };
        data.resequence_triggers();
        self.push_node(id, position, NodeData::Start(data));
        self
    }

    pub fn add_end(mut self, id: impl Into<String>, position: (f64, f64)) -> Self {
        self.push_node(id, position, NodeData::End(EndData::default()));
        self
    }

    pub fn add_activity(
        mut self,
        id: impl Into<String>,
        label: impl Into<String>,
        position: (f64, f64),
    ) -> Self {
        let id = id.into();
        self.last_activity = Some(id.clone());
        self.push_node(id, position, NodeData::Activity(ActivityData::new(label)));
        self
    }

    /// Set the actions of the most recently added activity.
    pub fn with_actions(mut self, actions: Vec<ActionItem>) -> Self {
        if let Some(activity) = self.last_activity_mut() {
            activity.actions = actions;
        }
        self
    }

    /// Set the routes of the most recently added activity.
    pub fn with_routes(mut self, routes: Vec<ActivityRoute>) -> Self {
        if let Some(activity) = self.last_activity_mut() {
            activity.routes = routes;
        }
        self
    }

    pub fn add_condition(
        mut self,
        id: impl Into<String>,
        field: impl Into<String>,
        operator: Option<ConditionOperator>,
        value: impl Into<String>,
        position: (f64, f64),
    ) -> Self {
        self.push_node(
            id,
            position,
            NodeData::Condition(ConditionData {
                condition_field: field.into(),
                condition_operator: operator,
                condition_value: value.into(),
            }),
        );
        self
    }

    pub fn add_delay(
        mut self,
        id: impl Into<String>,
        amount: i64,
        unit: Option<DelayUnit>,
        position: (f64, f64),
    ) -> Self {
        self.push_node(
            id,
            position,
            NodeData::Delay(DelayData {
                delay_amount: amount,
                delay_unit: unit,
            }),
        );
        self
    }

    /// Connect two nodes along the default path.
    pub fn connect(self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.push_connection(source, target, None)
    }

    /// Connect a condition node's branch to a target.
    pub fn connect_branch(
        self,
        source: impl Into<String>,
        handle: BranchHandle,
        target: impl Into<String>,
    ) -> Self {
        self.push_connection(source, target, Some(handle))
    }

    pub fn build(self) -> WorkflowGraph {
        self.graph
    }

    fn push_node(&mut self, id: impl Into<String>, position: (f64, f64), data: NodeData) {
        self.graph.nodes.push(WorkflowNode {
            id: id.into(),
            position,
            data,
        });
    }

    fn push_connection(
        mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        handle: Option<BranchHandle>,
    ) -> Self {
        self.graph.connections.push(Connection {
            id: format!("conn-{}", self.next_connection),
            source: source.into(),
            target: target.into(),
            source_handle: handle,
        });
        self.next_connection += 1;
        self
    }

    fn last_activity_mut(&mut self) -> Option<&mut ActivityData> {
        let id = self.last_activity.clone()?;
        match &mut self.graph.find_node_mut(&id)?.data {
            NodeData::Activity(activity) => Some(activity),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_connected_workflow() {
        let graph = WorkflowBuilder::new("wf-1", "Onboarding")
            .add_start("start", vec![TriggerEventConfig::new("user", "signup")], (0.0, 0.0))
            .add_activity("welcome", "Welcome", (100.0, 0.0))
            .with_actions(vec![ActionItem::placeholder()])
            .add_end("end", (200.0, 0.0))
            .connect("start", "welcome")
            .connect("welcome", "end")
            .build();

        assert_eq!(graph.id, "wf-1");
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.connections.len(), 2);
        assert_eq!(graph.connections[0].id, "conn-0");
        assert!(graph.start_node().is_some());

        let NodeData::Activity(activity) = &graph.find_node("welcome").unwrap().data else {
            panic!("not an activity");
        };
        assert_eq!(activity.actions.len(), 1);
    }

    #[test]
    fn test_trigger_sequence_is_normalized() {
        let mut first = TriggerEventConfig::new("user", "signup");
        first.seq = 7;
        let second = TriggerEventConfig::new("order", "placed");

        let graph = WorkflowBuilder::new("wf", "Seq")
            .add_start("start", vec![first, second], (0.0, 0.0))
            .build();

        let NodeData::Start(data) = &graph.find_node("start").unwrap().data else {
            panic!("not a start");
        };
        assert_eq!(data.triggers[0].seq, 0);
        assert_eq!(data.triggers[1].seq, 1);
    }
}
