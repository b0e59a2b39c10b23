//! Structural validation for workflow graphs
//!
//! Validation is total: it never fails, it always returns a complete
//! report over the snapshot it was given, even for a structurally
//! nonsensical graph. Dangling connection endpoints are tolerated by
//! treating the referenced node as absent.
//!
//! Two severities exist. Errors block `is_valid`; warnings are
//! informational, and a subset carries a `fix_type` the auto-fixer can
//! apply mechanically.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::store::WorkflowGraph;
use crate::types::{ActivityData, ConditionData, DelayData, NodeData, StartData, WorkflowNode};
use crate::types::BranchHandle;

/// Issue severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Error,
    Warning,
}

/// Mechanical correction the auto-fixer knows how to apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixType {
    AddDefaultRoute,
    AddPlaceholderAction,
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    /// Node the issue is about; absent for graph-level issues
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
    /// Route the issue is about, for activity route findings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,
    pub message: String,
    #[serde(default)]
    pub fixable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix_type: Option<FixType>,
}

impl ValidationIssue {
    fn error(node_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            node_id: node_id.map(str::to_string),
            route_id: None,
            message: message.into(),
            fixable: false,
            fix_type: None,
        }
    }

    fn warning(node_id: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            node_id: node_id.map(str::to_string),
            route_id: None,
            message: message.into(),
            fixable: false,
            fix_type: None,
        }
    }

    fn fixable_warning(node_id: &str, fix_type: FixType, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            node_id: Some(node_id.to_string()),
            route_id: None,
            message: message.into(),
            fixable: true,
            fix_type: Some(fix_type),
        }
    }

    fn on_route(mut self, route_id: &str) -> Self {
        self.route_id = Some(route_id.to_string());
        self
    }
}

/// Complete validation result over one graph snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// True exactly when no errors are present; warnings never block
    pub is_valid: bool,
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Issues of both severities, errors first
    pub fn all_issues(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.errors.iter().chain(self.warnings.iter())
    }
}

/// Validate a workflow graph snapshot
///
/// Rule groups run in a fixed order: start node and triggers, end
/// node, per-node connectivity, reachability in both directions, then
/// per-kind payload checks.
pub fn validate(graph: &WorkflowGraph) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_start(graph, &mut errors);
    check_end(graph, &mut errors);
    check_connectivity(graph, &mut warnings);
    check_reachability(graph, &mut warnings);

    for node in &graph.nodes {
        match &node.data {
            NodeData::Activity(activity) => {
                check_activity(node, activity, graph, &mut errors, &mut warnings);
            }
            NodeData::Condition(condition) => {
                check_condition(node, condition, graph, &mut warnings, &mut errors);
            }
            NodeData::Delay(delay) => check_delay(node, delay, &mut errors),
            NodeData::Start(_) | NodeData::End(_) => {}
        }
    }

    let is_valid = errors.is_empty();
    ValidationReport {
        is_valid,
        errors,
        warnings,
    }
}

fn check_start(graph: &WorkflowGraph, errors: &mut Vec<ValidationIssue>) {
    let starts: Vec<&WorkflowNode> = graph.nodes.iter().filter(|n| n.data.is_start()).collect();

    match starts.as_slice() {
        [] => errors.push(ValidationIssue::error(
            None,
            "Workflow has no start node",
        )),
        [start] => check_triggers(start, errors),
        multiple => {
            errors.push(ValidationIssue::error(
                None,
                "Workflow has multiple start nodes",
            ));
            for start in multiple {
                check_triggers(start, errors);
            }
        }
    }
}

fn check_triggers(start: &WorkflowNode, errors: &mut Vec<ValidationIssue>) {
    let NodeData::Start(data) = &start.data else {
        return;
    };

    if data.triggers.is_empty() {
        // Legacy single-trigger graphs keep the pair on the node itself.
        if !has_legacy_trigger(data) {
            errors.push(ValidationIssue::error(
                Some(&start.id),
                "Start node has no trigger event configured",
            ));
        }
        return;
    }

    for trigger in &data.triggers {
        if trigger.item_type.is_empty() || trigger.trigger_event.is_empty() {
            errors.push(ValidationIssue::error(
                Some(&start.id),
                "A trigger event is missing its item type or event",
            ));
        }
    }
}

fn has_legacy_trigger(data: &StartData) -> bool {
    data.item_type.as_deref().is_some_and(|s| !s.is_empty())
        && data.trigger_event.as_deref().is_some_and(|s| !s.is_empty())
}

fn check_end(graph: &WorkflowGraph, errors: &mut Vec<ValidationIssue>) {
    if graph.end_nodes().is_empty() {
        errors.push(ValidationIssue::error(None, "Workflow has no end node"));
    }
}

fn check_connectivity(graph: &WorkflowGraph, warnings: &mut Vec<ValidationIssue>) {
    let has_incoming: HashSet<&str> = graph.connections.iter().map(|c| c.target.as_str()).collect();
    let has_outgoing: HashSet<&str> = graph.connections.iter().map(|c| c.source.as_str()).collect();

    for node in &graph.nodes {
        if !node.data.is_start() && !has_incoming.contains(node.id.as_str()) {
            warnings.push(ValidationIssue::warning(
                Some(&node.id),
                format!("{} has no incoming connection", node.display_label()),
            ));
        }
        if !node.data.is_end() && !has_outgoing.contains(node.id.as_str()) {
            warnings.push(ValidationIssue::warning(
                Some(&node.id),
                format!("{} has no outgoing connection", node.display_label()),
            ));
        }
    }
}

/// Forward BFS from the start node and backward BFS from every end
/// node. Both passes always run; a node missing from either set gets
/// its own warning, on top of anything the connectivity rules found.
fn check_reachability(graph: &WorkflowGraph, warnings: &mut Vec<ValidationIssue>) {
    let forward = bfs(graph, graph.start_node().map(|n| n.id.as_str()).into_iter(), true);
    let backward = bfs(graph, graph.end_nodes().iter().map(|n| n.id.as_str()), false);

    for node in &graph.nodes {
        if node.data.is_start() || node.data.is_end() {
            continue;
        }
        if !forward.contains(node.id.as_str()) {
            warnings.push(ValidationIssue::warning(
                Some(&node.id),
                format!("{} is not reachable from the start node", node.display_label()),
            ));
        }
        if !backward.contains(node.id.as_str()) {
            warnings.push(ValidationIssue::warning(
                Some(&node.id),
                format!("{} does not lead to an end node", node.display_label()),
            ));
        }
    }
}

fn bfs<'a>(
    graph: &'a WorkflowGraph,
    roots: impl Iterator<Item = &'a str>,
    forward: bool,
) -> HashSet<&'a str> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();

    for root in roots {
        if seen.insert(root) {
            queue.push_back(root);
        }
    }

    while let Some(current) = queue.pop_front() {
        for conn in &graph.connections {
            let next = if forward && conn.source == current {
                conn.target.as_str()
            } else if !forward && conn.target == current {
                conn.source.as_str()
            } else {
                continue;
            };
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }

    seen
}

fn check_activity(
    node: &WorkflowNode,
    activity: &ActivityData,
    graph: &WorkflowGraph,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) {
    let label = &activity.label;

    for route in &activity.routes {
        if route.target_activity_id.is_empty() {
            errors.push(
                ValidationIssue::error(
                    Some(&node.id),
                    format!("Route in '{}' has no target activity selected", label),
                )
                .on_route(&route.id),
            );
        } else {
            let resolves = graph
                .find_node(&route.target_activity_id)
                .is_some_and(|n| n.data.is_activity());
            if !resolves {
                errors.push(
                    ValidationIssue::error(
                        Some(&node.id),
                        format!("Route in '{}' points to a non-existent activity", label),
                    )
                    .on_route(&route.id),
                );
            }
        }

        if route.is_default {
            continue;
        }

        match &route.condition {
            None => {
                // Legal but suspicious: a non-default route with no
                // condition simply never matches.
                warnings.push(
                    ValidationIssue::warning(
                        Some(&node.id),
                        format!("Route in '{}' has no condition configured", label),
                    )
                    .on_route(&route.id),
                );
            }
            Some(condition) => {
                if condition.field.is_empty() {
                    errors.push(
                        ValidationIssue::error(
                            Some(&node.id),
                            format!("Route condition in '{}' is missing a field", label),
                        )
                        .on_route(&route.id),
                    );
                }
                match condition.operator {
                    None => errors.push(
                        ValidationIssue::error(
                            Some(&node.id),
                            format!("Route condition in '{}' is missing an operator", label),
                        )
                        .on_route(&route.id),
                    ),
                    Some(op) if op.requires_value() && condition.value.is_empty() => {
                        errors.push(
                            ValidationIssue::error(
                                Some(&node.id),
                                format!("Route condition in '{}' is missing a value", label),
                            )
                            .on_route(&route.id),
                        );
                    }
                    Some(_) => {}
                }
            }
        }
    }

    if !activity.routes.is_empty() && activity.default_route().is_none() {
        warnings.push(ValidationIssue::fixable_warning(
            &node.id,
            FixType::AddDefaultRoute,
            format!("Activity '{}' has no default route", label),
        ));
    }

    if activity.actions.is_empty() {
        warnings.push(ValidationIssue::fixable_warning(
            &node.id,
            FixType::AddPlaceholderAction,
            format!("Activity '{}' has no actions defined", label),
        ));
    }
}

fn check_condition(
    node: &WorkflowNode,
    condition: &ConditionData,
    graph: &WorkflowGraph,
    warnings: &mut Vec<ValidationIssue>,
    errors: &mut Vec<ValidationIssue>,
) {
    if condition.condition_field.is_empty() {
        errors.push(ValidationIssue::error(
            Some(&node.id),
            "Condition node is missing a field to check",
        ));
    }
    if condition.condition_operator.is_none() {
        errors.push(ValidationIssue::error(
            Some(&node.id),
            "Condition node is missing an operator",
        ));
    }

    for handle in [BranchHandle::Yes, BranchHandle::No] {
        let connected = graph
            .outgoing(&node.id)
            .any(|c| c.source_handle == Some(handle));
        if !connected {
            warnings.push(ValidationIssue::warning(
                Some(&node.id),
                format!("Condition node has no '{}' branch connected", handle.as_str()),
            ));
        }
    }
}

fn check_delay(node: &WorkflowNode, delay: &DelayData, errors: &mut Vec<ValidationIssue>) {
    if delay.delay_amount <= 0 {
        errors.push(ValidationIssue::error(
            Some(&node.id),
            "Delay amount must be a positive number",
        ));
    }
    if delay.delay_unit.is_none() {
        errors.push(ValidationIssue::error(
            Some(&node.id),
            "Delay node is missing a time unit",
        ));
    }
}
