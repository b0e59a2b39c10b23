//! Core types for automation workflow graphs
//!
//! These types define the structure of a workflow definition: nodes,
//! connections, trigger events, actions, and routes. The shape mirrors
//! the JSON exchanged with the visual editor, so every public type
//! derives serde with camelCase field names.

use serde::{Deserialize, Serialize};

use crate::throttle::TriggerThrottleConfig;

/// Unique identifier for a node
pub type NodeId = String;

/// Unique identifier for a connection
pub type ConnectionId = String;

/// Branch label on an edge leaving a condition node
///
/// Edges from any other node type carry no handle. Keeping this a closed
/// enum (rather than a free string) makes the one-edge-per-handle
/// invariant checkable by type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchHandle {
    Yes,
    No,
}

impl BranchHandle {
    /// String form used in validation messages
    pub fn as_str(&self) -> &'static str {
        match self {
            BranchHandle::Yes => "yes",
            BranchHandle::No => "no",
        }
    }
}

/// A directed connection between two nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection {
    /// Unique identifier for this connection
    pub id: ConnectionId,
    /// Source node ID
    pub source: NodeId,
    /// Target node ID
    pub target: NodeId,
    /// Branch handle, set only on edges leaving a condition node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<BranchHandle>,
}

impl Connection {
    /// Create a new connection with a generated ID
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: Option<BranchHandle>,
    ) -> Self {
        Self {
            id: format!("conn-{}", uuid::Uuid::new_v4()),
            source: source.into(),
            target: target.into(),
            source_handle,
        }
    }

    /// Check whether this connection matches a `(source, target, handle)` triple
    pub fn matches(&self, source: &str, target: &str, handle: Option<BranchHandle>) -> bool {
        self.source == source && self.target == target && self.source_handle == handle
    }
}

/// A node instance in a workflow graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowNode {
    /// Unique identifier for this node instance
    pub id: NodeId,
    /// Position in the visual editor (x, y)
    pub position: (f64, f64),
    /// Node payload, tagged by node type
    pub data: NodeData,
}

impl WorkflowNode {
    /// Create a new node with a generated ID
    pub fn new(data: NodeData, position: (f64, f64)) -> Self {
        Self {
            id: format!("node-{}", uuid::Uuid::new_v4()),
            position,
            data,
        }
    }

    /// Create a new node with an explicit ID
    pub fn with_id(id: impl Into<String>, data: NodeData, position: (f64, f64)) -> Self {
        Self {
            id: id.into(),
            position,
            data,
        }
    }

    /// Label used in validation messages
    pub fn display_label(&self) -> &str {
        self.data.display_label()
    }
}

/// Payload of a workflow node, tagged by node type
///
/// Exhaustive matching on this enum guarantees every node kind is
/// handled by the validator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeData {
    /// Entry point: an ordered list of trigger events. Exactly one per graph.
    Start(StartData),
    /// Exit point. A graph needs at least one.
    End(EndData),
    /// An ordered list of actions followed by route selection.
    Activity(ActivityData),
    /// A yes/no branch on a single field comparison.
    Condition(ConditionData),
    /// A fixed wait before continuing.
    Delay(DelayData),
}

impl NodeData {
    /// Whether this is a start node
    pub fn is_start(&self) -> bool {
        matches!(self, NodeData::Start(_))
    }

    /// Whether this is an end node
    pub fn is_end(&self) -> bool {
        matches!(self, NodeData::End(_))
    }

    /// Whether this is an activity node
    pub fn is_activity(&self) -> bool {
        matches!(self, NodeData::Activity(_))
    }

    /// Label used in validation messages
    pub fn display_label(&self) -> &str {
        match self {
            NodeData::Start(_) => "Start",
            NodeData::End(end) => &end.label,
            NodeData::Activity(activity) => &activity.label,
            NodeData::Condition(_) => "Condition",
            NodeData::Delay(_) => "Delay",
        }
    }
}

/// Payload of a start node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartData {
    /// Ordered list of trigger events that can start execution
    #[serde(default)]
    pub triggers: Vec<TriggerEventConfig>,
    /// Legacy single-trigger item type, set on graphs saved before
    /// trigger lists existed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_type: Option<String>,
    /// Legacy single-trigger event name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger_event: Option<String>,
}

impl StartData {
    /// Reassign `seq` values densely as `0..n-1` in current list order
    ///
    /// Call after any reorder, insert, or removal so the evaluation
    /// order stays unambiguous.
    pub fn resequence_triggers(&mut self) {
        for (index, trigger) in self.triggers.iter_mut().enumerate() {
            trigger.seq = index as u32;
        }
    }
}

/// A (item type, event) pair that can start workflow execution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerEventConfig {
    /// Unique identifier for this trigger entry
    pub id: String,
    /// Kind of item the event applies to (e.g. "event", "product")
    #[serde(default)]
    pub item_type: String,
    /// Event name (e.g. "view", "purchase")
    #[serde(default)]
    pub trigger_event: String,
    /// Evaluation and display order within the trigger list
    #[serde(default)]
    pub seq: u32,
    /// Opaque identifier assigned by the persistence backend
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backend_id: Option<String>,
    /// Optional execution-frequency policy for this trigger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle: Option<TriggerThrottleConfig>,
}

impl TriggerEventConfig {
    /// Create a trigger with a generated ID and `seq` 0
    pub fn new(item_type: impl Into<String>, trigger_event: impl Into<String>) -> Self {
        Self {
            id: format!("trigger-{}", uuid::Uuid::new_v4()),
            item_type: item_type.into(),
            trigger_event: trigger_event.into(),
            seq: 0,
            backend_id: None,
            throttle: None,
        }
    }
}

/// Payload of an end node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndData {
    #[serde(default = "EndData::default_label")]
    pub label: String,
}

impl EndData {
    fn default_label() -> String {
        "End".to_string()
    }
}

impl Default for EndData {
    fn default() -> Self {
        Self {
            label: Self::default_label(),
        }
    }
}

/// Payload of an activity node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityData {
    /// Human-readable label
    pub label: String,
    /// Longer description shown in the editor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered list of actions run when the activity executes
    #[serde(default)]
    pub actions: Vec<ActionItem>,
    /// Ordered list of routes selecting the next activity
    #[serde(default)]
    pub routes: Vec<ActivityRoute>,
    /// Opaque reference to an externally persisted activity
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<String>,
}

impl ActivityData {
    /// Create an activity with the given label and nothing else
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            actions: Vec::new(),
            routes: Vec::new(),
            activity_id: None,
        }
    }

    /// The route marked as default, if any
    pub fn default_route(&self) -> Option<&ActivityRoute> {
        self.routes.iter().find(|r| r.is_default)
    }
}

/// Payload of a condition node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionData {
    /// Field to resolve against the variable context
    #[serde(default)]
    pub condition_field: String,
    /// Comparison operator; absent until the user picks one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition_operator: Option<ConditionOperator>,
    /// Comparison operand
    #[serde(default)]
    pub condition_value: String,
}

/// Payload of a delay node
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayData {
    /// How long to wait; must be positive
    #[serde(default)]
    pub delay_amount: i64,
    /// Unit for `delay_amount`; absent until the user picks one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delay_unit: Option<DelayUnit>,
}

/// Unit for a delay node's wait amount
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayUnit {
    Minutes,
    Hours,
    Days,
}

/// A single action within an activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionItem {
    /// Unique identifier for this action
    pub id: String,
    /// Human-readable label
    pub label: String,
    /// UI grouping category (e.g. "messaging", "crm")
    #[serde(default)]
    pub category: String,
    /// Per-type configuration payload
    pub config: ActionConfig,
    /// Optional gate deciding whether the action runs
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_logic: Option<ActionConditionalLogic>,
}

impl ActionItem {
    /// Placeholder inserted by the auto-fixer for empty activities
    ///
    /// The label flags that the action still needs configuration.
    pub fn placeholder() -> Self {
        Self {
            id: format!("action-{}", uuid::Uuid::new_v4()),
            label: "Placeholder action (needs configuration)".to_string(),
            category: "general".to_string(),
            config: ActionConfig::Placeholder,
            conditional_logic: None,
        }
    }
}

/// Per-type configuration of an action, tagged by action type
///
/// Action types this crate does not know about deserialize into
/// `Unknown` with their payload preserved verbatim, so round-tripping a
/// graph never drops configuration written by a newer editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionConfig {
    SendEmail(SendEmailConfig),
    Webhook(WebhookConfig),
    UpdateField(UpdateFieldConfig),
    /// Inserted by the auto-fixer; carries no configuration
    Placeholder,
    /// Forward-compatibility catch-all for unrecognized action types
    #[serde(untagged)]
    Unknown(serde_json::Value),
}

impl ActionConfig {
    /// The action type tag, or "unknown" when it cannot be determined
    pub fn kind(&self) -> &str {
        match self {
            ActionConfig::SendEmail(_) => "send_email",
            ActionConfig::Webhook(_) => "webhook",
            ActionConfig::UpdateField(_) => "update_field",
            ActionConfig::Placeholder => "placeholder",
            ActionConfig::Unknown(value) => value
                .get("type")
                .and_then(|t| t.as_str())
                .unwrap_or("unknown"),
        }
    }
}

/// Configuration for a send-email action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendEmailConfig {
    /// Reference to an externally managed email template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,
    /// Subject line override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

/// Configuration for a webhook action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    pub url: String,
    #[serde(default = "WebhookConfig::default_method")]
    pub method: String,
}

impl WebhookConfig {
    fn default_method() -> String {
        "POST".to_string()
    }
}

/// Configuration for an update-field action
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateFieldConfig {
    pub field: String,
    pub value: String,
}

/// Gate deciding whether an action runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionConditionalLogic {
    /// When false the gate is ignored and the action always runs
    #[serde(default)]
    pub enabled: bool,
    /// How the condition list combines
    pub logic: ConditionLogic,
    #[serde(default)]
    pub conditions: Vec<ActionCondition>,
}

/// Combination mode for a condition list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionLogic {
    /// Logical AND; vacuously true on an empty list
    All,
    /// Logical OR; vacuously false on an empty list
    Any,
}

/// A single field comparison within a conditional-logic block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionCondition {
    pub id: String,
    pub field: String,
    pub operator: ConditionOperator,
    #[serde(default)]
    pub value: String,
}

/// Comparison operator for conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

impl ConditionOperator {
    /// Whether this operator consults the `value` operand
    pub fn requires_value(&self) -> bool {
        !matches!(
            self,
            ConditionOperator::IsEmpty | ConditionOperator::IsNotEmpty
        )
    }
}

/// A conditional or default route from an activity to its next activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityRoute {
    /// Unique identifier for this route
    pub id: String,
    /// ID of the node this route leads to
    #[serde(default)]
    pub target_activity_id: String,
    /// Required on every non-default route
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<RouteCondition>,
    /// At most one route per activity should be the default
    #[serde(default)]
    pub is_default: bool,
}

impl ActivityRoute {
    /// Create a default route with a generated ID
    pub fn default_to(target_activity_id: impl Into<String>) -> Self {
        Self {
            id: format!("route-{}", uuid::Uuid::new_v4()),
            target_activity_id: target_activity_id.into(),
            condition: None,
            is_default: true,
        }
    }
}

/// Condition guarding a non-default route
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteCondition {
    #[serde(default)]
    pub field: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<ConditionOperator>,
    #[serde(default)]
    pub value: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_data_tag() {
        let node = WorkflowNode::with_id(
            "start-1",
            NodeData::Start(StartData::default()),
            (0.0, 0.0),
        );
        let json = serde_json::to_string(&node).unwrap();
        assert!(json.contains("\"type\":\"start\""));

        let restored: WorkflowNode = serde_json::from_str(&json).unwrap();
        assert!(restored.data.is_start());
    }

    #[test]
    fn test_resequence_triggers() {
        let mut start = StartData::default();
        start.triggers.push(TriggerEventConfig {
            seq: 7,
            ..TriggerEventConfig::new("event", "view")
        });
        start.triggers.push(TriggerEventConfig {
            seq: 2,
            ..TriggerEventConfig::new("product", "purchase")
        });

        start.resequence_triggers();

        assert_eq!(start.triggers[0].seq, 0);
        assert_eq!(start.triggers[1].seq, 1);
    }

    #[test]
    fn test_action_config_known_type() {
        let json = r#"{"type":"send_email","templateId":"tpl-1"}"#;
        let config: ActionConfig = serde_json::from_str(json).unwrap();
        match &config {
            ActionConfig::SendEmail(email) => {
                assert_eq!(email.template_id.as_deref(), Some("tpl-1"));
            }
            other => panic!("Expected SendEmail, got {:?}", other),
        }
        assert_eq!(config.kind(), "send_email");
    }

    #[test]
    fn test_action_config_unknown_type_preserved() {
        let json = r##"{"type":"post_to_slack","channel":"#general"}"##;
        let config: ActionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.kind(), "post_to_slack");

        // The payload round-trips untouched.
        let out = serde_json::to_value(&config).unwrap();
        assert_eq!(out["channel"], "#general");
    }

    #[test]
    fn test_operator_requires_value() {
        assert!(ConditionOperator::Equals.requires_value());
        assert!(ConditionOperator::GreaterThan.requires_value());
        assert!(!ConditionOperator::IsEmpty.requires_value());
        assert!(!ConditionOperator::IsNotEmpty.requires_value());
    }

    #[test]
    fn test_connection_handle_serde() {
        let conn = Connection::new("cond-1", "act-1", Some(BranchHandle::Yes));
        let json = serde_json::to_string(&conn).unwrap();
        assert!(json.contains("\"sourceHandle\":\"yes\""));

        let plain = Connection::new("a", "b", None);
        let json = serde_json::to_string(&plain).unwrap();
        assert!(!json.contains("sourceHandle"));
    }
}
