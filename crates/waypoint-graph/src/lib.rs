//! Core model for event-driven automation workflows
//!
//! A workflow is a graph of typed nodes (start, activities, conditions,
//! delays, ends) joined by directed connections. This crate owns the
//! graph data model and the editor-side algorithms over it:
//!
//! - [`store::WorkflowGraph`]: flat node/connection storage with
//!   derived structural queries and conservative mutation primitives
//! - [`validation::validate`]: total structural validation producing a
//!   report of errors and warnings
//! - [`autofix::apply_auto_fixes`]: idempotent mechanical correction of
//!   fixable warnings
//! - [`restructure::plan_move`]: pure drag-and-drop tree restructuring
//! - [`condition`]: runtime condition and route evaluation
//! - [`throttle`]: trigger execution throttling windows
//!
//! Persistence and editing sessions live in the companion
//! `waypoint-session` crate.

pub mod autofix;
pub mod builder;
pub mod condition;
pub mod error;
pub mod restructure;
pub mod store;
pub mod throttle;
pub mod types;
pub mod validation;

pub use autofix::{apply_auto_fixes, AutoFixOutcome};
pub use builder::WorkflowBuilder;
pub use condition::{evaluate_logic, select_route, VariableContext};
pub use error::{GraphError, Result};
pub use restructure::{apply_move, plan_move, DropInstruction, DropPosition};
pub use store::WorkflowGraph;
pub use throttle::{
    throttle_key, ExecutionRecord, ThrottleScope, ThrottleTarget, TriggerThrottleConfig,
};
pub use types::{
    ActionConfig, ActionItem, ActivityData, ActivityRoute, BranchHandle, ConditionData,
    ConditionOperator, Connection, ConnectionId, DelayData, DelayUnit, EndData, NodeData, NodeId,
    StartData, TriggerEventConfig, WorkflowNode,
};
pub use validation::{validate, FixType, Severity, ValidationIssue, ValidationReport};
