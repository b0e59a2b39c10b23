//! Mechanical correction of fixable validation warnings
//!
//! The fixer works on a clone of the graph and re-checks each fix's
//! precondition at apply time, so running it twice (or feeding it a
//! report with duplicate findings) never double-applies a fix.

use crate::store::WorkflowGraph;
use crate::types::{ActionItem, ActivityRoute, NodeData};
use crate::validation::{FixType, ValidationReport};

/// Result of an auto-fix pass
#[derive(Debug, Clone)]
pub struct AutoFixOutcome {
    /// Corrected copy of the input graph
    pub graph: WorkflowGraph,
    /// Number of fixes actually applied
    pub fixed_count: usize,
}

/// Apply every fixable issue from a validation report to a copy of the
/// graph, returning the corrected copy and how many fixes took effect.
pub fn apply_auto_fixes(graph: &WorkflowGraph, report: &ValidationReport) -> AutoFixOutcome {
    let mut fixed = graph.clone();
    let mut fixed_count = 0;

    // Default routes point at the end node; resolve it once up front.
    // With no end node the route is added with an empty target, which
    // the next validation pass reports.
    let end_id = fixed
        .end_nodes()
        .first()
        .map(|n| n.id.clone())
        .unwrap_or_default();

    for issue in report.all_issues() {
        if !issue.fixable {
            continue;
        }
        let (Some(fix_type), Some(node_id)) = (issue.fix_type, issue.node_id.as_deref()) else {
            continue;
        };
        let Some(node) = fixed.find_node_mut(node_id) else {
            continue;
        };
        let NodeData::Activity(activity) = &mut node.data else {
            continue;
        };

        match fix_type {
            FixType::AddDefaultRoute => {
                if activity.default_route().is_none() {
                    activity.routes.push(ActivityRoute::default_to(&end_id));
                    fixed_count += 1;
                    log::info!("added default route to activity {}", node_id);
                }
            }
            FixType::AddPlaceholderAction => {
                if activity.actions.is_empty() {
                    activity.actions.push(ActionItem::placeholder());
                    fixed_count += 1;
                    log::info!("added placeholder action to activity {}", node_id);
                }
            }
        }
    }

    AutoFixOutcome {
        graph: fixed,
        fixed_count,
    }
}
