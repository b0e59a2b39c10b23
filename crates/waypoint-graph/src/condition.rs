//! Condition evaluation against runtime variables
//!
//! The evaluator is deliberately forgiving: an absent variable reads
//! as the empty string for string operators, and comparisons over
//! values that do not parse as numbers are simply false. Evaluation
//! never fails.

use std::collections::HashMap;

use crate::types::{
    ActionConditionalLogic, ActionCondition, ActivityData, ActivityRoute, ConditionLogic,
    ConditionOperator,
};

/// Source of runtime variable values, keyed by field name
pub trait VariableContext {
    fn resolve(&self, field: &str) -> Option<String>;
}

impl VariableContext for HashMap<String, String> {
    fn resolve(&self, field: &str) -> Option<String> {
        self.get(field).cloned()
    }
}

/// Evaluate one operator against a resolved variable value.
pub fn evaluate_operator(
    operator: ConditionOperator,
    actual: Option<&str>,
    expected: &str,
) -> bool {
    match operator {
        ConditionOperator::IsEmpty => actual.map_or(true, str::is_empty),
        ConditionOperator::IsNotEmpty => actual.is_some_and(|v| !v.is_empty()),
        ConditionOperator::Equals => actual.unwrap_or("") == expected,
        ConditionOperator::NotEquals => actual.unwrap_or("") != expected,
        ConditionOperator::Contains => actual.unwrap_or("").contains(expected),
        ConditionOperator::NotContains => !actual.unwrap_or("").contains(expected),
        ConditionOperator::GreaterThan => compare_numeric(actual, expected, |a, b| a > b),
        ConditionOperator::LessThan => compare_numeric(actual, expected, |a, b| a < b),
    }
}

fn compare_numeric(actual: Option<&str>, expected: &str, cmp: impl Fn(f64, f64) -> bool) -> bool {
    match (
        actual.and_then(|v| v.parse::<f64>().ok()),
        expected.parse::<f64>().ok(),
    ) {
        (Some(a), Some(b)) => cmp(a, b),
        _ => false,
    }
}

/// Evaluate one action condition against the context.
pub fn evaluate_condition(ctx: &dyn VariableContext, condition: &ActionCondition) -> bool {
    let actual = ctx.resolve(&condition.field);
    evaluate_operator(condition.operator, actual.as_deref(), &condition.value)
}

/// Evaluate an action's conditional logic block.
///
/// Disabled logic always passes. Over an empty condition list, `all`
/// is vacuously true while `any` is false.
pub fn evaluate_logic(ctx: &dyn VariableContext, logic: &ActionConditionalLogic) -> bool {
    if !logic.enabled {
        return true;
    }
    match logic.logic {
        ConditionLogic::All => logic.conditions.iter().all(|c| evaluate_condition(ctx, c)),
        ConditionLogic::Any => logic.conditions.iter().any(|c| evaluate_condition(ctx, c)),
    }
}

/// Whether a route's condition matches the context.
///
/// A route with no condition, or a condition with no operator, never
/// matches; such routes only fire as the default.
pub fn route_condition_matches(ctx: &dyn VariableContext, route: &ActivityRoute) -> bool {
    let Some(condition) = &route.condition else {
        return false;
    };
    let Some(operator) = condition.operator else {
        return false;
    };
    let actual = ctx.resolve(&condition.field);
    evaluate_operator(operator, actual.as_deref(), &condition.value)
}

/// Select the route an activity takes: the first non-default route
/// whose condition matches, falling back to the default route.
pub fn select_route<'a>(
    ctx: &dyn VariableContext,
    activity: &'a ActivityData,
) -> Option<&'a ActivityRoute> {
    activity
        .routes
        .iter()
        .find(|r| !r.is_default && route_condition_matches(ctx, r))
        .or_else(|| activity.default_route())
}
