//! Trigger execution-frequency policy
//!
//! This module defines the *meaning* of a trigger's throttle
//! configuration so the editor and any executor gate execution
//! identically. No counters are stored here: the executor owns the
//! per-key `ExecutionRecord` storage (session-scoped records live in
//! session storage, which is how `session` scope resets), this module
//! only decides whether a given record still permits execution.

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Counter reset boundary for a throttle policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleScope {
    /// Resets per browser session
    Session,
    /// Resets at the start of each calendar day (UTC)
    Day,
    /// Resets at the start of each ISO week, Monday (UTC)
    Week,
    /// Never resets
    Lifetime,
    /// No throttling at all
    None,
}

impl ThrottleScope {
    /// Start of the current counting window, if the scope has one
    ///
    /// `Session`, `Lifetime`, and `None` have no calendar window:
    /// session reset is a storage concern and lifetime never resets.
    pub fn window_start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ThrottleScope::Day => Some(now.date_naive().and_time(NaiveTime::MIN).and_utc()),
            ThrottleScope::Week => {
                let days_into_week = u64::from(now.weekday().num_days_from_monday());
                let monday = now.date_naive() - Days::new(days_into_week);
                Some(monday.and_time(NaiveTime::MIN).and_utc())
            }
            ThrottleScope::Session | ThrottleScope::Lifetime | ThrottleScope::None => None,
        }
    }
}

/// Identity the throttle counter is keyed by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThrottleTarget {
    /// Keyed by device/browser identity
    Browser,
    /// Keyed by authenticated user identity
    User,
    /// Keyed by the composite of both
    Both,
}

/// Execution-frequency policy attached to a trigger event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerThrottleConfig {
    #[serde(default)]
    pub enabled: bool,
    pub scope: ThrottleScope,
    pub target: ThrottleTarget,
    /// Maximum executions per window; defaults to 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_executions: Option<u32>,
    /// Minimum minutes between executions for the same key,
    /// independent of the counter
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cooldown_minutes: Option<u32>,
    /// Cache-busting policy version; records tagged with a lower
    /// version are treated as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Cache-busting cutoff; records older than this are treated as absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_at: Option<DateTime<Utc>>,
}

impl TriggerThrottleConfig {
    /// Whether this policy gates nothing at all
    pub fn is_unlimited(&self) -> bool {
        !self.enabled || matches!(self.scope, ThrottleScope::None)
    }

    /// Maximum executions per window, applying the default of 1
    pub fn effective_max_executions(&self) -> u32 {
        self.max_executions.unwrap_or(1)
    }

    /// Whether a previously stored record must be ignored
    ///
    /// A record is stale when it predates `reset_at` or was written
    /// under a lower policy `version`. Stale records force
    /// re-execution eligibility.
    pub fn record_is_stale(&self, record: &ExecutionRecord) -> bool {
        if let Some(version) = self.version {
            if record.version.map_or(true, |v| v < version) {
                return true;
            }
        }
        if let Some(reset_at) = self.reset_at {
            if record.last_execution_at < reset_at {
                return true;
            }
        }
        false
    }

    /// Decide whether execution is allowed given the stored record
    ///
    /// The cooldown applies to the key's last execution regardless of
    /// window resets; the counter only applies inside the current
    /// scope window.
    pub fn allows_execution(&self, record: Option<&ExecutionRecord>, now: DateTime<Utc>) -> bool {
        if self.is_unlimited() {
            return true;
        }
        let Some(record) = record.filter(|r| !self.record_is_stale(r)) else {
            return true;
        };
        if let Some(cooldown) = self.cooldown_minutes {
            let since_last = now.signed_duration_since(record.last_execution_at);
            if since_last < chrono::Duration::minutes(i64::from(cooldown)) {
                return false;
            }
        }
        let counted = match self.scope.window_start(now) {
            Some(window) if record.last_execution_at < window => 0,
            _ => record.count,
        };
        counted < self.effective_max_executions()
    }
}

/// What an executor stores per throttle key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionRecord {
    /// Executions counted in the record's window
    pub count: u32,
    /// When this key last executed
    pub last_execution_at: DateTime<Utc>,
    /// Policy version the record was written under
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
}

/// Derive the counter key for a trigger event and identity pair
pub fn throttle_key(
    trigger_event_id: &str,
    target: ThrottleTarget,
    browser_id: &str,
    user_id: &str,
) -> String {
    match target {
        ThrottleTarget::Browser => format!("{}:b:{}", trigger_event_id, browser_id),
        ThrottleTarget::User => format!("{}:u:{}", trigger_event_id, user_id),
        ThrottleTarget::Both => format!("{}:b:{}:u:{}", trigger_event_id, browser_id, user_id),
    }
}
