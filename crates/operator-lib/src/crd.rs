//! The `Monitor` custom resource
//!
//! A monitor declares a daily UTC hour window, the replica count to enforce
//! while inside it, and the deployments it manages. Its status carries the
//! outcome of the most recent reconcile cycle only.

use crate::models::{ObjectKey, WorkloadRef};
use kube::{CustomResource, ResourceExt};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

pub const API_GROUP: &str = "monitor.sivasathwik.online";
pub const API_VERSION: &str = "v1";

/// Monitor is the Schema for the monitors API
#[derive(CustomResource, Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[kube(
    group = "monitor.sivasathwik.online",
    version = "v1",
    kind = "Monitor",
    plural = "monitors",
    shortname = "mon",
    namespaced,
    status = "MonitorStatus",
    printcolumn = r#"{"name":"Start", "type":"integer", "jsonPath":".spec.startHour"}"#,
    printcolumn = r#"{"name":"End", "type":"integer", "jsonPath":".spec.endHour"}"#,
    printcolumn = r#"{"name":"Replicas", "type":"integer", "jsonPath":".spec.targetReplicas"}"#,
    printcolumn = r#"{"name":"Status", "type":"string", "jsonPath":".status.status"}"#,
    printcolumn = r#"{"name":"Age", "type":"date", "jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct MonitorSpec {
    /// First hour (UTC, 0-23) of the active window, inclusive
    #[serde(alias = "start")]
    #[schemars(range(max = 23))]
    pub start_hour: u32,

    /// Last hour (UTC, 0-23) of the active window, inclusive.
    /// A value lower than `startHour` makes the window wrap past midnight.
    #[serde(alias = "end")]
    #[schemars(range(max = 23))]
    pub end_hour: u32,

    /// Replica count enforced on every managed workload inside the window
    #[serde(alias = "replicas")]
    #[schemars(range(min = 0))]
    pub target_replicas: i32,

    /// Deployments driven by this monitor, processed in declaration order
    #[serde(default, alias = "deployments")]
    pub managed_workloads: Vec<WorkloadRef>,
}

/// Outcome of the most recent reconcile cycle
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub enum StatusValue {
    /// Inside the window and every workload is at the target
    Success,
    /// Inside the window and a workload could not be read or scaled
    Failed,
    /// Current hour is outside the window; no workload was touched
    OutsideWindow,
}

impl StatusValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusValue::Success => "Success",
            StatusValue::Failed => "Failed",
            StatusValue::OutsideWindow => "OutsideWindow",
        }
    }
}

impl fmt::Display for StatusValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status sub-resource, rewritten from scratch on every cycle
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub status: StatusValue,

    /// Error that caused a `Failed` cycle
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// `metadata.generation` of the spec this cycle acted on
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl MonitorStatus {
    pub fn new(status: StatusValue) -> Self {
        Self {
            status,
            message: None,
            observed_generation: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_observed_generation(mut self, generation: Option<i64>) -> Self {
        self.observed_generation = generation;
        self
    }
}

impl Monitor {
    /// Identity used for store lookups and status writes
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(self.namespace().unwrap_or_default(), self.name_any())
    }
}
