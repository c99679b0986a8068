//! Observability infrastructure for the monitor operator
//!
//! Provides:
//! - Prometheus metrics (reconcile latency, cycle outcomes, scaled workloads)
//! - Structured JSON logging with tracing

use crate::crd::StatusValue;
use crate::error::ErrorKind;
use crate::models::{ObjectKey, WorkloadRef};
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, Histogram, IntCounter,
    IntCounterVec,
};
use std::sync::OnceLock;
use tracing::{error, info, warn};

/// Histogram buckets for reconcile latency (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<OperatorMetricsInner> = OnceLock::new();

struct OperatorMetricsInner {
    reconcile_duration_seconds: Histogram,
    reconciles_total: IntCounterVec,
    reconcile_errors_total: IntCounterVec,
    workloads_scaled_total: IntCounter,
    status_persist_failures_total: IntCounter,
}

impl OperatorMetricsInner {
    fn new() -> Self {
        Self {
            reconcile_duration_seconds: register_histogram!(
                "monitor_operator_reconcile_duration_seconds",
                "Time spent in one monitor reconcile cycle",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register reconcile_duration_seconds"),

            reconciles_total: register_int_counter_vec!(
                "monitor_operator_reconciles_total",
                "Completed reconcile cycles by resulting monitor status",
                &["status"]
            )
            .expect("Failed to register reconciles_total"),

            reconcile_errors_total: register_int_counter_vec!(
                "monitor_operator_reconcile_errors_total",
                "Reconcile cycles that returned an error, by error kind",
                &["kind"]
            )
            .expect("Failed to register reconcile_errors_total"),

            workloads_scaled_total: register_int_counter!(
                "monitor_operator_workloads_scaled_total",
                "Replica writes applied to managed workloads"
            )
            .expect("Failed to register workloads_scaled_total"),

            status_persist_failures_total: register_int_counter!(
                "monitor_operator_status_persist_failures_total",
                "Monitor status writes that failed and were dropped"
            )
            .expect("Failed to register status_persist_failures_total"),
        }
    }
}

/// Operator metrics for Prometheus exposition
///
/// Lightweight handle to the global metrics instance; clones share the
/// same underlying metrics.
#[derive(Clone)]
pub struct OperatorMetrics {
    _private: (),
}

impl Default for OperatorMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl OperatorMetrics {
    /// Create a new metrics handle (initializes global metrics if needed)
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(OperatorMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &OperatorMetricsInner {
        GLOBAL_METRICS.get_or_init(OperatorMetricsInner::new)
    }

    pub fn observe_reconcile_duration(&self, duration_secs: f64) {
        self.inner().reconcile_duration_seconds.observe(duration_secs);
    }

    pub fn inc_reconciles(&self, status: StatusValue) {
        self.inner()
            .reconciles_total
            .with_label_values(&[status.as_str()])
            .inc();
    }

    pub fn inc_reconcile_errors(&self, kind: ErrorKind) {
        self.inner()
            .reconcile_errors_total
            .with_label_values(&[kind.as_str()])
            .inc();
    }

    pub fn inc_workloads_scaled(&self) {
        self.inner().workloads_scaled_total.inc();
    }

    pub fn inc_status_persist_failures(&self) {
        self.inner().status_persist_failures_total.inc();
    }

    pub fn reconciles(&self, status: StatusValue) -> u64 {
        self.inner()
            .reconciles_total
            .with_label_values(&[status.as_str()])
            .get()
    }

    pub fn reconcile_errors(&self, kind: ErrorKind) -> u64 {
        self.inner()
            .reconcile_errors_total
            .with_label_values(&[kind.as_str()])
            .get()
    }
}

/// Structured logger for operator events
///
/// Emits consistent, event-named records for cycle outcomes and
/// lifecycle transitions.
#[derive(Clone)]
pub struct StructuredLogger {
    instance: String,
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new("monitor-operator")
    }
}

impl StructuredLogger {
    pub fn new(instance: impl Into<String>) -> Self {
        Self {
            instance: instance.into(),
        }
    }

    /// Log a replica write on a managed workload
    pub fn log_workload_scaled(
        &self,
        monitor: &ObjectKey,
        workload: &WorkloadRef,
        previous_replicas: i32,
        replicas: i32,
    ) {
        info!(
            event = "workload_scaled",
            instance = %self.instance,
            monitor = %monitor,
            namespace = %workload.namespace,
            name = %workload.name,
            previous_replicas = previous_replicas,
            replicas = replicas,
            "Updated deployment replicas"
        );
    }

    /// Log the end of a reconcile cycle
    pub fn log_reconcile(
        &self,
        monitor: &ObjectKey,
        status: StatusValue,
        current_hour: u32,
        workloads_scaled: usize,
    ) {
        match status {
            StatusValue::Failed => {
                warn!(
                    event = "reconcile_completed",
                    instance = %self.instance,
                    monitor = %monitor,
                    status = %status,
                    current_hour = current_hour,
                    workloads_scaled = workloads_scaled,
                    "Reconcile cycle failed"
                );
            }
            _ => {
                info!(
                    event = "reconcile_completed",
                    instance = %self.instance,
                    monitor = %monitor,
                    status = %status,
                    current_hour = current_hour,
                    workloads_scaled = workloads_scaled,
                    "Reconcile cycle complete"
                );
            }
        }
    }

    /// Log a reconcile error handed back to the controller
    pub fn log_reconcile_error(&self, monitor: &str, kind: ErrorKind, error: &str) {
        error!(
            event = "reconcile_error",
            instance = %self.instance,
            monitor = %monitor,
            kind = kind.as_str(),
            error = %error,
            "Reconcile failed, requeueing with backoff"
        );
    }

    /// Log a dropped status write
    pub fn log_status_persist_failed(&self, monitor: &ObjectKey, status: StatusValue, error: &str) {
        warn!(
            event = "status_persist_failed",
            instance = %self.instance,
            monitor = %monitor,
            status = %status,
            error = %error,
            "Unable to update monitor status"
        );
    }

    /// Log operator startup
    pub fn log_startup(&self, version: &str, watch_namespace: Option<&str>) {
        info!(
            event = "operator_started",
            instance = %self.instance,
            operator_version = %version,
            watch_namespace = watch_namespace.unwrap_or("*"),
            "Monitor operator started"
        );
    }

    /// Log operator shutdown
    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "operator_shutdown",
            instance = %self.instance,
            reason = %reason,
            "Monitor operator shutting down"
        );
    }
}
