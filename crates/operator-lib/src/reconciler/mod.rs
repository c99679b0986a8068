//! Monitor reconcile loop
//!
//! One cycle fetches a monitor, evaluates its window against the current UTC
//! hour, drives every managed workload to the target replica count in
//! declaration order, and writes the resulting status back. Iteration stops
//! at the first failing workload; later workloads wait for the next cycle.

#[cfg(test)]
mod tests;

use crate::crd::{Monitor, MonitorStatus};
use crate::error::{ReconcileError, ScaleError, StoreError};
use crate::models::ObjectKey;
use crate::observability::{OperatorMetrics, StructuredLogger};
use crate::scaler::{ScaleOutcome, WorkloadRuntime, WorkloadScaler};
use crate::status::project_status;
use crate::window::{is_within_window, Clock, SystemClock};
use async_trait::async_trait;
use chrono::Timelike;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Delay before a monitor is re-evaluated when nothing else triggers it
pub const DEFAULT_REQUEUE_INTERVAL: Duration = Duration::from_secs(30);

/// Access to monitor resources and their status sub-resource
#[async_trait]
pub trait MonitorStore: Send + Sync {
    /// Fetch the current monitor
    async fn get(&self, key: &ObjectKey) -> Result<Monitor, StoreError>;

    /// Overwrite the monitor's status
    async fn update_status(&self, key: &ObjectKey, status: &MonitorStatus) -> Result<(), StoreError>;
}

/// What the dispatcher should do after a successful cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcileAction {
    /// Nothing to reconcile; wait for the next change event
    Done,
    /// Re-run the cycle after the given delay
    RequeueAfter(Duration),
}

/// Reconciles monitors against the workload runtime
pub struct Reconciler {
    store: Arc<dyn MonitorStore>,
    scaler: WorkloadScaler,
    clock: Arc<dyn Clock>,
    requeue_interval: Duration,
    metrics: OperatorMetrics,
    logger: StructuredLogger,
}

impl Reconciler {
    pub fn new(store: Arc<dyn MonitorStore>, runtime: Arc<dyn WorkloadRuntime>) -> Self {
        Self {
            store,
            scaler: WorkloadScaler::new(runtime),
            clock: Arc::new(SystemClock),
            requeue_interval: DEFAULT_REQUEUE_INTERVAL,
            metrics: OperatorMetrics::new(),
            logger: StructuredLogger::default(),
        }
    }

    pub fn requeue_interval(&self) -> Duration {
        self.requeue_interval
    }

    pub fn logger(&self) -> &StructuredLogger {
        &self.logger
    }

    pub fn metrics(&self) -> &OperatorMetrics {
        &self.metrics
    }

    /// Run one cycle for the monitor identified by `key`
    pub async fn reconcile(&self, key: &ObjectKey) -> Result<ReconcileAction, ReconcileError> {
        let start = Instant::now();
        let result = self.run_cycle(key).await;
        self.metrics
            .observe_reconcile_duration(start.elapsed().as_secs_f64());

        if let Err(err) = &result {
            self.metrics.inc_reconcile_errors(err.kind());
        }
        result
    }

    async fn run_cycle(&self, key: &ObjectKey) -> Result<ReconcileAction, ReconcileError> {
        let monitor = match self.store.get(key).await {
            Ok(monitor) => monitor,
            Err(err) if err.is_not_found() => {
                debug!(monitor = %key, "Monitor no longer exists, nothing to reconcile");
                return Ok(ReconcileAction::Done);
            }
            Err(cause) => {
                return Err(ReconcileError::MonitorRead {
                    monitor: key.to_string(),
                    cause,
                });
            }
        };

        let current_hour = self.clock.now().hour();
        let spec = &monitor.spec;
        let inside_window = is_within_window(current_hour, spec.start_hour, spec.end_hour);

        debug!(
            monitor = %key,
            current_hour = current_hour,
            start_hour = spec.start_hour,
            end_hour = spec.end_hour,
            inside_window = inside_window,
            "Evaluated monitor window"
        );

        let outcomes = if inside_window {
            self.scale_workloads(key, &monitor).await
        } else {
            Vec::new()
        };

        let value = project_status(inside_window, &outcomes);
        let scaled = outcomes
            .iter()
            .filter(|outcome| matches!(outcome, Ok(ScaleOutcome::Applied { .. })))
            .count();
        let failure = outcomes.into_iter().find_map(Result::err);

        let mut status = MonitorStatus::new(value)
            .with_observed_generation(monitor.metadata.generation);
        if let Some(err) = &failure {
            status = status.with_message(err.to_string());
        }
        self.persist_status(key, &status).await;

        self.metrics.inc_reconciles(value);
        self.logger.log_reconcile(key, value, current_hour, scaled);

        match failure {
            Some(err) => Err(err.into()),
            None => Ok(ReconcileAction::RequeueAfter(self.requeue_interval)),
        }
    }

    /// Scale managed workloads in order, stopping after the first failure.
    ///
    /// The returned outcomes end with the failing workload's error, if any.
    async fn scale_workloads(
        &self,
        key: &ObjectKey,
        monitor: &Monitor,
    ) -> Vec<Result<ScaleOutcome, ScaleError>> {
        let target = monitor.spec.target_replicas;
        let mut outcomes = Vec::with_capacity(monitor.spec.managed_workloads.len());

        for workload in &monitor.spec.managed_workloads {
            let outcome = self.scaler.scale(workload, target).await;
            if let Ok(ScaleOutcome::Applied { previous_replicas }) = &outcome {
                self.metrics.inc_workloads_scaled();
                self.logger
                    .log_workload_scaled(key, workload, *previous_replicas, target);
            }

            let failed = outcome.is_err();
            outcomes.push(outcome);
            if failed {
                break;
            }
        }

        outcomes
    }

    /// Status writes are best effort; a failure is logged and dropped.
    async fn persist_status(&self, key: &ObjectKey, status: &MonitorStatus) {
        if let Err(err) = self.store.update_status(key, status).await {
            self.metrics.inc_status_persist_failures();
            self.logger
                .log_status_persist_failed(key, status.status, &err.to_string());
        }
    }
}

/// Builder for a [`Reconciler`]
pub struct ReconcilerBuilder {
    store: Option<Arc<dyn MonitorStore>>,
    runtime: Option<Arc<dyn WorkloadRuntime>>,
    clock: Arc<dyn Clock>,
    requeue_interval: Duration,
    logger: StructuredLogger,
}

impl ReconcilerBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            runtime: None,
            clock: Arc::new(SystemClock),
            requeue_interval: DEFAULT_REQUEUE_INTERVAL,
            logger: StructuredLogger::default(),
        }
    }

    /// Set the monitor store
    pub fn store(mut self, store: Arc<dyn MonitorStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the workload runtime
    pub fn runtime(mut self, runtime: Arc<dyn WorkloadRuntime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Set the clock used to read the current hour
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Set the delay between periodic re-evaluations
    pub fn requeue_interval(mut self, interval: Duration) -> Self {
        self.requeue_interval = interval;
        self
    }

    /// Set the structured logger
    pub fn logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn build(self) -> anyhow::Result<Reconciler> {
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("Monitor store is required"))?;
        let runtime = self
            .runtime
            .ok_or_else(|| anyhow::anyhow!("Workload runtime is required"))?;

        Ok(Reconciler {
            store,
            scaler: WorkloadScaler::new(runtime),
            clock: self.clock,
            requeue_interval: self.requeue_interval,
            metrics: OperatorMetrics::new(),
            logger: self.logger,
        })
    }
}

impl Default for ReconcilerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
