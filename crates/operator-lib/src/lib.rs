//! Operator library for time-windowed workload scaling
//!
//! This crate provides the core functionality for:
//! - The `Monitor` custom resource and its status
//! - Daily time window evaluation (including windows that wrap past midnight)
//! - Per-workload replica decisions and scaling
//! - The reconcile loop and its Kubernetes controller wiring
//! - Health checks and observability

pub mod controller;
pub mod crd;
pub mod decision;
pub mod error;
pub mod health;
pub mod kube_client;
pub mod models;
pub mod observability;
pub mod reconciler;
pub mod scaler;
pub mod status;
pub mod window;

#[cfg(test)]
mod testing;

pub use crd::{Monitor, MonitorSpec, MonitorStatus, StatusValue};
pub use error::{ErrorKind, ReconcileError, ScaleError, ScaleErrorKind, StoreError};
pub use health::{
    ComponentHealth, ComponentStatus, HealthRegistry, HealthResponse, ReadinessResponse,
};
pub use models::*;
pub use observability::{OperatorMetrics, StructuredLogger};
pub use reconciler::{
    MonitorStore, ReconcileAction, Reconciler, ReconcilerBuilder, DEFAULT_REQUEUE_INTERVAL,
};
pub use scaler::{ScaleOutcome, WorkloadRuntime, WorkloadScaler};
pub use window::{is_within_window, Clock, FixedClock, SystemClock};
