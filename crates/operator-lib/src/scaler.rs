//! Applies replica changes to single workloads through the workload runtime

use crate::decision::needs_scale;
use crate::error::{ScaleError, ScaleErrorKind, StoreError};
use crate::models::{WorkloadRef, WorkloadSnapshot};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Access to the runtime that owns the workloads' replicas
#[async_trait]
pub trait WorkloadRuntime: Send + Sync {
    /// Read the current replica state of a workload
    async fn get_workload(&self, workload: &WorkloadRef) -> Result<WorkloadSnapshot, StoreError>;

    /// Set the replica count of a workload
    async fn set_replicas(&self, workload: &WorkloadRef, replicas: i32) -> Result<(), StoreError>;
}

/// Successful outcome of scaling one workload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScaleOutcome {
    /// Replicas were written; holds the previous count
    Applied { previous_replicas: i32 },
    /// Workload was already at the target, nothing written
    NoOpAlready,
}

/// Drives individual workloads to a target replica count
#[derive(Clone)]
pub struct WorkloadScaler {
    runtime: Arc<dyn WorkloadRuntime>,
}

impl WorkloadScaler {
    pub fn new(runtime: Arc<dyn WorkloadRuntime>) -> Self {
        Self { runtime }
    }

    /// Read the workload and write `target_replicas` if it differs.
    ///
    /// Performs at most one write.
    pub async fn scale(
        &self,
        workload: &WorkloadRef,
        target_replicas: i32,
    ) -> Result<ScaleOutcome, ScaleError> {
        let snapshot = self.runtime.get_workload(workload).await.map_err(|err| {
            let kind = if err.is_not_found() {
                ScaleErrorKind::NotFound
            } else {
                ScaleErrorKind::ReadFailed
            };
            ScaleError::new(workload.clone(), kind, err)
        })?;

        if !needs_scale(snapshot.current_replicas, target_replicas) {
            debug!(
                namespace = %workload.namespace,
                name = %workload.name,
                replicas = target_replicas,
                "Workload already at target replicas"
            );
            return Ok(ScaleOutcome::NoOpAlready);
        }

        self.runtime
            .set_replicas(workload, target_replicas)
            .await
            .map_err(|err| ScaleError::new(workload.clone(), ScaleErrorKind::UpdateFailed, err))?;

        Ok(ScaleOutcome::Applied {
            previous_replicas: snapshot.current_replicas,
        })
    }
}
