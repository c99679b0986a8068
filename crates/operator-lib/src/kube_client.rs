//! Kubernetes-backed monitor store and deployment runtime

use crate::crd::{Monitor, MonitorStatus};
use crate::error::StoreError;
use crate::models::{ObjectKey, WorkloadRef, WorkloadSnapshot};
use crate::reconciler::MonitorStore;
use crate::scaler::WorkloadRuntime;
use async_trait::async_trait;
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::{Api, Patch, PatchParams};
use kube::Client;
use serde_json::json;

pub const DEFAULT_FIELD_MANAGER: &str = "monitor-operator";

/// Reads monitors and writes their status sub-resource
#[derive(Clone)]
pub struct KubeMonitorStore {
    client: Client,
    field_manager: String,
}

impl KubeMonitorStore {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn api(&self, namespace: &str) -> Api<Monitor> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl MonitorStore for KubeMonitorStore {
    async fn get(&self, key: &ObjectKey) -> Result<Monitor, StoreError> {
        Ok(self.api(&key.namespace).get(&key.name).await?)
    }

    async fn update_status(&self, key: &ObjectKey, status: &MonitorStatus) -> Result<(), StoreError> {
        let patch = status_patch(status);
        self.api(&key.namespace)
            .patch_status(
                &key.name,
                &PatchParams::apply(&self.field_manager),
                &Patch::Merge(&patch),
            )
            .await?;
        Ok(())
    }
}

/// Reads and scales `apps/v1` Deployments
#[derive(Clone)]
pub struct KubeDeploymentRuntime {
    client: Client,
    field_manager: String,
}

impl KubeDeploymentRuntime {
    pub fn new(client: Client, field_manager: impl Into<String>) -> Self {
        Self {
            client,
            field_manager: field_manager.into(),
        }
    }

    fn api(&self, namespace: &str) -> Api<Deployment> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl WorkloadRuntime for KubeDeploymentRuntime {
    async fn get_workload(&self, workload: &WorkloadRef) -> Result<WorkloadSnapshot, StoreError> {
        let deployment = self.api(&workload.namespace).get(&workload.name).await?;
        Ok(WorkloadSnapshot::new(
            deployment.spec.and_then(|spec| spec.replicas),
        ))
    }

    async fn set_replicas(&self, workload: &WorkloadRef, replicas: i32) -> Result<(), StoreError> {
        let patch = replicas_patch(replicas);
        self.api(&workload.namespace)
            .patch(
                &workload.name,
                &PatchParams::apply(&self.field_manager),
                &Patch::Merge(&patch),
            )
            .await?;
        Ok(())
    }
}

/// Merge patch that overwrites every status field; unset fields are sent as
/// null so values from an earlier cycle are removed.
fn status_patch(status: &MonitorStatus) -> serde_json::Value {
    json!({
        "status": {
            "status": status.status,
            "message": status.message,
            "observedGeneration": status.observed_generation,
        }
    })
}

fn replicas_patch(replicas: i32) -> serde_json::Value {
    json!({ "spec": { "replicas": replicas } })
}
