//! In-memory test doubles for the store and the workload runtime

use crate::crd::{Monitor, MonitorSpec, MonitorStatus};
use crate::error::StoreError;
use crate::models::{ObjectKey, WorkloadRef, WorkloadSnapshot};
use crate::reconciler::MonitorStore;
use crate::scaler::WorkloadRuntime;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Build a namespaced monitor for tests
pub fn monitor(
    namespace: &str,
    name: &str,
    start_hour: u32,
    end_hour: u32,
    target_replicas: i32,
    managed_workloads: Vec<WorkloadRef>,
) -> Monitor {
    let mut monitor = Monitor::new(
        name,
        MonitorSpec {
            start_hour,
            end_hour,
            target_replicas,
            managed_workloads,
        },
    );
    monitor.metadata.namespace = Some(namespace.to_string());
    monitor.metadata.generation = Some(1);
    monitor
}

/// Workload runtime backed by a map of replica counts
#[derive(Default)]
pub struct MockRuntime {
    workloads: Mutex<HashMap<WorkloadRef, i32>>,
    failing_reads: HashSet<WorkloadRef>,
    failing_writes: HashSet<WorkloadRef>,
    reads: Mutex<Vec<WorkloadRef>>,
    writes: Mutex<Vec<(WorkloadRef, i32)>>,
    read_count: AtomicUsize,
    write_count: AtomicUsize,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_workload(self, workload: WorkloadRef, replicas: i32) -> Self {
        self.workloads.lock().unwrap().insert(workload, replicas);
        self
    }

    pub fn fail_reads_for(mut self, workload: WorkloadRef) -> Self {
        self.failing_reads.insert(workload);
        self
    }

    pub fn fail_writes_for(mut self, workload: WorkloadRef) -> Self {
        self.failing_writes.insert(workload);
        self
    }

    pub fn replicas(&self, workload: &WorkloadRef) -> Option<i32> {
        self.workloads.lock().unwrap().get(workload).copied()
    }

    pub fn read_count(&self) -> usize {
        self.read_count.load(Ordering::SeqCst)
    }

    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    pub fn reads(&self) -> Vec<WorkloadRef> {
        self.reads.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<(WorkloadRef, i32)> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl WorkloadRuntime for MockRuntime {
    async fn get_workload(&self, workload: &WorkloadRef) -> Result<WorkloadSnapshot, StoreError> {
        self.read_count.fetch_add(1, Ordering::SeqCst);
        self.reads.lock().unwrap().push(workload.clone());

        if self.failing_reads.contains(workload) {
            return Err(StoreError::Request("connection reset".to_string()));
        }

        self.workloads
            .lock()
            .unwrap()
            .get(workload)
            .map(|replicas| WorkloadSnapshot::new(Some(*replicas)))
            .ok_or_else(|| StoreError::NotFound(workload.to_string()))
    }

    async fn set_replicas(&self, workload: &WorkloadRef, replicas: i32) -> Result<(), StoreError> {
        self.write_count.fetch_add(1, Ordering::SeqCst);
        self.writes.lock().unwrap().push((workload.clone(), replicas));

        if self.failing_writes.contains(workload) {
            return Err(StoreError::Request("the object has been modified".to_string()));
        }

        match self.workloads.lock().unwrap().get_mut(workload) {
            Some(current) => {
                *current = replicas;
                Ok(())
            }
            None => Err(StoreError::NotFound(workload.to_string())),
        }
    }
}

/// Monitor store holding at most one monitor
#[derive(Default)]
pub struct MockStore {
    monitor: Option<Monitor>,
    get_error: Option<StoreError>,
    fail_status_updates: bool,
    statuses: Mutex<Vec<(ObjectKey, MonitorStatus)>>,
    get_count: AtomicUsize,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_monitor(mut self, monitor: Monitor) -> Self {
        self.monitor = Some(monitor);
        self
    }

    pub fn fail_gets_with(mut self, err: StoreError) -> Self {
        self.get_error = Some(err);
        self
    }

    pub fn fail_status_updates(mut self) -> Self {
        self.fail_status_updates = true;
        self
    }

    pub fn statuses(&self) -> Vec<(ObjectKey, MonitorStatus)> {
        self.statuses.lock().unwrap().clone()
    }

    pub fn last_status(&self) -> Option<MonitorStatus> {
        self.statuses.lock().unwrap().last().map(|(_, status)| status.clone())
    }

    pub fn get_count(&self) -> usize {
        self.get_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MonitorStore for MockStore {
    async fn get(&self, key: &ObjectKey) -> Result<Monitor, StoreError> {
        self.get_count.fetch_add(1, Ordering::SeqCst);

        if let Some(err) = &self.get_error {
            return Err(err.clone());
        }

        self.monitor
            .as_ref()
            .filter(|monitor| &monitor.key() == key)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
    }

    async fn update_status(&self, key: &ObjectKey, status: &MonitorStatus) -> Result<(), StoreError> {
        if self.fail_status_updates {
            return Err(StoreError::Request("status update rejected".to_string()));
        }

        self.statuses
            .lock()
            .unwrap()
            .push((key.clone(), status.clone()));
        Ok(())
    }
}
