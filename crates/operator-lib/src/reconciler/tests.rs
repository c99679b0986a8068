//! Reconcile cycle scenarios against in-memory store and runtime doubles

use super::*;
use crate::crd::StatusValue;
use crate::error::{ErrorKind, ScaleErrorKind};
use crate::models::WorkloadRef;
use crate::testing::{monitor, MockRuntime, MockStore};
use crate::window::FixedClock;

fn key() -> ObjectKey {
    ObjectKey::new("ops", "business-hours")
}

fn workload(name: &str) -> WorkloadRef {
    WorkloadRef::new("web", name)
}

fn reconciler(store: Arc<MockStore>, runtime: Arc<MockRuntime>, hour: u32) -> Reconciler {
    ReconcilerBuilder::new()
        .store(store)
        .runtime(runtime)
        .clock(Arc::new(FixedClock::at_hour(hour)))
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_scales_workload_inside_window() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        9,
        17,
        5,
        vec![workload("frontend")],
    )));
    let runtime = Arc::new(MockRuntime::new().with_workload(workload("frontend"), 2));

    let action = reconciler(store.clone(), runtime.clone(), 12)
        .reconcile(&key())
        .await
        .unwrap();

    assert_eq!(action, ReconcileAction::RequeueAfter(Duration::from_secs(30)));
    assert_eq!(runtime.replicas(&workload("frontend")), Some(5));
    assert_eq!(runtime.writes(), vec![(workload("frontend"), 5)]);

    let status = store.last_status().unwrap();
    assert_eq!(status.status, StatusValue::Success);
    assert_eq!(status.message, None);
    assert_eq!(status.observed_generation, Some(1));
}

#[tokio::test]
async fn test_unchanged_cycles_persist_identical_status() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        0,
        23,
        3,
        vec![],
    )));
    let reconciler = Reconciler::new(store.clone(), Arc::new(MockRuntime::new()));

    reconciler.reconcile(&key()).await.unwrap();
    reconciler.reconcile(&key()).await.unwrap();

    let statuses = store.statuses();
    assert_eq!(statuses.len(), 2);
    assert_eq!(statuses[0], statuses[1]);
    assert_eq!(
        serde_json::to_value(&statuses[0].1).unwrap(),
        serde_json::to_value(&statuses[1].1).unwrap()
    );
}

#[tokio::test]
async fn test_wrapping_window_already_at_target_writes_nothing() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        22,
        3,
        5,
        vec![workload("batch")],
    )));
    let runtime = Arc::new(MockRuntime::new().with_workload(workload("batch"), 5));

    let action = reconciler(store.clone(), runtime.clone(), 1)
        .reconcile(&key())
        .await
        .unwrap();

    assert_eq!(action, ReconcileAction::RequeueAfter(DEFAULT_REQUEUE_INTERVAL));
    assert_eq!(runtime.read_count(), 1);
    assert_eq!(runtime.write_count(), 0);
    assert_eq!(store.last_status().unwrap().status, StatusValue::Success);
}

#[tokio::test]
async fn test_outside_window_touches_no_workloads() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        9,
        17,
        5,
        vec![workload("frontend"), workload("missing")],
    )));
    let runtime = Arc::new(MockRuntime::new().with_workload(workload("frontend"), 2));

    let action = reconciler(store.clone(), runtime.clone(), 20)
        .reconcile(&key())
        .await
        .unwrap();

    assert_eq!(action, ReconcileAction::RequeueAfter(DEFAULT_REQUEUE_INTERVAL));
    assert_eq!(runtime.read_count(), 0);
    assert_eq!(runtime.write_count(), 0);
    // Leaving the window does not scale anything back down
    assert_eq!(runtime.replicas(&workload("frontend")), Some(2));
    assert_eq!(store.last_status().unwrap().status, StatusValue::OutsideWindow);
}

#[tokio::test]
async fn test_missing_workload_fails_cycle() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        9,
        17,
        5,
        vec![workload("missing")],
    )));
    let runtime = Arc::new(MockRuntime::new());

    let err = reconciler(store.clone(), runtime.clone(), 10)
        .reconcile(&key())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);

    let status = store.last_status().unwrap();
    assert_eq!(status.status, StatusValue::Failed);
    assert!(status.message.unwrap().contains("web/missing"));
}

#[tokio::test]
async fn test_empty_workload_list_inside_window_is_success() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        0,
        23,
        3,
        vec![],
    )));
    let runtime = Arc::new(MockRuntime::new());

    let action = reconciler(store.clone(), runtime.clone(), 6)
        .reconcile(&key())
        .await
        .unwrap();

    assert_eq!(action, ReconcileAction::RequeueAfter(DEFAULT_REQUEUE_INTERVAL));
    assert_eq!(runtime.read_count(), 0);
    assert_eq!(store.last_status().unwrap().status, StatusValue::Success);
}

#[tokio::test]
async fn test_first_failure_stops_iteration() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        9,
        17,
        4,
        vec![workload("a"), workload("b"), workload("c")],
    )));
    let runtime = Arc::new(
        MockRuntime::new()
            .with_workload(workload("a"), 1)
            .with_workload(workload("b"), 1)
            .with_workload(workload("c"), 1)
            .fail_writes_for(workload("b")),
    );

    let err = reconciler(store.clone(), runtime.clone(), 9)
        .reconcile(&key())
        .await
        .unwrap_err();

    match &err {
        ReconcileError::Scale(scale) => {
            assert_eq!(scale.workload, workload("b"));
            assert_eq!(scale.kind, ScaleErrorKind::UpdateFailed);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.kind(), ErrorKind::WriteError);

    assert_eq!(runtime.reads(), vec![workload("a"), workload("b")]);
    assert_eq!(runtime.replicas(&workload("a")), Some(4));
    assert_eq!(runtime.replicas(&workload("c")), Some(1));
    assert!(runtime.writes().iter().all(|(target, _)| target != &workload("c")));
    assert_eq!(store.last_status().unwrap().status, StatusValue::Failed);
}

#[tokio::test]
async fn test_duplicate_references_are_processed_independently() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        9,
        17,
        2,
        vec![workload("frontend"), workload("frontend")],
    )));
    let runtime = Arc::new(MockRuntime::new().with_workload(workload("frontend"), 0));

    reconciler(store.clone(), runtime.clone(), 15)
        .reconcile(&key())
        .await
        .unwrap();

    assert_eq!(runtime.read_count(), 2);
    assert_eq!(runtime.write_count(), 1);
}

#[tokio::test]
async fn test_deleted_monitor_ends_cycle_quietly() {
    let store = Arc::new(MockStore::new());
    let runtime = Arc::new(MockRuntime::new());

    let action = reconciler(store.clone(), runtime.clone(), 12)
        .reconcile(&key())
        .await
        .unwrap();

    assert_eq!(action, ReconcileAction::Done);
    assert!(store.statuses().is_empty());
    assert_eq!(runtime.read_count(), 0);
}

#[tokio::test]
async fn test_monitor_read_failure_is_surfaced() {
    let store = Arc::new(
        MockStore::new().fail_gets_with(StoreError::Request("etcdserver: request timed out".to_string())),
    );
    let runtime = Arc::new(MockRuntime::new());

    let err = reconciler(store.clone(), runtime.clone(), 12)
        .reconcile(&key())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ReadError);
    assert!(matches!(err, ReconcileError::MonitorRead { .. }));
    assert!(store.statuses().is_empty());
}

#[tokio::test]
async fn test_status_write_failure_does_not_fail_cycle() {
    let store = Arc::new(
        MockStore::new()
            .with_monitor(monitor(
                "ops",
                "business-hours",
                9,
                17,
                3,
                vec![workload("frontend")],
            ))
            .fail_status_updates(),
    );
    let runtime = Arc::new(MockRuntime::new().with_workload(workload("frontend"), 1));

    let action = reconciler(store.clone(), runtime.clone(), 11)
        .reconcile(&key())
        .await
        .unwrap();

    assert_eq!(action, ReconcileAction::RequeueAfter(DEFAULT_REQUEUE_INTERVAL));
    assert_eq!(runtime.replicas(&workload("frontend")), Some(3));
}

#[tokio::test]
async fn test_status_write_failure_keeps_scale_error() {
    let store = Arc::new(
        MockStore::new()
            .with_monitor(monitor(
                "ops",
                "business-hours",
                9,
                17,
                3,
                vec![workload("missing")],
            ))
            .fail_status_updates(),
    );
    let runtime = Arc::new(MockRuntime::new());

    let err = reconciler(store, runtime, 11)
        .reconcile(&key())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ResourceNotFound);
}

#[tokio::test]
async fn test_status_is_recomputed_each_cycle() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        9,
        17,
        2,
        vec![workload("frontend")],
    )));
    let runtime = Arc::new(MockRuntime::new().with_workload(workload("frontend"), 0));
    let clock = Arc::new(FixedClock::at_hour(18));
    let reconciler = ReconcilerBuilder::new()
        .store(store.clone())
        .runtime(runtime.clone())
        .clock(clock.clone())
        .build()
        .unwrap();

    reconciler.reconcile(&key()).await.unwrap();
    clock.set(FixedClock::at_hour(10).now());
    reconciler.reconcile(&key()).await.unwrap();

    let statuses: Vec<StatusValue> = store
        .statuses()
        .into_iter()
        .map(|(_, status)| status.status)
        .collect();
    assert_eq!(statuses, vec![StatusValue::OutsideWindow, StatusValue::Success]);
    assert_eq!(runtime.replicas(&workload("frontend")), Some(2));
}

#[tokio::test]
async fn test_custom_requeue_interval() {
    let store = Arc::new(MockStore::new().with_monitor(monitor(
        "ops",
        "business-hours",
        9,
        17,
        2,
        vec![],
    )));
    let reconciler = ReconcilerBuilder::new()
        .store(store)
        .runtime(Arc::new(MockRuntime::new()))
        .clock(Arc::new(FixedClock::at_hour(3)))
        .requeue_interval(Duration::from_secs(10))
        .build()
        .unwrap();

    let action = reconciler.reconcile(&key()).await.unwrap();
    assert_eq!(action, ReconcileAction::RequeueAfter(Duration::from_secs(10)));
}

#[test]
fn test_builder_requires_store_and_runtime() {
    assert!(ReconcilerBuilder::new().build().is_err());
    assert!(ReconcilerBuilder::new()
        .runtime(Arc::new(MockRuntime::new()))
        .build()
        .is_err());
}

#[test]
fn test_new_uses_default_requeue_interval() {
    let reconciler = Reconciler::new(Arc::new(MockStore::new()), Arc::new(MockRuntime::new()));
    assert_eq!(reconciler.requeue_interval(), DEFAULT_REQUEUE_INTERVAL);
}
