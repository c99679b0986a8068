//! Controller wiring for `Monitor` resources
//!
//! `kube::runtime::Controller` supplies the per-monitor work queue: watch
//! events and requeue timers feed the same queue, and a monitor is never
//! reconciled by two cycles at once. Only spec changes (a new
//! `metadata.generation`) trigger a cycle from the watch; status writes made
//! by the cycle itself are filtered out and the requeue timer drives the
//! periodic re-evaluation.

use crate::crd::Monitor;
use crate::error::ReconcileError;
use crate::health::{components, HealthRegistry};
use crate::models::ObjectKey;
use crate::reconciler::{ReconcileAction, Reconciler};
use kube::runtime::controller::{self, Action, Controller};
use kube::runtime::{predicates, reflector, watcher, WatchStreamExt};
use kube::{Api, Client};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_stream::StreamExt;
use tracing::{debug, info, warn};

/// Delay before retrying a monitor whose cycle returned an error
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Shared state handed to every reconcile invocation
pub struct Context {
    pub reconciler: Reconciler,
    pub health: HealthRegistry,
    pub error_backoff: Duration,
    failing: Mutex<HashSet<ObjectKey>>,
}

impl Context {
    pub fn new(reconciler: Reconciler, health: HealthRegistry) -> Self {
        Self {
            reconciler,
            health,
            error_backoff: DEFAULT_ERROR_BACKOFF,
            failing: Mutex::new(HashSet::new()),
        }
    }

    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Record the latest cycle result for `key`.
    ///
    /// The controller component stays degraded while any monitor's most
    /// recent cycle failed.
    pub async fn record_outcome(&self, key: &ObjectKey, error: Option<&ReconcileError>) {
        let mut failing = self.failing.lock().await;
        match error {
            Some(_) => {
                failing.insert(key.clone());
            }
            None => {
                failing.remove(key);
            }
        }

        if failing.is_empty() {
            self.health.set_healthy(components::CONTROLLER).await;
        } else {
            let message = match error {
                Some(err) => format!("{} monitor(s) failing, latest: {}", failing.len(), err),
                None => format!("{} monitor(s) failing", failing.len()),
            };
            self.health.set_degraded(components::CONTROLLER, message).await;
        }
    }
}

/// Translate a cycle result into a controller action
pub fn into_action(action: ReconcileAction) -> Action {
    match action {
        ReconcileAction::Done => Action::await_change(),
        ReconcileAction::RequeueAfter(delay) => Action::requeue(delay),
    }
}

/// Reconcile entry point invoked by the controller
pub async fn reconcile(monitor: Arc<Monitor>, ctx: Arc<Context>) -> Result<Action, ReconcileError> {
    let key = monitor.key();

    match ctx.reconciler.reconcile(&key).await {
        Ok(action) => {
            ctx.record_outcome(&key, None).await;
            Ok(into_action(action))
        }
        Err(err) => {
            ctx.record_outcome(&key, Some(&err)).await;
            Err(err)
        }
    }
}

/// Requeue a failed monitor after the configured backoff
pub fn error_policy(monitor: Arc<Monitor>, error: &ReconcileError, ctx: Arc<Context>) -> Action {
    ctx.reconciler.logger().log_reconcile_error(
        &monitor.key().to_string(),
        error.kind(),
        &error.to_string(),
    );
    Action::requeue(ctx.error_backoff)
}

/// Run the monitor controller until a shutdown signal is received.
///
/// Watches a single namespace when `namespace` is set, all namespaces
/// otherwise.
pub async fn run(client: Client, ctx: Arc<Context>, namespace: Option<&str>) {
    let monitors: Api<Monitor> = match namespace {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    };
    let health = ctx.health.clone();

    info!(namespace = namespace.unwrap_or("*"), "Starting monitor controller");

    let (reader, writer) = reflector::store();
    let spec_changes = watcher(monitors, watcher::Config::default())
        .default_backoff()
        .reflect(writer)
        .applied_objects()
        .predicate_filter(predicates::generation);

    let results = Controller::for_stream(spec_changes, reader)
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx);
    tokio::pin!(results);

    while let Some(result) = results.next().await {
        match result {
            Ok((monitor, action)) => {
                health.set_healthy(components::KUBE_API).await;
                debug!(monitor = %monitor, action = ?action, "Reconciled monitor");
            }
            Err(controller::Error::QueueError(err)) => {
                warn!(error = %err, "Monitor watch failed");
                health
                    .set_degraded(components::KUBE_API, err.to_string())
                    .await;
            }
            Err(err) => {
                debug!(error = %err, "Monitor reconcile attempt failed");
            }
        }
    }

    info!("Monitor controller stopped");
}
