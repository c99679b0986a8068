//! Monitor Operator - time-windowed deployment scaling
//!
//! Runs as a Deployment in the cluster, reconciling `Monitor` resources
//! and serving health and metrics endpoints.

use anyhow::{Context as _, Result};
use kube::Client;
use monitor_operator::{api, config::OperatorConfig};
use operator_lib::{
    controller::{self, Context},
    health::{components, HealthRegistry},
    kube_client::{KubeDeploymentRuntime, KubeMonitorStore},
    observability::StructuredLogger,
    reconciler::ReconcilerBuilder,
};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const OPERATOR_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting monitor-operator");

    let config = OperatorConfig::load().context("Failed to load configuration")?;
    info!(
        instance = %config.instance_name,
        requeue_interval_secs = config.requeue_interval_secs,
        "Operator configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::CONTROLLER).await;
    health_registry.register(components::KUBE_API).await;

    let logger = StructuredLogger::new(&config.instance_name);

    let client = Client::try_default()
        .await
        .context("Failed to create Kubernetes client")?;

    let reconciler = ReconcilerBuilder::new()
        .store(Arc::new(KubeMonitorStore::new(
            client.clone(),
            &config.field_manager,
        )))
        .runtime(Arc::new(KubeDeploymentRuntime::new(
            client.clone(),
            &config.field_manager,
        )))
        .requeue_interval(config.requeue_interval())
        .logger(logger.clone())
        .build()?;

    let ctx = Arc::new(
        Context::new(reconciler, health_registry.clone()).with_error_backoff(config.error_backoff()),
    );

    // Start health and metrics server
    let app_state = Arc::new(api::AppState::new(health_registry.clone()));
    let mut api_handle = tokio::spawn(api::serve(config.api_port, app_state));

    logger.log_startup(OPERATOR_VERSION, config.watch_namespace.as_deref());
    health_registry.set_ready(true).await;

    tokio::select! {
        _ = controller::run(client, ctx, config.watch_namespace.as_deref()) => {
            logger.log_shutdown("shutdown signal received");
        }
        result = &mut api_handle => {
            logger.log_shutdown("API server stopped");
            result.context("API server task failed")??;
        }
    }

    api_handle.abort();
    info!("Shutting down");

    Ok(())
}
