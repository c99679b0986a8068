//! Operator configuration

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Operator configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OperatorConfig {
    /// Instance name, usually the pod name from the downward API
    #[serde(default = "default_instance_name")]
    pub instance_name: String,

    /// API server port for health/metrics
    #[serde(default = "default_api_port")]
    pub api_port: u16,

    /// Delay between periodic re-evaluations of a monitor, in seconds
    #[serde(default = "default_requeue_interval")]
    pub requeue_interval_secs: u64,

    /// Delay before retrying a failed cycle, in seconds
    #[serde(default = "default_error_backoff")]
    pub error_backoff_secs: u64,

    /// Namespace to watch; all namespaces when unset
    #[serde(default)]
    pub watch_namespace: Option<String>,

    /// Field manager recorded on replica and status patches
    #[serde(default = "default_field_manager")]
    pub field_manager: String,
}

fn default_instance_name() -> String {
    std::env::var("POD_NAME").unwrap_or_else(|_| "monitor-operator".to_string())
}

fn default_api_port() -> u16 {
    8080
}

fn default_requeue_interval() -> u64 {
    30
}

fn default_error_backoff() -> u64 {
    5
}

fn default_field_manager() -> String {
    "monitor-operator".to_string()
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self {
            instance_name: default_instance_name(),
            api_port: default_api_port(),
            requeue_interval_secs: default_requeue_interval(),
            error_backoff_secs: default_error_backoff(),
            watch_namespace: None,
            field_manager: default_field_manager(),
        }
    }
}

impl OperatorConfig {
    /// Load configuration from `MONITOR_OPERATOR_*` environment variables
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("MONITOR_OPERATOR").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read operator configuration")?;

        config
            .try_deserialize()
            .context("Invalid operator configuration")
    }

    pub fn requeue_interval(&self) -> Duration {
        Duration::from_secs(self.requeue_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_secs(self.error_backoff_secs)
    }
}
