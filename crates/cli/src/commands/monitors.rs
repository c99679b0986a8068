//! Monitor listing command

use anyhow::{Context, Result};
use chrono::{Timelike, Utc};
use kube::api::{Api, ListParams};
use kube::ResourceExt;
use operator_lib::crd::Monitor;
use operator_lib::window::is_within_window;
use serde::Serialize;
use tabled::Tabled;

use crate::output::{color_status, format_window, print_table, OutputFormat};

/// Row for the monitors table
#[derive(Debug, Tabled, Serialize)]
pub struct MonitorRow {
    #[tabled(rename = "Namespace")]
    pub namespace: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Window")]
    pub window: String,
    #[tabled(rename = "Replicas")]
    pub target_replicas: i32,
    #[tabled(rename = "Workloads")]
    pub workloads: usize,
    #[tabled(rename = "Now")]
    pub active: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

impl MonitorRow {
    pub fn new(monitor: &Monitor, current_hour: u32) -> Self {
        let spec = &monitor.spec;
        let active = if is_within_window(current_hour, spec.start_hour, spec.end_hour) {
            "active"
        } else {
            "idle"
        };
        let status = monitor
            .status
            .as_ref()
            .map(|status| status.status.to_string())
            .unwrap_or_else(|| "-".to_string());

        Self {
            namespace: monitor.namespace().unwrap_or_default(),
            name: monitor.name_any(),
            window: format_window(spec.start_hour, spec.end_hour),
            target_replicas: spec.target_replicas,
            workloads: spec.managed_workloads.len(),
            active: active.to_string(),
            status,
        }
    }

    fn colored(mut self) -> Self {
        self.active = color_status(&self.active);
        self.status = color_status(&self.status);
        self
    }
}

/// List monitors in one namespace or across the cluster
pub async fn get_monitors(
    client: kube::Client,
    namespace: Option<String>,
    format: OutputFormat,
) -> Result<()> {
    let api: Api<Monitor> = match namespace.as_deref() {
        Some(ns) => Api::namespaced(client, ns),
        None => Api::all(client),
    };

    let monitors = api
        .list(&ListParams::default())
        .await
        .context("Failed to list monitors")?;

    let hour = Utc::now().hour();
    let rows: Vec<MonitorRow> = monitors
        .items
        .iter()
        .map(|monitor| MonitorRow::new(monitor, hour))
        .map(|row| match format {
            OutputFormat::Table => row.colored(),
            OutputFormat::Json => row,
        })
        .collect();

    print_table(&rows, format)
}
