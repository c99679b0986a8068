//! Operator health command

use anyhow::Result;
use chrono::{TimeZone, Utc};
use operator_lib::health::{HealthResponse, ReadinessResponse};
use serde::Serialize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{
    color_status, print_error, print_json, print_success, print_table, print_warning, OutputFormat,
};

/// Row for the component health table
#[derive(Debug, Tabled, Serialize)]
pub struct ComponentRow {
    #[tabled(rename = "Component")]
    pub component: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Message")]
    pub message: String,
    #[tabled(rename = "Last Check")]
    pub last_check: String,
}

#[derive(Debug, Serialize)]
struct HealthReport {
    health: HealthResponse,
    readiness: ReadinessResponse,
}

fn component_rows(health: &HealthResponse) -> Vec<ComponentRow> {
    let mut rows: Vec<ComponentRow> = health
        .components
        .iter()
        .map(|(name, component)| ComponentRow {
            component: name.clone(),
            status: color_status(&format!("{:?}", component.status).to_lowercase()),
            message: component.message.clone().unwrap_or_else(|| "-".to_string()),
            last_check: Utc
                .timestamp_opt(component.last_check_timestamp, 0)
                .single()
                .map(|at| at.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    rows.sort_by(|a, b| a.component.cmp(&b.component));
    rows
}

/// Show liveness and readiness of the operator
pub async fn show_health(client: &ApiClient, format: OutputFormat) -> Result<()> {
    let probe = client.probe::<HealthResponse>("/healthz").await?;
    let http_status = probe.status;
    let health = probe.body;
    let readiness = client.probe::<ReadinessResponse>("/readyz").await?.body;

    match format {
        OutputFormat::Json => print_json(&HealthReport { health, readiness })?,
        OutputFormat::Table => {
            let overall = format!("{:?}", health.status).to_lowercase();
            println!(
                "Overall: {} (HTTP {})",
                color_status(&overall),
                http_status.as_u16()
            );
            print_table(&component_rows(&health), format)?;

            if readiness.ready {
                print_success("Operator is ready");
            } else {
                let reason = readiness.reason.as_deref().unwrap_or("no reason given");
                if health.status.is_operational() {
                    print_warning(&format!("Operator is not ready: {}", reason));
                } else {
                    print_error(&format!("Operator is not ready: {}", reason));
                }
            }
        }
    }

    Ok(())
}
