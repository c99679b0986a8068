//! Clients for the operator's HTTP API and the Kubernetes API

use anyhow::{Context, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

/// Client for the operator's health endpoints
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

/// Probe result: HTTP status plus the decoded body
#[derive(Debug)]
pub struct Probe<T> {
    pub status: StatusCode,
    pub body: T,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// GET a probe endpoint.
    ///
    /// 503 responses still carry a JSON body describing the failure, so they
    /// are decoded like 200s. Other error statuses fail.
    pub async fn probe<T: DeserializeOwned>(&self, path: &str) -> Result<Probe<T>> {
        let url = self.base_url.join(path).context("Invalid path")?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        let status = response.status();
        if !status.is_success() && status != StatusCode::SERVICE_UNAVAILABLE {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("API error ({}): {}", status, body);
        }

        let body = response.json().await.context("Failed to parse response")?;
        Ok(Probe { status, body })
    }
}

/// Build a Kubernetes client from an explicit kubeconfig or the inferred
/// environment (in-cluster config, `KUBECONFIG`, `~/.kube/config`).
pub async fn kube_client(kubeconfig: Option<&str>) -> Result<kube::Client> {
    let config = match kubeconfig {
        Some(path) => {
            let kubeconfig = Kubeconfig::read_from(path)
                .with_context(|| format!("Failed to read kubeconfig {}", path))?;
            kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                .await
                .context("Invalid kubeconfig")?
        }
        None => kube::Config::infer()
            .await
            .context("Failed to infer Kubernetes configuration")?,
    };

    kube::Client::try_from(config).context("Failed to create Kubernetes client")
}
