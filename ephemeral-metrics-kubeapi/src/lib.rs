use std::fmt::Debug;
use std::path::Path;

use kube::api;
use kube::config::{KubeConfigOptions, Kubeconfig};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("in-cluster configuration unavailable: {0}")]
    InCluster(#[from] kube::config::InClusterError),

    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] kube::config::KubeconfigError),

    #[error("kubernetes api request failed: {0}")]
    Request(#[from] kube::Error),
}

/// Thin wrapper over `kube::Client` for the one call this exporter makes:
/// a raw GET of a node's kubelet stats summary through the API server proxy.
pub struct KubeApi {
    get_params: api::GetParams,
    client: kube::Client,
}

impl KubeApi {
    /// Create a KubeApi with whatever credentials `kube` infers from the
    /// environment.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn run() -> Result<(), ephemeral_metrics_kubeapi::Error> {
    /// let api = ephemeral_metrics_kubeapi::KubeApi::new().await?;
    /// // use `api`...
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new() -> Result<Self, Error> {
        let client = kube::Client::try_default().await?;
        Ok(Self::with_client(client))
    }

    /// Create a KubeApi from the service account credentials mounted into
    /// the pod.
    pub async fn in_cluster() -> Result<Self, Error> {
        let config = kube::Config::incluster()?;
        let client = kube::Client::try_from(config)?;
        Ok(Self::with_client(client))
    }

    /// Create a KubeApi from the current context of the given kubeconfig
    /// file.
    pub async fn from_kubeconfig(path: &Path) -> Result<Self, Error> {
        let kubeconfig = Kubeconfig::read_from(path)?;
        let config =
            kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?;
        let client = kube::Client::try_from(config)?;
        Ok(Self::with_client(client))
    }

    /// Create a KubeApi backed by the provided Kubernetes client.
    pub fn with_client(client: kube::Client) -> Self {
        Self {
            get_params: api::GetParams::default(),
            client,
        }
    }

    /// Fetches the raw kubelet `/stats/summary` document for `node` through
    /// the API server proxy.
    ///
    /// Any transport or authorization failure surfaces as `Error::Request`;
    /// the payload is returned undecoded.
    pub async fn get_node_stats_summary(&self, node: &str) -> Result<String, Error> {
        let name = format!("/api/v1/nodes/{node}/proxy/stats/summary");
        self.raw_get(&name).await
    }

    /// Fetches the raw response body from the Kubernetes API for the given
    /// request path.
    async fn raw_get(&self, name: impl AsRef<str>) -> Result<String, Error> {
        let gp = self.get_params();
        let request = api::Request::new("")
            .get(name.as_ref(), gp)
            .map_err(kube::Error::BuildRequest)?;
        let body = self.client.request_text(request).await?;
        tracing::trace!(path = name.as_ref(), bytes = body.len(), "proxied GET");
        Ok(body)
    }

    fn get_params(&self) -> &api::GetParams {
        &self.get_params
    }
}

impl Debug for KubeApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeApi")
            .field("get_params", &self.get_params)
            .field("client", &"<kube::Client>")
            .finish()
    }
}
