use std::time::Duration;

use ephemeral_metrics::NodeSnapshot;
use ephemeral_metrics_kubeapi::KubeApi;

pub use gauge::{UsageGauge, EPHEMERAL_STORAGE_USAGE_METRIC};

mod gauge;

/// Samples one node's kubelet stats summary at a fixed interval and
/// republishes per-pod ephemeral storage usage through a [`UsageGauge`].
#[derive(Debug)]
pub struct MetricsCollector {
    kubeapi: KubeApi,
    usage: UsageGauge,
    node: String,
    interval: Duration,
}

impl MetricsCollector {
    pub fn new(
        kubeapi: KubeApi,
        usage: UsageGauge,
        node: impl ToString,
        interval: Duration,
    ) -> Self {
        Self {
            kubeapi,
            usage,
            node: node.to_string(),
            interval,
        }
    }

    /// Sample-and-republish loop. Never returns on the happy path; the first
    /// fetch failure bubbles up so the caller can terminate the process.
    /// There is no retry, backoff, or skip-and-continue path.
    pub async fn run(self) -> Result<(), ephemeral_metrics_kubeapi::Error> {
        loop {
            self.sample().await?;
            tokio::time::sleep(self.interval).await;
        }
    }

    /// One cycle: fetch, decode, republish.
    ///
    /// An undecodable payload is not an error: the cycle degrades to an empty
    /// publish, clearing every series until the next good sample. Only fetch
    /// failures surface.
    pub async fn sample(&self) -> Result<(), ephemeral_metrics_kubeapi::Error> {
        let raw = self
            .kubeapi
            .get_node_stats_summary(&self.node)
            .await
            .inspect_err(
                |err| tracing::error!(node = %self.node, ?err, "failed to fetch stats summary"),
            )?;

        let snapshot = NodeSnapshot::parse(&raw);
        tracing::debug!(
            node = %snapshot.node_name,
            pods = snapshot.pods.len(),
            "republishing snapshot"
        );
        self.usage.publish(&snapshot);
        Ok(())
    }
}

#[cfg(test)]
mod tests;
