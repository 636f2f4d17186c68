use std::fmt;
use std::fmt::Debug;

use ephemeral_metrics::NodeSnapshot;
use prometheus::{GaugeVec, Opts, Registry};

pub const EPHEMERAL_STORAGE_USAGE_METRIC: &str = "ephemeral_storage_pod_usage";

/// Label-keyed gauge holding the last published snapshot.
///
/// Clones share the same underlying series, so one handle can feed the
/// sampling loop while the registry renders concurrent scrapes; the
/// prometheus crate's internal locking is the only synchronization.
#[derive(Clone)]
pub struct UsageGauge {
    usage: GaugeVec,
}

impl UsageGauge {
    /// Register the `ephemeral_storage_pod_usage` gauge with `registry`.
    pub fn register(registry: &Registry) -> prometheus::Result<Self> {
        let opts = Opts::new(
            EPHEMERAL_STORAGE_USAGE_METRIC,
            "Used ephemeral storage bytes per pod",
        );
        let usage = GaugeVec::new(opts, &["pod_name", "node_name"])?;
        registry.register(Box::new(usage.clone()))?;
        Ok(Self { usage })
    }

    /// Replace every previously published series with the snapshot's pods.
    ///
    /// After this returns the gauge's key set is exactly the snapshot's pod
    /// set; an empty snapshot leaves no series behind.
    pub fn publish(&self, snapshot: &NodeSnapshot) {
        self.usage.reset();
        for pod in &snapshot.pods {
            self.usage
                .with_label_values(&[pod.name.as_str(), snapshot.node_name.as_str()])
                .set(pod.used_bytes);
        }
    }
}

impl Debug for UsageGauge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsageGauge")
            .field("metric", &EPHEMERAL_STORAGE_USAGE_METRIC)
            .finish()
    }
}
