use serde::{Deserialize, Serialize};

/// Reduced view of the kubelet `/stats/summary` document.
///
/// Only the fields needed for ephemeral storage accounting are modelled;
/// everything else in the payload is ignored. Every field carries a serde
/// default so a partially matching document still decodes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub node: NodeStats,
    pub pods: Vec<PodStats>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NodeStats {
    pub node_name: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PodStats {
    pub pod_ref: PodRef,
    #[serde(rename = "ephemeral-storage")]
    pub ephemeral_storage: FsStats,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PodRef {
    pub name: String,
}

/// Filesystem usage as reported by the kubelet. `usedBytes` is carried
/// through unvalidated, sign included.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FsStats {
    pub used_bytes: f64,
}

impl Summary {
    /// Strict decode of a raw summary document.
    pub fn decode(raw: &str) -> serde_json::Result<Self> {
        serde_json::from_str(raw)
    }
}

/// Per-cycle value object: the node name plus the ephemeral storage usage of
/// every pod the kubelet reported for it. Built fresh each sampling cycle and
/// discarded once applied to the gauge.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeSnapshot {
    pub node_name: String,
    pub pods: Vec<PodUsage>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PodUsage {
    pub name: String,
    pub used_bytes: f64,
}

impl NodeSnapshot {
    /// Lenient decode: a malformed document yields an empty snapshot instead
    /// of an error. Pod order follows the payload. The discarded decode
    /// failure leaves one warn line behind; callers see no difference from a
    /// legitimately empty summary.
    pub fn parse(raw: &str) -> Self {
        match Summary::decode(raw) {
            Ok(summary) => Self::from(summary),
            Err(err) => {
                tracing::warn!(%err, "undecodable stats summary, yielding empty snapshot");
                Self::default()
            }
        }
    }
}

impl From<Summary> for NodeSnapshot {
    fn from(summary: Summary) -> Self {
        let pods = summary
            .pods
            .into_iter()
            .map(|pod| PodUsage {
                name: pod.pod_ref.name,
                used_bytes: pod.ephemeral_storage.used_bytes,
            })
            .collect();
        Self {
            node_name: summary.node.node_name,
            pods,
        }
    }
}
