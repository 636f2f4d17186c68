use std::path::PathBuf;
use std::process;

use clap::Parser;
use ephemeral_metrics_collector::{MetricsCollector, UsageGauge};
use ephemeral_metrics_kubeapi::KubeApi;
use prometheus::{Registry, TextEncoder};

use axum::extract::State;
use axum::http;
use axum::{routing::get, Router};

use config::Config;

mod config;

/// Per-node ephemeral storage exporter. Polls the local node's kubelet stats
/// summary and exposes per-pod usage on `/metrics`.
#[derive(Debug, Parser)]
struct Cli {
    /// Path to the kubeconfig file, used when not running in-cluster.
    #[arg(long)]
    kubeconfig: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = Cli::parse();
    let config = Config::from_env();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_new(&config.log_level)?)
        .init();
    tracing::info!(node = %config.node_name, "Starting ephemeral-metrics-exporter");

    let kubeapi = if config.in_cluster {
        KubeApi::in_cluster().await?
    } else if let Some(path) = cli.kubeconfig.or_else(config::default_kubeconfig) {
        KubeApi::from_kubeconfig(&path).await?
    } else {
        KubeApi::new().await?
    };

    let registry = Registry::new();
    let usage = UsageGauge::register(&registry)?;
    let collector =
        MetricsCollector::new(kubeapi, usage, &config.node_name, config.scrape_interval);

    // A fetch failure is fatal for the whole process, not just the task.
    tokio::spawn(async move {
        if let Err(err) = collector.run().await {
            tracing::error!(%err, "sampling loop aborted");
            process::exit(1);
        }
    });

    let app = router(registry);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.metrics_port)).await?;
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Listening on http://{addr}");
    }
    axum::serve(listener, app).await?;

    Ok(())
}

fn router(registry: Registry) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .with_state(registry)
}

async fn metrics(State(registry): State<Registry>) -> Result<String, http::StatusCode> {
    TextEncoder::new()
        .encode_to_string(&registry.gather())
        .map_err(|err| {
            tracing::error!(%err, "failed to render metrics");
            http::StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn healthz() -> &'static str {
    "ok"
}

#[cfg(test)]
mod tests {
    use super::*;

    use ephemeral_metrics::{NodeSnapshot, PodUsage};
    use tower::ServiceExt as _;

    fn snapshot(node: &str, pods: &[(&str, f64)]) -> NodeSnapshot {
        NodeSnapshot {
            node_name: node.to_string(),
            pods: pods
                .iter()
                .map(|(name, used_bytes)| PodUsage {
                    name: (*name).to_string(),
                    used_bytes: *used_bytes,
                })
                .collect(),
        }
    }

    async fn scrape(app: Router) -> String {
        let request = http::Request::builder()
            .uri("/metrics")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn metrics_endpoint_renders_published_snapshot() {
        let registry = Registry::new();
        let usage = UsageGauge::register(&registry).unwrap();
        usage.publish(&snapshot("node-a", &[("pod-x", 1_048_576.0)]));

        let body = scrape(router(registry)).await;
        // Label names render in sorted order.
        assert!(body.contains(
            r#"ephemeral_storage_pod_usage{node_name="node-a",pod_name="pod-x"} 1048576"#
        ));
    }

    #[tokio::test]
    async fn republish_drops_vanished_pods_from_exposition() {
        let registry = Registry::new();
        let usage = UsageGauge::register(&registry).unwrap();
        usage.publish(&snapshot("node-a", &[("pod-x", 1_048_576.0)]));
        usage.publish(&snapshot("node-a", &[("pod-y", 2048.0)]));

        let body = scrape(router(registry)).await;
        assert!(!body.contains("pod-x"));
        assert!(body.contains(r#"{node_name="node-a",pod_name="pod-y"} 2048"#));
    }

    #[tokio::test]
    async fn healthz_responds_ok() {
        let request = http::Request::builder()
            .uri("/healthz")
            .body(axum::body::Body::empty())
            .unwrap();
        let response = router(Registry::new()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), http::StatusCode::OK);
    }
}
