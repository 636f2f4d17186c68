use super::*;
use prometheus::Registry;

#[tokio::test]
async fn fetch_failure_surfaces_as_err() {
    // Nothing listens on port 1; the proxied GET fails at transport level.
    let config = kube::Config::new("http://127.0.0.1:1".parse().unwrap());
    let client = kube::Client::try_from(config).unwrap();
    let kubeapi = KubeApi::with_client(client);

    let registry = Registry::new();
    let usage = UsageGauge::register(&registry).unwrap();
    let collector = MetricsCollector::new(kubeapi, usage, "node-a", Duration::from_secs(1));

    assert!(collector.sample().await.is_err());
}
