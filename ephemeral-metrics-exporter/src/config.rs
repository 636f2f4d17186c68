use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_SCRAPE_INTERVAL_SECS: u64 = 15;
const DEFAULT_METRICS_PORT: u16 = 9100;
const DEFAULT_LOG_LEVEL: &str = "info";

/// Process configuration, read once from the environment at startup and
/// immutable afterwards.
#[derive(Clone, Debug)]
pub(crate) struct Config {
    pub(crate) in_cluster: bool,
    pub(crate) node_name: String,
    pub(crate) scrape_interval: Duration,
    pub(crate) metrics_port: u16,
    pub(crate) log_level: String,
}

impl Config {
    pub(crate) fn from_env() -> Self {
        Self {
            in_cluster: lookup("IN_CLUSTER", "true") == "true",
            node_name: lookup("CURRENT_NODE_NAME", ""),
            scrape_interval: Duration::from_secs(parse_or(
                env::var("SCRAPE_INTERVAL").ok(),
                DEFAULT_SCRAPE_INTERVAL_SECS,
            )),
            metrics_port: parse_or(env::var("METRICS_PORT").ok(), DEFAULT_METRICS_PORT),
            log_level: lookup("LOG_LEVEL", DEFAULT_LOG_LEVEL),
        }
    }
}

fn lookup(key: &str, fallback: &str) -> String {
    env::var(key).unwrap_or_else(|_| fallback.to_string())
}

/// Unset, empty, or unparsable values fall back to the default.
fn parse_or<T: FromStr>(value: Option<String>, fallback: T) -> T {
    value
        .and_then(|value| value.parse().ok())
        .unwrap_or(fallback)
}

/// `$HOME/.kube/config`, matching what kubectl would pick up.
pub(crate) fn default_kubeconfig() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| PathBuf::from(home).join(".kube").join("config"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_accepts_valid_values() {
        assert_eq!(parse_or(Some("30".to_string()), 15_u64), 30);
        assert_eq!(parse_or(Some("9200".to_string()), 9100_u16), 9200);
    }

    #[test]
    fn parse_or_falls_back_on_missing_or_garbage() {
        assert_eq!(parse_or(None, 15_u64), 15);
        assert_eq!(parse_or(Some(String::new()), 15_u64), 15);
        assert_eq!(parse_or(Some("soon".to_string()), 9100_u16), 9100);
    }
}
