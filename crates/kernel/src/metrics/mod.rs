//! Prometheus metrics collection.
//!
//! Provides application metrics in Prometheus format.

use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::histogram::{Histogram, exponential_buckets};
use prometheus_client::registry::Registry;

/// HTTP request labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct HttpLabels {
    pub method: String,
    pub path: String,
    pub status: u16,
}

/// Block action labels.
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ActionLabels {
    pub content_type: String,
    pub action: String,
    pub outcome: String,
}

/// Application metrics.
pub struct Metrics {
    registry: Registry,

    /// HTTP request counter by method/path/status.
    pub http_requests: Family<HttpLabels, Counter>,

    /// HTTP request duration histogram.
    pub http_duration_seconds: Family<HttpLabels, Histogram>,

    /// Block actions by type, action and outcome.
    pub block_actions: Family<ActionLabels, Counter>,
}

impl Metrics {
    /// Create a new metrics registry.
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let http_requests = Family::<HttpLabels, Counter>::default();
        registry.register(
            "http_requests_total",
            "Total HTTP requests",
            http_requests.clone(),
        );

        let http_duration_seconds = Family::<HttpLabels, Histogram>::new_with_constructor(|| {
            Histogram::new(exponential_buckets(0.001, 2.0, 12))
        });
        registry.register(
            "http_request_duration_seconds",
            "HTTP request duration in seconds",
            http_duration_seconds.clone(),
        );

        let block_actions = Family::<ActionLabels, Counter>::default();
        registry.register(
            "block_actions_total",
            "Content block actions by outcome",
            block_actions.clone(),
        );

        Self {
            registry,
            http_requests,
            http_duration_seconds,
            block_actions,
        }
    }

    /// Record an HTTP request.
    pub fn record_request(&self, method: &str, path: &str, status: u16, duration_secs: f64) {
        let labels = HttpLabels {
            method: method.to_string(),
            path: normalize_path(path),
            status,
        };

        self.http_requests.get_or_create(&labels).inc();
        self.http_duration_seconds
            .get_or_create(&labels)
            .observe(duration_secs);
    }

    /// Record a controller action and how it ended.
    pub fn record_action(&self, content_type: &str, action: &str, outcome: &str) {
        self.block_actions
            .get_or_create(&ActionLabels {
                content_type: content_type.to_string(),
                action: action.to_string(),
                outcome: outcome.to_string(),
            })
            .inc();
    }

    /// Encode metrics in Prometheus text format.
    ///
    /// # Panics
    ///
    /// Panics if Prometheus metric encoding to a `String` buffer fails.
    /// The `fmt::Write` impl for `String` is infallible.
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        #[allow(clippy::expect_used)]
        encode(&mut buffer, &self.registry).expect("encoding metrics");
        buffer
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish()
    }
}

/// Normalize a path for metrics labels.
///
/// Replaces ids and version numbers with a placeholder to limit cardinality.
fn normalize_path(path: &str) -> String {
    path.split('/')
        .map(|s| {
            if uuid::Uuid::parse_str(s).is_ok()
                || (!s.is_empty() && s.chars().all(|c| c.is_ascii_digit()))
            {
                "{id}"
            } else {
                s
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path("/cms/news_releases/550e8400-e29b-41d4-a716-446655440000/revert_to/2"),
            "/cms/news_releases/{id}/revert_to/{id}"
        );
        assert_eq!(normalize_path("/cms/html_blocks"), "/cms/html_blocks");
        assert_eq!(normalize_path("/"), "/");
    }

    #[test]
    fn test_record_action() {
        let metrics = Metrics::new();
        metrics.record_action("NewsRelease", "publish", "redirect");
        metrics.record_request("POST", "/cms/news_releases", 303, 0.01);

        let output = metrics.encode();
        assert!(output.contains("block_actions_total"));
        assert!(output.contains("action=\"publish\""));
        assert!(output.contains("http_requests_total"));
    }
}
