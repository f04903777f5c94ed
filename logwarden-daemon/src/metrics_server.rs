//! Prometheus metrics HTTP server.
//!
//! Uses the built-in HTTP listener from `metrics-exporter-prometheus`
//! to expose a Prometheus scrape endpoint for the tail engine metrics.

use std::net::SocketAddr;

use anyhow::Result;
use metrics_exporter_prometheus::PrometheusBuilder;

use logwarden_core::config::MetricsConfig;

/// Install the global metrics recorder and start the HTTP listener.
///
/// This function should be called once per process, before the engine
/// starts. After calling this, all `metrics::counter!()` and
/// `metrics::gauge!()` macros record to the Prometheus registry.
///
/// # Errors
///
/// - Socket binding fails
/// - Global recorder is already installed
pub fn install_metrics_recorder(config: &MetricsConfig) -> Result<()> {
    if config.endpoint != "/metrics" {
        return Err(anyhow::anyhow!(
            "unsupported metrics endpoint '{}': only '/metrics' is currently supported",
            config.endpoint
        ));
    }

    let addr: SocketAddr = format!("{}:{}", config.listen_addr, config.port)
        .parse()
        .map_err(|e| anyhow::anyhow!("invalid metrics listen address: {}", e))?;

    if addr.ip().is_unspecified() {
        tracing::warn!(
            listen_addr = %addr,
            "metrics endpoint is exposed on all interfaces; restrict listen_addr in untrusted networks"
        );
    }

    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("failed to install metrics recorder: {}", e))?;

    // Register metric descriptions
    logwarden_core::metrics::describe_all();

    metrics::gauge!(
        logwarden_core::metrics::ENGINE_BUILD_INFO,
        "version" => env!("CARGO_PKG_VERSION")
    )
    .set(1.0);

    tracing::info!(
        listen_addr = %addr,
        "Prometheus metrics endpoint active"
    );

    Ok(())
}
