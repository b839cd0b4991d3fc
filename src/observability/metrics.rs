//! Metrics collection and exposition.
//!
//! # Metrics
//! - `routemap_dispatch_total` (counter): dispatches by page
//! - `routemap_handlers_fired_total` (counter): handlers invoked
//! - `routemap_no_match_total` (counter): dispatches with no matching rule
//! - `routemap_rules_total` (counter): rule table changes by op
//! - `routemap_compile_cache_total` (counter): compile cache hits/misses

use metrics::counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install a global Prometheus recorder and return a handle for rendering.
pub fn init_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    tracing::info!("Prometheus recorder installed");
    Ok(handle)
}

pub fn record_dispatch(page: &str, fired: usize) {
    counter!("routemap_dispatch_total", "page" => page.to_string()).increment(1);
    counter!("routemap_handlers_fired_total").increment(fired as u64);
}

pub fn record_no_match() {
    counter!("routemap_no_match_total").increment(1);
}

pub fn record_rule_change(op: &'static str) {
    counter!("routemap_rules_total", "op" => op).increment(1);
}

pub fn record_compile_cache(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("routemap_compile_cache_total", "result" => result).increment(1);
}
