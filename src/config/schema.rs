//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::routing::router::DEFAULT_PREFIX;
use crate::routing::types::Rule;

/// Root configuration for a route map.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RouteMapConfig {
    /// Prefix stripped from fragments (e.g. "#" or "#!").
    pub prefix: String,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Rules, in registration order.
    pub rules: Vec<Rule>,
}

impl Default for RouteMapConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
            observability: ObservabilityConfig::default(),
            rules: Vec::new(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Install a Prometheus recorder for route metrics.
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
        }
    }
}
