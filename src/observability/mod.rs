//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! routing (compile, add/remove, dispatch) produces:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters via the metrics facade)
//!
//! Consumers:
//!     → stderr (fmt subscriber)
//!     → Prometheus text exposition (optional recorder)
//! ```
//!
//! # Design Decisions
//! - Metric updates are no-ops until a recorder is installed
//! - Log level configurable via config and environment

pub mod logging;
pub mod metrics;
