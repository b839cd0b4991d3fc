//! Pattern-based URL routing.
//!
//! Routes such as `/foo/:id/:sub?/attr:/subattr:?/rest:*` are compiled into a
//! page prefix plus parameter rules. Paths are matched against every rule,
//! arguments are extracted, and matching handlers are dispatched. The inverse,
//! `RouteMap::hash`, builds a canonical path from a route and arguments.

pub mod config;
pub mod observability;
pub mod routing;

pub use config::RouteMapConfig;
pub use routing::{Params, ParsedRequest, Resolved, Rule, RouteError, RouteMap, RouteResult};
