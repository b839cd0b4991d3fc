//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Rule Registration (at startup):
//!     Rule { route, method }
//!     → compiler.rs (split into page + scalars/keyvals/star, cached)
//!     → table.rs (group by page, pages sorted longest first)
//!
//! Incoming Path:
//!     → table.rs (candidate pages: longest prefix + star pages)
//!     → matcher.rs (bind scalars, keyvals, star)
//!     → hash.rs (canonical path per match, used for ordering)
//!     → router.rs (resolve handlers, dispatch all matches)
//! ```
//!
//! # Design Decisions
//! - Patterns are compiled at registration; malformed routes fail there
//! - Matches are ordered by descending canonical hash length
//! - Every match fires, not only the first

pub mod compiler;
pub mod handlers;
pub mod hash;
pub mod location;
pub mod matcher;
pub mod router;
pub mod table;
pub mod types;

pub use compiler::{CompiledRoute, ParamRule, RouteCompiler, RuleSet};
pub use handlers::{Handler, HandlerRegistry};
pub use location::{Location, MemoryLocation};
pub use router::RouteMap;
pub use table::RouteRecord;
pub use types::{Params, ParsedRequest, Resolved, Rule, RouteError, RouteResult};
