//! Routing types and error definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Argument dictionary extracted from (or applied to) a path.
pub type Params = BTreeMap<String, String>;

/// A rule: a route pattern and the name of its handler.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Rule {
    /// Route pattern, e.g. `/foo/:id/:sub?/attr:/subattr:?/rest:*`.
    pub route: String,

    /// Name of the handler registered in the current context.
    pub method: String,
}

impl Rule {
    pub fn new(route: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            method: method.into(),
        }
    }

    /// Identity of a rule inside a route table.
    pub(crate) fn fingerprint(&self) -> String {
        format!("{}|{}", self.method, self.route)
    }

    /// Both fields must be non-empty.
    pub(crate) fn validate(&self, op: &str) -> RouteResult<()> {
        if self.route.is_empty() || self.method.is_empty() {
            return Err(RouteError::Type(format!(
                "{op}: rule.route and rule.method must both be non-empty strings"
            )));
        }
        Ok(())
    }
}

/// A rule that matched a path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParsedRequest {
    /// Page prefix the rule is registered under.
    pub page: String,
    /// Canonical path for this rule with these arguments.
    pub hash: String,
    /// Handler name.
    pub method: String,
    /// Decoded arguments (the star argument stays encoded).
    pub args: Params,
}

/// Result of the public `parse` operation: the best match only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    pub page: String,
    pub args: Params,
}

impl From<ParsedRequest> for Resolved {
    fn from(parsed: ParsedRequest) -> Self {
        Self {
            page: parsed.page,
            args: parsed.args,
        }
    }
}

/// Errors raised by route compilation, matching and path generation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// Malformed route pattern or a path that cannot be parsed.
    #[error("SyntaxError: {0}")]
    Syntax(String),

    /// Invalid argument, missing handler or missing required parameter.
    #[error("TypeError: {0}")]
    Type(String),

    /// The same route was already added for the same method.
    #[error("Error: {0}")]
    Duplicate(String),
}

/// Result type for routing operations.
pub type RouteResult<T> = Result<T, RouteError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint() {
        let rule = Rule::new("/a/:id", "views.a");
        assert_eq!(rule.fingerprint(), "views.a|/a/:id");
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        assert!(Rule::new("/a", "m").validate("add").is_ok());

        let err = Rule::new("", "m").validate("add").unwrap_err();
        assert!(matches!(err, RouteError::Type(_)));
        assert!(err.to_string().starts_with("TypeError: add:"));

        assert!(Rule::new("/a", "").validate("remove").is_err());
    }

    #[test]
    fn test_error_display() {
        let err = RouteError::Syntax("compile: bad".into());
        assert_eq!(err.to_string(), "SyntaxError: compile: bad");

        let err = RouteError::Duplicate("add: /a to m already exists".into());
        assert!(err.to_string().contains("already exists"));
    }
}
