//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Reject empty routes/methods and duplicate rules
//! - Compile every route so malformed patterns fail at load time
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RouteMapConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;

use thiserror::Error;

use crate::config::schema::RouteMapConfig;
use crate::routing::compiler::RouteCompiler;
use crate::routing::types::RouteError;

/// A single semantic problem in a configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("rule {index}: route and method must both be non-empty")]
    EmptyField { index: usize },

    #[error("rule {index}: {route} to {method} is already defined")]
    DuplicateRule {
        index: usize,
        route: String,
        method: String,
    },

    #[error("rule {index}: {source}")]
    InvalidRoute { index: usize, source: RouteError },
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &RouteMapConfig) -> Result<(), Vec<ValidationError>> {
    let compiler = RouteCompiler::new();
    let mut seen = HashSet::new();
    let mut errors = Vec::new();

    for (index, rule) in config.rules.iter().enumerate() {
        if rule.route.is_empty() || rule.method.is_empty() {
            errors.push(ValidationError::EmptyField { index });
            continue;
        }
        if !seen.insert(rule.fingerprint()) {
            errors.push(ValidationError::DuplicateRule {
                index,
                route: rule.route.clone(),
                method: rule.method.clone(),
            });
            continue;
        }
        if let Err(source) = compiler.compile(&rule.route) {
            errors.push(ValidationError::InvalidRoute { index, source });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
