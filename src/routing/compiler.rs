//! Route pattern compilation.
//!
//! # Responsibilities
//! - Split a route pattern into its static page prefix and parameter rules
//! - Reject malformed patterns at registration time
//! - Cache compiled patterns per route string
//!
//! # Grammar
//! ```text
//! /page/segments/:scalar/:optional?/key:/optional_key:?/rest:*
//! ```
//! - page segments contain none of `* : ?` and precede every parameter
//! - scalar: `:name` (required) or `:name?` (optional, must be trailing)
//! - keyval: `name:` (required) or `name:?` (optional), matched as `name=value`
//! - star: `name:*` or a bare `*` (named `*`), must be the last segment

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, PoisonError};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::observability::metrics;
use crate::routing::types::{RouteError, RouteResult};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*:?]").unwrap());
static STAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:([^*:?]+):\*|\*)$").unwrap());
static SCALAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^:([^*:?]+)(\??)$").unwrap());
static KEYVAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^*:?]+):(\??)$").unwrap());

/// Name used for an anonymous star segment.
pub const ANONYMOUS_STAR: &str = "*";

/// A named parameter of a route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamRule {
    pub name: String,
    pub required: bool,
}

/// Parameter rules of a compiled route.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RuleSet {
    /// Positional segments, in declaration order.
    pub scalars: Vec<ParamRule>,
    /// Named `key=value` segments.
    pub keyvals: Vec<ParamRule>,
    /// Name of the parameter absorbing everything left over.
    pub star: Option<String>,
}

impl RuleSet {
    pub fn required_scalars(&self) -> usize {
        self.scalars.iter().filter(|s| s.required).count()
    }

    pub fn has_star(&self) -> bool {
        self.star.is_some()
    }
}

/// A route pattern split into page prefix and parameter rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledRoute {
    /// Static prefix; never ends in `/` unless it is exactly `/`.
    pub page: String,
    pub rules: RuleSet,
}

/// Compiles route patterns and keeps every successful result.
#[derive(Debug, Default)]
pub struct RouteCompiler {
    memo: Mutex<HashMap<String, Arc<CompiledRoute>>>,
}

impl RouteCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile a route pattern.
    ///
    /// Anything before the first `/` is ignored, so `name/foo/:id` compiles
    /// the same as `/foo/:id`. Compiling the same route twice returns the same
    /// `Arc`.
    pub fn compile(&self, orig: &str) -> RouteResult<Arc<CompiledRoute>> {
        let route = match orig.find('/') {
            Some(index) => &orig[index..],
            None => {
                return Err(RouteError::Syntax(format!(
                    "compile: the route {orig} was not understood"
                )))
            }
        };

        let mut memo = self.memo.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(compiled) = memo.get(route) {
            metrics::record_compile_cache(true);
            return Ok(Arc::clone(compiled));
        }
        metrics::record_compile_cache(false);

        let compiled = Arc::new(compile_route(route, orig)?);
        tracing::debug!(route = %orig, page = %compiled.page, "Compiled route");
        memo.insert(route.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    /// Number of cached routes.
    pub fn len(&self) -> usize {
        self.memo.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn syntax(message: String) -> RouteError {
    RouteError::Syntax(format!("compile: {message}"))
}

fn claim<'a>(names: &mut HashSet<&'a str>, name: &'a str, orig: &str) -> RouteResult<()> {
    if !names.insert(name) {
        return Err(syntax(format!("\"{name}\" is repeated in: {orig}")));
    }
    Ok(())
}

fn compile_route(route: &str, orig: &str) -> RouteResult<CompiledRoute> {
    let mut page: Vec<&str> = Vec::new();
    let mut rules = RuleSet::default();
    let mut names = HashSet::new();
    let mut optional_scalar = false;

    for segment in route.split('/') {
        if rules.star.is_some() {
            return Err(syntax(format!("no rules can follow a * directive in: {orig}")));
        }

        let has_params = !rules.scalars.is_empty() || !rules.keyvals.is_empty();
        if !has_params && !TOKEN_RE.is_match(segment) {
            page.push(segment);
            continue;
        }

        if let Some(caps) = STAR_RE.captures(segment) {
            let name = caps.get(1).map_or(ANONYMOUS_STAR, |m| m.as_str());
            claim(&mut names, name, orig)?;
            rules.star = Some(name.to_string());
            continue;
        }

        if let Some(caps) = SCALAR_RE.captures(segment) {
            let optional = !caps[2].is_empty();
            if optional_scalar && !optional {
                return Err(syntax(format!(
                    "\"{segment}\" cannot follow an optional rule in: {orig}"
                )));
            }
            optional_scalar |= optional;
            let name = caps.get(1).map_or("", |m| m.as_str());
            claim(&mut names, name, orig)?;
            rules.scalars.push(ParamRule {
                name: name.to_string(),
                required: !optional,
            });
            continue;
        }

        if let Some(caps) = KEYVAL_RE.captures(segment) {
            let name = caps.get(1).map_or("", |m| m.as_str());
            claim(&mut names, name, orig)?;
            rules.keyvals.push(ParamRule {
                name: name.to_string(),
                required: caps[2].is_empty(),
            });
            continue;
        }

        return Err(syntax(format!(
            "the rule \"{segment}\" was not understood in: {orig}"
        )));
    }

    let joined = page.join("/");
    let page = match joined.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    };

    Ok(CompiledRoute {
        page: page.to_string(),
        rules,
    })
}
