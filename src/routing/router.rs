//! Route registration, lookup and dispatch.
//!
//! # Responsibilities
//! - Own the route table, the compile cache and the handler context
//! - Match paths against every registered rule
//! - Generate canonical paths from routes and arguments
//! - Dispatch matched rules and track `current` / `last`
//!
//! # Dispatch Order
//! ```text
//! path     = get()
//! parsed   = matches(path)          (longest hash first)
//! current  = parsed[0]
//! parsed   = pre_dispatch(parsed)
//! current  = parsed[0]
//! fire every rule in parsed
//! last     = parsed[0]
//! ```
//!
//! # Design Decisions
//! - Errors are returned to the caller as-is; nothing is recovered internally
//! - Every matched rule fires, not only the first
//! - An unmatched path goes to the default handler instead of failing

use std::fmt;
use std::sync::Arc;

use crate::config::RouteMapConfig;
use crate::observability::metrics;
use crate::routing::compiler::{CompiledRoute, RouteCompiler};
use crate::routing::handlers::{Handler, HandlerRegistry};
use crate::routing::hash::generate;
use crate::routing::location::{fragment_for, path_from_fragment, Location, MemoryLocation};
use crate::routing::matcher::match_rules;
use crate::routing::table::{RouteRecord, RouteTable};
use crate::routing::types::{Params, ParsedRequest, Resolved, Rule, RouteError, RouteResult};

/// Default prefix stripped from fragments.
pub const DEFAULT_PREFIX: &str = "#";

/// Rewrites a rule record right before it is stored.
pub type PostAddHook = Box<dyn Fn(RouteRecord) -> RouteRecord + Send + Sync>;

/// Rewrites the matched list right before dispatch.
pub type PreDispatchHook = Box<dyn Fn(Vec<ParsedRequest>) -> Vec<ParsedRequest> + Send + Sync>;

/// Called with the unmatched path and the extra dispatch value.
pub type DefaultHandler<E> = Box<dyn Fn(&str, &E) + Send + Sync>;

/// A table of route patterns and the handlers they dispatch to.
pub struct RouteMap<E = ()> {
    compiler: RouteCompiler,
    table: RouteTable,
    context: HandlerRegistry<E>,
    location: Box<dyn Location>,
    prefix: String,
    post_add: PostAddHook,
    pre_dispatch: PreDispatchHook,
    default_handler: DefaultHandler<E>,
    current: Option<ParsedRequest>,
    last: Option<ParsedRequest>,
}

impl RouteMap {
    /// Create an empty route map whose handlers take no extra value.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<E> Default for RouteMap<E> {
    fn default() -> Self {
        Self::with_context(HandlerRegistry::new())
    }
}

impl<E> RouteMap<E> {
    /// Create an empty route map resolving methods against `context`.
    pub fn with_context(context: HandlerRegistry<E>) -> Self {
        Self {
            compiler: RouteCompiler::new(),
            table: RouteTable::new(),
            context,
            location: Box::new(MemoryLocation::default()),
            prefix: DEFAULT_PREFIX.to_string(),
            post_add: Box::new(|record| record),
            pre_dispatch: Box::new(|parsed| parsed),
            default_handler: Box::new(|_, _| {}),
            current: None,
            last: None,
        }
    }

    /// Build a route map from configuration: sets the prefix and adds every
    /// configured rule.
    pub fn from_config(config: &RouteMapConfig) -> RouteResult<Self> {
        let mut map = Self::default();
        map.set_prefix(config.prefix.clone());
        for rule in &config.rules {
            map.add(rule)?;
        }
        tracing::info!(rules = map.table.len(), prefix = %map.prefix, "Route map loaded");
        Ok(map)
    }

    /// Compile a route pattern (cached).
    pub fn compile(&self, route: &str) -> RouteResult<Arc<CompiledRoute>> {
        self.compiler.compile(route)
    }

    /// Add a rule to the table.
    pub fn add(&mut self, rule: &Rule) -> RouteResult<()> {
        rule.validate("add")?;
        if self.table.contains(rule) {
            return Err(RouteError::Duplicate(format!(
                "add: {} to {} already exists",
                rule.route, rule.method
            )));
        }

        let compiled = self.compiler.compile(&rule.route)?;
        let record = (self.post_add)(RouteRecord {
            method: rule.method.clone(),
            rules: compiled.rules.clone(),
            raw: rule.route.clone(),
        });
        self.table.insert(rule, &compiled.page, record);

        metrics::record_rule_change("add");
        tracing::debug!(route = %rule.route, method = %rule.method, page = %compiled.page, "Added rule");
        Ok(())
    }

    /// Remove a rule. Removing a rule that was never added does nothing.
    pub fn remove(&mut self, rule: &Rule) -> RouteResult<()> {
        rule.validate("remove")?;
        if !self.table.contains(rule) {
            return Ok(());
        }

        let compiled = self.compiler.compile(&rule.route)?;
        self.table.remove(rule, &compiled.page);

        metrics::record_rule_change("remove");
        tracing::debug!(route = %rule.route, method = %rule.method, "Removed rule");
        Ok(())
    }

    /// Every rule matching `path`, longest hash first.
    pub fn matches(&self, path: &str) -> RouteResult<Vec<ParsedRequest>> {
        let pages = self.table.candidates(path);
        if pages.is_empty() {
            return Ok(Vec::new());
        }

        let mut parsed = Vec::new();
        for page in pages {
            let remainder = path.strip_prefix(page).unwrap_or(path);
            for record in self.table.records(page) {
                let Some(args) = match_rules(&record.rules, remainder)? else {
                    continue;
                };
                if !self.context.contains(&record.method) {
                    return Err(RouteError::Type(format!(
                        "parse: {} is not a function in current context",
                        record.method
                    )));
                }
                let hash = self.hash(&record.raw, &args)?;
                parsed.push(ParsedRequest {
                    page: page.to_string(),
                    hash,
                    method: record.method.clone(),
                    args,
                });
            }
        }

        parsed.sort_by(|a, b| b.hash.len().cmp(&a.hash.len()));
        tracing::trace!(path = %path, matched = parsed.len(), "Matched path");
        Ok(parsed)
    }

    /// Parse a fragment into the page and arguments of its best match.
    pub fn parse(&self, hash: &str) -> RouteResult<Resolved> {
        let path = match hash.find('/') {
            Some(index) => &hash[index..],
            None => {
                return Err(RouteError::Type(
                    "parse: hash must be a string with a / character".to_string(),
                ))
            }
        };

        self.matches(path)?
            .into_iter()
            .next()
            .map(Resolved::from)
            .ok_or_else(|| RouteError::Syntax(format!("parse: {path} cannot be parsed")))
    }

    /// Generate the canonical path for `route` with `params`.
    pub fn hash(&self, route: &str, params: &Params) -> RouteResult<String> {
        if route.is_empty() {
            return Err(RouteError::Type(
                "hash: rule.route must be a non-empty string".to_string(),
            ));
        }
        let compiled = self.compiler.compile(route)?;
        generate(&compiled, route, params)
    }

    /// Dispatch the current location to every matching rule.
    pub fn handler(&mut self, extra: &E) -> RouteResult<()> {
        let url = self.get();
        let parsed = self.matches(&url)?;
        if parsed.is_empty() {
            tracing::warn!(path = %url, "No route matched");
            metrics::record_no_match();
            (self.default_handler)(&url, extra);
            return Ok(());
        }

        self.current = parsed.first().cloned();
        let parsed = (self.pre_dispatch)(parsed);
        self.current = parsed.first().cloned();

        let resolved = parsed
            .iter()
            .map(|request| self.resolve(&request.method).map(|h| (h, request)))
            .collect::<RouteResult<Vec<_>>>()?;

        for (handler, request) in resolved {
            tracing::debug!(method = %request.method, hash = %request.hash, "Dispatching");
            handler(&request.args, extra);
        }

        if let Some(first) = parsed.first() {
            tracing::info!(path = %url, page = %first.page, fired = parsed.len(), "Dispatched");
            metrics::record_dispatch(&first.page, parsed.len());
        }
        self.last = parsed.into_iter().next();
        Ok(())
    }

    fn resolve(&self, method: &str) -> RouteResult<Handler<E>> {
        self.context.get(method).ok_or_else(|| {
            RouteError::Type(format!("handler: {method} is not a function in current context"))
        })
    }

    /// The request being (or last) dispatched.
    pub fn current(&self) -> Option<ParsedRequest> {
        self.current.clone()
    }

    /// The request dispatched before the current one; equal to `current`
    /// once a dispatch has finished.
    pub fn last(&self) -> Option<ParsedRequest> {
        self.last.clone()
    }

    /// Handlers that rule methods are resolved against.
    pub fn context(&self) -> &HandlerRegistry<E> {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut HandlerRegistry<E> {
        &mut self.context
    }

    /// Replace the handler context, returning the new one.
    pub fn set_context(&mut self, context: HandlerRegistry<E>) -> &HandlerRegistry<E> {
        self.context = context;
        &self.context
    }

    /// Register a handler in the current context.
    pub fn register_handler<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Params, &E) + Send + Sync + 'static,
    {
        self.context.register(name, handler);
    }

    /// Prefix stripped from fragments (`#` by default, `#!` for hash-bang).
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) -> &str {
        self.prefix = prefix.into();
        &self.prefix
    }

    /// Current routable path read from the location.
    pub fn get(&self) -> String {
        path_from_fragment(&self.location.fragment(), &self.prefix)
    }

    /// Navigate the location to `hash`.
    pub fn go(&mut self, hash: &str) {
        let fragment = fragment_for(hash, &self.prefix);
        tracing::debug!(fragment = %fragment, "Navigating");
        self.location.set_fragment(fragment);
    }

    pub fn location(&self) -> &dyn Location {
        self.location.as_ref()
    }

    pub fn set_location(&mut self, location: Box<dyn Location>) {
        self.location = location;
    }

    pub fn set_post_add<F>(&mut self, hook: F)
    where
        F: Fn(RouteRecord) -> RouteRecord + Send + Sync + 'static,
    {
        self.post_add = Box::new(hook);
    }

    pub fn set_pre_dispatch<F>(&mut self, hook: F)
    where
        F: Fn(Vec<ParsedRequest>) -> Vec<ParsedRequest> + Send + Sync + 'static,
    {
        self.pre_dispatch = Box::new(hook);
    }

    pub fn set_default_handler<F>(&mut self, handler: F)
    where
        F: Fn(&str, &E) + Send + Sync + 'static,
    {
        self.default_handler = Box::new(handler);
    }

    /// Registered page prefixes, longest first.
    pub fn pages(&self) -> &[String] {
        self.table.pages()
    }

    /// Records registered under `page`.
    pub fn records(&self, page: &str) -> &[RouteRecord] {
        self.table.records(page)
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

impl<E> fmt::Debug for RouteMap<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteMap")
            .field("table", &self.table)
            .field("context", &self.context)
            .field("prefix", &self.prefix)
            .field("current", &self.current)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn noop(map: &mut RouteMap, names: &[&str]) {
        for name in names {
            map.register_handler(*name, |_, _| {});
        }
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_add_duplicate() {
        let mut map = RouteMap::new();
        map.add(&Rule::new("/a/:id", "m")).unwrap();
        let err = map.add(&Rule::new("/a/:id", "m")).unwrap_err();
        assert!(matches!(err, RouteError::Duplicate(_)));

        // Same route, different method is a different rule.
        map.add(&Rule::new("/a/:id", "n")).unwrap();
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_add_rejects_bad_rules() {
        let mut map = RouteMap::new();
        assert!(matches!(map.add(&Rule::new("", "m")), Err(RouteError::Type(_))));
        assert!(matches!(map.add(&Rule::new("/a", "")), Err(RouteError::Type(_))));
        assert!(matches!(
            map.add(&Rule::new("/a/:id?/:sub", "m")),
            Err(RouteError::Syntax(_))
        ));
        assert!(map.is_empty());
    }

    #[test]
    fn test_parse_scalar() {
        let mut map = RouteMap::new();
        noop(&mut map, &["m"]);
        map.add(&Rule::new("/a/:id", "m")).unwrap();

        let resolved = map.parse("/a/5").unwrap();
        assert_eq!(resolved.page, "/a");
        assert_eq!(resolved.args, params(&[("id", "5")]));

        let resolved = map.parse("#/a/6").unwrap();
        assert_eq!(resolved.args, params(&[("id", "6")]));
    }

    #[test]
    fn test_parse_errors() {
        let mut map = RouteMap::new();
        noop(&mut map, &["m"]);
        map.add(&Rule::new("/a/:id", "m")).unwrap();

        assert!(matches!(map.parse("nothing"), Err(RouteError::Type(_))));
        assert!(matches!(map.parse("/b/1"), Err(RouteError::Syntax(_))));
    }

    #[test]
    fn test_missing_handler_is_type_error() {
        let mut map = RouteMap::new();
        map.add(&Rule::new("/a/:id", "missing")).unwrap();
        assert!(matches!(map.matches("/a/1"), Err(RouteError::Type(_))));

        // Non-matching rules do not need a handler.
        assert!(map.matches("/b").unwrap().is_empty());
    }

    #[test]
    fn test_hash_errors() {
        let map = RouteMap::new();
        assert!(matches!(map.hash("", &Params::new()), Err(RouteError::Type(_))));
        assert!(matches!(map.hash("/a/:id", &Params::new()), Err(RouteError::Type(_))));
        assert_eq!(map.hash("/a/:id?", &Params::new()).unwrap(), "/a");
    }

    #[test]
    fn test_post_add_rewrites_record() {
        let mut map = RouteMap::new();
        map.set_post_add(|mut record| {
            record.method = format!("app.{}", record.method);
            record
        });
        map.add(&Rule::new("/a", "home")).unwrap();
        assert_eq!(map.records("/a")[0].method, "app.home");
    }

    #[test]
    fn test_handler_fires_all_matches() {
        let log = std::sync::Arc::new(Mutex::new(Vec::new()));
        let mut map = RouteMap::new();
        for name in ["exact", "wild"] {
            let log = log.clone();
            map.register_handler(name, move |args, _| {
                log.lock().unwrap().push((name, args.clone()));
            });
        }
        map.add(&Rule::new("/a/b", "exact")).unwrap();
        map.add(&Rule::new("/a/rest:*", "wild")).unwrap();

        map.go("/a/b");
        map.handler(&()).unwrap();

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].0, "exact");
        assert_eq!(log[1], ("wild", params(&[("rest", "b")])));
        assert_eq!(map.current().unwrap().method, "exact");
        assert_eq!(map.last(), map.current());
    }

    #[test]
    fn test_default_handler_on_no_match() {
        let seen = std::sync::Arc::new(Mutex::new(None));
        let mut map = RouteMap::new();
        let sink = seen.clone();
        map.set_default_handler(move |path, _| {
            *sink.lock().unwrap() = Some(path.to_string());
        });

        map.go("/nowhere");
        map.handler(&()).unwrap();
        assert_eq!(seen.lock().unwrap().as_deref(), Some("/nowhere"));
        assert!(map.current().is_none());
        assert!(map.last().is_none());
    }

    #[test]
    fn test_prefix_and_location() {
        let mut map = RouteMap::new();
        assert_eq!(map.prefix(), DEFAULT_PREFIX);
        assert_eq!(map.get(), "/");

        map.set_prefix("#!");
        map.go("/a/1");
        assert_eq!(map.location().fragment(), "#!/a/1");
        assert_eq!(map.get(), "/a/1");

        map.set_location(Box::new(MemoryLocation::new("#!/b")));
        assert_eq!(map.get(), "/b");
    }
}
