//! Table of registered routes, grouped by page prefix.
//!
//! # Responsibilities
//! - Track which (route, method) pairs have been added
//! - Group compiled rules under their page prefix
//! - Keep page prefixes ordered for candidate lookup
//!
//! # Design Decisions
//! - Pages are ordered by descending length; the sort is stable, so pages of
//!   equal length keep registration order
//! - Only the longest matching page is a candidate, except that pages holding
//!   a star rule are always candidates when they prefix the path

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::routing::compiler::RuleSet;
use crate::routing::types::Rule;

/// A rule as stored in the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRecord {
    /// Handler name.
    pub method: String,
    pub rules: RuleSet,
    /// Route pattern as it was added.
    pub raw: String,
}

#[derive(Debug, Default)]
pub struct RouteTable {
    /// Map of page -> records registered under it.
    active: HashMap<String, Vec<RouteRecord>>,
    /// Fingerprints of every added rule.
    added: HashSet<String>,
    /// Distinct pages, longest first.
    pages: Vec<String>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, rule: &Rule) -> bool {
        self.added.contains(&rule.fingerprint())
    }

    /// Store a record under `page`.
    pub fn insert(&mut self, rule: &Rule, page: &str, record: RouteRecord) {
        self.added.insert(rule.fingerprint());
        if !self.active.contains_key(page) {
            self.pages.push(page.to_string());
            self.pages.sort_by(|a, b| b.len().cmp(&a.len()));
        }
        self.active.entry(page.to_string()).or_default().push(record);
    }

    /// Drop a rule. Returns false if it was never added.
    pub fn remove(&mut self, rule: &Rule, page: &str) -> bool {
        if !self.added.remove(&rule.fingerprint()) {
            return false;
        }
        let emptied = match self.active.get_mut(page) {
            Some(records) => {
                records.retain(|r| r.raw != rule.route || r.method != rule.method);
                records.is_empty()
            }
            None => false,
        };
        if emptied {
            self.active.remove(page);
            self.pages.retain(|p| p != page);
            tracing::debug!(page = %page, "Removed empty page");
        }
        true
    }

    /// Pages in lookup order.
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    pub fn records(&self, page: &str) -> &[RouteRecord] {
        self.active.get(page).map(Vec::as_slice).unwrap_or_default()
    }

    /// Pages that may hold a rule matching `path`.
    pub fn candidates(&self, path: &str) -> Vec<&str> {
        let normalized = if path.ends_with('/') {
            path.to_string()
        } else {
            format!("{path}/")
        };

        self.pages
            .iter()
            .filter(|page| normalized.starts_with(page.as_str()))
            .enumerate()
            .filter(|(index, page)| {
                *index == 0 || self.records(page).iter().any(|r| r.rules.has_star())
            })
            .map(|(_, page)| page.as_str())
            .collect()
    }

    /// Number of added rules.
    pub fn len(&self) -> usize {
        self.added.len()
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::compiler::RouteCompiler;

    fn add(table: &mut RouteTable, compiler: &RouteCompiler, route: &str, method: &str) {
        let rule = Rule::new(route, method);
        let compiled = compiler.compile(route).unwrap();
        let record = RouteRecord {
            method: method.into(),
            rules: compiled.rules.clone(),
            raw: route.into(),
        };
        table.insert(&rule, &compiled.page, record);
    }

    #[test]
    fn test_pages_sorted_longest_first() {
        let compiler = RouteCompiler::new();
        let mut table = RouteTable::new();
        add(&mut table, &compiler, "/a/:id", "m");
        add(&mut table, &compiler, "/abc/def", "m");
        add(&mut table, &compiler, "/", "m");
        add(&mut table, &compiler, "/xyz", "m");
        add(&mut table, &compiler, "/abc/def/:x", "n");

        assert_eq!(table.pages(), ["/abc/def", "/xyz", "/a", "/"]);
        assert_eq!(table.records("/abc/def").len(), 2);
        assert_eq!(table.len(), 5);
    }

    #[test]
    fn test_equal_length_pages_keep_registration_order() {
        let compiler = RouteCompiler::new();
        let mut table = RouteTable::new();
        add(&mut table, &compiler, "/bb/rest:*", "m");
        add(&mut table, &compiler, "/aa/rest:*", "m");
        add(&mut table, &compiler, "/c", "m");
        add(&mut table, &compiler, "/cc", "m");

        assert_eq!(table.pages(), ["/bb", "/aa", "/cc", "/c"]);
        assert_eq!(table.candidates("/aa/x"), vec!["/aa"]);
        assert_eq!(table.candidates("/bb/x"), vec!["/bb"]);
    }

    #[test]
    fn test_candidates_longest_only() {
        let compiler = RouteCompiler::new();
        let mut table = RouteTable::new();
        add(&mut table, &compiler, "/a/:id", "m");
        add(&mut table, &compiler, "/a/b", "n");

        assert_eq!(table.candidates("/a/b"), vec!["/a/b"]);
        assert_eq!(table.candidates("/a/c"), vec!["/a"]);
        assert!(table.candidates("/z").is_empty());
    }

    #[test]
    fn test_candidates_include_star_pages() {
        let compiler = RouteCompiler::new();
        let mut table = RouteTable::new();
        add(&mut table, &compiler, "/a/rest:*", "m");
        add(&mut table, &compiler, "/a/b", "n");
        add(&mut table, &compiler, "/:id", "o");

        assert_eq!(table.candidates("/a/b"), vec!["/a/b", "/a"]);
    }

    #[test]
    fn test_remove() {
        let compiler = RouteCompiler::new();
        let mut table = RouteTable::new();
        add(&mut table, &compiler, "/a/:id", "m");
        add(&mut table, &compiler, "/a/:id/:sub", "m");

        assert!(!table.remove(&Rule::new("/a/:id", "other"), "/a"));
        assert_eq!(table.records("/a").len(), 2);

        assert!(table.remove(&Rule::new("/a/:id", "m"), "/a"));
        assert_eq!(table.records("/a").len(), 1);
        assert_eq!(table.pages(), ["/a"]);

        assert!(table.remove(&Rule::new("/a/:id/:sub", "m"), "/a"));
        assert!(table.pages().is_empty());
        assert!(table.is_empty());
        assert!(table.candidates("/a/1").is_empty());
    }
}
