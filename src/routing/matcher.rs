//! Matching a path remainder against the parameter rules of one route.
//!
//! # Responsibilities
//! - Split the part of a path after the page prefix into scalars and keyvals
//! - Reject rules with missing or (for non-star rules) surplus parameters
//! - Bind arguments, folding anything unconsumed into the star argument
//!
//! # Design Decisions
//! - A token is a keyval only if it has a non-empty value after the first `=`
//! - Keyvals are unordered; a repeated key keeps its first position and the
//!   last value
//! - Star values are not decoded

use crate::routing::compiler::RuleSet;
use crate::routing::hash::decode_component;
use crate::routing::types::{Params, RouteResult};

/// A path remainder split into positional and named tokens.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RequestTokens<'a> {
    pub scalars: Vec<&'a str>,
    pub keyvals: Vec<(&'a str, &'a str)>,
}

impl<'a> RequestTokens<'a> {
    pub fn tokenize(remainder: &'a str) -> Self {
        let mut tokens = Self::default();
        for token in remainder.split('/').filter(|t| !t.is_empty()) {
            match token.split_once('=') {
                Some((key, value)) if !value.is_empty() => tokens.insert_keyval(key, value),
                _ => tokens.scalars.push(token),
            }
        }
        tokens
    }

    fn insert_keyval(&mut self, key: &'a str, value: &'a str) {
        match self.keyvals.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.keyvals.push((key, value)),
        }
    }

    fn has_keyval(&self, key: &str) -> bool {
        self.keyvals.iter().any(|(k, _)| *k == key)
    }

    fn take_keyval(&mut self, key: &str) -> Option<&'a str> {
        let index = self.keyvals.iter().position(|(k, _)| *k == key)?;
        Some(self.keyvals.remove(index).1)
    }
}

/// Match a path remainder against a rule set.
///
/// Returns `Ok(None)` when the rule does not apply to the remainder.
pub fn match_rules(rules: &RuleSet, remainder: &str) -> RouteResult<Option<Params>> {
    let mut request = RequestTokens::tokenize(remainder);

    if rules.required_scalars() > request.scalars.len() {
        return Ok(None);
    }
    let keyvals_present = rules
        .keyvals
        .iter()
        .filter(|k| k.required)
        .all(|k| request.has_keyval(&k.name));
    if !keyvals_present {
        return Ok(None);
    }

    if !rules.has_star() {
        if request.scalars.len() > rules.scalars.len() {
            return Ok(None);
        }
        let undeclared = request
            .keyvals
            .iter()
            .any(|(key, _)| !rules.keyvals.iter().any(|k| k.name == *key));
        if undeclared {
            return Ok(None);
        }
    }

    let mut args = Params::new();
    for (rule, value) in rules.scalars.iter().zip(&request.scalars) {
        args.insert(rule.name.clone(), decode_component(value)?);
    }
    for rule in &rules.keyvals {
        if let Some(value) = request.take_keyval(&rule.name) {
            args.insert(rule.name.clone(), decode_component(value)?);
        }
    }

    if let Some(star) = &rules.star {
        let rest: Vec<String> = request
            .scalars
            .iter()
            .skip(rules.scalars.len())
            .map(|s| s.to_string())
            .chain(request.keyvals.iter().map(|(k, v)| format!("{k}={v}")))
            .collect();
        args.insert(star.clone(), rest.join("/"));
    }

    Ok(Some(args))
}
