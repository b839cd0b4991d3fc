//! Path generation, the inverse of matching.
//!
//! Values are percent-encoded with the same unreserved set as
//! `encodeURIComponent`, so hashes produced here can be handed to a browser
//! location unchanged.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::routing::compiler::CompiledRoute;
use crate::routing::types::{Params, RouteError, RouteResult};

/// Characters left untouched by `encode_component`.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Percent-encode a single path component.
pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

/// Decode a single path component.
pub fn decode_component(value: &str) -> RouteResult<String> {
    let invalid = || RouteError::Syntax(format!("parse: {value} is not a valid URI component"));

    // Every `%` must introduce two hex digits.
    let bytes = value.as_bytes();
    for (index, _) in value.match_indices('%') {
        match bytes.get(index + 1..index + 3) {
            Some([hi, lo]) if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {}
            _ => return Err(invalid()),
        }
    }

    percent_decode_str(value)
        .decode_utf8()
        .map(|decoded| decoded.into_owned())
        .map_err(|_| invalid())
}

/// Build the canonical path for a compiled route.
///
/// `route` is only used in error messages.
pub fn generate(compiled: &CompiledRoute, route: &str, params: &Params) -> RouteResult<String> {
    let present = |name: &str| -> Option<String> {
        params
            .get(name)
            .map(|value| encode_component(value))
            .filter(|encoded| !encoded.is_empty())
    };
    let missing = |name: &str| {
        RouteError::Type(format!("hash: params.{name} is undefined, route: {route}"))
    };

    let mut segments = Vec::new();
    for scalar in &compiled.rules.scalars {
        match present(&scalar.name) {
            Some(value) => segments.push(value),
            None if scalar.required => return Err(missing(&scalar.name)),
            None => {}
        }
    }
    for keyval in &compiled.rules.keyvals {
        match present(&keyval.name) {
            Some(value) => segments.push(format!("{}={}", keyval.name, value)),
            None if keyval.required => return Err(missing(&keyval.name)),
            None => {}
        }
    }

    let mut hash = compiled.page.clone();
    if !segments.is_empty() {
        if hash != "/" {
            hash.push('/');
        }
        hash.push_str(&segments.join("/"));
    }

    // Star values are already encoded.
    let star = compiled
        .rules
        .star
        .as_ref()
        .and_then(|name| params.get(name))
        .filter(|value| !value.is_empty());
    if let Some(star) = star {
        if !hash.ends_with('/') {
            hash.push('/');
        }
        hash.push_str(star);
    }

    Ok(hash)
}
