//! Shared utilities for integration testing.

use std::sync::{Arc, Mutex};

use routemap::{Params, RouteMap};

/// Calls recorded by `recording_map` handlers, in firing order.
pub type CallLog = Arc<Mutex<Vec<(String, Params)>>>;

/// Build a params dictionary from pairs.
pub fn params(pairs: &[(&str, &str)]) -> Params {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// A route map with a recording handler registered for every name.
pub fn recording_map(methods: &[&str]) -> (RouteMap, CallLog) {
    let log: CallLog = Arc::new(Mutex::new(Vec::new()));
    let mut map = RouteMap::new();
    for method in methods {
        let log = log.clone();
        let name = method.to_string();
        map.register_handler(*method, move |args, _| {
            log.lock().unwrap().push((name.clone(), args.clone()));
        });
    }
    (map, log)
}

/// Methods of the recorded calls, in order.
#[allow(dead_code)]
pub fn fired(log: &CallLog) -> Vec<String> {
    log.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
}
