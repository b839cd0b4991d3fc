//! Handler registry: the context rule methods are resolved against.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::routing::types::Params;

/// A route handler. Receives the parsed arguments and the extra value passed
/// to `RouteMap::handler`.
pub type Handler<E> = Arc<dyn Fn(&Params, &E) + Send + Sync>;

/// Named handlers. Rule methods such as `views.portfolios.load` are plain
/// keys into this map.
pub struct HandlerRegistry<E = ()> {
    handlers: HashMap<String, Handler<E>>,
}

impl<E> HandlerRegistry<E> {
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Register (or replace) a handler.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&Params, &E) + Send + Sync + 'static,
    {
        let name = name.into();
        if self.handlers.insert(name.clone(), Arc::new(handler)).is_some() {
            tracing::debug!(method = %name, "Replaced handler");
        }
    }

    pub fn unregister(&mut self, name: &str) -> bool {
        self.handlers.remove(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<Handler<E>> {
        self.handlers.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<E> Default for HandlerRegistry<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for HandlerRegistry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.handlers.keys().collect();
        names.sort();
        f.debug_struct("HandlerRegistry").field("handlers", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_register_and_call() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let mut registry: HandlerRegistry<usize> = HandlerRegistry::new();
        registry.register("views.load", move |_args, extra| {
            counter.fetch_add(*extra, Ordering::SeqCst);
        });

        assert!(registry.contains("views.load"));
        let handler = registry.get("views.load").unwrap();
        handler(&Params::new(), &3);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        assert!(registry.unregister("views.load"));
        assert!(registry.get("views.load").is_none());
        assert!(registry.is_empty());
    }
}
