//! Parse, cache and evaluate in one place.

use crate::cache::{ExpressionCache, MemoryCache, NoopCache};
use crate::error::Error;
use crate::node::Node;
use crate::parser::{parse_with_options, ParserOptions};
use crate::registry::Registry;
use crate::value::{to_boolean, to_number, Record, Value};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    pub parser: ParserOptions,
    /// `None` disables caching. `Some(n)` keeps at most `n` parsed trees.
    pub cache_capacity: Option<usize>,
}

/// Evaluates expressions against records.
///
/// ```
/// use parsley::{Engine, Value};
/// use serde_json::json;
///
/// let engine = Engine::new();
/// let record = json!({"object_attributes": {"state": "opened"}});
/// let record = record.as_object().unwrap();
/// assert!(engine
///     .evaluate_as_bool("object_attributes.state == \"opened\"", record)
///     .unwrap());
/// assert_eq!(engine.evaluate("ceil(2.1)", record).unwrap(), Value::Number(3.0));
/// ```
pub struct Engine {
    registry: Registry,
    options: EngineOptions,
    cache: Box<dyn ExpressionCache>,
}

impl Engine {
    /// An engine with the built-in registry and no cache.
    pub fn new() -> Self {
        Self::with_options(EngineOptions::default())
    }

    pub fn with_options(options: EngineOptions) -> Self {
        let cache: Box<dyn ExpressionCache> = match options.cache_capacity {
            Some(capacity) => Box::new(MemoryCache::new(capacity)),
            None => Box::new(NoopCache),
        };
        Self {
            registry: Registry::new(),
            options,
            cache,
        }
    }

    /// Replaces the cache with a caller-supplied one.
    pub fn with_cache(mut self, cache: impl ExpressionCache + 'static) -> Self {
        self.cache = Box::new(cache);
        self
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Mutable access for registering operators and functions.
    ///
    /// Trees already in the cache keep the registrations they were parsed
    /// with.
    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Returns the tree for `expression`, from the cache when present.
    pub fn parse(&self, expression: &str) -> Result<Arc<Node>, Error> {
        if let Some(node) = self.cache.get(expression) {
            return Ok(node);
        }
        let node = Arc::new(parse_with_options(
            expression,
            &self.registry,
            self.options.parser,
        )?);
        self.cache.put(expression, Arc::clone(&node));
        Ok(node)
    }

    /// Evaluates `expression` and returns the raw result, which may borrow
    /// lists and records from `record`.
    pub fn evaluate<'r>(&self, expression: &str, record: &'r Record) -> Result<Value<'r>, Error> {
        let node = self.parse(expression)?;
        Ok(node.eval(record)?)
    }

    /// Evaluates and coerces the result to a boolean. Numbers above zero and
    /// the usual truthy words are `true`.
    pub fn evaluate_as_bool(&self, expression: &str, record: &Record) -> Result<bool, Error> {
        let value = self.evaluate(expression, record)?;
        Ok(to_boolean(&value)?)
    }

    /// Evaluates and renders the result as text. Never fails after a
    /// successful evaluation.
    pub fn evaluate_as_string(&self, expression: &str, record: &Record) -> Result<String, Error> {
        Ok(self.evaluate(expression, record)?.to_string())
    }

    pub fn evaluate_as_number(&self, expression: &str, record: &Record) -> Result<f64, Error> {
        let value = self.evaluate(expression, record)?;
        Ok(to_number(&value)?)
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("registry", &self.registry)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
