//! Parsed-expression caches.

use crate::node::Node;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, RwLock};

/// Storage for parsed trees keyed by their source text.
///
/// Implementations are shared between threads, so both methods take `&self`.
pub trait ExpressionCache: Send + Sync {
    fn get(&self, expression: &str) -> Option<Arc<Node>>;

    fn put(&self, expression: &str, node: Arc<Node>);
}

/// A cache that stores nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCache;

impl ExpressionCache for NoopCache {
    fn get(&self, _expression: &str) -> Option<Arc<Node>> {
        None
    }

    fn put(&self, _expression: &str, _node: Arc<Node>) {}
}

#[derive(Debug, Default)]
struct Entries {
    nodes: HashMap<String, Arc<Node>>,
    order: VecDeque<String>,
}

/// In-memory cache holding at most `capacity` trees. The oldest insertion is
/// evicted first.
#[derive(Debug)]
pub struct MemoryCache {
    capacity: usize,
    entries: RwLock<Entries>,
}

impl MemoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: RwLock::new(Entries::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.nodes.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.nodes.clear();
            entries.order.clear();
        }
    }
}

impl ExpressionCache for MemoryCache {
    fn get(&self, expression: &str) -> Option<Arc<Node>> {
        // A poisoned lock behaves as a miss.
        let node = self.entries.read().ok()?.nodes.get(expression).cloned();
        match node {
            Some(_) => log::debug!("cache hit for {:?}", expression),
            None => log::debug!("cache miss for {:?}", expression),
        }
        node
    }

    fn put(&self, expression: &str, node: Arc<Node>) {
        if self.capacity == 0 {
            return;
        }
        let Ok(mut entries) = self.entries.write() else {
            return;
        };
        if entries.nodes.insert(expression.to_string(), node).is_some() {
            return;
        }
        entries.order.push_back(expression.to_string());
        while entries.order.len() > self.capacity {
            if let Some(oldest) = entries.order.pop_front() {
                log::debug!("evicting {:?} from cache", oldest);
                entries.nodes.remove(&oldest);
            }
        }
    }
}
