//! Registry of node types that can be instantiated by name.

use crate::engine::DataflowEngine;
use crate::error::{CatalogError, NodeError};
use crate::graph::{Node, OrderedMap};
use crate::nodes::{LogNode, Sink, StartNode, TextNode};
use std::sync::Arc;
use tracing::debug;

/// Produces a fresh node, with a fresh id, on every call.
pub type NodeFactory = Arc<dyn Fn() -> Result<Arc<dyn Node>, NodeError> + Send + Sync>;

/// Maps human-readable type names to node factories.
///
/// Entries keep their registration order so a host can build its node
/// creation menu straight from [`names`](Self::names).
#[derive(Default, Clone)]
pub struct NodeCatalog {
    entries: OrderedMap<String, NodeFactory>,
}

impl NodeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// A catalog holding the built-in `Start`, `Log` and `Text` types.
    ///
    /// `Log` nodes created from it report to `sink` and resolve their
    /// message through `dataflow`.
    pub fn builtin(sink: Sink, dataflow: Arc<DataflowEngine>) -> Self {
        Self::new()
            .with_entry(StartNode::TYPE_NAME, || StartNode::new().map(shared))
            .with_entry(LogNode::TYPE_NAME, move || {
                LogNode::new(sink.clone(), dataflow.clone()).map(shared)
            })
            .with_entry(TextNode::TYPE_NAME, || TextNode::new("").map(shared))
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn() -> Result<Arc<dyn Node>, NodeError> + Send + Sync + 'static,
    {
        let name = name.into();
        debug!(type_name = %name, "Registering node type");
        self.entries.insert(name, Arc::new(factory));
    }

    pub fn with_entry<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Result<Arc<dyn Node>, NodeError> + Send + Sync + 'static,
    {
        self.register(name, factory);
        self
    }

    /// Makes `alias` create the same nodes as the existing entry `target`.
    pub fn with_alias(mut self, alias: &str, target: &str) -> Result<Self, CatalogError> {
        let factory = self
            .entries
            .get(target)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownType(target.to_string()))?;
        self.entries.insert(alias.to_string(), factory);
        Ok(self)
    }

    pub fn create(&self, name: &str) -> Result<Arc<dyn Node>, CatalogError> {
        let factory = self
            .entries
            .get(name)
            .ok_or_else(|| CatalogError::UnknownType(name.to_string()))?;
        factory().map_err(|source| CatalogError::Construction {
            type_name: name.to_string(),
            source,
        })
    }

    /// Type names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn shared<N: Node + 'static>(node: N) -> Arc<dyn Node> {
    Arc::new(node)
}
