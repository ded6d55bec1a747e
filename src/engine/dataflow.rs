use super::classify::{PortClassifier, data_ports};
use crate::error::EngineError;
use crate::graph::{Graph, Inputs, NodeId, Outputs, SharedGraph};
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use parking_lot::Mutex;
use std::iter;
use tracing::{debug, instrument, trace};

/// Pull-based resolver of node values.
///
/// Resolving a node first resolves every upstream node feeding its data
/// inputs, then calls its `data()`. Results are memoized per node until
/// [`reset`](Self::reset) is called, so within one pass every node's `data()`
/// runs at most once. The cache belongs to the engine instance: concurrent
/// passes that must not observe each other's values need separate engines.
pub struct DataflowEngine {
    graph: SharedGraph,
    classify: PortClassifier,
    cache: Mutex<AHashMap<NodeId, Outputs>>,
}

impl DataflowEngine {
    /// Creates an engine that follows every port except `exec`.
    pub fn new(graph: SharedGraph) -> Self {
        Self::with_classifier(graph, data_ports())
    }

    pub fn with_classifier(graph: SharedGraph, classify: PortClassifier) -> Self {
        Self {
            graph,
            classify,
            cache: Mutex::new(AHashMap::new()),
        }
    }

    /// Clears all memoized outputs. Call before each new pass.
    pub fn reset(&self) {
        self.cache.lock().clear();
    }

    /// Drops the memoized outputs of `node_id` and of every node that depends
    /// on it through data connections.
    pub async fn invalidate(&self, node_id: NodeId) {
        let graph = self.graph.read().await;
        self.invalidate_in(&graph, node_id);
    }

    /// Same as [`invalidate`](Self::invalidate), against a graph the caller
    /// has already locked. Lets an editor drop stale values in the same
    /// critical section as the mutation that made them stale.
    pub fn invalidate_in(&self, graph: &Graph, node_id: NodeId) {
        let mut cache = self.cache.lock();
        let mut pending = vec![node_id];
        let mut seen = AHashSet::new();

        while let Some(id) = pending.pop() {
            if !seen.insert(id) {
                continue;
            }
            cache.remove(&id);
            let Some(node) = graph.node(id) else {
                continue;
            };
            let selection = (self.classify)(node.base());
            pending.extend(
                graph
                    .outgoing(id)
                    .filter(|c| selection.has_output(c.source_output()))
                    .map(|c| c.target()),
            );
        }
    }

    /// Resolves the data inputs of `node_id`: one value per incoming
    /// connection on each data input, an empty list for unconnected inputs.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch_inputs(&self, node_id: NodeId) -> Result<Inputs, EngineError> {
        let graph = self.graph.read().await;
        Resolution::new(self, &graph).inputs_of(node_id)
    }

    /// Resolves the data outputs of `node_id` itself.
    #[instrument(skip(self), level = "debug")]
    pub async fn fetch(&self, node_id: NodeId) -> Result<Outputs, EngineError> {
        let graph = self.graph.read().await;
        Resolution::new(self, &graph).outputs_of(node_id)
    }

    pub fn is_cached(&self, node_id: NodeId) -> bool {
        self.cache.lock().contains_key(&node_id)
    }
}

/// State of one resolution call: the chain of nodes currently being resolved.
struct Resolution<'a> {
    engine: &'a DataflowEngine,
    graph: &'a Graph,
    stack: Vec<NodeId>,
}

impl<'a> Resolution<'a> {
    fn new(engine: &'a DataflowEngine, graph: &'a Graph) -> Self {
        Self {
            engine,
            graph,
            stack: Vec::new(),
        }
    }

    fn inputs_of(&mut self, node_id: NodeId) -> Result<Inputs, EngineError> {
        let graph = self.graph;
        let node = graph
            .node(node_id)
            .ok_or(EngineError::MissingNode(node_id))?;
        let selection = (self.engine.classify)(node.base());

        let mut inputs = Inputs::default();
        for name in selection.inputs {
            let mut values = Vec::new();
            for connection in graph.incoming_to(node_id, &name) {
                if connection.is_loop() {
                    trace!(connection = %connection, "Skipping loop connection");
                    continue;
                }
                let outputs = self.outputs_of(connection.source())?;
                values.push(
                    outputs
                        .get(connection.source_output())
                        .cloned()
                        .unwrap_or_default(),
                );
            }
            inputs.insert(name, values);
        }
        Ok(inputs)
    }

    fn outputs_of(&mut self, node_id: NodeId) -> Result<Outputs, EngineError> {
        let cached = self.engine.cache.lock().get(&node_id).cloned();
        if let Some(outputs) = cached {
            return Ok(outputs);
        }

        if self.stack.contains(&node_id) {
            let path = self
                .stack
                .iter()
                .skip_while(|id| **id != node_id)
                .chain(iter::once(&node_id))
                .join(" -> ");
            return Err(EngineError::CyclicDependency { node_id, path });
        }

        let graph = self.graph;
        let node = graph
            .node(node_id)
            .ok_or(EngineError::MissingNode(node_id))?;

        self.stack.push(node_id);
        let resolved = self.inputs_of(node_id).and_then(|inputs| {
            node.data(inputs)
                .map_err(|source| EngineError::NodeFailed { node_id, source })
        });
        self.stack.pop();

        let mut outputs = resolved?;
        let selection = (self.engine.classify)(node.base());
        outputs.retain(|name, _| selection.has_output(name));

        debug!(node_id = %node_id, outputs = outputs.len(), "Resolved node data");
        self.engine.cache.lock().insert(node_id, outputs.clone());
        Ok(outputs)
    }
}
