use super::classify::{PortClassifier, control_ports};
use crate::error::EngineError;
use crate::graph::{NodeFuture, NodeId, SharedGraph};
use tracing::{debug, instrument};

/// Default bound on nested forwards.
///
/// Every nested forward polls from inside the previous one, so the limit has
/// to trip well before a 2 MiB worker stack runs out in a debug build.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Limits applied to a control-flow pass.
#[derive(Debug, Clone)]
pub struct ControlFlowConfig {
    /// Maximum number of nested forwards before the pass is aborted.
    pub max_depth: usize,
}

impl Default for ControlFlowConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Push-based walker that carries the execution token through `exec` links.
///
/// A pass starts at one node and runs depth-first: every forward waits for the
/// downstream node, and everything it forwards to, before returning.
pub struct ControlFlowEngine {
    graph: SharedGraph,
    classify: PortClassifier,
    config: ControlFlowConfig,
}

impl ControlFlowEngine {
    /// Creates an engine that follows the `exec` ports.
    pub fn new(graph: SharedGraph) -> Self {
        Self::with_classifier(graph, control_ports())
    }

    pub fn with_classifier(graph: SharedGraph, classify: PortClassifier) -> Self {
        Self {
            graph,
            classify,
            config: ControlFlowConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ControlFlowConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs one pass starting at `start`. The first error raised anywhere in
    /// the pass aborts the rest of it and is returned.
    ///
    /// `start` must declare at least one control port; pure data nodes only
    /// run as upstream dependencies of the dataflow engine.
    #[instrument(skip_all, fields(start = %start))]
    pub async fn execute(&self, start: NodeId) -> Result<(), EngineError> {
        self.run_node(start, None, 0).await
    }

    fn run_node(&self, node_id: NodeId, input: Option<String>, depth: usize) -> NodeFuture<'_> {
        Box::pin(async move {
            if depth > self.config.max_depth {
                return Err(EngineError::DepthLimitExceeded {
                    node_id,
                    limit: self.config.max_depth,
                });
            }

            let node = {
                let graph = self.graph.read().await;
                graph
                    .node(node_id)
                    .cloned()
                    .ok_or(EngineError::MissingNode(node_id))?
            };
            let selection = (self.classify)(node.base());
            if selection.inputs.is_empty() && selection.outputs.is_empty() {
                return Err(EngineError::NotAControlNode(node_id));
            }

            debug!(node_id = %node_id, input = ?input, depth, "Executing node");
            let ctx = ExecutionContext {
                node_id,
                input,
                engine: self,
                depth,
            };
            node.execute(ctx).await
        })
    }

    async fn forward(&self, node_id: NodeId, output: &str, depth: usize) -> Result<(), EngineError> {
        let targets: Vec<(NodeId, String)> = {
            let graph = self.graph.read().await;
            let node = graph
                .node(node_id)
                .ok_or(EngineError::MissingNode(node_id))?;
            if !(self.classify)(node.base()).has_output(output) {
                return Err(EngineError::UnknownControlPort {
                    node_id,
                    port: output.to_string(),
                });
            }

            let mut targets = Vec::new();
            for connection in graph.outgoing_from(node_id, output) {
                let target = graph
                    .node(connection.target())
                    .ok_or(EngineError::MissingNode(connection.target()))?;
                if (self.classify)(target.base()).has_input(connection.target_input()) {
                    targets.push((connection.target(), connection.target_input().to_string()));
                } else {
                    debug!(connection = %connection, "Ignoring link into a non-control input");
                }
            }
            targets
        };

        for (target, input) in targets {
            self.run_node(target, Some(input), depth + 1).await?;
        }
        Ok(())
    }
}

/// What a node sees while the execution token is on it.
pub struct ExecutionContext<'a> {
    node_id: NodeId,
    input: Option<String>,
    engine: &'a ControlFlowEngine,
    depth: usize,
}

impl ExecutionContext<'_> {
    pub fn node_id(&self) -> NodeId {
        self.node_id
    }

    /// The control input the token arrived on; `None` for the start node.
    pub fn input(&self) -> Option<&str> {
        self.input.as_deref()
    }

    /// Activates `output`: runs every node connected to it, in connection
    /// order, and returns once all of them have finished.
    pub async fn forward(&self, output: &str) -> Result<(), EngineError> {
        self.engine.forward(self.node_id, output, self.depth).await
    }
}
