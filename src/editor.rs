//! The editing session: the one place that mutates a graph.

use crate::catalog::NodeCatalog;
use crate::engine::{
    ControlFlowEngine, DataflowEngine, EXEC_PORT, PortClassifier, control_ports, data_ports,
};
use crate::error::{EditorError, EngineError, GraphError};
use crate::graph::{Connection, ConnectionId, Graph, GraphFormatter, Node, NodeId, SharedGraph};
use crate::nodes::{LogNode, Sink, StartNode, TextNode};
use crate::scheduler::{Scheduler, SchedulerConfig};
use crate::value::Value;
use std::sync::Arc;
use tracing::{debug, info};

/// Owns a graph together with the engines that run it and the catalog that
/// feeds it.
///
/// Every mutation drops the memoized values it could have made stale, under
/// the same write lock as the mutation itself, so a caller can edit between
/// passes without resetting the dataflow cache.
pub struct Editor {
    graph: SharedGraph,
    dataflow: Arc<DataflowEngine>,
    control: Arc<ControlFlowEngine>,
    catalog: NodeCatalog,
}

impl Editor {
    /// An empty session using the default `exec` port split, with the
    /// built-in node types registered.
    pub fn new(sink: Sink) -> Self {
        Self::with_classifiers(sink, data_ports(), control_ports())
    }

    pub fn with_classifiers(sink: Sink, data: PortClassifier, control: PortClassifier) -> Self {
        let graph = Graph::new().into_shared();
        let dataflow = Arc::new(DataflowEngine::with_classifier(graph.clone(), data));
        let control = Arc::new(ControlFlowEngine::with_classifier(graph.clone(), control));
        let catalog = NodeCatalog::builtin(sink, dataflow.clone());
        Self {
            graph,
            dataflow,
            control,
            catalog,
        }
    }

    /// Builds the starter program: `Start` drives a `Log` whose message
    /// comes from a `Text` node holding `text`. Returns the session and the
    /// id of the `Start` node.
    pub async fn demo(sink: Sink, text: &str) -> Result<(Self, NodeId), EditorError> {
        let mut editor = Self::new(sink);
        let start = editor.create_node(StartNode::TYPE_NAME).await?;
        let text = editor.add_node(TextNode::new(text)?).await?;
        let log = editor.create_node(LogNode::TYPE_NAME).await?;

        editor.connect(start, EXEC_PORT, log, EXEC_PORT).await?;
        editor
            .connect(text, TextNode::VALUE, log, LogNode::MESSAGE)
            .await?;

        info!(start = %start, "Demo program ready");
        Ok((editor, start))
    }

    pub fn graph(&self) -> &SharedGraph {
        &self.graph
    }

    pub fn dataflow(&self) -> &Arc<DataflowEngine> {
        &self.dataflow
    }

    pub fn control(&self) -> &Arc<ControlFlowEngine> {
        &self.control
    }

    pub fn catalog(&self) -> &NodeCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut NodeCatalog {
        &mut self.catalog
    }

    /// Instantiates a catalog entry and adds it to the graph.
    pub async fn create_node(&mut self, type_name: &str) -> Result<NodeId, EditorError> {
        let node = self.catalog.create(type_name)?;
        self.add_shared_node(node).await
    }

    pub async fn add_node<N: Node + 'static>(&mut self, node: N) -> Result<NodeId, EditorError> {
        self.add_shared_node(Arc::new(node)).await
    }

    pub async fn add_shared_node(&mut self, node: Arc<dyn Node>) -> Result<NodeId, EditorError> {
        let id = self.graph.write().await.add_shared_node(node)?;
        Ok(id)
    }

    /// Wires `source.output` to `target.input`.
    pub async fn connect(
        &mut self,
        source: NodeId,
        output: &str,
        target: NodeId,
        input: &str,
    ) -> Result<ConnectionId, EditorError> {
        self.add_connection(Connection::new(source, output, target, input))
            .await
    }

    /// Adds a prepared connection, for instance one flagged with
    /// [`Connection::looped`].
    pub async fn add_connection(
        &mut self,
        connection: Connection,
    ) -> Result<ConnectionId, EditorError> {
        let mut graph = self.graph.write().await;
        let id = graph.add_connection(connection)?;
        self.dataflow.invalidate_in(&graph, id.target);
        Ok(id)
    }

    pub async fn disconnect(&mut self, id: &ConnectionId) -> Result<Connection, EditorError> {
        let mut graph = self.graph.write().await;
        let connection = graph.remove_connection(id)?;
        self.dataflow.invalidate_in(&graph, connection.target());
        Ok(connection)
    }

    /// Removes a node and every connection attached to it.
    pub async fn remove_node(&mut self, id: NodeId) -> Result<Arc<dyn Node>, EditorError> {
        let mut graph = self.graph.write().await;
        if !graph.contains_node(id) {
            return Err(GraphError::NodeNotFound(id).into());
        }
        // Downstream values must be dropped while the outgoing links still exist.
        self.dataflow.invalidate_in(&graph, id);
        let node = graph.remove_node(id)?;
        Ok(node)
    }

    pub async fn set_control(
        &mut self,
        node_id: NodeId,
        control: &str,
        value: impl Into<Value>,
    ) -> Result<(), EditorError> {
        let graph = self.graph.write().await;
        let node = graph
            .node(node_id)
            .ok_or(GraphError::NodeNotFound(node_id))?;
        node.base().set_control(control, value)?;
        self.dataflow.invalidate_in(&graph, node_id);
        debug!(node_id = %node_id, control, "Control updated");
        Ok(())
    }

    pub async fn describe(&self) -> String {
        GraphFormatter::describe(&*self.graph.read().await)
    }

    /// Runs a single pass from `start` on fresh dataflow values.
    pub async fn run(&self, start: NodeId) -> Result<(), EngineError> {
        self.dataflow.reset();
        self.control.execute(start).await
    }

    /// A scheduler over this session's engines, with every `Start` node
    /// currently in the graph registered as a start node.
    pub async fn scheduler(&self, config: SchedulerConfig) -> Scheduler {
        let graph = self.graph.read().await;
        graph
            .nodes()
            .filter(|node| node.label() == StartNode::TYPE_NAME)
            .fold(
                Scheduler::new(self.dataflow.clone(), self.control.clone(), config),
                |scheduler, node| scheduler.with_start_node(node.id()),
            )
    }
}
