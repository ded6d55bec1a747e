//! The node graph: nodes, typed ports and the connections between them.

use crate::error::{ConnectionRejection, GraphError};
use ahash::AHashMap;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

mod connection;
pub mod formatter;
mod node;
mod socket;

pub use connection::{Connection, ConnectionId};
pub use formatter::GraphFormatter;
pub use node::{
    Control, ControlKind, Input, Inputs, Node, NodeBase, NodeBaseBuilder, NodeFuture, NodeId,
    Output, Outputs,
};
pub use socket::Socket;

/// Insertion-ordered map used wherever declaration or registration order matters.
pub type OrderedMap<K, V> = IndexMap<K, V, ahash::RandomState>;

/// A graph shared between the editor session and the engines.
///
/// Only the session mutates it; engines take short read locks and never hold
/// them across a suspension point.
pub type SharedGraph = Arc<RwLock<Graph>>;

/// Owns every node and connection of a program.
///
/// Every connection's endpoints are present in the graph: connections are
/// validated when added and removed together with either endpoint.
#[derive(Default)]
pub struct Graph {
    nodes: OrderedMap<NodeId, Arc<dyn Node>>,
    connections: OrderedMap<ConnectionId, Connection>,
    incoming: AHashMap<NodeId, Vec<ConnectionId>>,
    outgoing: AHashMap<NodeId, Vec<ConnectionId>>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps the graph for sharing with engines.
    pub fn into_shared(self) -> SharedGraph {
        Arc::new(RwLock::new(self))
    }

    pub fn add_node<N: Node + 'static>(&mut self, node: N) -> Result<NodeId, GraphError> {
        self.add_shared_node(Arc::new(node))
    }

    pub fn add_shared_node(&mut self, node: Arc<dyn Node>) -> Result<NodeId, GraphError> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateNode(id));
        }
        debug!(node_id = %id, label = node.label(), "Adding node");
        self.nodes.insert(id, node);
        Ok(id)
    }

    /// Removes a node together with every connection attached to it.
    pub fn remove_node(&mut self, id: NodeId) -> Result<Arc<dyn Node>, GraphError> {
        let node = self
            .nodes
            .shift_remove(&id)
            .ok_or(GraphError::NodeNotFound(id))?;

        let attached: Vec<ConnectionId> = self
            .incoming
            .remove(&id)
            .into_iter()
            .chain(self.outgoing.remove(&id))
            .flatten()
            .collect();
        // A self-connection is listed on both sides; it is detached once.
        let removed = attached
            .iter()
            .filter(|connection_id| self.detach(connection_id).is_some())
            .count();

        debug!(node_id = %id, removed_connections = removed, "Removed node");
        Ok(node)
    }

    pub fn node(&self, id: NodeId) -> Option<&Arc<dyn Node>> {
        self.nodes.get(&id)
    }

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Nodes in the order they were added.
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<dyn Node>> {
        self.nodes.values()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Validates and registers a connection.
    ///
    /// Fails without touching the graph if an endpoint is missing, a port is
    /// undeclared, the sockets differ, or a single-connection input is taken.
    pub fn add_connection(&mut self, connection: Connection) -> Result<ConnectionId, GraphError> {
        let id = connection.id().clone();
        let reject = |reason| GraphError::InvalidConnection {
            connection: id.clone(),
            reason,
        };

        let source = self
            .nodes
            .get(&id.source)
            .ok_or(GraphError::NodeNotFound(id.source))?;
        let target = self
            .nodes
            .get(&id.target)
            .ok_or(GraphError::NodeNotFound(id.target))?;

        let output = source
            .base()
            .output(&id.source_output)
            .ok_or_else(|| reject(ConnectionRejection::UnknownOutput))?;
        let input = target
            .base()
            .input(&id.target_input)
            .ok_or_else(|| reject(ConnectionRejection::UnknownInput))?;

        if !output.socket.is_compatible_with(&input.socket) {
            return Err(reject(ConnectionRejection::SocketMismatch {
                output: output.socket.name().to_string(),
                input: input.socket.name().to_string(),
            }));
        }
        if self.connections.contains_key(&id) {
            return Err(reject(ConnectionRejection::Duplicate));
        }
        if !input.multiple
            && self
                .incoming_to(id.target, &id.target_input)
                .next()
                .is_some()
        {
            return Err(reject(ConnectionRejection::InputOccupied));
        }

        debug!(connection = %connection, "Adding connection");
        self.outgoing
            .entry(id.source)
            .or_default()
            .push(id.clone());
        self.incoming
            .entry(id.target)
            .or_default()
            .push(id.clone());
        self.connections.insert(id.clone(), connection);
        Ok(id)
    }

    pub fn remove_connection(&mut self, id: &ConnectionId) -> Result<Connection, GraphError> {
        self.detach(id)
            .ok_or_else(|| GraphError::ConnectionNotFound(id.clone()))
    }

    pub fn connection(&self, id: &ConnectionId) -> Option<&Connection> {
        self.connections.get(id)
    }

    /// Connections in registration order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    /// Connections ending at `node`, in registration order.
    pub fn incoming(&self, node: NodeId) -> impl Iterator<Item = &Connection> {
        self.adjacent(&self.incoming, node)
    }

    /// Connections starting at `node`, in registration order.
    pub fn outgoing(&self, node: NodeId) -> impl Iterator<Item = &Connection> {
        self.adjacent(&self.outgoing, node)
    }

    pub fn incoming_to<'a>(
        &'a self,
        node: NodeId,
        input: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.incoming(node).filter(move |c| c.target_input() == input)
    }

    pub fn outgoing_from<'a>(
        &'a self,
        node: NodeId,
        output: &'a str,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        self.outgoing(node).filter(move |c| c.source_output() == output)
    }

    fn adjacent<'a>(
        &'a self,
        index: &'a AHashMap<NodeId, Vec<ConnectionId>>,
        node: NodeId,
    ) -> impl Iterator<Item = &'a Connection> + 'a {
        index
            .get(&node)
            .into_iter()
            .flatten()
            .filter_map(|id| self.connections.get(id))
    }

    fn detach(&mut self, id: &ConnectionId) -> Option<Connection> {
        let connection = self.connections.shift_remove(id)?;
        if let Some(ids) = self.outgoing.get_mut(&id.source) {
            ids.retain(|c| c != id);
        }
        if let Some(ids) = self.incoming.get_mut(&id.target) {
            ids.retain(|c| c != id);
        }
        Some(connection)
    }
}
