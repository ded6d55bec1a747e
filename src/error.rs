use crate::graph::{ConnectionId, NodeId};
use crate::value::Value;
use std::fmt;
use thiserror::Error;

/// Why a connection was refused by the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionRejection {
    /// The output and input sockets have different identities.
    SocketMismatch { output: String, input: String },
    /// The target input accepts a single connection and already has one.
    InputOccupied,
    /// The source node declares no output with this name.
    UnknownOutput,
    /// The target node declares no input with this name.
    UnknownInput,
    /// An identical connection is already registered.
    Duplicate,
}

impl fmt::Display for ConnectionRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionRejection::SocketMismatch { output, input } => write!(
                f,
                "socket '{}' cannot be connected to socket '{}'",
                output, input
            ),
            ConnectionRejection::InputOccupied => {
                write!(f, "input accepts a single connection and is already connected")
            }
            ConnectionRejection::UnknownOutput => write!(f, "source output does not exist"),
            ConnectionRejection::UnknownInput => write!(f, "target input does not exist"),
            ConnectionRejection::Duplicate => write!(f, "connection already exists"),
        }
    }
}

/// Errors raised while mutating a graph. The graph is left unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Connection {connection} is invalid: {reason}")]
    InvalidConnection {
        connection: ConnectionId,
        reason: ConnectionRejection,
    },

    #[error("Node '{0}' not found in the graph")]
    NodeNotFound(NodeId),

    #[error("Node '{0}' has already been added to the graph")]
    DuplicateNode(NodeId),

    #[error("Connection {0} not found in the graph")]
    ConnectionNotFound(ConnectionId),
}

/// Errors raised by node code, either while building a node or while it runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NodeError {
    #[error("Port '{name}' is declared twice on node '{label}'")]
    DuplicatePort { label: String, name: String },

    #[error("Node '{node_id}' has no control named '{control}'")]
    UnknownControl { node_id: NodeId, control: String },

    #[error("Control '{control}' expects a {expected} value, but received '{found}'")]
    InvalidControlValue {
        control: String,
        expected: &'static str,
        found: Value,
    },

    #[error("{0}")]
    Failed(String),
}

/// Errors raised by the dataflow and control-flow engines. A failed pass is
/// aborted and the error is returned to whoever started it.
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    #[error("Node '{0}' is referenced during execution but does not exist in the graph")]
    MissingNode(NodeId),

    #[error("Cyclic dependency detected while resolving node '{node_id}' ({path})")]
    CyclicDependency { node_id: NodeId, path: String },

    #[error("Node '{0}' declares no control ports and cannot be executed")]
    NotAControlNode(NodeId),

    #[error("Node '{node_id}' has no control output named '{port}'")]
    UnknownControlPort { node_id: NodeId, port: String },

    #[error("Control flow reached node '{node_id}' deeper than the limit of {limit} nested forwards")]
    DepthLimitExceeded { node_id: NodeId, limit: usize },

    #[error("Node '{node_id}' failed: {source}")]
    NodeFailed {
        node_id: NodeId,
        #[source]
        source: NodeError,
    },
}

/// Errors that can occur when instantiating a node from the catalog.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("Node type '{0}' is not registered in the catalog")]
    UnknownType(String),

    #[error("Failed to construct node of type '{type_name}': {source}")]
    Construction {
        type_name: String,
        #[source]
        source: NodeError,
    },
}

/// Errors surfaced by an editor session.
#[derive(Error, Debug, Clone)]
pub enum EditorError {
    #[error(transparent)]
    Graph(#[from] GraphError),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Node(#[from] NodeError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}
