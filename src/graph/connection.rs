use super::NodeId;
use std::fmt;

/// Identity of a connection: which output feeds which input.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConnectionId {
    pub source: NodeId,
    pub source_output: String,
    pub target: NodeId,
    pub target_input: String,
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} -> {}.{}",
            self.source, self.source_output, self.target, self.target_input
        )
    }
}

/// A directed edge from an output port of one node to an input port of another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    id: ConnectionId,
    is_loop: bool,
}

impl Connection {
    pub fn new(
        source: NodeId,
        source_output: impl Into<String>,
        target: NodeId,
        target_input: impl Into<String>,
    ) -> Self {
        Self {
            id: ConnectionId {
                source,
                source_output: source_output.into(),
                target,
                target_input: target_input.into(),
            },
            is_loop: false,
        }
    }

    /// Marks the connection as an intentional back-edge. Loop connections are
    /// skipped by the dataflow engine instead of being reported as cycles.
    pub fn looped(mut self) -> Self {
        self.is_loop = true;
        self
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn source(&self) -> NodeId {
        self.id.source
    }

    pub fn source_output(&self) -> &str {
        &self.id.source_output
    }

    pub fn target(&self) -> NodeId {
        self.id.target
    }

    pub fn target_input(&self) -> &str {
        &self.id.target_input
    }

    pub fn is_loop(&self) -> bool {
        self.is_loop
    }
}

impl fmt::Display for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_loop {
            write!(f, "{} (loop)", self.id)
        } else {
            write!(f, "{}", self.id)
        }
    }
}
