//! Everything needed to build and run a node program in one import
//!
//! Brings in the [`Editor`] session and [`Scheduler`], both engines, the graph
//! model with the [`Node`] trait, the built-in node types and the error enums,
//! plus a boxed-error [`Result`] alias for quick binaries and examples.
//!
//! # Example
//!
//! ```rust,no_run
//! use nagare::prelude::*;
//!
//! # async fn run_example() -> Result<()> {
//! let mut editor = Editor::new(nodes::sink(|text| println!("{}", text)));
//! let start = editor.create_node("Start").await?;
//! let log = editor.create_node("Log").await?;
//! editor.connect(start, EXEC_PORT, log, EXEC_PORT).await?;
//!
//! editor.run(start).await?;
//! # Ok(())
//! # }
//! ```

// Session and scheduling
pub use crate::catalog::{NodeCatalog, NodeFactory};
pub use crate::editor::Editor;
pub use crate::scheduler::{
    Scheduler, SchedulerConfig, SchedulerHandle, SchedulerStats, TickReport,
};

// Engines
pub use crate::engine::{
    ControlFlowConfig, ControlFlowEngine, DataflowEngine, EXEC_PORT, ExecutionContext,
    PortClassifier, PortSelection,
};

// Graph model
pub use crate::graph::{
    Connection, ConnectionId, Control, ControlKind, Graph, GraphFormatter, Input, Inputs, Node,
    NodeBase, NodeFuture, NodeId, Output, Outputs, SharedGraph, Socket,
};
pub use crate::nodes::{self, LogNode, Sink, StartNode, TextNode};
pub use crate::value::Value;

// Error types
pub use crate::error::{CatalogError, EditorError, EngineError, GraphError, NodeError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
