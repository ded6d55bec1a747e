//! The two execution engines and the port classification they share.

pub mod classify;
mod control;
mod dataflow;

pub use classify::{EXEC_PORT, PortClassifier, PortSelection, classifier, control_ports, data_ports};
pub use control::{ControlFlowConfig, ControlFlowEngine, DEFAULT_MAX_DEPTH, ExecutionContext};
pub use dataflow::DataflowEngine;
