use crate::graph::NodeBase;
use std::sync::Arc;

/// Name of the ports that carry the execution token.
pub const EXEC_PORT: &str = "exec";

/// The ports of one node that an engine treats as its own.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PortSelection {
    pub inputs: Vec<String>,
    pub outputs: Vec<String>,
}

impl PortSelection {
    pub fn has_input(&self, name: &str) -> bool {
        self.inputs.iter().any(|n| n == name)
    }

    pub fn has_output(&self, name: &str) -> bool {
        self.outputs.iter().any(|n| n == name)
    }
}

/// Decides, per node, which declared ports an engine follows.
///
/// Injected at engine construction so the dataflow and control-flow engines
/// can split the same ports between them.
pub type PortClassifier = Arc<dyn Fn(&NodeBase) -> PortSelection + Send + Sync>;

pub fn classifier<F>(f: F) -> PortClassifier
where
    F: Fn(&NodeBase) -> PortSelection + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Every declared port except the execution ports.
pub fn data_ports() -> PortClassifier {
    classifier(|base| PortSelection {
        inputs: base
            .inputs()
            .keys()
            .filter(|name| name.as_str() != EXEC_PORT)
            .cloned()
            .collect(),
        outputs: base
            .outputs()
            .keys()
            .filter(|name| name.as_str() != EXEC_PORT)
            .cloned()
            .collect(),
    })
}

/// Only the execution ports the node actually declares.
pub fn control_ports() -> PortClassifier {
    classifier(|base| PortSelection {
        inputs: base
            .inputs()
            .keys()
            .filter(|name| name.as_str() == EXEC_PORT)
            .cloned()
            .collect(),
        outputs: base
            .outputs()
            .keys()
            .filter(|name| name.as_str() == EXEC_PORT)
            .cloned()
            .collect(),
    })
}
