use crate::engine::{EXEC_PORT, ExecutionContext};
use crate::error::NodeError;
use crate::graph::{Node, NodeBase, NodeFuture, Output, Socket};

/// Trigger with a single `exec` output. A pass usually begins here.
pub struct StartNode {
    base: NodeBase,
}

impl StartNode {
    pub const TYPE_NAME: &'static str = "Start";

    pub fn new() -> Result<Self, NodeError> {
        let base = NodeBase::builder(Self::TYPE_NAME)
            .output(EXEC_PORT, Output::new(Socket::exec(), "Exec"))
            .size(180.0, 90.0)
            .build()?;
        Ok(Self { base })
    }
}

impl Node for StartNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn execute<'a>(&'a self, ctx: ExecutionContext<'a>) -> NodeFuture<'a> {
        Box::pin(async move { ctx.forward(EXEC_PORT).await })
    }
}
