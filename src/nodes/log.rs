use super::Sink;
use crate::engine::{DataflowEngine, EXEC_PORT, ExecutionContext};
use crate::error::NodeError;
use crate::graph::{Input, Node, NodeBase, NodeFuture, Output, Socket};
use std::sync::Arc;
use tracing::debug;

/// Reports the value on its `message` input to the sink, then passes the
/// execution token on.
///
/// An unconnected `message` input is reported as an empty string.
pub struct LogNode {
    base: NodeBase,
    sink: Sink,
    dataflow: Arc<DataflowEngine>,
}

impl LogNode {
    pub const TYPE_NAME: &'static str = "Log";
    pub const MESSAGE: &'static str = "message";

    pub fn new(sink: Sink, dataflow: Arc<DataflowEngine>) -> Result<Self, NodeError> {
        let base = NodeBase::builder(Self::TYPE_NAME)
            .input(EXEC_PORT, Input::new(Socket::exec(), "Exec").multiple())
            .input(Self::MESSAGE, Input::new(Socket::text(), "Text"))
            .output(EXEC_PORT, Output::new(Socket::exec(), "Exec"))
            .size(180.0, 150.0)
            .build()?;
        Ok(Self {
            base,
            sink,
            dataflow,
        })
    }
}

impl Node for LogNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn execute<'a>(&'a self, ctx: ExecutionContext<'a>) -> NodeFuture<'a> {
        Box::pin(async move {
            let inputs = self.dataflow.fetch_inputs(ctx.node_id()).await?;
            let message = inputs
                .get(Self::MESSAGE)
                .and_then(|values| values.first())
                .map(|value| value.to_message())
                .unwrap_or_default();

            debug!(node_id = %ctx.node_id(), message = %message, "Logging message");
            (self.sink)(&message);
            ctx.forward(EXEC_PORT).await
        })
    }
}
