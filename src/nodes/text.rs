use crate::error::NodeError;
use crate::graph::{Control, Inputs, Node, NodeBase, Output, Outputs, Socket};
use crate::value::Value;

/// Holds an editable text literal and exposes it on its `value` output.
pub struct TextNode {
    base: NodeBase,
}

impl TextNode {
    pub const TYPE_NAME: &'static str = "Text";
    pub const VALUE: &'static str = "value";

    pub fn new(initial: impl Into<String>) -> Result<Self, NodeError> {
        let base = NodeBase::builder(Self::TYPE_NAME)
            .control(Self::VALUE, Control::text(initial))
            .output(Self::VALUE, Output::new(Socket::text(), "Text"))
            .build()?;
        Ok(Self { base })
    }

    pub fn text(&self) -> Value {
        self.base
            .control(Self::VALUE)
            .map(Control::value)
            .unwrap_or_default()
    }

    pub fn set_text(&self, text: impl Into<String>) -> Result<(), NodeError> {
        self.base.set_control(Self::VALUE, Value::Text(text.into()))
    }
}

impl Node for TextNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn data(&self, _inputs: Inputs) -> Result<Outputs, NodeError> {
        let mut outputs = Outputs::default();
        outputs.insert(Self::VALUE.to_string(), self.text());
        Ok(outputs)
    }
}
