use super::{OrderedMap, Socket};
use crate::engine::ExecutionContext;
use crate::error::{EngineError, NodeError};
use crate::value::Value;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_NODE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of a node, assigned when the node is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    /// Allocates a fresh id.
    pub fn next() -> Self {
        Self(NEXT_NODE_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Values gathered for each data input, one entry per incoming connection.
pub type Inputs = AHashMap<String, Vec<Value>>;

/// Values produced by a node's `data()` call, keyed by output name.
pub type Outputs = AHashMap<String, Value>;

/// A boxed future for a node's `execute()`.
pub type NodeFuture<'a> = Pin<Box<dyn Future<Output = Result<(), EngineError>> + Send + 'a>>;

/// An input port declaration.
#[derive(Debug, Clone)]
pub struct Input {
    pub socket: Socket,
    pub label: String,
    /// Whether more than one connection may end at this input.
    pub multiple: bool,
}

impl Input {
    pub fn new(socket: Socket, label: impl Into<String>) -> Self {
        Self {
            socket,
            label: label.into(),
            multiple: false,
        }
    }

    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }
}

/// An output port declaration.
#[derive(Debug, Clone)]
pub struct Output {
    pub socket: Socket,
    pub label: String,
}

impl Output {
    pub fn new(socket: Socket, label: impl Into<String>) -> Self {
        Self {
            socket,
            label: label.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKind {
    Text,
    Number,
}

impl ControlKind {
    pub fn name(&self) -> &'static str {
        match self {
            ControlKind::Text => "text",
            ControlKind::Number => "number",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (ControlKind::Text, Value::Text(_)) | (ControlKind::Number, Value::Number(_))
        )
    }
}

/// A user-editable literal attached to a node.
#[derive(Debug)]
pub struct Control {
    kind: ControlKind,
    value: RwLock<Value>,
}

impl Control {
    pub fn text(initial: impl Into<String>) -> Self {
        Self {
            kind: ControlKind::Text,
            value: RwLock::new(Value::Text(initial.into())),
        }
    }

    pub fn number(initial: f64) -> Self {
        Self {
            kind: ControlKind::Number,
            value: RwLock::new(Value::Number(initial)),
        }
    }

    pub fn kind(&self) -> ControlKind {
        self.kind
    }

    pub fn value(&self) -> Value {
        self.value.read().clone()
    }

    fn set(&self, name: &str, value: Value) -> Result<(), NodeError> {
        if !self.kind.accepts(&value) {
            return Err(NodeError::InvalidControlValue {
                control: name.to_string(),
                expected: self.kind.name(),
                found: value,
            });
        }
        *self.value.write() = value;
        Ok(())
    }
}

/// The shape every node shares: identity, label, declared ports and controls.
///
/// The shape is fixed once built; only control values change afterwards.
#[derive(Debug)]
pub struct NodeBase {
    id: NodeId,
    label: String,
    inputs: OrderedMap<String, Input>,
    outputs: OrderedMap<String, Output>,
    controls: OrderedMap<String, Control>,
    size: (f32, f32),
}

impl NodeBase {
    pub fn builder(label: impl Into<String>) -> NodeBaseBuilder {
        NodeBaseBuilder::new(label)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn inputs(&self) -> &OrderedMap<String, Input> {
        &self.inputs
    }

    pub fn outputs(&self) -> &OrderedMap<String, Output> {
        &self.outputs
    }

    pub fn controls(&self) -> &OrderedMap<String, Control> {
        &self.controls
    }

    pub fn input(&self, name: &str) -> Option<&Input> {
        self.inputs.get(name)
    }

    pub fn output(&self, name: &str) -> Option<&Output> {
        self.outputs.get(name)
    }

    pub fn control(&self, name: &str) -> Option<&Control> {
        self.controls.get(name)
    }

    /// Display metrics, only meaningful to a renderer.
    pub fn size(&self) -> (f32, f32) {
        self.size
    }

    pub fn set_control(&self, name: &str, value: impl Into<Value>) -> Result<(), NodeError> {
        let control = self
            .controls
            .get(name)
            .ok_or_else(|| NodeError::UnknownControl {
                node_id: self.id,
                control: name.to_string(),
            })?;
        control.set(name, value.into())
    }
}

/// Builds a [`NodeBase`], rejecting port or control names declared twice.
pub struct NodeBaseBuilder {
    label: String,
    inputs: OrderedMap<String, Input>,
    outputs: OrderedMap<String, Output>,
    controls: OrderedMap<String, Control>,
    size: (f32, f32),
    duplicate: Option<String>,
}

impl NodeBaseBuilder {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            inputs: OrderedMap::default(),
            outputs: OrderedMap::default(),
            controls: OrderedMap::default(),
            size: (180.0, 120.0),
            duplicate: None,
        }
    }

    pub fn input(mut self, name: impl Into<String>, input: Input) -> Self {
        let name = name.into();
        if self.inputs.contains_key(&name) {
            self.mark_duplicate(name);
        } else {
            self.inputs.insert(name, input);
        }
        self
    }

    pub fn output(mut self, name: impl Into<String>, output: Output) -> Self {
        let name = name.into();
        if self.outputs.contains_key(&name) {
            self.mark_duplicate(name);
        } else {
            self.outputs.insert(name, output);
        }
        self
    }

    pub fn control(mut self, name: impl Into<String>, control: Control) -> Self {
        let name = name.into();
        if self.controls.contains_key(&name) {
            self.mark_duplicate(name);
        } else {
            self.controls.insert(name, control);
        }
        self
    }

    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.size = (width, height);
        self
    }

    pub fn build(self) -> Result<NodeBase, NodeError> {
        if let Some(name) = self.duplicate {
            return Err(NodeError::DuplicatePort {
                label: self.label,
                name,
            });
        }
        Ok(NodeBase {
            id: NodeId::next(),
            label: self.label,
            inputs: self.inputs,
            outputs: self.outputs,
            controls: self.controls,
            size: self.size,
        })
    }

    fn mark_duplicate(&mut self, name: String) {
        if self.duplicate.is_none() {
            self.duplicate = Some(name);
        }
    }
}

/// The capability interface every node type implements.
///
/// `data()` is a pure computation over resolved inputs and the node's controls;
/// it is called by the dataflow engine at most once per pass. `execute()` is the
/// side-effecting step invoked by the control-flow engine when an execution
/// token reaches the node. It may suspend, and continues the walk by calling
/// [`ExecutionContext::forward`] for each output it wants to activate.
pub trait Node: Send + Sync {
    fn base(&self) -> &NodeBase;

    fn data(&self, _inputs: Inputs) -> Result<Outputs, NodeError> {
        Ok(Outputs::default())
    }

    fn execute<'a>(&'a self, _ctx: ExecutionContext<'a>) -> NodeFuture<'a> {
        Box::pin(async { Ok(()) })
    }

    fn id(&self) -> NodeId {
        self.base().id()
    }

    fn label(&self) -> &str {
        self.base().label()
    }
}
