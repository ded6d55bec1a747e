//! Common test node types and helpers.
use nagare::prelude::*;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Ordered record of node activity shared between a test and its nodes.
pub type Trace = Arc<Mutex<Vec<String>>>;

#[allow(dead_code)]
pub fn trace() -> Trace {
    Arc::new(Mutex::new(Vec::new()))
}

#[allow(dead_code)]
pub fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

/// A sink that keeps every message it receives.
#[allow(dead_code)]
pub fn collecting_sink() -> (Sink, Trace) {
    let messages = trace();
    let collected = messages.clone();
    (nodes::sink(move |text| collected.lock().push(text.to_string())), messages)
}

#[allow(dead_code)]
pub fn number_socket() -> Socket {
    Socket::new("number")
}

/// Data node producing `value` plus the sum of the numbers on its `in`
/// input, counting its `data()` calls.
#[allow(dead_code)]
pub struct CountingNode {
    base: NodeBase,
    value: f64,
    calls: Arc<AtomicUsize>,
}

#[allow(dead_code)]
impl CountingNode {
    pub fn new(label: &str, value: f64, calls: &Arc<AtomicUsize>) -> Self {
        let base = NodeBase::builder(label)
            .input("in", Input::new(number_socket(), "In").multiple())
            .output("out", Output::new(number_socket(), "Out"))
            .build()
            .expect("valid ports");
        Self {
            base,
            value,
            calls: calls.clone(),
        }
    }
}

impl Node for CountingNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn data(&self, inputs: Inputs) -> std::result::Result<Outputs, NodeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let upstream: f64 = inputs
            .get("in")
            .into_iter()
            .flatten()
            .filter_map(Value::as_number)
            .sum();
        let mut outputs = Outputs::default();
        outputs.insert("out".to_string(), Value::Number(self.value + upstream));
        Ok(outputs)
    }
}

/// Control node that records its name in a trace, then forwards.
#[allow(dead_code)]
pub struct RelayNode {
    base: NodeBase,
    name: String,
    trace: Trace,
    forward_to: String,
    arrivals: Mutex<Vec<Option<String>>>,
}

#[allow(dead_code)]
impl RelayNode {
    pub fn new(name: &str, trace: &Trace) -> Self {
        let base = NodeBase::builder(name)
            .input(EXEC_PORT, Input::new(Socket::exec(), "Exec").multiple())
            .output(EXEC_PORT, Output::new(Socket::exec(), "Exec"))
            .build()
            .expect("valid ports");
        Self {
            base,
            name: name.to_string(),
            trace: trace.clone(),
            forward_to: EXEC_PORT.to_string(),
            arrivals: Mutex::new(Vec::new()),
        }
    }

    /// Forwards on `port` instead of `exec`.
    pub fn forwarding(mut self, port: &str) -> Self {
        self.forward_to = port.to_string();
        self
    }

    pub fn arrivals(&self) -> Vec<Option<String>> {
        self.arrivals.lock().clone()
    }
}

impl Node for RelayNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn execute<'a>(&'a self, ctx: ExecutionContext<'a>) -> NodeFuture<'a> {
        Box::pin(async move {
            self.trace.lock().push(self.name.clone());
            self.arrivals.lock().push(ctx.input().map(str::to_string));
            ctx.forward(&self.forward_to).await
        })
    }
}

/// Fails in both `data()` and `execute()`.
#[allow(dead_code)]
pub struct FailingNode {
    base: NodeBase,
}

#[allow(dead_code)]
impl FailingNode {
    pub fn new() -> Self {
        let base = NodeBase::builder("Failing")
            .input(EXEC_PORT, Input::new(Socket::exec(), "Exec").multiple())
            .input("in", Input::new(number_socket(), "In"))
            .output("out", Output::new(number_socket(), "Out"))
            .build()
            .expect("valid ports");
        Self { base }
    }
}

impl Node for FailingNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn data(&self, _inputs: Inputs) -> std::result::Result<Outputs, NodeError> {
        Err(NodeError::Failed("no data".to_string()))
    }

    fn execute<'a>(&'a self, ctx: ExecutionContext<'a>) -> NodeFuture<'a> {
        Box::pin(async move {
            Err(EngineError::NodeFailed {
                node_id: ctx.node_id(),
                source: NodeError::Failed("boom".to_string()),
            })
        })
    }
}

/// Counters kept by a [`SlowNode`].
#[allow(dead_code)]
#[derive(Default)]
pub struct PassTracker {
    pub active: AtomicUsize,
    pub max_active: AtomicUsize,
    pub completed: AtomicUsize,
}

/// Control node whose `execute()` suspends for a fixed delay.
#[allow(dead_code)]
pub struct SlowNode {
    base: NodeBase,
    delay: Duration,
    tracker: Arc<PassTracker>,
}

#[allow(dead_code)]
impl SlowNode {
    pub fn new(delay: Duration, tracker: &Arc<PassTracker>) -> Self {
        let base = NodeBase::builder("Slow")
            .input(EXEC_PORT, Input::new(Socket::exec(), "Exec").multiple())
            .build()
            .expect("valid ports");
        Self {
            base,
            delay,
            tracker: tracker.clone(),
        }
    }
}

impl Node for SlowNode {
    fn base(&self) -> &NodeBase {
        &self.base
    }

    fn execute<'a>(&'a self, _ctx: ExecutionContext<'a>) -> NodeFuture<'a> {
        Box::pin(async move {
            let active = self.tracker.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.tracker.max_active.fetch_max(active, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.tracker.active.fetch_sub(1, Ordering::SeqCst);
            self.tracker.completed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
    }
}
