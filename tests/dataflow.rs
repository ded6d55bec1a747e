//! Tests for the pull-based dataflow engine.
mod common;
use common::*;
use nagare::engine::{PortSelection, classifier};
use nagare::prelude::*;
use std::sync::Arc;
use std::sync::atomic::Ordering;
use tokio_test::{assert_err, assert_ok};

/// A -> B, A -> C, {B, C} -> D with per-node call counters.
struct Diamond {
    engine: DataflowEngine,
    ids: [NodeId; 4],
    calls: [Arc<std::sync::atomic::AtomicUsize>; 4],
}

fn diamond() -> Diamond {
    let calls = [counter(), counter(), counter(), counter()];
    let mut graph = Graph::new();
    let a = graph.add_node(CountingNode::new("A", 1.0, &calls[0])).unwrap();
    let b = graph.add_node(CountingNode::new("B", 10.0, &calls[1])).unwrap();
    let c = graph.add_node(CountingNode::new("C", 100.0, &calls[2])).unwrap();
    let d = graph.add_node(CountingNode::new("D", 1000.0, &calls[3])).unwrap();

    graph.add_connection(Connection::new(a, "out", b, "in")).unwrap();
    graph.add_connection(Connection::new(a, "out", c, "in")).unwrap();
    graph.add_connection(Connection::new(b, "out", d, "in")).unwrap();
    graph.add_connection(Connection::new(c, "out", d, "in")).unwrap();

    Diamond {
        engine: DataflowEngine::new(graph.into_shared()),
        ids: [a, b, c, d],
        calls,
    }
}

fn call_counts(diamond: &Diamond) -> Vec<usize> {
    diamond
        .calls
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .collect()
}

#[tokio::test]
async fn test_each_node_resolved_once_per_pass() {
    let diamond = diamond();
    let [_, _, _, d] = diamond.ids;

    diamond.engine.reset();
    let inputs = assert_ok!(diamond.engine.fetch_inputs(d).await);

    assert_eq!(
        inputs.get("in"),
        Some(&vec![Value::Number(11.0), Value::Number(101.0)])
    );
    assert_eq!(call_counts(&diamond), vec![1, 1, 1, 0]);
}

#[tokio::test]
async fn test_cache_survives_until_reset() {
    let diamond = diamond();
    let [a, _, _, d] = diamond.ids;

    let outputs = assert_ok!(diamond.engine.fetch(d).await);
    assert_eq!(outputs.get("out"), Some(&Value::Number(1112.0)));
    assert_ok!(diamond.engine.fetch(d).await);
    assert_eq!(call_counts(&diamond), vec![1, 1, 1, 1]);
    assert!(diamond.engine.is_cached(a));

    diamond.engine.reset();
    assert!(!diamond.engine.is_cached(a));
    assert_ok!(diamond.engine.fetch(d).await);
    assert_eq!(call_counts(&diamond), vec![2, 2, 2, 2]);
}

#[tokio::test]
async fn test_invalidate_drops_downstream_values_only() {
    let diamond = diamond();
    let [a, b, c, d] = diamond.ids;

    assert_ok!(diamond.engine.fetch(d).await);
    diamond.engine.invalidate(b).await;

    assert!(diamond.engine.is_cached(a));
    assert!(!diamond.engine.is_cached(b));
    assert!(diamond.engine.is_cached(c));
    assert!(!diamond.engine.is_cached(d));

    assert_ok!(diamond.engine.fetch(d).await);
    assert_eq!(call_counts(&diamond), vec![1, 2, 1, 2]);
}

#[tokio::test]
async fn test_unconnected_input_resolves_to_empty_list() {
    let calls = counter();
    let mut graph = Graph::new();
    let lonely = graph.add_node(CountingNode::new("Lonely", 5.0, &calls)).unwrap();
    let engine = DataflowEngine::new(graph.into_shared());

    let inputs = assert_ok!(engine.fetch_inputs(lonely).await);
    assert_eq!(inputs.get("in"), Some(&Vec::new()));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_exec_ports_are_not_resolved() {
    let (sink, _) = collecting_sink();
    let graph = Graph::new().into_shared();
    let engine = Arc::new(DataflowEngine::new(graph.clone()));
    let (start, log) = {
        let mut g = graph.write().await;
        let start = g.add_node(StartNode::new().unwrap()).unwrap();
        let log = g.add_node(LogNode::new(sink, engine.clone()).unwrap()).unwrap();
        g.add_connection(Connection::new(start, EXEC_PORT, log, EXEC_PORT))
            .unwrap();
        (start, log)
    };

    let inputs = assert_ok!(engine.fetch_inputs(log).await);
    assert!(!inputs.contains_key(EXEC_PORT));
    assert_eq!(inputs.get(LogNode::MESSAGE), Some(&Vec::new()));
    assert!(!engine.is_cached(start));
}

#[tokio::test]
async fn test_unflagged_cycle_is_reported() {
    let calls = counter();
    let mut graph = Graph::new();
    let x = graph.add_node(CountingNode::new("X", 1.0, &calls)).unwrap();
    let y = graph.add_node(CountingNode::new("Y", 2.0, &calls)).unwrap();
    graph.add_connection(Connection::new(x, "out", y, "in")).unwrap();
    graph.add_connection(Connection::new(y, "out", x, "in")).unwrap();
    let engine = DataflowEngine::new(graph.into_shared());

    let err = assert_err!(engine.fetch(x).await);
    match err {
        EngineError::CyclicDependency { node_id, path } => {
            assert_eq!(node_id, x);
            assert_eq!(path, format!("{} -> {} -> {}", x, y, x));
        }
        other => panic!("expected CyclicDependency, got {:?}", other),
    }

    assert!(matches!(
        engine.fetch_inputs(x).await,
        Err(EngineError::CyclicDependency { .. })
    ));
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_flagged_loop_connection_is_skipped() {
    let calls = counter();
    let mut graph = Graph::new();
    let x = graph.add_node(CountingNode::new("X", 1.0, &calls)).unwrap();
    let y = graph.add_node(CountingNode::new("Y", 2.0, &calls)).unwrap();
    graph.add_connection(Connection::new(x, "out", y, "in")).unwrap();
    graph
        .add_connection(Connection::new(y, "out", x, "in").looped())
        .unwrap();
    let engine = DataflowEngine::new(graph.into_shared());

    let x_inputs = assert_ok!(engine.fetch_inputs(x).await);
    assert_eq!(x_inputs.get("in"), Some(&Vec::new()));

    let y_out = assert_ok!(engine.fetch(y).await);
    assert_eq!(y_out.get("out"), Some(&Value::Number(3.0)));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_node_is_reported() {
    let engine = DataflowEngine::new(Graph::new().into_shared());
    let ghost = NodeId::new(u64::MAX);

    let err = assert_err!(engine.fetch_inputs(ghost).await);
    assert!(matches!(err, EngineError::MissingNode(id) if id == ghost));
}

#[tokio::test]
async fn test_data_failure_names_the_node() {
    let calls = counter();
    let mut graph = Graph::new();
    let failing = graph.add_node(FailingNode::new()).unwrap();
    let sum = graph.add_node(CountingNode::new("Sum", 0.0, &calls)).unwrap();
    graph.add_connection(Connection::new(failing, "out", sum, "in")).unwrap();
    let engine = DataflowEngine::new(graph.into_shared());

    let err = assert_err!(engine.fetch(sum).await);
    match err {
        EngineError::NodeFailed { node_id, source } => {
            assert_eq!(node_id, failing);
            assert_eq!(source, NodeError::Failed("no data".to_string()));
        }
        other => panic!("expected NodeFailed, got {:?}", other),
    }
    assert!(!engine.is_cached(sum));
}

#[tokio::test]
async fn test_custom_classifier_hides_ports() {
    let calls = counter();
    let mut graph = Graph::new();
    let a = graph.add_node(CountingNode::new("A", 1.0, &calls)).unwrap();
    let b = graph.add_node(CountingNode::new("B", 2.0, &calls)).unwrap();
    graph.add_connection(Connection::new(a, "out", b, "in")).unwrap();

    // Only outputs take part: inputs are never followed upstream.
    let outputs_only = classifier(|base| PortSelection {
        inputs: Vec::new(),
        outputs: base.outputs().keys().cloned().collect(),
    });
    let engine = DataflowEngine::with_classifier(graph.into_shared(), outputs_only);

    let out = assert_ok!(engine.fetch(b).await);
    assert_eq!(out.get("out"), Some(&Value::Number(2.0)));
    assert!(!engine.is_cached(a));
}
