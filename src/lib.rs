//! # Nagare - Node Graph Execution Core
//!
//! **Nagare** runs small programs expressed as nodes wired together by typed
//! connections. Two engines share one graph:
//!
//! - the **dataflow engine** pulls values: resolving a node first resolves
//!   everything feeding its data inputs, memoizing each node's `data()` for
//!   the duration of a pass;
//! - the **control-flow engine** pushes an execution token along `exec`
//!   links, awaiting each node's `execute()` (and everything it forwards to)
//!   before moving on, so side effects happen depth-first in connection order.
//!
//! A [`Scheduler`](scheduler::Scheduler) re-runs the program periodically, and
//! an [`Editor`](editor::Editor) session owns the graph and keeps the
//! dataflow cache consistent with edits.
//!
//! ## Core Workflow
//!
//! 1.  **Describe node types**: implement [`Node`](graph::Node) or use the
//!     built-in `Start`, `Log` and `Text` types from [`nodes`].
//! 2.  **Build a graph**: add nodes and connect their ports through an
//!     [`Editor`](editor::Editor). Connections between different sockets, or
//!     into an occupied single-connection input, are rejected.
//! 3.  **Run**: execute one pass from a start node, or hand the engines to a
//!     scheduler that ticks on a fixed period.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use nagare::prelude::*;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Every Log node reports to this sink.
//!     let sink = nodes::sink(|text| println!("log: {}", text));
//!
//!     // Start -> Log, with the Log message coming from a Text node.
//!     let (editor, start) = Editor::demo(sink, "hello").await?;
//!     println!("{}", editor.describe().await);
//!
//!     // One pass by hand...
//!     editor.run(start).await?;
//!
//!     // ...then let the scheduler take over.
//!     let config = SchedulerConfig::default().with_period(Duration::from_millis(500));
//!     let handle = editor.scheduler(config).await.start();
//!     tokio::time::sleep(Duration::from_secs(2)).await;
//!     let stats = handle.stop().await;
//!     println!("{} ticks, {} failures", stats.ticks, stats.failures);
//!
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod editor;
pub mod engine;
pub mod error;
pub mod graph;
pub mod nodes;
pub mod prelude;
pub mod scheduler;
pub mod value;
