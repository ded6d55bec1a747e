//! Built-in node types.
//!
//! These are the three types every editor starts with: a trigger, a logger
//! and a text literal. Hosts add their own types through the
//! [`NodeCatalog`](crate::catalog::NodeCatalog).

use std::sync::Arc;

mod log;
mod start;
mod text;

pub use log::LogNode;
pub use start::StartNode;
pub use text::TextNode;

/// Host-supplied destination for the text produced by side-effecting nodes.
pub type Sink = Arc<dyn Fn(&str) + Send + Sync>;

/// Wraps a closure as a [`Sink`].
pub fn sink<F>(f: F) -> Sink
where
    F: Fn(&str) + Send + Sync + 'static,
{
    Arc::new(f)
}
