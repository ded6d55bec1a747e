use super::Graph;
use itertools::Itertools;

/// Formats a graph into a human-readable listing of nodes and connections.
pub struct GraphFormatter;

impl GraphFormatter {
    /// One line per node (with its ports and control values), followed by one
    /// line per connection in registration order.
    pub fn describe(graph: &Graph) -> String {
        let mut result = String::new();

        for node in graph.nodes() {
            let base = node.base();
            result.push_str(&format!("{} ({})", base.label(), base.id()));

            if !base.controls().is_empty() {
                let controls = base
                    .controls()
                    .iter()
                    .map(|(name, control)| format!("{} = {:?}", name, control.value().to_string()))
                    .join(", ");
                result.push_str(&format!(" [{}]", controls));
            }
            result.push('\n');

            if !base.inputs().is_empty() {
                let inputs = base
                    .inputs()
                    .iter()
                    .map(|(name, input)| {
                        let multiple = if input.multiple { "*" } else { "" };
                        format!("{}: {}{}", name, input.socket, multiple)
                    })
                    .join(", ");
                result.push_str(&format!("  in  {}\n", inputs));
            }
            if !base.outputs().is_empty() {
                let outputs = base
                    .outputs()
                    .iter()
                    .map(|(name, output)| format!("{}: {}", name, output.socket))
                    .join(", ");
                result.push_str(&format!("  out {}\n", outputs));
            }
        }

        if graph.connection_count() > 0 {
            result.push_str("connections:\n");
            for connection in graph.connections() {
                result.push_str(&format!("  {}\n", connection));
            }
        }
        result
    }
}
