//! Component-level view of the couplings.

use indexmap::IndexMap;
use petgraph::dot::{Config, Dot};
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use petgraph::Graph;

/// Directed graph with one node per component and one edge per coupling
/// interface, pointing from sender to receiver.
#[derive(Debug, Clone, Default)]
pub struct CouplingTopology {
    graph: Graph<String, String>,
    nodes: IndexMap<String, NodeIndex>,
}

impl CouplingTopology {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_component(&mut self, name: &str) -> NodeIndex {
        if let Some(&node) = self.nodes.get(name) {
            return node;
        }
        let node = self.graph.add_node(name.to_string());
        self.nodes.insert(name.to_string(), node);
        node
    }

    /// Add an edge for the interface unless the same one is already present.
    pub fn add_coupling(&mut self, sender: &str, receiver: &str, interface_id: &str) {
        let from = self.add_component(sender);
        let to = self.add_component(receiver);
        if self
            .graph
            .edges_connecting(from, to)
            .any(|edge| edge.weight() == interface_id)
        {
            return;
        }
        self.graph.add_edge(from, to, interface_id.to_string());
    }

    pub fn component_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn coupling_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Distinct components receiving from `component`, in insertion order.
    pub fn receivers_of(&self, component: &str) -> Vec<&str> {
        self.partners(component, Direction::Outgoing)
    }

    /// Distinct components sending to `component`, in insertion order.
    pub fn senders_of(&self, component: &str) -> Vec<&str> {
        self.partners(component, Direction::Incoming)
    }

    fn partners(&self, component: &str, direction: Direction) -> Vec<&str> {
        let Some(&node) = self.nodes.get(component) else {
            return vec![];
        };
        // petgraph yields neighbours most-recent first
        let mut partners: Vec<&str> = Vec::new();
        let mut neighbours: Vec<NodeIndex> =
            self.graph.neighbors_directed(node, direction).collect();
        neighbours.reverse();
        for neighbour in neighbours {
            let name = self.graph[neighbour].as_str();
            if !partners.contains(&name) {
                partners.push(name);
            }
        }
        partners
    }

    pub fn graph(&self) -> &Graph<String, String> {
        &self.graph
    }

    /// Graphviz rendering, one labelled edge per coupling interface.
    pub fn as_dot(&self) -> String {
        format!(
            "{:?}",
            Dot::with_attr_getters(
                &self.graph,
                &[Config::NodeNoLabel, Config::EdgeNoLabel],
                &|_, er| format!("label = {:?}", er.weight()),
                &|_, (_, name)| format!("label = {:?}", name),
            )
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partners() {
        let mut topology = CouplingTopology::new();
        topology.add_coupling("A", "B", "u_to_v");
        topology.add_coupling("A", "C", "u_to_w");
        topology.add_coupling("A", "B", "x_to_y");
        topology.add_coupling("C", "A", "s_to_t");

        assert_eq!(topology.component_count(), 3);
        assert_eq!(topology.coupling_count(), 4);
        assert_eq!(topology.receivers_of("A"), vec!["B", "C"]);
        assert_eq!(topology.senders_of("A"), vec!["C"]);
        assert!(topology.receivers_of("missing").is_empty());
    }

    #[test]
    fn repeated_coupling_adds_one_edge() {
        let mut topology = CouplingTopology::new();
        topology.add_coupling("A", "B", "u_to_v");
        topology.add_coupling("A", "B", "u_to_v");

        assert_eq!(topology.coupling_count(), 1);
        assert_eq!(topology.as_dot().matches("->").count(), 1);
    }

    #[test]
    fn dot() {
        let mut topology = CouplingTopology::new();
        topology.add_coupling("A", "B", "u_to_v");

        let exp = r#"digraph {
    0 [ label = "A"]
    1 [ label = "B"]
    0 -> 1 [ label = "u_to_v"]
}
"#;
        assert_eq!(topology.as_dot(), exp);
    }
}
