mod document;
mod hit;

use std::collections::HashMap;

use eframe::egui::Vec2;
use serde::{Deserialize, Serialize};

pub use document::{GraphDocument, parse_document};

pub const BASE_RADIUS: f32 = 25.0;
pub const PADDING_RADIUS: f32 = 15.0;

pub trait TextMeasure {
    fn measure(&self, text: &str) -> f32;
}

/// Monospaced stand-in for a real font, used where no renderer is available.
#[cfg(test)]
#[derive(Clone, Copy, Debug)]
pub struct FixedWidthMeasure {
    pub char_width: f32,
}

#[cfg(test)]
impl Default for FixedWidthMeasure {
    fn default() -> Self {
        Self { char_width: 8.5 }
    }
}

#[cfg(test)]
impl TextMeasure for FixedWidthMeasure {
    fn measure(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.char_width
    }
}

pub fn node_radius_for(name: &str, measure: &dyn TextMeasure) -> f32 {
    BASE_RADIUS.max((measure.measure(name) / 2.0) + PADDING_RADIUS)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    Directed,
    Bidirectional,
}

impl EdgeKind {
    pub fn toggled(self) -> Self {
        match self {
            Self::Directed => Self::Bidirectional,
            Self::Bidirectional => Self::Directed,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Directed => "directed",
            Self::Bidirectional => "bidirectional",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub position: Vec2,
    pub radius: f32,
    pub velocity: Vec2,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: NodeId,
    pub to: NodeId,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn touches(&self, node: NodeId) -> bool {
        self.from == node || self.to == node
    }

    pub fn joins(&self, a: NodeId, b: NodeId) -> bool {
        (self.from == a && self.to == b) || (self.from == b && self.to == a)
    }
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<NodeId, usize>,
    next_id: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.index_by_id
            .get(&id)
            .and_then(|&index| self.nodes.get(index))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.index_by_id
            .get(&id)
            .and_then(|&index| self.nodes.get_mut(index))
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub fn index_of(&self, id: NodeId) -> Option<usize> {
        self.index_by_id.get(&id).copied()
    }

    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    pub fn edge_between(&self, a: NodeId, b: NodeId) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.joins(a, b))
    }

    pub fn default_node_name(&self) -> String {
        format!("State{}", self.nodes.len() + 1)
    }

    fn allocate_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        position: Vec2,
        measure: &dyn TextMeasure,
    ) -> NodeId {
        let name = name.into();
        let radius = node_radius_for(&name, measure);
        self.insert_node(name, position, radius)
    }

    pub(crate) fn insert_node(&mut self, name: String, position: Vec2, radius: f32) -> NodeId {
        let id = NodeId(self.allocate_id());
        self.index_by_id.insert(id, self.nodes.len());
        self.nodes.push(Node {
            id,
            name,
            position,
            radius,
            velocity: Vec2::ZERO,
        });
        id
    }

    pub fn rename_node(&mut self, id: NodeId, new_name: &str, measure: &dyn TextMeasure) -> bool {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            return false;
        }

        let Some(node) = self.node_mut(id) else {
            return false;
        };
        node.name = trimmed.to_owned();
        node.radius = node_radius_for(trimmed, measure);
        true
    }

    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let index = self.index_by_id.remove(&id)?;
        let node = self.nodes.remove(index);
        self.edges.retain(|edge| !edge.touches(id));
        for (position, node) in self.nodes.iter().enumerate().skip(index) {
            self.index_by_id.insert(node.id, position);
        }
        Some(node)
    }

    /// Creates a directed edge `a -> b` unless that would be a self-loop or
    /// the pair is already connected in either direction.
    pub fn connect(&mut self, a: NodeId, b: NodeId) -> Option<EdgeId> {
        if a == b || self.node(a).is_none() || self.node(b).is_none() {
            return None;
        }
        if self.edge_between(a, b).is_some() {
            return None;
        }

        let id = EdgeId(self.allocate_id());
        self.edges.push(Edge {
            id,
            from: a,
            to: b,
            kind: EdgeKind::Directed,
        });
        Some(id)
    }

    pub fn toggle_edge_kind(&mut self, id: EdgeId) -> Option<EdgeKind> {
        let edge = self.edges.iter_mut().find(|edge| edge.id == id)?;
        edge.kind = edge.kind.toggled();
        Some(edge.kind)
    }

    pub(crate) fn set_edge_kind(&mut self, id: EdgeId, kind: EdgeKind) {
        if let Some(edge) = self.edges.iter_mut().find(|edge| edge.id == id) {
            edge.kind = kind;
        }
    }

    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        let index = self.edges.iter().position(|edge| edge.id == id)?;
        Some(self.edges.remove(index))
    }

    pub fn degree(&self, id: NodeId) -> usize {
        self.edges.iter().filter(|edge| edge.touches(id)).count()
    }

    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0usize; self.nodes.len()];
        for edge in &self.edges {
            if let Some(from) = self.index_of(edge.from) {
                degrees[from] += 1;
            }
            if let Some(to) = self.index_of(edge.to) {
                degrees[to] += 1;
            }
        }
        degrees
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
        self.index_by_id.clear();
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;
    use proptest::prelude::*;

    use super::*;

    fn graph_with(names: &[&str]) -> (Graph, Vec<NodeId>) {
        let measure = FixedWidthMeasure::default();
        let mut graph = Graph::new();
        let ids = names
            .iter()
            .enumerate()
            .map(|(index, name)| graph.add_node(*name, vec2(index as f32 * 100.0, 0.0), &measure))
            .collect();
        (graph, ids)
    }

    #[test]
    fn default_names_follow_current_count() {
        let (mut graph, ids) = graph_with(&["State1", "State2", "State3"]);
        assert_eq!(graph.default_node_name(), "State4");
        graph.remove_node(ids[0]);
        assert_eq!(graph.default_node_name(), "State3");
    }

    #[test]
    fn radius_grows_with_long_names() {
        let measure = FixedWidthMeasure { char_width: 10.0 };
        assert_eq!(node_radius_for("A", &measure), BASE_RADIUS);
        assert_eq!(node_radius_for("ABCDEFGHIJKLMNOPQRST", &measure), 115.0);
    }

    #[test]
    fn rename_to_blank_is_ignored() {
        let measure = FixedWidthMeasure { char_width: 10.0 };
        let (mut graph, ids) = graph_with(&["Start"]);
        assert!(!graph.rename_node(ids[0], "   ", &measure));
        assert_eq!(graph.node(ids[0]).map(|node| node.name.as_str()), Some("Start"));

        assert!(graph.rename_node(ids[0], "  A much longer state name ", &measure));
        let node = graph.node(ids[0]).expect("node exists");
        assert_eq!(node.name, "A much longer state name");
        assert_eq!(node.radius, 135.0);
    }

    #[test]
    fn reverse_connect_is_noop_and_toggle_flips_kind() {
        let (mut graph, ids) = graph_with(&["X", "Y"]);
        let edge = graph.connect(ids[0], ids[1]).expect("first connect creates edge");
        assert_eq!(graph.connect(ids[1], ids[0]), None);
        assert_eq!(graph.edge_count(), 1);

        let stored = graph.edge(edge).expect("edge exists");
        assert_eq!((stored.from, stored.to, stored.kind), (ids[0], ids[1], EdgeKind::Directed));

        assert_eq!(graph.toggle_edge_kind(edge), Some(EdgeKind::Bidirectional));
        assert_eq!(graph.toggle_edge_kind(edge), Some(EdgeKind::Directed));
    }

    #[test]
    fn deleting_node_removes_its_two_edges() {
        let (mut graph, ids) = graph_with(&["A", "B", "C", "D"]);
        graph.connect(ids[0], ids[1]);
        graph.connect(ids[2], ids[0]);
        graph.connect(ids[2], ids[3]);

        graph.remove_node(ids[0]);
        assert_eq!(graph.node_count(), 3);
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.node(ids[3]).map(|node| node.name.as_str()), Some("D"));
        assert_eq!(graph.index_of(ids[3]), Some(2));
    }

    #[test]
    fn removing_absent_entities_is_noop() {
        let (mut graph, ids) = graph_with(&["A", "B"]);
        let edge = graph.connect(ids[0], ids[1]).expect("edge created");
        assert!(graph.remove_edge(edge).is_some());
        assert!(graph.remove_edge(edge).is_none());
        assert!(graph.remove_node(ids[0]).is_some());
        assert!(graph.remove_node(ids[0]).is_none());
        assert_eq!(graph.connect(ids[0], ids[1]), None);
    }

    #[test]
    fn degrees_ignore_direction() {
        let (mut graph, ids) = graph_with(&["Hub", "A", "B", "Lonely"]);
        graph.connect(ids[0], ids[1]);
        graph.connect(ids[2], ids[0]);
        assert_eq!(graph.degrees(), vec![2, 1, 1, 0]);
        assert_eq!(graph.degree(ids[0]), 2);
    }

    proptest! {
        #[test]
        fn connect_never_creates_self_loops_or_duplicates(
            pairs in prop::collection::vec((0usize..6, 0usize..6), 0..60)
        ) {
            let (mut graph, ids) = graph_with(&["A", "B", "C", "D", "E", "F"]);
            for (a, b) in pairs {
                graph.connect(ids[a], ids[b]);
            }

            for edge in graph.edges() {
                prop_assert_ne!(edge.from, edge.to);
            }
            for (index, edge) in graph.edges().iter().enumerate() {
                let duplicates = graph.edges()[index + 1..]
                    .iter()
                    .filter(|other| other.joins(edge.from, edge.to))
                    .count();
                prop_assert_eq!(duplicates, 0);
            }
        }

        #[test]
        fn delete_cascades_to_incident_edges(
            pairs in prop::collection::vec((0usize..5, 0usize..5), 0..30),
            victim in 0usize..5,
        ) {
            let (mut graph, ids) = graph_with(&["A", "B", "C", "D", "E"]);
            for (a, b) in pairs {
                graph.connect(ids[a], ids[b]);
            }

            let incident = graph.degree(ids[victim]);
            let before = graph.edge_count();
            graph.remove_node(ids[victim]);

            prop_assert_eq!(graph.edge_count(), before - incident);
            prop_assert!(graph.edges().iter().all(|edge| !edge.touches(ids[victim])));
            for node in graph.nodes() {
                prop_assert_eq!(graph.node(node.id).map(|found| found.id), Some(node.id));
            }
        }
    }
}
