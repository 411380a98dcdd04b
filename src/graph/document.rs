use std::collections::{BTreeMap, BTreeSet, HashMap};

use eframe::egui::vec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::util::stable_pair;

use super::{EdgeKind, Graph, TextMeasure, node_radius_for};

pub const LAYOUT_FORMAT_TAG: &str = "layout_v1";

const IMPORT_SCATTER: f32 = 150.0;

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("file is not valid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),
    #[error("expected an object mapping state names to arrays of state names: {0}")]
    NotAdjacencyMap(#[source] serde_json::Error),
    #[error("unrecognized layout format tag {0:?}")]
    UnknownFormat(Option<String>),
    #[error("layout document has no `nodes` array")]
    MissingNodes,
    #[error("malformed layout document: {0}")]
    InvalidLayout(#[source] serde_json::Error),
}

pub type AdjacencyDocument = BTreeMap<String, Vec<String>>;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutDocument {
    pub format: String,
    pub nodes: Vec<LayoutNode>,
    #[serde(default)]
    pub edges: Vec<LayoutEdge>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutEdge {
    pub from: String,
    pub to: String,
    #[serde(rename = "type")]
    pub kind: EdgeKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum GraphDocument {
    Adjacency(AdjacencyDocument),
    Layout(LayoutDocument),
}

impl GraphDocument {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Adjacency(_) => "adjacency list",
            Self::Layout(_) => "layout",
        }
    }
}

pub fn parse_document(raw: &[u8]) -> Result<GraphDocument, FormatError> {
    let value: Value = serde_json::from_slice(raw).map_err(FormatError::InvalidJson)?;

    let is_layout = value
        .as_object()
        .is_some_and(|object| {
            object.get("format").and_then(Value::as_str) == Some(LAYOUT_FORMAT_TAG)
                && object.get("nodes").is_some_and(Value::is_array)
        });

    if is_layout {
        layout_from_value(value).map(GraphDocument::Layout)
    } else {
        adjacency_from_value(value).map(GraphDocument::Adjacency)
    }
}

pub fn adjacency_from_value(value: Value) -> Result<AdjacencyDocument, FormatError> {
    AdjacencyDocument::deserialize(value).map_err(FormatError::NotAdjacencyMap)
}

pub fn layout_from_value(value: Value) -> Result<LayoutDocument, FormatError> {
    let object = value.as_object().ok_or(FormatError::UnknownFormat(None))?;
    let format = object.get("format").and_then(Value::as_str);
    if format != Some(LAYOUT_FORMAT_TAG) {
        return Err(FormatError::UnknownFormat(format.map(str::to_owned)));
    }
    if !object.get("nodes").is_some_and(Value::is_array) {
        return Err(FormatError::MissingNodes);
    }

    LayoutDocument::deserialize(value).map_err(FormatError::InvalidLayout)
}

impl Graph {
    pub fn to_adjacency_document(&self) -> AdjacencyDocument {
        let mut document = AdjacencyDocument::new();
        for node in &self.nodes {
            let mut neighbors = BTreeSet::new();
            for edge in &self.edges {
                let other = if edge.from == node.id {
                    Some(edge.to)
                } else if edge.to == node.id && edge.kind == EdgeKind::Bidirectional {
                    Some(edge.from)
                } else {
                    None
                };

                if let Some(other) = other.and_then(|id| self.node(id)) {
                    neighbors.insert(other.name.clone());
                }
            }

            // Colliding names merge into one entry.
            document
                .entry(node.name.clone())
                .or_default()
                .extend(neighbors);
        }

        for neighbors in document.values_mut() {
            neighbors.sort();
            neighbors.dedup();
        }
        document
    }

    pub fn to_layout_document(&self) -> LayoutDocument {
        LayoutDocument {
            format: LAYOUT_FORMAT_TAG.to_owned(),
            nodes: self
                .nodes
                .iter()
                .map(|node| LayoutNode {
                    name: node.name.clone(),
                    x: f64::from(node.position.x),
                    y: f64::from(node.position.y),
                    radius: Some(f64::from(node.radius)),
                })
                .collect(),
            edges: self
                .edges
                .iter()
                .filter_map(|edge| {
                    let from = self.node(edge.from)?;
                    let to = self.node(edge.to)?;
                    Some(LayoutEdge {
                        from: from.name.clone(),
                        to: to.name.clone(),
                        kind: edge.kind,
                    })
                })
                .collect(),
        }
    }

    pub fn from_adjacency_document(document: &AdjacencyDocument, measure: &dyn TextMeasure) -> Self {
        let mut names = BTreeSet::new();
        for (source, targets) in document {
            names.insert(source.as_str());
            names.extend(targets.iter().map(String::as_str));
        }

        let mut graph = Self::new();
        let mut id_by_name = HashMap::with_capacity(names.len());
        for name in names {
            let (jx, jy) = stable_pair(name);
            let position = vec2(jx, jy) * IMPORT_SCATTER;
            id_by_name.insert(name, graph.add_node(name, position, measure));
        }

        for (source, targets) in document {
            let Some(&source_id) = id_by_name.get(source.as_str()) else {
                continue;
            };
            for target in targets {
                let Some(&target_id) = id_by_name.get(target.as_str()) else {
                    continue;
                };

                let reciprocal = document
                    .get(target)
                    .is_some_and(|list| list.iter().any(|name| name == source));
                if let Some(edge) = graph.connect(source_id, target_id)
                    && reciprocal
                {
                    graph.set_edge_kind(edge, EdgeKind::Bidirectional);
                }
            }
        }

        graph
    }

    pub fn from_layout_document(document: &LayoutDocument, measure: &dyn TextMeasure) -> Self {
        let mut graph = Self::new();
        let mut id_by_name = HashMap::with_capacity(document.nodes.len());
        for entry in &document.nodes {
            let radius = entry
                .radius
                .map(|radius| radius as f32)
                .filter(|radius| radius.is_finite() && *radius > 0.0)
                .unwrap_or_else(|| node_radius_for(&entry.name, measure));
            let position = vec2(entry.x as f32, entry.y as f32);
            let id = graph.insert_node(entry.name.clone(), position, radius);
            id_by_name.insert(entry.name.as_str(), id);
        }

        for entry in &document.edges {
            let (Some(&from), Some(&to)) = (
                id_by_name.get(entry.from.as_str()),
                id_by_name.get(entry.to.as_str()),
            ) else {
                debug!(from = %entry.from, to = %entry.to, "dropping edge with unknown endpoint");
                continue;
            };

            if let Some(edge) = graph.connect(from, to) {
                graph.set_edge_kind(edge, entry.kind);
            }
        }

        graph
    }

    pub fn from_document(document: &GraphDocument, measure: &dyn TextMeasure) -> Self {
        match document {
            GraphDocument::Adjacency(adjacency) => Self::from_adjacency_document(adjacency, measure),
            GraphDocument::Layout(layout) => Self::from_layout_document(layout, measure),
        }
    }
}
