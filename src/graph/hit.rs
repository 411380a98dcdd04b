use eframe::egui::Vec2;

use super::{EdgeId, Graph, NodeId};

pub const EDGE_HIT_TOLERANCE: f32 = 10.0;

pub fn point_segment_distance(point: Vec2, start: Vec2, end: Vec2) -> f32 {
    let segment = end - start;
    let length_sq = segment.length_sq();
    if length_sq <= f32::EPSILON {
        return (point - start).length();
    }

    let t = ((point - start).dot(segment) / length_sq).clamp(0.0, 1.0);
    (point - (start + segment * t)).length()
}

impl Graph {
    /// Topmost node whose circle strictly contains `point`.
    pub fn node_at(&self, point: Vec2) -> Option<NodeId> {
        self.nodes
            .iter()
            .rev()
            .find(|node| (node.position - point).length() < node.radius)
            .map(|node| node.id)
    }

    pub fn edge_at(&self, point: Vec2) -> Option<EdgeId> {
        self.edges
            .iter()
            .find(|edge| {
                let (Some(from), Some(to)) = (self.node(edge.from), self.node(edge.to)) else {
                    return false;
                };
                point_segment_distance(point, from.position, to.position) < EDGE_HIT_TOLERANCE
            })
            .map(|edge| edge.id)
    }
}
