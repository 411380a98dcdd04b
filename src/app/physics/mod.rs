mod forces;

use eframe::egui::Vec2;
use tracing::debug;

use crate::graph::{Graph, NodeId};

use forces::{centering_force, repulsion_between, spring_between};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    pub decay_rate: f32,
    pub settle_threshold: f32,
    pub repulsion: f32,
    pub spring_length: f32,
    pub spring_strength: f32,
    pub damping: f32,
    pub max_speed: f32,
    pub isolated_radius: f32,
    pub isolated_push: f32,
    pub isolated_pull: f32,
    pub leaf_gravity: f32,
    pub hub_gravity: f32,
    pub hub_gravity_per_degree: f32,
    pub drag_reheat: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            decay_rate: 0.98,
            settle_threshold: 0.01,
            repulsion: 200_000.0,
            spring_length: 150.0,
            spring_strength: 0.05,
            damping: 0.6,
            max_speed: 50.0,
            isolated_radius: 350.0,
            isolated_push: 2.5,
            isolated_pull: 0.0005,
            leaf_gravity: 0.001,
            hub_gravity: 0.002,
            hub_gravity_per_degree: 0.001,
            drag_reheat: 0.3,
        }
    }
}

impl LayoutConfig {
    pub const MIN_DECAY_RATE: f32 = 0.97;
    pub const MAX_DECAY_RATE: f32 = 0.99;

    pub fn with_decay_rate(mut self, decay_rate: f32) -> Self {
        self.decay_rate = decay_rate.clamp(Self::MIN_DECAY_RATE, Self::MAX_DECAY_RATE);
        self
    }
}

#[derive(Clone, Debug)]
pub struct Simulation {
    pub config: LayoutConfig,
    alpha: f32,
    forces: Vec<Vec2>,
}

impl Simulation {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            alpha: 0.0,
            forces: Vec::new(),
        }
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.config.settle_threshold
    }

    pub fn start(&mut self) {
        self.alpha = 1.0;
    }

    pub fn stop(&mut self) {
        self.alpha = 0.0;
    }

    pub fn reheat(&mut self, floor: f32) {
        self.alpha = self.alpha.max(floor.clamp(0.0, 1.0));
    }

    pub fn tick(&mut self, graph: &mut Graph, dragged: Option<NodeId>) -> bool {
        if self.is_settled() {
            return false;
        }

        self.alpha *= self.config.decay_rate;
        let alpha = self.alpha;
        let config = self.config;

        let node_count = graph.node_count();
        let degrees = graph.degrees();
        self.forces.clear();
        self.forces.resize(node_count, Vec2::ZERO);
        let forces = &mut self.forces;
        let nodes = graph.nodes();

        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let push = repulsion_between(
                    nodes[i].position,
                    nodes[j].position,
                    i,
                    j,
                    config.repulsion,
                ) * alpha;
                forces[i] += push;
                forces[j] -= push;
            }
        }

        for edge in graph.edges() {
            let (Some(from), Some(to)) = (graph.index_of(edge.from), graph.index_of(edge.to))
            else {
                continue;
            };
            if from == to {
                continue;
            }

            let pull = spring_between(
                nodes[from].position,
                nodes[to].position,
                config.spring_length,
                config.spring_strength,
            ) * alpha;
            forces[from] += pull;
            forces[to] -= pull;
        }

        for (index, force) in forces.iter_mut().enumerate() {
            *force += centering_force(index, degrees[index], nodes[index].position, &config) * alpha;
        }

        let dragged_index = dragged.and_then(|id| graph.index_of(id));
        let max_speed = config.max_speed * alpha;
        for (index, node) in graph.nodes_mut().iter_mut().enumerate() {
            if Some(index) == dragged_index {
                node.velocity = Vec2::ZERO;
                continue;
            }

            let mut velocity = (node.velocity + self.forces[index]) * config.damping;
            let speed = velocity.length();
            if speed > max_speed {
                velocity *= max_speed / speed;
            }

            node.velocity = velocity;
            node.position += velocity;
        }

        if self.is_settled() {
            debug!(nodes = node_count, "layout settled");
        }

        true
    }
}
