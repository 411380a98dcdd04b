use eframe::egui::{Vec2, vec2};

use super::LayoutConfig;

const MIN_DISTANCE: f32 = 0.01;

fn fallback_direction(first: usize, second: usize) -> Vec2 {
    let angle = ((first as f32) * 0.618_034 + (second as f32) * 0.414_214 + 0.37)
        * std::f32::consts::TAU;
    vec2(angle.cos(), angle.sin())
}

pub(super) fn repulsion_between(
    point_a: Vec2,
    point_b: Vec2,
    index_a: usize,
    index_b: usize,
    repulsion: f32,
) -> Vec2 {
    let delta = point_a - point_b;
    let distance = delta.length();
    if distance < MIN_DISTANCE {
        return fallback_direction(index_a, index_b) * repulsion;
    }

    (delta / distance) * (repulsion / (distance * distance))
}

pub(super) fn spring_between(from: Vec2, to: Vec2, rest_length: f32, strength: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    if distance < MIN_DISTANCE {
        return Vec2::ZERO;
    }

    (delta / distance) * ((distance - rest_length) * strength)
}

pub(super) fn centering_force(
    index: usize,
    degree: usize,
    position: Vec2,
    config: &LayoutConfig,
) -> Vec2 {
    let distance = position.length();

    if degree == 0 {
        let outward = if distance < MIN_DISTANCE {
            fallback_direction(index, index)
        } else {
            position / distance
        };

        return if distance < config.isolated_radius {
            outward * (config.isolated_push * (1.0 - distance / config.isolated_radius))
        } else {
            -outward * ((distance - config.isolated_radius) * config.isolated_pull)
        };
    }

    -position * gravity_strength(degree, config)
}

pub(super) fn gravity_strength(degree: usize, config: &LayoutConfig) -> f32 {
    match degree {
        0 => 0.0,
        1 => config.leaf_gravity,
        _ => config.hub_gravity + config.hub_gravity_per_degree * degree as f32,
    }
}
