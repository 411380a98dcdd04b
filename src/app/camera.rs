use eframe::egui::{Pos2, Vec2};

pub(in crate::app) const MIN_ZOOM: f32 = 0.05;
pub(in crate::app) const MAX_ZOOM: f32 = 10.0;
const ZOOM_INTENSITY: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub offset: Vec2,
    pub zoom: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        (self.offset + world * self.zoom).to_pos2()
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen.to_vec2() - self.offset) / self.zoom
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    pub fn center_on(&mut self, viewport_center: Vec2) {
        self.offset = viewport_center;
        self.zoom = 1.0;
    }

    pub fn zoom_at(&mut self, anchor: Pos2, steps: f32) -> bool {
        if steps == 0.0 || !steps.is_finite() {
            return false;
        }

        let next_zoom = self.zoom * (steps * ZOOM_INTENSITY).exp();
        if next_zoom <= MIN_ZOOM || next_zoom >= MAX_ZOOM {
            return false;
        }

        let world_before = self.screen_to_world(anchor);
        self.zoom = next_zoom;
        self.offset = anchor.to_vec2() - world_before * self.zoom;
        true
    }
}
