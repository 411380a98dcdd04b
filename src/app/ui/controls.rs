use std::ops::RangeInclusive;

use eframe::egui::{self, Key, Response, Ui};

use super::super::{LayoutConfig, ViewModel};

const SLIDER_KEY_BASE_RATE: f32 = 10.0;
const SLIDER_KEY_ACCEL_PER_SEC: f32 = 9.0;
const SLIDER_KEY_ACCEL_MAX: f32 = 40.0;

#[derive(Clone, Copy, Default)]
struct SliderKeyHoldState {
    positive_secs: f32,
    negative_secs: f32,
}

fn slider_key_accel_multiplier(hold_secs: f32) -> f32 {
    let ramp = hold_secs * SLIDER_KEY_ACCEL_PER_SEC;
    (1.0 + ramp + ramp * ramp * 0.15).min(SLIDER_KEY_ACCEL_MAX)
}

fn apply_slider_arrow_acceleration(
    ui: &Ui,
    response: &Response,
    value: &mut f32,
    range: RangeInclusive<f32>,
) -> bool {
    let state_id = response.id.with("arrow_key_hold_state");
    let mut hold_state = ui.ctx().data(|data| {
        data.get_temp::<SliderKeyHoldState>(state_id)
            .unwrap_or_default()
    });

    if !response.has_focus() {
        ui.ctx()
            .data_mut(|data| data.insert_temp(state_id, SliderKeyHoldState::default()));
        return false;
    }

    let (delta_time, increase_down, decrease_down) = ui.input(|input| {
        (
            input.stable_dt.min(0.1),
            input.key_down(Key::ArrowRight) || input.key_down(Key::ArrowUp),
            input.key_down(Key::ArrowLeft) || input.key_down(Key::ArrowDown),
        )
    });

    hold_state.positive_secs = if increase_down {
        hold_state.positive_secs + delta_time
    } else {
        0.0
    };
    hold_state.negative_secs = if decrease_down {
        hold_state.negative_secs + delta_time
    } else {
        0.0
    };
    ui.ctx()
        .data_mut(|data| data.insert_temp(state_id, hold_state));

    let direction = (increase_down as i8) - (decrease_down as i8);
    if direction == 0 {
        return false;
    }

    let hold_secs = if direction > 0 {
        hold_state.positive_secs
    } else {
        hold_state.negative_secs
    };
    let step = ((range.end() - range.start()) / 200.0).max(0.0001);
    let speed = SLIDER_KEY_BASE_RATE * slider_key_accel_multiplier(hold_secs);
    let old_value = *value;
    *value = (*value + direction as f32 * step * speed * delta_time)
        .clamp(*range.start(), *range.end());

    ui.ctx().request_repaint();
    (*value - old_value).abs() > f32::EPSILON
}

fn tuning_slider(
    ui: &mut Ui,
    value: &mut f32,
    range: RangeInclusive<f32>,
    text: &str,
    hover: &str,
) -> bool {
    let slider = ui
        .add(
            egui::Slider::new(value, range.clone())
                .text(text)
                .clamping(egui::SliderClamping::Always),
        )
        .on_hover_text(hover);
    let mut changed = slider.changed();
    changed |= apply_slider_arrow_acceleration(ui, &slider, value, range);
    changed
}

impl ViewModel {
    pub(in crate::app) fn draw_controls(&mut self, ui: &mut Ui) {
        ui.heading("Layout");
        ui.separator();
        ui.add_space(4.0);

        let alpha = self.session.simulation().alpha();
        let settled = self.session.simulation().is_settled();
        ui.add(egui::ProgressBar::new(alpha).text(if settled {
            "settled".to_owned()
        } else {
            format!("heat {alpha:.2}")
        }));

        ui.horizontal(|ui| {
            if ui.button("Run").clicked() {
                self.session.start_auto_layout();
            }
            if ui.add_enabled(!settled, egui::Button::new("Stop")).clicked() {
                self.session.stop_auto_layout();
            }
        });

        let mut auto_layout = self.session.auto_layout_on_import();
        if ui
            .checkbox(&mut auto_layout, "Run after adjacency import")
            .on_hover_text("Adjacency lists carry no positions, so imported states start scattered.")
            .changed()
        {
            self.session.set_auto_layout_on_import(auto_layout);
        }

        ui.separator();

        let config = self.session.layout_config_mut();
        ui.collapsing("Cooling", |ui| {
            tuning_slider(
                ui,
                &mut config.decay_rate,
                LayoutConfig::MIN_DECAY_RATE..=LayoutConfig::MAX_DECAY_RATE,
                "Decay rate",
                "Heat multiplier per tick. Lower values settle sooner.",
            );
            tuning_slider(
                ui,
                &mut config.damping,
                0.1..=0.95,
                "Damping",
                "Fraction of velocity kept between ticks.",
            );
            tuning_slider(
                ui,
                &mut config.max_speed,
                5.0..=200.0,
                "Max speed",
                "Per-tick speed ceiling at full heat.",
            );
        });

        ui.collapsing("Forces", |ui| {
            tuning_slider(
                ui,
                &mut config.repulsion,
                10_000.0..=1_000_000.0,
                "Repulsion",
                "Inverse-square push between every pair of states.",
            );
            tuning_slider(
                ui,
                &mut config.spring_length,
                40.0..=400.0,
                "Spring length",
                "Rest length of each transition.",
            );
            tuning_slider(
                ui,
                &mut config.spring_strength,
                0.005..=0.3,
                "Spring strength",
                "How hard transitions pull toward their rest length.",
            );
        });

        ui.collapsing("Gravity", |ui| {
            tuning_slider(
                ui,
                &mut config.isolated_radius,
                100.0..=900.0,
                "Isolated ring",
                "Unconnected states are pushed out to about this radius.",
            );
            tuning_slider(
                ui,
                &mut config.leaf_gravity,
                0.0..=0.01,
                "Leaf gravity",
                "Pull toward the centre for states with one transition.",
            );
            tuning_slider(
                ui,
                &mut config.hub_gravity,
                0.0..=0.02,
                "Hub gravity",
                "Base pull toward the centre for states with several transitions.",
            );
            tuning_slider(
                ui,
                &mut config.hub_gravity_per_degree,
                0.0..=0.01,
                "Per-degree gravity",
                "Extra pull added for each transition on a hub.",
            );
        });

        ui.add_space(6.0);
        if ui.button("Reset to defaults").clicked() {
            let decay_rate = self.session.layout_config_mut().decay_rate;
            *self.session.layout_config_mut() = LayoutConfig::default().with_decay_rate(decay_rate);
        }
    }
}
