use glam::Vec3;
use marchlight_common::SceneParams;
use marchlight_render::ProgramState;

/// Read-only state shown in the panel.
#[derive(Debug, Clone)]
pub struct PanelStatus {
    pub shader_state: ProgramState,
    pub shader_usable: bool,
    pub diagnostics: Option<String>,
    pub reload_error: Option<String>,
    pub camera_position: Vec3,
    pub frame_micros: u64,
    pub captured: bool,
    pub params_path: String,
}

/// Buttons clicked this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PanelActions {
    pub save: bool,
    pub reload: bool,
}

pub fn show(ctx: &egui::Context, params: &mut SceneParams, status: &PanelStatus) -> PanelActions {
    let mut actions = PanelActions::default();

    egui::SidePanel::left("controls")
        .default_width(260.0)
        .show(ctx, |ui| {
            ui.heading("Marchlight");
            ui.separator();

            ui.label("Sphere position");
            let (lo, hi) = SceneParams::SPHERE_POSITION_RANGE;
            ui.add(egui::Slider::new(&mut params.sphere_position.x, lo..=hi).text("x"));
            ui.add(egui::Slider::new(&mut params.sphere_position.y, lo..=hi).text("y"));
            ui.add(egui::Slider::new(&mut params.sphere_position.z, lo..=hi).text("z"));

            let (lo, hi) = SceneParams::SPHERE_RADIUS_RANGE;
            ui.add(egui::Slider::new(&mut params.sphere_radius, lo..=hi).text("radius"));
            ui.separator();

            let (lo, hi) = SceneParams::MAX_ITERATIONS_RANGE;
            ui.add(
                egui::Slider::new(&mut params.max_iterations, lo..=hi)
                    .logarithmic(true)
                    .text("max iterations"),
            );
            let (lo, hi) = SceneParams::THRESHOLD_RANGE;
            ui.add(
                egui::Slider::new(&mut params.threshold, lo..=hi)
                    .logarithmic(true)
                    .text("threshold"),
            );
            ui.separator();

            let (lo, hi) = SceneParams::SPEED_RANGE;
            ui.add(egui::Slider::new(&mut params.speed, lo..=hi).text("speed"));
            let (lo, hi) = SceneParams::FOV_RANGE;
            ui.add(egui::Slider::new(&mut params.fov, lo..=hi).text("fov"));

            // The color widget round-trips through its own color space; only
            // take its value back after an edit.
            let mut clear = params.clear_color.to_array();
            ui.horizontal(|ui| {
                ui.label("Background");
                if ui.color_edit_button_rgba_unmultiplied(&mut clear).changed() {
                    params.clear_color = clear.into();
                }
            });

            egui::CollapsingHeader::new(format!("Lights ({})", params.lights.len())).show(
                ui,
                |ui| {
                    for (i, light) in params.lights.iter_mut().enumerate() {
                        ui.label(format!("Light {i}"));
                        ui.horizontal(|ui| {
                            ui.add(egui::DragValue::new(&mut light.position.x).prefix("x: ").speed(0.1));
                            ui.add(egui::DragValue::new(&mut light.position.y).prefix("y: ").speed(0.1));
                            ui.add(egui::DragValue::new(&mut light.position.z).prefix("z: ").speed(0.1));
                        });
                        let mut diffuse = light.diffuse.to_array();
                        if ui.color_edit_button_rgb(&mut diffuse).changed() {
                            light.diffuse = diffuse.into();
                        }
                    }
                },
            );
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Save").on_hover_text(&status.params_path).clicked() {
                    actions.save = true;
                }
                if ui.button("Reload shaders").clicked() {
                    actions.reload = true;
                }
            });

            ui.separator();
            ui.heading("Shader");
            let state = match (status.shader_state, status.shader_usable) {
                (ProgramState::Compiled, _) => "compiled",
                (ProgramState::Failed, true) => "last build failed, previous program live",
                (ProgramState::Failed, false) => "no usable program",
            };
            ui.label(state);
            if let Some(err) = &status.reload_error {
                ui.colored_label(egui::Color32::LIGHT_RED, err);
            }
            if let Some(diagnostics) = &status.diagnostics {
                egui::ScrollArea::vertical()
                    .max_height(160.0)
                    .show(ui, |ui| ui.monospace(diagnostics));
            }

            ui.separator();
            let p = status.camera_position;
            ui.label(format!("Camera: ({:.2}, {:.2}, {:.2})", p.x, p.y, p.z));
            ui.label(format!("Frame: {:.2} ms", status.frame_micros as f64 / 1000.0));
            ui.small(if status.captured {
                "F: release cursor | WASD/Space/Ctrl: move | Esc: quit"
            } else {
                "F: capture cursor | Esc: quit"
            });
        });

    actions
}
