//! First-person movement controller.
//!
//! Runs once per frame on the render thread. The first call captures the
//! cursor and records a baseline; every later call integrates the elapsed
//! time, cursor motion and held keys into the camera.

use crate::{Clock, CursorMode, InputSource, KeyBindings};
use glam::{Quat, Vec2, Vec3};
use marchlight_camera::{Camera, Movement, SceneView};

/// Tuning for [`MovementController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControllerConfig {
    /// Degrees of rotation per scaled pixel of cursor travel.
    pub sensitivity: f32,
    /// Per-axis divisor applied to raw cursor travel.
    pub sensitivity_scale: Vec2,
    /// Largest allowed magnitude of the orientation's vertical component.
    pub pitch_limit: f32,
    /// World units per microsecond, per axis.
    pub base_speed: Vec3,
    pub bindings: KeyBindings,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            sensitivity: 7.0,
            sensitivity_scale: Vec2::new(100.0, 50.0),
            pitch_limit: 0.99,
            base_speed: Vec3::splat(1e-6),
            bindings: KeyBindings::default(),
        }
    }
}

/// What one controller invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControlStep {
    pub delta_micros: u64,
    /// Scaled cursor travel in degrees, after pitch clamping.
    pub cursor_delta: Vec2,
    /// Translation fired per axis pair, in evaluation order.
    pub moves: [Option<Movement>; 3],
}

impl ControlStep {
    pub fn movements(&self) -> impl Iterator<Item = Movement> + '_ {
        self.moves.iter().flatten().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Uninitialized,
    Running { last_micros: u64, last_cursor: Vec2 },
}

#[derive(Debug)]
pub struct MovementController {
    config: ControllerConfig,
    phase: Phase,
    last_step: ControlStep,
}

impl MovementController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            config,
            phase: Phase::Uninitialized,
            last_step: ControlStep::default(),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    pub fn set_base_speed(&mut self, base_speed: Vec3) {
        self.config.base_speed = base_speed;
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, Phase::Running { .. })
    }

    pub fn last_step(&self) -> &ControlStep {
        &self.last_step
    }

    /// Forget the baseline; the next update captures and recenters the cursor again.
    pub fn reset(&mut self) {
        self.phase = Phase::Uninitialized;
        self.last_step = ControlStep::default();
    }

    pub fn update<I, C>(&mut self, view: &mut SceneView, input: &mut I, clock: &C) -> ControlStep
    where
        I: InputSource + ?Sized,
        C: Clock + ?Sized,
    {
        let now = clock.now_micros();

        let Phase::Running {
            last_micros,
            last_cursor,
        } = self.phase
        else {
            let center = view.viewport().center();
            input.set_cursor_mode(CursorMode::Disabled);
            input.set_cursor_position(center);
            self.phase = Phase::Running {
                last_micros: now,
                last_cursor: center,
            };
            self.last_step = ControlStep::default();
            tracing::debug!("movement controller captured cursor at {center}");
            return self.last_step;
        };

        let delta_micros = now.saturating_sub(last_micros);
        let cursor = input.cursor_position();
        let mut cursor_delta =
            self.config.sensitivity * (last_cursor - cursor) / self.config.sensitivity_scale;

        let camera = &mut view.camera;
        camera.set_speed(self.config.base_speed * delta_micros as f32);

        let limit = self.config.pitch_limit;
        let y = camera.orientation().y;
        if (y >= limit && cursor_delta.y > 0.0) || (y <= -limit && cursor_delta.y < 0.0) {
            cursor_delta.y = 0.0;
            camera.set_orientation(pin_pitch(camera.orientation(), limit.copysign(y)));
        }

        let mut moves = [None; 3];
        for (slot, pair) in moves.iter_mut().zip(self.config.bindings.pairs()) {
            *slot = pair
                .iter()
                .find(|(key, _)| input.is_key_pressed(*key))
                .map(|(_, movement)| *movement);
            if let Some(movement) = *slot {
                camera.translate(movement);
            }
        }

        if cursor_delta.x != 0.0 {
            let yaw = Quat::from_axis_angle(Camera::UP, cursor_delta.x.to_radians());
            camera.set_orientation(yaw * camera.orientation());
        }
        if cursor_delta.y != 0.0 {
            camera.set_orientation(camera.orientation() + Vec3::Y * cursor_delta.y.to_radians());
            let y = camera.orientation().y;
            if y.abs() > limit {
                camera.set_orientation(pin_pitch(camera.orientation(), limit.copysign(y)));
            }
        }

        self.phase = Phase::Running {
            last_micros: now,
            last_cursor: cursor,
        };
        self.last_step = ControlStep {
            delta_micros,
            cursor_delta,
            moves,
        };
        self.last_step
    }
}

impl Default for MovementController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

/// Unit vector with vertical component `y` and the same horizontal heading as `orientation`.
fn pin_pitch(orientation: Vec3, y: f32) -> Vec3 {
    let heading = Vec2::new(orientation.x, orientation.z)
        .try_normalize()
        .unwrap_or(Vec2::Y);
    let horizontal = heading * (1.0 - y * y).max(0.0).sqrt();
    Vec3::new(horizontal.x, y, horizontal.y)
}
