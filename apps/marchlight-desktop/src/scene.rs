//! Per-frame scene uniforms for the bundled ray-march shader.

use marchlight_camera::SceneView;
use marchlight_common::SceneParams;
use marchlight_render::{GlDevice, ShaderProgram, light};

pub const CAMERA_POSITION: &str = "u_camera_position";
pub const CAMERA_FOV: &str = "u_camera_fov";
pub const CAMERA_MATRIX: &str = "u_camera_matrix";
pub const CAMERA_NEAR: &str = "u_camera_near";
pub const CAMERA_FAR: &str = "u_camera_far";
pub const TIME: &str = "u_time";
pub const SPHERE_POSITION: &str = "u_sphere_position";
pub const SPHERE_RADIUS: &str = "u_sphere_radius";
pub const MAX_ITERATIONS: &str = "u_max_iterations";
pub const THRESHOLD: &str = "u_threshold";

/// Activate `shader` and write camera, sphere, march and light uniforms.
///
/// The camera's near and far planes bound the primary ray march.
pub fn upload<D: GlDevice + ?Sized>(
    shader: &ShaderProgram<D>,
    params: &SceneParams,
    view: &SceneView,
    time_ms: f32,
) {
    shader.activate();
    let camera = &view.camera;
    shader.set_uniform(CAMERA_POSITION, camera.position());
    shader.set_uniform(CAMERA_FOV, camera.fov);
    shader.set_uniform(CAMERA_MATRIX, camera.camera_matrix());
    shader.set_uniform(CAMERA_NEAR, camera.near);
    shader.set_uniform(CAMERA_FAR, camera.far);
    shader.set_uniform(TIME, time_ms);
    shader.set_uniform(SPHERE_POSITION, params.sphere_position);
    shader.set_uniform(SPHERE_RADIUS, params.sphere_radius);
    shader.set_uniform(MAX_ITERATIONS, params.max_iterations);
    shader.set_uniform(THRESHOLD, params.threshold);
    light::upload_point_lights(shader, &params.lights);
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use marchlight_render::{RecordingDevice, UniformValue};
    use std::path::PathBuf;
    use std::rc::Rc;

    fn bundled(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("shaders")
            .join(name)
    }

    fn program(device: &Rc<RecordingDevice>) -> ShaderProgram<RecordingDevice> {
        ShaderProgram::from_files(device, bundled("scene.vert"), bundled("scene.frag")).unwrap()
    }

    #[test]
    fn bundled_shaders_load() {
        let device = Rc::new(RecordingDevice::new());
        assert!(program(&device).is_usable());
    }

    #[test]
    fn uploads_scene_state() {
        let device = Rc::new(RecordingDevice::new());
        let shader = program(&device);
        let params = SceneParams {
            sphere_radius: 1.5,
            max_iterations: 64,
            ..SceneParams::default()
        };
        let view = SceneView::default();
        upload(&shader, &params, &view, 1234.0);

        assert_eq!(device.active_program(), shader.program_id());
        assert_eq!(
            device.active_uniform(SPHERE_POSITION),
            Some(UniformValue::Vec3(Vec3::new(0.0, 0.0, 3.0)))
        );
        assert_eq!(
            device.active_uniform(SPHERE_RADIUS),
            Some(UniformValue::F32(1.5))
        );
        assert_eq!(
            device.active_uniform(MAX_ITERATIONS),
            Some(UniformValue::I32(64))
        );
        assert_eq!(device.active_uniform(TIME), Some(UniformValue::F32(1234.0)));
        assert_eq!(
            device.active_uniform(CAMERA_MATRIX),
            Some(UniformValue::Mat4(view.camera.camera_matrix()))
        );
        assert_eq!(
            device.active_uniform(CAMERA_NEAR),
            Some(UniformValue::F32(view.camera.near))
        );
        assert_eq!(
            device.active_uniform(CAMERA_FAR),
            Some(UniformValue::F32(view.camera.far))
        );
        assert_eq!(
            device.active_uniform("pointLightCount"),
            Some(UniformValue::I32(params.lights.len() as i32))
        );
    }

    #[test]
    fn camera_position_follows_the_view() {
        let device = Rc::new(RecordingDevice::new());
        let shader = program(&device);
        let mut view = SceneView::default();
        view.camera.set_position(Vec3::new(0.0, 0.0, 3.0));
        view.camera.move_forward();
        upload(&shader, &SceneParams::default(), &view, 0.0);
        let Some(UniformValue::Vec3(p)) = device.active_uniform(CAMERA_POSITION) else {
            panic!("camera position not uploaded");
        };
        assert!((p.z - 3.005).abs() < 1e-6);
    }
}
