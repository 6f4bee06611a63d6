use glam::{Mat4, Vec3};

/// One discrete displacement step along a camera axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Movement {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
}

impl Movement {
    pub fn opposite(self) -> Self {
        match self {
            Movement::Forward => Movement::Backward,
            Movement::Backward => Movement::Forward,
            Movement::Left => Movement::Right,
            Movement::Right => Movement::Left,
            Movement::Up => Movement::Down,
            Movement::Down => Movement::Up,
        }
    }
}

/// First-person camera: position, unit orientation, per-axis speed.
///
/// Displacements are not scaled by time; the movement controller folds the
/// frame delta into [`Camera::speed`] before translating.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    position: Vec3,
    orientation: Vec3,
    speed: Vec3,
    aspect_ratio: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Camera {
    /// World up axis.
    pub const UP: Vec3 = Vec3::Y;
    pub const DEFAULT_SPEED: Vec3 = Vec3::splat(0.005);
    pub const DEFAULT_ORIENTATION: Vec3 = Vec3::Z;

    pub fn new(position: Vec3, aspect_ratio: f32, fov: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            orientation: Self::DEFAULT_ORIENTATION,
            speed: Self::DEFAULT_SPEED,
            aspect_ratio,
            fov,
            near,
            far,
        }
    }

    pub fn with_aspect_ratio(aspect_ratio: f32) -> Self {
        Self {
            aspect_ratio,
            ..Self::default()
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn orientation(&self) -> Vec3 {
        self.orientation
    }

    pub fn speed(&self) -> Vec3 {
        self.speed
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Unit vector to the camera's right. Zero when looking straight along the up axis.
    pub fn right(&self) -> Vec3 {
        self.orientation.cross(Self::UP).normalize_or_zero()
    }

    pub fn move_forward(&mut self) {
        self.position += self.speed * self.orientation;
    }

    pub fn move_backward(&mut self) {
        self.position -= self.speed * self.orientation;
    }

    pub fn move_right(&mut self) {
        self.position += self.speed * self.orientation.cross(Self::UP);
    }

    pub fn move_left(&mut self) {
        self.position -= self.speed * self.orientation.cross(Self::UP);
    }

    pub fn move_up(&mut self) {
        self.position += self.speed * Self::UP;
    }

    pub fn move_down(&mut self) {
        self.position -= self.speed * Self::UP;
    }

    pub fn translate(&mut self, movement: Movement) {
        match movement {
            Movement::Forward => self.move_forward(),
            Movement::Backward => self.move_backward(),
            Movement::Left => self.move_left(),
            Movement::Right => self.move_right(),
            Movement::Up => self.move_up(),
            Movement::Down => self.move_down(),
        }
    }

    /// Set the facing direction, normalized. A zero or non-finite vector is ignored.
    pub fn set_orientation(&mut self, orientation: Vec3) {
        match orientation.try_normalize() {
            Some(unit) => self.orientation = unit,
            None => tracing::trace!("ignoring degenerate orientation {orientation}"),
        }
    }

    pub fn set_speed(&mut self, speed: Vec3) {
        self.speed = speed;
    }

    pub fn set_speed_y(&mut self, y: f32) {
        self.speed.y = y;
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    pub fn set_position_y(&mut self, y: f32) {
        self.position.y = y;
    }

    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.orientation, Self::UP)
    }

    /// Camera-to-world transform, the inverse of [`Camera::view_matrix`].
    pub fn camera_matrix(&self) -> Mat4 {
        self.view_matrix().inverse()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Vec3::ZERO, 1.0, 75.0, 0.05, 5000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn at_origin_facing_z() -> Camera {
        Camera::new(Vec3::new(0.0, 0.0, 3.0), 1.0, 75.0, 0.05, 5000.0)
    }

    #[test]
    fn default_camera() {
        let cam = Camera::default();
        assert_eq!(cam.orientation(), Vec3::Z);
        assert_eq!(cam.speed(), Vec3::splat(0.005));
        assert_eq!(cam.fov, 75.0);
        assert!(!cam.camera_matrix().col(0).x.is_nan());
    }

    #[test]
    fn one_step_forward() {
        let mut cam = at_origin_facing_z();
        cam.move_forward();
        assert!((cam.position() - Vec3::new(0.0, 0.0, 3.005)).length() < EPS);
    }

    #[test]
    fn forward_backward_cancel() {
        let mut cam = at_origin_facing_z();
        cam.set_orientation(Vec3::new(0.3, -0.2, 0.9));
        let start = cam.position();
        for _ in 0..50 {
            cam.move_forward();
        }
        for _ in 0..50 {
            cam.move_backward();
        }
        assert!((cam.position() - start).length() < 1e-4);
    }

    #[test]
    fn strafe_is_perpendicular_to_orientation_and_up() {
        let mut cam = at_origin_facing_z();
        let start = cam.position();
        cam.move_right();
        let d = cam.position() - start;
        assert!(d.dot(cam.orientation()).abs() < EPS);
        assert!(d.dot(Camera::UP).abs() < EPS);
        // Facing +Z with +Y up, right is -X.
        assert!(d.x < 0.0);

        cam.move_left();
        assert!((cam.position() - start).length() < EPS);
    }

    #[test]
    fn vertical_moves_ignore_orientation() {
        let mut cam = at_origin_facing_z();
        cam.set_orientation(Vec3::new(1.0, 1.0, 0.0));
        cam.move_up();
        assert!((cam.position() - Vec3::new(0.0, 0.005, 3.0)).length() < EPS);
        cam.move_down();
        cam.move_down();
        assert!((cam.position().y + 0.005).abs() < EPS);
    }

    #[test]
    fn per_axis_speed() {
        let mut cam = at_origin_facing_z();
        cam.set_speed(Vec3::new(0.0, 2.0, 0.0));
        cam.move_forward();
        assert_eq!(cam.position(), Vec3::new(0.0, 0.0, 3.0));
        cam.move_up();
        assert_eq!(cam.position(), Vec3::new(0.0, 2.0, 3.0));
        cam.set_speed_y(0.5);
        assert_eq!(cam.speed().y, 0.5);
    }

    #[test]
    fn orientation_is_always_unit() {
        let mut cam = Camera::default();
        for v in [
            Vec3::new(10.0, 0.0, 0.0),
            Vec3::new(0.001, 0.002, -0.003),
            Vec3::new(-3.0, 7.0, 2.5),
        ] {
            cam.set_orientation(v);
            assert!((cam.orientation().length() - 1.0).abs() < EPS);
        }
    }

    #[test]
    fn zero_orientation_is_ignored() {
        let mut cam = Camera::default();
        cam.set_orientation(Vec3::X);
        cam.set_orientation(Vec3::ZERO);
        assert_eq!(cam.orientation(), Vec3::X);
        cam.set_orientation(Vec3::new(f32::NAN, 0.0, 0.0));
        assert_eq!(cam.orientation(), Vec3::X);
    }

    #[test]
    fn translate_dispatches_and_opposites_cancel() {
        let mut cam = at_origin_facing_z();
        let start = cam.position();
        for m in [
            Movement::Forward,
            Movement::Left,
            Movement::Up,
            Movement::Backward,
            Movement::Right,
            Movement::Down,
        ] {
            cam.translate(m);
            cam.translate(m.opposite());
        }
        assert!((cam.position() - start).length() < EPS);
    }

    #[test]
    fn camera_matrix_maps_origin_to_position() {
        let mut cam = at_origin_facing_z();
        cam.set_position(Vec3::new(1.0, 2.0, 3.0));
        let p = cam.camera_matrix().transform_point3(Vec3::ZERO);
        assert!((p - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-4);
        // Right-handed look-at: the camera looks down its local -Z.
        let fwd = cam.camera_matrix().transform_vector3(Vec3::NEG_Z);
        assert!((fwd - cam.orientation()).length() < 1e-4);
    }
}
