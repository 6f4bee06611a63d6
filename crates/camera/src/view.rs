use crate::Camera;
use marchlight_common::Viewport;

/// The scene's single viewer together with the viewport it renders into.
///
/// Passed by reference to the movement controller and the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneView {
    pub camera: Camera,
    viewport: Viewport,
}

impl SceneView {
    pub fn new(camera: Camera, viewport: Viewport) -> Self {
        let mut view = Self { camera, viewport };
        view.camera.set_aspect_ratio(viewport.aspect_ratio());
        view
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Resize notification. Returns `true` when the size actually changed.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> bool {
        let next = Viewport::new(width, height);
        if next == self.viewport {
            return false;
        }
        self.viewport = next;
        self.camera.set_aspect_ratio(next.aspect_ratio());
        tracing::debug!("viewport resized to {width}x{height}");
        true
    }
}

impl Default for SceneView {
    fn default() -> Self {
        Self::new(Camera::default(), Viewport::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_syncs_aspect_ratio() {
        let view = SceneView::new(Camera::default(), Viewport::new(800, 400));
        assert_eq!(view.camera.aspect_ratio(), 2.0);
    }

    #[test]
    fn resize_updates_camera() {
        let mut view = SceneView::default();
        assert!(view.set_viewport(1000, 500));
        assert_eq!(view.viewport(), Viewport::new(1000, 500));
        assert_eq!(view.camera.aspect_ratio(), 2.0);
        assert!(!view.set_viewport(1000, 500));
    }

    #[test]
    fn independent_views_do_not_share_state() {
        let mut a = SceneView::default();
        let b = SceneView::default();
        a.camera.move_forward();
        assert_ne!(a.camera.position(), b.camera.position());
    }
}
