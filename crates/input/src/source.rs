use crate::{CursorMode, Key};
use glam::Vec2;
use std::collections::HashSet;

/// Synchronous, polled view of the platform's keyboard and pointer.
pub trait InputSource {
    /// Cursor position in window pixels.
    fn cursor_position(&self) -> Vec2;
    fn set_cursor_position(&mut self, position: Vec2);
    fn is_key_pressed(&self, key: Key) -> bool;
    fn set_cursor_mode(&mut self, mode: CursorMode);
}

/// Input state accumulated from platform events between frames.
///
/// While the cursor is [`CursorMode::Disabled`] the absolute pointer is frozen
/// and raw motion drives a virtual cursor instead, so relative look input keeps
/// working when the platform cannot lock the pointer. Mode changes and cursor
/// warps requested through [`InputSource`] are queued for the window layer.
#[derive(Debug, Default)]
pub struct PolledInput {
    keys_down: HashSet<Key>,
    cursor: Vec2,
    mode: CursorMode,
    pending_mode: Option<CursorMode>,
    pending_warp: Option<Vec2>,
}

impl PolledInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press. Returns `true` only on the transition to held.
    pub fn press(&mut self, key: Key) -> bool {
        self.keys_down.insert(key)
    }

    pub fn release(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }

    /// Absolute pointer position reported by the window.
    pub fn cursor_moved(&mut self, position: Vec2) {
        if self.mode != CursorMode::Disabled {
            self.cursor = position;
        }
    }

    /// Raw relative pointer motion.
    pub fn mouse_motion(&mut self, delta: Vec2) {
        if self.mode == CursorMode::Disabled {
            self.cursor += delta;
        }
    }

    /// Drop held keys, e.g. on focus loss.
    pub fn clear(&mut self) {
        self.keys_down.clear();
    }

    pub fn cursor_mode(&self) -> CursorMode {
        self.mode
    }

    pub fn take_mode_request(&mut self) -> Option<CursorMode> {
        self.pending_mode.take()
    }

    pub fn take_warp_request(&mut self) -> Option<Vec2> {
        self.pending_warp.take()
    }
}

impl InputSource for PolledInput {
    fn cursor_position(&self) -> Vec2 {
        self.cursor
    }

    fn set_cursor_position(&mut self, position: Vec2) {
        self.cursor = position;
        self.pending_warp = Some(position);
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    fn set_cursor_mode(&mut self, mode: CursorMode) {
        if mode != self.mode {
            tracing::debug!("cursor mode {:?} -> {:?}", self.mode, mode);
        }
        self.mode = mode;
        self.pending_mode = Some(mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_reports_edges() {
        let mut input = PolledInput::new();
        assert!(input.press(Key::F));
        assert!(!input.press(Key::F));
        assert!(input.is_key_pressed(Key::F));
        input.release(Key::F);
        assert!(!input.is_key_pressed(Key::F));
        assert!(input.press(Key::F));
    }

    #[test]
    fn disabled_cursor_follows_motion_only() {
        let mut input = PolledInput::new();
        input.cursor_moved(Vec2::new(10.0, 10.0));
        input.mouse_motion(Vec2::new(5.0, 5.0));
        assert_eq!(input.cursor_position(), Vec2::new(10.0, 10.0));

        input.set_cursor_mode(CursorMode::Disabled);
        input.cursor_moved(Vec2::new(300.0, 300.0));
        input.mouse_motion(Vec2::new(5.0, -2.0));
        assert_eq!(input.cursor_position(), Vec2::new(15.0, 8.0));
    }

    #[test]
    fn requests_are_queued_once() {
        let mut input = PolledInput::new();
        input.set_cursor_mode(CursorMode::Disabled);
        input.set_cursor_position(Vec2::new(400.0, 240.0));
        assert_eq!(input.take_mode_request(), Some(CursorMode::Disabled));
        assert_eq!(input.take_mode_request(), None);
        assert_eq!(input.take_warp_request(), Some(Vec2::new(400.0, 240.0)));
        assert_eq!(input.take_warp_request(), None);
        assert_eq!(input.cursor_mode(), CursorMode::Disabled);
    }

    #[test]
    fn clear_releases_keys() {
        let mut input = PolledInput::new();
        input.press(Key::W);
        input.press(Key::Space);
        input.clear();
        assert!(!input.is_key_pressed(Key::W));
        assert!(!input.is_key_pressed(Key::Space));
    }
}
