use marchlight_camera::Movement;
use serde::{Deserialize, Serialize};

/// Keys the renderer reacts to. Platform layers map their own codes onto these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    W,
    A,
    S,
    D,
    F,
    Space,
    LeftControl,
    Escape,
}

/// How the platform should treat the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorMode {
    #[default]
    Normal,
    Hidden,
    /// Hidden and locked; only relative motion is reported.
    Disabled,
}

/// Key assignment for the three movement axis pairs.
///
/// Within a pair the first key wins when both are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyBindings {
    pub up: Key,
    pub down: Key,
    pub forward: Key,
    pub backward: Key,
    pub left: Key,
    pub right: Key,
}

impl KeyBindings {
    /// Axis pairs in evaluation order: vertical, depth, lateral.
    pub fn pairs(&self) -> [[(Key, Movement); 2]; 3] {
        [
            [(self.up, Movement::Up), (self.down, Movement::Down)],
            [
                (self.forward, Movement::Forward),
                (self.backward, Movement::Backward),
            ],
            [(self.left, Movement::Left), (self.right, Movement::Right)],
        ]
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            up: Key::Space,
            down: Key::LeftControl,
            forward: Key::W,
            backward: Key::S,
            left: Key::A,
            right: Key::D,
        }
    }
}
