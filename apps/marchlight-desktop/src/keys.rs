use marchlight_input::Key;
use winit::keyboard::KeyCode;

/// Physical key to renderer key. Unmapped keys are ignored.
pub fn map_key(code: KeyCode) -> Option<Key> {
    Some(match code {
        KeyCode::KeyW => Key::W,
        KeyCode::KeyA => Key::A,
        KeyCode::KeyS => Key::S,
        KeyCode::KeyD => Key::D,
        KeyCode::KeyF => Key::F,
        KeyCode::Space => Key::Space,
        KeyCode::ControlLeft => Key::LeftControl,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_keys_are_mapped() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::ControlLeft), Some(Key::LeftControl));
        assert_eq!(map_key(KeyCode::Space), Some(Key::Space));
    }

    #[test]
    fn right_hand_modifiers_are_not_bindings() {
        assert_eq!(map_key(KeyCode::ControlRight), None);
        assert_eq!(map_key(KeyCode::F5), None);
        assert_eq!(map_key(KeyCode::ShiftLeft), None);
    }
}
