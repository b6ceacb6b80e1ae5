/// Platform-agnostic input handling system
use std::collections::HashSet;

use glam::Vec3;

use crate::model::PlayerId;

/// Held-key map plus the edge-triggered fire channel. Input events only
/// ever mutate this state; the game loop reads it once per frame.
pub struct InputState {
    pressed_keys: HashSet<String>,
    fire_requests: Vec<PlayerId>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            pressed_keys: HashSet::new(),
            fire_requests: Vec::new(),
        }
    }

    pub fn set_key(&mut self, key: &str, held: bool) {
        if held {
            self.pressed_keys.insert(key.to_string());
        } else {
            self.pressed_keys.remove(key);
        }
    }

    /// Unknown keys read as released.
    pub fn is_held(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Drop all held keys, e.g. on window focus loss.
    pub fn clear_keys(&mut self) {
        self.pressed_keys.clear();
    }

    /// Record one fire edge. One projectile per discrete key press, never
    /// per frame while held.
    pub fn request_fire(&mut self, player: PlayerId) {
        self.fire_requests.push(player);
    }

    /// Drain the fire edges accumulated since the last frame.
    pub fn take_fire_requests(&mut self) -> Vec<PlayerId> {
        std::mem::take(&mut self.fire_requests)
    }
}

/// Key mapping for one player's movement and fire controls.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    pub forward: String,
    pub backward: String,
    pub left: String,
    pub right: String,
    pub fire: String,
}

impl KeyBindings {
    /// WASD movement, Space to fire.
    pub fn player_one() -> Self {
        Self {
            forward: "w".to_string(),
            backward: "s".to_string(),
            left: "a".to_string(),
            right: "d".to_string(),
            fire: " ".to_string(),
        }
    }

    /// Arrow-key movement, Enter to fire.
    pub fn player_two() -> Self {
        Self {
            forward: "ArrowUp".to_string(),
            backward: "ArrowDown".to_string(),
            left: "ArrowLeft".to_string(),
            right: "ArrowRight".to_string(),
            fire: "Enter".to_string(),
        }
    }

    /// Sum of the held directional axes. Axes are applied independently,
    /// so diagonals move along both at full speed.
    pub fn movement_axis(&self, input: &InputState) -> Vec3 {
        let mut axis = Vec3::ZERO;
        if input.is_held(&self.forward) {
            axis.z -= 1.0;
        }
        if input.is_held(&self.backward) {
            axis.z += 1.0;
        }
        if input.is_held(&self.left) {
            axis.x -= 1.0;
        }
        if input.is_held(&self.right) {
            axis.x += 1.0;
        }
        axis
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_keys_read_as_released() {
        let input = InputState::new();
        assert!(!input.is_held("w"));
    }

    #[test]
    fn set_key_tracks_press_and_release() {
        let mut input = InputState::new();
        input.set_key("w", true);
        assert!(input.is_held("w"));
        input.set_key("w", false);
        assert!(!input.is_held("w"));
    }

    #[test]
    fn clear_keys_drops_everything_held() {
        let mut input = InputState::new();
        input.set_key("w", true);
        input.set_key("ArrowLeft", true);
        input.clear_keys();
        assert!(!input.is_held("w"));
        assert!(!input.is_held("ArrowLeft"));
    }

    #[test]
    fn fire_requests_drain_once() {
        let mut input = InputState::new();
        input.request_fire(PlayerId::One);
        input.request_fire(PlayerId::Two);
        assert_eq!(
            input.take_fire_requests(),
            vec![PlayerId::One, PlayerId::Two]
        );
        assert!(input.take_fire_requests().is_empty());
    }

    #[test]
    fn movement_axis_sums_held_directions() {
        let mut input = InputState::new();
        let bindings = KeyBindings::player_one();
        input.set_key("w", true);
        input.set_key("a", true);
        assert_eq!(bindings.movement_axis(&input), Vec3::new(-1.0, 0.0, -1.0));
    }
}
