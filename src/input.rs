use std::collections::HashSet;

use crate::camera::CameraMovement;
use crate::lighting::Lamp;

/// Pixels of trackpad scrolling that count as one wheel notch.
pub const PIXELS_PER_LINE: f32 = 20.0;

/// Identifier for a physical keyboard key the viewer binds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
}

/// Non-character keys with a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamedKey {
    Left,
    Right,
    Up,
    Down,
    Escape,
    Home,
}

/// What a key press asks the viewer to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Move(CameraMovement),
    ResetCamera,
    ToggleLamp(Lamp),
    Quit,
}

/// Fixed key bindings: WASD or arrows move, Q/R/Home recentre, 1 and 2
/// switch the lamps, Escape quits.
pub fn action_for_key(key: KeyCode) -> Option<Action> {
    use CameraMovement::*;
    let action = match key {
        KeyCode::Character('W') | KeyCode::Named(NamedKey::Up) => Action::Move(Forward),
        KeyCode::Character('S') | KeyCode::Named(NamedKey::Down) => Action::Move(Backward),
        KeyCode::Character('A') | KeyCode::Named(NamedKey::Left) => Action::Move(Left),
        KeyCode::Character('D') | KeyCode::Named(NamedKey::Right) => Action::Move(Right),
        KeyCode::Character('Q') | KeyCode::Character('R') | KeyCode::Named(NamedKey::Home) => {
            Action::ResetCamera
        }
        KeyCode::Digit(1) => Action::ToggleLamp(Lamp::Ceiling),
        KeyCode::Digit(2) => Action::ToggleLamp(Lamp::Night),
        KeyCode::Named(NamedKey::Escape) => Action::Quit,
        _ => return None,
    };
    Some(action)
}

/// Wheel movement as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollDelta {
    Lines(f32),
    Pixels(f32),
}

impl ScrollDelta {
    pub fn lines(self) -> f32 {
        match self {
            Self::Lines(lines) => lines,
            Self::Pixels(pixels) => pixels / PIXELS_PER_LINE,
        }
    }
}

/// Keys currently held down.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a press; returns false for auto-repeat of a held key.
    pub fn set_key_down(&mut self, key: KeyCode) -> bool {
        self.keys.insert(key)
    }

    pub fn set_key_up(&mut self, key: KeyCode) {
        self.keys.remove(&key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    /// Movement directions requested by the held keys, each at most once.
    pub fn held_movements(&self) -> Vec<CameraMovement> {
        let mut movements = Vec::new();
        for key in &self.keys {
            if let Some(Action::Move(direction)) = action_for_key(*key) {
                if !movements.contains(&direction) {
                    movements.push(direction);
                }
            }
        }
        movements
    }
}
