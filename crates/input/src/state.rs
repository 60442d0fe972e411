use glam::Vec2;

use crate::InputSource;

/// Camera movement controls, independent of the physical key layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MoveKey {
    Forward,
    Backward,
    Left,
    Right,
    Up,
    Down,
    /// Speed multiplier while held.
    Boost,
}

impl MoveKey {
    pub const ALL: [MoveKey; 7] = [
        MoveKey::Forward,
        MoveKey::Backward,
        MoveKey::Left,
        MoveKey::Right,
        MoveKey::Up,
        MoveKey::Down,
        MoveKey::Boost,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// Accumulated input between two camera updates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputState {
    look: Vec2,
    held: [bool; MoveKey::ALL.len()],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_held(&mut self, key: MoveKey, held: bool) {
        self.held[key.index()] = held;
    }

    pub fn press(&mut self, key: MoveKey) {
        self.set_held(key, true);
    }

    pub fn release(&mut self, key: MoveKey) {
        self.set_held(key, false);
    }

    /// Release every key, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.held = Default::default();
    }

    /// Add raw pointer motion (pixels; +x right, +y down).
    pub fn add_look(&mut self, delta: Vec2) {
        self.look += delta;
    }

    pub fn pending_look(&self) -> Vec2 {
        self.look
    }
}

impl InputSource for InputState {
    fn take_look_delta(&mut self) -> Vec2 {
        std::mem::take(&mut self.look)
    }

    fn is_held(&self, key: MoveKey) -> bool {
        self.held[key.index()]
    }
}
