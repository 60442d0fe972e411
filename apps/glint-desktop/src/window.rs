use std::time::Instant;

use glam::Vec2;
use glint_input::{FrameSource, InputSource, InputState, MoveKey};
use winit::keyboard::KeyCode;

/// Longest frame the camera integrates; slower frames are clamped.
const MAX_FRAME_SECS: f32 = 0.1;

pub fn move_key(code: KeyCode) -> Option<MoveKey> {
    match code {
        KeyCode::KeyW => Some(MoveKey::Forward),
        KeyCode::KeyS => Some(MoveKey::Backward),
        KeyCode::KeyA => Some(MoveKey::Left),
        KeyCode::KeyD => Some(MoveKey::Right),
        KeyCode::Space => Some(MoveKey::Up),
        KeyCode::ControlLeft => Some(MoveKey::Down),
        KeyCode::ShiftLeft => Some(MoveKey::Boost),
        _ => None,
    }
}

/// Window events folded into the state the frame loop polls.
#[derive(Debug, Default)]
pub struct WindowInput {
    input: InputState,
    last_frame: Option<Instant>,
    dt: f32,
    look_captured: bool,
    close_requested: bool,
}

impl WindowInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&mut self, code: KeyCode, pressed: bool) {
        if code == KeyCode::Escape && pressed {
            self.close_requested = true;
        } else if let Some(key) = move_key(code) {
            self.input.set_held(key, pressed);
        }
    }

    /// Raw mouse motion only turns the camera while look is captured.
    pub fn mouse_motion(&mut self, dx: f64, dy: f64) {
        if self.look_captured {
            self.input.add_look(Vec2::new(dx as f32, dy as f32));
        }
    }

    pub fn set_look_captured(&mut self, captured: bool) {
        self.look_captured = captured;
    }

    pub fn look_captured(&self) -> bool {
        self.look_captured
    }

    /// Keys released while unfocused never report a release.
    pub fn focus_lost(&mut self) {
        self.input.release_all();
        self.look_captured = false;
    }

    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn frame_at(&mut self, now: Instant) {
        self.dt = self
            .last_frame
            .map(|last| (now - last).as_secs_f32().min(MAX_FRAME_SECS))
            .unwrap_or(0.0);
        self.last_frame = Some(now);
    }
}

impl InputSource for WindowInput {
    fn take_look_delta(&mut self) -> Vec2 {
        self.input.take_look_delta()
    }

    fn is_held(&self, key: MoveKey) -> bool {
        self.input.is_held(key)
    }
}

impl FrameSource for WindowInput {
    fn begin_frame(&mut self) {
        self.frame_at(Instant::now());
    }

    fn elapsed_since_last_frame(&self) -> f32 {
        self.dt
    }

    fn should_close(&self) -> bool {
        self.close_requested
    }
}
