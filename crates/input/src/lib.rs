//! Window and input collaborator interface.
//!
//! The renderer core never talks to a windowing system. It sees a
//! `FrameSource` that reports frame timing and close requests, and an
//! `InputSource` that reports look deltas and held movement keys.
//!
//! # Invariants
//! - Look deltas accumulate between reads and are consumed by the read.
//! - Key state is level-triggered: a key is held until it is released.

mod headless;
mod state;

pub use headless::HeadlessWindow;
pub use state::{InputState, MoveKey};

use glam::Vec2;

/// Raw input as the camera consumes it.
pub trait InputSource {
    /// Look movement accumulated since the previous call, in pixels.
    /// Reading resets the accumulator.
    fn take_look_delta(&mut self) -> Vec2;

    fn is_held(&self, key: MoveKey) -> bool;
}

/// Frame timing and lifetime of the window.
pub trait FrameSource: InputSource {
    /// Start a frame: samples the frame clock (and, for real windows, the
    /// event queue has already been drained by the caller).
    fn begin_frame(&mut self);

    /// Seconds between the two most recent `begin_frame` calls.
    fn elapsed_since_last_frame(&self) -> f32;

    fn should_close(&self) -> bool;
}

pub fn crate_info() -> &'static str {
    "glint-input v0.1.0"
}
