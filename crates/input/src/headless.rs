use std::collections::VecDeque;

use glam::Vec2;

use crate::{FrameSource, InputSource, InputState, MoveKey};

/// A scripted window for tests and headless runs.
///
/// Each `begin_frame` pops the next frame time from the script. Once the
/// script runs dry the last popped time repeats. The window asks to close
/// after `frame_limit` frames.
#[derive(Debug, Clone)]
pub struct HeadlessWindow {
    frame_times: VecDeque<f32>,
    last_dt: f32,
    current_dt: f32,
    frames_begun: u64,
    frame_limit: u64,
    pub input: InputState,
}

impl HeadlessWindow {
    /// A window that runs `frame_limit` frames of `dt` seconds each.
    pub fn fixed(dt: f32, frame_limit: u64) -> Self {
        Self::scripted(std::iter::empty(), dt, frame_limit)
    }

    /// `fallback_dt` is only used when `script` is empty.
    pub fn scripted(
        script: impl IntoIterator<Item = f32>,
        fallback_dt: f32,
        frame_limit: u64,
    ) -> Self {
        Self {
            frame_times: script.into_iter().collect(),
            last_dt: fallback_dt,
            current_dt: 0.0,
            frames_begun: 0,
            frame_limit,
            input: InputState::new(),
        }
    }

    pub fn frames_begun(&self) -> u64 {
        self.frames_begun
    }
}

impl InputSource for HeadlessWindow {
    fn take_look_delta(&mut self) -> Vec2 {
        self.input.take_look_delta()
    }

    fn is_held(&self, key: MoveKey) -> bool {
        self.input.is_held(key)
    }
}

impl FrameSource for HeadlessWindow {
    fn begin_frame(&mut self) {
        let dt = self.frame_times.pop_front().unwrap_or(self.last_dt);
        self.last_dt = dt;
        self.current_dt = dt;
        self.frames_begun += 1;
    }

    fn elapsed_since_last_frame(&self) -> f32 {
        self.current_dt
    }

    fn should_close(&self) -> bool {
        self.frames_begun >= self.frame_limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_then_fallback() {
        let mut win = HeadlessWindow::scripted([0.5, 0.25], 0.1, 10);
        assert_eq!(win.elapsed_since_last_frame(), 0.0);
        win.begin_frame();
        assert_eq!(win.elapsed_since_last_frame(), 0.5);
        win.begin_frame();
        assert_eq!(win.elapsed_since_last_frame(), 0.25);
        win.begin_frame();
        assert_eq!(win.elapsed_since_last_frame(), 0.25);
    }

    #[test]
    fn closes_after_frame_limit() {
        let mut win = HeadlessWindow::fixed(1.0 / 60.0, 2);
        assert!(!win.should_close());
        win.begin_frame();
        assert!(!win.should_close());
        win.begin_frame();
        assert!(win.should_close());
        assert_eq!(win.frames_begun(), 2);
    }

    #[test]
    fn input_passes_through() {
        let mut win = HeadlessWindow::fixed(0.1, 1);
        win.input.press(MoveKey::Left);
        win.input.add_look(Vec2::X);
        assert!(win.is_held(MoveKey::Left));
        assert_eq!(win.take_look_delta(), Vec2::X);
    }
}
