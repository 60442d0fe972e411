use glam::{Mat4, Vec3};
use glint_input::{InputSource, MoveKey};
use serde::{Deserialize, Serialize};

/// Pitch stays strictly inside vertical so the look-at basis never flips.
pub const PITCH_LIMIT_DEGREES: f32 = 89.0;

/// Starting state and tuning of a `FlyCamera`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub eye: Vec3,
    /// Degrees. 0 looks down -Z, positive turns right.
    pub yaw: f32,
    /// Degrees. Positive looks up.
    pub pitch: f32,
    /// Units per second.
    pub speed: f32,
    /// Speed multiplier while `MoveKey::Boost` is held.
    pub boost: f32,
    /// Degrees per pixel of look movement.
    pub sensitivity: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 1.5, 5.0),
            yaw: 0.0,
            pitch: 0.0,
            speed: 3.0,
            boost: 3.0,
            sensitivity: 0.1,
        }
    }
}

/// First-person camera driven by look deltas and held movement keys.
///
/// `update` is the only mutator. `transform` and `position` are pure reads
/// of the state the last `update` left behind.
#[derive(Debug, Clone, PartialEq)]
pub struct FlyCamera {
    position: Vec3,
    yaw: f32,
    pitch: f32,
    speed: f32,
    boost: f32,
    sensitivity: f32,
    view: Mat4,
}

impl FlyCamera {
    pub fn new(config: &CameraConfig) -> Self {
        let limit = PITCH_LIMIT_DEGREES.to_radians();
        let mut camera = Self {
            position: config.eye,
            yaw: config.yaw.to_radians(),
            pitch: config.pitch.to_radians().clamp(-limit, limit),
            speed: config.speed,
            boost: config.boost,
            sensitivity: config.sensitivity.to_radians(),
            view: Mat4::IDENTITY,
        };
        camera.view = camera.compute_view();
        camera
    }

    /// Unit view direction.
    pub fn forward(&self) -> Vec3 {
        Vec3::new(
            self.pitch.cos() * self.yaw.sin(),
            self.pitch.sin(),
            -self.pitch.cos() * self.yaw.cos(),
        )
    }

    pub fn right(&self) -> Vec3 {
        self.forward().cross(Vec3::Y).normalize()
    }

    /// Consume pending input and advance `dt` seconds.
    ///
    /// Look deltas turn the camera regardless of `dt`; movement covers
    /// `speed * dt` units along the normalized sum of the held directions.
    pub fn update(&mut self, input: &mut (impl InputSource + ?Sized), dt: f32) {
        let look = input.take_look_delta();
        if look != glam::Vec2::ZERO {
            let limit = PITCH_LIMIT_DEGREES.to_radians();
            self.yaw += look.x * self.sensitivity;
            self.pitch = (self.pitch - look.y * self.sensitivity).clamp(-limit, limit);
        }

        let forward = self.forward();
        let right = self.right();
        let mut direction = Vec3::ZERO;
        for (key, axis) in [
            (MoveKey::Forward, forward),
            (MoveKey::Backward, -forward),
            (MoveKey::Right, right),
            (MoveKey::Left, -right),
            (MoveKey::Up, Vec3::Y),
            (MoveKey::Down, -Vec3::Y),
        ] {
            if input.is_held(key) {
                direction += axis;
            }
        }

        if let Some(direction) = direction.try_normalize() {
            let speed = if input.is_held(MoveKey::Boost) {
                self.speed * self.boost
            } else {
                self.speed
            };
            self.position += direction * speed * dt;
        }

        self.view = self.compute_view();
    }

    /// The view transform as of the last `update`.
    pub fn transform(&self) -> Mat4 {
        self.view
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Degrees.
    pub fn yaw(&self) -> f32 {
        self.yaw.to_degrees()
    }

    /// Degrees.
    pub fn pitch(&self) -> f32 {
        self.pitch.to_degrees()
    }

    fn compute_view(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.forward(), Vec3::Y)
    }
}

/// Perspective projection parameters. Static until the window is resized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Projection {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov: 60.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self, width: u32, height: u32) -> Mat4 {
        let aspect = width.max(1) as f32 / height.max(1) as f32;
        Mat4::perspective_rh(self.fov.to_radians(), aspect, self.near, self.far)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use glint_input::InputState;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).length() < 1e-5, "{a} != {b}");
    }

    #[test]
    fn zero_dt_leaves_camera_unchanged() {
        let mut cam = FlyCamera::new(&CameraConfig::default());
        let before = cam.clone();
        let mut input = InputState::new();
        input.press(MoveKey::Forward);
        input.press(MoveKey::Left);
        for _ in 0..10 {
            cam.update(&mut input, 0.0);
        }
        assert_eq!(cam, before);
    }

    #[test]
    fn forward_for_one_second_moves_speed_units() {
        let mut cam = FlyCamera::new(&CameraConfig::default());
        assert_vec_eq(cam.forward(), Vec3::new(0.0, 0.0, -1.0));
        let mut input = InputState::new();
        input.press(MoveKey::Forward);
        cam.update(&mut input, 1.0);
        assert_vec_eq(cam.position(), Vec3::new(0.0, 1.5, 2.0));
    }

    #[test]
    fn diagonal_movement_is_not_faster() {
        let mut cam = FlyCamera::new(&CameraConfig::default());
        let mut input = InputState::new();
        input.press(MoveKey::Forward);
        input.press(MoveKey::Right);
        cam.update(&mut input, 1.0);
        let moved = cam.position() - CameraConfig::default().eye;
        assert!((moved.length() - 3.0).abs() < 1e-5);
        assert!(moved.x > 0.0 && moved.z < 0.0);
    }

    #[test]
    fn boost_multiplies_speed() {
        let mut cam = FlyCamera::new(&CameraConfig::default());
        let mut input = InputState::new();
        input.press(MoveKey::Up);
        input.press(MoveKey::Boost);
        cam.update(&mut input, 0.5);
        assert_vec_eq(cam.position(), Vec3::new(0.0, 1.5 + 4.5, 5.0));
    }

    #[test]
    fn pitch_clamps_at_limit() {
        let mut cam = FlyCamera::new(&CameraConfig::default());
        let mut input = InputState::new();
        // 0.1 deg/px: 2000 px up is 200 degrees.
        input.add_look(Vec2::new(0.0, -2000.0));
        cam.update(&mut input, 0.016);
        assert!((cam.pitch() - PITCH_LIMIT_DEGREES).abs() < 1e-3);
        assert!(cam.forward().y > 0.99);

        input.add_look(Vec2::new(0.0, 4000.0));
        cam.update(&mut input, 0.016);
        assert!((cam.pitch() + PITCH_LIMIT_DEGREES).abs() < 1e-3);
        assert!(!cam.transform().is_nan());
    }

    #[test]
    fn look_delta_turns_and_is_consumed() {
        let mut cam = FlyCamera::new(&CameraConfig::default());
        let mut input = InputState::new();
        input.add_look(Vec2::new(900.0, 0.0));
        cam.update(&mut input, 0.0);
        assert!((cam.yaw() - 90.0).abs() < 1e-3);
        assert_vec_eq(cam.forward(), Vec3::X);
        cam.update(&mut input, 0.0);
        assert!((cam.yaw() - 90.0).abs() < 1e-3);
    }

    #[test]
    fn transform_looks_along_forward() {
        let cam = FlyCamera::new(&CameraConfig::default());
        let view = cam.transform();
        // A point straight ahead lands on the -Z axis in view space.
        let ahead = view.transform_point3(cam.position() + cam.forward() * 4.0);
        assert_vec_eq(ahead, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(view, cam.transform());
    }

    #[test]
    fn projection_handles_zero_height() {
        let m = Projection::default().matrix(1280, 0);
        assert!(!m.is_nan());
    }
}
