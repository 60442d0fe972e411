use glam::{Mat4, Vec3};
use glint_anim::{AnimatedValue, AnimationScheduler, Clock, RunningScheduler};
use glint_input::FrameSource;

use crate::camera::{FlyCamera, Projection};
use crate::device::{GraphicsDevice, PolygonMode};
use crate::error::RenderError;
use crate::pass::FramePass;
use crate::scene::{LitUniforms, MarkerUniforms, SceneConfig, SceneResources};

/// Per-frame snapshot of everything the passes read. Rebuilt every frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Seconds since the previous frame.
    pub dt: f32,
    /// Output of the `time` animation.
    pub time: f32,
    pub view: Mat4,
    pub projection: Mat4,
    pub eye: Vec3,
}

/// What one `render_frame` did.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    /// 1 for the first frame.
    pub frame: u64,
    pub dt: f32,
    pub time: f32,
    pub main_draws: u32,
    pub marker_draws: u32,
    pub eye: Vec3,
}

/// Owns the scene, the camera and the animation scheduler, and runs the
/// per-frame sequence against a device.
///
/// # Frame order
/// 1. clear, then the polygon mode if it changed
/// 2. animations, then camera
/// 3. lit pass: shared uniforms and lights, then every model and the ground
/// 4. marker pass: one unlit sphere per light
/// 5. finish (submit/present)
pub struct FrameRenderer<C: Clock> {
    scene: SceneResources,
    camera: FlyCamera,
    scheduler: RunningScheduler<C>,
    time: AnimatedValue,
    projection_params: Projection,
    projection: Mat4,
    polygon_mode: PolygonMode,
    /// What the device was last told; `None` before the first frame.
    applied_polygon_mode: Option<PolygonMode>,
    frames: u64,
}

impl<C: Clock> FrameRenderer<C> {
    /// Take ownership of a built scene and start the animation clock.
    ///
    /// Construct right before the frame loop: the scheduler's baseline is
    /// read here.
    pub fn new(
        scene: SceneResources,
        config: &SceneConfig,
        clock: C,
        width: u32,
        height: u32,
    ) -> Self {
        let mut scheduler = AnimationScheduler::new(clock).initialize();
        let time = AnimatedValue::new(0.0);
        let writer = time.clone();
        scheduler.add_animation("time", config.time_period, move |t| writer.set(t));

        Self {
            scene,
            camera: FlyCamera::new(&config.camera),
            scheduler,
            time,
            projection_params: config.projection,
            projection: config.projection.matrix(width, height),
            polygon_mode: if config.wireframe {
                PolygonMode::Line
            } else {
                PolygonMode::Fill
            },
            applied_polygon_mode: None,
            frames: 0,
        }
    }

    /// Build the scene's GPU resources, then `new`.
    pub fn build<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        config: &SceneConfig,
        clock: C,
        width: u32,
        height: u32,
    ) -> Result<Self, RenderError> {
        let scene = SceneResources::build(device, config)?;
        Ok(Self::new(scene, config, clock, width, height))
    }

    /// Render one frame. The window's `begin_frame` must already have been
    /// called for it.
    pub fn render_frame<D, W>(&mut self, device: &mut D, window: &mut W) -> FrameStats
    where
        D: GraphicsDevice + ?Sized,
        W: FrameSource + ?Sized,
    {
        self.frames += 1;
        let _span = tracing::info_span!("frame", n = self.frames).entered();

        let dt = window.elapsed_since_last_frame();
        device.clear(self.scene.background_color);
        if self.applied_polygon_mode != Some(self.polygon_mode) {
            device.set_polygon_mode(self.polygon_mode);
            self.applied_polygon_mode = Some(self.polygon_mode);
        }

        self.scheduler.update();
        self.camera.update(window, dt);
        let ctx = FrameContext {
            dt,
            time: self.time.get(),
            view: self.camera.transform(),
            projection: self.projection,
            eye: self.camera.position(),
        };

        let main_draws = self.main_pass(device, &ctx);
        let marker_draws = self.marker_pass(device, &ctx);
        device.finish_frame();

        tracing::trace!(dt, time = ctx.time, main_draws, marker_draws, "frame done");
        FrameStats {
            frame: self.frames,
            dt,
            time: ctx.time,
            main_draws,
            marker_draws,
            eye: ctx.eye,
        }
    }

    fn main_pass<D: GraphicsDevice + ?Sized>(&self, device: &mut D, ctx: &FrameContext) -> u32 {
        let scene = &self.scene;
        let lit = &scene.lit;
        let mut pass = FramePass::begin(device, lit.program).upload(&LitUniforms {
            program: lit,
            lights: scene.lights(),
            time: ctx.time,
            view: ctx.view,
            projection: ctx.projection,
            view_pos: ctx.eye,
            object_color: scene.object_color,
        });

        for placed in &scene.models {
            pass.set(&lit.model, placed.transform);
            placed
                .model
                .draw(&mut pass, &lit.diffuse_texture, &lit.object_color, scene.object_color);
        }
        if let Some(ground) = &scene.ground {
            ground.draw(&mut pass, lit);
        }
        pass.finish()
    }

    fn marker_pass<D: GraphicsDevice + ?Sized>(&self, device: &mut D, ctx: &FrameContext) -> u32 {
        let scene = &self.scene;
        let unlit = &scene.unlit;
        let mut pass = FramePass::begin(device, unlit.program).upload(&MarkerUniforms {
            program: unlit,
            view: ctx.view,
            projection: ctx.projection,
        });

        for light in scene.lights().lights() {
            pass.set(&unlit.object_color, light.display_color);
            pass.set(&unlit.model, scene.marker_transform(light.position));
            pass.draw(&scene.marker);
        }
        pass.finish()
    }

    /// Render frames until the window asks to close. Returns the number of
    /// frames rendered.
    pub fn run<D, W>(&mut self, device: &mut D, window: &mut W) -> u64
    where
        D: GraphicsDevice + ?Sized,
        W: FrameSource + ?Sized,
    {
        let mut rendered = 0;
        while !window.should_close() {
            window.begin_frame();
            self.render_frame(device, window);
            rendered += 1;
        }
        tracing::info!(frames = rendered, "frame loop finished");
        rendered
    }

    /// Recompute the projection for a new framebuffer size.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.projection = self.projection_params.matrix(width, height);
        tracing::debug!(width, height, "projection updated");
    }

    /// Switch between wireframe and filled drawing from the next frame on.
    pub fn set_wireframe(&mut self, on: bool) {
        self.polygon_mode = if on {
            PolygonMode::Line
        } else {
            PolygonMode::Fill
        };
        tracing::debug!(mode = ?self.polygon_mode, "polygon mode changed");
    }

    pub fn wireframe(&self) -> bool {
        self.polygon_mode == PolygonMode::Line
    }

    pub fn camera(&self) -> &FlyCamera {
        &self.camera
    }

    pub fn scene(&self) -> &SceneResources {
        &self.scene
    }

    /// Lights may be moved between frames through here.
    pub fn scene_mut(&mut self) -> &mut SceneResources {
        &mut self.scene
    }

    /// Register further animations. They run after the `time` animation.
    pub fn scheduler_mut(&mut self) -> &mut RunningScheduler<C> {
        &mut self.scheduler
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Release the scene's GPU resources.
    pub fn destroy<D: GraphicsDevice + ?Sized>(self, device: &mut D) {
        self.scene.destroy(device);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::UniformValue;
    use crate::recording::{GpuCommand, RecordingDevice};
    use glint_anim::ManualClock;
    use glint_input::{HeadlessWindow, MoveKey};

    fn renderer(dev: &mut RecordingDevice, clock: ManualClock) -> FrameRenderer<ManualClock> {
        FrameRenderer::build(dev, &SceneConfig::procedural(), clock, 1280, 720).unwrap()
    }

    #[test]
    fn two_lights_two_markers_and_light_count_before_first_draw() {
        let mut dev = RecordingDevice::new();
        let mut fr = renderer(&mut dev, ManualClock::new());
        let (lit, unlit) = (fr.scene().lit.program, fr.scene().unlit.program);
        dev.clear_commands();

        let mut window = HeadlessWindow::fixed(0.016, 1);
        window.begin_frame();
        let stats = fr.render_frame(&mut dev, &mut window);
        assert_eq!(stats.marker_draws, 2);
        assert_eq!(stats.main_draws, 1);

        let cmds = dev.commands();
        assert_eq!(dev.draws_with(unlit), 2);

        let num_lights: Vec<usize> = cmds
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                matches!(c, GpuCommand::SetUniform { name, .. } if name == "numLights")
            })
            .map(|(i, _)| i)
            .collect();
        assert_eq!(num_lights.len(), 1);
        assert!(matches!(
            &cmds[num_lights[0]],
            GpuCommand::SetUniform { program, value: UniformValue::Int(2), .. } if *program == lit
        ));

        let first_main_draw = cmds
            .iter()
            .position(|c| matches!(c, GpuCommand::Draw { program, .. } if *program == lit))
            .unwrap();
        assert!(num_lights[0] < first_main_draw);

        // Every light field is in place before the first main draw too.
        let light_uploads = cmds[..first_main_draw]
            .iter()
            .filter(|c| {
                matches!(c, GpuCommand::SetUniform { name, .. } if name.starts_with("pointLights["))
            })
            .count();
        assert_eq!(light_uploads, 2 * 8);
    }

    #[test]
    fn frame_order_is_clear_update_main_markers_finish() {
        let mut dev = RecordingDevice::new();
        let mut fr = renderer(&mut dev, ManualClock::new());
        let (lit, unlit) = (fr.scene().lit.program, fr.scene().unlit.program);
        dev.clear_commands();

        let mut window = HeadlessWindow::fixed(0.016, 1);
        window.begin_frame();
        fr.render_frame(&mut dev, &mut window);

        let cmds = dev.commands();
        assert!(matches!(cmds[0], GpuCommand::Clear(_)));
        assert_eq!(cmds[1], GpuCommand::SetPolygonMode(PolygonMode::Fill));
        assert_eq!(cmds[2], GpuCommand::UseProgram(lit));
        let unlit_at = cmds
            .iter()
            .position(|c| *c == GpuCommand::UseProgram(unlit))
            .unwrap();
        assert!(
            cmds[..unlit_at]
                .iter()
                .all(|c| !matches!(c, GpuCommand::Draw { program, .. } if *program == unlit))
        );
        assert!(
            cmds[unlit_at..]
                .iter()
                .all(|c| !matches!(c, GpuCommand::Draw { program, .. } if *program == lit))
        );
        assert_eq!(cmds.last(), Some(&GpuCommand::FinishFrame));
    }

    #[test]
    fn wireframe_mode_is_sent_once_and_again_after_a_toggle() {
        let mut dev = RecordingDevice::new();
        let config = SceneConfig {
            wireframe: true,
            ..SceneConfig::procedural()
        };
        let mut fr = FrameRenderer::build(&mut dev, &config, ManualClock::new(), 640, 480).unwrap();
        assert!(fr.wireframe());
        let mode_changes = |dev: &RecordingDevice| -> Vec<PolygonMode> {
            dev.commands()
                .iter()
                .filter_map(|c| match c {
                    GpuCommand::SetPolygonMode(mode) => Some(*mode),
                    _ => None,
                })
                .collect()
        };

        let mut window = HeadlessWindow::fixed(0.016, 4);
        for _ in 0..2 {
            window.begin_frame();
            fr.render_frame(&mut dev, &mut window);
        }
        assert_eq!(mode_changes(&dev), vec![PolygonMode::Line]);
        assert_eq!(dev.polygon_mode(), PolygonMode::Line);

        fr.set_wireframe(false);
        for _ in 0..2 {
            window.begin_frame();
            fr.render_frame(&mut dev, &mut window);
        }
        assert_eq!(mode_changes(&dev), vec![PolygonMode::Line, PolygonMode::Fill]);
        assert_eq!(dev.polygon_mode(), PolygonMode::Fill);
    }

    #[test]
    fn markers_use_light_position_and_display_color() {
        let mut dev = RecordingDevice::new();
        let mut fr = renderer(&mut dev, ManualClock::new());
        let unlit = fr.scene().unlit.program;
        let mut window = HeadlessWindow::fixed(0.016, 1);
        window.begin_frame();
        fr.render_frame(&mut dev, &mut window);

        // Values left behind are the last light's.
        let model = dev.uniform_by_name(unlit, "model");
        let expected = fr.scene().marker_transform(Vec3::new(5.0, 1.0, 2.0));
        assert_eq!(model, Some(UniformValue::Mat4(expected)));
        assert_eq!(
            dev.uniform_by_name(unlit, "objectColor"),
            Some(UniformValue::Vec3(Vec3::new(1.0, 1.0, 0.7)))
        );
    }

    #[test]
    fn time_uniform_follows_the_clock() {
        let mut dev = RecordingDevice::new();
        let clock = ManualClock::new();
        let mut fr = renderer(&mut dev, clock.clone());
        let lit = fr.scene().lit.program;
        let mut window = HeadlessWindow::fixed(0.5, 3);

        for t in [0.0, 1.0, 2.0] {
            clock.set_secs(t);
            window.begin_frame();
            let stats = fr.render_frame(&mut dev, &mut window);
            assert_eq!(stats.time, t);
            assert_eq!(dev.uniform_by_name(lit, "time"), Some(UniformValue::Float(t)));
        }
        assert_eq!(fr.frames(), 3);
    }

    #[test]
    fn camera_moves_by_window_dt_and_view_pos_follows() {
        let mut dev = RecordingDevice::new();
        let mut fr = renderer(&mut dev, ManualClock::new());
        let lit = fr.scene().lit.program;
        let mut window = HeadlessWindow::fixed(0.5, 2);
        window.input.press(MoveKey::Forward);

        let rendered = fr.run(&mut dev, &mut window);
        assert_eq!(rendered, 2);
        assert_eq!(dev.frames_finished(), 2);
        // 2 frames * 0.5 s * 3 units/s along -Z from z = 5.
        let eye = fr.camera().position();
        assert!((eye - Vec3::new(0.0, 1.5, 2.0)).length() < 1e-5);
        assert_eq!(dev.uniform_by_name(lit, "viewPos"), Some(UniformValue::Vec3(eye)));
    }

    #[test]
    fn resize_changes_projection_upload() {
        let mut dev = RecordingDevice::new();
        let mut fr = renderer(&mut dev, ManualClock::new());
        let lit = fr.scene().lit.program;
        let before = fr.projection();
        fr.resize(800, 800);
        assert_ne!(fr.projection(), before);

        let mut window = HeadlessWindow::fixed(0.016, 1);
        window.begin_frame();
        fr.render_frame(&mut dev, &mut window);
        assert_eq!(
            dev.uniform_by_name(lit, "projection"),
            Some(UniformValue::Mat4(fr.projection()))
        );
    }

    #[test]
    fn moved_light_moves_its_marker() {
        let mut dev = RecordingDevice::new();
        let mut fr = renderer(&mut dev, ManualClock::new());
        let unlit = fr.scene().unlit.program;
        assert!(fr.scene_mut().set_light_position(1, Vec3::new(0.0, 4.0, 0.0)));
        assert!(!fr.scene_mut().set_light_position(9, Vec3::ZERO));

        let mut window = HeadlessWindow::fixed(0.016, 1);
        window.begin_frame();
        fr.render_frame(&mut dev, &mut window);
        let expected = fr.scene().marker_transform(Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(dev.uniform_by_name(unlit, "model"), Some(UniformValue::Mat4(expected)));
    }

    #[test]
    fn destroy_releases_scene() {
        let mut dev = RecordingDevice::new();
        let fr = renderer(&mut dev, ManualClock::new());
        fr.destroy(&mut dev);
        assert_eq!(dev.live_programs(), 0);
        assert_eq!(dev.live_buffers(), 0);
    }
}
