//! Phase tokens for one program's share of a frame.
//!
//! `FramePass::begin` activates a program. The pending pass can only be
//! turned into a `ReadyPass` by uploading the pass uniforms, and only a
//! `ReadyPass` can draw. A draw that would read uniforms nobody set cannot
//! be written.

use crate::device::{GraphicsDevice, ProgramId, UniformValue};
use crate::geometry::GeometryBuffer;
use crate::texture::Texture;
use crate::uniform::UniformBinding;

/// The uniforms a pass needs before its first draw.
pub trait PassUniforms {
    /// Push every uniform into the current program.
    fn upload<D: GraphicsDevice + ?Sized>(&self, device: &mut D);
}

/// A program is active but its uniforms have not been uploaded.
#[must_use = "a pass draws nothing until its uniforms are uploaded"]
pub struct FramePass<'d, D: GraphicsDevice + ?Sized> {
    device: &'d mut D,
    program: ProgramId,
}

impl<'d, D: GraphicsDevice + ?Sized> FramePass<'d, D> {
    pub fn begin(device: &'d mut D, program: ProgramId) -> Self {
        device.use_program(program);
        Self { device, program }
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn upload(self, uniforms: &impl PassUniforms) -> ReadyPass<'d, D> {
        uniforms.upload(&mut *self.device);
        ReadyPass {
            device: self.device,
            program: self.program,
            draw_calls: 0,
        }
    }
}

/// A pass whose shared uniforms are in place. Per-draw uniforms (the model
/// matrix, a marker color) are set with `set` between draws.
pub struct ReadyPass<'d, D: GraphicsDevice + ?Sized> {
    device: &'d mut D,
    program: ProgramId,
    draw_calls: u32,
}

impl<D: GraphicsDevice + ?Sized> ReadyPass<'_, D> {
    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn set(&mut self, binding: &UniformBinding, value: impl Into<UniformValue>) {
        binding.set(&mut *self.device, value);
    }

    pub fn bind_texture(&mut self, texture: &Texture, unit: u32) {
        texture.bind(&mut *self.device, unit);
    }

    /// Point `sampler` at the unit `texture` is bound to.
    pub fn set_sampler(&mut self, texture: &Texture, sampler: &UniformBinding) {
        texture.set_uniform(&mut *self.device, sampler);
    }

    pub fn unbind_texture(&mut self, texture: &Texture) {
        texture.unbind(&mut *self.device);
    }

    pub fn draw(&mut self, geometry: &GeometryBuffer) {
        self.device
            .draw_indexed(geometry.vertex_array(), geometry.index_count());
        self.draw_calls += 1;
    }

    pub fn draw_calls(&self) -> u32 {
        self.draw_calls
    }

    /// End the pass, returning the number of draws issued.
    pub fn finish(self) -> u32 {
        self.draw_calls
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::build_program;
    use crate::recording::{GpuCommand, RecordingDevice};
    use crate::shaders;
    use glam::Vec3;
    use glint_assets::primitives;

    struct Color(UniformBinding, Vec3);

    impl PassUniforms for Color {
        fn upload<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
            self.0.set(device, self.1);
        }
    }

    #[test]
    fn begin_activates_and_upload_precedes_draw() {
        let mut dev = RecordingDevice::new();
        let program = build_program(&mut dev, &shaders::unlit_source()).unwrap();
        let geo = GeometryBuffer::build(&mut dev, &primitives::sphere(4, 3).unwrap()).unwrap();
        let color = Color(UniformBinding::resolve(&dev, program, "objectColor"), Vec3::X);
        dev.clear_commands();

        let mut pass = FramePass::begin(&mut dev, program).upload(&color);
        pass.draw(&geo);
        pass.draw(&geo);
        assert_eq!(pass.finish(), 2);

        let cmds = dev.commands();
        assert_eq!(cmds[0], GpuCommand::UseProgram(program));
        assert!(matches!(&cmds[1], GpuCommand::SetUniform { name, .. } if name == "objectColor"));
        assert!(matches!(
            cmds[2],
            GpuCommand::Draw { index_count, .. } if index_count == geo.index_count()
        ));
        assert_eq!(cmds.len(), 4);
    }

    #[test]
    fn pass_works_through_a_trait_object() {
        let mut dev = RecordingDevice::new();
        let program = build_program(&mut dev, &shaders::unlit_source()).unwrap();
        let color = Color(UniformBinding::resolve(&dev, program, "objectColor"), Vec3::Y);
        let device: &mut dyn GraphicsDevice = &mut dev;
        let pass = FramePass::begin(device, program).upload(&color);
        assert_eq!(pass.program(), program);
        assert_eq!(pass.draw_calls(), 0);
        drop(pass);
        assert_eq!(
            dev.uniform_by_name(program, "objectColor"),
            Some(UniformValue::Vec3(Vec3::Y))
        );
    }
}
