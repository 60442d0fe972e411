//! Render-frame core: geometry buffers, point-light uniforms, the fly camera
//! and the per-frame pass sequence.
//!
//! Everything here talks to the GPU through the `GraphicsDevice` trait. The
//! wgpu backend lives in `glint-render-wgpu`; `RecordingDevice` records
//! calls instead, for tests and headless runs.
//!
//! # Invariants
//! - Geometry is validated before any GPU allocation and never mutated after.
//! - Uniform names are resolved once per program, never per frame.
//! - A pass can only draw after its uniforms are uploaded (`FramePass`).
//! - `numLights` always equals the number of uploaded lights.
//! - Light markers are drawn with the unlit program, after the lit pass.

mod camera;
mod device;
mod error;
mod frame;
mod geometry;
mod light;
mod model;
mod pass;
mod program;
mod recording;
mod scene;
pub mod shaders;
mod texture;
mod uniform;

pub use camera::{CameraConfig, FlyCamera, PITCH_LIMIT_DEGREES, Projection};
pub use device::{
    BufferId, BufferKind, GraphicsDevice, PolygonMode, ProgramId, ShaderId, ShaderStage,
    TextureId, UniformLocation, UniformValue, VertexArrayId, VertexFormat,
};
pub use error::RenderError;
pub use frame::{FrameContext, FrameRenderer, FrameStats};
pub use geometry::{GeometryBuffer, NORMAL_SLOT, POSITION_SLOT, TEX_COORD_SLOT};
pub use light::{
    Attenuation, LightBindings, LightField, LightRow, LightSet, PointLight, light_uniform_name,
};
pub use model::Model;
pub use pass::{FramePass, PassUniforms, ReadyPass};
pub use program::build_program;
pub use recording::{GpuCommand, RecordingDevice};
pub use scene::{
    Drawable, GroundConfig, LitProgram, LitUniforms, MarkerConfig, MarkerUniforms, ModelConfig,
    PlacedModel, SceneConfig, SceneResources, UnlitProgram,
};
pub use texture::Texture;
pub use uniform::{
    ShaderSource, StructLayout, UniformBinding, UniformEntry, UniformKind, UniformLayout,
    UniformLayoutBuilder,
};

pub fn crate_info() -> &'static str {
    "glint-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
