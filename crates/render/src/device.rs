use glam::{Mat4, Vec3};
use glint_assets::{ImageData, WrapMode};

use crate::error::RenderError;
use crate::uniform::{ShaderSource, UniformKind};

macro_rules! handle {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u32);
    };
}

handle!(
    /// A compiled shader stage.
    ShaderId
);
handle!(
    /// A linked program (vertex + fragment stage).
    ProgramId
);
handle!(
    /// A GPU buffer holding one attribute channel or the indices.
    BufferId
);
handle!(
    /// Records which buffer feeds which attribute slot, plus the index buffer.
    VertexArrayId
);
handle!(TextureId);
handle!(
    /// A resolved uniform address. Only meaningful for the program it was
    /// resolved against.
    UniformLocation
);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// How triangles are rasterized.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PolygonMode {
    #[default]
    Fill,
    /// Edges only.
    Line,
}

/// Layout of one attribute slot. Attributes are tightly packed, one channel
/// per buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    Float32x2,
    Float32x3,
}

impl VertexFormat {
    pub fn components(self) -> u32 {
        match self {
            Self::Float32x2 => 2,
            Self::Float32x3 => 3,
        }
    }

    pub fn stride(self) -> u64 {
        self.components() as u64 * 4
    }
}

/// A typed value pushed into a uniform. Samplers take the texture unit as
/// an `Int`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Float(f32),
    Int(i32),
    Vec3(Vec3),
    Mat4(Mat4),
}

impl UniformValue {
    /// Whether a value of this variant can be stored in a uniform of `kind`.
    pub fn fits(&self, kind: UniformKind) -> bool {
        matches!(
            (self, kind),
            (Self::Float(_), UniformKind::Float)
                | (Self::Int(_), UniformKind::Int)
                | (Self::Int(_), UniformKind::Sampler)
                | (Self::Vec3(_), UniformKind::Vec3)
                | (Self::Mat4(_), UniformKind::Mat4)
        )
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<i32> for UniformValue {
    fn from(v: i32) -> Self {
        Self::Int(v)
    }
}

impl From<Vec3> for UniformValue {
    fn from(v: Vec3) -> Self {
        Self::Vec3(v)
    }
}

impl From<Mat4> for UniformValue {
    fn from(v: Mat4) -> Self {
        Self::Mat4(v)
    }
}

/// The graphics context the renderer drives.
///
/// The model is a single immediate-mode context: one program is current at
/// a time, uniform uploads go to the current program and persist until
/// overwritten, and draws use whatever state is current when they are
/// issued. Implementations are owned by the render thread.
pub trait GraphicsDevice {
    fn compile_shader(
        &mut self,
        source: &ShaderSource,
        stage: ShaderStage,
    ) -> Result<ShaderId, RenderError>;

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, RenderError>;

    fn use_program(&mut self, program: ProgramId);

    /// Resolve a uniform by name. `None` if the program has no such uniform.
    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation>;

    /// Set a uniform of the current program.
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    /// Read back what a program's uniform currently holds.
    fn uniform_value(&self, program: ProgramId, location: UniformLocation) -> Option<UniformValue>;

    /// Copy `contents` into a new GPU buffer. The slice is only borrowed for
    /// the duration of the call.
    fn create_buffer(&mut self, kind: BufferKind, contents: &[u8])
    -> Result<BufferId, RenderError>;

    fn create_vertex_array(&mut self) -> VertexArrayId;

    fn attach_vertex_buffer(
        &mut self,
        vertex_array: VertexArrayId,
        slot: u32,
        buffer: BufferId,
        format: VertexFormat,
    );

    fn attach_index_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId);

    fn create_texture(
        &mut self,
        image: &ImageData,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
    ) -> Result<TextureId, RenderError>;

    fn bind_texture(&mut self, unit: u32, texture: TextureId);

    fn unbind_texture(&mut self, unit: u32);

    /// Clear color and depth. Starts a frame.
    fn clear(&mut self, color: Vec3);

    /// Rasterization mode for every later draw, until changed again.
    fn set_polygon_mode(&mut self, mode: PolygonMode);

    /// Draw `index_count` indices of a vertex array as a triangle list with
    /// the current program.
    fn draw_indexed(&mut self, vertex_array: VertexArrayId, index_count: u32);

    /// Submit everything drawn since `clear` and present it.
    fn finish_frame(&mut self);

    fn delete_shader(&mut self, shader: ShaderId);
    fn delete_program(&mut self, program: ProgramId);
    fn delete_buffer(&mut self, buffer: BufferId);
    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId);
    fn delete_texture(&mut self, texture: TextureId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn values_fit_their_kinds() {
        assert!(UniformValue::Float(1.0).fits(UniformKind::Float));
        assert!(UniformValue::Int(0).fits(UniformKind::Sampler));
        assert!(UniformValue::Vec3(Vec3::ONE).fits(UniformKind::Vec3));
        assert!(!UniformValue::Float(1.0).fits(UniformKind::Int));
        assert!(!UniformValue::Mat4(Mat4::IDENTITY).fits(UniformKind::Vec3));
    }

    #[test]
    fn vertex_format_stride() {
        assert_eq!(VertexFormat::Float32x3.stride(), 12);
        assert_eq!(VertexFormat::Float32x2.stride(), 8);
    }
}
