//! A `GraphicsDevice` that records instead of rendering.
//!
//! Every call is appended to a command log, and each program keeps the
//! uniform values it was given, so the order of uploads and draws and the
//! values a shader would see can both be checked without a GPU. The CLI's
//! headless mode runs frames against it too.

use std::collections::{BTreeMap, HashMap, HashSet};

use glam::Vec3;
use glint_assets::{ImageData, WrapMode};

use crate::device::{
    BufferId, BufferKind, GraphicsDevice, PolygonMode, ProgramId, ShaderId, ShaderStage,
    TextureId, UniformLocation, UniformValue, VertexArrayId, VertexFormat,
};
use crate::error::RenderError;
use crate::uniform::{ShaderSource, UniformLayout};

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    CompileShader {
        shader: ShaderId,
        label: String,
        stage: ShaderStage,
    },
    LinkProgram {
        program: ProgramId,
        vertex: ShaderId,
        fragment: ShaderId,
    },
    UseProgram(ProgramId),
    SetUniform {
        program: ProgramId,
        name: String,
        value: UniformValue,
    },
    CreateBuffer {
        buffer: BufferId,
        kind: BufferKind,
        bytes: usize,
    },
    CreateVertexArray(VertexArrayId),
    AttachVertexBuffer {
        vertex_array: VertexArrayId,
        slot: u32,
        buffer: BufferId,
        format: VertexFormat,
    },
    AttachIndexBuffer {
        vertex_array: VertexArrayId,
        buffer: BufferId,
    },
    CreateTexture {
        texture: TextureId,
        width: u32,
        height: u32,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
    },
    BindTexture {
        unit: u32,
        texture: TextureId,
    },
    UnbindTexture {
        unit: u32,
    },
    Clear(Vec3),
    SetPolygonMode(PolygonMode),
    Draw {
        program: ProgramId,
        vertex_array: VertexArrayId,
        index_count: u32,
    },
    FinishFrame,
    DeleteShader(ShaderId),
    DeleteProgram(ProgramId),
    DeleteBuffer(BufferId),
    DeleteVertexArray(VertexArrayId),
    DeleteTexture(TextureId),
}

#[derive(Debug)]
struct ShaderRecord {
    label: String,
    stage: ShaderStage,
    uniforms: UniformLayout,
}

#[derive(Debug)]
struct ProgramRecord {
    label: String,
    uniforms: UniformLayout,
    values: HashMap<UniformLocation, UniformValue>,
}

#[derive(Debug, Default)]
struct VertexArrayRecord {
    slots: BTreeMap<u32, (BufferId, VertexFormat)>,
    index: Option<BufferId>,
}

#[derive(Debug, Default)]
struct NextIds {
    shader: u32,
    program: u32,
    buffer: u32,
    vertex_array: u32,
    texture: u32,
}

fn bump(counter: &mut u32) -> u32 {
    *counter += 1;
    *counter
}

/// Records every call; see the module docs.
#[derive(Debug, Default)]
pub struct RecordingDevice {
    commands: Vec<GpuCommand>,
    ids: NextIds,
    shaders: HashMap<ShaderId, ShaderRecord>,
    programs: HashMap<ProgramId, ProgramRecord>,
    current: Option<ProgramId>,
    buffers: HashMap<BufferId, (BufferKind, Vec<u8>)>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayRecord>,
    textures: HashMap<TextureId, (u32, u32)>,
    bound_textures: BTreeMap<u32, TextureId>,
    polygon_mode: PolygonMode,
    frames_finished: u64,
    failing_labels: HashSet<String>,
    allocations_left: Option<usize>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make compiling any shader with this label fail.
    pub fn fail_compile(&mut self, label: impl Into<String>) {
        self.failing_labels.insert(label.into());
    }

    /// Let `count` more buffer or texture allocations succeed, then report
    /// out of memory.
    pub fn fail_allocation_after(&mut self, count: usize) {
        self.allocations_left = Some(count);
    }

    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    pub fn clear_commands(&mut self) {
        self.commands.clear();
    }

    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Draws recorded with `program` current.
    pub fn draws_with(&self, program: ProgramId) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, GpuCommand::Draw { program: p, .. } if *p == program))
            .count()
    }

    pub fn current_program(&self) -> Option<ProgramId> {
        self.current
    }

    pub fn program_label(&self, program: ProgramId) -> Option<&str> {
        self.programs.get(&program).map(|p| p.label.as_str())
    }

    /// What `program`'s uniform called `name` currently holds.
    pub fn uniform_by_name(&self, program: ProgramId, name: &str) -> Option<UniformValue> {
        let location = self.uniform_location(program, name)?;
        self.uniform_value(program, location)
    }

    pub fn buffer_contents(&self, buffer: BufferId) -> Option<&[u8]> {
        self.buffers.get(&buffer).map(|(_, bytes)| bytes.as_slice())
    }

    pub fn bound_texture(&self, unit: u32) -> Option<TextureId> {
        self.bound_textures.get(&unit).copied()
    }

    pub fn polygon_mode(&self) -> PolygonMode {
        self.polygon_mode
    }

    pub fn frames_finished(&self) -> u64 {
        self.frames_finished
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    fn allocate(&mut self, bytes: usize) -> Result<(), RenderError> {
        match &mut self.allocations_left {
            Some(0) => Err(RenderError::OutOfMemory { bytes }),
            Some(left) => {
                *left -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }
}

impl GraphicsDevice for RecordingDevice {
    fn compile_shader(
        &mut self,
        source: &ShaderSource,
        stage: ShaderStage,
    ) -> Result<ShaderId, RenderError> {
        if self.failing_labels.contains(&source.label) {
            return Err(RenderError::ShaderCompile {
                label: source.label.clone(),
                message: format!("{stage:?} stage rejected"),
            });
        }
        let shader = ShaderId(bump(&mut self.ids.shader));
        self.shaders.insert(
            shader,
            ShaderRecord {
                label: source.label.clone(),
                stage,
                uniforms: source.uniforms.clone(),
            },
        );
        self.commands.push(GpuCommand::CompileShader {
            shader,
            label: source.label.clone(),
            stage,
        });
        Ok(shader)
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, RenderError> {
        let (vs, fs) = match (self.shaders.get(&vertex), self.shaders.get(&fragment)) {
            (Some(vs), Some(fs)) => (vs, fs),
            (None, _) => return Err(RenderError::UnknownHandle { kind: "shader", id: vertex.0 }),
            (_, None) => return Err(RenderError::UnknownHandle { kind: "shader", id: fragment.0 }),
        };
        if vs.stage != ShaderStage::Vertex || fs.stage != ShaderStage::Fragment {
            return Err(RenderError::ProgramLink(format!(
                "expected vertex + fragment, got {:?} + {:?}",
                vs.stage, fs.stage
            )));
        }
        if vs.uniforms != fs.uniforms {
            return Err(RenderError::ProgramLink(format!(
                "uniform layouts of {:?} and {:?} disagree",
                vs.label, fs.label
            )));
        }
        let record = ProgramRecord {
            label: vs.label.clone(),
            uniforms: vs.uniforms.clone(),
            values: HashMap::new(),
        };
        let program = ProgramId(bump(&mut self.ids.program));
        self.programs.insert(program, record);
        self.commands.push(GpuCommand::LinkProgram {
            program,
            vertex,
            fragment,
        });
        Ok(program)
    }

    fn use_program(&mut self, program: ProgramId) {
        if self.programs.contains_key(&program) {
            self.current = Some(program);
            self.commands.push(GpuCommand::UseProgram(program));
        } else {
            tracing::warn!(?program, "use of unknown program ignored");
        }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs.get(&program)?.uniforms.location(name)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(program) = self.current else {
            tracing::warn!(?location, "uniform set with no program in use");
            return;
        };
        let Some(record) = self.programs.get_mut(&program) else {
            return;
        };
        let Some(entry) = record.uniforms.entry(location) else {
            tracing::warn!(?program, ?location, "uniform location out of range");
            return;
        };
        if !value.fits(entry.kind) {
            tracing::warn!(?program, name = %entry.name, ?value, "uniform type mismatch");
            return;
        }
        let name = entry.name.clone();
        record.values.insert(location, value);
        self.commands.push(GpuCommand::SetUniform {
            program,
            name,
            value,
        });
    }

    fn uniform_value(&self, program: ProgramId, location: UniformLocation) -> Option<UniformValue> {
        self.programs.get(&program)?.values.get(&location).copied()
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        contents: &[u8],
    ) -> Result<BufferId, RenderError> {
        self.allocate(contents.len())?;
        let buffer = BufferId(bump(&mut self.ids.buffer));
        self.buffers.insert(buffer, (kind, contents.to_vec()));
        self.commands.push(GpuCommand::CreateBuffer {
            buffer,
            kind,
            bytes: contents.len(),
        });
        Ok(buffer)
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        let vertex_array = VertexArrayId(bump(&mut self.ids.vertex_array));
        self.vertex_arrays
            .insert(vertex_array, VertexArrayRecord::default());
        self.commands.push(GpuCommand::CreateVertexArray(vertex_array));
        vertex_array
    }

    fn attach_vertex_buffer(
        &mut self,
        vertex_array: VertexArrayId,
        slot: u32,
        buffer: BufferId,
        format: VertexFormat,
    ) {
        if let Some(record) = self.vertex_arrays.get_mut(&vertex_array) {
            record.slots.insert(slot, (buffer, format));
            self.commands.push(GpuCommand::AttachVertexBuffer {
                vertex_array,
                slot,
                buffer,
                format,
            });
        }
    }

    fn attach_index_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId) {
        if let Some(record) = self.vertex_arrays.get_mut(&vertex_array) {
            record.index = Some(buffer);
            self.commands.push(GpuCommand::AttachIndexBuffer {
                vertex_array,
                buffer,
            });
        }
    }

    fn create_texture(
        &mut self,
        image: &ImageData,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
    ) -> Result<TextureId, RenderError> {
        self.allocate(image.pixels.len())?;
        let texture = TextureId(bump(&mut self.ids.texture));
        self.textures.insert(texture, (image.width, image.height));
        self.commands.push(GpuCommand::CreateTexture {
            texture,
            width: image.width,
            height: image.height,
            wrap_u,
            wrap_v,
        });
        Ok(texture)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.bound_textures.insert(unit, texture);
        self.commands.push(GpuCommand::BindTexture { unit, texture });
    }

    fn unbind_texture(&mut self, unit: u32) {
        self.bound_textures.remove(&unit);
        self.commands.push(GpuCommand::UnbindTexture { unit });
    }

    fn clear(&mut self, color: Vec3) {
        self.commands.push(GpuCommand::Clear(color));
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        self.polygon_mode = mode;
        self.commands.push(GpuCommand::SetPolygonMode(mode));
    }

    fn draw_indexed(&mut self, vertex_array: VertexArrayId, index_count: u32) {
        let Some(program) = self.current else {
            tracing::warn!(?vertex_array, "draw with no program in use");
            return;
        };
        let available = self
            .vertex_arrays
            .get(&vertex_array)
            .and_then(|va| va.index)
            .and_then(|b| self.buffers.get(&b))
            .map(|(_, bytes)| bytes.len() / 4);
        match available {
            Some(n) if index_count as usize <= n => self.commands.push(GpuCommand::Draw {
                program,
                vertex_array,
                index_count,
            }),
            _ => tracing::warn!(?vertex_array, index_count, "draw past the index buffer ignored"),
        }
    }

    fn finish_frame(&mut self) {
        self.frames_finished += 1;
        self.commands.push(GpuCommand::FinishFrame);
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        if self.shaders.remove(&shader).is_some() {
            self.commands.push(GpuCommand::DeleteShader(shader));
        }
    }

    fn delete_program(&mut self, program: ProgramId) {
        if self.programs.remove(&program).is_some() {
            if self.current == Some(program) {
                self.current = None;
            }
            self.commands.push(GpuCommand::DeleteProgram(program));
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if self.buffers.remove(&buffer).is_some() {
            self.commands.push(GpuCommand::DeleteBuffer(buffer));
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        if self.vertex_arrays.remove(&vertex_array).is_some() {
            self.commands.push(GpuCommand::DeleteVertexArray(vertex_array));
        }
    }

    fn delete_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_some() {
            self.bound_textures.retain(|_, t| *t != texture);
            self.commands.push(GpuCommand::DeleteTexture(texture));
        }
    }
}
