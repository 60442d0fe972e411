use std::collections::HashMap;
use std::num::NonZeroU64;

use glam::Vec3;
use glint_assets::{ImageData, WrapMode};
use glint_render::{
    BufferId, BufferKind, GraphicsDevice, PolygonMode, ProgramId, RenderError, ShaderId,
    ShaderSource, ShaderStage, TEX_COORD_SLOT, TextureId, UniformLayout, UniformLocation,
    UniformValue, VertexArrayId, VertexFormat,
};
use wgpu::util::DeviceExt;

use crate::BackendError;
use crate::block::UniformBlock;
use crate::pipeline::{self, align_to};

const INITIAL_UNIFORM_CAPACITY: u64 = 64 * 1024;

struct ShaderEntry {
    module: wgpu::ShaderModule,
    stage: ShaderStage,
    label: String,
    uniforms: UniformLayout,
}

struct ProgramEntry {
    pipeline: wgpu::RenderPipeline,
    /// Same program drawing edges only, when the device supports it.
    line_pipeline: Option<wgpu::RenderPipeline>,
    block: UniformBlock,
}

#[derive(Default)]
struct VertexArrayEntry {
    slots: [Option<BufferId>; 3],
    index: Option<BufferId>,
}

struct DrawCall {
    program: ProgramId,
    vertex_array: VertexArrayId,
    index_count: u32,
    uniform_offset: u32,
    texture: Option<TextureId>,
    polygon_mode: PolygonMode,
}

#[derive(Default)]
struct FrameState {
    clear_color: Vec3,
    staging: Vec<u8>,
    draws: Vec<DrawCall>,
}

/// `GraphicsDevice` over a wgpu surface.
///
/// Uniform uploads land in a CPU copy of the current program's block. Each
/// `draw_indexed` snapshots that block into the frame's staging bytes and
/// records the draw; `finish_frame` uploads the staging bytes once and
/// replays every draw in a single render pass with dynamic offsets.
pub struct WgpuDevice {
    device: wgpu::Device,
    queue: wgpu::Queue,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    depth_view: wgpu::TextureView,

    pipeline_layout: wgpu::PipelineLayout,
    uniform_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    uniform_buffer: wgpu::Buffer,
    uniform_bind_group: wgpu::BindGroup,
    /// Bytes bound per draw: the largest block of any linked program.
    uniform_window: u64,
    uniform_alignment: u64,
    default_texture: wgpu::BindGroup,
    zero_tex_coords: Option<wgpu::Buffer>,

    shaders: HashMap<ShaderId, ShaderEntry>,
    programs: HashMap<ProgramId, ProgramEntry>,
    buffers: HashMap<BufferId, wgpu::Buffer>,
    vertex_arrays: HashMap<VertexArrayId, VertexArrayEntry>,
    textures: HashMap<TextureId, wgpu::BindGroup>,
    bound: HashMap<u32, TextureId>,
    current: Option<ProgramId>,
    polygon_mode: PolygonMode,
    line_mode_supported: bool,
    frame: FrameState,
    next_id: u32,
}

impl WgpuDevice {
    /// Open an adapter and device that can present to `target`, and
    /// configure the surface at `width` x `height`.
    pub fn new(
        target: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
    ) -> Result<Self, BackendError> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(target)?;

        let adapter_options = wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        };
        let adapter = pollster::block_on(instance.request_adapter(&adapter_options))
            .ok_or(BackendError::NoAdapter)?;
        let info = adapter.get_info();
        tracing::info!(adapter = %info.name, backend = ?info.backend, "GPU adapter selected");

        // Wireframe needs line rasterization, which not every adapter has.
        let line_mode_supported = adapter
            .features()
            .contains(wgpu::Features::POLYGON_MODE_LINE);
        let required_features = if line_mode_supported {
            wgpu::Features::POLYGON_MODE_LINE
        } else {
            wgpu::Features::empty()
        };

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("glint_device"),
                required_features,
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))?;

        let caps = surface.get_capabilities(&adapter);
        let format = caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or(BackendError::NoSurfaceFormat)?;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width: width.max(1),
            height: height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        tracing::debug!(
            ?format,
            width = config.width,
            height = config.height,
            line_mode_supported,
            "surface configured"
        );

        let uniform_layout = pipeline::uniform_bind_group_layout(&device);
        let texture_layout = pipeline::texture_bind_group_layout(&device);
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("pipeline_layout"),
            bind_group_layouts: &[&uniform_layout, &texture_layout],
            push_constant_ranges: &[],
        });

        let uniform_alignment = u64::from(device.limits().min_uniform_buffer_offset_alignment);
        let uniform_window = uniform_alignment;
        let uniform_buffer = create_uniform_buffer(&device, INITIAL_UNIFORM_CAPACITY);
        let uniform_bind_group =
            create_uniform_bind_group(&device, &uniform_layout, &uniform_buffer, uniform_window);

        let white = ImageData {
            pixels: vec![255; 4],
            width: 1,
            height: 1,
        };
        let default_texture = upload_texture(
            &device,
            &queue,
            &texture_layout,
            &white,
            WrapMode::Repeat,
            WrapMode::Repeat,
        );
        let depth_view = pipeline::create_depth_texture(&device, config.width, config.height);

        Ok(Self {
            device,
            queue,
            surface,
            config,
            depth_view,
            pipeline_layout,
            uniform_layout,
            texture_layout,
            uniform_buffer,
            uniform_bind_group,
            uniform_window,
            uniform_alignment,
            default_texture,
            zero_tex_coords: None,
            shaders: HashMap::new(),
            programs: HashMap::new(),
            buffers: HashMap::new(),
            vertex_arrays: HashMap::new(),
            textures: HashMap::new(),
            bound: HashMap::new(),
            current: None,
            polygon_mode: PolygonMode::Fill,
            line_mode_supported,
            frame: FrameState::default(),
            next_id: 1,
        })
    }

    /// Reconfigure the surface after the window changed size. A zero-sized
    /// (minimized) window keeps the old configuration.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_view = pipeline::create_depth_texture(&self.device, width, height);
    }

    pub fn size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.config.format
    }

    fn next_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Run `f` inside a validation error scope and report what it raised.
    fn validated<T>(&self, f: impl FnOnce(&wgpu::Device) -> T) -> (T, Option<wgpu::Error>) {
        self.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let value = f(&self.device);
        let error = pollster::block_on(self.device.pop_error_scope());
        (value, error)
    }

    fn vertex_count(&self, vertex_array: &VertexArrayEntry) -> u64 {
        vertex_array.slots[0]
            .and_then(|b| self.buffers.get(&b))
            .map(|b| b.size() / VertexFormat::Float32x3.stride())
            .unwrap_or(0)
    }

    /// Grow the shared zero buffer that stands in for missing texture
    /// coordinates.
    fn ensure_zero_tex_coords(&mut self, vertex_count: u64) {
        let needed = (vertex_count * VertexFormat::Float32x2.stride()).max(8);
        if self.zero_tex_coords.as_ref().is_some_and(|b| b.size() >= needed) {
            return;
        }
        self.zero_tex_coords = Some(self.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("zero_tex_coords"),
            size: needed.next_power_of_two(),
            usage: wgpu::BufferUsages::VERTEX,
            mapped_at_creation: false,
        }));
    }

    fn upload_frame_uniforms(&mut self, staging: &[u8]) {
        let needed = staging.len() as u64;
        if needed > self.uniform_buffer.size() {
            let capacity = needed.next_power_of_two();
            tracing::debug!(capacity, "growing uniform buffer");
            self.uniform_buffer = create_uniform_buffer(&self.device, capacity);
            self.uniform_bind_group = create_uniform_bind_group(
                &self.device,
                &self.uniform_layout,
                &self.uniform_buffer,
                self.uniform_window,
            );
        }
        if !staging.is_empty() {
            self.queue.write_buffer(&self.uniform_buffer, 0, staging);
        }
    }
}

impl GraphicsDevice for WgpuDevice {
    fn compile_shader(
        &mut self,
        source: &ShaderSource,
        stage: ShaderStage,
    ) -> Result<ShaderId, RenderError> {
        let label = format!("{}_{stage:?}", source.label);
        let (module, error) = self.validated(|device| {
            device.create_shader_module(wgpu::ShaderModuleDescriptor {
                label: Some(&label),
                source: wgpu::ShaderSource::Wgsl(source.code.as_str().into()),
            })
        });
        if let Some(error) = error {
            return Err(RenderError::ShaderCompile {
                label: source.label.clone(),
                message: error.to_string(),
            });
        }
        let id = ShaderId(self.next_id());
        self.shaders.insert(
            id,
            ShaderEntry {
                module,
                stage,
                label: source.label.clone(),
                uniforms: source.uniforms.clone(),
            },
        );
        Ok(id)
    }

    fn link_program(
        &mut self,
        vertex: ShaderId,
        fragment: ShaderId,
    ) -> Result<ProgramId, RenderError> {
        let unknown = |id: ShaderId| RenderError::UnknownHandle {
            kind: "shader",
            id: id.0,
        };
        let vs = self.shaders.get(&vertex).ok_or_else(|| unknown(vertex))?;
        let fs = self.shaders.get(&fragment).ok_or_else(|| unknown(fragment))?;
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

        let build = |device: &wgpu::Device, mode: PolygonMode| {
            pipeline::create_render_pipeline(
                device,
                &vs.label,
                &self.pipeline_layout,
                &vs.module,
                &fs.module,
                self.config.format,
                pipeline::polygon_mode(mode),
            )
        };
        let line_mode = self.line_mode_supported;
        let ((pipeline, line_pipeline), error) = self.validated(|device| {
            let fill = build(device, PolygonMode::Fill);
            let line = line_mode.then(|| build(device, PolygonMode::Line));
            (fill, line)
        });
        if let Some(error) = error {
            return Err(RenderError::ProgramLink(error.to_string()));
        }

        let layout = vs.uniforms.clone();
        let window = align_to(u64::from(layout.block_size()).max(16), 16);
        if window > self.uniform_window {
            self.uniform_window = window;
            self.uniform_bind_group = create_uniform_bind_group(
                &self.device,
                &self.uniform_layout,
                &self.uniform_buffer,
                window,
            );
        }

        let id = ProgramId(self.next_id());
        self.programs.insert(
            id,
            ProgramEntry {
                pipeline,
                line_pipeline,
                block: UniformBlock::new(layout),
            },
        );
        Ok(id)
    }

    fn use_program(&mut self, program: ProgramId) {
        if self.programs.contains_key(&program) {
            self.current = Some(program);
        } else {
            tracing::warn!(program = program.0, "use of unknown program");
        }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> Option<UniformLocation> {
        self.programs.get(&program)?.block.layout().location(name)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(entry) = self.current.and_then(|p| self.programs.get_mut(&p)) else {
            tracing::warn!("uniform set with no program in use");
            return;
        };
        if !entry.block.set(location, value) {
            tracing::warn!(location = location.0, ?value, "uniform rejected");
        }
    }

    fn uniform_value(
        &self,
        program: ProgramId,
        location: UniformLocation,
    ) -> Option<UniformValue> {
        self.programs.get(&program)?.block.get(location)
    }

    fn create_buffer(
        &mut self,
        kind: BufferKind,
        contents: &[u8],
    ) -> Result<BufferId, RenderError> {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(match kind {
                BufferKind::Vertex => "vertex_buffer",
                BufferKind::Index => "index_buffer",
            }),
            contents,
            usage,
        });
        if pollster::block_on(self.device.pop_error_scope()).is_some() {
            return Err(RenderError::OutOfMemory {
                bytes: contents.len(),
            });
        }
        let id = BufferId(self.next_id());
        self.buffers.insert(id, buffer);
        Ok(id)
    }

    fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = VertexArrayId(self.next_id());
        self.vertex_arrays.insert(id, VertexArrayEntry::default());
        id
    }

    fn attach_vertex_buffer(
        &mut self,
        vertex_array: VertexArrayId,
        slot: u32,
        buffer: BufferId,
        format: VertexFormat,
    ) {
        let expected = pipeline::vertex_layouts()
            .get(slot as usize)
            .map(|l| l.array_stride);
        if expected != Some(format.stride()) {
            tracing::warn!(slot, ?format, "vertex format does not match the slot layout");
            return;
        }
        match self.vertex_arrays.get_mut(&vertex_array) {
            Some(entry) => entry.slots[slot as usize] = Some(buffer),
            None => tracing::warn!(vertex_array = vertex_array.0, "unknown vertex array"),
        }
    }

    fn attach_index_buffer(&mut self, vertex_array: VertexArrayId, buffer: BufferId) {
        match self.vertex_arrays.get_mut(&vertex_array) {
            Some(entry) => entry.index = Some(buffer),
            None => tracing::warn!(vertex_array = vertex_array.0, "unknown vertex array"),
        }
    }

    fn create_texture(
        &mut self,
        image: &ImageData,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
    ) -> Result<TextureId, RenderError> {
        self.device.push_error_scope(wgpu::ErrorFilter::OutOfMemory);
        let bind_group = upload_texture(
            &self.device,
            &self.queue,
            &self.texture_layout,
            image,
            wrap_u,
            wrap_v,
        );
        if pollster::block_on(self.device.pop_error_scope()).is_some() {
            return Err(RenderError::OutOfMemory {
                bytes: image.pixels.len(),
            });
        }
        let id = TextureId(self.next_id());
        self.textures.insert(id, bind_group);
        Ok(id)
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureId) {
        self.bound.insert(unit, texture);
    }

    fn unbind_texture(&mut self, unit: u32) {
        self.bound.remove(&unit);
    }

    fn clear(&mut self, color: Vec3) {
        self.frame = FrameState {
            clear_color: color,
            ..Default::default()
        };
    }

    fn set_polygon_mode(&mut self, mode: PolygonMode) {
        if mode == PolygonMode::Line && !self.line_mode_supported {
            tracing::warn!("adapter cannot draw lines, staying in fill mode");
            return;
        }
        self.polygon_mode = mode;
    }

    fn draw_indexed(&mut self, vertex_array: VertexArrayId, index_count: u32) {
        let Some(program) = self.current else {
            tracing::warn!("draw with no program in use");
            return;
        };
        let Some(entry) = self.vertex_arrays.get(&vertex_array) else {
            tracing::warn!(vertex_array = vertex_array.0, "draw of unknown vertex array");
            return;
        };
        if entry.slots[TEX_COORD_SLOT as usize].is_none() {
            let vertices = self.vertex_count(entry);
            self.ensure_zero_tex_coords(vertices);
        }
        let Some(block) = self.programs.get(&program).map(|p| &p.block) else {
            return;
        };

        let texture = block
            .sampler_unit()
            .and_then(|unit| self.bound.get(&unit).copied());
        let stride = align_to(self.uniform_window, self.uniform_alignment) as usize;
        let staging = &mut self.frame.staging;
        let offset = staging.len();
        staging.extend_from_slice(block.bytes());
        staging.resize(offset + stride, 0);

        self.frame.draws.push(DrawCall {
            program,
            vertex_array,
            index_count,
            uniform_offset: offset as u32,
            texture,
            polygon_mode: self.polygon_mode,
        });
    }

    fn finish_frame(&mut self) {
        let mut frame = std::mem::take(&mut self.frame);
        let output = match self.surface.get_current_texture() {
            Ok(output) => output,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                tracing::debug!("surface lost, reconfiguring");
                self.surface.configure(&self.device, &self.config);
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "dropping frame");
                return;
            }
        };

        // The last draw binds a full window even when the buffer ends sooner.
        if let Some(last) = frame.draws.last() {
            let end = last.uniform_offset as usize + self.uniform_window as usize;
            if frame.staging.len() < end {
                frame.staging.resize(end, 0);
            }
        }
        self.upload_frame_uniforms(&frame.staging);

        let view = output.texture.create_view(&Default::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame_encoder"),
            });
        {
            let c = frame.clear_color;
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("frame_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: f64::from(c.x),
                            g: f64::from(c.y),
                            b: f64::from(c.z),
                            a: 1.0,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            for draw in &frame.draws {
                let Some(program) = self.programs.get(&draw.program) else {
                    continue;
                };
                let Some(vertex_array) = self.vertex_arrays.get(&draw.vertex_array) else {
                    continue;
                };
                let buffer =
                    |slot: usize| vertex_array.slots[slot].and_then(|b| self.buffers.get(&b));
                let (Some(positions), Some(normals), Some(indices)) = (
                    buffer(0),
                    buffer(1),
                    vertex_array.index.and_then(|b| self.buffers.get(&b)),
                ) else {
                    tracing::warn!(
                        vertex_array = draw.vertex_array.0,
                        "incomplete vertex array skipped"
                    );
                    continue;
                };
                let Some(tex_coords) = buffer(2).or(self.zero_tex_coords.as_ref()) else {
                    continue;
                };
                let texture = draw
                    .texture
                    .and_then(|t| self.textures.get(&t))
                    .unwrap_or(&self.default_texture);

                let pipeline = match (draw.polygon_mode, &program.line_pipeline) {
                    (PolygonMode::Line, Some(line)) => line,
                    _ => &program.pipeline,
                };
                pass.set_pipeline(pipeline);
                pass.set_bind_group(0, &self.uniform_bind_group, &[draw.uniform_offset]);
                pass.set_bind_group(1, texture, &[]);
                pass.set_vertex_buffer(0, positions.slice(..));
                pass.set_vertex_buffer(1, normals.slice(..));
                pass.set_vertex_buffer(2, tex_coords.slice(..));
                pass.set_index_buffer(indices.slice(..), wgpu::IndexFormat::Uint32);
                pass.draw_indexed(0..draw.index_count, 0, 0..1);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
    }

    fn delete_shader(&mut self, shader: ShaderId) {
        self.shaders.remove(&shader);
    }

    fn delete_program(&mut self, program: ProgramId) {
        self.programs.remove(&program);
        if self.current == Some(program) {
            self.current = None;
        }
    }

    fn delete_buffer(&mut self, buffer: BufferId) {
        if let Some(buffer) = self.buffers.remove(&buffer) {
            buffer.destroy();
        }
    }

    fn delete_vertex_array(&mut self, vertex_array: VertexArrayId) {
        self.vertex_arrays.remove(&vertex_array);
    }

    fn delete_texture(&mut self, texture: TextureId) {
        self.textures.remove(&texture);
        self.bound.retain(|_, bound| *bound != texture);
    }
}

fn create_uniform_buffer(device: &wgpu::Device, size: u64) -> wgpu::Buffer {
    device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("uniform_buffer"),
        size,
        usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        mapped_at_creation: false,
    })
}

fn create_uniform_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    buffer: &wgpu::Buffer,
    window: u64,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("uniform_bind_group"),
        layout,
        entries: &[wgpu::BindGroupEntry {
            binding: 0,
            resource: wgpu::BindingResource::Buffer(wgpu::BufferBinding {
                buffer,
                offset: 0,
                size: NonZeroU64::new(window),
            }),
        }],
    })
}

fn upload_texture(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    image: &ImageData,
    wrap_u: WrapMode,
    wrap_v: WrapMode,
) -> wgpu::BindGroup {
    let texture = device.create_texture_with_data(
        queue,
        &wgpu::TextureDescriptor {
            label: Some("diffuse_texture"),
            size: wgpu::Extent3d {
                width: image.width,
                height: image.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        },
        wgpu::util::TextureDataOrder::LayerMajor,
        &image.pixels,
    );
    let view = texture.create_view(&Default::default());
    let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some("diffuse_sampler"),
        address_mode_u: pipeline::address_mode(wrap_u),
        address_mode_v: pipeline::address_mode(wrap_v),
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    });
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some("texture_bind_group"),
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&sampler),
            },
        ],
    })
}
