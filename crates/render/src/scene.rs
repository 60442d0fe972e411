use std::path::{Path, PathBuf};

use glam::{Mat4, Quat, Vec3};
use glint_assets::{WrapMode, primitives};
use glint_common::Transform;
use serde::{Deserialize, Serialize};

use crate::camera::{CameraConfig, Projection};
use crate::device::{GraphicsDevice, ProgramId};
use crate::error::RenderError;
use crate::geometry::GeometryBuffer;
use crate::light::{LightBindings, LightSet, PointLight};
use crate::model::Model;
use crate::pass::{PassUniforms, ReadyPass};
use crate::program::build_program;
use crate::shaders::{self, DIFFUSE_TEXTURE_UNIT};
use crate::texture::Texture;
use crate::uniform::UniformBinding;

/// The textured plane the scene stands on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundConfig {
    pub x_segments: u32,
    pub y_segments: u32,
    pub cell_size: f32,
    pub texture: Option<PathBuf>,
    pub wrap_u: WrapMode,
    pub wrap_v: WrapMode,
    pub transform: Transform,
}

impl Default for GroundConfig {
    fn default() -> Self {
        Self {
            x_segments: 30,
            y_segments: 30,
            cell_size: 1.0,
            texture: None,
            wrap_u: WrapMode::ClampToEdge,
            wrap_v: WrapMode::ClampToEdge,
            transform: Transform::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub transform: Transform,
}

/// The sphere drawn at every light's position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarkerConfig {
    pub x_segments: u32,
    pub y_segments: u32,
    pub scale: f32,
}

impl Default for MarkerConfig {
    fn default() -> Self {
        Self {
            x_segments: 30,
            y_segments: 30,
            scale: 0.2,
        }
    }
}

/// Everything needed to build a scene, loadable from JSON.
///
/// Fields missing from a scene file take their value from
/// `SceneConfig::procedural`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default = "SceneConfig::procedural")]
pub struct SceneConfig {
    pub background_color: Vec3,
    /// Multiplied into every lit surface.
    pub object_color: Vec3,
    pub camera: CameraConfig,
    pub projection: Projection,
    pub lights: Vec<PointLight>,
    pub ground: Option<GroundConfig>,
    pub models: Vec<ModelConfig>,
    pub marker: MarkerConfig,
    /// Period hint of the animation that drives the `time` uniform.
    pub time_period: f32,
    /// Draw triangle edges instead of filled triangles.
    pub wireframe: bool,
}

impl Default for SceneConfig {
    /// The house scene: three models on a snow plane lit by two lamps.
    /// Asset paths are relative to the working directory.
    fn default() -> Self {
        let model = |path: &str| ModelConfig {
            path: path.into(),
            transform: Transform::from_translation_scale(Vec3::ZERO, 0.7),
        };
        Self {
            models: vec![
                model("models/house.obj"),
                model("models/ChairNTable.obj"),
                model("models/bear.obj"),
            ],
            ground: Some(GroundConfig {
                texture: Some("textures/snow.jpg".into()),
                ..GroundConfig::default()
            }),
            ..Self::procedural()
        }
    }
}

impl SceneConfig {
    /// The default scene without any file-backed assets: untextured ground,
    /// no models, same lights and camera.
    pub fn procedural() -> Self {
        Self {
            background_color: Vec3::ZERO,
            object_color: Vec3::ONE,
            camera: CameraConfig::default(),
            projection: Projection::default(),
            lights: vec![
                PointLight::at(Vec3::new(0.0, 1.0, -2.0)),
                PointLight::at(Vec3::new(5.0, 1.0, 2.0)),
            ],
            ground: Some(GroundConfig::default()),
            models: Vec::new(),
            marker: MarkerConfig::default(),
            time_period: 45.0,
            wireframe: false,
        }
    }

    /// Read a JSON scene file. Relative asset paths in it are taken relative
    /// to the file's directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut config: Self = serde_json::from_str(&text).map_err(|e| RenderError::SceneFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if let Some(base) = path.parent() {
            config.rebase(base);
        }
        tracing::info!(
            ?path,
            lights = config.lights.len(),
            models = config.models.len(),
            "scene config loaded"
        );
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self).map_err(|e| RenderError::SceneFile {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        std::fs::write(path, text)?;
        Ok(())
    }

    fn rebase(&mut self, base: &Path) {
        let join = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        if let Some(texture) = self.ground.as_mut().and_then(|g| g.texture.as_mut()) {
            join(texture);
        }
        for model in &mut self.models {
            join(&mut model.path);
        }
    }
}

/// The lit program and its resolved uniforms.
#[derive(Debug)]
pub struct LitProgram {
    pub program: ProgramId,
    pub model: UniformBinding,
    pub view: UniformBinding,
    pub projection: UniformBinding,
    pub view_pos: UniformBinding,
    pub time: UniformBinding,
    pub object_color: UniformBinding,
    pub diffuse_texture: UniformBinding,
    pub lights: LightBindings,
}

impl LitProgram {
    pub fn build<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        lights: &LightSet,
    ) -> Result<Self, RenderError> {
        let program = build_program(device, &shaders::lit_source())?;
        let bind = |name: &str| UniformBinding::resolve(&*device, program, name);
        Ok(Self {
            program,
            model: bind("model"),
            view: bind("view"),
            projection: bind("projection"),
            view_pos: bind("viewPos"),
            time: bind("time"),
            object_color: bind("objectColor"),
            diffuse_texture: bind("texture_diffuse1"),
            lights: lights.resolve_uniforms(&*device, program),
        })
    }
}

/// The flat-color program used for light markers.
#[derive(Debug)]
pub struct UnlitProgram {
    pub program: ProgramId,
    pub model: UniformBinding,
    pub view: UniformBinding,
    pub projection: UniformBinding,
    pub object_color: UniformBinding,
}

impl UnlitProgram {
    pub fn build<D: GraphicsDevice + ?Sized>(device: &mut D) -> Result<Self, RenderError> {
        let program = build_program(device, &shaders::unlit_source())?;
        let bind = |name: &str| UniformBinding::resolve(&*device, program, name);
        Ok(Self {
            program,
            model: bind("model"),
            view: bind("view"),
            projection: bind("projection"),
            object_color: bind("objectColor"),
        })
    }
}

/// Uniforms shared by every draw of the main pass.
pub struct LitUniforms<'a> {
    pub program: &'a LitProgram,
    pub lights: &'a LightSet,
    pub time: f32,
    pub view: Mat4,
    pub projection: Mat4,
    pub view_pos: Vec3,
    pub object_color: Vec3,
}

impl PassUniforms for LitUniforms<'_> {
    fn upload<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        let p = self.program;
        p.time.set(device, self.time);
        p.view.set(device, self.view);
        p.projection.set(device, self.projection);
        p.view_pos.set(device, self.view_pos);
        p.object_color.set(device, self.object_color);
        self.lights.upload(device, &p.lights);
    }
}

/// Uniforms shared by every draw of the marker pass.
pub struct MarkerUniforms<'a> {
    pub program: &'a UnlitProgram,
    pub view: Mat4,
    pub projection: Mat4,
}

impl PassUniforms for MarkerUniforms<'_> {
    fn upload<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        self.program.view.set(device, self.view);
        self.program.projection.set(device, self.projection);
    }
}

/// Geometry with a model transform and an optional diffuse texture.
#[derive(Debug)]
pub struct Drawable {
    pub geometry: GeometryBuffer,
    pub transform: Mat4,
    pub texture: Option<Texture>,
}

impl Drawable {
    /// Upload the ground square and its texture, if it has one.
    pub fn ground<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        config: &GroundConfig,
    ) -> Result<Self, RenderError> {
        let mesh = primitives::square(config.x_segments, config.y_segments, config.cell_size)?;
        let geometry = GeometryBuffer::build(device, &mesh)?;
        let texture = match &config.texture {
            Some(path) => match Texture::from_file(device, path, config.wrap_u, config.wrap_v) {
                Ok(t) => Some(t),
                Err(e) => {
                    geometry.destroy(device);
                    return Err(e);
                }
            },
            None => None,
        };
        Ok(Self {
            geometry,
            transform: config.transform.matrix(),
            texture,
        })
    }

    pub fn draw<D: GraphicsDevice + ?Sized>(&self, pass: &mut ReadyPass<'_, D>, lit: &LitProgram) {
        pass.set(&lit.model, self.transform);
        if let Some(texture) = &self.texture {
            pass.bind_texture(texture, DIFFUSE_TEXTURE_UNIT);
            pass.set_sampler(texture, &lit.diffuse_texture);
        }
        pass.draw(&self.geometry);
        if let Some(texture) = &self.texture {
            pass.unbind_texture(texture);
        }
    }

    pub fn destroy<D: GraphicsDevice + ?Sized>(self, device: &mut D) {
        self.geometry.destroy(device);
        if let Some(texture) = self.texture {
            texture.destroy(device);
        }
    }
}

#[derive(Debug)]
pub struct PlacedModel {
    pub model: Model,
    pub transform: Mat4,
}

/// Every GPU object a scene owns, built once before the frame loop.
#[derive(Debug)]
pub struct SceneResources {
    pub lit: LitProgram,
    pub unlit: UnlitProgram,
    /// Fixed at build time; the lit program's light bindings were resolved
    /// for exactly these lights.
    lights: LightSet,
    pub models: Vec<PlacedModel>,
    pub ground: Option<Drawable>,
    pub marker: GeometryBuffer,
    pub marker_scale: f32,
    pub background_color: Vec3,
    pub object_color: Vec3,
}

impl SceneResources {
    /// Compile programs, resolve uniforms and upload every asset.
    ///
    /// Any failure aborts the build and releases what it had created;
    /// nothing is retried.
    pub fn build<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        config: &SceneConfig,
    ) -> Result<Self, RenderError> {
        let lights = LightSet::new(config.lights.clone())?;
        let marker_mesh = primitives::sphere(config.marker.x_segments, config.marker.y_segments)?;
        let lit = LitProgram::build(device, &lights)?;
        let unlit = match UnlitProgram::build(device) {
            Ok(p) => p,
            Err(e) => {
                device.delete_program(lit.program);
                return Err(e);
            }
        };
        let marker = match GeometryBuffer::build(device, &marker_mesh) {
            Ok(m) => m,
            Err(e) => {
                device.delete_program(lit.program);
                device.delete_program(unlit.program);
                return Err(e);
            }
        };

        let mut scene = Self {
            lit,
            unlit,
            lights,
            models: Vec::with_capacity(config.models.len()),
            ground: None,
            marker,
            marker_scale: config.marker.scale,
            background_color: config.background_color,
            object_color: config.object_color,
        };
        if let Err(e) = scene.load_assets(device, config) {
            scene.destroy(device);
            return Err(e);
        }

        tracing::info!(
            lights = scene.lights.len(),
            models = scene.models.len(),
            ground = scene.ground.is_some(),
            "scene built"
        );
        Ok(scene)
    }

    fn load_assets<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        config: &SceneConfig,
    ) -> Result<(), RenderError> {
        if let Some(ground) = &config.ground {
            self.ground = Some(Drawable::ground(device, ground)?);
        }
        for m in &config.models {
            self.models.push(PlacedModel {
                model: Model::load(device, &m.path)?,
                transform: m.transform.matrix(),
            });
        }
        Ok(())
    }

    pub fn lights(&self) -> &LightSet {
        &self.lights
    }

    /// Move light `index`. Returns false when there is no such light.
    pub fn set_light_position(&mut self, index: usize, position: Vec3) -> bool {
        self.lights.set_position(index, position)
    }

    /// Model transform of a marker sphere centered on `position`.
    pub fn marker_transform(&self, position: Vec3) -> Mat4 {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.marker_scale),
            Quat::IDENTITY,
            position,
        )
    }

    /// Release every GPU object.
    pub fn destroy<D: GraphicsDevice + ?Sized>(self, device: &mut D) {
        for placed in self.models {
            placed.model.destroy(device);
        }
        if let Some(ground) = self.ground {
            ground.destroy(device);
        }
        self.marker.destroy(device);
        device.delete_program(self.lit.program);
        device.delete_program(self.unlit.program);
        tracing::info!("scene resources released");
    }
}
