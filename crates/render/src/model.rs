use std::path::{Path, PathBuf};

use glam::Vec3;
use glint_assets::{ModelData, WrapMode, load_obj};

use crate::device::GraphicsDevice;
use crate::error::RenderError;
use crate::geometry::GeometryBuffer;
use crate::pass::ReadyPass;
use crate::shaders::DIFFUSE_TEXTURE_UNIT;
use crate::texture::Texture;
use crate::uniform::UniformBinding;

#[derive(Debug)]
struct ModelPart {
    name: String,
    geometry: GeometryBuffer,
    /// Index into `Model::textures`.
    texture: Option<usize>,
    /// Material diffuse color, for meshes drawn without a texture.
    color: Option<Vec3>,
}

/// A loaded model: one geometry buffer per mesh, plus the diffuse textures
/// its materials reference.
#[derive(Debug)]
pub struct Model {
    source: PathBuf,
    parts: Vec<ModelPart>,
    textures: Vec<Texture>,
}

impl Model {
    /// Parse an OBJ file (and its MTL) and upload everything it describes.
    pub fn load<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        path: impl AsRef<Path>,
    ) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let data = load_obj(path)?;
        let model = Self::from_data(device, path, &data)?;
        tracing::info!(
            ?path,
            meshes = model.parts.len(),
            textures = model.textures.len(),
            "model loaded"
        );
        Ok(model)
    }

    /// Upload `data`. On failure everything already uploaded is released
    /// before the error is returned.
    pub fn from_data<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        source: impl Into<PathBuf>,
        data: &ModelData,
    ) -> Result<Self, RenderError> {
        let mut model = Self {
            source: source.into(),
            parts: Vec::with_capacity(data.meshes.len()),
            textures: Vec::new(),
        };
        if let Err(e) = model.upload(device, data) {
            model.destroy(device);
            return Err(e);
        }
        Ok(model)
    }

    fn upload<D: GraphicsDevice + ?Sized>(
        &mut self,
        device: &mut D,
        data: &ModelData,
    ) -> Result<(), RenderError> {
        // One texture per material that names one; materials without a
        // texture map to `None`.
        let mut material_texture = Vec::with_capacity(data.materials.len());
        for material in &data.materials {
            let slot = match &material.diffuse_texture {
                Some(path) => {
                    let texture =
                        Texture::from_file(device, path, WrapMode::Repeat, WrapMode::Repeat)?;
                    self.textures.push(texture);
                    Some(self.textures.len() - 1)
                }
                None => None,
            };
            material_texture.push(slot);
        }

        for mesh in &data.meshes {
            let material = mesh.material.and_then(|i| data.materials.get(i));
            let texture = mesh
                .material
                .and_then(|i| material_texture.get(i).copied().flatten());
            let color = match (material, texture) {
                (Some(m), None) => Some(Vec3::from_array(m.diffuse_color)),
                _ => None,
            };
            self.parts.push(ModelPart {
                name: mesh.name.clone(),
                geometry: GeometryBuffer::build(device, &mesh.mesh)?,
                texture,
                color,
            });
        }
        Ok(())
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn mesh_count(&self) -> usize {
        self.parts.len()
    }

    pub fn mesh_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|p| p.name.as_str())
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn index_count(&self) -> u32 {
        self.parts.iter().map(|p| p.geometry.index_count()).sum()
    }

    /// Draw every mesh with the pass's current uniforms, binding each mesh's
    /// diffuse texture (if any) for the duration of its draw.
    ///
    /// Untextured meshes with a material are tinted by its diffuse color:
    /// `tint` is set to `base_color * diffuse` around them and left at
    /// `base_color` once the model is drawn.
    pub fn draw<D: GraphicsDevice + ?Sized>(
        &self,
        pass: &mut ReadyPass<'_, D>,
        sampler: &UniformBinding,
        tint: &UniformBinding,
        base_color: Vec3,
    ) {
        let mut current = base_color;
        for part in &self.parts {
            let color = part.color.map_or(base_color, |diffuse| base_color * diffuse);
            if color != current {
                pass.set(tint, color);
                current = color;
            }
            let texture = part.texture.and_then(|i| self.textures.get(i));
            if let Some(texture) = texture {
                pass.bind_texture(texture, DIFFUSE_TEXTURE_UNIT);
                pass.set_sampler(texture, sampler);
            }
            pass.draw(&part.geometry);
            if let Some(texture) = texture {
                pass.unbind_texture(texture);
            }
        }
        if current != base_color {
            pass.set(tint, base_color);
        }
    }

    pub fn destroy<D: GraphicsDevice + ?Sized>(self, device: &mut D) {
        for part in self.parts {
            part.geometry.destroy(device);
        }
        for texture in self.textures {
            texture.destroy(device);
        }
    }
}
