use std::path::{Path, PathBuf};

use glint_common::MeshData;

use crate::AssetError;

/// Surface description of one OBJ material.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialData {
    pub name: String,
    pub diffuse_color: [f32; 3],
    /// Resolved against the OBJ file's directory.
    pub diffuse_texture: Option<PathBuf>,
}

impl Default for MaterialData {
    fn default() -> Self {
        Self {
            name: "default".into(),
            diffuse_color: [0.8, 0.8, 0.8],
            diffuse_texture: None,
        }
    }
}

/// One drawable piece of a model and the material it is shaded with.
#[derive(Debug, Clone)]
pub struct ModelMesh {
    pub name: String,
    pub mesh: MeshData,
    pub material: Option<usize>,
}

/// Everything parsed out of one OBJ file (plus its MTL, when present).
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<ModelMesh>,
    pub materials: Vec<MaterialData>,
}

impl ModelData {
    pub fn index_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.index_count()).sum()
    }
}

/// Parse an OBJ file into validated meshes.
///
/// Faces are triangulated and re-indexed so each vertex carries one index
/// for all attributes. Objects without normals get smooth computed normals.
/// A missing or broken MTL file is not fatal; the meshes fall back to no
/// material.
pub fn load_obj(path: impl AsRef<Path>) -> Result<ModelData, AssetError> {
    let path = path.as_ref();
    let (models, materials) = tobj::load_obj(
        path,
        &tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        },
    )
    .map_err(|e| AssetError::ObjParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let materials = match materials {
        Ok(materials) => materials
            .into_iter()
            .enumerate()
            .map(|(i, m)| MaterialData {
                name: if m.name.is_empty() {
                    format!("material_{i}")
                } else {
                    m.name
                },
                diffuse_color: m.diffuse.unwrap_or([0.8, 0.8, 0.8]),
                diffuse_texture: m
                    .diffuse_texture
                    .filter(|t| !t.is_empty())
                    .map(|t| base_dir.join(t)),
            })
            .collect(),
        Err(e) => {
            tracing::warn!("no usable MTL for {path:?}: {e}");
            Vec::new()
        }
    };

    let mut meshes = Vec::with_capacity(models.len());
    for model in models {
        let m = model.mesh;
        let invalid = |source| AssetError::InvalidMesh {
            path: path.to_path_buf(),
            name: model.name.clone(),
            source,
        };

        // OBJ puts v=0 at the bottom of the image; texture rows start at the top.
        let tex_coords: Vec<f32> = m
            .texcoords
            .chunks_exact(2)
            .flat_map(|uv| [uv[0], 1.0 - uv[1]])
            .collect();

        let mut mesh = MeshData::from_flat(&m.positions, &[], &tex_coords, m.indices)
            .map_err(invalid)?;
        if !m.normals.is_empty() && m.normals.len() == m.positions.len() {
            mesh.normals = MeshData::from_flat(&m.normals, &[], &[], Vec::new())
                .map_err(invalid)?
                .positions;
        } else {
            mesh.compute_normals();
        }
        mesh.validate().map_err(invalid)?;

        let material = m.material_id.filter(|&id| id < materials.len());
        meshes.push(ModelMesh {
            name: model.name,
            mesh,
            material,
        });
    }

    tracing::info!(
        "loaded {} meshes, {} materials from {path:?}",
        meshes.len(),
        materials.len()
    );
    Ok(ModelData { meshes, materials })
}
