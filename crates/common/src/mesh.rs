use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Malformed vertex attribute arrays. Always a caller bug; never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("{positions} positions but {normals} normals")]
    NormalCountMismatch { positions: usize, normals: usize },
    #[error(
        "{tex_coords} texture coordinates for {positions} positions (expected 0 or {positions})"
    )]
    TexCoordCountMismatch { positions: usize, tex_coords: usize },
    #[error("index {index} at slot {slot} is out of range for {positions} positions")]
    IndexOutOfRange {
        slot: usize,
        index: u32,
        positions: usize,
    },
    #[error("index count {0} is not a multiple of 3")]
    NotTriangleList(usize),
    #[error("mesh has no indices")]
    Empty,
    #[error("a {x_segments}x{y_segments} grid has more vertices than u32 indices can address")]
    GridTooLarge { x_segments: u32, y_segments: u32 },
    #[error("flat {channel} array of length {len} is not a multiple of {width}")]
    RaggedArray {
        channel: &'static str,
        len: usize,
        width: usize,
    },
}

/// Parallel vertex attribute arrays for an indexed triangle list.
///
/// `positions[i]`, `normals[i]` and (when present) `tex_coords[i]` describe
/// vertex `i`. Texture coordinates are optional as a whole channel: either
/// every vertex has one or none do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from flat float arrays, as produced by most file parsers.
    pub fn from_flat(
        positions: &[f32],
        normals: &[f32],
        tex_coords: &[f32],
        indices: Vec<u32>,
    ) -> Result<Self, GeometryError> {
        Ok(Self {
            positions: chunk::<3>("positions", positions)?,
            normals: chunk::<3>("normals", normals)?,
            tex_coords: chunk::<2>("tex_coords", tex_coords)?,
            indices,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    pub fn has_tex_coords(&self) -> bool {
        !self.tex_coords.is_empty()
    }

    /// Check the attribute invariants:
    /// - `normals.len() == positions.len()`
    /// - `tex_coords.len()` is 0 or `positions.len()`
    /// - a non-empty triangle list whose indices are all `< positions.len()`
    pub fn validate(&self) -> Result<(), GeometryError> {
        let positions = self.positions.len();
        if self.normals.len() != positions {
            return Err(GeometryError::NormalCountMismatch {
                positions,
                normals: self.normals.len(),
            });
        }
        if !self.tex_coords.is_empty() && self.tex_coords.len() != positions {
            return Err(GeometryError::TexCoordCountMismatch {
                positions,
                tex_coords: self.tex_coords.len(),
            });
        }
        if self.indices.is_empty() {
            return Err(GeometryError::Empty);
        }
        if self.indices.len() % 3 != 0 {
            return Err(GeometryError::NotTriangleList(self.indices.len()));
        }
        if let Some((slot, &index)) = self
            .indices
            .iter()
            .enumerate()
            .find(|&(_, &i)| i as usize >= positions)
        {
            return Err(GeometryError::IndexOutOfRange {
                slot,
                index,
                positions,
            });
        }
        Ok(())
    }

    /// Replace the normals with smooth per-vertex normals: the normalized sum
    /// of the area-weighted face normals of every triangle touching the vertex.
    pub fn compute_normals(&mut self) {
        let mut acc = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= acc.len() || b >= acc.len() || c >= acc.len() {
                continue;
            }
            let pa = Vec3::from(self.positions[a]);
            let pb = Vec3::from(self.positions[b]);
            let pc = Vec3::from(self.positions[c]);
            let face = (pb - pa).cross(pc - pa);
            acc[a] += face;
            acc[b] += face;
            acc[c] += face;
        }
        self.normals = acc
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
            .collect();
    }
}

fn chunk<const N: usize>(
    channel: &'static str,
    flat: &[f32],
) -> Result<Vec<[f32; N]>, GeometryError> {
    if flat.len() % N != 0 {
        return Err(GeometryError::RaggedArray {
            channel,
            len: flat.len(),
            width: N,
        });
    }
    Ok(flat
        .chunks_exact(N)
        .map(|c| {
            let mut out = [0.0; N];
            out.copy_from_slice(c);
            out
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]],
            normals: vec![[0.0, 1.0, 0.0]; 3],
            tex_coords: vec![],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn valid_triangle_passes() {
        assert_eq!(triangle().validate(), Ok(()));
    }

    #[test]
    fn normal_count_must_match() {
        let mut mesh = triangle();
        mesh.normals.pop();
        assert_eq!(
            mesh.validate(),
            Err(GeometryError::NormalCountMismatch {
                positions: 3,
                normals: 2
            })
        );
    }

    #[test]
    fn tex_coords_all_or_nothing() {
        let mut mesh = triangle();
        mesh.tex_coords = vec![[0.0, 0.0]; 2];
        assert!(matches!(
            mesh.validate(),
            Err(GeometryError::TexCoordCountMismatch { .. })
        ));
        mesh.tex_coords.push([1.0, 1.0]);
        assert_eq!(mesh.validate(), Ok(()));
    }

    #[test]
    fn index_out_of_range() {
        let mut mesh = triangle();
        mesh.indices = vec![0, 1, 3];
        assert_eq!(
            mesh.validate(),
            Err(GeometryError::IndexOutOfRange {
                slot: 2,
                index: 3,
                positions: 3
            })
        );
    }

    #[test]
    fn empty_and_partial_triangles_rejected() {
        let mut mesh = triangle();
        mesh.indices.clear();
        assert_eq!(mesh.validate(), Err(GeometryError::Empty));
        mesh.indices = vec![0, 1];
        assert_eq!(mesh.validate(), Err(GeometryError::NotTriangleList(2)));
    }

    #[test]
    fn from_flat_rejects_ragged_arrays() {
        let err = MeshData::from_flat(&[0.0; 4], &[], &[], vec![]).unwrap_err();
        assert_eq!(
            err,
            GeometryError::RaggedArray {
                channel: "positions",
                len: 4,
                width: 3
            }
        );
    }

    #[test]
    fn computed_normals_face_up_for_ccw_floor() {
        let mut mesh = triangle();
        mesh.normals.clear();
        mesh.compute_normals();
        assert_eq!(mesh.normals.len(), 3);
        for n in &mesh.normals {
            assert!(Vec3::from(*n).abs_diff_eq(Vec3::Y, 1e-6));
        }
    }
}
