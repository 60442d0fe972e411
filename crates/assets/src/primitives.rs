//! Procedural meshes: the light-marker sphere and the ground plane.
//!
//! Both are laid out as a `(x_segments + 1) * (y_segments + 1)` vertex grid
//! with two triangles per cell, so the index count is always
//! `x_segments * y_segments * 6`. Grids whose vertices cannot all be
//! addressed by a `u32` index are rejected before anything is generated.

use std::f32::consts::PI;

use glint_common::{GeometryError, MeshData};

/// Unit UV sphere centered at the origin.
///
/// `x_segments` runs around the equator, `y_segments` from pole to pole.
pub fn sphere(x_segments: u32, y_segments: u32) -> Result<MeshData, GeometryError> {
    let xs = x_segments.max(3);
    let ys = y_segments.max(2);
    let mut data = grid_mesh(xs, ys)?;

    for y in 0..=ys {
        let v = y as f32 / ys as f32;
        let theta = v * PI;
        for x in 0..=xs {
            let u = x as f32 / xs as f32;
            let phi = u * 2.0 * PI;
            let p = [theta.sin() * phi.cos(), theta.cos(), -theta.sin() * phi.sin()];
            data.positions.push(p);
            data.normals.push(p);
            data.tex_coords.push([u, v]);
        }
    }

    push_grid_indices(&mut data.indices, xs, ys);
    Ok(data)
}

/// Flat ground plane on `y = 0`, centered at the origin, facing +Y.
///
/// Each of the `x_segments * y_segments` cells is `cell_size` wide; the
/// texture spans the whole plane once.
pub fn square(
    x_segments: u32,
    y_segments: u32,
    cell_size: f32,
) -> Result<MeshData, GeometryError> {
    let xs = x_segments.max(1);
    let ys = y_segments.max(1);
    let half_x = xs as f32 * cell_size * 0.5;
    let half_z = ys as f32 * cell_size * 0.5;
    let mut data = grid_mesh(xs, ys)?;

    for z in 0..=ys {
        let v = z as f32 / ys as f32;
        for x in 0..=xs {
            let u = x as f32 / xs as f32;
            data.positions
                .push([-half_x + u * 2.0 * half_x, 0.0, -half_z + v * 2.0 * half_z]);
            data.normals.push([0.0, 1.0, 0.0]);
            data.tex_coords.push([u, v]);
        }
    }

    push_grid_indices(&mut data.indices, xs, ys);
    Ok(data)
}

/// Empty mesh with room for an `xs` by `ys` cell grid.
fn grid_mesh(xs: u32, ys: u32) -> Result<MeshData, GeometryError> {
    let too_large = || GeometryError::GridTooLarge {
        x_segments: xs,
        y_segments: ys,
    };
    let vertices = (u64::from(xs) + 1)
        .checked_mul(u64::from(ys) + 1)
        .filter(|&n| n <= u64::from(u32::MAX) + 1)
        .ok_or_else(too_large)?;
    // At most 2^32 vertices, so the cell count times six fits in a u64.
    let indices = u64::from(xs) * u64::from(ys) * 6;
    let vertices = usize::try_from(vertices).map_err(|_| too_large())?;
    let indices = usize::try_from(indices).map_err(|_| too_large())?;

    Ok(MeshData {
        positions: Vec::with_capacity(vertices),
        normals: Vec::with_capacity(vertices),
        tex_coords: Vec::with_capacity(vertices),
        indices: Vec::with_capacity(indices),
    })
}

/// Two counter-clockwise (seen from outside / above) triangles per grid cell.
fn push_grid_indices(indices: &mut Vec<u32>, xs: u32, ys: u32) {
    let row = xs + 1;
    for y in 0..ys {
        for x in 0..xs {
            let a = y * row + x;
            let b = a + row;
            indices.extend_from_slice(&[a, b, a + 1, b, b + 1, a + 1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn sphere_counts_and_validity() {
        let s = sphere(30, 30).unwrap();
        assert_eq!(s.index_count(), 30 * 30 * 6);
        assert_eq!(s.vertex_count(), 31 * 31);
        assert_eq!(s.validate(), Ok(()));
    }

    #[test]
    fn sphere_vertices_on_unit_radius() {
        let s = sphere(8, 6).unwrap();
        for p in &s.positions {
            assert!((Vec3::from(*p).length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn square_counts_and_extent() {
        let g = square(30, 30, 1.0).unwrap();
        assert_eq!(g.index_count(), 30 * 30 * 6);
        assert_eq!(g.validate(), Ok(()));
        let min_x = g.positions.iter().map(|p| p[0]).fold(f32::MAX, f32::min);
        let max_x = g.positions.iter().map(|p| p[0]).fold(f32::MIN, f32::max);
        assert!((min_x + 15.0).abs() < 1e-5);
        assert!((max_x - 15.0).abs() < 1e-5);
        assert!(g.positions.iter().all(|p| p[1] == 0.0));
    }

    #[test]
    fn square_winding_faces_up() {
        let g = square(1, 1, 2.0).unwrap();
        let [a, b, c] = [g.indices[0], g.indices[1], g.indices[2]]
            .map(|i| Vec3::from(g.positions[i as usize]));
        let n = (b - a).cross(c - a);
        assert!(n.y > 0.0);
    }

    #[test]
    fn sphere_winding_faces_outward() {
        let s = sphere(16, 8).unwrap();
        for tri in s.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| Vec3::from(s.positions[i as usize]));
            let n = (b - a).cross(c - a);
            if n.length() > 1e-6 {
                assert!(n.dot(a + b + c) > 0.0);
            }
        }
    }

    #[test]
    fn degenerate_segment_counts_are_raised() {
        assert_eq!(sphere(0, 0).unwrap().index_count(), 3 * 2 * 6);
        assert_eq!(square(0, 0, 1.0).unwrap().index_count(), 6);
    }

    #[test]
    fn oversized_grids_are_rejected() {
        assert_eq!(
            square(70_000, 70_000, 1.0),
            Err(GeometryError::GridTooLarge {
                x_segments: 70_000,
                y_segments: 70_000,
            })
        );
        assert!(matches!(
            sphere(u32::MAX, u32::MAX),
            Err(GeometryError::GridTooLarge { .. })
        ));
        assert!(matches!(
            square(u32::MAX, 1, 1.0),
            Err(GeometryError::GridTooLarge { .. })
        ));
    }
}
