//! Shared types for the glint renderer.
//!
//! # Invariants
//! - `MeshData` is the only shape in which vertex data crosses crate
//!   boundaries; producers (assets) and consumers (render) agree on it.
//! - A `MeshData` that passed `validate` can be uploaded without further checks.

mod mesh;
mod types;

pub use mesh::{GeometryError, MeshData};
pub use types::Transform;

pub fn crate_info() -> &'static str {
    "glint-common v0.1.0"
}
