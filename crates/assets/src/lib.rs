//! Asset producers: everything that turns files into vertex arrays or pixels.
//!
//! The renderer never parses files itself. It consumes `MeshData`,
//! `ModelData` and `ImageData` produced here and uploads them.
//!
//! # Invariants
//! - Every `MeshData` returned by this crate passes `MeshData::validate`.
//! - Images are always RGBA8.

mod image_data;
mod obj;
pub mod primitives;

use std::path::PathBuf;

pub use image_data::{ImageData, WrapMode};
pub use obj::{MaterialData, ModelData, ModelMesh, load_obj};

/// Errors from asset decoding. All of them are fatal at scene build time.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to decode image {path:?}: {message}")]
    ImageDecode { path: PathBuf, message: String },
    #[error("a {width}x{height} RGBA8 image does not fit in memory")]
    ImageTooLarge { width: u32, height: u32 },
    #[error("failed to parse OBJ {path:?}: {message}")]
    ObjParse { path: PathBuf, message: String },
    #[error("mesh {name:?} in {path:?}: {source}")]
    InvalidMesh {
        path: PathBuf,
        name: String,
        #[source]
        source: glint_common::GeometryError,
    },
}

pub fn crate_info() -> &'static str {
    "glint-assets v0.1.0"
}
