use std::path::PathBuf;

use glint_assets::AssetError;
use glint_common::GeometryError;

/// Everything that can stop a scene from being built.
///
/// There is no per-frame error: once the scene is built, frames either
/// render or are visually wrong, and the latter is a test concern.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("invalid geometry: {0}")]
    Geometry(#[from] GeometryError),
    #[error("{count} point lights exceed the shader limit of {max}")]
    TooManyLights { count: usize, max: usize },
    #[error("shader {label:?} failed to compile: {message}")]
    ShaderCompile { label: String, message: String },
    #[error("program link failed: {0}")]
    ProgramLink(String),
    #[error(transparent)]
    Asset(#[from] AssetError),
    #[error("GPU out of memory allocating {bytes} bytes")]
    OutOfMemory { bytes: usize },
    #[error("unknown {kind} handle {id}")]
    UnknownHandle { kind: &'static str, id: u32 },
    #[error("scene file {path:?}: {message}")]
    SceneFile { path: PathBuf, message: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RenderError {
    /// Caller bugs in the data handed to the renderer.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::Geometry(_) | Self::TooManyLights { .. } | Self::SceneFile { .. }
        )
    }

    /// Failures to turn an external resource (shader, image, model) into a
    /// GPU object.
    pub fn is_resource_load(&self) -> bool {
        matches!(
            self,
            Self::ShaderCompile { .. } | Self::ProgramLink(_) | Self::Asset(_) | Self::Io(_)
        )
    }
}
