//! wgpu backend for the glint renderer.
//!
//! `WgpuDevice` implements `glint_render::GraphicsDevice` on top of a window
//! surface, so the same `FrameRenderer` that runs against the recording
//! device in tests draws to the screen here.
//!
//! # Invariants
//! - One render pass per frame; draws replay in submission order.
//! - Every draw sees the uniform values current when it was issued.
//! - A lost or outdated surface drops that frame and reconfigures.

mod block;
mod device;
mod error;
mod pipeline;

pub use device::WgpuDevice;
pub use error::BackendError;

pub fn crate_info() -> &'static str {
    "glint-render-wgpu v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("wgpu"));
    }
}
