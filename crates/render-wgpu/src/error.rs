/// Failures setting up the wgpu device. Everything after setup reports
/// through `RenderError` or the log.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("failed to create surface: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("no GPU adapter can present to this surface")]
    NoAdapter,
    #[error("failed to open device: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}
