use crate::device::{GraphicsDevice, ProgramId, ShaderStage};
use crate::error::RenderError;
use crate::uniform::ShaderSource;

/// Compile both stages of `source` and link them.
///
/// The stage objects are released once linked (or once either step fails);
/// only the program handle survives.
pub fn build_program<D: GraphicsDevice + ?Sized>(
    device: &mut D,
    source: &ShaderSource,
) -> Result<ProgramId, RenderError> {
    let vertex = device.compile_shader(source, ShaderStage::Vertex)?;
    let fragment = match device.compile_shader(source, ShaderStage::Fragment) {
        Ok(f) => f,
        Err(e) => {
            device.delete_shader(vertex);
            return Err(e);
        }
    };

    let linked = device.link_program(vertex, fragment);
    device.delete_shader(vertex);
    device.delete_shader(fragment);

    let program = linked?;
    tracing::info!(
        label = %source.label,
        ?program,
        uniforms = source.uniforms.len(),
        "program linked"
    );
    Ok(program)
}
