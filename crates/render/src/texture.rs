use std::cell::Cell;
use std::path::Path;

use glint_assets::{ImageData, WrapMode};

use crate::device::{GraphicsDevice, TextureId};
use crate::error::RenderError;
use crate::uniform::UniformBinding;

/// A 2D RGBA8 texture on the GPU.
///
/// Remembers the unit it was last bound to, so `unbind` and `set_uniform`
/// need no arguments beyond the device.
#[derive(Debug)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    unit: Cell<Option<u32>>,
}

impl Texture {
    /// Decode an image file and upload it. Decode failures are reported as
    /// `RenderError::Asset`.
    pub fn from_file<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        path: impl AsRef<Path>,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
    ) -> Result<Self, RenderError> {
        let path = path.as_ref();
        let image = ImageData::from_file(path)?;
        let texture = Self::from_image(device, &image, wrap_u, wrap_v)?;
        tracing::debug!(?path, texture = ?texture.id, "texture uploaded");
        Ok(texture)
    }

    pub fn from_image<D: GraphicsDevice + ?Sized>(
        device: &mut D,
        image: &ImageData,
        wrap_u: WrapMode,
        wrap_v: WrapMode,
    ) -> Result<Self, RenderError> {
        let id = device.create_texture(image, wrap_u, wrap_v)?;
        Ok(Self {
            id,
            width: image.width,
            height: image.height,
            unit: Cell::new(None),
        })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn bound_unit(&self) -> Option<u32> {
        self.unit.get()
    }

    pub fn bind<D: GraphicsDevice + ?Sized>(&self, device: &mut D, unit: u32) {
        device.bind_texture(unit, self.id);
        self.unit.set(Some(unit));
    }

    /// Clear the unit this texture was bound to. No-op if it is not bound.
    pub fn unbind<D: GraphicsDevice + ?Sized>(&self, device: &mut D) {
        if let Some(unit) = self.unit.take() {
            device.unbind_texture(unit);
        }
    }

    /// Point a sampler uniform of the current program at this texture's unit.
    pub fn set_uniform<D: GraphicsDevice + ?Sized>(
        &self,
        device: &mut D,
        sampler: &UniformBinding,
    ) {
        match self.unit.get() {
            Some(unit) => sampler.set(device, unit as i32),
            None => tracing::warn!(texture = ?self.id, "sampler set for an unbound texture"),
        }
    }

    pub fn destroy<D: GraphicsDevice + ?Sized>(self, device: &mut D) {
        self.unbind(device);
        device.delete_texture(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::UniformValue;
    use crate::program::build_program;
    use crate::recording::{GpuCommand, RecordingDevice};
    use crate::shaders;

    #[test]
    fn bind_set_uniform_unbind() {
        let mut dev = RecordingDevice::new();
        let program = build_program(&mut dev, &shaders::lit_source()).unwrap();
        let sampler = UniformBinding::resolve(&dev, program, "texture_diffuse1");
        let image = ImageData::solid(4, 2, [255, 0, 0, 255]).unwrap();
        let tex =
            Texture::from_image(&mut dev, &image, WrapMode::Repeat, WrapMode::ClampToEdge).unwrap();
        assert_eq!(tex.size(), (4, 2));

        dev.use_program(program);
        tex.bind(&mut dev, 3);
        tex.set_uniform(&mut dev, &sampler);
        assert_eq!(dev.bound_texture(3), Some(tex.id()));
        assert_eq!(
            dev.uniform_by_name(program, "texture_diffuse1"),
            Some(UniformValue::Int(3))
        );

        tex.unbind(&mut dev);
        assert_eq!(dev.bound_texture(3), None);
        assert_eq!(tex.bound_unit(), None);
        // Second unbind does nothing.
        let before = dev.commands().len();
        tex.unbind(&mut dev);
        assert_eq!(dev.commands().len(), before);
    }

    #[test]
    fn wrap_modes_reach_the_device() {
        let mut dev = RecordingDevice::new();
        let image = ImageData::solid(1, 1, [0, 0, 0, 255]).unwrap();
        Texture::from_image(&mut dev, &image, WrapMode::MirroredRepeat, WrapMode::Repeat).unwrap();
        assert!(dev.commands().iter().any(|c| matches!(
            c,
            GpuCommand::CreateTexture {
                wrap_u: WrapMode::MirroredRepeat,
                wrap_v: WrapMode::Repeat,
                ..
            }
        )));
    }

    #[test]
    fn missing_file_is_resource_load_error() {
        let mut dev = RecordingDevice::new();
        let clamp = WrapMode::ClampToEdge;
        let err = Texture::from_file(&mut dev, "no/such/snow.jpg", clamp, clamp).unwrap_err();
        assert!(err.is_resource_load());
        assert_eq!(dev.live_textures(), 0);
    }

    #[test]
    fn destroy_unbinds_and_deletes() {
        let mut dev = RecordingDevice::new();
        let tex = Texture::from_image(
            &mut dev,
            &ImageData::solid(1, 1, [9, 9, 9, 255]).unwrap(),
            WrapMode::ClampToEdge,
            WrapMode::ClampToEdge,
        )
        .unwrap();
        tex.bind(&mut dev, 0);
        tex.destroy(&mut dev);
        assert_eq!(dev.bound_texture(0), None);
        assert_eq!(dev.live_textures(), 0);
    }
}
