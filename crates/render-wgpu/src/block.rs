use std::collections::HashMap;

use glam::{Mat4, Vec3};
use glint_render::{UniformKind, UniformLayout, UniformLocation, UniformValue};

/// CPU copy of one program's uniform block.
///
/// `set_uniform` writes here; every draw snapshots the bytes into the
/// frame's uniform buffer. Samplers live outside the block and only record
/// the texture unit they point at.
#[derive(Debug, Clone)]
pub(crate) struct UniformBlock {
    layout: UniformLayout,
    bytes: Vec<u8>,
    samplers: HashMap<UniformLocation, i32>,
}

impl UniformBlock {
    pub fn new(layout: UniformLayout) -> Self {
        let bytes = vec![0; layout.block_size() as usize];
        Self {
            layout,
            bytes,
            samplers: HashMap::new(),
        }
    }

    pub fn layout(&self) -> &UniformLayout {
        &self.layout
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns `false` (and writes nothing) for unknown locations or values
    /// of the wrong type.
    pub fn set(&mut self, location: UniformLocation, value: UniformValue) -> bool {
        let Some(entry) = self.layout.entry(location) else {
            return false;
        };
        if !value.fits(entry.kind) {
            return false;
        }
        let offset = entry.offset as usize;
        match (entry.kind, value) {
            (UniformKind::Sampler, UniformValue::Int(unit)) => {
                self.samplers.insert(location, unit);
            }
            (_, UniformValue::Float(v)) => self.write(offset, bytemuck::bytes_of(&v)),
            (_, UniformValue::Int(v)) => self.write(offset, bytemuck::bytes_of(&v)),
            (_, UniformValue::Vec3(v)) => self.write(offset, bytemuck::cast_slice(&v.to_array())),
            (_, UniformValue::Mat4(m)) => {
                self.write(offset, bytemuck::cast_slice(&m.to_cols_array()))
            }
        }
        true
    }

    fn write(&mut self, offset: usize, data: &[u8]) {
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
    }

    /// Decode what a uniform currently holds. Unset members read as zero.
    pub fn get(&self, location: UniformLocation) -> Option<UniformValue> {
        let entry = self.layout.entry(location)?;
        let at = entry.offset as usize;
        let value = match entry.kind {
            UniformKind::Float => {
                UniformValue::Float(bytemuck::pod_read_unaligned(&self.bytes[at..at + 4]))
            }
            UniformKind::Int => {
                UniformValue::Int(bytemuck::pod_read_unaligned(&self.bytes[at..at + 4]))
            }
            UniformKind::Vec3 => {
                let v: [f32; 3] = bytemuck::pod_read_unaligned(&self.bytes[at..at + 12]);
                UniformValue::Vec3(Vec3::from_array(v))
            }
            UniformKind::Mat4 => {
                let m: [f32; 16] = bytemuck::pod_read_unaligned(&self.bytes[at..at + 64]);
                UniformValue::Mat4(Mat4::from_cols_array(&m))
            }
            UniformKind::Sampler => {
                UniformValue::Int(self.samplers.get(&location).copied().unwrap_or(0))
            }
        };
        Some(value)
    }

    /// Texture unit the program's sampler reads, if it has one.
    pub fn sampler_unit(&self) -> Option<u32> {
        self.layout
            .entries()
            .iter()
            .position(|e| e.kind == UniformKind::Sampler)
            .map(|i| {
                let unit = self.samplers.get(&UniformLocation(i as u32)).copied().unwrap_or(0);
                unit.max(0) as u32
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_render::shaders;

    #[test]
    fn writes_land_at_layout_offsets() {
        let layout = shaders::lit_layout();
        let num_lights = layout.location("numLights").unwrap();
        let color = layout.location("pointLights[1].displayColor").unwrap();
        let mut block = UniformBlock::new(layout);
        assert_eq!(block.bytes().len(), 992);

        assert!(block.set(num_lights, UniformValue::Int(2)));
        assert!(block.set(color, UniformValue::Vec3(Vec3::new(1.0, 1.0, 0.7))));

        assert_eq!(&block.bytes()[220..224], &2i32.to_ne_bytes());
        let at = 224 + 96 + 80;
        assert_eq!(&block.bytes()[at + 8..at + 12], &0.7f32.to_ne_bytes());
    }

    #[test]
    fn round_trips_every_kind() {
        let layout = shaders::lit_layout();
        let loc = |n: &str| layout.location(n).unwrap();
        let values = [
            (loc("time"), UniformValue::Float(3.5)),
            (loc("numLights"), UniformValue::Int(7)),
            (loc("viewPos"), UniformValue::Vec3(Vec3::new(0.0, 1.5, 5.0))),
            (loc("view"), UniformValue::Mat4(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)))),
            (loc("texture_diffuse1"), UniformValue::Int(1)),
        ];
        let mut block = UniformBlock::new(layout.clone());
        for (l, v) in values {
            assert!(block.set(l, v));
        }
        for (l, v) in values {
            assert_eq!(block.get(l), Some(v));
        }
        assert_eq!(block.sampler_unit(), Some(1));
    }

    #[test]
    fn rejects_wrong_kind_and_unknown_location() {
        let layout = shaders::unlit_layout();
        let color = layout.location("objectColor").unwrap();
        let mut block = UniformBlock::new(layout);
        assert!(!block.set(color, UniformValue::Float(1.0)));
        assert!(!block.set(UniformLocation(99), UniformValue::Float(1.0)));
        assert_eq!(block.get(color), Some(UniformValue::Vec3(Vec3::ZERO)));
        assert_eq!(block.sampler_unit(), None);
    }
}
