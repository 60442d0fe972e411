//! Uniform block layouts and resolved bindings.
//!
//! A program declares its uniforms as a `UniformLayout`: an ordered list of
//! named members laid out with WGSL uniform address-space rules. Locations
//! are indices into that list, resolved once after linking and cached in
//! `UniformBinding`s.

use std::collections::HashMap;

use crate::device::{GraphicsDevice, ProgramId, UniformLocation, UniformValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UniformKind {
    Float,
    Int,
    Vec3,
    Mat4,
    /// A texture sampler. Not part of the uniform block; its value is the
    /// texture unit to sample from.
    Sampler,
}

impl UniformKind {
    fn align(self) -> u32 {
        match self {
            Self::Float | Self::Int => 4,
            Self::Vec3 | Self::Mat4 => 16,
            Self::Sampler => 1,
        }
    }

    /// Bytes occupied in the uniform block.
    pub fn size(self) -> u32 {
        match self {
            Self::Float | Self::Int => 4,
            Self::Vec3 => 12,
            Self::Mat4 => 64,
            Self::Sampler => 0,
        }
    }
}

fn round_up(value: u32, align: u32) -> u32 {
    value.div_ceil(align) * align
}

#[derive(Debug, Clone, PartialEq)]
pub struct UniformEntry {
    pub name: String,
    pub kind: UniformKind,
    /// Byte offset in the block. Zero for samplers.
    pub offset: u32,
}

/// Member list of a struct used in a uniform array.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructLayout {
    fields: Vec<(String, UniformKind)>,
}

impl StructLayout {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn float(self, name: &str) -> Self {
        self.field(name, UniformKind::Float)
    }

    pub fn int(self, name: &str) -> Self {
        self.field(name, UniformKind::Int)
    }

    pub fn vec3(self, name: &str) -> Self {
        self.field(name, UniformKind::Vec3)
    }

    pub fn mat4(self, name: &str) -> Self {
        self.field(name, UniformKind::Mat4)
    }

    fn field(mut self, name: &str, kind: UniformKind) -> Self {
        debug_assert!(kind != UniformKind::Sampler, "samplers cannot live in a struct");
        self.fields.push((name.to_owned(), kind));
        self
    }

    /// Field offsets and the array stride (struct size rounded up to 16).
    fn offsets(&self) -> (Vec<u32>, u32) {
        let mut cursor = 0;
        let offsets = self
            .fields
            .iter()
            .map(|(_, kind)| {
                let offset = round_up(cursor, kind.align());
                cursor = offset + kind.size();
                offset
            })
            .collect();
        (offsets, round_up(cursor.max(1), 16))
    }
}

/// A program's uniforms: names, kinds and block offsets.
#[derive(Debug, Clone, Default)]
pub struct UniformLayout {
    entries: Vec<UniformEntry>,
    by_name: HashMap<String, usize>,
    block_size: u32,
}

impl PartialEq for UniformLayout {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries && self.block_size == other.block_size
    }
}

impl UniformLayout {
    pub fn builder() -> UniformLayoutBuilder {
        UniformLayoutBuilder::default()
    }

    pub fn location(&self, name: &str) -> Option<UniformLocation> {
        self.by_name
            .get(name)
            .map(|&i| UniformLocation(i as u32))
    }

    pub fn entry(&self, location: UniformLocation) -> Option<&UniformEntry> {
        self.entries.get(location.0 as usize)
    }

    pub fn entries(&self) -> &[UniformEntry] {
        &self.entries
    }

    /// Size of the uniform block in bytes, a multiple of 16.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct UniformLayoutBuilder {
    entries: Vec<UniformEntry>,
    cursor: u32,
}

impl UniformLayoutBuilder {
    pub fn float(self, name: &str) -> Self {
        self.member(name, UniformKind::Float)
    }

    pub fn int(self, name: &str) -> Self {
        self.member(name, UniformKind::Int)
    }

    pub fn vec3(self, name: &str) -> Self {
        self.member(name, UniformKind::Vec3)
    }

    pub fn mat4(self, name: &str) -> Self {
        self.member(name, UniformKind::Mat4)
    }

    pub fn sampler(mut self, name: &str) -> Self {
        self.entries.push(UniformEntry {
            name: name.to_owned(),
            kind: UniformKind::Sampler,
            offset: 0,
        });
        self
    }

    /// `len` copies of `layout`, addressed as `name[i].field`.
    pub fn struct_array(mut self, name: &str, len: usize, layout: &StructLayout) -> Self {
        let (offsets, stride) = layout.offsets();
        let base = round_up(self.cursor, 16);
        for i in 0..len {
            let element = base + i as u32 * stride;
            for ((field, kind), offset) in layout.fields.iter().zip(&offsets) {
                self.entries.push(UniformEntry {
                    name: format!("{name}[{i}].{field}"),
                    kind: *kind,
                    offset: element + offset,
                });
            }
        }
        self.cursor = base + len as u32 * stride;
        self
    }

    fn member(mut self, name: &str, kind: UniformKind) -> Self {
        let offset = round_up(self.cursor, kind.align());
        self.cursor = offset + kind.size();
        self.entries.push(UniformEntry {
            name: name.to_owned(),
            kind,
            offset,
        });
        self
    }

    pub fn build(self) -> UniformLayout {
        let by_name = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.name.clone(), i))
            .collect();
        UniformLayout {
            entries: self.entries,
            by_name,
            block_size: round_up(self.cursor.max(1), 16),
        }
    }
}

/// Shader code plus the uniforms it declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderSource {
    pub label: String,
    pub code: String,
    pub uniforms: UniformLayout,
}

/// A uniform name resolved against one program.
///
/// Unresolved bindings (the program has no such uniform) are kept so the
/// binding table keeps its shape; setting them does nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBinding {
    name: String,
    location: Option<UniformLocation>,
}

impl UniformBinding {
    pub fn resolve<D: GraphicsDevice + ?Sized>(
        device: &D,
        program: ProgramId,
        name: impl Into<String>,
    ) -> Self {
        let name = name.into();
        let location = device.uniform_location(program, &name);
        if location.is_none() {
            tracing::warn!(?program, %name, "uniform not found; uploads to it are dropped");
        }
        Self { name, location }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> Option<UniformLocation> {
        self.location
    }

    pub fn is_resolved(&self) -> bool {
        self.location.is_some()
    }

    /// Upload to the current program.
    pub fn set<D: GraphicsDevice + ?Sized>(&self, device: &mut D, value: impl Into<UniformValue>) {
        if let Some(location) = self.location {
            device.set_uniform(location, value.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light_struct() -> StructLayout {
        StructLayout::new()
            .vec3("position")
            .vec3("ambient")
            .vec3("diffuse")
            .vec3("specular")
            .float("constant")
            .float("linear")
            .float("quadratic")
            .vec3("displayColor")
    }

    fn offset(layout: &UniformLayout, name: &str) -> u32 {
        let loc = layout.location(name).unwrap();
        layout.entry(loc).unwrap().offset
    }

    #[test]
    fn scalars_pack_after_vec3() {
        let layout = UniformLayout::builder()
            .mat4("model")
            .vec3("viewPos")
            .float("time")
            .vec3("objectColor")
            .int("numLights")
            .build();
        assert_eq!(offset(&layout, "model"), 0);
        assert_eq!(offset(&layout, "viewPos"), 64);
        assert_eq!(offset(&layout, "time"), 76);
        assert_eq!(offset(&layout, "objectColor"), 80);
        assert_eq!(offset(&layout, "numLights"), 92);
        assert_eq!(layout.block_size(), 96);
    }

    #[test]
    fn struct_array_matches_wgsl_rules() {
        let layout = UniformLayout::builder()
            .float("time")
            .struct_array("pointLights", 2, &light_struct())
            .build();
        // Array starts on a 16-byte boundary; each element is 96 bytes.
        assert_eq!(offset(&layout, "pointLights[0].position"), 16);
        assert_eq!(offset(&layout, "pointLights[0].specular"), 16 + 48);
        assert_eq!(offset(&layout, "pointLights[0].constant"), 16 + 60);
        assert_eq!(offset(&layout, "pointLights[0].quadratic"), 16 + 68);
        assert_eq!(offset(&layout, "pointLights[0].displayColor"), 16 + 80);
        assert_eq!(offset(&layout, "pointLights[1].position"), 16 + 96);
        assert_eq!(layout.block_size(), 16 + 2 * 96);
        assert_eq!(layout.len(), 1 + 2 * 8);
    }

    #[test]
    fn samplers_take_no_block_space() {
        let layout = UniformLayout::builder()
            .vec3("objectColor")
            .sampler("texture_diffuse1")
            .build();
        let loc = layout.location("texture_diffuse1").unwrap();
        assert_eq!(layout.entry(loc).unwrap().kind, UniformKind::Sampler);
        assert_eq!(layout.block_size(), 16);
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let layout = UniformLayout::builder()
            .struct_array("pointLights", 1, &light_struct())
            .build();
        assert!(layout.location("pointLights[1].position").is_none());
        assert!(layout.location("pointLights[0].position").is_some());
    }

    #[test]
    fn locations_follow_declaration_order() {
        let layout = UniformLayout::builder().mat4("a").float("b").build();
        assert_eq!(layout.location("a"), Some(UniformLocation(0)));
        assert_eq!(layout.location("b"), Some(UniformLocation(1)));
    }
}
