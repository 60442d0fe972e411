use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::device::{GraphicsDevice, ProgramId, UniformValue};
use crate::error::RenderError;
use crate::shaders::MAX_POINT_LIGHTS;
use crate::uniform::UniformBinding;

/// Distance falloff: intensity is scaled by
/// `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Default for Attenuation {
    /// Roughly a 50 unit range.
    fn default() -> Self {
        Self {
            constant: 1.0,
            linear: 0.09,
            quadratic: 0.032,
        }
    }
}

impl Attenuation {
    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    /// World space.
    pub position: Vec3,
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub attenuation: Attenuation,
    /// Color of the light's marker sphere. Does not affect shading.
    pub display_color: Vec3,
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            ambient: Vec3::splat(0.05),
            diffuse: Vec3::splat(0.8),
            specular: Vec3::ONE,
            attenuation: Attenuation::default(),
            display_color: Vec3::new(1.0, 1.0, 0.7),
        }
    }
}

impl PointLight {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }
}

/// The members of one `pointLights[i]` element, in binding-row order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LightField {
    Position,
    Ambient,
    Diffuse,
    Specular,
    Constant,
    Linear,
    Quadratic,
    DisplayColor,
}

impl LightField {
    pub const ALL: [LightField; 8] = [
        LightField::Position,
        LightField::Ambient,
        LightField::Diffuse,
        LightField::Specular,
        LightField::Constant,
        LightField::Linear,
        LightField::Quadratic,
        LightField::DisplayColor,
    ];

    pub fn uniform_name(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Ambient => "ambient",
            Self::Diffuse => "diffuse",
            Self::Specular => "specular",
            Self::Constant => "constant",
            Self::Linear => "linear",
            Self::Quadratic => "quadratic",
            Self::DisplayColor => "displayColor",
        }
    }

    pub fn value(self, light: &PointLight) -> UniformValue {
        match self {
            Self::Position => light.position.into(),
            Self::Ambient => light.ambient.into(),
            Self::Diffuse => light.diffuse.into(),
            Self::Specular => light.specular.into(),
            Self::Constant => light.attenuation.constant.into(),
            Self::Linear => light.attenuation.linear.into(),
            Self::Quadratic => light.attenuation.quadratic.into(),
            Self::DisplayColor => light.display_color.into(),
        }
    }
}

/// `pointLights[index].field`
pub fn light_uniform_name(index: usize, field: LightField) -> String {
    format!("pointLights[{index}].{}", field.uniform_name())
}

/// One row of bindings per light, one binding per `LightField`.
pub type LightRow = [UniformBinding; 8];

/// Light uniforms resolved against one program.
#[derive(Debug, Clone, PartialEq)]
pub struct LightBindings {
    program: ProgramId,
    num_lights: UniformBinding,
    rows: Vec<LightRow>,
}

impl LightBindings {
    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn num_lights(&self) -> &UniformBinding {
        &self.num_lights
    }

    /// Row `i` holds the bindings of light `i`, fields in `LightField::ALL` order.
    pub fn rows(&self) -> &[LightRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// The scene's point lights.
///
/// The count is fixed at construction. Positions may change between frames
/// (`set_position`); the next upload carries the new value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LightSet {
    lights: Vec<PointLight>,
}

impl LightSet {
    pub fn new(lights: Vec<PointLight>) -> Result<Self, RenderError> {
        if lights.len() > MAX_POINT_LIGHTS {
            return Err(RenderError::TooManyLights {
                count: lights.len(),
                max: MAX_POINT_LIGHTS,
            });
        }
        Ok(Self { lights })
    }

    pub fn len(&self) -> usize {
        self.lights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    pub fn lights(&self) -> &[PointLight] {
        &self.lights
    }

    pub fn get(&self, index: usize) -> Option<&PointLight> {
        self.lights.get(index)
    }

    /// Move light `index`. Returns `false` if there is no such light.
    pub fn set_position(&mut self, index: usize, position: Vec3) -> bool {
        match self.lights.get_mut(index) {
            Some(light) => {
                light.position = position;
                true
            }
            None => false,
        }
    }

    /// Resolve `numLights` and every `pointLights[i].field` for this set.
    ///
    /// Call once per program after linking and keep the result; the name
    /// lookups are not meant to run per frame.
    pub fn resolve_uniforms<D: GraphicsDevice + ?Sized>(
        &self,
        device: &D,
        program: ProgramId,
    ) -> LightBindings {
        let rows: Vec<LightRow> = (0..self.lights.len())
            .map(|i| {
                LightField::ALL
                    .map(|field| {
                        UniformBinding::resolve(device, program, light_uniform_name(i, field))
                    })
            })
            .collect();
        tracing::info!(?program, lights = rows.len(), "light uniforms resolved");
        LightBindings {
            program,
            num_lights: UniformBinding::resolve(device, program, "numLights"),
            rows,
        }
    }

    /// Push `numLights` and every field of every light into the current
    /// program, which must be the one `bindings` was resolved against.
    ///
    /// Only lights that have a row in `bindings` are uploaded, and
    /// `numLights` counts exactly those.
    pub fn upload<D: GraphicsDevice + ?Sized>(&self, device: &mut D, bindings: &LightBindings) {
        let count = self.lights.len().min(bindings.rows.len());
        if count != self.lights.len() || count != bindings.rows.len() {
            tracing::warn!(
                lights = self.lights.len(),
                rows = bindings.rows.len(),
                uploaded = count,
                "light set does not match its resolved bindings"
            );
        }
        bindings.num_lights.set(device, count as i32);
        for (light, row) in self.lights.iter().zip(&bindings.rows) {
            for (field, binding) in LightField::ALL.iter().zip(row) {
                binding.set(device, field.value(light));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::build_program;
    use crate::recording::RecordingDevice;
    use crate::shaders;

    fn scene_lights() -> LightSet {
        LightSet::new(vec![
            PointLight::at(Vec3::new(0.0, 1.0, -2.0)),
            PointLight {
                position: Vec3::new(5.0, 1.0, 2.0),
                ambient: Vec3::new(0.1, 0.0, 0.0),
                diffuse: Vec3::new(0.2, 0.4, 0.6),
                specular: Vec3::splat(0.5),
                attenuation: Attenuation {
                    constant: 1.0,
                    linear: 0.7,
                    quadratic: 1.8,
                },
                display_color: Vec3::new(0.0, 1.0, 0.0),
            },
        ])
        .unwrap()
    }

    #[test]
    fn resolves_n_rows_of_eight() {
        let mut dev = RecordingDevice::new();
        let program = build_program(&mut dev, &shaders::lit_source()).unwrap();
        for n in [0, 1, 2, MAX_POINT_LIGHTS] {
            let set = LightSet::new(vec![PointLight::default(); n]).unwrap();
            let bindings = set.resolve_uniforms(&dev, program);
            assert_eq!(bindings.len(), n);
            for (i, row) in bindings.rows().iter().enumerate() {
                assert_eq!(row.len(), 8);
                assert!(row.iter().all(UniformBinding::is_resolved));
                assert_eq!(row[0].name(), format!("pointLights[{i}].position"));
                assert_eq!(row[7].name(), format!("pointLights[{i}].displayColor"));
            }
        }
    }

    #[test]
    fn upload_round_trips_through_readback() {
        let mut dev = RecordingDevice::new();
        let program = build_program(&mut dev, &shaders::lit_source()).unwrap();
        let set = scene_lights();
        let bindings = set.resolve_uniforms(&dev, program);

        dev.use_program(program);
        set.upload(&mut dev, &bindings);

        let count = bindings.num_lights().location().unwrap();
        assert_eq!(dev.uniform_value(program, count), Some(UniformValue::Int(2)));
        for (light, row) in set.lights().iter().zip(bindings.rows()) {
            for (field, binding) in LightField::ALL.iter().zip(row) {
                let loc = binding.location().unwrap();
                assert_eq!(dev.uniform_value(program, loc), Some(field.value(light)));
            }
        }
    }

    #[test]
    fn moved_light_uploads_new_position() {
        let mut dev = RecordingDevice::new();
        let program = build_program(&mut dev, &shaders::lit_source()).unwrap();
        let mut set = scene_lights();
        let bindings = set.resolve_uniforms(&dev, program);
        assert!(set.set_position(1, Vec3::new(-3.0, 2.0, 0.0)));
        assert!(!set.set_position(5, Vec3::ZERO));

        dev.use_program(program);
        set.upload(&mut dev, &bindings);
        let loc = bindings.rows()[1][0].location().unwrap();
        assert_eq!(
            dev.uniform_value(program, loc),
            Some(UniformValue::Vec3(Vec3::new(-3.0, 2.0, 0.0)))
        );
    }

    #[test]
    fn upload_counts_only_lights_with_bindings() {
        let mut dev = RecordingDevice::new();
        let program = build_program(&mut dev, &shaders::lit_source()).unwrap();
        let bindings = scene_lights().resolve_uniforms(&dev, program);
        let grown = LightSet::new(vec![
            PointLight::at(Vec3::new(1.0, 0.0, 0.0)),
            PointLight::at(Vec3::new(2.0, 0.0, 0.0)),
            PointLight::at(Vec3::new(3.0, 0.0, 0.0)),
        ])
        .unwrap();

        dev.use_program(program);
        grown.upload(&mut dev, &bindings);
        assert_eq!(dev.uniform_by_name(program, "numLights"), Some(UniformValue::Int(2)));
        assert_eq!(
            dev.uniform_by_name(program, "pointLights[1].position"),
            Some(UniformValue::Vec3(Vec3::new(2.0, 0.0, 0.0)))
        );
        assert_eq!(dev.uniform_by_name(program, "pointLights[2].position"), None);

        // Fewer lights than rows: the count shrinks with the set.
        let single = LightSet::new(vec![PointLight::default()]).unwrap();
        single.upload(&mut dev, &bindings);
        assert_eq!(dev.uniform_by_name(program, "numLights"), Some(UniformValue::Int(1)));
    }

    #[test]
    fn unlit_program_resolves_nothing_and_upload_is_harmless() {
        let mut dev = RecordingDevice::new();
        let program = build_program(&mut dev, &shaders::unlit_source()).unwrap();
        let set = scene_lights();
        let bindings = set.resolve_uniforms(&dev, program);
        assert!(!bindings.num_lights().is_resolved());
        assert!(bindings.rows().iter().flatten().all(|b| !b.is_resolved()));

        dev.use_program(program);
        let before = dev.commands().len();
        set.upload(&mut dev, &bindings);
        assert_eq!(dev.commands().len(), before);
    }

    #[test]
    fn too_many_lights_is_configuration_error() {
        let err = LightSet::new(vec![PointLight::default(); MAX_POINT_LIGHTS + 1]).unwrap_err();
        assert!(matches!(err, RenderError::TooManyLights { count: 9, max: 8 }));
        assert!(err.is_configuration());
    }

    #[test]
    fn attenuation_falls_off() {
        let a = Attenuation::default();
        assert_eq!(a.factor(0.0), 1.0);
        assert!(a.factor(10.0) < a.factor(1.0));
    }

    #[test]
    fn light_json_defaults_missing_fields() {
        let light: PointLight = serde_json::from_str(r#"{"position": [5.0, 1.0, 2.0]}"#).unwrap();
        assert_eq!(light, PointLight::at(Vec3::new(5.0, 1.0, 2.0)));
    }
}
