//! Shader sources for the two programs the renderer links: a Phong program
//! lit by an array of point lights, and a flat-color program for the light
//! markers.
//!
//! Each source carries its uniform layout. Uniform names are the ones the
//! renderer resolves (`viewPos`, `pointLights[i].constant`, ...); the WGSL
//! struct members sit at the same offsets under WGSL-legal names.

use crate::uniform::{ShaderSource, StructLayout, UniformLayout};

/// Length of the light array declared by the lit program.
pub const MAX_POINT_LIGHTS: usize = 8;

/// Texture unit the lit program samples its diffuse texture from.
pub const DIFFUSE_TEXTURE_UNIT: u32 = 0;

/// One element of `pointLights`.
pub fn point_light_struct() -> StructLayout {
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

pub fn lit_layout() -> UniformLayout {
    UniformLayout::builder()
        .mat4("model")
        .mat4("view")
        .mat4("projection")
        .vec3("viewPos")
        .float("time")
        .vec3("objectColor")
        .int("numLights")
        .struct_array("pointLights", MAX_POINT_LIGHTS, &point_light_struct())
        .sampler("texture_diffuse1")
        .build()
}

pub fn unlit_layout() -> UniformLayout {
    UniformLayout::builder()
        .mat4("model")
        .mat4("view")
        .mat4("projection")
        .vec3("objectColor")
        .build()
}

pub fn lit_source() -> ShaderSource {
    ShaderSource {
        label: "phong_lights".into(),
        code: LIT_WGSL.into(),
        uniforms: lit_layout(),
    }
}

pub fn unlit_source() -> ShaderSource {
    ShaderSource {
        label: "light_marker".into(),
        code: UNLIT_WGSL.into(),
        uniforms: unlit_layout(),
    }
}

/// Phong shading with ambient, diffuse and specular terms per point light,
/// attenuated by `1 / (constant + linear * d + quadratic * d^2)`.
pub const LIT_WGSL: &str = r#"
struct PointLight {
    position: vec3<f32>,
    ambient: vec3<f32>,
    diffuse: vec3<f32>,
    specular: vec3<f32>,
    constant_term: f32,
    linear_term: f32,
    quadratic_term: f32,
    display_color: vec3<f32>,
};

struct Uniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    view_pos: vec3<f32>,
    time: f32,
    object_color: vec3<f32>,
    num_lights: i32,
    point_lights: array<PointLight, 8>,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

@group(1) @binding(0)
var texture_diffuse1: texture_2d<f32>;
@group(1) @binding(1)
var diffuse_sampler: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
    @location(2) tex_coords: vec2<f32>,
};

@vertex
fn vs_main(v: VertexInput) -> VertexOutput {
    let world = u.model * vec4<f32>(v.position, 1.0);
    var out: VertexOutput;
    out.clip_position = u.projection * u.view * world;
    out.world_pos = world.xyz;
    // Model transforms are translate + uniform scale.
    out.normal = (u.model * vec4<f32>(v.normal, 0.0)).xyz;
    out.tex_coords = v.tex_coords;
    return out;
}

fn shade_point(
    light: PointLight,
    normal: vec3<f32>,
    frag_pos: vec3<f32>,
    view_dir: vec3<f32>,
    albedo: vec3<f32>,
) -> vec3<f32> {
    let to_light = light.position - frag_pos;
    let distance = length(to_light);
    let light_dir = to_light / max(distance, 0.0001);

    let diff = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let shine = pow(max(dot(view_dir, reflect_dir), 0.0), 32.0);

    let attenuation = 1.0 / (light.constant_term
        + light.linear_term * distance
        + light.quadratic_term * distance * distance);

    let ambient = light.ambient * albedo;
    let diffuse = light.diffuse * diff * albedo;
    let specular = light.specular * shine;
    return (ambient + diffuse + specular) * attenuation;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(texture_diffuse1, diffuse_sampler, in.tex_coords);
    let albedo = texel.rgb * u.object_color;
    let normal = normalize(in.normal);
    let view_dir = normalize(u.view_pos - in.world_pos);

    var color = vec3<f32>(0.0);
    let count = u32(clamp(u.num_lights, 0, 8));
    for (var i = 0u; i < count; i = i + 1u) {
        color += shade_point(u.point_lights[i], normal, in.world_pos, view_dir, albedo);
    }
    return vec4<f32>(color, 1.0);
}
"#;

/// Flat color, no lighting.
pub const UNLIT_WGSL: &str = r#"
struct Uniforms {
    model: mat4x4<f32>,
    view: mat4x4<f32>,
    projection: mat4x4<f32>,
    object_color: vec3<f32>,
};

@group(0) @binding(0)
var<uniform> u: Uniforms;

@vertex
fn vs_main(@location(0) position: vec3<f32>) -> @builtin(position) vec4<f32> {
    return u.projection * u.view * u.model * vec4<f32>(position, 1.0);
}

@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(u.object_color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniform::UniformKind;

    fn offset(layout: &UniformLayout, name: &str) -> u32 {
        layout.entry(layout.location(name).unwrap()).unwrap().offset
    }

    #[test]
    fn lit_layout_matches_wgsl_struct() {
        let layout = lit_layout();
        assert_eq!(offset(&layout, "viewPos"), 192);
        assert_eq!(offset(&layout, "time"), 204);
        assert_eq!(offset(&layout, "objectColor"), 208);
        assert_eq!(offset(&layout, "numLights"), 220);
        assert_eq!(offset(&layout, "pointLights[0].position"), 224);
        assert_eq!(offset(&layout, "pointLights[7].displayColor"), 224 + 7 * 96 + 80);
        assert_eq!(layout.block_size(), 224 + 8 * 96);
        let sampler = layout.location("texture_diffuse1").unwrap();
        assert_eq!(layout.entry(sampler).unwrap().kind, UniformKind::Sampler);
    }

    #[test]
    fn light_array_length_agrees_with_code() {
        assert!(LIT_WGSL.contains(&format!("array<PointLight, {MAX_POINT_LIGHTS}>")));
        assert!(LIT_WGSL.contains(&format!("clamp(u.num_lights, 0, {MAX_POINT_LIGHTS})")));
        let past_end = format!("pointLights[{MAX_POINT_LIGHTS}].position");
        assert!(lit_layout().location(&past_end).is_none());
    }

    #[test]
    fn unlit_layout() {
        let layout = super::unlit_layout();
        assert_eq!(offset(&layout, "objectColor"), 192);
        assert_eq!(layout.block_size(), 208);
        assert!(layout.location("numLights").is_none());
    }
}
