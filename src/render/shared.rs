use bytemuck::{Pod, Zeroable};

#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub(crate) struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

const fn v(position: [f32; 3], normal: [f32; 3]) -> Vertex {
    Vertex { position, normal }
}

/// Unit cube centred on the origin, four vertices per face so every face
/// carries its own normal.
#[rustfmt::skip]
pub(crate) const CUBE_VERTICES: [Vertex; 24] = [
    // +Z
    v([-0.5, -0.5,  0.5], [0.0, 0.0, 1.0]),
    v([ 0.5, -0.5,  0.5], [0.0, 0.0, 1.0]),
    v([ 0.5,  0.5,  0.5], [0.0, 0.0, 1.0]),
    v([-0.5,  0.5,  0.5], [0.0, 0.0, 1.0]),
    // -Z
    v([ 0.5, -0.5, -0.5], [0.0, 0.0, -1.0]),
    v([-0.5, -0.5, -0.5], [0.0, 0.0, -1.0]),
    v([-0.5,  0.5, -0.5], [0.0, 0.0, -1.0]),
    v([ 0.5,  0.5, -0.5], [0.0, 0.0, -1.0]),
    // -X
    v([-0.5, -0.5, -0.5], [-1.0, 0.0, 0.0]),
    v([-0.5, -0.5,  0.5], [-1.0, 0.0, 0.0]),
    v([-0.5,  0.5,  0.5], [-1.0, 0.0, 0.0]),
    v([-0.5,  0.5, -0.5], [-1.0, 0.0, 0.0]),
    // +X
    v([ 0.5, -0.5,  0.5], [1.0, 0.0, 0.0]),
    v([ 0.5, -0.5, -0.5], [1.0, 0.0, 0.0]),
    v([ 0.5,  0.5, -0.5], [1.0, 0.0, 0.0]),
    v([ 0.5,  0.5,  0.5], [1.0, 0.0, 0.0]),
    // -Y
    v([-0.5, -0.5, -0.5], [0.0, -1.0, 0.0]),
    v([ 0.5, -0.5, -0.5], [0.0, -1.0, 0.0]),
    v([ 0.5, -0.5,  0.5], [0.0, -1.0, 0.0]),
    v([-0.5, -0.5,  0.5], [0.0, -1.0, 0.0]),
    // +Y
    v([-0.5,  0.5,  0.5], [0.0, 1.0, 0.0]),
    v([ 0.5,  0.5,  0.5], [0.0, 1.0, 0.0]),
    v([ 0.5,  0.5, -0.5], [0.0, 1.0, 0.0]),
    v([-0.5,  0.5, -0.5], [0.0, 1.0, 0.0]),
];

#[rustfmt::skip]
pub(crate) const CUBE_INDICES: [u16; 36] = [
    0, 1, 2, 2, 3, 0,
    4, 5, 6, 6, 7, 4,
    8, 9, 10, 10, 11, 8,
    12, 13, 14, 14, 15, 12,
    16, 17, 18, 18, 19, 16,
    20, 21, 22, 22, 23, 20,
];

pub(crate) const SHADER: &str = r#"
struct Globals {
    projection: mat4x4<f32>,
    view: mat4x4<f32>,
    view_position: vec4<f32>,
    ceiling_lamp_position: vec4<f32>,
    night_lamp_position: vec4<f32>,
    directional_light: vec4<f32>,
    lamp_status: vec4<f32>,
}

struct ObjectConstants {
    model: mat4x4<f32>,
    normal: mat3x4<f32>,
    color: vec4<f32>,
    ambient: vec4<f32>,
    diffuse: vec4<f32>,
    specular: vec4<f32>,
    emission: vec4<f32>,
    // shininess, ka, kd, ks
    coefficients: vec4<f32>,
}

@group(0) @binding(0)
var<uniform> globals: Globals;

@group(1) @binding(0)
var<uniform> object: ObjectConstants;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) normal: vec3<f32>,
}

@vertex
fn vs_main(input: VertexInput) -> VertexOutput {
    var out: VertexOutput;
    let world_position = object.model * vec4<f32>(input.position, 1.0);
    out.position = globals.projection * globals.view * world_position;
    out.world_pos = world_position.xyz;

    let normal_matrix = mat3x3<f32>(
        object.normal[0].xyz,
        object.normal[1].xyz,
        object.normal[2].xyz
    );
    out.normal = normalize(normal_matrix * input.normal);
    return out;
}

@fragment
fn fs_flat(input: VertexOutput) -> @location(0) vec4<f32> {
    return object.color;
}

fn point_light(light_position: vec3<f32>, world_pos: vec3<f32>, normal: vec3<f32>, view_dir: vec3<f32>) -> vec3<f32> {
    let to_light = light_position - world_pos;
    let distance = length(to_light);
    let light_dir = to_light / max(distance, 0.0001);
    let attenuation = 1.0 / (1.0 + 0.09 * distance + 0.032 * distance * distance);

    let diff = max(dot(normal, light_dir), 0.0);
    let reflect_dir = reflect(-light_dir, normal);
    let spec = pow(max(dot(view_dir, reflect_dir), 0.0), max(object.coefficients.x, 1.0));

    let ambient = object.coefficients.y * object.ambient.rgb;
    let diffuse = object.coefficients.z * diff * object.diffuse.rgb;
    let specular = object.coefficients.w * spec * object.specular.rgb;
    return (ambient + diffuse + specular) * attenuation;
}

@fragment
fn fs_lit(input: VertexOutput) -> @location(0) vec4<f32> {
    let normal = normalize(input.normal);
    let view_dir = normalize(globals.view_position.xyz - input.world_pos);

    // dim fill light, always on
    let fill_dir = normalize(-globals.directional_light.xyz);
    var color = 0.15 * (object.coefficients.y * object.ambient.rgb
        + object.coefficients.z * max(dot(normal, fill_dir), 0.0) * object.diffuse.rgb);

    if (globals.lamp_status.x > 0.5) {
        color += point_light(globals.ceiling_lamp_position.xyz, input.world_pos, normal, view_dir);
    }
    if (globals.lamp_status.y > 0.5) {
        color += point_light(globals.night_lamp_position.xyz, input.world_pos, normal, view_dir);
    }
    color += object.emission.rgb;
    return vec4<f32>(color, 1.0);
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{GlobalUniform, ObjectConstants};

    #[test]
    fn cube_faces_point_outwards() {
        for face in CUBE_INDICES.chunks(6) {
            let normal = glam::Vec3::from(CUBE_VERTICES[face[0] as usize].normal);
            for &index in face {
                let vertex = CUBE_VERTICES[index as usize];
                assert_eq!(glam::Vec3::from(vertex.normal), normal);
                assert!((glam::Vec3::from(vertex.position).dot(normal) - 0.5).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn uniform_blocks_match_wgsl_layout() {
        assert_eq!(std::mem::size_of::<GlobalUniform>(), 208);
        assert_eq!(std::mem::size_of::<ObjectConstants>(), 208);
        assert_eq!(std::mem::size_of::<GlobalUniform>() % 16, 0);
    }
}
