//! String-keyed uniform state shared between the scene drawer and the GPU.
//!
//! Values written to a block persist until they are overwritten. Each
//! [`FrameRecorder::draw_cube`] call snapshots the current per-draw block, so
//! consecutive draws that share a material only need to send it once.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Vec3, Vec4};
use thiserror::Error;

pub const PROJECTION: &str = "projection";
pub const VIEW: &str = "view";
pub const VIEW_POSITION: &str = "viewPos";
pub const CEILING_LAMP_STATUS: &str = "ceilingLampStatus";
pub const NIGHT_LAMP_STATUS: &str = "nightLampStatus";
pub const CEILING_LAMP_POSITION: &str = "ceilingLampPos";
pub const NIGHT_LAMP_POSITION: &str = "nightLampPos";
pub const DIRECTIONAL_LIGHT: &str = "dirLightDirection";

pub const MODEL: &str = "model";
pub const COLOR: &str = "color";
pub const MATERIAL_AMBIENT: &str = "fragMaterial.ambient";
pub const MATERIAL_DIFFUSE: &str = "fragMaterial.diffuse";
pub const MATERIAL_SPECULAR: &str = "fragMaterial.specular";
pub const MATERIAL_EMISSION: &str = "fragMaterial.emission";
pub const MATERIAL_SHININESS: &str = "fragMaterial.shininess";
pub const MATERIAL_KA: &str = "fragMaterial.ka";
pub const MATERIAL_KD: &str = "fragMaterial.kd";
pub const MATERIAL_KS: &str = "fragMaterial.ks";

/// Lighting model expected by the active shader configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadingModel {
    /// One RGBA color per draw, no lighting.
    #[default]
    Flat,
    /// Ambient/diffuse/specular/emission material lit by the scene lamps.
    Lit,
}

impl ShadingModel {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "flat" => Some(Self::Flat),
            "lit" => Some(Self::Lit),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Flat => "flat",
            Self::Lit => "lit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Float(f32),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat4(Mat4),
}

impl UniformValue {
    fn kind(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Float(_) => "float",
            Self::Vec3(_) => "vec3",
            Self::Vec4(_) => "vec4",
            Self::Mat4(_) => "mat4",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum UniformError {
    #[error("unknown uniform `{0}`")]
    Unknown(String),
    #[error("uniform `{name}` expects a {expected}, got a {found}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("uniform `{name}` is not available with {shading:?} shading")]
    WrongShading { name: String, shading: ShadingModel },
}

fn mismatch(name: &str, expected: &'static str, value: &UniformValue) -> UniformError {
    UniformError::TypeMismatch {
        name: name.to_string(),
        expected,
        found: value.kind(),
    }
}

/// Destination for named uniform writes.
pub trait UniformSink {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError>;

    fn set_bool(&mut self, name: &str, value: bool) -> Result<(), UniformError> {
        self.set_uniform(name, UniformValue::Bool(value))
    }

    fn set_f32(&mut self, name: &str, value: f32) -> Result<(), UniformError> {
        self.set_uniform(name, UniformValue::Float(value))
    }

    fn set_vec3(&mut self, name: &str, value: Vec3) -> Result<(), UniformError> {
        self.set_uniform(name, UniformValue::Vec3(value))
    }

    fn set_vec4(&mut self, name: &str, value: Vec4) -> Result<(), UniformError> {
        self.set_uniform(name, UniformValue::Vec4(value))
    }

    fn set_mat4(&mut self, name: &str, value: Mat4) -> Result<(), UniformError> {
        self.set_uniform(name, UniformValue::Mat4(value))
    }
}

/// GPU layout of the per-frame uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniform {
    pub projection: [[f32; 4]; 4],
    pub view: [[f32; 4]; 4],
    pub view_position: [f32; 4],
    pub ceiling_lamp_position: [f32; 4],
    pub night_lamp_position: [f32; 4],
    pub directional_light: [f32; 4],
    /// x = ceiling lamp on, y = night lamp on.
    pub lamp_status: [f32; 4],
}

/// Uniforms set once per frame and shared by every draw in it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    raw: GlobalUniform,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            raw: GlobalUniform {
                projection: Mat4::IDENTITY.to_cols_array_2d(),
                view: Mat4::IDENTITY.to_cols_array_2d(),
                ..GlobalUniform::zeroed()
            },
        }
    }
}

impl FrameUniforms {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw(&self) -> &GlobalUniform {
        &self.raw
    }

    pub fn view(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.raw.view)
    }

    pub fn ceiling_lamp_on(&self) -> bool {
        self.raw.lamp_status[0] > 0.5
    }

    pub fn night_lamp_on(&self) -> bool {
        self.raw.lamp_status[1] > 0.5
    }
}

impl UniformSink for FrameUniforms {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let raw = &mut self.raw;
        match (name, value) {
            (PROJECTION, UniformValue::Mat4(m)) => raw.projection = m.to_cols_array_2d(),
            (VIEW, UniformValue::Mat4(m)) => raw.view = m.to_cols_array_2d(),
            (VIEW_POSITION, UniformValue::Vec3(v)) => raw.view_position = v.extend(1.0).into(),
            (CEILING_LAMP_POSITION, UniformValue::Vec3(v)) => {
                raw.ceiling_lamp_position = v.extend(1.0).into()
            }
            (NIGHT_LAMP_POSITION, UniformValue::Vec3(v)) => {
                raw.night_lamp_position = v.extend(1.0).into()
            }
            (DIRECTIONAL_LIGHT, UniformValue::Vec3(v)) => {
                raw.directional_light = v.normalize_or_zero().extend(0.0).into()
            }
            (CEILING_LAMP_STATUS, UniformValue::Bool(on)) => raw.lamp_status[0] = flag(on),
            (NIGHT_LAMP_STATUS, UniformValue::Bool(on)) => raw.lamp_status[1] = flag(on),
            (PROJECTION | VIEW, other) => return Err(mismatch(name, "mat4", &other)),
            (
                VIEW_POSITION | CEILING_LAMP_POSITION | NIGHT_LAMP_POSITION | DIRECTIONAL_LIGHT,
                other,
            ) => return Err(mismatch(name, "vec3", &other)),
            (CEILING_LAMP_STATUS | NIGHT_LAMP_STATUS, other) => {
                return Err(mismatch(name, "bool", &other))
            }
            _ => return Err(UniformError::Unknown(name.to_string())),
        }
        Ok(())
    }
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// GPU layout of the per-draw uniforms.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub model: [[f32; 4]; 4],
    pub normal: [[f32; 4]; 3],
    pub color: [f32; 4],
    pub ambient: [f32; 4],
    pub diffuse: [f32; 4],
    pub specular: [f32; 4],
    pub emission: [f32; 4],
    /// x = shininess, y = ka, z = kd, w = ks.
    pub coefficients: [f32; 4],
}

/// Per-draw uniform block for one shading model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UniformBlock {
    shading: ShadingModel,
    constants: ObjectConstants,
}

impl UniformBlock {
    pub fn new(shading: ShadingModel) -> Self {
        let mut constants = ObjectConstants::zeroed();
        constants.model = Mat4::IDENTITY.to_cols_array_2d();
        constants.normal = mat3_to_3x4(Mat3::IDENTITY);
        Self { shading, constants }
    }

    pub fn shading(&self) -> ShadingModel {
        self.shading
    }

    pub fn constants(&self) -> &ObjectConstants {
        &self.constants
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.constants.model)
    }

    fn require(&self, name: &str, shading: ShadingModel) -> Result<(), UniformError> {
        if self.shading == shading {
            Ok(())
        } else {
            Err(UniformError::WrongShading {
                name: name.to_string(),
                shading: self.shading,
            })
        }
    }
}

impl UniformSink for UniformBlock {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        let expected = match name {
            MODEL => "mat4",
            COLOR => {
                self.require(name, ShadingModel::Flat)?;
                "vec4"
            }
            MATERIAL_AMBIENT | MATERIAL_DIFFUSE | MATERIAL_SPECULAR | MATERIAL_EMISSION => {
                self.require(name, ShadingModel::Lit)?;
                "vec3"
            }
            MATERIAL_SHININESS | MATERIAL_KA | MATERIAL_KD | MATERIAL_KS => {
                self.require(name, ShadingModel::Lit)?;
                "float"
            }
            _ => return Err(UniformError::Unknown(name.to_string())),
        };

        let c = &mut self.constants;
        match (name, value) {
            (MODEL, UniformValue::Mat4(model)) => {
                c.model = model.to_cols_array_2d();
                c.normal = mat3_to_3x4(normal_matrix(model));
            }
            (COLOR, UniformValue::Vec4(color)) => c.color = color.into(),
            (MATERIAL_AMBIENT, UniformValue::Vec3(v)) => c.ambient = v.extend(1.0).into(),
            (MATERIAL_DIFFUSE, UniformValue::Vec3(v)) => c.diffuse = v.extend(1.0).into(),
            (MATERIAL_SPECULAR, UniformValue::Vec3(v)) => c.specular = v.extend(1.0).into(),
            (MATERIAL_EMISSION, UniformValue::Vec3(v)) => c.emission = v.extend(1.0).into(),
            (MATERIAL_SHININESS, UniformValue::Float(v)) => c.coefficients[0] = v,
            (MATERIAL_KA, UniformValue::Float(v)) => c.coefficients[1] = v,
            (MATERIAL_KD, UniformValue::Float(v)) => c.coefficients[2] = v,
            (MATERIAL_KS, UniformValue::Float(v)) => c.coefficients[3] = v,
            (_, other) => return Err(mismatch(name, expected, &other)),
        }
        Ok(())
    }
}

/// Inverse-transpose of the upper 3x3, falling back to identity for
/// degenerate (zero scale) models.
fn normal_matrix(model: Mat4) -> Mat3 {
    let linear = Mat3::from_mat4(model);
    if linear.determinant().abs() <= f32::EPSILON * f32::EPSILON {
        Mat3::IDENTITY
    } else {
        linear.inverse().transpose()
    }
}

fn mat3_to_3x4(matrix: Mat3) -> [[f32; 4]; 3] {
    let cols = matrix.to_cols_array();
    [
        [cols[0], cols[1], cols[2], 0.0],
        [cols[3], cols[4], cols[5], 0.0],
        [cols[6], cols[7], cols[8], 0.0],
    ]
}

/// A recorded draw of the shared cube.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCall {
    pub constants: ObjectConstants,
}

/// Collects one frame's draws against a persistent uniform block.
#[derive(Debug, Clone)]
pub struct FrameRecorder {
    block: UniformBlock,
    draws: Vec<DrawCall>,
}

impl FrameRecorder {
    pub fn new(shading: ShadingModel) -> Self {
        Self {
            block: UniformBlock::new(shading),
            draws: Vec::new(),
        }
    }

    pub fn shading(&self) -> ShadingModel {
        self.block.shading()
    }

    /// Draws the shared cube with whatever uniforms are currently set.
    pub fn draw_cube(&mut self) {
        self.draws.push(DrawCall {
            constants: *self.block.constants(),
        });
    }

    pub fn draws(&self) -> &[DrawCall] {
        &self.draws
    }

    pub fn into_draws(self) -> Vec<DrawCall> {
        self.draws
    }
}

impl UniformSink for FrameRecorder {
    fn set_uniform(&mut self, name: &str, value: UniformValue) -> Result<(), UniformError> {
        self.block.set_uniform(name, value)
    }
}
