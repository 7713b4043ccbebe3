use glam::{Vec3, Vec4};

use crate::uniforms::{self, UniformError, UniformSink};

pub const DEFAULT_SHININESS: f32 = 0.2 * 128.0;

/// Ambient/diffuse/specular material for the lit shader.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LitMaterial {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub emission: Vec3,
    pub shininess: f32,
    pub ka: f32,
    pub kd: f32,
    pub ks: f32,
}

impl Default for LitMaterial {
    fn default() -> Self {
        Self::new(Vec3::splat(0.2), Vec3::splat(0.8))
    }
}

impl LitMaterial {
    pub fn new(ambient: Vec3, diffuse: Vec3) -> Self {
        Self {
            ambient,
            diffuse,
            specular: Vec3::ONE,
            emission: Vec3::ZERO,
            shininess: DEFAULT_SHININESS,
            ka: 1.0,
            kd: 1.0,
            ks: 1.0,
        }
    }

    pub fn with_emission(mut self, emission: Vec3) -> Self {
        self.emission = emission;
        self
    }
}

/// Appearance of one draw call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Material {
    Flat(Vec4),
    Lit(LitMaterial),
}

impl Material {
    pub fn flat(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self::Flat(Vec4::new(r, g, b, a))
    }

    /// Sends this material's uniforms. Emission is replaced by black when
    /// `emission_enabled` is false.
    pub fn apply<S: UniformSink + ?Sized>(
        &self,
        sink: &mut S,
        emission_enabled: bool,
    ) -> Result<(), UniformError> {
        match self {
            Self::Flat(color) => sink.set_vec4(uniforms::COLOR, *color),
            Self::Lit(material) => {
                let emission = if emission_enabled {
                    material.emission
                } else {
                    Vec3::ZERO
                };
                sink.set_vec3(uniforms::MATERIAL_AMBIENT, material.ambient)?;
                sink.set_vec3(uniforms::MATERIAL_DIFFUSE, material.diffuse)?;
                sink.set_vec3(uniforms::MATERIAL_SPECULAR, material.specular)?;
                sink.set_vec3(uniforms::MATERIAL_EMISSION, emission)?;
                sink.set_f32(uniforms::MATERIAL_SHININESS, material.shininess)?;
                sink.set_f32(uniforms::MATERIAL_KA, material.ka)?;
                sink.set_f32(uniforms::MATERIAL_KD, material.kd)?;
                sink.set_f32(uniforms::MATERIAL_KS, material.ks)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::uniforms::{ShadingModel, UniformBlock};

    #[test]
    fn lit_defaults_match_shader_expectations() {
        let material = LitMaterial::new(Vec3::X, Vec3::Y);
        assert_eq!(material.specular, Vec3::ONE);
        assert_eq!(material.emission, Vec3::ZERO);
        assert!((material.shininess - 25.6).abs() < 1e-6);
    }

    #[test]
    fn lit_material_fills_block() {
        let material = Material::Lit(
            LitMaterial::new(Vec3::new(0.1, 0.2, 0.3), Vec3::new(0.4, 0.5, 0.6))
                .with_emission(Vec3::ONE),
        );
        let mut block = UniformBlock::new(ShadingModel::Lit);
        material.apply(&mut block, true).unwrap();
        let constants = block.constants();
        assert_eq!(constants.ambient[..3], [0.1, 0.2, 0.3]);
        assert_eq!(constants.diffuse[..3], [0.4, 0.5, 0.6]);
        assert_eq!(constants.emission[..3], [1.0, 1.0, 1.0]);
        assert_eq!(constants.coefficients, [DEFAULT_SHININESS, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn disabled_emission_is_black() {
        let material = Material::Lit(LitMaterial::default().with_emission(Vec3::ONE));
        let mut block = UniformBlock::new(ShadingModel::Lit);
        material.apply(&mut block, false).unwrap();
        assert_eq!(block.constants().emission[..3], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn flat_material_in_lit_block_fails() {
        let mut block = UniformBlock::new(ShadingModel::Lit);
        assert!(Material::flat(1.0, 1.0, 1.0, 1.0)
            .apply(&mut block, true)
            .is_err());
    }
}
