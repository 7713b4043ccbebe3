use glam::{Mat4, Vec3};

/// Offset applied by [`TransformOp::CubeFit`] before scaling.
pub const CUBE_FIT_OFFSET: Vec3 = Vec3::splat(1.5);
/// Uniform scale applied by [`TransformOp::CubeFit`].
pub const CUBE_FIT_SCALE: f32 = 3.0;

/// One step of a model matrix composition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransformOp {
    Translate(Vec3),
    /// Rotation in degrees around `axis`.
    Rotate { degrees: f32, axis: Vec3 },
    Scale(Vec3),
    /// Default placement of the shared cube: translate by 1.5 on every axis
    /// then scale by 3, so the centred unit cube covers `[0, 3]^3`.
    CubeFit,
}

impl TransformOp {
    pub fn matrix(&self) -> Mat4 {
        match *self {
            Self::Translate(offset) => Mat4::from_translation(offset),
            Self::Rotate { degrees, axis } => {
                let axis = axis.try_normalize().unwrap_or(Vec3::Y);
                Mat4::from_axis_angle(axis, degrees.to_radians())
            }
            Self::Scale(factor) => Mat4::from_scale(factor),
            Self::CubeFit => {
                Mat4::from_translation(CUBE_FIT_OFFSET)
                    * Mat4::from_scale(Vec3::splat(CUBE_FIT_SCALE))
            }
        }
    }
}

/// Ordered list of operations producing a model matrix.
///
/// Composition starts from identity and every op post-multiplies the
/// accumulated matrix in list order. The op issued last is therefore the
/// first one applied to a vertex: `[Translate(t), Scale(s)]` scales around
/// the cube's local origin and then moves it, while `[Scale(s), Translate(t)]`
/// also scales the translation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelTransform {
    ops: Vec<TransformOp>,
}

impl ModelTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ops(ops: Vec<TransformOp>) -> Self {
        Self { ops }
    }

    pub fn translate(mut self, offset: Vec3) -> Self {
        self.ops.push(TransformOp::Translate(offset));
        self
    }

    pub fn rotate(mut self, degrees: f32, axis: Vec3) -> Self {
        self.ops.push(TransformOp::Rotate { degrees, axis });
        self
    }

    pub fn scale(mut self, factor: Vec3) -> Self {
        self.ops.push(TransformOp::Scale(factor));
        self
    }

    pub fn cube_fit(mut self) -> Self {
        self.ops.push(TransformOp::CubeFit);
        self
    }

    pub fn ops(&self) -> &[TransformOp] {
        &self.ops
    }

    pub fn matrix(&self) -> Mat4 {
        self.ops
            .iter()
            .fold(Mat4::IDENTITY, |model, op| model * op.matrix())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn empty_transform_is_identity() {
        assert_eq!(ModelTransform::new().matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translate_then_scale_keeps_pivot_at_local_origin() {
        let model = ModelTransform::new()
            .translate(Vec3::new(4.0, 0.0, 0.0))
            .scale(Vec3::splat(2.0))
            .matrix();
        assert!(model
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(4.0, 0.0, 0.0), EPS));
        assert!(model
            .transform_point3(Vec3::X)
            .abs_diff_eq(Vec3::new(6.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn scale_then_translate_scales_the_offset() {
        let model = ModelTransform::new()
            .scale(Vec3::splat(2.0))
            .translate(Vec3::new(4.0, 0.0, 0.0))
            .matrix();
        assert!(model
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(8.0, 0.0, 0.0), EPS));
    }

    #[test]
    fn cube_fit_maps_unit_cube_to_positive_octant() {
        let model = ModelTransform::new().cube_fit().matrix();
        let min = model.transform_point3(Vec3::splat(-0.5));
        let max = model.transform_point3(Vec3::splat(0.5));
        assert!(min.abs_diff_eq(Vec3::ZERO, EPS));
        assert!(max.abs_diff_eq(Vec3::splat(3.0), EPS));
    }

    #[test]
    fn rotation_uses_degrees() {
        let model = ModelTransform::new()
            .rotate(90.0, Vec3::new(0.0, 0.0, 2.0))
            .matrix();
        assert!(model.transform_point3(Vec3::X).abs_diff_eq(Vec3::Y, EPS));
    }

    #[test]
    fn zero_axis_falls_back_to_world_up() {
        let op = TransformOp::Rotate {
            degrees: 90.0,
            axis: Vec3::ZERO,
        };
        let rotated = op.matrix().transform_point3(Vec3::X);
        assert!(rotated.abs_diff_eq(Vec3::NEG_Z, EPS));
    }
}
