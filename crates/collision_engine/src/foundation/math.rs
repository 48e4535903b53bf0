//! Math utilities and types
//!
//! Provides the vector/matrix aliases used by the collision code together
//! with the handful of affine helpers it needs (w=1 / w=0 transforms,
//! translation and per-axis scale extraction).

pub use nalgebra::{
    Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Epsilon used when deciding whether two world matrices are the same
pub const MATRIX_EPSILON: f32 = 1.0e-6;

/// Returns true when `value` lies strictly inside `(-epsilon, epsilon)`
pub fn is_near_zero(value: f32, epsilon: f32) -> bool {
    value > -epsilon && value < epsilon
}

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Replace the scale factors
    #[must_use]
    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    /// Convert to a transformation matrix (translation * rotation * scale)
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }
}

/// Affine helpers on 4x4 matrices.
///
/// Matrices use nalgebra's column-vector convention: translation lives in
/// column 3 and the first three columns carry the (scaled) basis axes.
pub trait Mat4Ext {
    /// Transform a position (w = 1, no perspective divide)
    fn transform_point_w1(&self, v: &Vec3) -> Vec3;

    /// Transform a direction (w = 0, translation ignored)
    fn transform_vector_w0(&self, v: &Vec3) -> Vec3;

    /// Translation stored in column 3
    fn translation_vector(&self) -> Vec3;

    /// Length of each basis column
    fn axis_scales(&self) -> Vec3;

    /// Post-multiply by a non-uniform scale, i.e. scale each basis column
    fn scale_axes(&mut self, factors: &Vec3);

    /// Approximate equality used for "did it move" checks
    fn approx_eq(&self, other: &Mat4) -> bool;
}

impl Mat4Ext for Mat4 {
    fn transform_point_w1(&self, v: &Vec3) -> Vec3 {
        (self * Vec4::new(v.x, v.y, v.z, 1.0)).xyz()
    }

    fn transform_vector_w0(&self, v: &Vec3) -> Vec3 {
        (self * Vec4::new(v.x, v.y, v.z, 0.0)).xyz()
    }

    fn translation_vector(&self) -> Vec3 {
        Vec3::new(self.m14, self.m24, self.m34)
    }

    fn axis_scales(&self) -> Vec3 {
        Vec3::new(
            Vec3::new(self.m11, self.m21, self.m31).magnitude(),
            Vec3::new(self.m12, self.m22, self.m32).magnitude(),
            Vec3::new(self.m13, self.m23, self.m33).magnitude(),
        )
    }

    fn scale_axes(&mut self, factors: &Vec3) {
        for axis in 0..3 {
            self.column_mut(axis).scale_mut(factors[axis]);
        }
    }

    fn approx_eq(&self, other: &Mat4) -> bool {
        approx::relative_eq!(*self, *other, epsilon = MATRIX_EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_w1_applies_translation_w0_does_not() {
        let m = Mat4::new_translation(&Vec3::new(1.0, 2.0, 3.0));
        let v = Vec3::new(1.0, 0.0, 0.0);

        assert_relative_eq!(m.transform_point_w1(&v), Vec3::new(2.0, 2.0, 3.0));
        assert_relative_eq!(m.transform_vector_w0(&v), v);
    }

    #[test]
    fn test_axis_scales_and_scale_axes() {
        let rotation = Quat::from_axis_angle(&Vec3::y_axis(), 0.7);
        let mut m = Transform::from_position_rotation(Vec3::new(4.0, 0.0, 0.0), rotation)
            .with_scale(Vec3::new(2.0, 3.0, 4.0))
            .to_matrix();

        assert_relative_eq!(m.axis_scales(), Vec3::new(2.0, 3.0, 4.0), epsilon = 1e-5);

        m.scale_axes(&Vec3::new(0.5, 1.0 / 3.0, 0.25));
        assert_relative_eq!(m.axis_scales(), Vec3::new(1.0, 1.0, 1.0), epsilon = 1e-5);
        // Column scaling never touches the translation
        assert_relative_eq!(m.translation_vector(), Vec3::new(4.0, 0.0, 0.0));
    }

    #[test]
    fn test_approx_eq() {
        let a = Mat4::new_translation(&Vec3::new(1.0, 0.0, 0.0));
        let b = Mat4::new_translation(&Vec3::new(1.0 + 1.0e-8, 0.0, 0.0));
        let c = Mat4::new_translation(&Vec3::new(1.1, 0.0, 0.0));

        assert!(a.approx_eq(&b));
        assert!(!a.approx_eq(&c));
    }

    #[test]
    fn test_is_near_zero_is_strict() {
        assert!(is_near_zero(0.0005, 0.001));
        assert!(!is_near_zero(0.001, 0.001));
        assert!(!is_near_zero(-0.002, 0.001));
    }
}
