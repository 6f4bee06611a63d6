//! Typed uniform values and uniform naming helpers.

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// A value written to one named uniform.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UniformValue {
    F32(f32),
    I32(i32),
    U32(u32),
    /// Narrowed to `f32` by backends without double-precision uniforms.
    /// There only GLSL `float` uniforms receive the value; a `double`
    /// uniform rejects the write.
    F64(f64),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    Mat2(Mat2),
    Mat3(Mat3),
    Mat4(Mat4),
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for UniformValue {
                fn from(value: $ty) -> Self {
                    UniformValue::$variant(value)
                }
            }
        )*
    };
}

impl_from! {
    f32 => F32,
    i32 => I32,
    u32 => U32,
    f64 => F64,
    Vec2 => Vec2,
    Vec3 => Vec3,
    Vec4 => Vec4,
    Mat2 => Mat2,
    Mat3 => Mat3,
    Mat4 => Mat4,
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        UniformValue::I32(value as i32)
    }
}

/// Name of one field of one element of a struct array, e.g. `lights[2].position`.
pub fn indexed_field(array: &str, index: usize, field: &str) -> String {
    format!("{array}[{index}].{field}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions_pick_matching_variant() {
        assert_eq!(UniformValue::from(1.5f32), UniformValue::F32(1.5));
        assert_eq!(UniformValue::from(-3i32), UniformValue::I32(-3));
        assert_eq!(UniformValue::from(3u32), UniformValue::U32(3));
        assert_eq!(UniformValue::from(0.25f64), UniformValue::F64(0.25));
        assert_eq!(UniformValue::from(true), UniformValue::I32(1));
        assert!(matches!(UniformValue::from(Mat4::IDENTITY), UniformValue::Mat4(_)));
        assert!(matches!(UniformValue::from(Vec3::ONE), UniformValue::Vec3(_)));
    }

    #[test]
    fn indexed_field_format() {
        assert_eq!(indexed_field("pointLights", 3, "linear"), "pointLights[3].linear");
    }
}
