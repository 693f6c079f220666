use bytemuck::{Pod, Zeroable};
use glam::Mat4;

/// Rotation speed of the animated triangle, in radians per second.
pub const ROTATION_SPEED: f32 = 50.0;

/// Per-draw uniform consumed by the animated vertex stage.
///
/// Layout matches the WGSL struct
/// `struct Transform { position: mat4x4<f32>, color: vec4<f32> }` (80 bytes).
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct TransformUniform {
    /// Column-major model matrix applied to positions.
    pub position: [[f32; 4]; 4],
    /// Added to every vertex color.
    pub color: [f32; 4],
}

impl TransformUniform {
    pub const IDENTITY: Self = Self {
        position: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
        color: [0.0; 4],
    };

    pub fn new(model: Mat4, color: [f32; 4]) -> Self {
        Self {
            position: model.to_cols_array_2d(),
            color,
        }
    }

    /// Transform for the animated triangle `seconds` after start.
    ///
    /// Rotates about +Z by `seconds * ROTATION_SPEED` radians and pulses the
    /// green channel between 0 and 1 once per `2π` seconds.
    pub fn at(seconds: f32) -> Self {
        let model = Mat4::from_rotation_z(seconds * ROTATION_SPEED);
        let green = seconds.sin() / 2.0 + 0.5;
        Self::new(model, [0.0, green, 0.0, 1.0])
    }

    pub fn model(&self) -> Mat4 {
        Mat4::from_cols_array_2d(&self.position)
    }
}

impl Default for TransformUniform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;
    use glam::Vec3;

    #[test]
    fn size_matches_wgsl_struct() {
        assert_eq!(std::mem::size_of::<TransformUniform>(), 80);
    }

    #[test]
    fn start_is_unrotated_half_green() {
        let t = TransformUniform::at(0.0);
        assert_eq!(t.position, TransformUniform::IDENTITY.position);
        assert_eq!(t.color, [0.0, 0.5, 0.0, 1.0]);
    }

    #[test]
    fn rotates_counter_clockwise_about_z() {
        // A quarter turn.
        let t = TransformUniform::at(PI / 2.0 / ROTATION_SPEED);
        let p = t.model().transform_point3(Vec3::X);
        assert!(p.abs_diff_eq(Vec3::Y, 1e-5), "got {p:?}");
    }

    #[test]
    fn green_channel_peaks_at_quarter_period() {
        let t = TransformUniform::at(PI / 2.0);
        assert!((t.color[1] - 1.0).abs() < 1e-6);
        let t = TransformUniform::at(3.0 * PI / 2.0);
        assert!(t.color[1].abs() < 1e-6);
        assert_eq!(t.color[3], 1.0);
    }

    #[test]
    fn bytes_are_column_major() {
        let t = TransformUniform::new(Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)), [0.0; 4]);
        let floats: &[f32] = bytemuck::cast_slice(bytemuck::bytes_of(&t));
        assert_eq!(&floats[12..16], &[1.0, 2.0, 3.0, 1.0]);
    }
}
