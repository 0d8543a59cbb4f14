//! This module handles the transform of a single instance.

use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// The position, orientation, and scale of one instance for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// Where the instance is.
    pub position: Vec3,

    /// Euler angles in radians, applied in XYZ order.
    pub rotation: Vec3,

    /// A uniform scale factor.
    pub scale: f32,
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: 1.,
        }
    }
}

impl Pose {
    /// Create a pose at the given position with no rotation and unit scale.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..Self::default()
        }
    }

    /// Compose the pose into a 4x4 transform: scale, then rotate, then translate.
    pub fn to_matrix(&self) -> Mat4 {
        let [x, y, z] = self.rotation.to_array();
        Mat4::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            Quat::from_euler(EulerRot::XYZ, x, y, z),
            self.position,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn to_matrix_test() {
        let pose = Pose {
            position: Vec3::new(1., 2., 3.),
            rotation: Vec3::new(0., FRAC_PI_2, 0.),
            scale: 2.,
        };
        let matrix = pose.to_matrix();

        assert!(matrix
            .transform_point3(Vec3::ZERO)
            .abs_diff_eq(Vec3::new(1., 2., 3.), 1e-6));

        // A quarter turn about y takes +x to -z before translation
        assert!(matrix
            .transform_point3(Vec3::X)
            .abs_diff_eq(Vec3::new(1., 2., 1.), 1e-5));
    }
}
