//! Placements and affine transformations.
//!
//! A [`Placement`] is what a physical volume stores: GDML rotation angles
//! and a position in the mother frame. [`Transform`] is the matrix form used
//! to move points between frames for overlap checks and the viewer.

use nalgebra::{Matrix3, Rotation3, Vector3};
use serde::{Deserialize, Serialize};

/// Position and orientation of a daughter volume in its mother.
///
/// `rotation` holds GDML Tait-Bryan angles (rad) about x, y and z. GDML
/// rotations are passive: they rotate the frame, so the daughter itself is
/// turned by the inverse.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Placement {
    pub rotation: [f64; 3],
    pub position: [f64; 3],
}

impl Placement {
    /// Unrotated placement at `position`.
    pub fn at(position: [f64; 3]) -> Self {
        Self {
            rotation: [0.0; 3],
            position,
        }
    }

    /// Unrotated placement on the beam axis at `z`.
    pub fn on_axis(z: f64) -> Self {
        Self::at([0.0, 0.0, z])
    }

    pub fn with_rotation(mut self, rotation: [f64; 3]) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn is_rotated(&self) -> bool {
        self.rotation.iter().any(|a| *a != 0.0)
    }
}

/// An affine transformation: rotation matrix + translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// 3x3 rotation matrix.
    pub matrix: Matrix3<f64>,
    /// Translation vector (mm).
    pub translation: Vector3<f64>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            matrix: Matrix3::identity(),
            translation: Vector3::zeros(),
        }
    }
}

impl Transform {
    /// Daughter-to-mother transform of a placement.
    pub fn from_placement(placement: &Placement) -> Self {
        let [rx, ry, rz] = placement.rotation;
        let passive = Rotation3::from_euler_angles(rx, ry, rz).into_inner();
        let [x, y, z] = placement.position;
        Self {
            matrix: passive.transpose(),
            translation: Vector3::new(x, y, z),
        }
    }

    /// Apply this transformation to a 3D point.
    pub fn apply(&self, point: &[f64; 3]) -> [f64; 3] {
        let v = Vector3::new(point[0], point[1], point[2]);
        let result = self.matrix * v + self.translation;
        [result.x, result.y, result.z]
    }

    /// Compose two transforms: self followed by other.
    pub fn then(&self, other: &Transform) -> Transform {
        Transform {
            matrix: other.matrix * self.matrix,
            translation: other.matrix * self.translation + other.translation,
        }
    }

    /// Inverse of a rigid transform. The matrix must be orthonormal.
    pub fn inverse(&self) -> Transform {
        let inv = self.matrix.transpose();
        Transform {
            matrix: inv,
            translation: -(inv * self.translation),
        }
    }
}
