//! Local transforms and world-space composition.
//!
//! Entities carry a position and a unit rotation; scale is always one. The
//! composed local matrix is cached and rebuilt on every mutation. World
//! matrices are never cached: they are recomposed through the parent chain
//! on each query so reparenting or moving an ancestor is always reflected.

use glam::{Mat4, Quat, Vec3};

/// Local transform (relative to parent)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LocalTransform {
    position: Vec3,
    rotation: Quat,
    matrix: Mat4,
}

impl LocalTransform {
    pub fn identity() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            matrix: Mat4::IDENTITY,
        }
    }

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        let mut transform = Self {
            position,
            rotation: rotation.normalize(),
            matrix: Mat4::IDENTITY,
        };
        transform.compose();
        transform
    }

    pub fn with_position(position: Vec3) -> Self {
        Self::new(position, Quat::IDENTITY)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn rotation(&self) -> Quat {
        self.rotation
    }

    /// Composed from position, rotation and unit scale
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.compose();
    }

    /// Stores the normalized rotation
    pub fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation.normalize();
        self.compose();
    }

    /// Local -Z
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// Local -X
    pub fn left(&self) -> Vec3 {
        self.rotation * Vec3::NEG_X
    }

    /// Local +Y
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    fn compose(&mut self) {
        self.matrix = Mat4::from_scale_rotation_translation(Vec3::ONE, self.rotation, self.position);
    }
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self::identity()
    }
}

/// Combine parent world matrix with a child's local matrix.
/// The child's local transform is applied first.
pub fn compose_world(parent_world: Mat4, local: Mat4) -> Mat4 {
    parent_world * local
}

/// Translation part of a world matrix
pub fn matrix_position(matrix: &Mat4) -> Vec3 {
    matrix.w_axis.truncate()
}
