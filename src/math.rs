//! Math types and glam re-exports.
//!
//! We re-export [glam](https://docs.rs/glam) types so users don't need to
//! depend on it directly. The [`Transform`] type is the spatial component
//! every scene entity starts with.

use serde::{Deserialize, Serialize};

pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};

/// Position, rotation, and scale of an entity.
///
/// Works for both 2D and 2.5D layering — 2D entities use Z only for draw
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    /// Identity transform (origin, no rotation, uniform scale of 1).
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Create a transform at the given position.
    pub fn from_xyz(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vec3::new(x, y, z),
            ..Self::IDENTITY
        }
    }

    /// Create a transform at the given 2D position (z = 0).
    pub fn from_xy(x: f32, y: f32) -> Self {
        Self::from_xyz(x, y, 0.0)
    }

    /// Return a copy with uniform scale applied.
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = Vec3::splat(scale);
        self
    }

    /// Rotation around the Z axis, in radians. The 2D reading of `rotation`.
    pub fn angle(&self) -> f32 {
        let (z, _y, _x) = self.rotation.to_euler(glam::EulerRot::ZYX);
        z
    }

    /// Set the rotation from a Z-axis angle in radians.
    pub fn set_angle(&mut self, radians: f32) {
        self.rotation = Quat::from_rotation_z(radians);
    }

    /// Compute the 4x4 model matrix.
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let t = Transform::default();
        assert_eq!(t, Transform::IDENTITY);
        assert_eq!(t.matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn angle_round_trip() {
        let mut t = Transform::default();
        t.set_angle(1.25);
        assert!((t.angle() - 1.25).abs() < 1e-5);
    }

    #[test]
    fn partial_record_uses_defaults() {
        // Deserializing a record that only carries a position must fill the
        // remaining fields with identity values.
        let t: Transform =
            serde_json::from_str(r#"{"position": [4.0, 5.0, 0.0]}"#).unwrap();
        assert_eq!(t.position, Vec3::new(4.0, 5.0, 0.0));
        assert_eq!(t.rotation, Quat::IDENTITY);
        assert_eq!(t.scale, Vec3::ONE);
    }
}
