//! The built-in component kinds.
//!
//! The engine recognizes a fixed, closed set of component types. Each type
//! here is plain serializable data; behavior lives in the subsystems that
//! consume them (render, physics, scripting). Every field set tolerates
//! partially-populated records via `#[serde(default)]`, so a scene file that
//! predates a field still loads.

use serde::{Deserialize, Serialize};

use crate::assets::{FontHandle, TextureHandle};
use crate::math::Vec2;

/// An RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    pub const RED: Self = Self::rgb(1.0, 0.0, 0.0);
    pub const GREEN: Self = Self::rgb(0.0, 1.0, 0.0);
    pub const BLUE: Self = Self::rgb(0.0, 0.0, 1.0);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// A textured (or solid-colored) quad.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpriteRenderer {
    /// Tint color multiplied with the texture sample.
    pub color: Color,
    /// Texture to draw. `None` renders a solid colored quad.
    pub texture: Option<TextureHandle>,
    /// Draw-order layer. Higher values draw on top.
    pub z_index: i32,
}

impl SpriteRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_texture(mut self, texture: TextureHandle) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }
}

/// A run of text drawn with a loaded font.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FontRenderer {
    pub text: String,
    pub font: Option<FontHandle>,
    pub font_size: f32,
    pub color: Color,
    pub z_index: i32,
}

impl FontRenderer {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: 16.0,
            ..Self::default()
        }
    }
}

/// How a rigid body responds to the simulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BodyType2D {
    /// Moved by forces and gravity.
    #[default]
    Dynamic,
    /// Driven by transform updates, unaffected by forces.
    Kinematic,
    /// Never moves.
    Static,
}

/// A 2D rigid body. Pair with a [`Transform`](crate::math::Transform); the
/// physics system creates the backing body when the entity is registered.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Rigidbody2D {
    pub body_type: BodyType2D,
    pub velocity: Vec2,
    pub angular_damping: f32,
    pub linear_damping: f32,
    pub mass: f32,
    /// Lock rotation so collisions never spin the body.
    pub fixed_rotation: bool,
    /// Enable continuous collision detection for fast-moving bodies.
    pub continuous_collision: bool,
}

impl Rigidbody2D {
    pub fn dynamic() -> Self {
        Self {
            mass: 1.0,
            ..Self::default()
        }
    }

    pub fn fixed() -> Self {
        Self {
            body_type: BodyType2D::Static,
            ..Self::default()
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.velocity = velocity;
        self
    }
}

/// A rectangular collider, expressed as half-extents around an offset from
/// the entity's transform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Box2D {
    pub half_size: Vec2,
    pub offset: Vec2,
    pub friction: f32,
    pub density: f32,
}

impl Default for Box2D {
    fn default() -> Self {
        Self {
            half_size: Vec2::splat(0.5),
            offset: Vec2::ZERO,
            friction: 0.5,
            density: 1.0,
        }
    }
}

/// An axis-aligned bounding box used for broad-phase queries and picking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Aabb {
    pub size: Vec2,
    pub offset: Vec2,
}

impl Default for Aabb {
    fn default() -> Self {
        Self {
            size: Vec2::ONE,
            offset: Vec2::ZERO,
        }
    }
}

/// Editor-facing entity metadata: display name and hierarchy/selection state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tag {
    pub name: String,
    pub selected: bool,
    pub has_children: bool,
}

impl Tag {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rigidbody_partial_record_fills_defaults() {
        let rb: Rigidbody2D =
            serde_json::from_str(r#"{"velocity": [1.0, -2.0]}"#).unwrap();
        assert_eq!(rb.velocity, Vec2::new(1.0, -2.0));
        assert_eq!(rb.body_type, BodyType2D::Dynamic);
        assert!(!rb.fixed_rotation);
    }

    #[test]
    fn box_collider_defaults_are_sane() {
        let b = Box2D::default();
        assert_eq!(b.half_size, Vec2::splat(0.5));
        assert!(b.density > 0.0);
    }

    #[test]
    fn sprite_round_trips_through_json() {
        let sprite = SpriteRenderer::new()
            .with_color(Color::rgba(0.2, 0.4, 0.6, 0.8))
            .with_z_index(3);
        let json = serde_json::to_value(&sprite).unwrap();
        let back: SpriteRenderer = serde_json::from_value(json).unwrap();
        assert_eq!(back, sprite);
    }
}
