//! Convenience re-exports — `use ormr::prelude::*` for the common items.

pub use crate::assets::{
    AssetManager, FilterMode, FontHandle, TextureHandle, TextureSpec, WrapMode,
};
pub use crate::camera::Camera;
pub use crate::components::{
    Aabb, BodyType2D, Box2D, Color, FontRenderer, Rigidbody2D, SpriteRenderer, Tag,
};
pub use crate::ecs::{Entity, Registry};
pub use crate::math::{Mat4, Quat, Transform, Vec2, Vec3, Vec4};
pub use crate::physics::PhysicsSystem;
pub use crate::render::{DrawCommand, DrawKind, PassTarget, RenderPass, RenderSystem, ShaderHandle};
pub use crate::scene::codec::ComponentKind;
pub use crate::scene::{EmptySceneInitializer, Scene, SceneInitializer};
pub use crate::scripting::{ScriptComponents, ScriptRecord, ScriptSystem};
pub use crate::settings::ProjectSettings;
pub use crate::watch::ScriptWatcher;
