//! The render system collaborator.
//!
//! The Scene drives two passes per frame: a **picking pass** (blend disabled,
//! every visible object drawn with an identifier-encoding shader into an
//! offscreen target, so the editor can map a click to an entity) followed by
//! the **main pass** (blend restored, default shader, main framebuffer).
//!
//! This module records each pass as an inspectable [`RenderPass`] — the draw
//! queue a GPU backend consumes. Collection is CPU-side: sprites and text are
//! gathered from the registry and Z-sorted back-to-front (painter's
//! algorithm), which is the simplest correct ordering for 2D with
//! transparency.

use std::path::PathBuf;

use serde_json::Value;

use crate::camera::Camera;
use crate::components::{Color, FontRenderer, SpriteRenderer};
use crate::ecs::{Entity, Registry};
use crate::math::{Mat4, Transform};
use crate::settings::ProjectSettings;

/// Offscreen picking target dimensions.
const PICKING_TARGET: (u32, u32) = (3840, 2160);

/// Clear color of the picking target: zero = "no entity".
pub const PICKING_CLEAR: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);
/// Clear color of the main framebuffer.
pub const MAIN_CLEAR: Color = Color::rgba(0.45, 0.55, 0.6, 1.0);

/// Handle to a shader program. The default handle names the built-in sprite
/// shader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShaderHandle(Option<PathBuf>);

impl ShaderHandle {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self(Some(path.into()))
    }

    /// Whether this is the built-in default shader.
    pub fn is_default(&self) -> bool {
        self.0.is_none()
    }
}

/// Which target a pass renders into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassTarget {
    /// The offscreen identifier buffer used for click-to-select.
    PickingBuffer,
    /// The visible framebuffer.
    MainFramebuffer,
}

/// One recorded draw: the entity it belongs to and what to draw.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub entity: Entity,
    pub z_index: i32,
    pub model: Mat4,
    pub kind: DrawKind,
}

/// The renderable payload of a draw command.
#[derive(Debug, Clone, PartialEq)]
pub enum DrawKind {
    Sprite(SpriteRenderer),
    Text(FontRenderer),
}

/// A recorded render pass: target, pipeline state, and Z-sorted draws.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPass {
    pub target: PassTarget,
    pub shader: ShaderHandle,
    pub blend_enabled: bool,
    pub clear_color: Color,
    pub view_projection: Mat4,
    pub draws: Vec<DrawCommand>,
}

/// Records render passes for the frame. The GPU backend consumes
/// [`frame`](RenderSystem::frame) after the Scene has ordered the passes.
#[derive(Debug, Default)]
pub struct RenderSystem {
    picking_shader: ShaderHandle,
    bound_shader: ShaderHandle,
    blend_enabled: bool,
    frame: Vec<RenderPass>,
    initialized: bool,
}

impl RenderSystem {
    pub fn new() -> Self {
        Self {
            blend_enabled: true,
            ..Self::default()
        }
    }

    /// Initialize for a scene: resolve the picking shader from engine assets.
    pub fn init(&mut self, settings: &ProjectSettings) {
        self.picking_shader = ShaderHandle::from_path(settings.picking_shader_path());
        self.bound_shader = ShaderHandle::default();
        self.blend_enabled = true;
        self.frame.clear();
        self.initialized = true;
    }

    /// Tear down, dropping any recorded frame.
    pub fn destroy(&mut self) {
        self.frame.clear();
        self.initialized = false;
    }

    /// The identifier-encoding shader for the picking pass.
    pub fn picking_shader(&self) -> &ShaderHandle {
        &self.picking_shader
    }

    /// Whether `init` has run since the last `destroy`.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Bind a shader for subsequent passes.
    pub fn bind_shader(&mut self, shader: ShaderHandle) {
        self.bound_shader = shader;
    }

    /// Enable or disable alpha blending for subsequent passes.
    pub fn set_blend(&mut self, enabled: bool) {
        self.blend_enabled = enabled;
    }

    /// Drop the previous frame's recorded passes.
    pub fn begin_frame(&mut self) {
        self.frame.clear();
    }

    /// Collect the registry's renderables into a pass against `target`,
    /// using the currently bound shader and blend state.
    pub fn render(
        &mut self,
        registry: &Registry,
        camera: &Camera,
        target: PassTarget,
        clear_color: Color,
    ) {
        let mut draws = Vec::new();

        registry.view::<SpriteRenderer>(|entity, sprite| {
            let model = registry
                .get::<Transform>(entity)
                .map(Transform::matrix)
                .unwrap_or(Mat4::IDENTITY);
            draws.push(DrawCommand {
                entity,
                z_index: sprite.z_index,
                model,
                kind: DrawKind::Sprite(sprite.clone()),
            });
        });
        registry.view::<FontRenderer>(|entity, text| {
            let model = registry
                .get::<Transform>(entity)
                .map(Transform::matrix)
                .unwrap_or(Mat4::IDENTITY);
            draws.push(DrawCommand {
                entity,
                z_index: text.z_index,
                model,
                kind: DrawKind::Text(text.clone()),
            });
        });

        // Painter's algorithm: back-to-front, ties broken by entity index so
        // the order is stable across frames.
        draws.sort_by_key(|d| (d.z_index, d.entity.index()));

        self.frame.push(RenderPass {
            target,
            shader: self.bound_shader.clone(),
            blend_enabled: self.blend_enabled,
            clear_color,
            view_projection: camera.view_projection(),
            draws,
        });
    }

    /// The passes recorded since [`begin_frame`](RenderSystem::begin_frame).
    pub fn frame(&self) -> &[RenderPass] {
        &self.frame
    }

    /// Picking target dimensions, for viewport setup in the backend.
    pub fn picking_target_size(&self) -> (u32, u32) {
        PICKING_TARGET
    }

    // ── Component deserializers ──────────────────────────────────────

    /// Restore a sprite-renderer component from a scene record body.
    pub fn deserialize_sprite_renderer(body: &Value, entity: Entity, registry: &mut Registry) {
        match serde_json::from_value::<SpriteRenderer>(body.clone()) {
            Ok(sprite) => registry.insert(entity, sprite),
            Err(e) => log::warn!("unreadable SpriteRenderer record for {entity}: {e}"),
        }
    }

    /// Restore a font-renderer component from a scene record body.
    pub fn deserialize_font_renderer(body: &Value, entity: Entity, registry: &mut Registry) {
        match serde_json::from_value::<FontRenderer>(body.clone()) {
            Ok(text) => registry.insert(entity, text),
            Err(e) => log::warn!("unreadable FontRenderer record for {entity}: {e}"),
        }
    }
}
