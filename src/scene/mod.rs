//! # Scene — Lifecycle, Entity Operations, and Persistence
//!
//! The [`Scene`] is the aggregate root of the engine: it owns the component
//! [`Registry`], the camera, and the per-scene subsystems (assets, render,
//! physics, scripts), and it drives the lifecycle
//!
//! ```text
//! Uninitialized ──init──► Initialized ──destroy──► Destroyed ──init──► ...
//!                             │  ▲
//!                        play │  │ stop        (reset = destroy + init)
//!                             ▼  │
//!                           running
//! ```
//!
//! Persistence is a whole-scene affair: [`save`](Scene::save) snapshots the
//! registry into a JSON document (see [`codec`]), and [`load`](Scene::load)
//! rebuilds a scene from one, preserving entity identity so cross-references
//! recorded in the file stay valid.
//!
//! Lifecycle misuse — destroying twice, rendering before init — is a caller
//! bug and panics immediately rather than corrupting state.

pub mod codec;
pub mod initializer;

use std::fs;
use std::io;
use std::path::Path;

use serde_json::{Value, json};

use crate::assets::{AssetManager, TextureSpec, FilterMode, WrapMode};
use crate::camera::Camera;
use crate::components::{Box2D, Rigidbody2D, SpriteRenderer};
use crate::ecs::{Entity, Registry};
use crate::math::{Transform, Vec2, Vec3};
use crate::physics::PhysicsSystem;
use crate::render::{MAIN_CLEAR, PICKING_CLEAR, PassTarget, RenderSystem, ShaderHandle};
use crate::scripting::ScriptSystem;
use crate::settings::ProjectSettings;

use codec::{ComponentKind, RecordKind};
pub use initializer::{EmptySceneInitializer, SceneInitializer};

/// Gravity the physics subsystem is initialized with.
const GRAVITY: Vec2 = Vec2::new(0.0, -10.0);
/// Where the camera starts after `init`.
const CAMERA_START: Vec3 = Vec3::ZERO;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LifecycleState {
    Uninitialized,
    Initialized,
    Destroyed,
}

/// The aggregate root: registry, camera, subsystems, and lifecycle.
///
/// Constructed with a borrowed [`SceneInitializer`] that populates fresh
/// scenes; the strategy must outlive the scene.
pub struct Scene<'a> {
    registry: Registry,
    camera: Option<Camera>,
    state: LifecycleState,
    playing: bool,
    initializer: &'a dyn SceneInitializer,
    /// The document assembled by the most recent `save`.
    save_data: Value,
    pub settings: ProjectSettings,
    pub assets: AssetManager,
    pub render: RenderSystem,
    pub physics: PhysicsSystem,
    pub scripts: ScriptSystem,
}

impl<'a> Scene<'a> {
    /// Create an uninitialized scene. Call [`init`](Scene::init) before use.
    pub fn new(initializer: &'a dyn SceneInitializer, settings: ProjectSettings) -> Self {
        Self {
            registry: Registry::new(),
            camera: None,
            state: LifecycleState::Uninitialized,
            playing: false,
            initializer,
            save_data: Value::Null,
            settings,
            assets: AssetManager::new(),
            render: RenderSystem::new(),
            physics: PhysicsSystem::new(),
            scripts: ScriptSystem::new(),
        }
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    /// Bring the scene up: default assets, camera, subsystems, then the
    /// initializer's `init` hook (last, so it can safely create entities).
    ///
    /// # Panics
    ///
    /// Panics if the scene is already initialized.
    pub fn init(&mut self) {
        assert!(
            self.state != LifecycleState::Initialized,
            "init() on an initialized scene; destroy() or reset() first"
        );
        self.load_default_assets();
        self.camera = Some(Camera::new(CAMERA_START));
        self.render.init(&self.settings);
        self.physics.init(GRAVITY);
        self.state = LifecycleState::Initialized;

        let strategy = self.initializer;
        strategy.init(self);
    }

    /// Start the script system, then the initializer's `start` hook.
    pub fn start(&mut self) {
        self.assert_initialized("start()");
        self.scripts.start(&self.registry);

        let strategy = self.initializer;
        strategy.start(self);
    }

    /// Advance one simulation frame: physics first, then scripts, so script
    /// logic observes this frame's physics result.
    pub fn update(&mut self, dt: f32) {
        self.assert_initialized("update()");
        self.physics.update(&mut self.registry, dt);
        self.scripts.update(&mut self.registry, dt);
    }

    /// Advance editor-only logic. Physics never advances here.
    pub fn editor_update(&mut self, dt: f32) {
        self.assert_initialized("editor_update()");
        self.scripts.editor_update(&mut self.registry, dt);
    }

    /// Begin simulation: registers every transform-bearing entity with the
    /// physics subsystem. One-time bulk registration — entities created
    /// afterwards register through their own creation path.
    pub fn play(&mut self) {
        self.assert_initialized("play()");
        self.playing = true;
        for entity in self.registry.entities_with::<Transform>() {
            self.physics.add_entity(&mut self.registry, entity);
        }
    }

    /// Halt simulation. Physics bodies stay registered — stopping is meant
    /// to be followed by `reset` or shutdown, not a resumable pause.
    pub fn stop(&mut self) {
        self.playing = false;
    }

    /// Whether the simulation is running.
    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Tear the scene down: assets, transform-bearing entities, subsystems,
    /// camera.
    ///
    /// # Panics
    ///
    /// Panics if the scene is not initialized — destroying twice is a caller
    /// bug, not a recoverable state.
    pub fn destroy(&mut self) {
        assert!(
            self.state == LifecycleState::Initialized,
            "destroy() on a scene that is not initialized (double destroy?)"
        );
        self.assets.clear();
        for entity in self.registry.entities_with::<Transform>() {
            self.registry.destroy(entity);
        }
        self.render.destroy();
        self.physics.destroy();
        self.scripts.free_script_library();
        self.camera = None;
        self.playing = false;
        self.state = LifecycleState::Destroyed;
    }

    /// Full teardown and re-init.
    ///
    /// # Panics
    ///
    /// Panics if the scene was never initialized (see [`destroy`](Scene::destroy)).
    pub fn reset(&mut self) {
        self.destroy();
        self.init();
    }

    /// Record the frame's render passes: the picking pass (blend off,
    /// identifier shader, offscreen target) strictly before the main pass
    /// (blend restored, default shader, main framebuffer).
    pub fn render(&mut self) {
        self.assert_initialized("render()");
        let camera = self
            .camera
            .clone()
            .expect("initialized scene must have a camera");

        self.render.begin_frame();

        self.render.set_blend(false);
        let picking_shader = self.render.picking_shader().clone();
        self.render.bind_shader(picking_shader);
        self.render
            .render(&self.registry, &camera, PassTarget::PickingBuffer, PICKING_CLEAR);

        self.render.set_blend(true);
        self.render.bind_shader(ShaderHandle::default());
        self.render
            .render(&self.registry, &camera, PassTarget::MainFramebuffer, MAIN_CLEAR);
    }

    // ── Entity operations ────────────────────────────────────────────

    /// Allocate a new entity with a default [`Transform`]. Never fails.
    pub fn create_entity(&mut self) -> Entity {
        let entity = self.registry.create();
        self.registry.insert(entity, Transform::default());
        entity
    }

    /// Copy an entity. Only the fixed kind set {Transform, SpriteRenderer,
    /// Rigidbody2D, Box2D} is duplicated; tags, text, bounding boxes, and
    /// script bindings are not.
    pub fn duplicate_entity(&mut self, source: Entity) -> Entity {
        let entity = self.registry.create();
        if let Some(c) = self.registry.get::<Transform>(source).copied() {
            self.registry.insert(entity, c);
        }
        if let Some(c) = self.registry.get::<SpriteRenderer>(source).cloned() {
            self.registry.insert(entity, c);
        }
        if let Some(c) = self.registry.get::<Rigidbody2D>(source).cloned() {
            self.registry.insert(entity, c);
        }
        if let Some(c) = self.registry.get::<Box2D>(source).cloned() {
            self.registry.insert(entity, c);
        }
        entity
    }

    /// Wrap a raw identifier into a handle. The sentinel value (`u32::MAX`)
    /// and identifiers naming free slots yield [`Entity::NULL`].
    pub fn entity(&self, id: u32) -> Entity {
        if id == u32::MAX {
            return Entity::NULL;
        }
        self.registry.entity_at(id).unwrap_or(Entity::NULL)
    }

    /// Resolve the entity at `id`, creating one pinned to that exact index
    /// if the slot is free. Idempotent per identifier — this is what keeps
    /// cross-references in save files valid.
    pub fn find_or_create_entity(&mut self, id: u32) -> Entity {
        match self.registry.entity_at(id) {
            Some(entity) => entity,
            None => self.registry.create_at(id),
        }
    }

    /// The component registry.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// The scene camera (`None` until `init`).
    pub fn camera(&self) -> Option<&Camera> {
        self.camera.as_ref()
    }

    pub fn camera_mut(&mut self) -> Option<&mut Camera> {
        self.camera.as_mut()
    }

    /// Attach a script-component record to an entity, as the editor's
    /// "add script component" action does.
    pub fn attach_script(&mut self, entity: Entity, kind: &str, fields: Value) {
        self.scripts
            .deserialize(kind, &fields, entity, &mut self.registry);
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Save the scene to `path` as a pretty-printed JSON document.
    pub fn save(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        log::info!("saving scene to {}", path.display());

        let mut components: Vec<Value> = Vec::new();
        for kind in ComponentKind::SAVE_ORDER {
            for entity in kind.entities(&self.registry) {
                if let Some(body) = kind.snapshot(&self.registry, entity) {
                    components.push(codec::wrap(kind.key(), entity, body));
                }
            }
        }
        self.scripts.save_scripts(&self.registry, &mut components);

        self.save_data = json!({
            codec::COMPONENTS_FIELD: components,
            codec::PROJECT_FIELD: self.settings.project_file.to_string_lossy(),
            codec::ASSETS_FIELD: self.assets.serialize(),
        });

        let text = serde_json::to_string_pretty(&self.save_data).map_err(io::Error::other)?;
        fs::write(path, text)
    }

    /// The document assembled by the most recent [`save`](Scene::save).
    pub fn save_data(&self) -> &Value {
        &self.save_data
    }

    /// Load a scene from `path`, replacing the current contents entirely.
    ///
    /// An empty, missing, or malformed file yields a fresh empty scene —
    /// that is the first-run experience, not an error.
    ///
    /// # Panics
    ///
    /// Panics if the scene was never initialized: loading begins with a
    /// [`reset`](Scene::reset).
    pub fn load(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        self.reset();
        log::info!("loading scene {}", path.display());
        self.settings.current_scene = Some(path.to_path_buf());

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        if text.is_empty() {
            return Ok(());
        }

        self.start();

        let doc: Value = match serde_json::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!(
                    "malformed scene file {}: {e}; loading as empty",
                    path.display()
                );
                return Ok(());
            }
        };

        // Assets must be registered before any component references them.
        if let Some(assets) = doc.get(codec::ASSETS_FIELD) {
            self.assets.load_textures_from(assets);
            self.assets.load_fonts_from(assets);
        }

        if let Some(records) = doc.get(codec::COMPONENTS_FIELD).and_then(Value::as_array) {
            for record in records {
                self.apply_record(record);
            }
        }
        Ok(())
    }

    /// Re-apply only the script-component records of a scene file, leaving
    /// geometry untouched. Used when script bindings are recompiled.
    pub fn load_scripts_only(&mut self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };
        if text.is_empty() {
            return Ok(());
        }

        log::info!("refreshing script components from {}", path.display());
        let doc: Value = match serde_json::from_str(&text) {
            Ok(doc) => doc,
            Err(e) => {
                log::warn!("malformed scene file {}: {e}; nothing applied", path.display());
                return Ok(());
            }
        };

        let Some(records) = doc.get(codec::COMPONENTS_FIELD).and_then(Value::as_array) else {
            return Ok(());
        };
        for record in records {
            let Some((kind, body)) = codec::classify(record) else {
                continue;
            };
            if let RecordKind::BuiltIn(builtin) = kind {
                if ComponentKind::SCRIPT_REFRESH_SKIP.contains(&builtin) {
                    continue;
                }
            }
            let Some(index) = codec::entity_index(body) else {
                log::warn!("script record without an Entity field; skipped");
                continue;
            };
            let entity = self.find_or_create_entity(index);
            let key = match kind {
                RecordKind::BuiltIn(builtin) => builtin.key(),
                RecordKind::Extension(key) => key,
            };
            self.scripts
                .deserialize(key, body, entity, &mut self.registry);
        }
        Ok(())
    }

    // ── Internals ────────────────────────────────────────────────────

    fn assert_initialized(&self, op: &str) {
        assert!(
            self.state == LifecycleState::Initialized,
            "{op} on a scene that is not initialized"
        );
    }

    /// Built-in engine assets loaded on every init.
    fn load_default_assets(&mut self) {
        let gizmo_spec = TextureSpec {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            is_default: true,
        };
        self.assets
            .load_texture(gizmo_spec, self.settings.gizmo_texture_path());
    }

    /// Dispatch one component record during a full load.
    fn apply_record(&mut self, record: &Value) {
        let Some((kind, body)) = codec::classify(record) else {
            log::warn!("skipping component record that is not a single-key object");
            return;
        };
        let Some(index) = codec::entity_index(body) else {
            log::warn!("skipping component record without an Entity field");
            return;
        };
        let entity = self.find_or_create_entity(index);

        match kind {
            RecordKind::BuiltIn(ComponentKind::Transform) => {
                match serde_json::from_value::<Transform>(body.clone()) {
                    Ok(transform) => self.registry.insert(entity, transform),
                    Err(e) => log::warn!("unreadable Transform record for {entity}: {e}"),
                }
            }
            RecordKind::BuiltIn(ComponentKind::SpriteRenderer) => {
                RenderSystem::deserialize_sprite_renderer(body, entity, &mut self.registry);
            }
            RecordKind::BuiltIn(ComponentKind::FontRenderer) => {
                RenderSystem::deserialize_font_renderer(body, entity, &mut self.registry);
            }
            RecordKind::BuiltIn(ComponentKind::Rigidbody2D) => {
                PhysicsSystem::deserialize_rigidbody(body, entity, &mut self.registry);
            }
            RecordKind::BuiltIn(ComponentKind::Box2D) => {
                PhysicsSystem::deserialize_box_collider(body, entity, &mut self.registry);
            }
            RecordKind::BuiltIn(ComponentKind::Aabb) => {
                PhysicsSystem::deserialize_aabb(body, entity, &mut self.registry);
            }
            RecordKind::Extension(key) => {
                self.scripts
                    .deserialize(key, body, entity, &mut self.registry);
            }
        }
    }
}

impl std::fmt::Debug for Scene<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("state", &self.state)
            .field("playing", &self.playing)
            .field("entities", &self.registry.entity_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Aabb, Color, FontRenderer, Tag};
    use crate::render::DrawKind;
    use crate::scripting::ScriptComponents;
    use serde_json::json;

    const INIT: EmptySceneInitializer = EmptySceneInitializer;

    fn new_scene() -> Scene<'static> {
        let mut scene = Scene::new(&INIT, ProjectSettings::for_project("demo.orproj"));
        scene.init();
        scene
    }

    fn scene_path(dir: &tempfile::TempDir) -> std::path::PathBuf {
        dir.path().join("scene.json")
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    #[test]
    fn init_builds_camera_and_default_assets() {
        let scene = new_scene();
        assert!(scene.camera().is_some());
        assert_eq!(scene.camera().unwrap().position, CAMERA_START);
        // The gizmo texture is registered even though the file is absent.
        assert_eq!(scene.assets.texture_count(), 1);
    }

    #[test]
    #[should_panic(expected = "init() on an initialized scene")]
    fn init_twice_panics() {
        let mut scene = new_scene();
        scene.init();
    }

    #[test]
    #[should_panic(expected = "double destroy")]
    fn destroy_twice_panics() {
        let mut scene = new_scene();
        scene.destroy();
        scene.destroy();
    }

    #[test]
    #[should_panic(expected = "not initialized")]
    fn update_before_init_panics() {
        let mut scene = Scene::new(&INIT, ProjectSettings::default());
        scene.update(0.016);
    }

    #[test]
    fn destroy_removes_only_transform_bearing_entities() {
        let mut scene = new_scene();
        let with_transform = scene.create_entity();
        let bare = scene.registry_mut().create();
        scene.registry_mut().insert(bare, Tag::named("orphan"));

        scene.destroy();
        assert!(!scene.registry().is_alive(with_transform));
        // An entity with no Transform survives teardown, as the original
        // engine's teardown loop only visits transform-bearing entities.
        assert!(scene.registry().is_alive(bare));
    }

    #[test]
    fn reset_reinitializes() {
        let mut scene = new_scene();
        scene.create_entity();
        scene.reset();
        assert!(scene.camera().is_some());
        assert_eq!(scene.registry().entity_count(), 0);
    }

    // ── Entity operations ────────────────────────────────────────────

    #[test]
    fn create_entity_attaches_default_transform() {
        let mut scene = new_scene();
        let e = scene.create_entity();
        assert_eq!(
            scene.registry().get::<Transform>(e),
            Some(&Transform::default())
        );
    }

    #[test]
    fn duplicate_copies_exactly_the_fixed_kind_set() {
        let mut scene = new_scene();
        let src = scene.create_entity();
        let reg = scene.registry_mut();
        reg.insert(src, SpriteRenderer::new().with_color(Color::RED));
        reg.insert(src, Rigidbody2D::dynamic());
        reg.insert(src, Box2D::default());
        reg.insert(src, Tag::named("player"));
        reg.insert(src, FontRenderer::new("hello"));
        reg.insert(src, Aabb::default());
        scene.attach_script(src, "Health", json!({ "hp": 3 }));

        let dst = scene.duplicate_entity(src);
        let reg = scene.registry();
        assert!(reg.has::<Transform>(dst));
        assert!(reg.has::<SpriteRenderer>(dst));
        assert!(reg.has::<Rigidbody2D>(dst));
        assert!(reg.has::<Box2D>(dst));
        // The fixed copy list deliberately excludes everything else.
        assert!(!reg.has::<Tag>(dst));
        assert!(!reg.has::<FontRenderer>(dst));
        assert!(!reg.has::<Aabb>(dst));
        assert!(!reg.has::<ScriptComponents>(dst));
    }

    #[test]
    fn entity_wraps_sentinel_as_null() {
        let mut scene = new_scene();
        assert!(scene.entity(u32::MAX).is_null());
        assert!(scene.entity(42).is_null());
        let e = scene.create_entity();
        assert_eq!(scene.entity(e.index()), e);
    }

    #[test]
    fn find_or_create_is_idempotent_per_id() {
        let mut scene = new_scene();
        let a = scene.find_or_create_entity(5);
        let b = scene.find_or_create_entity(5);
        assert_eq!(a, b);
        assert_eq!(a.index(), 5);
        assert_eq!(
            scene
                .registry()
                .entities_with::<Transform>()
                .len(),
            0
        );
        assert_eq!(scene.registry().entity_count(), 1);
    }

    // ── Play / stop ──────────────────────────────────────────────────

    #[test]
    fn play_registers_transform_entities_exactly_once() {
        let mut scene = new_scene();
        scene.create_entity();
        scene.create_entity();

        scene.play();
        assert!(scene.is_playing());
        assert_eq!(scene.physics.body_count(), 2);

        // Entities created after play are not retroactively registered.
        scene.create_entity();
        assert_eq!(scene.physics.body_count(), 2);

        // Stop halts the simulation but leaves bodies registered.
        scene.stop();
        assert!(!scene.is_playing());
        assert_eq!(scene.physics.body_count(), 2);
    }

    #[test]
    fn update_runs_physics_then_scripts() {
        let mut scene = new_scene();
        let e = scene.create_entity();
        scene
            .registry_mut()
            .insert(e, Rigidbody2D::dynamic());
        scene.start();
        scene.play();

        for _ in 0..30 {
            scene.update(1.0 / 60.0);
        }
        let y = scene.registry().get::<Transform>(e).unwrap().position.y;
        assert!(y < 0.0, "physics did not advance: y = {y}");
        assert!(scene.scripts.update_frames() > 0);
        assert_eq!(scene.scripts.editor_frames(), 0);
    }

    #[test]
    fn editor_update_never_advances_physics() {
        let mut scene = new_scene();
        let e = scene.create_entity();
        scene.registry_mut().insert(e, Rigidbody2D::dynamic());
        scene.start();
        scene.play();

        for _ in 0..30 {
            scene.editor_update(1.0 / 60.0);
        }
        assert_eq!(scene.registry().get::<Transform>(e).unwrap().position.y, 0.0);
        assert!(scene.scripts.editor_frames() > 0);
    }

    // ── Rendering ────────────────────────────────────────────────────

    #[test]
    fn render_orders_picking_before_main() {
        let mut scene = new_scene();
        let e = scene.create_entity();
        scene
            .registry_mut()
            .insert(e, SpriteRenderer::new().with_color(Color::BLUE));

        scene.render();
        let frame = scene.render.frame();
        assert_eq!(frame.len(), 2);

        let picking = &frame[0];
        assert_eq!(picking.target, PassTarget::PickingBuffer);
        assert!(!picking.blend_enabled);
        assert!(!picking.shader.is_default());
        assert!(matches!(picking.draws[0].kind, DrawKind::Sprite(_)));

        let main = &frame[1];
        assert_eq!(main.target, PassTarget::MainFramebuffer);
        assert!(main.blend_enabled);
        assert!(main.shader.is_default());
        assert_eq!(main.draws.len(), 1);
    }

    // ── Persistence ──────────────────────────────────────────────────

    /// Populate a scene with every built-in component kind spread over two
    /// entities, returning their handles.
    fn populate(scene: &mut Scene<'_>) -> (Entity, Entity) {
        let a = scene.create_entity();
        let b = scene.create_entity();
        let reg = scene.registry_mut();
        reg.insert(a, Transform::from_xy(10.0, -4.0).with_scale(2.0));
        reg.insert(
            a,
            SpriteRenderer::new()
                .with_color(Color::rgba(0.1, 0.2, 0.3, 1.0))
                .with_z_index(4),
        );
        reg.insert(
            a,
            Rigidbody2D::dynamic().with_velocity(Vec2::new(1.0, 2.0)),
        );
        reg.insert(
            a,
            Box2D {
                half_size: Vec2::new(2.0, 3.0),
                ..Box2D::default()
            },
        );
        reg.insert(b, Transform::from_xy(7.0, 8.0));
        reg.insert(b, FontRenderer::new("score: 0"));
        reg.insert(
            b,
            Aabb {
                size: Vec2::new(5.0, 6.0),
                offset: Vec2::new(0.5, 0.0),
            },
        );
        (a, b)
    }

    #[test]
    fn save_emits_single_key_records_with_entity_fields() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = new_scene();
        populate(&mut scene);
        scene.save(scene_path(&dir)).unwrap();

        let doc = scene.save_data();
        assert!(doc.get("Project").is_some());
        assert!(doc.get("Assets").is_some());
        let components = doc["Components"].as_array().unwrap();
        // a: Transform, Rigidbody2D, Box2D, SpriteRenderer; b: Transform,
        // FontRenderer, AABB.
        assert_eq!(components.len(), 7);
        for record in components {
            let object = record.as_object().unwrap();
            assert_eq!(object.len(), 1);
            let (_, body) = object.iter().next().unwrap();
            assert!(body.get("Entity").is_some());
        }
        // Transforms snapshot first, in entity order.
        assert_eq!(components[0]["Transform"]["Entity"], 0);
        assert_eq!(components[1]["Transform"]["Entity"], 1);
    }

    #[test]
    fn round_trip_preserves_identity_and_component_values() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = new_scene();
        let (a, b) = populate(&mut scene);
        let a_transform = *scene.registry().get::<Transform>(a).unwrap();
        let a_sprite = scene.registry().get::<SpriteRenderer>(a).unwrap().clone();
        let a_body = scene.registry().get::<Rigidbody2D>(a).unwrap().clone();
        let a_box = scene.registry().get::<Box2D>(a).unwrap().clone();
        let b_text = scene.registry().get::<FontRenderer>(b).unwrap().clone();
        let b_aabb = scene.registry().get::<Aabb>(b).unwrap().clone();

        let path = scene_path(&dir);
        scene.save(&path).unwrap();
        scene.load(&path).unwrap();

        // Identity: the same indices are live again.
        let a2 = scene.entity(a.index());
        let b2 = scene.entity(b.index());
        assert!(!a2.is_null());
        assert!(!b2.is_null());

        let reg = scene.registry();
        assert_eq!(reg.get::<Transform>(a2), Some(&a_transform));
        assert_eq!(reg.get::<SpriteRenderer>(a2), Some(&a_sprite));
        assert_eq!(reg.get::<Rigidbody2D>(a2), Some(&a_body));
        assert_eq!(reg.get::<Box2D>(a2), Some(&a_box));
        assert_eq!(reg.get::<FontRenderer>(b2), Some(&b_text));
        assert_eq!(reg.get::<Aabb>(b2), Some(&b_aabb));
        assert_eq!(reg.get::<Transform>(b2).unwrap().position.x, 7.0);
        assert_eq!(reg.entity_count(), 2);
    }

    #[test]
    fn load_is_order_independent() {
        let records = [
            json!({ "Box2D": { "Entity": 9, "half_size": [2.0, 3.0] } }),
            json!({ "Transform": { "Entity": 4, "position": [1.0, 2.0, 0.0] } }),
            json!({ "SpriteRenderer": { "Entity": 4, "z_index": 2 } }),
            json!({ "Transform": { "Entity": 9, "position": [5.0, 5.0, 0.0] } }),
        ];
        let forward = json!({ "Components": records });
        let mut reversed_records = records.to_vec();
        reversed_records.reverse();
        let reversed = json!({ "Components": reversed_records });

        let dir = tempfile::tempdir().unwrap();
        let mut scenes = Vec::new();
        for (name, doc) in [("fwd.json", forward), ("rev.json", reversed)] {
            let path = dir.path().join(name);
            std::fs::write(&path, serde_json::to_string_pretty(&doc).unwrap()).unwrap();
            let mut scene = new_scene();
            scene.load(&path).unwrap();
            scenes.push(scene);
        }

        for scene in &scenes {
            let reg = scene.registry();
            assert_eq!(reg.entity_count(), 2);
            let e4 = scene.entity(4);
            let e9 = scene.entity(9);
            assert_eq!(reg.get::<Transform>(e4).unwrap().position.x, 1.0);
            assert_eq!(reg.get::<SpriteRenderer>(e4).unwrap().z_index, 2);
            assert_eq!(reg.get::<Box2D>(e9).unwrap().half_size, Vec2::new(2.0, 3.0));
            assert_eq!(reg.get::<Transform>(e9).unwrap().position.y, 5.0);
        }
    }

    #[test]
    fn empty_file_loads_as_fresh_scene() {
        let dir = tempfile::tempdir().unwrap();
        let path = scene_path(&dir);
        std::fs::write(&path, "").unwrap();

        let mut scene = new_scene();
        scene.create_entity();
        scene.load(&path).unwrap();

        assert_eq!(scene.registry().entity_count(), 0);
        assert!(scene.camera().is_some());
        assert!(!scene.is_playing());
    }

    #[test]
    fn missing_file_loads_as_fresh_scene() {
        let dir = tempfile::tempdir().unwrap();
        let mut scene = new_scene();
        scene.create_entity();
        scene.load(dir.path().join("nope.json")).unwrap();
        assert_eq!(scene.registry().entity_count(), 0);
    }

    #[test]
    fn malformed_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = scene_path(&dir);
        std::fs::write(&path, "{ not json").unwrap();

        let mut scene = new_scene();
        scene.load(&path).unwrap();
        assert_eq!(scene.registry().entity_count(), 0);
    }

    #[test]
    fn unknown_record_keys_round_trip_through_the_script_system() {
        let dir = tempfile::tempdir().unwrap();
        let path = scene_path(&dir);

        let mut scene = new_scene();
        let e = scene.create_entity();
        scene.attach_script(e, "PlayerController", json!({ "speed": 4.5 }));
        scene.save(&path).unwrap();
        scene.load(&path).unwrap();

        let e2 = scene.entity(e.index());
        let scripts = scene.registry().get::<ScriptComponents>(e2).unwrap();
        assert_eq!(scripts.records.len(), 1);
        assert_eq!(scripts.records[0].kind, "PlayerController");
        assert_eq!(scripts.records[0].fields, json!({ "speed": 4.5 }));
        assert!(scene.scripts.known_kinds().contains("PlayerController"));
    }

    #[test]
    fn load_scripts_only_skips_geometry_and_applies_scripts() {
        let dir = tempfile::tempdir().unwrap();
        let path = scene_path(&dir);
        let doc = json!({ "Components": [
            { "Transform": { "Entity": 0, "position": [99.0, 99.0, 0.0] } },
            { "Health": { "Entity": 0, "hp": 12 } },
            { "FontRenderer": { "Entity": 0, "text": "hud" } },
        ]});
        std::fs::write(&path, serde_json::to_string(&doc).unwrap()).unwrap();

        let mut scene = new_scene();
        let e = scene.create_entity();
        scene.load_scripts_only(&path).unwrap();

        // Geometry untouched: no reset, transform not overwritten.
        assert_eq!(scene.registry().entity_count(), 1);
        assert_eq!(scene.registry().get::<Transform>(e).unwrap().position.x, 0.0);

        // The unknown kind is applied; FontRenderer is not in the skip list
        // and falls through to the script system as well.
        let scripts = scene.registry().get::<ScriptComponents>(e).unwrap();
        let kinds: Vec<&str> = scripts.records.iter().map(|r| r.kind.as_str()).collect();
        assert!(kinds.contains(&"Health"));
        assert!(kinds.contains(&"FontRenderer"));
        assert!(!scene.registry().has::<FontRenderer>(e));
    }

    #[test]
    fn load_restores_assets_before_components() {
        let dir = tempfile::tempdir().unwrap();
        let path = scene_path(&dir);

        let mut scene = new_scene();
        let e = scene.create_entity();
        let texture = scene
            .assets
            .load_texture(TextureSpec::default(), "art/player.png");
        scene
            .registry_mut()
            .insert(e, SpriteRenderer::new().with_texture(texture));
        scene.save(&path).unwrap();
        scene.load(&path).unwrap();

        let e2 = scene.entity(e.index());
        let sprite = scene.registry().get::<SpriteRenderer>(e2).unwrap();
        let handle = sprite.texture.expect("texture reference survived");
        let restored = scene.assets.texture(handle).expect("asset registered");
        assert_eq!(restored.path, std::path::PathBuf::from("art/player.png"));
    }
}
