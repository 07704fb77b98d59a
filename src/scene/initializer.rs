//! Pluggable scene-bootstrap strategy.
//!
//! Each scene type (the level editor scene, a game's boot scene, ...) wants
//! different default content. A [`SceneInitializer`] supplies that: the Scene
//! calls [`init`](SceneInitializer::init) at the end of its own `init`, once
//! engine-level state (camera, subsystems, default assets) is ready, and
//! [`start`](SceneInitializer::start) from `Scene::start`.
//!
//! The Scene borrows its initializer rather than owning it, so one strategy
//! can serve many scene resets and the borrow checker guarantees it outlives
//! the scene.

use super::Scene;

/// Scene-specific bootstrap hooks.
pub trait SceneInitializer {
    /// Populate a freshly initialized scene. Entity creation is safe here.
    fn init(&self, scene: &mut Scene<'_>);

    /// Called when the scene starts (scripts are running by this point).
    fn start(&self, scene: &mut Scene<'_>);
}

/// An initializer that creates nothing. Useful for tests and for scenes whose
/// content comes entirely from a file.
#[derive(Debug, Default)]
pub struct EmptySceneInitializer;

impl SceneInitializer for EmptySceneInitializer {
    fn init(&self, _scene: &mut Scene<'_>) {}

    fn start(&self, _scene: &mut Scene<'_>) {}
}
