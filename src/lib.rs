//! # Ormr — 2D Scene Engine Core
//!
//! The scene lifecycle and ECS persistence layer of a 2D game engine and its
//! editor: entity creation and duplication, typed component attach/detach,
//! snapshotting the live registry into a JSON scene file, and rebuilding a
//! registry from one while preserving entity identity.
//!
//! Start with `use ormr::prelude::*` and build a [`Scene`](scene::Scene).

pub mod assets;
pub mod camera;
pub mod components;
pub mod ecs;
pub mod math;
pub mod physics;
pub mod prelude;
pub mod render;
pub mod scene;
pub mod scripting;
pub mod settings;
pub mod watch;
