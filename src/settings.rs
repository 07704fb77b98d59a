//! Project settings carried by the Scene.
//!
//! The editor resolves paths (current project, engine assets, current scene)
//! and hands them to the Scene at construction. Settings travel with the
//! scene explicitly — there is no process-wide settings singleton, so two
//! scenes with different projects can coexist and scene switches can't leave
//! half-rebound global state behind.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Paths and identity of the project a scene belongs to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// The project file this scene belongs to. Written into saved scenes.
    pub project_file: PathBuf,
    /// Root directory of built-in engine assets (gizmo textures, shaders).
    pub engine_assets_dir: PathBuf,
    /// The scene file most recently loaded, if any.
    pub current_scene: Option<PathBuf>,
}

impl ProjectSettings {
    /// Settings for a project rooted at `project_file`, with engine assets
    /// under the default `assets/` directory.
    pub fn for_project(project_file: impl Into<PathBuf>) -> Self {
        Self {
            project_file: project_file.into(),
            engine_assets_dir: PathBuf::from("assets"),
            current_scene: None,
        }
    }

    /// Path of the built-in gizmo texture.
    pub fn gizmo_texture_path(&self) -> PathBuf {
        self.engine_assets_dir.join("images").join("gizmos.png")
    }

    /// Path of the picking shader used by the identifier render pass.
    pub fn picking_shader_path(&self) -> PathBuf {
        self.engine_assets_dir.join("shaders").join("picking.wgsl")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_asset_paths_are_rooted() {
        let mut settings = ProjectSettings::for_project("game.orproj");
        settings.engine_assets_dir = PathBuf::from("/opt/ormr/assets");
        assert_eq!(
            settings.gizmo_texture_path(),
            PathBuf::from("/opt/ormr/assets/images/gizmos.png")
        );
    }
}
