//! Asset management: texture and font tables with stable handles.
//!
//! Handles are indices into the tables. On restore, the *data* at an index is
//! rebuilt while the handle value stays the same, so any component holding a
//! handle resolves correctly after a scene load — provided assets are
//! restored before components, which the scene loader guarantees.
//!
//! Asset files that cannot be read degrade gracefully: the entry is recorded
//! with zero dimensions and a warning is logged. Editors routinely open
//! projects with missing art; that must not block scene loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Handle to a texture in the [`AssetManager`]'s table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TextureHandle(pub u32);

/// Handle to a font in the [`AssetManager`]'s table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontHandle(pub u32);

/// Texture minification/magnification filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FilterMode {
    #[default]
    Nearest,
    Linear,
}

/// Texture wrap behavior outside `0.0..=1.0` UVs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapMode {
    #[default]
    ClampToEdge,
    Repeat,
}

/// Sampler configuration supplied when loading a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureSpec {
    pub mag_filter: FilterMode,
    pub min_filter: FilterMode,
    pub wrap_s: WrapMode,
    pub wrap_t: WrapMode,
    /// Built-in engine assets are reloaded on every scene init and excluded
    /// from saved asset tables.
    pub is_default: bool,
}

/// A registered texture: its source path, sampler settings, and probed size.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    pub path: PathBuf,
    pub spec: TextureSpec,
    pub width: u32,
    pub height: u32,
}

impl Texture {
    fn placeholder() -> Self {
        Self {
            path: PathBuf::new(),
            spec: TextureSpec::default(),
            width: 0,
            height: 0,
        }
    }
}

/// A registered font: source path and pixel size.
#[derive(Debug, Clone, PartialEq)]
pub struct Font {
    pub path: PathBuf,
    pub size: f32,
}

/// Wire form of a texture entry in the save file's `Assets` table.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct TextureRecord {
    handle: u32,
    path: PathBuf,
    #[serde(default)]
    spec: TextureSpec,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
}

/// Wire form of a font entry in the save file's `Assets` table.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct FontRecord {
    handle: u32,
    path: PathBuf,
    #[serde(default)]
    size: f32,
}

/// Owns the texture and font tables for one scene.
#[derive(Debug, Default)]
pub struct AssetManager {
    textures: Vec<Texture>,
    fonts: Vec<Font>,
}

impl AssetManager {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Loading ──────────────────────────────────────────────────────

    /// Register a texture, probing its dimensions from disk. Loading the same
    /// path twice returns the existing handle.
    pub fn load_texture(&mut self, spec: TextureSpec, path: impl AsRef<Path>) -> TextureHandle {
        let path = path.as_ref();
        if let Some(idx) = self.textures.iter().position(|t| t.path == path) {
            return TextureHandle(idx as u32);
        }

        let (width, height) = probe_dimensions(path);
        self.textures.push(Texture {
            path: path.to_path_buf(),
            spec,
            width,
            height,
        });
        TextureHandle(self.textures.len() as u32 - 1)
    }

    /// Register a font at a pixel size. Loading the same path and size twice
    /// returns the existing handle.
    pub fn load_font(&mut self, path: impl AsRef<Path>, size: f32) -> FontHandle {
        let path = path.as_ref();
        if let Some(idx) = self
            .fonts
            .iter()
            .position(|f| f.path == path && f.size == size)
        {
            return FontHandle(idx as u32);
        }
        self.fonts.push(Font {
            path: path.to_path_buf(),
            size,
        });
        FontHandle(self.fonts.len() as u32 - 1)
    }

    /// Look up a texture by handle.
    pub fn texture(&self, handle: TextureHandle) -> Option<&Texture> {
        self.textures.get(handle.0 as usize)
    }

    /// Look up a font by handle.
    pub fn font(&self, handle: FontHandle) -> Option<&Font> {
        self.fonts.get(handle.0 as usize)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }

    /// Drop every registered asset.
    pub fn clear(&mut self) {
        self.textures.clear();
        self.fonts.clear();
    }

    // ── Serialization ────────────────────────────────────────────────

    /// Serialize the asset tables for embedding in a scene file.
    ///
    /// Built-in engine assets (`is_default`) are skipped — they are reloaded
    /// by scene init. Handle indices are recorded explicitly so restoration
    /// reproduces them regardless of how many defaults precede project
    /// assets.
    pub fn serialize(&self) -> Value {
        let textures: Vec<TextureRecord> = self
            .textures
            .iter()
            .enumerate()
            .filter(|(_, t)| !t.spec.is_default)
            .map(|(i, t)| TextureRecord {
                handle: i as u32,
                path: t.path.clone(),
                spec: t.spec,
                width: t.width,
                height: t.height,
            })
            .collect();
        let fonts: Vec<FontRecord> = self
            .fonts
            .iter()
            .enumerate()
            .map(|(i, f)| FontRecord {
                handle: i as u32,
                path: f.path.clone(),
                size: f.size,
            })
            .collect();

        json!({
            "Textures": serde_json::to_value(textures).unwrap_or(Value::Null),
            "Fonts": serde_json::to_value(fonts).unwrap_or(Value::Null),
        })
    }

    /// Restore textures from a scene file's `Assets` table. Records that fail
    /// to parse are skipped with a warning.
    pub fn load_textures_from(&mut self, assets: &Value) {
        let Some(entries) = assets.get("Textures").and_then(Value::as_array) else {
            return;
        };
        for entry in entries {
            let record: TextureRecord = match serde_json::from_value(entry.clone()) {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("skipping unreadable texture record: {e}");
                    continue;
                }
            };
            let slot = record.handle as usize;
            while self.textures.len() <= slot {
                self.textures.push(Texture::placeholder());
            }
            let (width, height) = probe_dimensions(&record.path);
            self.textures[slot] = Texture {
                path: record.path,
                spec: record.spec,
                width,
                height,
            };
        }
    }

    /// Restore fonts from a scene file's `Assets` table.
    pub fn load_fonts_from(&mut self, assets: &Value) {
        let Some(entries) = assets.get("Fonts").and_then(Value::as_array) else {
            return;
        };
        for entry in entries {
            let record: FontRecord = match serde_json::from_value(entry.clone()) {
                Ok(r) => r,
                Err(e) => {
                    log::warn!("skipping unreadable font record: {e}");
                    continue;
                }
            };
            let slot = record.handle as usize;
            while self.fonts.len() <= slot {
                self.fonts.push(Font {
                    path: PathBuf::new(),
                    size: 0.0,
                });
            }
            self.fonts[slot] = Font {
                path: record.path,
                size: record.size,
            };
        }
    }
}

/// Read a texture's dimensions from disk, degrading to 0x0 when unreadable.
fn probe_dimensions(path: &Path) -> (u32, u32) {
    match image::image_dimensions(path) {
        Ok(dims) => dims,
        Err(e) => {
            log::warn!("cannot read texture '{}': {e}", path.display());
            (0, 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec() -> TextureSpec {
        TextureSpec {
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            wrap_s: WrapMode::Repeat,
            wrap_t: WrapMode::Repeat,
            is_default: false,
        }
    }

    #[test]
    fn loading_same_path_returns_same_handle() {
        let mut assets = AssetManager::new();
        let a = assets.load_texture(spec(), "art/player.png");
        let b = assets.load_texture(spec(), "art/player.png");
        assert_eq!(a, b);
        assert_eq!(assets.texture_count(), 1);
    }

    #[test]
    fn missing_file_degrades_to_zero_dimensions() {
        let mut assets = AssetManager::new();
        let handle = assets.load_texture(spec(), "does/not/exist.png");
        let tex = assets.texture(handle).unwrap();
        assert_eq!((tex.width, tex.height), (0, 0));
    }

    #[test]
    fn serialize_skips_defaults_but_preserves_handles() {
        let mut assets = AssetManager::new();
        let default_spec = TextureSpec {
            is_default: true,
            ..spec()
        };
        let _gizmo = assets.load_texture(default_spec, "assets/images/gizmos.png");
        let player = assets.load_texture(spec(), "art/player.png");
        let _font = assets.load_font("art/retro.ttf", 24.0);

        let table = assets.serialize();
        let textures = table["Textures"].as_array().unwrap();
        assert_eq!(textures.len(), 1);
        assert_eq!(textures[0]["Handle"], player.0);

        // Restore into a fresh manager that already has the default loaded.
        let mut restored = AssetManager::new();
        restored.load_texture(default_spec, "assets/images/gizmos.png");
        restored.load_textures_from(&table);
        restored.load_fonts_from(&table);

        assert_eq!(
            restored.texture(player).unwrap().path,
            PathBuf::from("art/player.png")
        );
        assert_eq!(restored.font_count(), 1);
        assert_eq!(restored.font(FontHandle(0)).unwrap().size, 24.0);
    }

    #[test]
    fn clear_empties_both_tables() {
        let mut assets = AssetManager::new();
        assets.load_texture(spec(), "a.png");
        assets.load_font("f.ttf", 12.0);
        assets.clear();
        assert_eq!(assets.texture_count(), 0);
        assert_eq!(assets.font_count(), 0);
    }
}
