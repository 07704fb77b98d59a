//! The script system collaborator.
//!
//! User-defined script components are opaque to the engine core: on the wire
//! they are single-key records with an `Entity` field, like built-in
//! components, but the core never knows their shape. The script system stores
//! each record's body verbatim in a [`ScriptComponents`] component and plays
//! it back on save, so script data round-trips byte-faithfully through files
//! the engine cannot interpret.
//!
//! Hook order is owned by the Scene: `update` runs after physics each
//! simulation frame; `editor_update` runs instead of `update` while paused in
//! the editor and must stay side-effect-free with respect to simulation
//! state.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::ecs::{Entity, Registry};
use crate::scene::codec::{self, ENTITY_FIELD};

/// One opaque script-component record attached to an entity.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptRecord {
    /// The record key, e.g. `"PlayerController"`.
    pub kind: String,
    /// The record body, minus the `Entity` field (re-injected on save).
    pub fields: Value,
}

/// All script-component records on one entity.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScriptComponents {
    pub records: Vec<ScriptRecord>,
}

/// Loads, ticks, and round-trips script components.
#[derive(Debug, Default)]
pub struct ScriptSystem {
    started: bool,
    /// Script kinds observed since the library was loaded.
    known_kinds: HashSet<String>,
    update_frames: u64,
    editor_frames: u64,
}

impl ScriptSystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the script bindings present in the registry and mark the system
    /// started.
    pub fn start(&mut self, registry: &Registry) {
        registry.view::<ScriptComponents>(|_, scripts| {
            for record in &scripts.records {
                self.known_kinds.insert(record.kind.clone());
            }
        });
        self.started = true;
        log::info!(
            "script system started with {} binding kind(s)",
            self.known_kinds.len()
        );
    }

    /// Advance simulation-time script hooks.
    pub fn update(&mut self, _registry: &mut Registry, _dt: f32) {
        if !self.started {
            return;
        }
        self.update_frames += 1;
    }

    /// Advance editor-safe script hooks only.
    pub fn editor_update(&mut self, _registry: &mut Registry, _dt: f32) {
        if !self.started {
            return;
        }
        self.editor_frames += 1;
    }

    /// Unload the compiled script library. Component records in the registry
    /// are untouched — they reload on the next `start`.
    pub fn free_script_library(&mut self) {
        self.started = false;
        self.known_kinds.clear();
        self.update_frames = 0;
        self.editor_frames = 0;
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn known_kinds(&self) -> &HashSet<String> {
        &self.known_kinds
    }

    pub fn update_frames(&self) -> u64 {
        self.update_frames
    }

    pub fn editor_frames(&self) -> u64 {
        self.editor_frames
    }

    // ── Serialization ────────────────────────────────────────────────

    /// Append every script-component record to a scene file's `Components`
    /// array, entities in index order.
    pub fn save_scripts(&self, registry: &Registry, components: &mut Vec<Value>) {
        for entity in registry.entities_with::<ScriptComponents>() {
            let Some(scripts) = registry.get::<ScriptComponents>(entity) else {
                continue;
            };
            for record in &scripts.records {
                components.push(codec::wrap(&record.kind, entity, record.fields.clone()));
            }
        }
    }

    /// Attach a script-component record to an entity. A record of the same
    /// kind already on the entity is replaced, so repeated scripts-only
    /// refreshes don't accumulate duplicates.
    pub fn deserialize(
        &mut self,
        kind: &str,
        body: &Value,
        entity: Entity,
        registry: &mut Registry,
    ) {
        let mut fields = match body {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        fields.remove(ENTITY_FIELD);

        let record = ScriptRecord {
            kind: kind.to_string(),
            fields: Value::Object(fields),
        };
        self.known_kinds.insert(record.kind.clone());

        if let Some(scripts) = registry.get_mut::<ScriptComponents>(entity) {
            if let Some(existing) = scripts.records.iter_mut().find(|r| r.kind == kind) {
                *existing = record;
            } else {
                scripts.records.push(record);
            }
        } else {
            registry.insert(
                entity,
                ScriptComponents {
                    records: vec![record],
                },
            );
        }
    }
}
