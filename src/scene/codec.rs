//! The scene wire format.
//!
//! A saved scene is a JSON document:
//!
//! ```text
//! {
//!   "Components": [ { "<KindName>": { "Entity": <index>, ...fields } }, ... ],
//!   "Project": "<project file path>",
//!   "Assets": { "Textures": [...], "Fonts": [...] }
//! }
//! ```
//!
//! Every component record is a single-key object. The key names the component
//! kind; the body carries at minimum the owning entity's index under
//! `"Entity"`. Keys outside the built-in set are script-component kinds and
//! belong to the script system — that is the format's extensibility point.
//!
//! Dispatch is over the closed [`ComponentKind`] variant set (plus
//! [`RecordKind::Extension`]), not a string-comparison chain: a record's key
//! is classified once, and everything downstream matches on the tag.

use serde_json::{Map, Value};

use crate::components::{Aabb, Box2D, FontRenderer, Rigidbody2D, SpriteRenderer};
use crate::ecs::{Entity, Registry};
use crate::math::Transform;

/// Top-level document keys.
pub const COMPONENTS_FIELD: &str = "Components";
pub const PROJECT_FIELD: &str = "Project";
pub const ASSETS_FIELD: &str = "Assets";
/// The owning-entity field present in every record body.
pub const ENTITY_FIELD: &str = "Entity";

/// The closed set of built-in serializable component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    Transform,
    SpriteRenderer,
    FontRenderer,
    Rigidbody2D,
    Box2D,
    Aabb,
}

impl ComponentKind {
    /// Snapshot order of the save pass. This is the order records appear in
    /// saved files; loaders must not rely on it.
    pub const SAVE_ORDER: [Self; 6] = [
        Self::Transform,
        Self::Rigidbody2D,
        Self::Box2D,
        Self::SpriteRenderer,
        Self::FontRenderer,
        Self::Aabb,
    ];

    /// The kinds a scripts-only refresh skips. Deliberately five of the six:
    /// `FontRenderer` records fall through to the script system during a
    /// refresh, matching the engine's historical behavior.
    pub const SCRIPT_REFRESH_SKIP: [Self; 5] = [
        Self::Transform,
        Self::SpriteRenderer,
        Self::Rigidbody2D,
        Self::Box2D,
        Self::Aabb,
    ];

    /// The record key this kind uses on the wire.
    pub fn key(self) -> &'static str {
        match self {
            Self::Transform => "Transform",
            Self::SpriteRenderer => "SpriteRenderer",
            Self::FontRenderer => "FontRenderer",
            Self::Rigidbody2D => "Rigidbody2D",
            Self::Box2D => "Box2D",
            Self::Aabb => "AABB",
        }
    }

    /// Classify a record key. `None` means a script-component kind.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "Transform" => Some(Self::Transform),
            "SpriteRenderer" => Some(Self::SpriteRenderer),
            "FontRenderer" => Some(Self::FontRenderer),
            "Rigidbody2D" => Some(Self::Rigidbody2D),
            "Box2D" => Some(Self::Box2D),
            "AABB" => Some(Self::Aabb),
            _ => None,
        }
    }

    /// Encode this kind's component on `entity`, if present. The returned
    /// body does not yet carry the `Entity` field — [`wrap`] injects it.
    pub fn snapshot(self, registry: &Registry, entity: Entity) -> Option<Value> {
        fn encode<T: serde::Serialize>(value: &T) -> Option<Value> {
            serde_json::to_value(value).ok()
        }
        match self {
            Self::Transform => registry.get::<Transform>(entity).and_then(encode),
            Self::SpriteRenderer => registry.get::<SpriteRenderer>(entity).and_then(encode),
            Self::FontRenderer => registry.get::<FontRenderer>(entity).and_then(encode),
            Self::Rigidbody2D => registry.get::<Rigidbody2D>(entity).and_then(encode),
            Self::Box2D => registry.get::<Box2D>(entity).and_then(encode),
            Self::Aabb => registry.get::<Aabb>(entity).and_then(encode),
        }
    }

    /// The entities carrying this kind, in index order.
    pub fn entities(self, registry: &Registry) -> Vec<Entity> {
        match self {
            Self::Transform => registry.entities_with::<Transform>(),
            Self::SpriteRenderer => registry.entities_with::<SpriteRenderer>(),
            Self::FontRenderer => registry.entities_with::<FontRenderer>(),
            Self::Rigidbody2D => registry.entities_with::<Rigidbody2D>(),
            Self::Box2D => registry.entities_with::<Box2D>(),
            Self::Aabb => registry.entities_with::<Aabb>(),
        }
    }
}

/// A classified record key: one of the built-in kinds, or a script-component
/// extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind<'a> {
    BuiltIn(ComponentKind),
    Extension(&'a str),
}

/// Split a record into its classified kind and body.
///
/// Returns `None` for records that are not single-key objects.
pub fn classify(record: &Value) -> Option<(RecordKind<'_>, &Value)> {
    let object = record.as_object()?;
    let (key, body) = object.iter().next()?;
    let kind = match ComponentKind::from_key(key) {
        Some(builtin) => RecordKind::BuiltIn(builtin),
        None => RecordKind::Extension(key),
    };
    Some((kind, body))
}

/// Wrap a component body into a record: inject the owning entity's index and
/// nest under the kind key.
pub fn wrap(key: &str, entity: Entity, body: Value) -> Value {
    let mut fields = match body {
        Value::Object(map) => map,
        other => {
            // Non-struct components still need an object body to carry the
            // entity field; tuck the value under "Value".
            let mut map = Map::new();
            map.insert("Value".to_string(), other);
            map
        }
    };
    fields.insert(ENTITY_FIELD.to_string(), Value::from(entity.index()));

    let mut record = Map::new();
    record.insert(key.to_string(), Value::Object(fields));
    Value::Object(record)
}

/// Read the owning entity's index out of a record body.
pub fn entity_index(body: &Value) -> Option<u32> {
    body.get(ENTITY_FIELD)?.as_u64()?.try_into().ok()
}
