//! # Registry — The Sparse Component Store
//!
//! The [`Registry`] owns all entities and their components. Components are
//! stored sparsely: one type-erased table per component type, keyed by entity
//! index. This is the store layout that fits an editor workload — entities
//! carry wildly different component sets, attach/detach is frequent, and
//! queries iterate one type at a time.
//!
//! ## Why `Box<dyn Any>`?
//!
//! The registry holds a *dynamic* set of component types, so it cannot use
//! `HashMap<u32, T>` directly — it only knows a [`TypeId`] at the storage
//! layer. Components are stored as `Box<dyn Any + Send + Sync>` and accessed
//! via `downcast_ref`/`downcast_mut`. This trades cache locality for zero
//! unsafe code; a downcast failure indicates a framework bug and panics.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use super::entity::{Entity, EntityAllocator};

/// One sparse table of components of a single type, keyed by entity index.
struct Store {
    components: HashMap<u32, Box<dyn Any + Send + Sync>>,
    type_name: &'static str,
}

impl Store {
    fn new(type_name: &'static str) -> Self {
        Self {
            components: HashMap::new(),
            type_name,
        }
    }
}

/// The sparse, type-erased component store backing a scene.
///
/// Supports create/destroy of entities, typed attach/detach, existence
/// checks, and per-type views. Entity handles are generational — handles to
/// destroyed entities fail every lookup.
pub struct Registry {
    allocator: EntityAllocator,
    stores: HashMap<TypeId, Store>,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            allocator: EntityAllocator::new(),
            stores: HashMap::new(),
        }
    }

    // ── Entity lifecycle ─────────────────────────────────────────────

    /// Create a new entity with no components.
    pub fn create(&mut self) -> Entity {
        self.allocator.allocate()
    }

    /// Create an entity pinned to an exact index, as recorded in a scene file.
    ///
    /// # Panics
    ///
    /// Panics if the index is already occupied — callers must check
    /// [`entity_at`](Registry::entity_at) first (or use the scene-level
    /// find-or-create operation, which does).
    pub fn create_at(&mut self, index: u32) -> Entity {
        self.allocator.allocate_at(index)
    }

    /// Destroy an entity, detaching all of its components and freeing its
    /// index for reuse.
    ///
    /// Returns `false` if the handle was already stale.
    pub fn destroy(&mut self, entity: Entity) -> bool {
        if !self.allocator.deallocate(entity) {
            return false;
        }
        for store in self.stores.values_mut() {
            store.components.remove(&entity.index);
        }
        true
    }

    /// Check whether an entity handle is alive.
    pub fn is_alive(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
    }

    /// The current handle for a live slot index, or `None` if the slot is
    /// free. This is how raw identifiers from scene files become handles.
    pub fn entity_at(&self, index: u32) -> Option<Entity> {
        self.allocator.entity_at(index)
    }

    /// Returns the number of alive entities.
    pub fn entity_count(&self) -> usize {
        self.allocator.alive_count()
    }

    // ── Component access ─────────────────────────────────────────────

    /// Attach a component to an entity, replacing any existing component of
    /// the same type.
    ///
    /// # Panics
    ///
    /// Panics if the entity is not alive.
    pub fn insert<T: 'static + Send + Sync>(&mut self, entity: Entity, component: T) {
        assert!(
            self.allocator.is_alive(entity),
            "cannot attach `{}` to dead entity {:?}",
            std::any::type_name::<T>(),
            entity
        );
        self.stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Store::new(std::any::type_name::<T>()))
            .components
            .insert(entity.index, Box::new(component));
    }

    /// Detach a component from an entity. Returns `true` if it was present.
    pub fn remove<T: 'static + Send + Sync>(&mut self, entity: Entity) -> bool {
        if !self.allocator.is_alive(entity) {
            return false;
        }
        self.stores
            .get_mut(&TypeId::of::<T>())
            .is_some_and(|store| store.components.remove(&entity.index).is_some())
    }

    /// Whether the entity carries a component of type `T`.
    pub fn has<T: 'static + Send + Sync>(&self, entity: Entity) -> bool {
        self.allocator.is_alive(entity)
            && self
                .stores
                .get(&TypeId::of::<T>())
                .is_some_and(|store| store.components.contains_key(&entity.index))
    }

    /// Get a shared reference to a component on an entity.
    ///
    /// Returns `None` if the entity is dead or doesn't have the component.
    pub fn get<T: 'static + Send + Sync>(&self, entity: Entity) -> Option<&T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let store = self.stores.get(&TypeId::of::<T>())?;
        let boxed = store.components.get(&entity.index)?;
        Some(downcast::<T>(boxed, store.type_name))
    }

    /// Get a mutable reference to a component on an entity.
    ///
    /// Returns `None` if the entity is dead or doesn't have the component.
    pub fn get_mut<T: 'static + Send + Sync>(&mut self, entity: Entity) -> Option<&mut T> {
        if !self.allocator.is_alive(entity) {
            return None;
        }
        let store = self.stores.get_mut(&TypeId::of::<T>())?;
        let type_name = store.type_name;
        let boxed = store.components.get_mut(&entity.index)?;
        Some(downcast_mut::<T>(boxed, type_name))
    }

    // ── Views ────────────────────────────────────────────────────────

    /// Visit every live entity carrying a component of type `T`.
    ///
    /// Iteration order is unspecified; use
    /// [`entities_with`](Registry::entities_with) when order matters.
    pub fn view<T: 'static + Send + Sync>(&self, mut f: impl FnMut(Entity, &T)) {
        let Some(store) = self.stores.get(&TypeId::of::<T>()) else {
            return;
        };
        for (&index, boxed) in &store.components {
            if let Some(entity) = self.allocator.entity_at(index) {
                f(entity, downcast::<T>(boxed, store.type_name));
            }
        }
    }

    /// Visit every live entity carrying a component of type `T`, mutably.
    pub fn view_mut<T: 'static + Send + Sync>(&mut self, mut f: impl FnMut(Entity, &mut T)) {
        let Some(store) = self.stores.get_mut(&TypeId::of::<T>()) else {
            return;
        };
        let type_name = store.type_name;
        for (&index, boxed) in store.components.iter_mut() {
            if let Some(entity) = self.allocator.entity_at(index) {
                f(entity, downcast_mut::<T>(boxed, type_name));
            }
        }
    }

    /// Collect the live entities carrying a component of type `T`, sorted by
    /// index. The sort makes snapshot passes deterministic.
    pub fn entities_with<T: 'static + Send + Sync>(&self) -> Vec<Entity> {
        let Some(store) = self.stores.get(&TypeId::of::<T>()) else {
            return Vec::new();
        };
        let mut entities: Vec<Entity> = store
            .components
            .keys()
            .filter_map(|&index| self.allocator.entity_at(index))
            .collect();
        entities.sort_by_key(|e| e.index);
        entities
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn downcast<'a, T: 'static>(boxed: &'a Box<dyn Any + Send + Sync>, type_name: &str) -> &'a T {
    boxed.downcast_ref::<T>().unwrap_or_else(|| {
        panic!(
            "component store type mismatch: expected `{}`, store holds `{type_name}`",
            std::any::type_name::<T>()
        )
    })
}

fn downcast_mut<'a, T: 'static>(
    boxed: &'a mut Box<dyn Any + Send + Sync>,
    type_name: &str,
) -> &'a mut T {
    boxed.downcast_mut::<T>().unwrap_or_else(|| {
        panic!(
            "component store type mismatch: expected `{}`, store holds `{type_name}`",
            std::any::type_name::<T>()
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }
    struct Health(u32);
    struct Marker;

    #[test]
    fn insert_and_get() {
        let mut reg = Registry::new();
        let e = reg.create();
        reg.insert(e, Position { x: 1.0, y: 2.0 });

        assert!(reg.has::<Position>(e));
        assert_eq!(reg.get::<Position>(e), Some(&Position { x: 1.0, y: 2.0 }));
        assert!(!reg.has::<Health>(e));
        assert!(reg.get::<Health>(e).is_none());
    }

    #[test]
    fn insert_replaces() {
        let mut reg = Registry::new();
        let e = reg.create();
        reg.insert(e, Health(50));
        reg.insert(e, Health(100));
        assert_eq!(reg.get::<Health>(e).map(|h| h.0), Some(100));
    }

    #[test]
    fn get_mut_mutates() {
        let mut reg = Registry::new();
        let e = reg.create();
        reg.insert(e, Position { x: 0.0, y: 0.0 });
        reg.get_mut::<Position>(e).unwrap().x = 9.0;
        assert_eq!(reg.get::<Position>(e).unwrap().x, 9.0);
    }

    #[test]
    fn destroy_detaches_components() {
        let mut reg = Registry::new();
        let e = reg.create();
        reg.insert(e, Health(1));
        assert!(reg.destroy(e));
        assert!(!reg.is_alive(e));
        assert!(reg.get::<Health>(e).is_none());
        assert!(!reg.destroy(e));
    }

    #[test]
    fn stale_handle_misses_recycled_slot() {
        let mut reg = Registry::new();
        let old = reg.create();
        reg.insert(old, Health(1));
        reg.destroy(old);

        let new = reg.create();
        assert_eq!(new.index(), old.index());
        reg.insert(new, Health(2));

        // The stale handle must not see the new entity's component.
        assert!(reg.get::<Health>(old).is_none());
        assert_eq!(reg.get::<Health>(new).map(|h| h.0), Some(2));
    }

    #[test]
    fn view_visits_live_entities_only() {
        let mut reg = Registry::new();
        let a = reg.create();
        let b = reg.create();
        reg.insert(a, Marker);
        reg.insert(b, Marker);
        reg.destroy(a);

        let mut seen = Vec::new();
        reg.view::<Marker>(|entity, _| seen.push(entity));
        assert_eq!(seen, vec![b]);
    }

    #[test]
    fn entities_with_is_sorted() {
        let mut reg = Registry::new();
        let e2 = reg.create_at(2);
        let e0 = reg.create_at(0);
        let e5 = reg.create_at(5);
        for &e in &[e5, e0, e2] {
            reg.insert(e, Marker);
        }
        let ids: Vec<u32> = reg
            .entities_with::<Marker>()
            .iter()
            .map(|e| e.index())
            .collect();
        assert_eq!(ids, vec![0, 2, 5]);
    }

    #[test]
    #[should_panic(expected = "dead entity")]
    fn insert_on_dead_entity_panics() {
        let mut reg = Registry::new();
        let e = reg.create();
        reg.destroy(e);
        reg.insert(e, Marker);
    }
}
