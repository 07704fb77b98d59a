//! 2D physics integration via Rapier.
//!
//! The physics system is a Scene subsystem: the Scene initializes it with the
//! engine's gravity, registers entities explicitly when the simulation starts
//! ([`PhysicsSystem::add_entity`] — there is no per-frame auto-discovery),
//! steps it from `Scene::update`, and tears it down in `Scene::destroy`.
//!
//! Simulation runs at a fixed timestep with an accumulator so the result is
//! independent of frame rate; after stepping, dynamic body poses are written
//! back into the entities' [`Transform`]s.

use std::collections::HashMap;

use rapier2d::prelude::*;
use serde_json::Value;

use crate::components::{Aabb, BodyType2D, Box2D, Rigidbody2D};
use crate::ecs::{Entity, Registry};
use crate::math::Transform;

fn body_type_to_rapier(bt: BodyType2D) -> RigidBodyType {
    match bt {
        BodyType2D::Dynamic => RigidBodyType::Dynamic,
        BodyType2D::Kinematic => RigidBodyType::KinematicPositionBased,
        BodyType2D::Static => RigidBodyType::Fixed,
    }
}

/// The 2D physics subsystem of a scene.
pub struct PhysicsSystem {
    gravity: Vec2,
    pipeline: PhysicsPipeline,
    params: IntegrationParameters,
    islands: IslandManager,
    broad_phase: DefaultBroadPhase,
    narrow_phase: NarrowPhase,
    bodies: RigidBodySet,
    colliders: ColliderSet,
    impulse_joints: ImpulseJointSet,
    multibody_joints: MultibodyJointSet,
    ccd_solver: CCDSolver,
    /// Entity index → backing body, for registered entities.
    entity_to_body: HashMap<u32, RigidBodyHandle>,
    accumulator: f32,
    initialized: bool,
}

impl std::fmt::Debug for PhysicsSystem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhysicsSystem")
            .field("gravity", &self.gravity)
            .field("bodies", &self.bodies.len())
            .field("colliders", &self.colliders.len())
            .finish()
    }
}

impl PhysicsSystem {
    pub fn new() -> Self {
        Self {
            gravity: Vec2::ZERO,
            pipeline: PhysicsPipeline::new(),
            params: IntegrationParameters::default(),
            islands: IslandManager::new(),
            broad_phase: DefaultBroadPhase::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            entity_to_body: HashMap::new(),
            accumulator: 0.0,
            initialized: false,
        }
    }

    /// Initialize the simulation with the scene's gravity vector.
    pub fn init(&mut self, gravity: crate::math::Vec2) {
        self.gravity = Vec2::new(gravity.x, gravity.y);
        self.initialized = true;
    }

    /// Drop every body, collider, and registration.
    pub fn destroy(&mut self) {
        self.bodies = RigidBodySet::new();
        self.colliders = ColliderSet::new();
        self.impulse_joints = ImpulseJointSet::new();
        self.multibody_joints = MultibodyJointSet::new();
        self.islands = IslandManager::new();
        self.entity_to_body.clear();
        self.accumulator = 0.0;
        self.initialized = false;
    }

    /// Number of entities currently registered with the simulation.
    pub fn body_count(&self) -> usize {
        self.entity_to_body.len()
    }

    /// Whether an entity is registered.
    pub fn is_registered(&self, entity: Entity) -> bool {
        self.entity_to_body.contains_key(&entity.index())
    }

    /// Register an entity with the simulation, creating its backing body from
    /// its [`Transform`], [`Rigidbody2D`], and [`Box2D`] components.
    ///
    /// Entities without a rigid body become fixed bodies (scene geometry).
    /// Registering the same entity twice is a no-op.
    pub fn add_entity(&mut self, registry: &mut Registry, entity: Entity) {
        if self.entity_to_body.contains_key(&entity.index()) {
            return;
        }
        let Some(transform) = registry.get::<Transform>(entity).copied() else {
            log::warn!("physics registration of {entity} without a Transform; skipped");
            return;
        };
        let rb = registry.get::<Rigidbody2D>(entity).cloned();
        let collider = registry.get::<Box2D>(entity).cloned();

        let body_type = rb
            .as_ref()
            .map(|rb| body_type_to_rapier(rb.body_type))
            .unwrap_or(RigidBodyType::Fixed);

        let mut builder = RigidBodyBuilder::new(body_type)
            .translation(Vec2::new(transform.position.x, transform.position.y))
            .rotation(transform.angle());
        if let Some(rb) = &rb {
            builder = builder
                .linvel(Vec2::new(rb.velocity.x, rb.velocity.y))
                .linear_damping(rb.linear_damping)
                .angular_damping(rb.angular_damping)
                .ccd_enabled(rb.continuous_collision);
            if rb.mass > 0.0 {
                builder = builder.additional_mass(rb.mass);
            }
            if rb.fixed_rotation {
                builder = builder.lock_rotations();
            }
        }
        let handle = self.bodies.insert(builder.build());
        self.entity_to_body.insert(entity.index(), handle);

        if let Some(boxc) = collider {
            let coll = ColliderBuilder::cuboid(boxc.half_size.x, boxc.half_size.y)
                .translation(Vec2::new(boxc.offset.x, boxc.offset.y))
                .friction(boxc.friction)
                .density(boxc.density)
                .build();
            self.colliders
                .insert_with_parent(coll, handle, &mut self.bodies);
        }
    }

    /// Advance the simulation and write dynamic body poses back into the
    /// registry's transforms.
    pub fn update(&mut self, registry: &mut Registry, dt: f32) {
        if !self.initialized || dt <= 0.0 {
            return;
        }

        // Cap the accumulated delta to avoid a spiral of death after a stall.
        self.accumulator += dt.min(0.25);
        if self.accumulator < self.params.dt {
            return;
        }

        // 1. Drop bodies whose entities were destroyed since the last step.
        let dead: Vec<u32> = self
            .entity_to_body
            .keys()
            .copied()
            .filter(|&index| registry.entity_at(index).is_none())
            .collect();
        for index in dead {
            if let Some(handle) = self.entity_to_body.remove(&index) {
                self.bodies.remove(
                    handle,
                    &mut self.islands,
                    &mut self.colliders,
                    &mut self.impulse_joints,
                    &mut self.multibody_joints,
                    true,
                );
            }
        }

        // 2. Push kinematic targets: Transform → Rapier.
        let mut kinematic_updates: Vec<(RigidBodyHandle, Vec2, f32)> = Vec::new();
        {
            let reg: &Registry = registry;
            reg.view::<Rigidbody2D>(|entity, rb| {
                if rb.body_type == BodyType2D::Kinematic {
                    if let Some(&handle) = self.entity_to_body.get(&entity.index()) {
                        if let Some(tf) = reg.get::<Transform>(entity) {
                            kinematic_updates.push((
                                handle,
                                Vec2::new(tf.position.x, tf.position.y),
                                tf.angle(),
                            ));
                        }
                    }
                }
            });
        }
        for (handle, pos, angle) in kinematic_updates {
            if let Some(body) = self.bodies.get_mut(handle) {
                body.set_next_kinematic_position(Pose::new(pos, angle));
            }
        }

        // 3. Step with a fixed dt, consuming the accumulator.
        let fixed_dt = self.params.dt;
        while self.accumulator >= fixed_dt {
            self.pipeline.step(
                self.gravity,
                &self.params,
                &mut self.islands,
                &mut self.broad_phase,
                &mut self.narrow_phase,
                &mut self.bodies,
                &mut self.colliders,
                &mut self.impulse_joints,
                &mut self.multibody_joints,
                &mut self.ccd_solver,
                &(),
                &(),
            );
            self.accumulator -= fixed_dt;
        }

        // 4. Pull dynamic poses: Rapier → Transform.
        let mut sync_updates: Vec<(Entity, Vec2, f32)> = Vec::new();
        registry.view::<Rigidbody2D>(|entity, rb| {
            if rb.body_type == BodyType2D::Dynamic {
                if let Some(&handle) = self.entity_to_body.get(&entity.index()) {
                    if let Some(body) = self.bodies.get(handle) {
                        sync_updates.push((entity, body.translation(), body.rotation().angle()));
                    }
                }
            }
        });
        for (entity, pos, angle) in sync_updates {
            if let Some(tf) = registry.get_mut::<Transform>(entity) {
                tf.position.x = pos.x;
                tf.position.y = pos.y;
                tf.set_angle(angle);
            }
        }
    }

    // ── Component deserializers ──────────────────────────────────────

    /// Restore a rigid-body component from a scene record body.
    pub fn deserialize_rigidbody(body: &Value, entity: Entity, registry: &mut Registry) {
        match serde_json::from_value::<Rigidbody2D>(body.clone()) {
            Ok(rb) => registry.insert(entity, rb),
            Err(e) => log::warn!("unreadable Rigidbody2D record for {entity}: {e}"),
        }
    }

    /// Restore a box-collider component from a scene record body.
    pub fn deserialize_box_collider(body: &Value, entity: Entity, registry: &mut Registry) {
        match serde_json::from_value::<Box2D>(body.clone()) {
            Ok(boxc) => registry.insert(entity, boxc),
            Err(e) => log::warn!("unreadable Box2D record for {entity}: {e}"),
        }
    }

    /// Restore an AABB component from a scene record body.
    pub fn deserialize_aabb(body: &Value, entity: Entity, registry: &mut Registry) {
        match serde_json::from_value::<Aabb>(body.clone()) {
            Ok(aabb) => registry.insert(entity, aabb),
            Err(e) => log::warn!("unreadable AABB record for {entity}: {e}"),
        }
    }
}

impl Default for PhysicsSystem {
    fn default() -> Self {
        Self::new()
    }
}
