//! `RigidBodyWorld`: owns bodies and the constraint manager, drives
//! `CollisionWorld` as one step of its own tick, and is the crate's single
//! public entry point (`RigidBodyWorld::new`/`step`). Fixed per-tick order
//! (a)-(j) mirrors the distilled spec and the source engine's
//! `RigidBodyWorld::update`.

use crate::collider::{Collider, ColliderShape};
use crate::config::WorldConfig;
use crate::constraints::{Constraint, ConstraintManager};
use crate::error::PhysicsError;
use crate::manifold::Manifold;
use crate::narrow::raycast::RayCastHit;
use crate::world::collision_world::CollisionWorld;
use crate::world::rigid_body::{BodyStatus, RigidBody, RigidBodyProperties, RigidBodyState};
use fxhash::FxHashMap;
use fyrox_core::log::Log;
use fyrox_core::pool::{Handle, Pool};
use nalgebra::Vector3;

pub struct RigidBodyWorld {
    config: WorldConfig,
    bodies: Pool<RigidBody>,
    collision_world: CollisionWorld,
    constraint_manager: ConstraintManager,
    /// Which body (if any) drives a collider's transform every tick.
    owners: FxHashMap<Handle<Collider>, Handle<RigidBody>>,
}

impl RigidBodyWorld {
    pub fn new(config: WorldConfig) -> Self {
        Self {
            config,
            bodies: Pool::new(),
            collision_world: CollisionWorld::new(),
            constraint_manager: ConstraintManager::new(),
            owners: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn add_body(&mut self, properties: RigidBodyProperties, state: RigidBodyState) -> Handle<RigidBody> {
        self.bodies.spawn(RigidBody::new(properties, state))
    }

    pub fn remove_body(&mut self, handle: Handle<RigidBody>) -> Result<(), PhysicsError> {
        if self.bodies.try_borrow(handle).is_none() {
            return Err(PhysicsError::UnknownBody(handle));
        }
        self.constraint_manager.remove_rigid_body(handle);
        self.owners.retain(|_, owner| *owner != handle);
        self.bodies.free(handle);
        Ok(())
    }

    pub fn body_state(&self, handle: Handle<RigidBody>) -> Result<&RigidBodyState, PhysicsError> {
        self.bodies
            .try_borrow(handle)
            .map(|b| &b.state)
            .ok_or(PhysicsError::UnknownBody(handle))
    }

    /// Overwrites a body's state from outside the simulation (teleporting,
    /// waking it up for the next tick) and marks it `UpdatedByUser`.
    pub fn set_body_state(&mut self, handle: Handle<RigidBody>, mut state: RigidBodyState) -> Result<(), PhysicsError> {
        let body = self
            .bodies
            .try_borrow_mut(handle)
            .ok_or(PhysicsError::UnknownBody(handle))?;
        state.status.insert(BodyStatus::UPDATED_BY_USER);
        state.status.remove(BodyStatus::SLEEPING);
        body.state = state;
        self.constraint_manager.mark_touched(handle);
        Ok(())
    }

    pub fn body_mut(&mut self, handle: Handle<RigidBody>) -> Result<&mut RigidBody, PhysicsError> {
        self.bodies.try_borrow_mut(handle).ok_or(PhysicsError::UnknownBody(handle))
    }

    pub fn add_collider(
        &mut self,
        body: Option<Handle<RigidBody>>,
        shape: ColliderShape,
    ) -> Handle<Collider> {
        let transform = body
            .and_then(|h| self.bodies.try_borrow(h))
            .map(|b| b.state.transform)
            .unwrap_or_else(nalgebra::Matrix4::identity);
        let handle = self.collision_world.add_collider(Collider::new(shape, transform));
        if let Some(body) = body {
            self.owners.insert(handle, body);
        }
        handle
    }

    pub fn remove_collider(&mut self, handle: Handle<Collider>) {
        self.owners.remove(&handle);
        self.collision_world.remove_collider(handle);
    }

    pub fn set_collider_transform(
        &mut self,
        handle: Handle<Collider>,
        transform: nalgebra::Matrix4<f32>,
    ) -> Result<(), PhysicsError> {
        self.collision_world
            .collider_mut(handle)
            .ok_or(PhysicsError::UnknownCollider(handle))?
            .set_transform(transform);
        Ok(())
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> Handle<Constraint> {
        self.constraint_manager.add_constraint(constraint)
    }

    pub fn remove_constraint(&mut self, handle: Handle<Constraint>) {
        self.constraint_manager.remove_constraint(handle);
    }

    pub fn process_collision_manifolds(&self, callback: impl FnMut(&Manifold)) {
        self.collision_world.process_collision_manifolds(callback);
    }

    pub fn process_ray_cast(
        &self,
        origin: Vector3<f32>,
        direction: Vector3<f32>,
        callback: impl FnMut(&Collider, &RayCastHit),
    ) {
        self.collision_world
            .process_ray_cast(origin, direction, &self.config, callback);
    }

    /// Runs one full tick: (a) clear per-tick status bits, (b) apply
    /// forces, (c) integrate velocities, (d) sync collider transforms,
    /// (e) run the collision pipeline, (f) translate contacts into
    /// constraints, (g) solve constraints, (h) integrate positions, (i)
    /// update motion/sleep state, (j) publish collision events.
    pub fn step(&mut self, dt: f32) {
        for (_, body) in self.bodies.pair_iter_mut() {
            body.state.status.remove(BodyStatus::INTEGRATED);
            body.state.status.remove(BodyStatus::CONSTRAINTS_SOLVED);
        }

        for (_, body) in self.bodies.pair_iter_mut() {
            body.apply_forces();
            body.integrate_velocity(dt);
        }

        for (&collider_handle, &body_handle) in self.owners.iter() {
            if let Some(body) = self.bodies.try_borrow(body_handle) {
                let transform = body.state.transform;
                if let Some(collider) = self.collision_world.collider_mut(collider_handle) {
                    collider.set_transform(transform);
                }
            }
        }

        self.collision_world.update(&self.config);

        let (normal_constraints, friction_constraints) = self.build_contact_constraints();
        let transient: Vec<_> = normal_constraints
            .into_iter()
            .map(|(pair, index, c)| (self.constraint_manager.add_constraint(Constraint::Contact(c)), pair, index))
            .collect();
        let friction_handles: Vec<_> = friction_constraints
            .into_iter()
            .map(|c| self.constraint_manager.add_constraint(Constraint::Friction(c)))
            .collect();

        self.constraint_manager
            .solve(&mut self.bodies, dt, self.config.baumgarte_bias, self.config.max_solver_iterations);

        // Carry the solved impulse back into the manifold so the next
        // tick's freshly-built contact constraint warm-starts from it.
        for (handle, pair, index) in &transient {
            let lambda = self
                .constraint_manager
                .constraint(*handle)
                .map(|c| c.accumulated_impulse())
                .unwrap_or(0.0);
            if let Some(manifold) = self.collision_world.manifold_mut(*pair) {
                if let Some(contact) = manifold.contacts.get_mut(*index) {
                    contact.accumulated_impulse = lambda;
                }
            }
        }

        for (handle, _, _) in transient {
            self.constraint_manager.remove_constraint(handle);
        }
        for handle in friction_handles {
            self.constraint_manager.remove_constraint(handle);
        }

        for (_, body) in self.bodies.pair_iter_mut() {
            body.integrate_position(dt);
        }

        for (_, body) in self.bodies.pair_iter_mut() {
            body.update_motion(self.config.motion_bias, self.config.sleep_epsilon);
        }

        self.publish_events();
    }

    /// Step (f): one unilateral contact constraint plus two orthogonal
    /// friction constraints per manifold contact. The normal constraint is
    /// warm-started from the contact's carried-over accumulated impulse;
    /// the friction pair bounds `[-mu*lambda_n, mu*lambda_n]` off that same
    /// carried-over impulse, since the per-tick row is built once before
    /// PGS iterates (see `constraints::friction`). Normal constraints are
    /// tagged with their originating collider pair and contact index so
    /// the solved impulse can be written back for the next tick's warm
    /// start; friction constraints carry no state across ticks.
    #[allow(clippy::type_complexity)]
    fn build_contact_constraints(
        &self,
    ) -> (
        Vec<((Handle<Collider>, Handle<Collider>), usize, crate::constraints::ContactConstraint)>,
        Vec<crate::constraints::FrictionConstraint>,
    ) {
        let mut normal = Vec::new();
        let mut friction = Vec::new();
        for manifold in self.collision_world.manifolds() {
            let body_a = self.owners.get(&manifold.colliders.0).copied();
            let body_b = self.owners.get(&manifold.colliders.1).copied();
            let (body_a, body_b) = match (body_a, body_b) {
                (Some(a), Some(b)) => (a, b),
                _ => continue,
            };
            for (index, contact) in manifold.contacts.iter().enumerate() {
                normal.push((
                    manifold.colliders,
                    index,
                    crate::constraints::ContactConstraint::new(
                        [body_a, body_b],
                        contact.world_pos,
                        contact.normal,
                        contact.penetration,
                        self.config.contact_separation,
                        contact.accumulated_impulse,
                    ),
                ));

                let (t1, t2) = crate::constraints::friction::tangent_basis(contact.normal);
                for tangent in [t1, t2] {
                    friction.push(crate::constraints::FrictionConstraint::new(
                        [body_a, body_b],
                        contact.world_pos,
                        tangent,
                        self.config.friction_coefficient,
                        contact.accumulated_impulse,
                    ));
                }
            }
        }
        (normal, friction)
    }

    fn publish_events(&self) {
        self.collision_world.process_collision_manifolds(|manifold| {
            Log::info(format!(
                "manifold {:?}-{:?}: {} contact(s)",
                manifold.colliders.0,
                manifold.colliders.1,
                manifold.contacts.len()
            ));
        });
    }

    pub fn bodies(&self) -> &Pool<RigidBody> {
        &self.bodies
    }

    pub fn colliders(&self) -> &Pool<Collider> {
        self.collision_world.colliders()
    }
}
