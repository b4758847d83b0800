//! PGS constraint solver: parallel constraint/body bookkeeping refreshed
//! once per tick, fixed-iteration Gauss-Seidel over impulse bounds,
//! incremental dirty tracking so untouched sleeping islands are skipped.
//! Grounded on `ConstraintManager.cpp`'s `update`/`mark_touched`-equivalent
//! `mShouldSolveMatrix` bookkeeping, simplified to recompute `Jv` directly
//! each iteration instead of maintaining the original's factored
//! `invMassJacobianMatrix` deltas - functionally equivalent PGS, traded for
//! simpler code over the original's extra performance optimization.

use crate::constraints::Constraint;
use crate::world::rigid_body::BodyStatus;
use crate::world::RigidBody;
use fxhash::FxHashSet;
use fyrox_core::pool::{Handle, Pool};

pub struct ConstraintManager {
    constraints: Pool<Constraint>,
    touched: FxHashSet<Handle<RigidBody>>,
}

impl ConstraintManager {
    pub fn new() -> Self {
        Self {
            constraints: Pool::new(),
            touched: FxHashSet::default(),
        }
    }

    pub fn add_constraint(&mut self, constraint: Constraint) -> Handle<Constraint> {
        for body in constraint.bodies() {
            self.touched.insert(body);
        }
        self.constraints.spawn(constraint)
    }

    pub fn remove_constraint(&mut self, handle: Handle<Constraint>) {
        if let Some(constraint) = self.constraints.try_borrow(handle) {
            for body in constraint.bodies() {
                self.touched.insert(body);
            }
        }
        self.constraints.try_free(handle);
    }

    pub fn remove_rigid_body(&mut self, body: Handle<RigidBody>) {
        let to_remove: Vec<_> = self
            .constraints
            .pair_iter()
            .filter(|(_, c)| c.bodies().contains(&body))
            .map(|(h, _)| h)
            .collect();
        for handle in to_remove {
            self.remove_constraint(handle);
        }
        self.touched.remove(&body);
    }

    /// Marks `body` as needing its incident constraints re-solved next
    /// tick, without re-scanning every constraint up front.
    pub fn mark_touched(&mut self, body: Handle<RigidBody>) {
        self.touched.insert(body);
    }

    pub fn constraint(&self, handle: Handle<Constraint>) -> Option<&Constraint> {
        self.constraints.try_borrow(handle)
    }

    /// Step (g): refresh `J`/`b`/bounds, run fixed-iteration PGS, write the
    /// resulting velocity changes back into `bodies`.
    pub fn solve(&mut self, bodies: &mut Pool<RigidBody>, dt: f32, baumgarte_bias: f32, max_iterations: usize) {
        let handles: Vec<_> = self.constraints.pair_iter().map(|(h, _)| h).collect();
        if handles.is_empty() {
            self.touched.clear();
            return;
        }

        struct Solved {
            handle: Handle<Constraint>,
            bodies: [Handle<RigidBody>; 2],
            jacobian: [nalgebra::Vector3<f32>; 4],
            bias: f32,
            lambda_min: f32,
            lambda_max: f32,
            lambda: f32,
            inv_denom: f32,
            active: bool,
        }

        let mut solved = Vec::with_capacity(handles.len());
        for handle in handles {
            let constraint = self.constraints.borrow(handle);
            let row = constraint.row(bodies, baumgarte_bias, dt);
            let active = row.bodies.iter().any(|b| {
                self.touched.contains(b) || !bodies.borrow(*b).state.status.contains(BodyStatus::SLEEPING)
            });

            let body_a = bodies.borrow(row.bodies[0]);
            let body_b = bodies.borrow(row.bodies[1]);
            let denom = body_a.properties.inv_mass * row.jacobian[0].norm_squared()
                + row.jacobian[1].dot(&(body_a.state.world_inverse_inertia * row.jacobian[1]))
                + body_b.properties.inv_mass * row.jacobian[2].norm_squared()
                + row.jacobian[3].dot(&(body_b.state.world_inverse_inertia * row.jacobian[3]));

            solved.push(Solved {
                handle,
                bodies: row.bodies,
                jacobian: row.jacobian,
                bias: row.bias,
                lambda_min: row.lambda_min,
                lambda_max: row.lambda_max,
                lambda: constraint.accumulated_impulse(),
                inv_denom: if denom > f32::EPSILON { 1.0 / denom } else { 0.0 },
                active,
            });
        }

        for _ in 0..max_iterations {
            for entry in solved.iter_mut() {
                if !entry.active || entry.inv_denom == 0.0 {
                    continue;
                }
                let (body_a, body_b) = bodies.borrow_two_mut((entry.bodies[0], entry.bodies[1]));
                let jv = entry.jacobian[0].dot(&body_a.state.linear_velocity)
                    + entry.jacobian[1].dot(&body_a.state.angular_velocity)
                    + entry.jacobian[2].dot(&body_b.state.linear_velocity)
                    + entry.jacobian[3].dot(&body_b.state.angular_velocity);

                let delta_lambda = (entry.bias - jv) * entry.inv_denom;
                let old_lambda = entry.lambda;
                entry.lambda = (old_lambda + delta_lambda).clamp(entry.lambda_min, entry.lambda_max);
                let delta_lambda = entry.lambda - old_lambda;

                body_a.state.linear_velocity += body_a.properties.inv_mass * entry.jacobian[0] * delta_lambda;
                body_a.state.angular_velocity +=
                    body_a.state.world_inverse_inertia * (entry.jacobian[1] * delta_lambda);
                body_b.state.linear_velocity += body_b.properties.inv_mass * entry.jacobian[2] * delta_lambda;
                body_b.state.angular_velocity +=
                    body_b.state.world_inverse_inertia * (entry.jacobian[3] * delta_lambda);

                body_a.state.status.insert(BodyStatus::CONSTRAINTS_SOLVED);
                body_b.state.status.insert(BodyStatus::CONSTRAINTS_SOLVED);
            }
        }

        for entry in &solved {
            if let Some(constraint) = self.constraints.try_borrow_mut(entry.handle) {
                constraint.set_accumulated_impulse(entry.lambda);
            }
        }

        self.touched.clear();
    }
}

impl Default for ConstraintManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constraints::DistanceConstraint;
    use crate::world::{RigidBodyProperties, RigidBodyState};
    use nalgebra::{Matrix3, Vector3};

    #[test]
    fn distance_constraint_pulls_bodies_to_target_separation() {
        let mut bodies = Pool::new();
        let props = RigidBodyProperties::new(1.0, Matrix3::identity());

        let mut state_a = RigidBodyState::default();
        state_a.position = Vector3::new(-2.0, 0.0, 0.0);
        let a = bodies.spawn(RigidBody::new(props, state_a));

        let mut state_b = RigidBodyState::default();
        state_b.position = Vector3::new(2.0, 0.0, 0.0);
        let b = bodies.spawn(RigidBody::new(props, state_b));

        let mut manager = ConstraintManager::new();
        let constraint = DistanceConstraint::new([a, b], [Vector3::zeros(), Vector3::zeros()], 1.0);
        manager.add_constraint(Constraint::Distance(constraint));

        for _ in 0..30 {
            manager.solve(&mut bodies, 1.0 / 60.0, 0.2, 8);
            bodies.borrow_mut(a).integrate_position(1.0 / 60.0);
            bodies.borrow_mut(b).integrate_position(1.0 / 60.0);
        }

        let separation = (bodies.borrow(b).state.position - bodies.borrow(a).state.position).norm();
        assert!((separation - 1.0).abs() < 0.05, "separation = {separation}");
    }
}
