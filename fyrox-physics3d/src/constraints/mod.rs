//! Constraints and the PGS solver that resolves them, grounded on
//! `sombra-engine/src/se/physics/constraints/ConstraintManager.cpp`.

pub mod contact;
pub mod distance;
pub mod friction;
pub mod manager;

pub use contact::ContactConstraint;
pub use distance::DistanceConstraint;
pub use friction::FrictionConstraint;
pub use manager::ConstraintManager;

use crate::world::RigidBody;
use fyrox_core::pool::{Handle, Pool};
use nalgebra::Vector3;

/// One row of the constraint system: two bodies, a 12-wide Jacobian split
/// into per-body linear/angular halves, a bias and impulse bounds. Mirrors
/// the source engine's `Constraint` interface (`getJacobianMatrix`,
/// `getBias`, `getConstraintBounds`).
pub(crate) struct ConstraintRow {
    pub bodies: [Handle<RigidBody>; 2],
    pub jacobian: [Vector3<f32>; 4],
    pub bias: f32,
    pub lambda_min: f32,
    pub lambda_max: f32,
}

/// Closed set of constraint kinds this workspace resolves. A trait-object
/// `Vec<Box<dyn Constraint>>` was the other option; a tagged union is kept
/// instead to match the closed-dispatch style used for `ColliderShape`.
pub enum Constraint {
    Distance(DistanceConstraint),
    Contact(ContactConstraint),
    Friction(FrictionConstraint),
}

impl Constraint {
    pub fn bodies(&self) -> [Handle<RigidBody>; 2] {
        match self {
            Constraint::Distance(c) => c.bodies,
            Constraint::Contact(c) => c.bodies,
            Constraint::Friction(c) => c.bodies,
        }
    }

    pub(crate) fn row(&self, bodies: &Pool<RigidBody>, baumgarte_bias: f32, dt: f32) -> ConstraintRow {
        match self {
            Constraint::Distance(c) => c.row(bodies, baumgarte_bias, dt),
            Constraint::Contact(c) => c.row(bodies, baumgarte_bias, dt),
            Constraint::Friction(c) => c.row(bodies, baumgarte_bias, dt),
        }
    }

    pub fn accumulated_impulse(&self) -> f32 {
        match self {
            Constraint::Distance(c) => c.lambda,
            Constraint::Contact(c) => c.lambda,
            Constraint::Friction(c) => c.lambda,
        }
    }

    pub(crate) fn set_accumulated_impulse(&mut self, lambda: f32) {
        match self {
            Constraint::Distance(c) => c.lambda = lambda,
            Constraint::Contact(c) => c.lambda = lambda,
            Constraint::Friction(c) => c.lambda = lambda,
        }
    }
}
