//! Bilateral distance (rod) constraint: keeps two body-local anchor points a
//! fixed distance apart. Grounded on
//! `sombra/include/se/physics/constraints/DistanceConstraint.h` (named
//! directly in `RigidBodyWorldTest.cpp`'s `rigidBodyStatus` test).

use crate::constraints::ConstraintRow;
use crate::world::RigidBody;
use fyrox_core::pool::{Handle, Pool};
use nalgebra::Vector3;

pub struct DistanceConstraint {
    pub(crate) bodies: [Handle<RigidBody>; 2],
    pub local_anchors: [Vector3<f32>; 2],
    pub target_distance: f32,
    pub(crate) lambda: f32,
}

impl DistanceConstraint {
    pub fn new(
        bodies: [Handle<RigidBody>; 2],
        local_anchors: [Vector3<f32>; 2],
        target_distance: f32,
    ) -> Self {
        Self {
            bodies,
            local_anchors,
            target_distance,
            lambda: 0.0,
        }
    }

    pub(crate) fn row(&self, bodies: &Pool<RigidBody>, baumgarte_bias: f32, dt: f32) -> ConstraintRow {
        let body_a = bodies.borrow(self.bodies[0]);
        let body_b = bodies.borrow(self.bodies[1]);

        let anchor_a = body_a.world_anchor(self.local_anchors[0]);
        let anchor_b = body_b.world_anchor(self.local_anchors[1]);
        let r1 = anchor_a - body_a.state.position;
        let r2 = anchor_b - body_b.state.position;

        let delta = anchor_b - anchor_a;
        let current_distance = delta.norm();
        let normal = delta
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::x);

        let constraint_error = current_distance - self.target_distance;
        let bias = (baumgarte_bias / dt.max(f32::EPSILON)) * constraint_error;

        ConstraintRow {
            bodies: self.bodies,
            jacobian: [-normal, -r1.cross(&normal), normal, r2.cross(&normal)],
            bias,
            lambda_min: f32::NEG_INFINITY,
            lambda_max: f32::INFINITY,
        }
    }
}
