//! Unilateral non-penetration constraint derived from one manifold contact
//! point. Translated fresh from the collision pipeline's output every tick
//! (step f: "translate current contacts into constraints, reusing previous
//! tick's lambda when the same contact persists").

use crate::constraints::ConstraintRow;
use crate::world::RigidBody;
use fyrox_core::pool::{Handle, Pool};
use nalgebra::Vector3;

pub struct ContactConstraint {
    pub(crate) bodies: [Handle<RigidBody>; 2],
    pub world_points: [Vector3<f32>; 2],
    pub normal: Vector3<f32>,
    pub penetration: f32,
    pub separation_slop: f32,
    pub(crate) lambda: f32,
}

impl ContactConstraint {
    pub fn new(
        bodies: [Handle<RigidBody>; 2],
        world_points: [Vector3<f32>; 2],
        normal: Vector3<f32>,
        penetration: f32,
        separation_slop: f32,
        warm_start_lambda: f32,
    ) -> Self {
        Self {
            bodies,
            world_points,
            normal,
            penetration,
            separation_slop,
            lambda: warm_start_lambda,
        }
    }

    pub(crate) fn row(&self, bodies: &Pool<RigidBody>, baumgarte_bias: f32, dt: f32) -> ConstraintRow {
        let body_a = bodies.borrow(self.bodies[0]);
        let body_b = bodies.borrow(self.bodies[1]);

        let r1 = self.world_points[0] - body_a.state.position;
        let r2 = self.world_points[1] - body_b.state.position;
        let n = self.normal;

        let bias = (baumgarte_bias / dt.max(f32::EPSILON)) * (self.penetration - self.separation_slop).max(0.0);

        ConstraintRow {
            bodies: self.bodies,
            jacobian: [-n, -r1.cross(&n), n, r2.cross(&n)],
            bias,
            lambda_min: 0.0,
            lambda_max: f32::INFINITY,
        }
    }
}
