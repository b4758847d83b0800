//! Tangential friction constraint paired with one contact's normal
//! constraint: two orthogonal tangent rows per contact, each bounded by
//! `[-mu*lambda_n, mu*lambda_n]`, where `lambda_n` is the paired normal
//! constraint's accumulated impulse. Grounded on
//! `ConstraintManager.cpp`'s friction-row authoring alongside the normal
//! row. `lambda_n` is taken as the contact's warm-started impulse from the
//! previous tick rather than re-derived every PGS iteration - a standard
//! box-friction approximation, traded here for the same reason
//! `manager.rs` trades the original's factored `invMassJacobianMatrix`
//! deltas for simpler direct recomputation.

use crate::constraints::ConstraintRow;
use crate::world::RigidBody;
use fyrox_core::pool::{Handle, Pool};
use nalgebra::Vector3;

pub struct FrictionConstraint {
    pub(crate) bodies: [Handle<RigidBody>; 2],
    pub world_points: [Vector3<f32>; 2],
    pub tangent: Vector3<f32>,
    pub friction_coefficient: f32,
    pub normal_lambda: f32,
    pub(crate) lambda: f32,
}

impl FrictionConstraint {
    pub fn new(
        bodies: [Handle<RigidBody>; 2],
        world_points: [Vector3<f32>; 2],
        tangent: Vector3<f32>,
        friction_coefficient: f32,
        normal_lambda: f32,
    ) -> Self {
        Self {
            bodies,
            world_points,
            tangent,
            friction_coefficient,
            normal_lambda,
            lambda: 0.0,
        }
    }

    pub(crate) fn row(&self, bodies: &Pool<RigidBody>, _baumgarte_bias: f32, _dt: f32) -> ConstraintRow {
        let body_a = bodies.borrow(self.bodies[0]);
        let body_b = bodies.borrow(self.bodies[1]);

        let r1 = self.world_points[0] - body_a.state.position;
        let r2 = self.world_points[1] - body_b.state.position;
        let t = self.tangent;
        let bound = self.friction_coefficient * self.normal_lambda.max(0.0);

        ConstraintRow {
            bodies: self.bodies,
            jacobian: [-t, -r1.cross(&t), t, r2.cross(&t)],
            bias: 0.0,
            lambda_min: -bound,
            lambda_max: bound,
        }
    }
}

/// Two unit vectors orthogonal to `normal` and to each other, used as a
/// contact's two isotropic friction directions.
pub fn tangent_basis(normal: Vector3<f32>) -> (Vector3<f32>, Vector3<f32>) {
    let helper = if normal.x.abs() < 0.9 { Vector3::x() } else { Vector3::y() };
    let t1 = normal.cross(&helper).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::z);
    let t2 = normal.cross(&t1);
    (t1, t2)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn tangent_basis_is_orthogonal_to_the_normal_and_itself() {
        let normal = Vector3::new(0.0, 1.0, 0.0);
        let (t1, t2) = tangent_basis(normal);
        assert!(t1.dot(&normal).abs() < 1e-5);
        assert!(t2.dot(&normal).abs() < 1e-5);
        assert!(t1.dot(&t2).abs() < 1e-5);
    }
}
