//! Broad phase: enumerates collider pairs whose inflated world AABBs
//! overlap, deterministically in input order.

use crate::collider::Collider;
use fyrox_core::pool::{Handle, Pool};

/// O(n^2) sweep over inflated AABBs. The source engine's coarse collision
/// detector is the same brute-force sweep - broad phase exists to cheaply
/// reject the overwhelming majority of pairs before narrow phase, not to be
/// asymptotically optimal, and a spatial structure is out of scope for this
/// collision core (the host may shard bodies across islands itself, per the
/// concurrency model).
pub fn candidate_pairs(
    colliders: &Pool<Collider>,
    coarse_epsilon: f32,
) -> Vec<(Handle<Collider>, Handle<Collider>)> {
    let handles: Vec<_> = colliders.pair_iter().map(|(h, _)| h).collect();
    let mut pairs = Vec::new();
    for i in 0..handles.len() {
        for j in (i + 1)..handles.len() {
            let a = colliders.borrow(handles[i]);
            let b = colliders.borrow(handles[j]);
            let mut aabb_a = a.world_aabb();
            aabb_a.inflate(nalgebra::Vector3::new(
                coarse_epsilon,
                coarse_epsilon,
                coarse_epsilon,
            ));
            if aabb_a.is_intersects_aabb(&b.world_aabb()) {
                pairs.push((handles[i], handles[j]));
            }
        }
    }
    pairs
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::collider::{ColliderShape, Sphere};
    use nalgebra::{Matrix4, Vector3};

    #[test]
    fn distant_spheres_are_not_candidates() {
        let mut pool = Pool::new();
        pool.spawn(Collider::new(
            ColliderShape::Sphere(Sphere::new(1.0)),
            Matrix4::identity(),
        ));
        pool.spawn(Collider::new(
            ColliderShape::Sphere(Sphere::new(1.0)),
            Matrix4::new_translation(&Vector3::new(100.0, 0.0, 0.0)),
        ));
        assert!(candidate_pairs(&pool, 0.05).is_empty());
    }

    #[test]
    fn overlapping_spheres_are_candidates() {
        let mut pool = Pool::new();
        pool.spawn(Collider::new(
            ColliderShape::Sphere(Sphere::new(1.0)),
            Matrix4::identity(),
        ));
        pool.spawn(Collider::new(
            ColliderShape::Sphere(Sphere::new(1.0)),
            Matrix4::new_translation(&Vector3::new(1.0, 0.0, 0.0)),
        ));
        assert_eq!(candidate_pairs(&pool, 0.05).len(), 1);
    }
}
